// Dashboard domain model
use super::telemetry::{ChartData, TileData};
use serde::Serialize;

/// Battery voltage extremes over the filtered window, independent of the
/// chosen resampling period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatteryStats {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub tiles: Vec<TileData>,
    pub battery: Option<BatteryStats>,
    pub chart: ChartData,
}

impl Dashboard {
    pub fn new(
        title: String,
        tiles: Vec<TileData>,
        battery: Option<BatteryStats>,
        chart: ChartData,
    ) -> Self {
        Self {
            title,
            tiles,
            battery,
            chart,
        }
    }
}
