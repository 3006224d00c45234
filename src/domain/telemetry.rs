// Telemetry data domain models
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TimeSeriesPoint {
    pub time_ms: i64,
    /// `None` for gap-filled buckets with no observation.
    pub value: Option<f64>,
}

impl TimeSeriesPoint {
    pub fn new(time_ms: i64, value: Option<f64>) -> Self {
        Self { time_ms, value }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TileData {
    pub id: String,
    pub title: String,
    pub unit: String,
    pub value: f64,
    pub precision: i32,
}

impl TileData {
    pub fn new(id: String, title: String, unit: String, value: f64, precision: i32) -> Self {
        Self {
            id,
            title,
            unit,
            value,
            precision,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Bar,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisSide {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesData {
    pub id: String,
    pub name: String,
    pub kind: SeriesKind,
    pub axis: AxisSide,
    /// Rendered but toggled off until the user enables it.
    pub hidden: bool,
    pub unit: Option<String>,
    pub points: Vec<TimeSeriesPoint>,
}

impl SeriesData {
    pub fn new(
        id: String,
        name: String,
        kind: SeriesKind,
        axis: AxisSide,
        hidden: bool,
        unit: Option<String>,
        points: Vec<TimeSeriesPoint>,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            axis,
            hidden,
            unit,
            points,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub id: String,
    pub title: String,
    /// Fixed display range for the secondary (battery) axis.
    pub y2_min: Option<f64>,
    pub y2_max: Option<f64>,
    pub series: Vec<SeriesData>,
}

impl ChartData {
    pub fn new(
        id: String,
        title: String,
        y2_min: Option<f64>,
        y2_max: Option<f64>,
        series: Vec<SeriesData>,
    ) -> Self {
        Self {
            id,
            title,
            y2_min,
            y2_max,
            series,
        }
    }
}
