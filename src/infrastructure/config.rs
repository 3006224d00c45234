use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub server: ServerSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub cache: CacheSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_listen")]
    pub listen: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthSettings {
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheSettings {
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

/// Column-name resolution. The source spreadsheets changed casing across
/// revisions ("datetime" vs "timestamp", "BATTERY" vs "battery"), so the
/// candidate names are configuration rather than hardcoded.
#[derive(Debug, Deserialize, Clone)]
pub struct ColumnsConfig {
    #[serde(default = "default_timestamp_candidates")]
    pub timestamp: Vec<String>,
    #[serde(default = "default_battery_candidates")]
    pub battery: Vec<String>,
    #[serde(default = "default_counter_prefix")]
    pub counter_prefix: String,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            timestamp: default_timestamp_candidates(),
            battery: default_battery_candidates(),
            counter_prefix: default_counter_prefix(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BatteryDisplayConfig {
    #[serde(default = "default_battery_y_min")]
    pub y_min: f64,
    #[serde(default = "default_battery_y_max")]
    pub y_max: f64,
    #[serde(default = "default_battery_unit")]
    pub unit: String,
}

impl Default for BatteryDisplayConfig {
    fn default() -> Self {
        Self {
            y_min: default_battery_y_min(),
            y_max: default_battery_y_max(),
            unit: default_battery_unit(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SensorsConfig {
    #[serde(default)]
    pub columns: ColumnsConfig,
    #[serde(default)]
    pub battery_display: BatteryDisplayConfig,
    #[serde(default)]
    pub sensors: HashMap<String, SensorConfig>,
}

/// Static descriptor for one sensor: where its CSV lives plus display
/// metadata per counter channel.
#[derive(Debug, Deserialize, Clone)]
pub struct SensorConfig {
    pub source: String,
    pub name: Option<String>,
    #[serde(default)]
    pub channels: HashMap<String, ChannelConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChannelConfig {
    pub label: Option<String>,
    pub unit: Option<String>,
    #[serde(default)]
    pub precision: i32,
}

impl SensorConfig {
    /// Display label for a channel; channels without metadata fall back to
    /// the raw channel name.
    pub fn channel_label(&self, channel: &str) -> String {
        self.channels
            .get(channel)
            .and_then(|c| c.label.clone())
            .unwrap_or_else(|| channel.to_string())
    }

    /// Axis unit for a channel; empty when no metadata entry exists.
    pub fn channel_unit(&self, channel: &str) -> String {
        self.channels
            .get(channel)
            .and_then(|c| c.unit.clone())
            .unwrap_or_default()
    }

    pub fn channel_precision(&self, channel: &str) -> i32 {
        self.channels.get(channel).map(|c| c.precision).unwrap_or(0)
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_timestamp_candidates() -> Vec<String> {
    vec!["datetime".to_string(), "timestamp".to_string()]
}

fn default_battery_candidates() -> Vec<String> {
    vec!["BATTERY".to_string(), "battery".to_string()]
}

fn default_counter_prefix() -> String {
    "COUNT_TIME".to_string()
}

fn default_battery_y_min() -> f64 {
    2.5
}

fn default_battery_y_max() -> f64 {
    3.7
}

fn default_battery_unit() -> String {
    "V".to_string()
}

pub fn load_server_config() -> anyhow::Result<ServerConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/server"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_sensors_config() -> anyhow::Result<SensorsConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/sensors"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
