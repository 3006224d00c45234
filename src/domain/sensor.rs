// Sensor domain model
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Sensor {
    pub id: String,
    pub name: String,
}

impl Sensor {
    pub fn new(id: String, display_name: Option<String>) -> Self {
        let name = display_name.unwrap_or_else(|| Self::format_name(&id));
        Self { id, name }
    }

    fn format_name(id: &str) -> String {
        // Convert "pump_house_" to "pump house"
        id.trim_end_matches('_').replace('_', " ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_name_wins() {
        let sensor = Sensor::new("shed".to_string(), Some("Shed meter".to_string()));
        assert_eq!(sensor.name, "Shed meter");
    }

    #[test]
    fn test_format_name_fallback() {
        let sensor = Sensor::new("pump_house_".to_string(), None);
        assert_eq!(sensor.name, "pump house");

        let sensor = Sensor::new("well_2".to_string(), None);
        assert_eq!(sensor.name, "well 2");
    }
}
