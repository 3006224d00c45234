// Sensor service - Use case for listing configured sensors
use crate::domain::sensor::Sensor;
use crate::infrastructure::config::SensorsConfig;

#[derive(Clone)]
pub struct SensorService {
    config: SensorsConfig,
}

impl SensorService {
    pub fn new(config: SensorsConfig) -> Self {
        Self { config }
    }

    pub fn list_sensors(&self) -> Vec<Sensor> {
        let mut sensors: Vec<Sensor> = self
            .config
            .sensors
            .iter()
            .map(|(id, descriptor)| Sensor::new(id.clone(), descriptor.name.clone()))
            .collect();
        sensors.sort_by(|a, b| a.id.cmp(&b.id));
        sensors
    }
}
