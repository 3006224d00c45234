// Application layer - Use cases and the pipeline they orchestrate
pub mod dashboard_service;
pub mod pipeline;
pub mod sensor_service;
pub mod session;
pub mod telemetry_source;
