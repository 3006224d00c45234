// Domain layer - Core models and pipeline vocabulary
pub mod dashboard;
pub mod frame;
pub mod period;
pub mod sensor;
pub mod telemetry;
