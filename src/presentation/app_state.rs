// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::sensor_service::SensorService;
use crate::application::session::SessionStore;

pub struct AppState {
    pub sensor_service: SensorService,
    pub dashboard_service: DashboardService,
    pub sessions: SessionStore,
}
