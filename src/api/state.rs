use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::monitoring::MonitoringLog;
use crate::roster::Roster;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub roster: Arc<Roster>,
    pub monitoring: Arc<Mutex<MonitoringLog>>,
}

impl AppState {
    pub fn new(config: AppConfig, roster: Roster) -> Self {
        let log = MonitoringLog::new(
            config.storage().monitoring_log_path(),
            config.monitoring.max_entries,
        );
        Self {
            config: Arc::new(config),
            roster: Arc::new(roster),
            monitoring: Arc::new(Mutex::new(log)),
        }
    }
}
