use std::sync::Arc;
use std::time::Duration;

use backend_domain::ports::{
    AttendeeRepository, HealthCheckService, ScanLogRepository, SheetDecoder, StatsRefresher,
};
use backend_domain::{CheckInPolicy, RuntimeConfig};

use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub policy: CheckInPolicy,
    pub attendee_repo: Arc<dyn AttendeeRepository>,
    pub scan_log_repo: Arc<dyn ScanLogRepository>,
    pub stats_refresher: Arc<dyn StatsRefresher>,
    pub sheet_decoder: Arc<dyn SheetDecoder>,
    pub health_service: Arc<dyn HealthCheckService>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.config.store_timeout_seconds.max(1))
    }

    /// Bulk writes get the whole request budget instead of the per-call store timeout.
    pub fn bulk_timeout(&self) -> Duration {
        Duration::from_secs(
            self.config
                .request_timeout_seconds
                .max(self.config.store_timeout_seconds)
                .max(1),
        )
    }

    pub fn refresh_stats(&self) {
        if self.config.stats_refresh_enabled {
            self.stats_refresher.spawn_refresh();
        }
    }
}
