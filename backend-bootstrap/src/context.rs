use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use backend_application::{AppState, Metrics};
use backend_domain::{
    AttendeeRepository, CheckInPolicy, DbConfig, RuntimeConfig, ScanLogRepository, StatsRefresher,
    StoreBackend,
};
use backend_infrastructure::{
    AppConfig, DefaultHealthService, InMemoryRepo, NoopStatsRefresher, PostgresRepo,
    PostgresStatsRefresher, SpreadsheetDecoder,
};

pub struct AppContext {
    pub state: AppState,
}

struct StoreParts {
    attendee_repo: Arc<dyn AttendeeRepository>,
    scan_log_repo: Arc<dyn ScanLogRepository>,
    stats_refresher: Arc<dyn StatsRefresher>,
}

impl AppContext {
    pub async fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => AppConfig::load_from(path).await?,
            None => AppConfig::load().await?,
        };
        let runtime_config = config.to_runtime_config();
        let db_config = config.to_db_config()?;

        let store = connect_store(&db_config).await?;
        let state = build_state(runtime_config, store);
        Ok(Self { state })
    }
}

async fn connect_store(db_config: &DbConfig) -> Result<StoreParts> {
    match db_config.backend {
        StoreBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(db_config.max_connections)
                .acquire_timeout(Duration::from_secs(db_config.connect_timeout_seconds.max(1)))
                .connect(&db_config.database_url)
                .await?;
            let repo = Arc::new(PostgresRepo::new(pool.clone()));
            repo.ensure_schema().await?;
            info!(
                max_connections = db_config.max_connections,
                "connected to postgres attendee store"
            );
            Ok(StoreParts {
                attendee_repo: repo.clone(),
                scan_log_repo: repo,
                stats_refresher: Arc::new(PostgresStatsRefresher::new(pool)),
            })
        }
        StoreBackend::Memory => {
            warn!("using in-memory attendee store, data is lost on restart");
            let repo = Arc::new(InMemoryRepo::new());
            Ok(StoreParts {
                attendee_repo: repo.clone(),
                scan_log_repo: repo,
                stats_refresher: Arc::new(NoopStatsRefresher),
            })
        }
    }
}

fn build_state(config: RuntimeConfig, store: StoreParts) -> AppState {
    AppState {
        policy: CheckInPolicy::new(config.rapid_rescan_cooldown_seconds),
        config,
        health_service: Arc::new(DefaultHealthService::new(store.attendee_repo.clone())),
        attendee_repo: store.attendee_repo,
        scan_log_repo: store.scan_log_repo,
        stats_refresher: store.stats_refresher,
        sheet_decoder: Arc::new(SpreadsheetDecoder::new()),
        metrics: Arc::new(Metrics::default()),
    }
}

#[cfg(test)]
mod tests {
    use backend_domain::HealthCheckService;

    use super::*;

    #[tokio::test]
    async fn memory_backend_wires_a_ready_state() {
        let db_config = DbConfig {
            backend: StoreBackend::Memory,
            database_url: String::new(),
            max_connections: 1,
            connect_timeout_seconds: 1,
        };
        let store = connect_store(&db_config).await.unwrap();
        let state = build_state(RuntimeConfig::default(), store);
        assert!(state.health_service.check_database().await.unwrap());
        assert_eq!(state.config.list_default_limit, 50);
    }
}
