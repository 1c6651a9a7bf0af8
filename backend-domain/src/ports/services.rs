use async_trait::async_trait;

use crate::entities::{SheetFormat, SheetRow};

pub trait StatsRefresher: Send + Sync {
    /// Fire-and-forget; must never block or fail the caller.
    fn spawn_refresh(&self);
}

pub trait SheetDecoder: Send + Sync {
    fn decode(&self, format: SheetFormat, bytes: &[u8]) -> anyhow::Result<Vec<SheetRow>>;
}

#[async_trait]
pub trait HealthCheckService: Send + Sync {
    async fn check_database(&self) -> anyhow::Result<bool>;
}
