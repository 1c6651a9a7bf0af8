use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sqlx::PgPool;
use tracing::{debug, warn};

use backend_domain::ports::StatsRefresher;

use crate::repositories::REFRESH_STATS_VIEW;

/// Coalesces refresh requests: at most one refresh runs at a time, and a
/// request arriving mid-refresh schedules exactly one more pass.
#[derive(Default)]
pub struct RefreshGate {
    running: AtomicBool,
    dirty: AtomicBool,
}

impl RefreshGate {
    pub fn trigger<F, Fut>(self: &Arc<Self>, job: F)
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.dirty.store(true, Ordering::Release);
        if self.running.swap(true, Ordering::AcqRel) {
            return;
        }
        let gate = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                while gate.dirty.swap(false, Ordering::AcqRel) {
                    job().await;
                }
                gate.running.store(false, Ordering::Release);
                if !gate.dirty.load(Ordering::Acquire) || gate.running.swap(true, Ordering::AcqRel)
                {
                    break;
                }
            }
        });
    }
}

pub struct PostgresStatsRefresher {
    pool: PgPool,
    gate: Arc<RefreshGate>,
}

impl PostgresStatsRefresher {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            gate: Arc::new(RefreshGate::default()),
        }
    }
}

impl StatsRefresher for PostgresStatsRefresher {
    fn spawn_refresh(&self) {
        let pool = self.pool.clone();
        self.gate.trigger(move || {
            let pool = pool.clone();
            async move {
                if let Err(err) = sqlx::query(REFRESH_STATS_VIEW).execute(&pool).await {
                    warn!("attendee_stats refresh failed: {}", err);
                }
            }
        });
    }
}

/// The in-memory backend computes stats on read, so there is nothing to refresh.
#[derive(Default)]
pub struct NoopStatsRefresher;

impl StatsRefresher for NoopStatsRefresher {
    fn spawn_refresh(&self) {
        debug!("stats refresh skipped for in-memory store");
    }
}
