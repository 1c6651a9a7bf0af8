use axum::routing::{get, post};
use axum::Router;

use backend_application::AppState;

use crate::handlers::{
    attendee_handlers, import_handlers, ops_handlers, scan_handlers, stats_handlers,
};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v2/scan", post(scan_handlers::scan))
        .route("/v2/import", post(import_handlers::import_attendees))
        .route("/v2/stats", get(stats_handlers::get_stats))
        .route("/v2/attendees", get(attendee_handlers::list_attendees))
        .route(
            "/v2/attendees/:scan_identifier/scans",
            get(attendee_handlers::attendee_scans),
        )
        .route("/v2/ops/health/live", get(ops_handlers::health_live))
        .route("/v2/ops/health/ready", get(ops_handlers::health_ready))
        .route(
            "/v2/ops/metrics/prometheus",
            get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}
