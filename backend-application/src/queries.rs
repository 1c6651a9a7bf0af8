pub mod attendee_queries;
pub mod scan_log_queries;
pub mod stats_queries;
