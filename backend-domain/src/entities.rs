// Domain entities

pub mod attendee;
pub mod config;
pub mod import;
pub mod scan_log;
pub mod stats;

pub use attendee::*;
pub use config::*;
pub use import::*;
pub use scan_log::*;
pub use stats::*;
