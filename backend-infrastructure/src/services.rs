pub mod health_service;
pub mod sheet_decoder;
pub mod stats_refresher;

pub use health_service::*;
pub use sheet_decoder::*;
pub use stats_refresher::*;
