pub mod attendee_handlers;
pub mod import_handlers;
pub mod ops_handlers;
pub mod scan_handlers;
pub mod stats_handlers;

pub use attendee_handlers::*;
pub use import_handlers::*;
pub use ops_handlers::*;
pub use scan_handlers::*;
pub use stats_handlers::*;
