// Domain value objects
pub mod attendance_status;
pub mod identifiers;
pub mod scan_action;

pub use attendance_status::*;
pub use identifiers::*;
pub use scan_action::*;
