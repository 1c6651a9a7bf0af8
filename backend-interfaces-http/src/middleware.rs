pub mod auth;
pub mod body;

pub use auth::*;
pub use body::*;
