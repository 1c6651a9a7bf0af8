pub mod memory;
pub mod postgres;

pub use memory::*;
pub use postgres::*;
