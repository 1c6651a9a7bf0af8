pub mod import_commands;
pub mod scan_commands;
