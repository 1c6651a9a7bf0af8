use anyhow::{anyhow, Result};

use backend_domain::StoreBackend;

pub fn parse_store_backend(value: &str) -> Result<StoreBackend> {
    match value.trim().to_lowercase().as_str() {
        "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
        "memory" => Ok(StoreBackend::Memory),
        other => Err(anyhow!(
            "invalid store_backend '{}', expected 'postgres' or 'memory'",
            other
        )),
    }
}

pub fn validate_database_url(value: &str) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("database_url is empty"));
    }
    if !(trimmed.starts_with("postgres://") || trimmed.starts_with("postgresql://")) {
        return Err(anyhow!("database_url must start with postgres:// or postgresql://"));
    }
    Ok(())
}
