// Runtime configuration handed to the application layer

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub rapid_rescan_cooldown_seconds: u64,
    pub store_timeout_seconds: u64,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub list_default_limit: usize,
    pub list_max_limit: usize,
    pub stats_refresh_enabled: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3240".to_string(),
            api_token: None,
            rapid_rescan_cooldown_seconds: 10,
            store_timeout_seconds: 5,
            max_body_bytes: 16 * 1024 * 1024,
            request_timeout_seconds: 15,
            list_default_limit: 50,
            list_max_limit: 500,
            stats_refresh_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub backend: StoreBackend,
    pub database_url: String,
    pub max_connections: u32,
    pub connect_timeout_seconds: u64,
}
