use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    /// Path to the JSON ticket snapshot served by the in-memory source.
    pub snapshot_path: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            snapshot_path: env::var("SNAPSHOT_PATH")
                .unwrap_or_else(|_| "data/tickets.json".to_string()),
        })
    }
}
