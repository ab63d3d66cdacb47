//! Application Configuration
//!
//! Loaded from an optional JSON file, then overridden from the environment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite database file (":memory:" for a throwaway database)
    pub db_path: PathBuf,
    /// Directory for rolling log files
    pub log_dir: PathBuf,
    /// Log file base name
    pub app_name: String,
    /// How long SQLite waits for another connection's write lock
    pub busy_timeout_ms: u64,
    /// How long an operation waits for the shared connection
    pub lock_timeout_ms: u64,
    /// Upper bound for one read-then-write transaction
    pub transaction_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("board_order.db"),
            log_dir: PathBuf::from("logs"),
            app_name: "BoardOrder".to_string(),
            busy_timeout_ms: 5_000,
            lock_timeout_ms: 5_000,
            transaction_timeout_ms: 5_000,
        }
    }
}

impl AppConfig {
    /// Load from a JSON file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
        serde_json::from_str(&text)
            .map_err(|e| format!("Failed to parse config {}: {}", path.display(), e))
    }

    /// Apply `BOARD_ORDER_*` environment variables on top of this config
    pub fn with_env_overrides(self) -> Result<Self, String> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        if let Some(path) = lookup("BOARD_ORDER_DB_PATH") {
            self.db_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup("BOARD_ORDER_LOG_DIR") {
            self.log_dir = PathBuf::from(dir);
        }
        if let Some(ms) = lookup("BOARD_ORDER_BUSY_TIMEOUT_MS") {
            self.busy_timeout_ms = parse_ms("BOARD_ORDER_BUSY_TIMEOUT_MS", &ms)?;
        }
        if let Some(ms) = lookup("BOARD_ORDER_LOCK_TIMEOUT_MS") {
            self.lock_timeout_ms = parse_ms("BOARD_ORDER_LOCK_TIMEOUT_MS", &ms)?;
        }
        if let Some(ms) = lookup("BOARD_ORDER_TX_TIMEOUT_MS") {
            self.transaction_timeout_ms = parse_ms("BOARD_ORDER_TX_TIMEOUT_MS", &ms)?;
        }
        Ok(self)
    }

    /// Config for tests and tools: in-memory database, default timeouts
    pub fn in_memory() -> Self {
        Self {
            db_path: PathBuf::from(":memory:"),
            ..Self::default()
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    pub fn transaction_timeout(&self) -> Duration {
        Duration::from_millis(self.transaction_timeout_ms)
    }
}

fn parse_ms(key: &str, value: &str) -> Result<u64, String> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| format!("{} must be a number of milliseconds: {}", key, e))
}
