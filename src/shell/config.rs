// Runtime configuration read from the environment.
//
// Variables
// - PORT: listen port, default 5000.
// - HOST: listen address, default 0.0.0.0.
// - ATTENDANCE_DB_PATH (or DATABASE_PATH): SQLite file, default
//   attendance.sqlite3. The value `:memory:` selects the in memory store.

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_DB_PATH: &str = "attendance.sqlite3";
pub const IN_MEMORY_DB_PATH: &str = ":memory:";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PORT must be a number between 1 and 65535, got '{0}'")]
    InvalidPort(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    InMemory,
    Sqlite { path: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store: StoreBackend,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match read("PORT") {
            Some(raw) => match raw.parse::<u16>() {
                Ok(port) if port > 0 => port,
                _ => return Err(ConfigError::InvalidPort(raw)),
            },
            None => DEFAULT_PORT,
        };
        let host = read("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let path = read("ATTENDANCE_DB_PATH")
            .or_else(|| read("DATABASE_PATH"))
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let store = if path == IN_MEMORY_DB_PATH {
            StoreBackend::InMemory
        } else {
            StoreBackend::Sqlite { path }
        };

        Ok(Self { host, port, store })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
