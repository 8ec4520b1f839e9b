//! Application settings, read from the environment once at startup.
//! Credentials live here and are passed down at construction; nothing reads
//! env vars at call time.

use crate::cloud::CloudSettings;

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: String,
    pub max_connections: u32,
    pub cloud: CloudSettings,
}

impl Settings {
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/bot_console".into());
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);
        Settings {
            database_url,
            bind_addr,
            max_connections,
            cloud: CloudSettings::from_env(),
        }
    }
}
