use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub drain_interval_secs: u64,
    pub strict_loading: bool,
    pub scheduler_enabled: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            port: env_or("PORT", 8080)?,
            database_path: env::var("FLEET_DB_PATH").unwrap_or_else(|_| "data/fleet.db".to_string()),
            drain_interval_secs: env_or("DRAIN_INTERVAL_SECS", 60)?,
            strict_loading: env_or("STRICT_LOADING", false)?,
            scheduler_enabled: env_or("SCHEDULER_ENABLED", true)?,
        })
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => Ok(raw.parse()?),
        Err(_) => Ok(default),
    }
}
