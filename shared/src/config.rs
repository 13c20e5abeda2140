use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub struct Config {
    pub host: String,
    pub http_port: u16,
    pub tcp_port: u16,
    pub cache_max_entries: Option<u64>,
    pub cache_ttl: Option<Duration>,
    pub log_filter: String,
}

impl Config {
    const DEFAULT_HOST: &'static str = "127.0.0.1";
    const DEFAULT_HTTP_PORT: u16 = 8080;
    const DEFAULT_TCP_PORT: u16 = 5500;
    const DEFAULT_LOG_FILTER: &'static str = "info";

    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            host: var("PURGE_HOST").unwrap_or_else(|| Self::DEFAULT_HOST.to_string()),
            http_port: parse_or(&var, "PURGE_HTTP_PORT", Self::DEFAULT_HTTP_PORT),
            tcp_port: parse_or(&var, "PURGE_TCP_PORT", Self::DEFAULT_TCP_PORT),
            cache_max_entries: parse_opt(&var, "PURGE_CACHE_MAX_ENTRIES"),
            cache_ttl: parse_opt::<u64, _>(&var, "PURGE_CACHE_TTL_SECS").map(Duration::from_secs),
            log_filter: var("PURGE_LOG").unwrap_or_else(|| Self::DEFAULT_LOG_FILTER.to_string()),
        }
    }

    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }

    pub fn tcp_addr(&self) -> String {
        format!("{}:{}", self.host, self.tcp_port)
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    parse_opt(var, key).unwrap_or(default)
}

fn parse_opt<T, F>(var: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = var(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparseable value '{}' for {}", raw, key);
            None
        }
    }
}
