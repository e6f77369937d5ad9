use anyhow::{anyhow, Result};
use std::net::SocketAddr;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub http_addr: String,
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_connect_timeout_seconds: u64,
    pub db_idle_timeout_seconds: u64,
    pub db_max_lifetime_seconds: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let http_addr = match lookup("HTTP_ADDR") {
            Some(addr) => addr,
            None => {
                let port: u16 = parse_or(&lookup, "PORT", "3000")?;
                format!("0.0.0.0:{}", port)
            }
        };
        SocketAddr::from_str(&http_addr).map_err(|err| anyhow!("invalid HTTP_ADDR: {}", err))?;

        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .map(normalize_database_url);

        Ok(Self {
            http_addr,
            database_url,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", "25")?,
            db_connect_timeout_seconds: parse_or(&lookup, "DB_CONNECT_TIMEOUT_SECONDS", "5")?,
            db_idle_timeout_seconds: parse_or(&lookup, "DB_IDLE_TIMEOUT_SECONDS", "300")?,
            db_max_lifetime_seconds: parse_or(&lookup, "DB_MAX_LIFETIME_SECONDS", "1800")?,
        })
    }
}

/// Hosting providers hand out `postgres://` URLs; both schemes reach the same driver.
fn normalize_database_url(url: String) -> String {
    match url.strip_prefix("postgres://") {
        Some(rest) => format!("postgresql://{}", rest),
        None => url,
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: &str) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    let value = lookup(key).unwrap_or_else(|| default.to_string());
    value
        .parse::<T>()
        .map_err(|err| anyhow!("invalid {}: {}", key, err))
}
