use anyhow::{bail, Context};
use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::shortener::{CUSTOM_CODE_MAX_LEN, DEFAULT_CODE_LENGTH};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub api_server: ServerConfig,
    pub redirect_server: ServerConfig,
    /// Public prefix of short URLs, e.g. `https://sn.ap`
    pub base_url: String,
    pub short_code_length: usize,
    pub redirect_status: RedirectMode,
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Sqlite,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// HTTP status used for successful redirects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedirectMode {
    #[default]
    MovedPermanently,
    Found,
    TemporaryRedirect,
    PermanentRedirect,
}

impl RedirectMode {
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            301 => Some(Self::MovedPermanently),
            302 => Some(Self::Found),
            307 => Some(Self::TemporaryRedirect),
            308 => Some(Self::PermanentRedirect),
            _ => None,
        }
    }

    pub fn status_code(self) -> u16 {
        match self {
            Self::MovedPermanently => 301,
            Self::Found => 302,
            Self::TemporaryRedirect => 307,
            Self::PermanentRedirect => 308,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustedProxyMode {
    /// Use the socket peer address
    #[default]
    None,
    /// Use X-Forwarded-For, skipping trusted proxies from the right
    Standard,
    /// Use CF-Connecting-IP
    Cloudflare,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    pub trusted_proxy_mode: TrustedProxyMode,
    /// Proxies allowed to append to X-Forwarded-For
    #[serde(default)]
    pub trusted_proxies: Vec<IpNet>,
    /// Capacity of the click queue between redirects and storage
    pub click_queue_size: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            trusted_proxy_mode: TrustedProxyMode::None,
            trusted_proxies: Vec::new(),
            click_queue_size: 10_000,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_backend(value: &str) -> DatabaseBackend {
    match value.to_lowercase().as_str() {
        "postgres" | "postgresql" => DatabaseBackend::Postgres,
        _ => DatabaseBackend::Sqlite,
    }
}

fn parse_proxy_mode(value: &str) -> TrustedProxyMode {
    match value.to_lowercase().as_str() {
        "none" | "" => TrustedProxyMode::None,
        "standard" => TrustedProxyMode::Standard,
        "cloudflare" => TrustedProxyMode::Cloudflare,
        other => {
            tracing::warn!(
                "Unknown TRUSTED_PROXY_MODE '{other}', falling back to 'none'. Supported values: none, standard, cloudflare"
            );
            TrustedProxyMode::None
        }
    }
}

fn parse_trusted_proxies(value: &str) -> anyhow::Result<Vec<IpNet>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            // A bare address is a single-host network
            s.parse::<IpNet>()
                .or_else(|_| {
                    let ip = s.parse::<IpAddr>()?;
                    let prefix = if ip.is_ipv4() { 32 } else { 128 };
                    Ok::<_, anyhow::Error>(IpNet::new(ip, prefix)?)
                })
                .with_context(|| format!("invalid trusted proxy '{s}'"))
        })
        .collect()
}

fn parse_code_length(value: &str) -> anyhow::Result<usize> {
    let length = value
        .parse::<usize>()
        .with_context(|| format!("SHORT_CODE_LENGTH must be a number, got '{value}'"))?;
    if !(1..=CUSTOM_CODE_MAX_LEN).contains(&length) {
        bail!("SHORT_CODE_LENGTH must be between 1 and {CUSTOM_CODE_MAX_LEN}, got {length}");
    }
    Ok(length)
}

fn parse_redirect_status(value: &str) -> anyhow::Result<RedirectMode> {
    value
        .parse::<u16>()
        .ok()
        .and_then(RedirectMode::from_status)
        .with_context(|| format!("REDIRECT_STATUS must be one of 301, 302, 307, 308, got '{value}'"))
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let backend = parse_backend(&env_or("DATABASE_BACKEND", "sqlite"));
        let database_url = env_or("DATABASE_URL", "sqlite://./snaplink.db?mode=rwc");
        let max_connections = env_or("DATABASE_MAX_CONNECTIONS", "10")
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a number")?;

        let api_host = env_or("API_HOST", "127.0.0.1");
        let api_port = env_or("API_PORT", "8080")
            .parse::<u16>()
            .context("API_PORT must be a valid port")?;

        let redirect_host = env_or("REDIRECT_HOST", "127.0.0.1");
        let redirect_port = env_or("REDIRECT_PORT", "3000")
            .parse::<u16>()
            .context("REDIRECT_PORT must be a valid port")?;

        let base_url = env_or("BASE_URL", "http://localhost:3000");
        let short_code_length = parse_code_length(&env_or(
            "SHORT_CODE_LENGTH",
            &DEFAULT_CODE_LENGTH.to_string(),
        ))?;
        let redirect_status = parse_redirect_status(&env_or("REDIRECT_STATUS", "301"))?;

        let trusted_proxy_mode = parse_proxy_mode(&env_or("TRUSTED_PROXY_MODE", "none"));
        let trusted_proxies = parse_trusted_proxies(&env_or("TRUSTED_PROXIES", ""))?;
        let click_queue_size = env_or("CLICK_QUEUE_SIZE", "10000")
            .parse::<usize>()
            .context("CLICK_QUEUE_SIZE must be a number")?;

        Ok(Config {
            database: DatabaseConfig {
                backend,
                url: database_url,
                max_connections,
            },
            api_server: ServerConfig {
                host: api_host,
                port: api_port,
            },
            redirect_server: ServerConfig {
                host: redirect_host,
                port: redirect_port,
            },
            base_url,
            short_code_length,
            redirect_status,
            analytics: AnalyticsConfig {
                trusted_proxy_mode,
                trusted_proxies,
                click_queue_size,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend() {
        assert_eq!(parse_backend("PostgreSQL"), DatabaseBackend::Postgres);
        assert_eq!(parse_backend("postgres"), DatabaseBackend::Postgres);
        assert_eq!(parse_backend("sqlite"), DatabaseBackend::Sqlite);
        assert_eq!(parse_backend("mystery"), DatabaseBackend::Sqlite);
    }

    #[test]
    fn test_parse_code_length_bounds() {
        assert_eq!(parse_code_length("6").unwrap(), 6);
        assert_eq!(parse_code_length("20").unwrap(), 20);
        assert!(parse_code_length("0").is_err());
        assert!(parse_code_length("21").is_err());
        assert!(parse_code_length("six").is_err());
    }

    #[test]
    fn test_parse_redirect_status() {
        assert_eq!(parse_redirect_status("301").unwrap(), RedirectMode::MovedPermanently);
        assert_eq!(parse_redirect_status("307").unwrap(), RedirectMode::TemporaryRedirect);
        assert!(parse_redirect_status("200").is_err());
        assert_eq!(RedirectMode::default().status_code(), 301);
    }

    #[test]
    fn test_parse_trusted_proxies() {
        let proxies = parse_trusted_proxies("10.0.0.0/8, 192.168.1.1 ,,2001:db8::/32").unwrap();
        assert_eq!(proxies.len(), 3);
        assert_eq!(proxies[1], "192.168.1.1/32".parse::<IpNet>().unwrap());
        assert!(parse_trusted_proxies("not-an-ip").is_err());
        assert!(parse_trusted_proxies("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_proxy_mode() {
        assert_eq!(parse_proxy_mode("Cloudflare"), TrustedProxyMode::Cloudflare);
        assert_eq!(parse_proxy_mode("standard"), TrustedProxyMode::Standard);
        assert_eq!(parse_proxy_mode("bogus"), TrustedProxyMode::None);
    }
}
