use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub log_format: LogFormat,
    pub comline: ComlineApiConfig,
    pub http_client: HttpClientConfig,
}

/// Static account parameters sent with every upstream request.
#[derive(Clone)]
pub struct ComlineApiConfig {
    pub base_url: String,
    pub mid: String,
    pub action: String,
    pub customer_number: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub connection_timeout: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub max_connections: usize,
    pub pending_acquire_timeout: Duration,
    pub dns_resolver: DnsResolver,
}

/// Which resolver the upstream client uses for host lookups.
///
/// `System` goes through the platform's `getaddrinfo`, which is the escape hatch for
/// networks whose security appliances interfere with the bundled resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnsResolver {
    Native,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_addr: SocketAddr = lookup("COMLINE_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .context("invalid COMLINE_ADDR")?;

        let log_format = match lookup("COMLINE_LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => bail!("COMLINE_LOG_FORMAT must be `text` or `json`, got `{other}`"),
        };

        let comline = ComlineApiConfig {
            base_url: required(&lookup, "COMLINE_API_BASE_URL")?,
            mid: required(&lookup, "COMLINE_API_MID")?,
            action: required(&lookup, "COMLINE_API_ACTION")?,
            customer_number: required(&lookup, "COMLINE_API_CUSTOMER_NUMBER")?,
            password: required(&lookup, "COMLINE_API_PASSWORD")?,
        };

        let use_system_dns = match lookup("WEBCLIENT_USE_SYSTEM_DNS_RESOLVER") {
            Some(raw) => raw
                .trim()
                .parse::<bool>()
                .context("WEBCLIENT_USE_SYSTEM_DNS_RESOLVER must be `true` or `false`")?,
            None => false,
        };

        let http_client = HttpClientConfig {
            connection_timeout: parse_millis(&lookup, "WEBCLIENT_CONNECTION_TIMEOUT_MS", 10_000)?,
            read_timeout: parse_millis(&lookup, "WEBCLIENT_READ_TIMEOUT_MS", 30_000)?,
            write_timeout: parse_millis(&lookup, "WEBCLIENT_WRITE_TIMEOUT_MS", 10_000)?,
            max_connections: parse_positive(&lookup, "WEBCLIENT_MAX_CONNECTIONS", 100)? as usize,
            pending_acquire_timeout: parse_millis(
                &lookup,
                "WEBCLIENT_PENDING_ACQUIRE_TIMEOUT_MS",
                45_000,
            )?,
            dns_resolver: if use_system_dns {
                DnsResolver::System
            } else {
                DnsResolver::Native
            },
        };

        Ok(Self {
            listen_addr,
            log_format,
            comline,
            http_client,
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        self.listen_addr
    }
}

impl fmt::Debug for ComlineApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComlineApiConfig")
            .field("base_url", &self.base_url)
            .field("mid", &self.mid)
            .field("action", &self.action)
            .field("customer_number", &self.customer_number)
            .field("password", &"***")
            .finish()
    }
}

fn required<F>(lookup: &F, env_key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(env_key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => bail!("{env_key} is required"),
    }
}

fn parse_positive<F>(lookup: &F, env_key: &str, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(env_key).unwrap_or_else(|| default.to_string());
    let value: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{env_key} must be a positive integer"))?;

    if value == 0 {
        bail!("{env_key} must be at least 1");
    }

    Ok(value)
}

fn parse_millis<F>(lookup: &F, env_key: &str, default_ms: u64) -> Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    parse_positive(lookup, env_key, default_ms).map(Duration::from_millis)
}
