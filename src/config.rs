use std::{env, net::SocketAddr, time::Duration};

use ipnet::IpNet;

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_token: String,
    pub bind_addr: String,
    pub bind_port: u16,
    pub allowed_cidr: Option<IpNet>,
    pub zabbix: ZabbixConfig,
    pub interface: InterfaceConfig,
    pub lookups: LookupConfig,
}

#[derive(Debug, Clone)]
pub struct ZabbixConfig {
    pub api_url: String,
    pub token: String,
    pub timeout: Duration,
}

/// Agent interface attached to every provisioned host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceConfig {
    pub ip: String,
    pub port: String,
}

#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub tls_timeout: Duration,
    pub whois_server: String,
    pub whois_timeout: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("MCP_API_TOKEN is required and must not be empty")]
    MissingApiToken,
    #[error("BIND_PORT must be a valid u16")]
    InvalidPort,
    #[error("MCP_ALLOWED_CIDR must be a valid CIDR range")]
    InvalidAllowedCidr,
    #[error("invalid bind address or port")]
    InvalidSocket,
    #[error("ZABBIX_API_URL is required and must be an http(s) URL")]
    InvalidZabbixUrl,
    #[error("ZABBIX_TOKEN is required and must not be empty")]
    MissingZabbixToken,
    #[error("HOST_INTERFACE_PORT must be a valid u16")]
    InvalidInterfacePort,
    #[error("{0} must be a positive number of seconds")]
    InvalidTimeout(&'static str),
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            ip: "127.0.0.1".to_string(),
            port: "10052".to_string(),
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            tls_timeout: Duration::from_secs(5),
            whois_server: "whois.iana.org".to_string(),
            whois_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_token = non_empty("MCP_API_TOKEN").ok_or(ConfigError::MissingApiToken)?;

        let bind_addr = non_empty("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string());
        let bind_port = non_empty("BIND_PORT")
            .map(|value| value.parse::<u16>().map_err(|_| ConfigError::InvalidPort))
            .transpose()?
            .unwrap_or(8000);
        let allowed_cidr = non_empty("MCP_ALLOWED_CIDR")
            .map(|value| {
                value
                    .parse::<IpNet>()
                    .map_err(|_| ConfigError::InvalidAllowedCidr)
            })
            .transpose()?;

        let api_url = non_empty("ZABBIX_API_URL")
            .filter(|url| url.starts_with("http://") || url.starts_with("https://"))
            .ok_or(ConfigError::InvalidZabbixUrl)?;
        let token = non_empty("ZABBIX_TOKEN").ok_or(ConfigError::MissingZabbixToken)?;
        let zabbix = ZabbixConfig {
            api_url,
            token,
            timeout: parse_timeout(non_empty("ZABBIX_TIMEOUT_SECS"), "ZABBIX_TIMEOUT_SECS", 30)?,
        };

        let defaults = InterfaceConfig::default();
        let interface = InterfaceConfig {
            ip: non_empty("HOST_INTERFACE_IP").unwrap_or(defaults.ip),
            port: match non_empty("HOST_INTERFACE_PORT") {
                Some(port) => {
                    port.parse::<u16>()
                        .map_err(|_| ConfigError::InvalidInterfacePort)?;
                    port
                }
                None => defaults.port,
            },
        };

        let lookups = LookupConfig {
            tls_timeout: parse_timeout(non_empty("TLS_TIMEOUT_SECS"), "TLS_TIMEOUT_SECS", 5)?,
            whois_server: non_empty("WHOIS_SERVER")
                .unwrap_or_else(|| LookupConfig::default().whois_server),
            whois_timeout: parse_timeout(
                non_empty("WHOIS_TIMEOUT_SECS"),
                "WHOIS_TIMEOUT_SECS",
                10,
            )?,
        };

        let config = Self {
            api_token,
            bind_addr,
            bind_port,
            allowed_cidr,
            zabbix,
            interface,
            lookups,
        };

        let _ = config.bind_socket()?;
        Ok(config)
    }

    pub fn bind_socket(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.bind_port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidSocket)
    }
}

fn parse_timeout(
    value: Option<String>,
    key: &'static str,
    default_secs: u64,
) -> Result<Duration, ConfigError> {
    let Some(value) = value else {
        return Ok(Duration::from_secs(default_secs));
    };

    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout(key)),
    }
}
