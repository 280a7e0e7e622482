use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Static record answered by the local records engine
///
/// The record type follows the address family: IPv4 addresses answer A
/// questions, IPv6 addresses answer AAAA questions.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocalRecord {
    /// Hostname (e.g., "nas", "printer")
    pub hostname: String,

    /// Optional domain override (e.g., "lab.local").
    /// If None, uses `LookupConfig.local_domain`; if both are None the
    /// hostname is used as-is
    #[serde(default)]
    pub domain: Option<String>,

    /// IPv4 or IPv6 address
    pub ip: String,

    /// Time-to-live in seconds (default 300)
    #[serde(default)]
    pub ttl: Option<u32>,
}

impl LocalRecord {
    /// Build fully qualified domain name from hostname and domain
    ///
    /// # Examples
    /// ```
    /// use ferrous_lookup_domain::config::LocalRecord;
    ///
    /// let record = LocalRecord {
    ///     hostname: "nas".into(),
    ///     domain: Some("lab.local".into()),
    ///     ip: "192.168.1.100".into(),
    ///     ttl: None,
    /// };
    /// assert_eq!(record.fqdn(None), "nas.lab.local");
    ///
    /// let record = LocalRecord {
    ///     hostname: "server".into(),
    ///     domain: None,
    ///     ip: "192.168.1.101".into(),
    ///     ttl: None,
    /// };
    /// assert_eq!(record.fqdn(Some("home.lan")), "server.home.lan");
    /// assert_eq!(record.fqdn(None), "server");
    /// ```
    pub fn fqdn(&self, default_domain: Option<&str>) -> String {
        match self.domain.as_deref().or(default_domain) {
            Some(domain) => format!("{}.{}", self.hostname, domain),
            None => self.hostname.clone(),
        }
    }

    pub fn address(&self) -> Result<IpAddr, ConfigError> {
        self.ip.parse().map_err(|_| {
            ConfigError::Validation(format!(
                "Local record '{}' has invalid IP '{}'",
                self.hostname, self.ip
            ))
        })
    }

    pub fn ttl_or_default(&self) -> u32 {
        self.ttl.unwrap_or(300)
    }
}
