//! SIEM manager endpoint configuration

use flowsiem_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

const AUTHENTICATE_PATH: &str = "/security/user/authenticate";
const EVENTS_PATH: &str = "/events";

/// Connection settings for the SIEM manager API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiemConfig {
    /// URL scheme, `https` in production
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Manager API port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Verify the manager's TLS certificate
    #[serde(default)]
    pub verify_tls: bool,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl SiemConfig {
    /// Build an HTTP client honouring the TLS and timeout settings
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .danger_accept_invalid_certs(!self.verify_tls)
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))
    }

    /// Endpoint for a given manager host
    pub fn endpoint(&self, host: impl Into<String>) -> SiemEndpoint {
        SiemEndpoint {
            scheme: self.scheme.clone(),
            host: host.into(),
            port: self.port,
        }
    }
}

impl Default for SiemConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            port: default_port(),
            verify_tls: false,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_scheme() -> String {
    "https".to_string()
}

fn default_port() -> u16 {
    55000
}

fn default_timeout_secs() -> u64 {
    30
}

/// Address of one SIEM manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiemEndpoint {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

impl SiemEndpoint {
    pub fn new(host: impl Into<String>) -> Self {
        SiemConfig::default().endpoint(host)
    }

    fn url(&self, path: &str) -> String {
        format!("{}://{}:{}{}", self.scheme, self.host, self.port, path)
    }

    /// Token exchange URL
    pub fn authenticate_url(&self) -> String {
        self.url(AUTHENTICATE_PATH)
    }

    /// Event ingestion URL
    pub fn events_url(&self) -> String {
        self.url(EVENTS_PATH)
    }
}

impl fmt::Display for SiemEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}
