use core_types::{StorageBackend, Strategy};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub counters: CounterSettings,
    #[serde(default)]
    pub recorder: RecorderSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    /// The strategy catalog, in the order the selector UI lists it.
    #[serde(default)]
    pub strategies: Vec<Strategy>,
}

/// Where the HTTP boundary listens.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted request body, in bytes.
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
}

impl ServerSettings {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit_bytes(),
        }
    }
}

/// Per-path counter policy.
#[derive(Debug, Clone, Deserialize)]
pub struct CounterSettings {
    /// The display threshold given to a path the first time it is seen.
    #[serde(default = "default_display_threshold")]
    pub default_display_threshold: u64,
}

impl Default for CounterSettings {
    fn default() -> Self {
        Self {
            default_display_threshold: default_display_threshold(),
        }
    }
}

/// Tuning for the queued visit recorder.
#[derive(Debug, Clone, Deserialize)]
pub struct RecorderSettings {
    /// How many visits may wait in the queue before new ones are dropped.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// How many increments the worker applies at once. While all are busy the
    /// worker stops taking from the queue.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

impl Default for RecorderSettings {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            max_in_flight: default_max_in_flight(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Only read by the postgres backend. Falls back to `DATABASE_URL`.
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_url: None,
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// When set, logs are also written to a daily rolling file in this directory.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: None,
            file_prefix: default_file_prefix(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    3000
}

fn default_body_limit_bytes() -> usize {
    64 * 1024
}

fn default_display_threshold() -> u64 {
    50
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_max_in_flight() -> usize {
    16
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

fn default_file_prefix() -> String {
    "footfall.log".to_string()
}
