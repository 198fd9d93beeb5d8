use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::offer::{Mode, SynthesisPolicy};
use crate::provider::NewProvider;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub search: SearchConfig,
    /// Providers registered on first start (ignored once the table has rows).
    #[serde(default = "default_providers")]
    pub providers: Vec<NewProvider>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            search: SearchConfig::default(),
            providers: default_providers(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("travelpair.db")
}

/// Search behavior
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Delay before search results are returned, in milliseconds.
    #[serde(default)]
    pub result_delay_ms: u64,
    /// Seed for offer synthesis. Unset means a fresh OS seed per start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Mock generator constants.
    #[serde(default)]
    pub synthesis: SynthesisPolicy,
}

fn default_providers() -> Vec<NewProvider> {
    vec![
        NewProvider::new("makemytrip-flights", "MakeMyTrip", Mode::Flight),
        NewProvider::new("goibibo", "Goibibo", Mode::Flight),
        NewProvider::new("cleartrip", "Cleartrip", Mode::Flight),
        NewProvider::new("skyscanner", "Skyscanner", Mode::Flight),
        NewProvider::new("irctc", "IRCTC", Mode::Train),
        NewProvider::new("trainline", "Trainline", Mode::Train),
        NewProvider::new("raileurope", "Rail Europe", Mode::Train),
    ]
}
