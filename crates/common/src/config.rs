use std::{path::PathBuf, time::Duration};

use byte_unit::n_kib_bytes;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

#[cfg(feature = "logging")]
use tracing_subscriber::filter::LevelFilter;

/// Default configuration file name, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "Marketplace.toml";

/// Stellar network configuration.
#[derive(Clone, Deserialize)]
pub struct Network {
    /// Network passphrase, which also identifies the network transactions are signed for.
    pub passphrase: String,

    /// Soroban RPC endpoint URL.
    pub rpc_url: String,
}

/// Addresses of the deployed marketplace contracts.
#[derive(Clone, Deserialize)]
pub struct Contracts {
    /// Contract registry address.
    pub registry: String,

    /// Deployment manager address.
    pub deployment_manager: String,

    /// Review system address.
    pub review_system: String,
}

/// Transaction confirmation polling configuration.
#[derive(Clone, Deserialize)]
pub struct Polling {
    /// Delay between two consecutive transaction status checks, in milliseconds.
    #[serde(default = "default_poll_interval")]
    pub interval_ms: u64,

    /// Total number of status checks before the confirmation is considered timed out.
    #[serde(default = "default_poll_attempts")]
    pub max_attempts: u32,
}

impl Polling {
    /// Delay between two consecutive status checks.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for Polling {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval(),
            max_attempts: default_poll_attempts(),
        }
    }
}

fn default_poll_interval() -> u64 {
    1000
}

fn default_poll_attempts() -> u32 {
    30
}

/// Deployment workflow configuration.
#[derive(Clone, Deserialize)]
pub struct Deploy {
    /// Max WASM blob size accepted for installation, in bytes.
    #[serde(default = "default_wasm_size_limit")]
    pub wasm_size_limit: usize,
}

impl Default for Deploy {
    fn default() -> Self {
        Self {
            wasm_size_limit: default_wasm_size_limit(),
        }
    }
}

// Soroban caps contract code entries well below this value on every public
// network, so the local limit only rejects obviously wrong files.
fn default_wasm_size_limit() -> usize {
    n_kib_bytes!(128) as usize
}

/// Implementation of [`serde`]'s deserializer for [`FromStr`] types.
#[cfg(feature = "logging")]
fn deserialize_from_str<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error,
    D: serde::de::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    std::str::FromStr::from_str(&s).map_err(serde::de::Error::custom)
}

/// Logging configuration.
#[cfg(feature = "logging")]
#[derive(Clone, Deserialize)]
pub struct Logging {
    /// Log level.
    #[serde(deserialize_with = "deserialize_from_str")]
    pub level: LevelFilter,
}

#[cfg(feature = "logging")]
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: LevelFilter::WARN,
        }
    }
}

/// General configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Stellar network configuration.
    pub network: Network,

    /// Marketplace contract addresses.
    pub contracts: Contracts,

    /// Confirmation polling configuration.
    #[serde(default)]
    pub polling: Polling,

    /// Deployment workflow configuration.
    #[serde(default)]
    pub deploy: Deploy,

    /// Logging configuration.
    #[cfg(feature = "logging")]
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    /// Create new config using default configuration file or environment variables.
    ///
    /// Nested keys in environment variables are separated with a double underscore,
    /// for example `MARKETPLACE_NETWORK__RPC_URL`.
    ///
    /// See [`Env`] for more details on how to use environment variables configuration.
    ///
    /// [`Env`]: figment::providers::Env
    pub fn new(path: Option<PathBuf>) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file(
                path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
            ))
            .merge(Env::prefixed("MARKETPLACE_").split("__"))
            .extract()
    }

    /// Create new config suitable for running unit tests.
    #[cfg(feature = "test-utils")]
    pub fn for_tests() -> Self {
        Self {
            network: Network {
                passphrase: String::from("Test SDF Network ; September 2015"),
                rpc_url: String::from("http://127.0.0.1:8000/soroban/rpc"),
            },
            contracts: Contracts {
                registry: String::from("CREGISTRY"),
                deployment_manager: String::from("CDEPLOYMENTS"),
                review_system: String::from("CREVIEWS"),
            },
            polling: Polling {
                interval_ms: 0,
                max_attempts: default_poll_attempts(),
            },
            deploy: Deploy::default(),
            #[cfg(feature = "logging")]
            logging: Logging::default(),
        }
    }
}
