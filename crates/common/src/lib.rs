pub mod config;
pub mod hash;
pub mod strkey;

#[cfg(feature = "logging")]
pub mod logging;

#[cfg(feature = "rpc")]
pub mod rpc;
