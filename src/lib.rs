// src/lib.rs

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use error::{Result, SyncError};

/// Installs the env_logger backend with `info` as the default level.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
