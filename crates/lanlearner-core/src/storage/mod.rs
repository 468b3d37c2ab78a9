mod config;
pub mod database;
pub mod migrations;
pub mod repository;

pub use config::{Config, DisplayConfig, ReviewConfig};
pub use database::Database;
pub use repository::CardRepository;

use std::path::PathBuf;

use crate::error::Result;

/// Environment variable that points the data directory somewhere explicit.
pub const DATA_DIR_ENV: &str = "LANLEARNER_DATA_DIR";

/// Returns `~/.config/lanlearner[-dev]/` based on LANLEARNER_ENV, unless
/// LANLEARNER_DATA_DIR names a directory directly.
///
/// Set LANLEARNER_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os(DATA_DIR_ENV) {
        Some(explicit) if !explicit.is_empty() => PathBuf::from(explicit),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("LANLEARNER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("lanlearner-dev")
            } else {
                base_dir.join("lanlearner")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
