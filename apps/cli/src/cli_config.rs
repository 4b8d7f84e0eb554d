use std::env;
use std::path::PathBuf;

use formsmith_core::{AppError, AppResult};

const DEFAULT_STORE_DIR: &str = ".formsmith";

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub store_dir: PathBuf,
}

impl CliConfig {
    /// Reads configuration from the environment. A `--store-dir` flag wins
    /// over `FORMSMITH_STORE_DIR`.
    pub fn load(store_dir_override: Option<PathBuf>) -> AppResult<Self> {
        let store_dir = match store_dir_override {
            Some(store_dir) => store_dir,
            None => env::var("FORMSMITH_STORE_DIR")
                .ok()
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
                .map_or_else(|| PathBuf::from(DEFAULT_STORE_DIR), PathBuf::from),
        };

        if store_dir.as_os_str().is_empty() {
            return Err(AppError::Validation(
                "store directory must not be empty".to_owned(),
            ));
        }

        Ok(Self { store_dir })
    }
}
