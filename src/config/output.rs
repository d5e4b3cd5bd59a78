//! Output location configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where seed files and per-brand review stores are written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Results directory, created on demand
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("scraper_results")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
        }
    }
}
