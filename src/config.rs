//! Layered configuration: an optional file plus `DOSSIER__*` environment
//! variables, e.g. `DOSSIER__RENDER_SERVICE__BASE_URL`.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "DOSSIER";
const ENV_CONFIG_PATH: &str = "DOSSIER_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/dossier";

#[derive(Debug, Clone, Deserialize)]
pub struct DossierConfig {
    pub render_service: RenderServiceConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    pub templates: TemplatesConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderServiceConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl RenderServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_timeout_ms() -> u64 {
    30_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "num_cpus::get")]
    pub max_concurrent_renders: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_renders: num_cpus::get(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplatesConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub root: PathBuf,
}

impl DossierConfig {
    /// Loads `$DOSSIER_CONFIG` (or `config/dossier.*` when unset, if present),
    /// then layers environment variables on top.
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .ok()
            .filter(|p| !p.is_empty());
        let file = match path {
            Some(path) => config::File::with_name(&path),
            None => config::File::with_name(DEFAULT_CONFIG_PATH).required(false),
        };
        Self::build(config::Config::builder().add_source(file))
    }

    /// Loads a specific file, then layers environment variables on top.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
        let file = config::File::from(path.as_ref());
        Self::build(config::Config::builder().add_source(file))
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, config::ConfigError> {
        builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
