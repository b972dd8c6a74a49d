use crate::{error::ManifestGraphError, graph::ResolveMode, render::DiagramFormat};
use serde::{Deserialize, Serialize};
use std::{
    fs::{read_to_string, write},
    path::{Path, PathBuf},
};

pub const DEFAULT_OUTPUT: &str = "output_er.mmd";

/// Settings for one render run, loadable from a TOML file such as:
///
/// ```toml
/// format = "class"
/// theme = "neutral"
/// strict = true
/// output = "cluster.mmd"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub format: DiagramFormat,
    pub theme: String,
    pub strict: bool,
    pub output: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            format: DiagramFormat::default(),
            theme: crate::render::DEFAULT_THEME.to_string(),
            strict: false,
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

impl RenderConfig {
    /// Read a config file. A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ManifestGraphError> {
        let path = path.as_ref();
        tracing::debug!("Attempting to read render config from: {:?}", path);
        if !path.exists() {
            tracing::debug!("Config file not found, using defaults.");
            return Ok(RenderConfig::default());
        }
        let content = read_to_string(path)?;
        let config: RenderConfig = toml::from_str(&content)?;
        if config.theme.trim().is_empty() {
            tracing::warn!("Empty theme in {:?}, Mermaid will fall back to its default", path);
        }
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ManifestGraphError> {
        tracing::debug!("Attempting to write render config to: {:?}", path.as_ref());
        let toml_string = toml::to_string(self)?;
        write(path, toml_string)?;
        Ok(())
    }

    pub fn resolve_mode(&self) -> ResolveMode {
        if self.strict {
            ResolveMode::Strict
        } else {
            ResolveMode::Lenient
        }
    }
}
