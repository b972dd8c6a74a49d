use std::{fmt, io};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use serde_json::Error as JsonError;
use serde_yaml::Error as YamlError;

pub type Result<T> = std::result::Result<T, ManifestGraphError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum ManifestGraphError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Failed to decode document stream '{source_id}': {message}")]
    Decode { source_id: String, message: String },
    #[error("File System error: {0}")]
    Io(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("You do not have permission to access this resource")]
    PermissionDenied,
    #[error("Diagram rendering error: {0}")]
    Render(String),
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
    #[error("{count} relationship(s) could not be resolved: {summary}")]
    Unresolved { count: usize, summary: String },
}

impl ManifestGraphError {
    /// Attach the offending source identifier to a YAML stream error.
    pub fn decode(source_id: impl Into<String>, err: YamlError) -> Self {
        let message = match err.location() {
            Some(loc) => format!("{err} (line {}, column {})", loc.line(), loc.column()),
            None => format!("{err}"),
        };
        ManifestGraphError::Decode {
            source_id: source_id.into(),
            message,
        }
    }

    /// Process exit code used by the command line front end.
    pub fn exit_code(&self) -> i32 {
        match self {
            ManifestGraphError::Config(_) => 78,
            ManifestGraphError::Decode { .. } => 65,
            ManifestGraphError::Io(_) => 74,
            ManifestGraphError::NotFound(_) => 66,
            ManifestGraphError::PermissionDenied => 77,
            ManifestGraphError::Render(_) => 70,
            ManifestGraphError::Serialization(_) => 65,
            ManifestGraphError::Unresolved { .. } => 1,
        }
    }
}

impl From<YamlError> for ManifestGraphError {
    fn from(src: YamlError) -> ManifestGraphError {
        ManifestGraphError::Serialization(format!("YAML (de)serialization error: {src}"))
    }
}

impl From<JsonError> for ManifestGraphError {
    fn from(src: JsonError) -> ManifestGraphError {
        ManifestGraphError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<toml::de::Error> for ManifestGraphError {
    fn from(src: toml::de::Error) -> ManifestGraphError {
        ManifestGraphError::Config(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for ManifestGraphError {
    fn from(src: toml::ser::Error) -> ManifestGraphError {
        ManifestGraphError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<io::Error> for ManifestGraphError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => ManifestGraphError::NotFound(format!("{x}")),
            io::ErrorKind::PermissionDenied => ManifestGraphError::PermissionDenied,
            _ => ManifestGraphError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<fmt::Error> for ManifestGraphError {
    fn from(x: fmt::Error) -> Self {
        ManifestGraphError::Render(format!("{x}"))
    }
}
