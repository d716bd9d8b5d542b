use std::fmt;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

const BUNDLED_PAGE: &str = include_str!("../content/index.toml");

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("{path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{origin}: {source}")]
    Parse {
        origin: String,
        source: toml::de::Error,
    },

    #[error("startup call {capability}.{method}: arguments are not representable: {reason}")]
    Args {
        capability: String,
        method: String,
        reason: String,
    },
}

/// Where the embedded page comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContentSource {
    /// Page compiled into the binary.
    #[default]
    Bundled,
    File(PathBuf),
}

impl ContentSource {
    pub fn load(&self) -> Result<PageManifest, ContentError> {
        match self {
            ContentSource::Bundled => PageManifest::parse(BUNDLED_PAGE, "bundled page"),
            ContentSource::File(path) => {
                let raw = fs::read_to_string(path).map_err(|source| ContentError::Read {
                    path: path.clone(),
                    source,
                })?;
                PageManifest::parse(&raw, &path.display().to_string())
            }
        }
    }
}

impl fmt::Display for ContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentSource::Bundled => f.write_str("bundled"),
            ContentSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Embedded page: what the content shows and what it calls while it starts.
#[derive(Debug, Clone, Deserialize)]
pub struct PageManifest {
    pub page: PageMeta,
    #[serde(default)]
    pub startup: Vec<StartupCall>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub title: String,
    #[serde(default)]
    pub body: String,
    /// Capabilities the page checks for with `isPluginAvailable` on load.
    #[serde(default)]
    pub requires: Vec<String>,
}

/// A capability call the page makes during its own startup.
#[derive(Debug, Clone, Deserialize)]
pub struct StartupCall {
    pub capability: String,
    pub method: String,
    #[serde(default)]
    pub args: Option<toml::Value>,
}

impl PageManifest {
    pub fn parse(raw: &str, origin: &str) -> Result<Self, ContentError> {
        toml::from_str(raw).map_err(|source| ContentError::Parse {
            origin: origin.to_string(),
            source,
        })
    }
}

impl StartupCall {
    pub fn args_json(&self) -> Result<Value, ContentError> {
        let Some(args) = self.args.as_ref() else {
            return Ok(Value::Null);
        };

        serde_json::to_value(args).map_err(|err| ContentError::Args {
            capability: self.capability.clone(),
            method: self.method.clone(),
            reason: err.to_string(),
        })
    }
}
