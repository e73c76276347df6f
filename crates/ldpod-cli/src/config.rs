//! Configuration file handling.
//!
//! ```toml
//! base_url = "https://pods.example/"
//! template_folder = "templates/pod"
//! pod_naming = "subdomain"
//! log_level = "debug"
//!
//! [storage]
//! type = "file"
//! root = "/var/lib/ldpod"
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use ldpod_types::ensure_trailing_slash;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

/// Where resources live.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    Memory,
    File { root: PathBuf },
}

/// How pod identifiers are derived from a login.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PodNaming {
    /// `{base}{login}/`
    Suffix,
    /// `{scheme}://{login}.{authority}/`
    Subdomain,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    pub storage: StorageConfig,
    pub template_folder: PathBuf,
    pub pod_naming: PodNaming,
    /// Tracing filter used when `RUST_LOG` is unset.
    pub log_level: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/".into(),
            storage: StorageConfig::Memory,
            template_folder: PathBuf::from("templates/pod"),
            pod_naming: PodNaming::Suffix,
            log_level: None,
        }
    }
}

impl ServerConfig {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        let mut config: Self = toml::from_str(text).context("invalid configuration")?;
        config.base_url = ensure_trailing_slash(&config.base_url);
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read configuration {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }

    /// The configuration file named on the command line, or the defaults,
    /// with command-line overrides applied.
    pub fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(base_url) = &cli.base_url {
            config.base_url = ensure_trailing_slash(base_url);
        }
        if let Some(root) = &cli.root {
            config.storage = StorageConfig::File { root: root.clone() };
        }
        Ok(config)
    }
}
