// src/config.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Env var naming an optional YAML config file.
pub const CONFIG_ENV: &str = "XERIMPORT_CONFIG";
/// Env var overriding `output_dir`.
pub const OUT_DIR_ENV: &str = "XERIMPORT_OUT";

/// Knobs of the transformation stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Prefix of the time-based id given to exports without a project id.
    pub fallback_project_prefix: String,
    /// Stamp the project id onto every resource assignment row.
    pub stamp_project_id: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            fallback_project_prefix: "project_".to_string(),
            stamp_project_id: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub transform: TransformOptions,
    /// Where imported projects are stored.
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transform: TransformOptions::default(),
            output_dir: PathBuf::from("projects"),
        }
    }
}

impl Config {
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("parsing config YAML")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
        Self::from_yaml(&text).with_context(|| format!("in {:?}", path))
    }

    /// Defaults, overlaid by the file named in `XERIMPORT_CONFIG`, then by
    /// `XERIMPORT_OUT`.
    pub fn from_env() -> Result<Self> {
        Self::resolve(
            env::var_os(CONFIG_ENV).map(PathBuf::from),
            env::var_os(OUT_DIR_ENV).map(PathBuf::from),
        )
    }

    pub fn resolve(config_path: Option<PathBuf>, output_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::load(&path)?,
            None => Self::default(),
        };
        if let Some(dir) = output_dir {
            config.output_dir = dir;
        }
        debug!(?config, "configuration resolved");
        Ok(config)
    }
}
