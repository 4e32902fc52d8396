use crate::error::{GozerError, IoContext, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SiteConfig {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl SiteConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(GozerError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path).io_context("reading config", path)?;
        Self::parse(&content, path)
    }

    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let mut config: SiteConfig =
            toml::from_str(content).map_err(|error| GozerError::TomlParse {
                path: path.to_path_buf(),
                message: error.to_string(),
            })?;

        if !config.url.ends_with('/') {
            config.url.push('/');
        }

        Ok(config)
    }
}
