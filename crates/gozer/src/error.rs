use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GozerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO error {action} {path}: {source}")]
    IoAt {
        action: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("TOML parse error in {path}: {message}")]
    TomlParse { path: PathBuf, message: String },

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Invalid template name: {name}")]
    InvalidTemplate { name: String },

    #[error("Templates directory not found: {path}")]
    TemplatesNotFound { path: PathBuf },

    #[error("Missing closing front-matter delimiter in {path}")]
    MissingFrontmatterEnd { path: PathBuf },

    #[error("Front matter is not valid UTF-8 in {path}")]
    FrontmatterEncoding { path: PathBuf },

    #[error("Config file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Directory walk error in {path}: {message}")]
    WalkDir { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, GozerError>;

pub trait IoContext<T> {
    fn io_context(self, action: &'static str, path: &Path) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn io_context(self, action: &'static str, path: &Path) -> Result<T> {
        self.map_err(|source| GozerError::IoAt {
            action,
            path: path.to_path_buf(),
            source,
        })
    }
}
