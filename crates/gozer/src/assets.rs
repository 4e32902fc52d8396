use crate::error::{GozerError, IoContext, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

pub const STATIC_DIR: &str = "public";

pub fn copy_dir_recursive(source: &Path, dest: &Path) -> Result<usize> {
    let mut copied = 0;

    for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|error| GozerError::WalkDir {
            path: source.to_path_buf(),
            message: error.to_string(),
        })?;

        let path = entry.path();
        let relative = path
            .strip_prefix(source)
            .map_err(|error| GozerError::WalkDir {
                path: path.to_path_buf(),
                message: error.to_string(),
            })?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).io_context("creating directory", &target)?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).io_context("creating directory", parent)?;
        }
        fs::copy(path, &target).io_context("copying", path)?;
        copied += 1;
    }

    Ok(copied)
}
