//! Path validation shared by all three tools (spec.md §4.7)
//!
//! A path must be absolute, exist, be a directory, and be readable.

use crate::error::McpError;
use std::fs;
use std::path::{Path, PathBuf};

pub fn validate_project_path(path: &str) -> Result<PathBuf, McpError> {
    let path = Path::new(path);
    if !path.is_absolute() {
        return Err(McpError::InvalidPath(format!("{} is not an absolute path", path.display())));
    }
    let metadata = fs::metadata(path).map_err(|_| McpError::InvalidPath(format!("{} does not exist", path.display())))?;
    if !metadata.is_dir() {
        return Err(McpError::InvalidPath(format!("{} is not a directory", path.display())));
    }
    fs::read_dir(path).map_err(|_| McpError::InvalidPath(format!("{} is not readable", path.display())))?;
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_rejected() {
        assert!(validate_project_path("relative/path").is_err());
    }

    #[test]
    fn nonexistent_path_rejected() {
        assert!(validate_project_path("/definitely/does/not/exist/anywhere").is_err());
    }

    #[test]
    fn file_instead_of_directory_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();
        assert!(validate_project_path(path).is_err());
    }

    #[test]
    fn existing_directory_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_str().unwrap();
        assert!(validate_project_path(path).is_ok());
    }
}
