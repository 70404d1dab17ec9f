//! Path and directory management.

use std::path::{Path, PathBuf};

use crate::book::BookTarget;
use crate::config::Config;
use crate::error::{Error, Result};

/// Get the output directory for a book: `<output root>/<directory key>`.
pub fn get_book_folder(config: &Config, target: &BookTarget) -> PathBuf {
    config.output_directory().join(target.directory_key())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        std::fs::create_dir_all(path).map_err(|source| Error::Storage {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_book_folder() {
        let mut config = Config::default();
        config.options.output_directory = Some(PathBuf::from("/downloads"));
        let target = BookTarget::from_detail_url(
            "http://apabi.lib.pku.edu.cn/Usp/pku/?pid=book.detail&metaid=m.20151015-ZCKM-902-0064&cult=CN",
        )
        .unwrap();

        let path = get_book_folder(&config, &target);
        assert_eq!(path, PathBuf::from("/downloads/20151015-ZCKM-902-0064"));
    }

    #[test]
    fn test_ensure_dir_creates_nested() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        // Idempotent
        ensure_dir(&nested).unwrap();
    }

    #[test]
    fn test_ensure_dir_over_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("occupied");
        std::fs::write(&file, b"x").unwrap();
        let err = ensure_dir(&file.join("book")).unwrap_err();
        assert!(matches!(err, Error::Storage { .. }));
    }
}
