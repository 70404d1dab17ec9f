//! Page store: one file per page inside a book directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};
use crate::fs::naming::{page_filename, partial_filename};
use crate::fs::paths::ensure_dir;

/// Destination for downloaded pages of a single book.
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Whether page `page` is already present.
    fn exists(&self, page: u32) -> bool;

    /// Persist the bytes of page `page`.
    async fn write(&self, page: u32, bytes: &[u8]) -> Result<()>;
}

/// Page store backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct DirPageStore {
    dir: PathBuf,
    extension: String,
}

impl DirPageStore {
    /// Open (creating if needed) the directory for a book.
    pub fn open(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Result<Self> {
        let dir = dir.into();
        ensure_dir(&dir)?;
        Ok(Self {
            dir,
            extension: extension.into(),
        })
    }

    /// The book directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Final path of a page.
    pub fn page_path(&self, page: u32) -> PathBuf {
        self.dir.join(page_filename(page, &self.extension))
    }

    fn storage_error(path: &Path, source: std::io::Error) -> Error {
        Error::Storage {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[async_trait]
impl PageStore for DirPageStore {
    fn exists(&self, page: u32) -> bool {
        self.page_path(page).is_file()
    }

    async fn write(&self, page: u32, bytes: &[u8]) -> Result<()> {
        let final_path = self.page_path(page);
        let partial_path = self.dir.join(partial_filename(page, &self.extension));

        // Only a complete file may carry the final name; `exists` trusts it.
        let mut file = File::create(&partial_path)
            .await
            .map_err(|e| Self::storage_error(&partial_path, e))?;
        file.write_all(bytes)
            .await
            .map_err(|e| Self::storage_error(&partial_path, e))?;
        file.flush()
            .await
            .map_err(|e| Self::storage_error(&partial_path, e))?;
        drop(file);

        tokio::fs::rename(&partial_path, &final_path)
            .await
            .map_err(|e| Self::storage_error(&final_path, e))?;

        tracing::debug!("Wrote {} ({} bytes)", final_path.display(), bytes.len());
        Ok(())
    }
}
