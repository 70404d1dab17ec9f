//! Download state tracking.

use std::path::PathBuf;

/// Per-book download statistics.
#[derive(Debug, Default)]
pub struct DownloadState {
    // Book info
    pub book_key: String,
    pub book_name: Option<String>,
    pub creator: Option<String>,

    // Paths
    pub download_path: Option<PathBuf>,

    // Catalog
    pub page_total: Option<u32>,
    pub already_present: u32,

    // Progress
    pub downloaded: Vec<u32>,
    pub logins: u32,
    pub reauthentications: u32,
    pub denied: u32,
}

impl DownloadState {
    /// Create a new download state for a book.
    pub fn new(book_key: String) -> Self {
        Self {
            book_key,
            ..Default::default()
        }
    }

    /// Record a page handed to the store.
    pub fn record_page(&mut self, page: u32) {
        self.downloaded.push(page);
    }

    /// Number of pages written during this run.
    pub fn downloaded_count(&self) -> u32 {
        self.downloaded.len() as u32
    }

    /// Whether every page of the book is now on disk.
    pub fn is_complete(&self) -> bool {
        self.page_total
            .map(|total| self.already_present + self.downloaded_count() == total)
            .unwrap_or(false)
    }
}
