//! Filesystem module.
//!
//! Provides:
//! - Path and directory management
//! - Page file naming
//! - The page store the downloader writes into

pub mod naming;
pub mod paths;
pub mod store;

pub use naming::{page_filename, sanitize_path_component};
pub use paths::{ensure_dir, get_book_folder};
pub use store::{DirPageStore, PageStore};
