//! Apabi Downloader - fetch the page images of a book from the Apabi online reader.
//!
//! The reader only hands out page images to a short-lived session obtained
//! through IP auto-login. This library logs in, discovers the page count,
//! skips pages already on disk, downloads the rest in order and renews the
//! session whenever it expires or is refused, resuming at the same page.
//!
//! # Example
//!
//! ```no_run
//! use apabi_downloader::{
//!     ApabiClient, BookTarget, Config, DirPageStore, DownloadDriver, DriverOptions, SystemClock,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let target = BookTarget::from_detail_url(
//!         "http://apabi.lib.pku.edu.cn/Usp/pku/?pid=book.detail&metaid=m.20151015-ZCKM-902-0064&cult=CN",
//!     )?;
//!     let store = DirPageStore::open(
//!         config.output_directory().join(target.directory_key()),
//!         "png",
//!     )?;
//!     let client = ApabiClient::new(&config.site)?;
//!
//!     let options = DriverOptions::from_config(&config)?;
//!     let state = DownloadDriver::new(&client, &store, &SystemClock, &target, options)
//!         .run()
//!         .await?;
//!     println!("{} pages downloaded", state.downloaded_count());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod book;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod extract;
pub mod fs;
pub mod output;

// Re-exports for convenience
pub use api::{ApabiClient, Authenticator, PageFetch, ReaderSite, Session};
pub use book::BookTarget;
pub use config::Config;
pub use download::{DownloadDriver, DownloadState, DriverOptions, SystemClock};
pub use error::{Error, Result};
pub use fs::{DirPageStore, PageStore};
