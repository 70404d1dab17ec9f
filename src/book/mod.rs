//! Book module.
//!
//! Provides:
//! - The book target (detail page address and output directory key)
//! - The page catalog (page total, pages already on disk, resume cursor)

pub mod catalog;
pub mod target;

pub use catalog::{downloaded_pages, next_page, parse_page_total, resolve_page_total};
pub use target::BookTarget;
