//! Progress bar utilities.

use indicatif::{ProgressBar, ProgressStyle};

/// Create a progress bar over the pages of a book.
///
/// The length is unknown until the page total is resolved; the driver sets it.
pub fn create_page_bar(message: &str) -> ProgressBar {
    let bar = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template(&format!(
            "{{spinner:.green}} {} [{{bar:40.cyan/blue}}] {{pos}}/{{len}} pages ({{eta}})",
            message
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    bar.set_style(style);
    bar
}
