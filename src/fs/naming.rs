//! Filename generation and manipulation.

use crate::error::{Error, Result};

/// Sanitize a path component (book directory key) with less strict validation.
///
/// Separators and reserved characters are replaced rather than rejected;
/// traversal patterns and null bytes are rejected.
pub fn sanitize_path_component(name: &str) -> Result<String> {
    // Reject path traversal attempts
    if name.contains("..") {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    // Reject null bytes
    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed: '{}'",
            name
        )));
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    // Reject empty or whitespace-only names
    if sanitized.trim().is_empty() {
        return Err(Error::InvalidFilename(
            "Path component cannot be empty or whitespace-only".to_string(),
        ));
    }

    Ok(sanitized)
}

/// File name for one page, e.g. `12.png`.
pub fn page_filename(page: u32, extension: &str) -> String {
    format!("{}.{}", page, extension)
}

/// Name of the scratch file a page is written to before being renamed into place.
pub fn partial_filename(page: u32, extension: &str) -> String {
    format!("{}.{}.part", page, extension)
}
