//! The book a run downloads.

use url::Url;

use crate::error::{Error, Result};
use crate::fs::naming::sanitize_path_component;

/// Query parameter of the detail page that names the book.
const META_ID_PARAM: &str = "metaid";

/// Prefix the site puts in front of mobile-variant metadata ids.
const VARIANT_PREFIX: &str = "m.";

/// Identifies the book to download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookTarget {
    detail_url: Url,
    directory_key: String,
}

impl BookTarget {
    /// Build a target from the book's detail page address.
    pub fn from_detail_url(detail_url: &str) -> Result<Self> {
        let url = Url::parse(detail_url.trim()).map_err(|e| Error::ConfigValidation {
            field: "detail_url".to_string(),
            message: format!("'{}' is not an absolute URL: {}", detail_url, e),
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::ConfigValidation {
                field: "detail_url".to_string(),
                message: format!("Unsupported scheme '{}'", url.scheme()),
            });
        }

        let meta_id = url
            .query_pairs()
            .find(|(key, _)| key.eq_ignore_ascii_case(META_ID_PARAM))
            .map(|(_, value)| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| Error::ConfigValidation {
                field: "detail_url".to_string(),
                message: format!("'{}' carries no '{}' parameter", detail_url, META_ID_PARAM),
            })?;

        let key = meta_id.strip_prefix(VARIANT_PREFIX).unwrap_or(&meta_id);
        let directory_key = sanitize_path_component(key)?;

        Ok(Self {
            detail_url: url,
            directory_key,
        })
    }

    pub fn detail_url(&self) -> &Url {
        &self.detail_url
    }

    /// Name of the output subdirectory for this book.
    pub fn directory_key(&self) -> &str {
        &self.directory_key
    }
}
