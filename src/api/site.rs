//! Transport seam between the downloader and the remote reader.

use async_trait::async_trait;
use url::Url;

use crate::api::session::Session;
use crate::error::Result;
use crate::extract::Document;

/// Outcome of one page image request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageFetch {
    /// The server returned the page.
    Image(Vec<u8>),
    /// The server refused the session (HTTP 401/403).
    Denied(u16),
}

/// The round trips the downloader makes against the book site.
///
/// Implemented over HTTP by [`ApabiClient`](crate::api::ApabiClient); tests
/// substitute scripted fakes.
#[async_trait]
pub trait ReaderSite: Send + Sync {
    /// Submit the IP auto-login form and return the page it leads to.
    async fn submit_login(&self) -> Result<Document>;

    /// Fetch an HTML page (book detail, online reader).
    async fn get_document(&self, url: &Url) -> Result<Document>;

    /// Fetch the content listing that carries the page total.
    async fn get_content(&self, session: &Session) -> Result<Document>;

    /// Request the full-resolution image of `page`.
    async fn get_page_image(&self, session: &Session, page: u32) -> Result<PageFetch>;
}
