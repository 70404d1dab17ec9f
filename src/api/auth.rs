//! Login and reader handshake producing a [`Session`].

use std::collections::HashMap;

use chrono::FixedOffset;
use url::form_urlencoded;

use crate::api::session::{field, Session};
use crate::api::site::ReaderSite;
use crate::book::BookTarget;
use crate::error::{Error, Result};
use crate::extract::{contains_text, extract_fields, extract_link, Document};

/// Text the site shows in a paragraph when IP auto-login was refused.
pub const NOT_LOGGED_IN_MARKER: &str = "您尚未登陆。";

/// Link on the detail page that opens the online reader.
const ONLINE_READ_LINK: &str = r#"a[type*="onlineread"]"#;

/// Check if a post-login page reports that login failed.
pub fn authentication_failed(document: &Document) -> Result<bool> {
    contains_text(&document.body, "p", NOT_LOGGED_IN_MARKER)
}

/// Decode the form-encoded `urlrights` field and merge its pairs into `fields`.
pub fn merge_url_rights(fields: &mut HashMap<String, String>) -> Result<()> {
    let rights = fields
        .get(field::URL_RIGHTS)
        .cloned()
        .ok_or_else(|| Error::missing_field(field::URL_RIGHTS, "reader page"))?;

    fields.extend(form_urlencoded::parse(rights.as_bytes()).into_owned());
    Ok(())
}

/// Performs the login and reader handshakes for one book.
pub struct Authenticator<'a> {
    site: &'a dyn ReaderSite,
    target: &'a BookTarget,
    deadline_offset: FixedOffset,
}

impl<'a> Authenticator<'a> {
    pub fn new(site: &'a dyn ReaderSite, target: &'a BookTarget, deadline_offset: FixedOffset) -> Self {
        Self {
            site,
            target,
            deadline_offset,
        }
    }

    /// Log in and open a fresh reader session.
    ///
    /// A refused login is fatal; nothing after the login request is issued.
    pub async fn login(&self) -> Result<Session> {
        let response = self.site.submit_login().await?;
        if authentication_failed(&response)? {
            tracing::error!("Login failed");
            return Err(Error::Authentication(format!(
                "site reports '{}' (IP auto-login refused)",
                NOT_LOGGED_IN_MARKER
            )));
        }
        tracing::info!("Login successful.");

        let detail = self.site.get_document(self.target.detail_url()).await?;
        tracing::info!("Got book info page.");
        let reader_url = extract_link(&detail, ONLINE_READ_LINK)?
            .ok_or_else(|| Error::missing_field("online read link", "book detail page"))?;

        let reader = self.site.get_document(&reader_url).await?;
        tracing::info!("Got online read page.");
        let mut fields = extract_fields(&reader)?;
        merge_url_rights(&mut fields)?;

        let session = Session::from_fields(&fields, reader.url, self.deadline_offset)?;
        tracing::debug!(
            "Session {} valid until {}",
            session.session_id(),
            session.deadline()
        );
        Ok(session)
    }
}
