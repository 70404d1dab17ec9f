//! Page catalog: how many pages the book has and which are already stored.

use std::collections::BTreeSet;

use crate::api::{ReaderSite, Session};
use crate::error::{Error, Result};
use crate::extract::extract_attribute;
use crate::fs::PageStore;

/// Element and attribute of the content listing holding the page count.
const TOTAL_ELEMENT: &str = "Content";
const TOTAL_ATTRIBUTE: &str = "TotalNum";

/// Ask the reader how many pages the book has.
pub async fn resolve_page_total(site: &dyn ReaderSite, session: &Session) -> Result<u32> {
    tracing::info!("Getting page total.");
    let document = site.get_content(session).await?;
    let total = parse_page_total(&document.body)?;
    tracing::info!("Book has {} pages.", total);
    Ok(total)
}

/// Read the page count out of a content listing body.
pub fn parse_page_total(body: &str) -> Result<u32> {
    let raw = extract_attribute(body, TOTAL_ELEMENT, TOTAL_ATTRIBUTE)?
        .ok_or_else(|| Error::missing_field(TOTAL_ATTRIBUTE, "content listing"))?;

    match raw.trim().parse::<u32>() {
        Ok(total) if total > 0 => Ok(total),
        _ => Err(Error::Parse(format!(
            "{} '{}' is not a positive page count",
            TOTAL_ATTRIBUTE, raw
        ))),
    }
}

/// Pages in `1..=total` that the store already holds.
pub fn downloaded_pages(store: &dyn PageStore, total: u32) -> BTreeSet<u32> {
    (1..=total).filter(|&page| store.exists(page)).collect()
}

/// The next page to fetch after `last_completed` (or from the start when `None`).
///
/// Returns the smallest page above `last_completed` that is neither in
/// `existing` nor beyond `total`.
pub fn next_page(total: u32, existing: &BTreeSet<u32>, last_completed: Option<u32>) -> Option<u32> {
    let start = match last_completed {
        None => 1,
        Some(page) => page.checked_add(1)?,
    };
    (start..=total).find(|page| !existing.contains(page))
}
