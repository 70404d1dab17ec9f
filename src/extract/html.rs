//! HTML/XML queries over fetched documents.

use std::collections::HashMap;

use scraper::{Html, Selector};
use url::Url;

use crate::error::{Error, Result};

/// A fetched document together with the address it was served from.
#[derive(Debug, Clone)]
pub struct Document {
    /// Final URL of the response, used as the base for relative links.
    pub url: Url,
    /// Response body.
    pub body: String,
}

impl Document {
    pub fn new(url: Url, body: impl Into<String>) -> Self {
        Self {
            url,
            body: body.into(),
        }
    }

    /// Resolve a possibly relative reference against this document's URL.
    pub fn urljoin(&self, reference: &str) -> Result<Url> {
        Ok(self.url.join(reference.trim())?)
    }
}

/// A form found in a page, ready to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlForm {
    /// Absolute submission address.
    pub action: Url,
    /// Form method, uppercased (`GET` or `POST`).
    pub method: String,
    /// Named input values in document order.
    pub fields: Vec<(String, String)>,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Parse(format!("Invalid selector '{}': {:?}", css, e)))
}

/// Collect every `<input>` carrying both an `id` and a `value` as id → value.
///
/// Later inputs with a repeated id win.
pub fn extract_fields(document: &Document) -> Result<HashMap<String, String>> {
    let html = Html::parse_document(&document.body);
    let input = selector("input")?;

    let fields = html
        .select(&input)
        .filter_map(|element| {
            let attrs = element.value();
            match (attrs.attr("id"), attrs.attr("value")) {
                (Some(id), Some(value)) => Some((id.to_string(), value.to_string())),
                _ => None,
            }
        })
        .collect();

    Ok(fields)
}

/// Find the first element matching `css` that has an `href` and resolve it.
pub fn extract_link(document: &Document, css: &str) -> Result<Option<Url>> {
    let href = {
        let html = Html::parse_document(&document.body);
        let sel = selector(css)?;
        html.select(&sel)
            .find_map(|element| element.value().attr("href").map(str::to_string))
    };

    match href {
        Some(href) if !href.trim().is_empty() => Ok(Some(document.urljoin(&href)?)),
        _ => Ok(None),
    }
}

/// Read `attribute` from the first `element` in a (possibly XML) body.
pub fn extract_attribute(body: &str, element: &str, attribute: &str) -> Result<Option<String>> {
    let html = Html::parse_document(body);
    let sel = selector(&element.to_ascii_lowercase())?;
    let attribute = attribute.to_ascii_lowercase();

    Ok(html
        .select(&sel)
        .find_map(|el| el.value().attr(&attribute).map(str::to_string)))
}

/// Whether the text of any element matching `css` contains `needle`.
pub fn contains_text(body: &str, css: &str, needle: &str) -> Result<bool> {
    let html = Html::parse_document(body);
    let sel = selector(css)?;

    Ok(html
        .select(&sel)
        .any(|el| el.text().collect::<String>().contains(needle)))
}

/// Locate the first `<form>` and collect what submitting it would send.
pub fn extract_form(document: &Document) -> Result<Option<HtmlForm>> {
    let html = Html::parse_document(&document.body);
    let form_sel = selector("form")?;
    let input_sel = selector("input[name]")?;

    let Some(form) = html.select(&form_sel).next() else {
        return Ok(None);
    };

    let action = match form.value().attr("action").map(str::trim) {
        Some(action) if !action.is_empty() => document.urljoin(action)?,
        _ => document.url.clone(),
    };
    let method = form
        .value()
        .attr("method")
        .unwrap_or("GET")
        .to_ascii_uppercase();

    let fields = form
        .select(&input_sel)
        .filter(|input| {
            let kind = input.value().attr("type").unwrap_or("text");
            let checkable = kind.eq_ignore_ascii_case("checkbox") || kind.eq_ignore_ascii_case("radio");
            !kind.eq_ignore_ascii_case("submit")
                && !kind.eq_ignore_ascii_case("image")
                && !kind.eq_ignore_ascii_case("button")
                && (!checkable || input.value().attr("checked").is_some())
        })
        .filter_map(|input| {
            let name = input.value().attr("name")?;
            let value = input.value().attr("value").unwrap_or("");
            Some((name.to_string(), value.to_string()))
        })
        .collect();

    Ok(Some(HtmlForm {
        action,
        method,
        fields,
    }))
}
