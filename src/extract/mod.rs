//! Field extraction from reader pages.
//!
//! The reader serves HTML for the login, detail and reader pages and a small
//! XML document for the content listing. Both are read through `scraper`;
//! its HTML parser lowercases element and attribute names, so lookups here
//! are done in lowercase.

pub mod html;

pub use html::{
    contains_text, extract_attribute, extract_fields, extract_form, extract_link, Document,
    HtmlForm,
};
