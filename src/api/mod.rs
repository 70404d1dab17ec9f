//! Apabi reader API module.
//!
//! This module provides:
//! - HTTP client for the reader endpoints
//! - The login / reader handshake
//! - The session value every page request is signed with

pub mod auth;
pub mod client;
pub mod session;
pub mod site;

pub use auth::Authenticator;
pub use client::ApabiClient;
pub use session::Session;
pub use site::{PageFetch, ReaderSite};
