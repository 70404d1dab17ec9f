//! Configuration structures and loading logic.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default)]
    pub book: BookConfig,

    #[serde(default)]
    pub options: OptionsConfig,
}

/// Remote site configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Page carrying the IP auto-login form.
    #[serde(default = "default_login_url")]
    pub login_url: String,

    /// Browser user agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

/// Book targeting configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookConfig {
    /// Book detail page address, e.g. `...?pid=book.detail&metaid=m.2015...&cult=CN`.
    #[serde(default)]
    pub detail_url: Option<String>,
}

/// Download options configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OptionsConfig {
    /// Root directory; each book gets its own subdirectory.
    #[serde(default)]
    pub output_directory: Option<PathBuf>,

    /// A session with this many seconds or fewer left is treated as expiring.
    #[serde(default = "default_expiry_margin")]
    pub expiry_margin_seconds: i64,

    /// UTC offset used to read calendar-style session deadlines.
    #[serde(default = "default_deadline_offset")]
    pub deadline_utc_offset_hours: i32,

    /// Lower bound of the random pause between page requests.
    #[serde(default)]
    pub page_delay_ms_min: u64,

    /// Upper bound of the random pause between page requests.
    #[serde(default)]
    pub page_delay_ms_max: u64,

    /// Give up when a page is still denied after this many fresh sessions in a row.
    #[serde(default = "default_max_reauths")]
    pub max_consecutive_reauths: u32,

    /// Whether to show the page progress bar.
    #[serde(default = "default_true")]
    pub show_progress: bool,

    /// Extension of the per-page files.
    #[serde(default = "default_image_extension")]
    pub image_extension: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            login_url: default_login_url(),
            user_agent: default_user_agent(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            output_directory: None,
            expiry_margin_seconds: default_expiry_margin(),
            deadline_utc_offset_hours: default_deadline_offset(),
            page_delay_ms_min: 0,
            page_delay_ms_max: 0,
            max_consecutive_reauths: default_max_reauths(),
            show_progress: true,
            image_extension: default_image_extension(),
        }
    }
}

fn default_login_url() -> String {
    "http://apabi.lib.pku.edu.cn/Usp/pku/pub.mvc/?pid=login&cult=CN".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/144.0.0.0 Safari/537.36".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_expiry_margin() -> i64 {
    30
}

fn default_deadline_offset() -> i32 {
    8
}

fn default_max_reauths() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

fn default_image_extension() -> String {
    "png".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}. Create one from config.example.toml",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Get the effective output root.
    pub fn output_directory(&self) -> PathBuf {
        self.options
            .output_directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("output"))
    }

    /// Get the configured detail page address.
    pub fn detail_url(&self) -> Result<&str> {
        self.book
            .detail_url
            .as_deref()
            .ok_or_else(|| Error::MissingConfig("book.detail_url (or pass the detail page URL as an argument)".to_string()))
    }
}
