//! Configuration validation logic.

use url::Url;

use crate::book::BookTarget;
use crate::config::loader::Config;
use crate::error::{Error, Result};

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_login_url(&config.site.login_url)?;
    validate_user_agent(&config.site.user_agent)?;
    BookTarget::from_detail_url(config.detail_url()?)?;
    validate_delays(config.options.page_delay_ms_min, config.options.page_delay_ms_max)?;
    validate_reauth_limit(config.options.max_consecutive_reauths)?;
    validate_image_extension(&config.options.image_extension)?;

    if config.options.expiry_margin_seconds < 0 {
        return Err(Error::ConfigValidation {
            field: "expiry_margin_seconds".to_string(),
            message: "Expiry margin cannot be negative".to_string(),
        });
    }

    if !(-12..=14).contains(&config.options.deadline_utc_offset_hours) {
        return Err(Error::ConfigValidation {
            field: "deadline_utc_offset_hours".to_string(),
            message: format!(
                "UTC offset must be between -12 and 14 (got {})",
                config.options.deadline_utc_offset_hours
            ),
        });
    }

    Ok(())
}

/// Validate the login page address.
pub fn validate_login_url(login_url: &str) -> Result<()> {
    if login_url.is_empty() {
        return Err(Error::MissingConfig("login_url".to_string()));
    }

    let url = Url::parse(login_url).map_err(|e| Error::ConfigValidation {
        field: "login_url".to_string(),
        message: format!("'{}' is not an absolute URL: {}", login_url, e),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(Error::ConfigValidation {
            field: "login_url".to_string(),
            message: format!("Unsupported scheme '{}'", url.scheme()),
        });
    }

    Ok(())
}

/// Validate the user agent string.
pub fn validate_user_agent(user_agent: &str) -> Result<()> {
    if user_agent.trim().is_empty() {
        return Err(Error::MissingConfig("user_agent".to_string()));
    }

    Ok(())
}

/// Validate the politeness delay range.
pub fn validate_delays(min_ms: u64, max_ms: u64) -> Result<()> {
    if min_ms > max_ms {
        return Err(Error::ConfigValidation {
            field: "page_delay_ms_min".to_string(),
            message: format!(
                "Minimum delay ({} ms) exceeds maximum delay ({} ms)",
                min_ms, max_ms
            ),
        });
    }

    Ok(())
}

/// Validate the re-authentication limit.
pub fn validate_reauth_limit(limit: u32) -> Result<()> {
    if limit == 0 {
        return Err(Error::ConfigValidation {
            field: "max_consecutive_reauths".to_string(),
            message: "At least one re-authentication must be allowed".to_string(),
        });
    }

    Ok(())
}

/// Validate the per-page file extension.
pub fn validate_image_extension(extension: &str) -> Result<()> {
    if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::ConfigValidation {
            field: "image_extension".to_string(),
            message: format!(
                "Extension '{}' must be non-empty and alphanumeric (no leading dot)",
                extension
            ),
        });
    }

    Ok(())
}
