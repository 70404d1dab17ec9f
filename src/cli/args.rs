//! Command-line argument definitions using clap.

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

/// Apabi book page downloader CLI.
#[derive(Parser, Debug)]
#[command(
    name = "apabi-downloader",
    version,
    about = "Download the page images of a book from the Apabi online reader",
    long_about = "Logs in through IP auto-login, opens the online reader for one book and saves \
                  every page image as <page>.png.\n\n\
                  Interrupted runs resume where they stopped; expired reader sessions are renewed \
                  automatically."
)]
pub struct Args {
    /// Book detail page URL (must carry a `metaid` query parameter).
    #[arg(value_name = "DETAIL_URL", env = "APABI_BOOK_URL")]
    pub book: Option<String>,

    /// Root directory; pages go to <root>/<metaid>/.
    #[arg(short = 'd', long = "directory")]
    pub output_directory: Option<PathBuf>,

    /// Page carrying the IP auto-login form.
    #[arg(long = "login-url", env = "APABI_LOGIN_URL")]
    pub login_url: Option<String>,

    /// Browser user agent string.
    #[arg(short = 'a', long = "user-agent", env = "APABI_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Minimum pause between page requests, in milliseconds.
    #[arg(long = "delay-min")]
    pub delay_min: Option<u64>,

    /// Maximum pause between page requests, in milliseconds.
    #[arg(long = "delay-max")]
    pub delay_max: Option<u64>,

    /// Re-authentications allowed in a row before giving up on a page.
    #[arg(long = "max-reauths")]
    pub max_reauths: Option<u32>,

    /// Path to configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Hide the progress bar.
    #[arg(long, short)]
    pub quiet: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(self, config: &mut Config) {
        if let Some(book) = self.book {
            config.book.detail_url = Some(book);
        }

        if let Some(login_url) = self.login_url {
            config.site.login_url = login_url;
        }

        if let Some(user_agent) = self.user_agent {
            config.site.user_agent = user_agent;
        }

        if let Some(dir) = self.output_directory {
            config.options.output_directory = Some(dir);
        }

        if let Some(min) = self.delay_min {
            config.options.page_delay_ms_min = min;
        }

        if let Some(max) = self.delay_max {
            config.options.page_delay_ms_max = max;
        }

        if let Some(limit) = self.max_reauths {
            config.options.max_consecutive_reauths = limit;
        }

        // Boolean flags (only override if set to non-default)
        if self.quiet {
            config.options.show_progress = false;
        }
    }
}
