//! Apabi Downloader - CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use apabi_downloader::{
    api::ApabiClient,
    book::BookTarget,
    cli::Args,
    config::{validate_config, Config},
    download::{DownloadDriver, DownloadState, DriverOptions, SystemClock},
    error::{exit_codes, Error, Result},
    fs::{get_book_folder, DirPageStore},
    output::{
        create_page_bar, print_banner, print_book_stats, print_config_summary, print_error,
        print_info, print_success, print_warning,
    },
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(_) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            match e {
                Error::Config(_)
                | Error::ConfigValidation { .. }
                | Error::MissingConfig(_)
                | Error::TomlParse(_)
                | Error::InvalidFilename(_) => ExitCode::from(exit_codes::CONFIG_ERROR as u8),
                Error::Authentication(_)
                | Error::MissingField { .. }
                | Error::Parse(_)
                | Error::ReauthLimit(_)
                | Error::UnexpectedStatus { .. }
                | Error::Http(_) => ExitCode::from(exit_codes::API_ERROR as u8),
                Error::Storage { .. } => ExitCode::from(exit_codes::DOWNLOAD_ERROR as u8),
                _ => ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8),
            }
        }
    }
}

async fn run() -> Result<DownloadState> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    print_banner();

    // Load configuration
    let config_path = args.config.clone();
    let mut config = if config_path.exists() {
        Config::load(&config_path)?
    } else {
        print_warning(&format!(
            "Configuration file not found: {}",
            config_path.display()
        ));
        print_info("Using default configuration with CLI arguments");
        Config::default()
    };

    // Merge CLI arguments into config
    args.merge_into_config(&mut config);

    validate_config(&config)?;

    let target = BookTarget::from_detail_url(config.detail_url()?)?;
    let book_dir = get_book_folder(&config, &target);
    print_config_summary(
        target.detail_url().as_str(),
        target.directory_key(),
        &book_dir.display().to_string(),
    );

    // The directory must exist before anything goes over the network.
    let store = DirPageStore::open(&book_dir, config.options.image_extension.clone())?;

    let client = ApabiClient::new(&config.site)?;
    let options = DriverOptions::from_config(&config)?;

    let mut driver = DownloadDriver::new(&client, &store, &SystemClock, &target, options);
    if config.options.show_progress {
        driver = driver.with_progress(create_page_bar(target.directory_key()));
    }

    let mut state = driver.run().await?;
    state.download_path = Some(store.dir().to_path_buf());

    print_book_stats(&state);
    print_success(&format!(
        "All pages of {} are in {}",
        target.directory_key(),
        store.dir().display()
    ));

    Ok(state)
}
