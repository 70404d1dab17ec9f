//! Statistics reporting.

use console::style;

use crate::download::DownloadState;

/// Print statistics for a finished book.
pub fn print_book_stats(state: &DownloadState) {
    let title = state.book_name.as_deref().unwrap_or(&state.book_key);

    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style(format!("Statistics for {}:", title)).bold());
    if let Some(creator) = state.creator.as_deref() {
        println!("  Creator:            {}", creator);
    }
    if let Some(path) = state.download_path.as_deref() {
        println!("  Directory:          {}", path.display());
    }
    match state.page_total {
        Some(total) => println!("  Pages:              {}", total),
        None => println!("  Pages:              unknown"),
    }
    println!("  Already present:    {}", state.already_present);
    println!(
        "  Downloaded:         {}",
        style(state.downloaded_count()).green()
    );
    println!("  Logins:             {}", state.logins);
    if state.reauthentications > 0 {
        println!(
            "  Re-authentications: {} ({} denied)",
            style(state.reauthentications).yellow(),
            state.denied
        );
    }
    println!("{}", style("═".repeat(50)).dim());
}
