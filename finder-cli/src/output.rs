use colored::Colorize;
use finder::SearchSummary;
use std::time::Duration;

/// Formats a byte count for humans (`1.5 MB` style).
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// Rough estimate of how long the content phase will take, from aggregate
/// file count and size. Parallel I/O sees diminishing returns, hence the
/// square root on the throughput term.
pub fn estimate_scan_time(total_files: usize, total_size: u64, concurrency: usize) -> Duration {
    if total_files == 0 {
        return Duration::ZERO;
    }
    let files = total_files as f64;
    let megabytes = total_size as f64 / (1024.0 * 1024.0);
    let workers = concurrency.clamp(1, total_files) as f64;
    let seconds = files / 150.0 / workers + megabytes / 10.0 / workers.sqrt() + files * 0.001;
    Duration::from_secs(seconds.ceil().max(1.0) as u64)
}

/// Prints the final result sections.
pub fn print_results(summary: &SearchSummary, name_only: bool, content_only: bool) {
    if !content_only && !summary.by_name.is_empty() {
        println!(
            "\n{} ({}):",
            "Files matching by name".bold(),
            summary.by_name.len()
        );
        for path in &summary.by_name {
            println!("  {}", path.display());
        }
    }

    if !name_only && !summary.by_content.is_empty() {
        println!(
            "\n{} ({}):",
            "Files matching by content".bold(),
            summary.by_content.len()
        );
        for path in &summary.by_content {
            println!("  {}", path.display());
        }
    }

    let total = summary.total_matches();
    if total == 0 {
        println!("\n{}", "No matches found".red());
    } else {
        println!(
            "\n{} {} file{} found",
            "Total:".green().bold(),
            total,
            if total == 1 { "" } else { "s" }
        );
    }
}
