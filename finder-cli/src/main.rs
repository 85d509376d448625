use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use colored::Colorize;
use finder::{Finder, SearchConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

mod output;

use output::{estimate_scan_time, format_file_size, print_results};

/// Ask before scanning contents when the collection exceeds either threshold.
const CONFIRM_FILE_THRESHOLD: usize = 100;
const CONFIRM_SIZE_THRESHOLD: u64 = 50 * 1024 * 1024; // 50 MiB

/// Find files by name and content.
#[derive(Parser, Debug)]
#[command(name = "ffind", version, about, long_about = None)]
struct Cli {
    /// Regular expression or literal string to search for
    pattern: Option<String>,

    /// Directory to search in
    #[arg(default_value = ".")]
    directory: PathBuf,

    /// Comma-separated file extensions (e.g. "js,ts,py"), or "source" for
    /// common source files (the default), or "all" for every file type
    #[arg(short = 't', long = "file-types")]
    file_types: Option<String>,

    /// Match file names only; skip the content scan
    #[arg(short = 'n', long)]
    name_only: bool,

    /// Match file contents only; skip name matching
    #[arg(short = 'c', long)]
    content_only: bool,

    /// Case-insensitive search
    #[arg(short = 'i', long)]
    ignore_case: bool,

    /// Show detailed output, including full per-file error reports
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Comma-separated directory names to exclude
    /// (default: version-control and dependency directories)
    #[arg(short = 'e', long)]
    exclude: Option<String>,

    /// Path to a YAML config file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let Some(pattern) = cli.pattern.clone() else {
        Cli::command().print_help()?;
        return Ok(ExitCode::FAILURE);
    };

    let file_config = match cli.config.as_deref() {
        Some(path) => SearchConfig::load_from(Some(path))
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => SearchConfig::load().unwrap_or_default(),
    };
    let config = file_config.merge_with_cli(cli_overrides(&cli));

    init_tracing(cli.verbose, &config.log_level);
    tracing::debug!("effective config: {config:?}");

    if !cli.directory.is_dir() {
        bail!(
            "directory {} does not exist or is not accessible",
            cli.directory.display()
        );
    }

    println!("Searching for {}", format!("{pattern:?}").cyan());
    println!("Directory: {}", cli.directory.display());
    if let Some(file_types) = &config.file_types {
        println!("File types: {file_types}");
    }
    if config.name_only {
        println!("Mode: name only");
    }

    // Copies for the event handlers; the config itself moves into the finder
    let name_only = config.name_only;
    let content_only = config.content_only;
    let scan_concurrency = config.max_content_concurrency.get();
    let verbose = cli.verbose;

    let mut finder = Finder::new(config);

    // Live discovery counter
    let discovered = Arc::new(AtomicUsize::new(0));
    let discovered_bytes = Arc::new(AtomicU64::new(0));
    {
        let discovered = discovered.clone();
        let discovered_bytes = discovered_bytes.clone();
        finder.events().on_file_found(move |record| {
            let count = discovered.fetch_add(1, Ordering::SeqCst) + 1;
            let bytes = discovered_bytes.fetch_add(record.size, Ordering::SeqCst) + record.size;
            print!("\rDiscovered {count} files, {} total", format_file_size(bytes));
            let _ = io::stdout().flush();
        });
    }

    finder.events().on_error(move |error| {
        if verbose {
            eprintln!("{} {error}", "search error:".red());
        } else {
            eprintln!("{} {error}", "warning:".yellow());
        }
    });

    // Checkpoint: discovery stats, scan estimate, and the confirmation prompt
    finder.events().on_collection_complete(move |stats, token| {
        println!("\n\nDiscovery complete:");
        println!("  files: {}", stats.total_files);
        println!("  size:  {}", format_file_size(stats.total_size));
        if stats.name_matches > 0 {
            println!("  name matches: {}", stats.name_matches);
        }
        if name_only || stats.total_files == 0 {
            return;
        }

        let estimate = estimate_scan_time(stats.total_files, stats.total_size, scan_concurrency);
        println!(
            "  estimated scan time: ~{}",
            humantime::format_duration(estimate)
        );

        if stats.total_files > CONFIRM_FILE_THRESHOLD || stats.total_size > CONFIRM_SIZE_THRESHOLD {
            let question = format!(
                "This will scan {} files for content. Continue?",
                stats.total_files
            );
            if !confirm(&question) {
                println!("{}", "Content scan cancelled".yellow());
                token.cancel();
            }
        }
    });

    // Progress bar for the content phase
    let bar: Arc<Mutex<Option<ProgressBar>>> = Arc::new(Mutex::new(None));
    {
        let bar = bar.clone();
        finder.events().on_content_search_started(move |&total| {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(
                ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            *bar.lock().unwrap() = Some(pb);
        });
    }
    {
        let bar = bar.clone();
        finder.events().on_progress(move |progress| {
            if let Some(pb) = bar.lock().unwrap().as_ref() {
                pb.set_position(progress.current as u64);
                if let Some(name) = progress.path.file_name().and_then(|n| n.to_str()) {
                    pb.set_message(name.to_string());
                }
            }
        });
    }

    let summary = finder.search(&pattern, &cli.directory)?;

    if let Some(pb) = bar.lock().unwrap().take() {
        pb.finish_and_clear();
    }
    print_results(&summary, name_only, content_only);

    Ok(ExitCode::SUCCESS)
}

/// Builds the CLI-derived configuration overlay.
fn cli_overrides(cli: &Cli) -> SearchConfig {
    let mut config = SearchConfig::default();
    if let Some(exclude) = &cli.exclude {
        let dirs: Vec<String> = exclude
            .split(',')
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .collect();
        if !dirs.is_empty() {
            config.exclude_dirs = dirs;
        }
    }
    config.file_types = cli.file_types.clone();
    config.name_only = cli.name_only;
    config.content_only = cli.content_only;
    config.ignore_case = cli.ignore_case;
    config
}

fn init_tracing(verbose: bool, log_level: &str) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Asks a yes/no question on stdin. Anything but an explicit yes declines,
/// including a closed stdin.
fn confirm(question: &str) -> bool {
    print!("{question} [y/N] ");
    let _ = io::stdout().flush();
    let mut answer = String::new();
    if io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
