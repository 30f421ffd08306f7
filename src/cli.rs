//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use gallery_core::DEFAULT_MAX_ATTEMPTS;

/// Resolve gallery pages into direct file URLs and download them concurrently.
///
/// Give either a single gallery URL or a file with one URL per line;
/// each gallery lands in its own album directory with a ledger that
/// keeps reruns from downloading the same file twice.
#[derive(Parser, Debug)]
#[command(name = "gallery-downloader")]
#[command(author, version, about)]
pub struct Args {
    /// Gallery URL to fetch
    #[arg(short = 'u', long = "url")]
    pub url: Option<String>,

    /// File with a newline-delimited list of gallery URLs
    #[arg(short = 'f', long = "file")]
    pub file: Option<PathBuf>,

    /// Download attempts per file before giving up
    #[arg(short = 'r', long = "retries", default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub retries: u32,

    /// Comma-separated extension allow-list (e.g. ".jpg,.mp4"); empty accepts all
    #[arg(short = 'e', long = "extensions", default_value = "")]
    pub extensions: String,

    /// Custom base download directory (default: ./downloads)
    #[arg(short = 'p', long = "path")]
    pub path: Option<PathBuf>,

    /// Export resolved URLs to url_list.txt instead of downloading
    #[arg(short = 'w', long = "export")]
    pub export: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
