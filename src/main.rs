//! CLI entry point for the gallery downloader.

use anyhow::{Result, bail};
use clap::Parser;
use gallery_core::{GalleryProcessor, ProcessOptions, ProgressReporter, cdn, http};
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    // Validate input selection before touching the network.
    if args.url.is_none() && args.file.is_none() {
        bail!("no URL or file provided; pass -u <url> or -f <file>");
    }
    if args.url.is_some() && args.file.is_some() {
        bail!("provide either a single URL or a file of URLs, not both");
    }

    let urls: Vec<String> = match (&args.url, &args.file) {
        (Some(url), None) => vec![url.clone()],
        (None, Some(path)) => {
            if !path.is_file() {
                bail!("file {} does not exist", path.display());
            }
            std::fs::read_to_string(path)?
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(ToString::to_string)
                .collect()
        }
        _ => unreachable!("validated above"),
    };

    if urls.is_empty() {
        info!("no URLs to process");
        return Ok(());
    }

    let session = http::build_session()?;
    let cdn_hosts = cdn::fetch_cdn_hosts(&session).await;
    info!(urls = urls.len(), cdn_hosts = cdn_hosts.len(), "starting");

    let progress = if args.quiet {
        ProgressReporter::disabled()
    } else {
        ProgressReporter::new()
    };

    let options = ProcessOptions {
        retries: args.retries,
        extensions: args.extensions,
        export_only: args.export,
        base_path: args.path,
    };

    let processor = GalleryProcessor::new(session, cdn_hosts, options, progress);
    processor.run_batch(&urls).await;

    Ok(())
}
