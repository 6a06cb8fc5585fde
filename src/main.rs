//! condorview executable entry point.
//!
//! This binary uses the `condorview` library to:
//! 1. Parse command-line arguments.
//! 2. Fetch the key listing from the store and rebuild the folder tree.
//! 3. Render the page for a location, perform the click action of a file, or
//!    export every folder page as a static site.

use clap::{Parser, Subcommand};
use human_bytes::human_bytes;

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

use condorview::logging::{init_logging, LogFormat, LoggingConfig};
use condorview::{
    export_site, ActionOutcome, Explorer, HtmlRenderer, LocalBrowser, PageFormat, StoreConfig,
};

/// Separator string used for console output sections.
const SECTION_SEPARATOR: &str =
    "==========================================================================================";

// --- Command Line Argument Definition ---
/// Command-line arguments accepted by condorview, powered by `clap`.
#[derive(Parser, Debug)]
#[command(version, about = "Browse competition result files stored behind a key-value endpoint.", long_about = None)]
struct Args {
    /// Base URL of the store endpoint. Listing is `<base>?list=1`, files are `<base>?file=<key>`.
    /// Can also be set via the `CONDORVIEW_BASE_URL` environment variable.
    #[arg(long, short = 'b', env = "CONDORVIEW_BASE_URL")]
    base_url: String,

    /// Log filter (trace, debug, info, warn, error, off, or an EnvFilter expression).
    /// Can also be set via the `CONDORVIEW_LOG` environment variable.
    #[arg(long, default_value = "warn", env = "CONDORVIEW_LOG")]
    log_level: String,

    /// Log output format.
    /// Can also be set via the `CONDORVIEW_LOG_FORMAT` environment variable.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, env = "CONDORVIEW_LOG_FORMAT")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the page for a location path such as `/2024/day1`.
    Page {
        /// Location path; the root when omitted.
        #[arg(default_value = "/")]
        location: String,

        /// Output format.
        #[arg(long, short = 'f', value_enum, default_value_t = PageFormat::Html)]
        format: PageFormat,

        /// Write the page to this file instead of stdout.
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// Do what clicking a file does: follow, open, download, or show it.
    Open {
        /// Full key of the file, e.g. `2024/day1/summary.xlsx`.
        key: String,

        /// Directory downloads are saved into.
        /// Can also be set via the `CONDORVIEW_DOWNLOAD_DIR` environment variable.
        #[arg(long, short = 'd', default_value = ".", env = "CONDORVIEW_DOWNLOAD_DIR")]
        download_dir: PathBuf,
    },
    /// Write an `index.html` for the root and every folder.
    Export {
        /// Directory the site is written to.
        /// Can also be set via the `CONDORVIEW_OUTPUT` environment variable.
        #[arg(long, short = 'o', default_value = "./site", env = "CONDORVIEW_OUTPUT")]
        output: PathBuf,

        /// Remove the output directory before writing.
        /// Can also be set via the `CONDORVIEW_CLEAN_OUTPUT` environment variable.
        #[arg(long, short = 'k', default_value_t = true, action = clap::ArgAction::Set, env = "CONDORVIEW_CLEAN_OUTPUT")]
        clean: bool,
    },
}

/// Main application entry point.
///
/// # Returns
/// * `Ok(())` when the command completed.
/// * `Err(Box<dyn std::error::Error>)` when logging could not be set up, output
///   could not be written, or the requested file action failed. Store failures
///   during page rendering are logged and shown as "No files found." instead.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    init_logging(&LoggingConfig {
        level: args.log_level.clone(),
        format: args.log_format,
    })?;

    let explorer = Explorer::http(StoreConfig::new(args.base_url.clone()));

    match args.command {
        Command::Page {
            location,
            format,
            output,
        } => {
            let page = explorer.load_page(&location).await;
            let document = format.renderer().render(&page);
            match output {
                Some(path) => {
                    fs::write(&path, &document)?;
                    eprintln!(
                        "Page for '{}' written to '{}' ({})",
                        location,
                        path.display(),
                        human_bytes(document.len() as f64)
                    );
                }
                None => print!("{}", document),
            }
            Ok(())
        }
        Command::Open { key, download_dir } => {
            let mut browser = LocalBrowser::new(download_dir, io::stdout());
            match explorer.open(&key, &mut browser).await {
                ActionOutcome::Failed => Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!("Could not open '{}'. Check the log output above.", key),
                )
                .into()),
                ActionOutcome::InlineImage(src) => {
                    println!("Image shown inline: {}", src);
                    Ok(())
                }
                _ => Ok(()),
            }
        }
        Command::Export { output, clean } => {
            println!("Starting condorview export...");
            println!("{SECTION_SEPARATOR}");
            println!("Configuration:");
            println!("  Store: {}", args.base_url);
            println!("  Output Directory: {}", output.display());
            println!("  Clean Output Dir: {}", clean);
            println!("{SECTION_SEPARATOR}");
            let start = Instant::now();

            if clean && output.exists() {
                println!("Cleaning output directory '{}'...", output.display());
                fs::remove_dir_all(&output)?;
            }
            fs::create_dir_all(&output)?;

            println!("Fetching key listing...");
            let tree = match explorer.load_tree().await {
                Some(tree) => tree,
                None => {
                    return Err(io::Error::new(
                        io::ErrorKind::Other,
                        "Key listing unavailable; nothing exported.",
                    )
                    .into())
                }
            };
            println!("Found {} files.", tree.leaf_paths().len());

            let summary = export_site(&tree, explorer.config(), &HtmlRenderer::default(), &output)?;
            println!("{SECTION_SEPARATOR}");
            println!("Export Summary:");
            println!("  Pages written: {}", summary.pages);
            if summary.skipped > 0 {
                println!("  Folders skipped (unusable names): {}", summary.skipped);
            }
            println!("  Total size: {}", human_bytes(summary.bytes as f64));
            println!("  Total execution time: {:.2}s", start.elapsed().as_secs_f32());
            println!("{SECTION_SEPARATOR}");
            Ok(())
        }
    }
}
