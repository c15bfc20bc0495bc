use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wxr_reporter::config::{
    Config, DEFAULT_MIN_CONTENT_LEN, DEFAULT_OLDEST_POST, DEFAULT_POLITENESS_DELAY_SECS,
};
use wxr_reporter::pipeline;

/// Create blog participation reports from a WordPress export (WXR).
#[derive(Parser)]
#[command(name = "wxr-reporter", version, about)]
struct Cli {
    /// The XML file exported from the blog
    export: PathBuf,

    /// Destination CSV file for the post report
    #[arg(long, default_value = "postReport.csv")]
    post_report: PathBuf,

    /// Directory where rendered pages are downloaded and analyzed
    #[arg(long, default_value = "postData")]
    cache_dir: PathBuf,

    /// Destination CSV file for the rendered-page comment report
    #[arg(long, default_value = "commentReport.csv")]
    comment_report: PathBuf,

    /// Destination CSV file for the per-author aggregate report
    #[arg(long, default_value = "authorReport.csv")]
    author_report: PathBuf,

    /// Seconds to wait between consecutive page fetches
    #[arg(long, default_value_t = DEFAULT_POLITENESS_DELAY_SECS)]
    politeness_delay: f64,

    /// Exclude posts published before this date
    #[arg(long, default_value = DEFAULT_OLDEST_POST)]
    oldest_post: NaiveDate,

    /// Exclude posts and comments with fewer text characters than this
    #[arg(long, default_value_t = DEFAULT_MIN_CONTENT_LEN)]
    min_content_len: usize,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config = build_config(cli)?;
    config.validate().context("Invalid configuration")?;

    info!(export = %config.export_path.display(), "Starting participation report");
    let summary = pipeline::run(&config).await?;

    info!(
        posts = summary.posts_reported,
        comment_records = summary.comment_records,
        authors = summary.authors,
        "Done, see results in the output CSV files"
    );
    Ok(())
}

fn build_config(cli: Cli) -> Result<Config> {
    if !cli.politeness_delay.is_finite() || cli.politeness_delay < 0.0 {
        anyhow::bail!("politeness delay must be a non-negative number of seconds");
    }
    let oldest_post = cli
        .oldest_post
        .and_hms_opt(0, 0, 0)
        .context("invalid date cutoff")?;
    Ok(Config {
        export_path: cli.export,
        post_report_path: cli.post_report,
        cache_dir: cli.cache_dir,
        comment_report_path: cli.comment_report,
        author_report_path: cli.author_report,
        politeness_delay: Duration::from_secs_f64(cli.politeness_delay),
        oldest_post,
        min_content_len: cli.min_content_len,
    })
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default_filter = if verbose {
        "info,wxr_reporter=debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    Ok(())
}
