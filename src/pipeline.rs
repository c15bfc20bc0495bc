//! End-to-end pipeline: load → report → fetch → extract → aggregate.

use anyhow::{Context, Result};
use tracing::info;

use crate::aggregate::ParticipationTable;
use crate::config::Config;
use crate::export::{self, LoadStats, Post};
use crate::extract::{self, ExtractStats};
use crate::fetcher::{FetchSummary, PageFetcher};
use crate::report;

/// Counts of everything the run saw, produced, and skipped, reported at the
/// end so operators can gauge data completeness.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub load: LoadStats,
    pub posts_reported: usize,
    pub posts_excluded: usize,
    pub fetch: FetchSummary,
    pub extract: ExtractStats,
    pub comment_records: usize,
    pub comments_below_cutoff: usize,
    pub export_comments_counted: usize,
    pub export_comments_below_cutoff: usize,
    pub authors: usize,
}

/// Run the whole pipeline under one configuration.
///
/// # Errors
///
/// Fails only on document-level structural faults: an unreadable or
/// malformed export, zero items, or an unwritable report destination.
/// Per-item faults are logged, counted, and survived.
pub async fn run(config: &Config) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    info!(path = %config.export_path.display(), "Scanning export for posts");
    let export = export::load_export(&config.export_path)
        .with_context(|| format!("failed to load export: {}", config.export_path.display()))?;
    summary.load = export.stats.clone();

    let reportable: Vec<Post> = export
        .posts
        .iter()
        .filter(|p| p.is_reportable(config))
        .cloned()
        .collect();
    summary.posts_reported = reportable.len();
    summary.posts_excluded = export.posts.len() - reportable.len();

    report::write_post_report(&config.post_report_path, &reportable)?;

    info!(posts = reportable.len(), "Downloading rendered pages");
    let fetcher = PageFetcher::new(config)?;
    summary.fetch = fetcher.fetch_all(&reportable).await;

    info!(dir = %config.cache_dir.display(), "Scanning cached pages for comments");
    let (mut records, extract_stats) = extract::scan_cache(&config.cache_dir);
    summary.extract = extract_stats;

    let before = records.len();
    records.retain(|r| r.content_len >= config.min_content_len);
    summary.comments_below_cutoff = before - records.len();
    summary.comment_records = records.len();

    report::write_comment_report(&config.comment_report_path, &records)?;

    let mut table = ParticipationTable::new();
    for post in &reportable {
        table.record_post(post);
        for comment in &post.comments {
            if comment.content_len >= config.min_content_len {
                table.record_comment(comment);
                summary.export_comments_counted += 1;
            } else {
                summary.export_comments_below_cutoff += 1;
            }
        }
    }
    summary.authors = table.len();
    report::write_author_report(&config.author_report_path, &table)?;

    log_summary(&summary);
    Ok(summary)
}

fn log_summary(summary: &RunSummary) {
    info!(
        items = summary.load.items_seen,
        item_skips = summary.load.missing_fields,
        empty_posts = summary.load.empty_content,
        posts = summary.posts_reported,
        posts_excluded = summary.posts_excluded,
        fetched = summary.fetch.fetched,
        cached = summary.fetch.already_cached,
        fetch_skipped = summary.fetch.skipped,
        fetch_failed = summary.fetch.failed,
        pages_scanned = summary.extract.files_scanned,
        pages_extracted = summary.extract.files_extracted,
        pages_ambiguous = summary.extract.ambiguous,
        pages_mismatched = summary.extract.mismatched,
        comment_records = summary.comment_records,
        comments_below_cutoff = summary.comments_below_cutoff,
        export_comments = summary.export_comments_counted,
        export_comments_below_cutoff = summary.export_comments_below_cutoff,
        authors = summary.authors,
        "Run complete"
    );
}
