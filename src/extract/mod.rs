//! Comment extraction from cached rendered pages.

mod comments;

pub use comments::{extract_comments, normalize_commenter, CommentRecord};

use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read cached page: {0}")]
    Unreadable(#[source] std::io::Error),
    #[error("expected exactly one comment area, found {found}")]
    AmbiguousCommentArea { found: usize },
    #[error("found {labels} commenter labels but {bodies} comment bodies")]
    CommentCountMismatch { labels: usize, bodies: usize },
}

/// Tallies from one extraction pass over the cache.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractStats {
    pub files_scanned: usize,
    pub files_extracted: usize,
    pub ambiguous: usize,
    pub mismatched: usize,
    pub unreadable: usize,
}

/// Extract comment records from every regular file under `cache_dir`.
///
/// Files the extraction rules do not understand are logged and contribute
/// nothing; the scan itself keeps going. Order is sorted by file name so
/// reports are stable across runs.
pub fn scan_cache(cache_dir: &Path) -> (Vec<CommentRecord>, ExtractStats) {
    let mut stats = ExtractStats::default();
    let mut records = Vec::new();

    if !cache_dir.is_dir() {
        debug!(dir = %cache_dir.display(), "No cache directory to scan");
        return (records, stats);
    }

    for entry in WalkDir::new(cache_dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                stats.unreadable += 1;
                warn!("Skipping unreadable cache entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        stats.files_scanned += 1;
        let path = entry.path();
        match extract_file(path) {
            Ok(mut page_records) => {
                stats.files_extracted += 1;
                debug!(
                    path = %path.display(),
                    comments = page_records.len(),
                    "Extracted comments"
                );
                records.append(&mut page_records);
            }
            Err(ExtractError::AmbiguousCommentArea { found }) => {
                stats.ambiguous += 1;
                warn!(
                    path = %path.display(),
                    found, "Comment area not understood, excluding page"
                );
            }
            Err(ExtractError::CommentCountMismatch { labels, bodies }) => {
                stats.mismatched += 1;
                warn!(
                    path = %path.display(),
                    labels, bodies, "Comment counts disagree, excluding page"
                );
            }
            Err(ExtractError::Unreadable(e)) => {
                stats.unreadable += 1;
                warn!(path = %path.display(), "Unreadable cached page, excluding: {e}");
            }
        }
    }

    (records, stats)
}

fn extract_file(path: &Path) -> Result<Vec<CommentRecord>, ExtractError> {
    let html = std::fs::read_to_string(path).map_err(ExtractError::Unreadable)?;
    comments::extract_comments(&html)
}
