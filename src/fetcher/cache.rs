//! On-disk layout of the rendered-page cache.
//!
//! One file per post under the author's subdirectory. Existence of the file
//! is the sole durability signal; there is no manifest.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Number of title characters kept in a cache file name.
const TITLE_CHARS: usize = 15;

/// Replace path-separator characters so a value is safe as a path segment.
fn sanitize_segment(raw: &str) -> String {
    raw.replace(['/', '\\'], "-")
}

/// Cache path for the post at `index` in the report sequence.
///
/// The file name embeds the report row index and a truncated title, so a
/// cache listing reads in report order.
#[must_use]
pub fn page_path(cache_dir: &Path, author: &str, index: usize, title: &str) -> PathBuf {
    let clean_title = sanitize_segment(title);
    let short: String = clean_title.chars().take(TITLE_CHARS).collect();
    let file_name = format!("{index}-{}.html", short.trim());
    cache_dir.join(sanitize_segment(author)).join(file_name)
}

/// Write `body` to `path` through a sibling temp file renamed into place, so
/// an interrupted run never leaves a partial page behind.
///
/// # Errors
///
/// Fails when the author directory cannot be created or the file cannot be
/// written or renamed.
pub async fn write_page(path: &Path, body: &str) -> Result<()> {
    let parent = path
        .parent()
        .context("cache path has no parent directory")?;
    tokio::fs::create_dir_all(parent)
        .await
        .with_context(|| format!("failed to create cache directory: {}", parent.display()))?;

    let tmp = path.with_extension("html.part");
    tokio::fs::write(&tmp, body)
        .await
        .with_context(|| format!("failed to write cache file: {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("failed to move cache file into place: {}", path.display()))?;
    Ok(())
}
