//! CSV report emission.
//!
//! Reports are plain comma-separated files with RFC-4180 quoting, truncated
//! and rewritten on every run.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::aggregate::{ParticipationTable, AUTHOR_REPORT_HEADER};
use crate::export::Post;
use crate::extract::CommentRecord;

/// Header of the per-post report.
const POST_REPORT_HEADER: [&str; 5] = ["author", "date", "length", "title", "link"];

/// Header of the flat rendered-page comment report.
const COMMENT_REPORT_HEADER: [&str; 2] = ["Commenter", "Length"];

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write one CSV row, quoting fields that need it.
fn write_row<W: Write>(w: &mut W, row: &[&str]) -> io::Result<()> {
    let mut first = true;
    for field in row {
        if !first {
            write!(w, ",")?;
        }
        first = false;
        if needs_quotes(field) {
            write!(w, "\"{}\"", field.replace('"', "\"\""))?;
        } else {
            write!(w, "{field}")?;
        }
    }
    writeln!(w)
}

fn create_report(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path)
        .with_context(|| format!("failed to create report file: {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Write the per-post report; one row per post, export order preserved.
///
/// # Errors
///
/// Fails when the destination cannot be created or written.
pub fn write_post_report(path: &Path, posts: &[Post]) -> Result<usize> {
    let mut w = create_report(path)?;
    write_row(&mut w, &POST_REPORT_HEADER)?;
    for post in posts {
        let date = post.published_at.format("%Y-%m-%d %H:%M:%S").to_string();
        let length = post.content_len.to_string();
        write_row(&mut w, &[&post.author, &date, &length, &post.title, &post.url])?;
    }
    w.flush()?;
    info!(rows = posts.len(), path = %path.display(), "Wrote post report");
    Ok(posts.len())
}

/// Write the flat rendered-page comment report.
///
/// # Errors
///
/// Fails when the destination cannot be created or written.
pub fn write_comment_report(path: &Path, records: &[CommentRecord]) -> Result<usize> {
    let mut w = create_report(path)?;
    write_row(&mut w, &COMMENT_REPORT_HEADER)?;
    for record in records {
        write_row(&mut w, &[&record.commenter, &record.content_len.to_string()])?;
    }
    w.flush()?;
    info!(rows = records.len(), path = %path.display(), "Wrote comment report");
    Ok(records.len())
}

/// Write the per-author aggregate report, header first.
///
/// # Errors
///
/// Fails when the destination cannot be created or written.
pub fn write_author_report(path: &Path, table: &ParticipationTable) -> Result<usize> {
    let mut w = create_report(path)?;
    write_row(&mut w, &AUTHOR_REPORT_HEADER)?;
    for row in table.rows() {
        write_row(
            &mut w,
            &[
                &row.username,
                &row.post_count.to_string(),
                &row.post_total_len.to_string(),
                &row.comment_count.to_string(),
                &row.comment_total_len.to_string(),
                &row.reply_count.to_string(),
                &row.reply_total_len.to_string(),
            ],
        )?;
    }
    w.flush()?;
    info!(rows = table.len(), path = %path.display(), "Wrote author report");
    Ok(table.len())
}
