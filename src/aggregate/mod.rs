//! Per-author participation statistics.

use std::collections::BTreeMap;

use crate::export::{ExportComment, Post};

/// Aggregate participation row for one author identity.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AuthorStats {
    pub username: String,
    pub post_count: u64,
    pub post_total_len: u64,
    pub comment_count: u64,
    pub comment_total_len: u64,
    pub reply_count: u64,
    pub reply_total_len: u64,
}

/// CSV header for the aggregate report, matching the stats field order.
pub const AUTHOR_REPORT_HEADER: [&str; 7] = [
    "username",
    "postCount",
    "postTotalLen",
    "commentCount",
    "commentTotalLen",
    "replyCount",
    "replyTotalLen",
];

/// Author identity → stats, with rows created lazily on first reference.
///
/// Posts are keyed by the export's creator display name; export comments by
/// the commenter's email local part. Rendered-page commenter labels live in
/// a different identity space and never enter this table — they get their
/// own flat report instead of being silently merged here.
#[derive(Debug, Default)]
pub struct ParticipationTable {
    rows: BTreeMap<String, AuthorStats>,
}

impl ParticipationTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, username: &str) -> &mut AuthorStats {
        self.rows
            .entry(username.to_string())
            .or_insert_with(|| AuthorStats {
                username: username.to_string(),
                ..AuthorStats::default()
            })
    }

    /// Fold in one eligible post.
    pub fn record_post(&mut self, post: &Post) {
        let row = self.entry(&post.author);
        row.post_count += 1;
        row.post_total_len += post.content_len as u64;
    }

    /// Fold in one export comment; the parent id decides whether it counts
    /// as a top-level comment or a reply.
    pub fn record_comment(&mut self, comment: &ExportComment) {
        let row = self.entry(&comment.author);
        if comment.is_top_level() {
            row.comment_count += 1;
            row.comment_total_len += comment.content_len as u64;
        } else {
            row.reply_count += 1;
            row.reply_total_len += comment.content_len as u64;
        }
    }

    /// Rows in sorted author order.
    pub fn rows(&self) -> impl Iterator<Item = &AuthorStats> {
        self.rows.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
