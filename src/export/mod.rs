//! WXR export loading.
//!
//! A WordPress export ("WXR") is an RSS channel whose `<item>` elements carry
//! post metadata and nested comment threads under extension namespaces.

mod loader;

pub use loader::{load_export, parse_export, Export, ExportError, LoadStats};

use chrono::NaiveDateTime;

use crate::config::Config;

/// XML namespaces used by the export format.
pub(crate) const NS_CONTENT: &str = "http://purl.org/rss/1.0/modules/content/";
pub(crate) const NS_WP: &str = "http://wordpress.org/export/1.2/";
pub(crate) const NS_DC: &str = "http://purl.org/dc/elements/1.1/";

/// Declared type of an export item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostType {
    Post,
    Page,
    Other,
}

impl PostType {
    fn from_wxr(raw: &str) -> Self {
        match raw {
            "post" => Self::Post,
            "page" => Self::Page,
            _ => Self::Other,
        }
    }
}

/// Publication status of an export item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStatus {
    Publish,
    Draft,
    Other,
}

impl PostStatus {
    fn from_wxr(raw: &str) -> Self {
        match raw {
            "publish" => Self::Publish,
            "draft" => Self::Draft,
            _ => Self::Other,
        }
    }
}

/// One comment thread entry from the export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportComment {
    /// Local part of the comment author's email address.
    pub author: String,
    /// Length of the comment body, in characters.
    pub content_len: usize,
    /// Parent comment id; zero marks a top-level comment.
    pub parent_id: u64,
}

impl ExportComment {
    /// Whether this entry is a top-level comment rather than a reply.
    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.parent_id == 0
    }
}

/// Canonical record for one export item, in export document order.
#[derive(Debug, Clone)]
pub struct Post {
    pub author: String,
    pub title: String,
    pub published_at: NaiveDateTime,
    pub url: String,
    /// Text-only length of the post body, markup stripped.
    pub content_len: usize,
    pub post_type: PostType,
    pub status: PostStatus,
    pub comments: Vec<ExportComment>,
}

impl Post {
    /// Whether this post belongs in the reports under the given
    /// configuration: a published post at or after the date cutoff with a
    /// body at least the minimum length.
    #[must_use]
    pub fn is_reportable(&self, config: &Config) -> bool {
        self.post_type == PostType::Post
            && self.status == PostStatus::Publish
            && self.published_at >= config.oldest_post
            && self.content_len >= config.min_content_len
    }
}
