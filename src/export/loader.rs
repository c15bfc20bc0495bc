use std::path::Path;

use chrono::NaiveDateTime;
use roxmltree::{Document, Node};
use thiserror::Error;
use tracing::{debug, error, warn};

use super::{ExportComment, Post, PostStatus, PostType, NS_CONTENT, NS_DC, NS_WP};
use crate::markup;

/// Format of `wp:post_date` values.
const POST_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to read export file: {0}")]
    Read(#[source] std::io::Error),
    #[error("export document is not well-formed XML: {0}")]
    Malformed(#[source] roxmltree::Error),
    #[error("export channel contains no items")]
    NoItems,
}

/// Per-item tallies from one load pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadStats {
    pub items_seen: usize,
    pub posts: usize,
    pub pages: usize,
    pub other_types: usize,
    /// Items excluded for missing or unusable required fields.
    pub missing_fields: usize,
    /// Published posts whose body stripped down to nothing.
    pub empty_content: usize,
    pub comments_seen: usize,
    pub comments_skipped: usize,
}

/// The parsed export: post records in document order plus load tallies.
#[derive(Debug)]
pub struct Export {
    pub posts: Vec<Post>,
    pub stats: LoadStats,
}

/// Load and parse the export document at `path`.
///
/// # Errors
///
/// Fails when the file cannot be read, is not well-formed XML, or holds no
/// items; per-item problems are logged and counted instead.
pub fn load_export(path: &Path) -> Result<Export, ExportError> {
    let text = std::fs::read_to_string(path).map_err(ExportError::Read)?;
    parse_export(&text)
}

/// Parse an export document from memory.
///
/// # Errors
///
/// Same contract as [`load_export`], minus the file read.
pub fn parse_export(text: &str) -> Result<Export, ExportError> {
    let doc = Document::parse(text).map_err(ExportError::Malformed)?;
    let channel = doc
        .root_element()
        .children()
        .find(|n| n.has_tag_name("channel"))
        .ok_or(ExportError::NoItems)?;

    let mut stats = LoadStats::default();
    let mut posts = Vec::new();

    for item in channel.children().filter(|n| n.has_tag_name("item")) {
        stats.items_seen += 1;
        if let Some(post) = parse_item(item, &mut stats) {
            posts.push(post);
        }
    }

    if stats.items_seen == 0 {
        return Err(ExportError::NoItems);
    }

    debug!(
        posts = stats.posts,
        pages = stats.pages,
        other = stats.other_types,
        "Export item types"
    );

    Ok(Export { posts, stats })
}

fn parse_item(item: Node<'_, '_>, stats: &mut LoadStats) -> Option<Post> {
    let post_type =
        PostType::from_wxr(&ns_child_text(item, NS_WP, "post_type").unwrap_or_default());
    match post_type {
        PostType::Post => stats.posts += 1,
        PostType::Page => stats.pages += 1,
        PostType::Other => stats.other_types += 1,
    }
    let status = PostStatus::from_wxr(&ns_child_text(item, NS_WP, "status").unwrap_or_default());

    let title = child_text(item, "title");
    let author = ns_child_text(item, NS_DC, "creator");

    // Author and title attribution is mandatory downstream; a publishable
    // post without them points at a broken export rather than a draft.
    if post_type == PostType::Post && status == PostStatus::Publish {
        if title.is_none() || author.is_none() {
            error!(
                title = title.as_deref().unwrap_or("<missing>"),
                "Publishable post is missing title or creator, excluding"
            );
            stats.missing_fields += 1;
            return None;
        }
    } else if title.is_none() || author.is_none() {
        debug!("Item missing title or creator, excluding");
        stats.missing_fields += 1;
        return None;
    }
    let (title, author) = (title?, author?);

    let Some(date_raw) = ns_child_text(item, NS_WP, "post_date") else {
        warn!(title = %title, "Item missing publish date, excluding");
        stats.missing_fields += 1;
        return None;
    };
    let Ok(published_at) = NaiveDateTime::parse_from_str(date_raw.trim(), POST_DATE_FORMAT) else {
        warn!(title = %title, date = %date_raw, "Unparseable publish date, excluding");
        stats.missing_fields += 1;
        return None;
    };

    let Some(link) = child_text(item, "link") else {
        warn!(title = %title, "Item missing link, excluding");
        stats.missing_fields += 1;
        return None;
    };
    let url = link.trim().to_string();
    if url::Url::parse(&url).is_err() {
        warn!(title = %title, url = %url, "Item link is not an absolute URL, excluding");
        stats.missing_fields += 1;
        return None;
    }

    let content = ns_child_text(item, NS_CONTENT, "encoded").unwrap_or_default();
    let content_len = markup::text_len(&content);
    if content_len == 0 && post_type == PostType::Post && status == PostStatus::Publish {
        warn!(title = %title, "Post body has no text content");
        stats.empty_content += 1;
    }

    let comments = parse_comments(item, stats);

    Some(Post {
        author,
        title,
        published_at,
        url,
        content_len,
        post_type,
        status,
        comments,
    })
}

fn parse_comments(item: Node<'_, '_>, stats: &mut LoadStats) -> Vec<ExportComment> {
    let mut comments = Vec::new();
    for node in item.children().filter(|n| n.has_tag_name((NS_WP, "comment"))) {
        stats.comments_seen += 1;
        match parse_comment(node) {
            Some(comment) => comments.push(comment),
            None => {
                stats.comments_skipped += 1;
                debug!("Comment entry missing author email, content, or parent id, excluding");
            }
        }
    }
    comments
}

fn parse_comment(node: Node<'_, '_>) -> Option<ExportComment> {
    let email = ns_child_text(node, NS_WP, "comment_author_email")?;
    let author = email
        .trim()
        .split('@')
        .next()
        .unwrap_or_default()
        .to_string();
    if author.is_empty() {
        return None;
    }
    let content = ns_child_text(node, NS_WP, "comment_content")?;
    let parent_id = ns_child_text(node, NS_WP, "comment_parent")?
        .trim()
        .parse()
        .ok()?;
    Some(ExportComment {
        author,
        content_len: content.chars().count(),
        parent_id,
    })
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

fn ns_child<'a, 'input>(
    node: Node<'a, 'input>,
    ns: &'static str,
    name: &str,
) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name((ns, name)))
}

/// Concatenated text of an element's direct text and CDATA children.
fn element_text(node: Node<'_, '_>) -> Option<String> {
    let text: String = node
        .children()
        .filter(roxmltree::Node::is_text)
        .filter_map(|n| n.text())
        .collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn child_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    child(node, name).and_then(element_text)
}

fn ns_child_text(node: Node<'_, '_>, ns: &'static str, name: &str) -> Option<String> {
    ns_child(node, ns, name).and_then(element_text)
}
