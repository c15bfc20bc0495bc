//! Selector rules for the two known comment theme layouts.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::ExtractError;

/// Container variants for the comment area, one per known theme.
const AREA_SELECTORS: &[&str] = &["div#comments", "div#commentsbox"];

/// Body-block variants, tried in order; the first with matches wins.
const BODY_SELECTORS: &[&str] = &["div.comment-content", "div.comment-body"];

/// Commenter labels carry a vcard class in both themes.
const LABEL_SELECTOR: &str = "div.vcard";

static SAID_BOILERPLATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" on .*? at .*? said:").expect("valid regex"));

/// One extracted comment: who wrote it and how long it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRecord {
    pub commenter: String,
    pub content_len: usize,
}

/// Extract all comment records from one rendered page.
///
/// # Errors
///
/// Fails when the page has no single recognizable comment area, or when the
/// commenter-label count disagrees with the body count. A page the rules do
/// not understand contributes nothing rather than partial attributions.
pub fn extract_comments(html: &str) -> Result<Vec<CommentRecord>, ExtractError> {
    let document = Html::parse_document(html);
    let area = find_comment_area(&document)?;

    let bodies = select_bodies(area);
    let labels = select_labels(area);

    if labels.len() != bodies.len() {
        return Err(ExtractError::CommentCountMismatch {
            labels: labels.len(),
            bodies: bodies.len(),
        });
    }

    Ok(labels
        .into_iter()
        .zip(bodies)
        .map(|(label, body)| CommentRecord {
            commenter: normalize_commenter(&element_text(label)),
            content_len: element_text(body).chars().count(),
        })
        .collect())
}

fn find_comment_area(document: &Html) -> Result<ElementRef<'_>, ExtractError> {
    let mut matches = Vec::new();
    for pattern in AREA_SELECTORS {
        let selector = Selector::parse(pattern).expect("valid selector");
        matches.extend(document.select(&selector));
    }
    match matches.as_slice() {
        [area] => Ok(*area),
        found => Err(ExtractError::AmbiguousCommentArea { found: found.len() }),
    }
}

fn select_bodies(area: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    for pattern in BODY_SELECTORS {
        let selector = Selector::parse(pattern).expect("valid selector");
        let found: Vec<_> = area.select(&selector).collect();
        if !found.is_empty() {
            return found;
        }
    }
    Vec::new()
}

fn select_labels(area: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let selector = Selector::parse(LABEL_SELECTOR).expect("valid selector");
    area.select(&selector).collect()
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

/// Strip theme boilerplate from a commenter label.
///
/// Both themes decorate the vcard with either a `says:` suffix or an
/// `on <date> at <time> said:` phrase; neither is part of the identity.
#[must_use]
pub fn normalize_commenter(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed.strip_suffix(" says:").unwrap_or(&collapsed);
    SAID_BOILERPLATE.replace_all(trimmed, "").trim().to_string()
}
