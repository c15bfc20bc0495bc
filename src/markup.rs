//! Text extraction from markup fragments.

use scraper::Html;

/// Concatenated text content of a markup fragment; tags contribute nothing.
#[must_use]
pub fn fragment_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    fragment.root_element().text().collect()
}

/// Text-only length of a markup fragment, in characters.
///
/// Both export post bodies (CDATA-wrapped markup) and rendered-page blocks
/// are measured through here, so "length" means the same thing everywhere.
#[must_use]
pub fn text_len(html: &str) -> usize {
    fragment_text(html).chars().count()
}
