//! Element lookup in parsed HTML documents.
//!
//! The login page is only ever queried for one thing: an element identified
//! by tag and attribute value, and one attribute read off it.

use scraper::{Html, Selector};

/// Find the first `<tag>` whose `key` attribute equals `value`, and return its
/// `wanted` attribute.
///
/// Returns `None` if no such element exists or it lacks `wanted`. Entity
/// references in the attribute (`&amp;` and friends) are decoded.
#[must_use]
pub fn find_element_attribute(
    document: &str,
    tag: &str,
    (key, value): (&str, &str),
    wanted: &str,
) -> Option<String> {
    let selector = Selector::parse(tag).ok()?;
    let document = Html::parse_document(document);

    document
        .select(&selector)
        .find(|element| element.value().attr(key) == Some(value))
        .and_then(|element| element.value().attr(wanted))
        .map(ToString::to_string)
}
