//! Header locator

use masthead_dom::Document;
use tracing::debug;

/// Find the header element to manage
///
/// Selectors are tried in order. For each, the first visible match wins; if
/// none of its matches is visible the first match is taken anyway. Invalid
/// selectors are skipped. When the whole list comes up empty the document's
/// `header` elements are tried the same way.
pub fn locate_header<D: Document, S: AsRef<str>>(doc: &D, selectors: &[S]) -> Option<D::Element> {
    for selector in selectors {
        let selector = selector.as_ref();
        let matches = match doc.query_selector_all(selector) {
            Ok(matches) => matches,
            Err(e) => {
                debug!("Skipping header selector {:?}: {}", selector, e);
                continue;
            }
        };

        if let Some(&visible) = matches.iter().find(|&&el| doc.is_visible(el)) {
            return Some(visible);
        }
        if let Some(&first) = matches.first() {
            debug!("No visible match for {:?}, using the first one", selector);
            return Some(first);
        }
    }

    let fallback = doc.query_selector_all("header").unwrap_or_default();
    let header = fallback
        .iter()
        .find(|&&el| doc.is_visible(el))
        .or_else(|| fallback.first())
        .copied();
    if header.is_some() {
        debug!("Header selectors matched nothing, using a <header> element");
    }
    header
}
