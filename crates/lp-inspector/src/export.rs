use crate::markers;
use lp_dom::Document;
use lp_html::HtmlParser;
use tracing::debug;

/// Removes every trace of the instrumentation from `doc`.
///
/// Marked elements lose the reserved class, attribute and outline; the injected
/// style and script blocks are detached. Safe to call on documents that were
/// never instrumented.
pub fn strip_instrumentation(doc: &mut Document) {
    let unmarked = clear_marks(doc);

    let mut removed = 0_usize;
    for id in [markers::STYLE_ID, markers::SCRIPT_ID] {
        while let Some(node) = doc.get_element_by_id(id) {
            doc.detach(node);
            removed += 1;
        }
    }
    debug!(unmarked, removed, "stripped instrumentation");
}

/// Unmarks every element carrying the reserved class or attribute. Returns how many.
pub(crate) fn clear_marks(doc: &mut Document) -> usize {
    let marked = doc
        .elements()
        .filter(|node| {
            doc.has_class(*node, markers::SELECTED_CLASS)
                || doc.attribute(*node, markers::SELECTED_ATTR).is_some()
        })
        .collect::<Vec<_>>();
    for node in &marked {
        markers::unmark(doc, *node);
    }
    marked.len()
}

/// Reparses `html` and serializes it without any instrumentation, so a stored
/// snapshot can be mounted again from a clean slate.
pub fn sanitize_html(html: &str) -> String {
    let mut doc = HtmlParser.parse(html);
    strip_instrumentation(&mut doc);
    serialize_document(&doc)
}

/// Doctype (when present) followed by the document element's outer HTML.
pub fn serialize_document(doc: &Document) -> String {
    let mut out = String::new();
    if let Some(doctype) = doc.doctype() {
        out.push_str(&doc.outer_html(doctype));
    }
    if let Some(root) = doc.document_element() {
        out.push_str(&doc.outer_html(root));
    }
    out
}

/// Cleans a copy of `doc` and serializes it, leaving the live tree untouched.
pub fn clean_snapshot(doc: &Document) -> String {
    let mut copy = doc.clone();
    strip_instrumentation(&mut copy);
    serialize_document(&copy)
}

#[cfg(test)]
mod tests {
    use super::clean_snapshot;
    use super::sanitize_html;
    use super::strip_instrumentation;
    use crate::markers;
    use lp_html::HtmlParser;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_marks_left_by_any_number_of_elements() {
        let mut doc = HtmlParser.parse(
            "<!DOCTYPE html><html><head></head><body>\
             <p class=\"a ai-selected-element\" style=\"outline: 2px solid #6366f1; color: red\">x</p>\
             <span data-ai-selected=\"true\">y</span>\
             <style id=\"ai-preview-style\">.x{}</style><script id=\"ai-preview-script\">1</script>\
             </body></html>",
        );
        strip_instrumentation(&mut doc);
        assert_eq!(
            super::serialize_document(&doc),
            "<!DOCTYPE html><html><head></head><body>\
             <p class=\"a\" style=\"color: red;\">x</p><span>y</span></body></html>"
        );
    }

    #[test]
    fn snapshot_leaves_the_live_document_marked() {
        let doc = HtmlParser.parse(&format!(
            "<body><p class=\"{}\">x</p></body>",
            markers::SELECTED_CLASS
        ));
        let snapshot = clean_snapshot(&doc);
        assert!(!snapshot.contains(markers::SELECTED_CLASS));
        assert!(doc.to_html().contains(markers::SELECTED_CLASS));
    }

    #[test]
    fn sanitizing_drops_stale_marks_and_payload() {
        let html = format!(
            "<body><p id=a class=\"{} lead\" data-ai-selected=\"true\">A</p>{}</body>",
            markers::SELECTED_CLASS,
            markers::INSTRUMENTATION_PAYLOAD
        );
        assert_eq!(
            sanitize_html(&html),
            "<html><head></head><body><p id=\"a\" class=\"lead\">A</p></body></html>"
        );
    }

    #[test]
    fn empty_document_serializes_to_empty_string() {
        assert_eq!(super::serialize_document(&lp_dom::Document::new()), "");
    }
}
