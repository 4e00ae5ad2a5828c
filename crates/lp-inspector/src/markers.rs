//! Reserved names the instrumentation adds to a previewed document.
//!
//! Everything listed here is additive and is removed again by
//! [`strip_instrumentation`](crate::strip_instrumentation).

use lp_dom::Document;
use lp_dom::NodeId;

pub const SELECTED_CLASS: &str = "ai-selected-element";
pub const SELECTED_ATTR: &str = "data-ai-selected";
pub const STYLE_ID: &str = "ai-preview-style";
pub const SCRIPT_ID: &str = "ai-preview-script";
pub const OUTLINE_PROPERTY: &str = "outline";
pub const OUTLINE_VALUE: &str = "2px solid #6366f1";

/// Style block and selection script appended to the previewed body.
pub const INSTRUMENTATION_PAYLOAD: &str = concat!(
    "<style id=\"ai-preview-style\">",
    include_str!("../assets/preview.css"),
    "</style><script id=\"ai-preview-script\">",
    include_str!("../assets/selection-runtime.js"),
    "</script>"
);

/// True when `node` is, or sits inside, the injected style or script block.
pub fn is_instrumentation(doc: &Document, node: NodeId) -> bool {
    std::iter::once(node)
        .chain(doc.ancestors(node))
        .any(|candidate| {
            doc.attribute(candidate, "id")
                .is_some_and(|id| id == STYLE_ID || id == SCRIPT_ID)
        })
}

pub(crate) fn mark(doc: &mut Document, node: NodeId) {
    doc.add_class(node, SELECTED_CLASS);
    doc.set_attribute(node, SELECTED_ATTR, "true");
    let mut style = doc.inline_style(node);
    style.set(OUTLINE_PROPERTY, OUTLINE_VALUE);
    doc.set_inline_style(node, &style);
}

pub(crate) fn unmark(doc: &mut Document, node: NodeId) {
    doc.remove_class(node, SELECTED_CLASS);
    doc.remove_attribute(node, SELECTED_ATTR);
    let mut style = doc.inline_style(node);
    if style.remove(OUTLINE_PROPERTY) {
        doc.set_inline_style(node, &style);
    }
}

#[cfg(test)]
mod tests {
    use super::INSTRUMENTATION_PAYLOAD;
    use super::SCRIPT_ID;
    use super::STYLE_ID;

    #[test]
    fn payload_carries_both_reserved_blocks_once() {
        let style_open = format!("<style id=\"{STYLE_ID}\">");
        let script_open = format!("<script id=\"{SCRIPT_ID}\">");
        assert_eq!(INSTRUMENTATION_PAYLOAD.matches(&style_open).count(), 1);
        assert_eq!(INSTRUMENTATION_PAYLOAD.matches(&script_open).count(), 1);
        assert_eq!(INSTRUMENTATION_PAYLOAD.matches("</script>").count(), 1);
        assert!(!INSTRUMENTATION_PAYLOAD.contains("</body>"));
    }
}
