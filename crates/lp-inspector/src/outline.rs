use crate::markers;
use lp_dom::Document;
use lp_dom::NodeId;

const LABEL_TEXT_CHARS: usize = 32;

/// One pickable element in the body, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    pub node: NodeId,
    pub depth: usize,
    pub label: String,
    pub selected: bool,
}

/// Flattens the body into pickable entries, skipping the instrumentation and
/// other non-visual elements.
pub fn element_outline(doc: &Document) -> Vec<OutlineEntry> {
    let mut out = Vec::new();
    let Some(body) = doc.body() else {
        return out;
    };
    walk(doc, body, 0, &mut out);
    out
}

fn walk(doc: &Document, node: NodeId, depth: usize, out: &mut Vec<OutlineEntry>) {
    for child in doc.children(node) {
        let Some(tag) = doc.tag_name(*child) else {
            continue;
        };
        if matches!(tag, "script" | "style" | "template") || markers::is_instrumentation(doc, *child)
        {
            continue;
        }

        out.push(OutlineEntry {
            node: *child,
            depth,
            label: label(doc, *child, tag),
            selected: doc.has_class(*child, markers::SELECTED_CLASS),
        });
        walk(doc, *child, depth + 1, out);
    }
}

fn label(doc: &Document, node: NodeId, tag: &str) -> String {
    let mut out = tag.to_owned();
    if let Some(id) = doc.attribute(node, "id").filter(|id| !id.is_empty()) {
        out.push('#');
        out.push_str(id);
    }
    if let Some(element) = doc.element(node) {
        for class in element.classes().filter(|class| *class != markers::SELECTED_CLASS) {
            out.push('.');
            out.push_str(class);
        }
    }

    let text = doc
        .direct_text(node)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if !text.is_empty() {
        let mut snippet = text.chars().take(LABEL_TEXT_CHARS).collect::<String>();
        if text.chars().count() > LABEL_TEXT_CHARS {
            snippet.push('…');
        }
        out.push_str(" \"");
        out.push_str(&snippet);
        out.push('"');
    }
    out
}
