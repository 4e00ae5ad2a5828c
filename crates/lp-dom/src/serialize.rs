use crate::Document;
use crate::NodeData;
use crate::NodeId;

impl Document {
    /// Serializes the whole document: doctype, top-level comments and the root element.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for child in self.children(Self::ROOT) {
            if let Some(NodeData::Text(text)) = self.data(*child) {
                if text.trim().is_empty() {
                    continue;
                }
            }
            write_node(self, *child, &mut out);
        }
        out
    }

    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        write_node(self, node, &mut out);
        out
    }

    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        let raw = self.tag_name(node).is_some_and(is_raw_text_tag);
        for child in self.children(node) {
            write_child(self, *child, raw, &mut out);
        }
        out
    }
}

fn write_node(doc: &Document, node: NodeId, out: &mut String) {
    write_child(doc, node, false, out);
}

fn write_child(doc: &Document, node: NodeId, raw_parent: bool, out: &mut String) {
    let Some(data) = doc.data(node) else {
        return;
    };

    match data {
        NodeData::Document => {
            for child in doc.children(node) {
                write_child(doc, *child, false, out);
            }
        }
        NodeData::Doctype(name) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            out.push('>');
        }
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeData::Text(text) => {
            if raw_parent {
                out.push_str(text);
            } else {
                escape_text(text, out);
            }
        }
        NodeData::Element(element) => {
            out.push('<');
            out.push_str(&element.tag);
            for (name, value) in &element.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_attribute(value, out);
                out.push('"');
            }
            out.push('>');

            if is_void_element(&element.tag) {
                return;
            }

            let raw = is_raw_text_tag(&element.tag);
            for child in doc.children(node) {
                write_child(doc, *child, raw, out);
            }
            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
    }
}

fn escape_text(input: &str, out: &mut String) {
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attribute(input: &str, out: &mut String) {
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

fn is_raw_text_tag(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

pub fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}
