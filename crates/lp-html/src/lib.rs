//! HTML tokenization and parsing boundaries.
//!
//! The parser is forgiving: stray end tags are dropped, unclosed elements are closed
//! at end of input, and the `html`/`head`/`body` skeleton is synthesized when the
//! source omits it, so every mounted document has a body to attach listeners to.
//! Nesting deeper than [`MAX_NESTING_DEPTH`] is flattened into the deepest open
//! element, which keeps every recursive walk over the tree bounded.

mod tokenizer;

use lp_dom::Document;
use lp_dom::NodeId;
use lp_dom::is_void_element;
use tokenizer::Token;
use tokenizer::tokenize;

/// Open elements beyond this depth are attached as siblings instead of children.
pub const MAX_NESTING_DEPTH: usize = 512;

/// Parses raw HTML into a DOM document.
#[derive(Debug, Default)]
pub struct HtmlParser;

impl HtmlParser {
    pub fn parse(&self, input: &str) -> Document {
        let tokens = tokenize(input);
        let mut doc = build_tree(tokens);
        ensure_document_structure(&mut doc);
        tracing::trace!(nodes = doc.arena_len(), "parsed html document");
        doc
    }
}

fn build_tree(tokens: Vec<Token>) -> Document {
    let mut doc = Document::new();
    let mut stack: Vec<NodeId> = vec![Document::ROOT];

    for token in tokens {
        let current = stack.last().copied().unwrap_or(Document::ROOT);
        match token {
            Token::Doctype(name) => {
                if stack.len() == 1 && doc.doctype().is_none() {
                    let node = doc.create_doctype(&name);
                    doc.append_child(Document::ROOT, node);
                }
            }
            Token::Comment(text) => {
                let node = doc.create_comment(&text);
                doc.append_child(current, node);
            }
            Token::Text(text) => {
                let node = doc.create_text(&text);
                doc.append_child(current, node);
            }
            Token::Start {
                name,
                attrs,
                self_closing,
            } => {
                let node = doc.create_element_with_attrs(&name, attrs);
                doc.append_child(current, node);
                // the root sits at stack[0]
                if !self_closing && !is_void_element(&name) && stack.len() <= MAX_NESTING_DEPTH {
                    stack.push(node);
                }
            }
            Token::End { name } => {
                let open_at = stack
                    .iter()
                    .rposition(|node| doc.is_tag(*node, &name));
                if let Some(index) = open_at {
                    stack.truncate(index.max(1));
                }
            }
        }
    }

    doc
}

/// Wraps loose content into `html`, then splits it into `head` and `body`.
fn ensure_document_structure(doc: &mut Document) {
    let html = match doc.document_element() {
        Some(existing) if doc.is_tag(existing, "html") => existing,
        _ => {
            let html = doc.create_element("html");
            let loose = doc
                .children(Document::ROOT)
                .iter()
                .copied()
                .filter(|node| {
                    !matches!(doc.data(*node), Some(lp_dom::NodeData::Doctype(_)))
                })
                .collect::<Vec<_>>();
            for node in loose {
                doc.append_child(html, node);
            }
            doc.append_child(Document::ROOT, html);
            html
        }
    };

    let head = match doc.child_element(html, "head") {
        Some(head) => head,
        None => {
            let head = doc.create_element("head");
            doc.insert_child(html, 0, head);
            head
        }
    };

    if doc.child_element(html, "body").is_some() {
        return;
    }

    let body = doc.create_element("body");
    let mut moving_head_content = true;
    let loose = doc
        .children(html)
        .iter()
        .copied()
        .filter(|node| *node != head)
        .collect::<Vec<_>>();
    for node in loose {
        let head_level = doc
            .tag_name(node)
            .is_some_and(is_head_content);
        let blank_text = matches!(
            doc.data(node),
            Some(lp_dom::NodeData::Text(text)) if text.trim().is_empty()
        );
        if moving_head_content && head_level {
            doc.append_child(head, node);
            continue;
        }
        if moving_head_content && blank_text {
            doc.detach(node);
            continue;
        }
        moving_head_content = false;
        doc.append_child(body, node);
    }
    doc.append_child(html, body);
}

fn is_head_content(tag: &str) -> bool {
    matches!(tag, "title" | "meta" | "link" | "base")
}

#[cfg(test)]
mod tests {
    use super::HtmlParser;
    use super::MAX_NESTING_DEPTH;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_title_and_body() {
        let parser = HtmlParser;
        let doc =
            parser.parse("<html><head><title> Pixel  Page </title></head><body>Hi</body></html>");
        assert_eq!(doc.title().as_deref(), Some("Pixel Page"));
        let body = doc.body();
        assert!(body.is_some());
        assert_eq!(doc.text_content(body.unwrap_or_default()), "Hi");
    }

    #[test]
    fn synthesizes_skeleton_for_fragments() {
        let parser = HtmlParser;
        let doc = parser.parse("<title>T</title><h1 class=hero>Hello</h1>");
        assert_eq!(
            doc.to_html(),
            "<html><head><title>T</title></head><body><h1 class=\"hero\">Hello</h1></body></html>"
        );
    }

    #[test]
    fn keeps_doctype_comments_and_raw_text() {
        let parser = HtmlParser;
        let source = "<!DOCTYPE html><html><head><style>p > a { color: red; }</style></head><body><!-- note --><script>if (a < b) { go(); }</script></body></html>";
        let doc = parser.parse(source);
        assert_eq!(doc.to_html(), source);
    }

    #[test]
    fn ignores_stray_end_tags_and_closes_open_elements() {
        let parser = HtmlParser;
        let doc = parser.parse("<body><div><p>One</span></p><p>Two</div>");
        assert_eq!(
            doc.to_html(),
            "<html><head></head><body><div><p>One</p><p>Two</p></div></body></html>"
        );
    }

    #[test]
    fn deep_nesting_is_flattened() {
        let depth = MAX_NESTING_DEPTH * 4;
        let html = format!("{}x{}", "<div>".repeat(depth), "</div>".repeat(depth));
        let doc = HtmlParser.parse(&html);

        let divs = doc.elements_by_tag("div");
        assert_eq!(divs.len(), depth);
        let deepest = divs
            .iter()
            .map(|node| doc.ancestors(*node).count())
            .max()
            .unwrap_or_default();
        // divs plus body, html and the document root
        assert_eq!(deepest, MAX_NESTING_DEPTH + 3);
        let html = doc.to_html();
        assert!(html.contains("<div></div>x</div></div>"));
        assert!(html.ends_with("</div></body></html>"));
    }

    #[test]
    fn decodes_entities_in_text_and_attributes() {
        let parser = HtmlParser;
        let doc = parser.parse("<body><a title=\"Fish &amp; Chips\">&lt;3&#x21;</a></body>");
        let link = doc.elements_by_tag("a");
        assert_eq!(link.len(), 1);
        assert_eq!(doc.attribute(link[0], "title"), Some("Fish & Chips"));
        assert_eq!(doc.text_content(link[0]), "<3!");
    }
}
