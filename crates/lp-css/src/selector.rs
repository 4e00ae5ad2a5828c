use lp_dom::Document;
use lp_dom::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatch {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

/// Complex selector limited to type, id, class and attribute tests joined by
/// descendant or child combinators. Pseudo-classes and sibling combinators are rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    parts: Vec<(Combinator, Compound)>,
}

impl Selector {
    pub fn parse(input: &str) -> Option<Self> {
        let spaced = input.replace('>', " > ");
        let mut parts = Vec::new();
        let mut pending = Combinator::Descendant;

        for token in spaced.split_whitespace() {
            if token == ">" {
                if parts.is_empty() {
                    return None;
                }
                pending = Combinator::Child;
                continue;
            }
            parts.push((pending, parse_compound(token)?));
            pending = Combinator::Descendant;
        }

        if parts.is_empty() || pending == Combinator::Child {
            return None;
        }
        Some(Self { parts })
    }

    /// (ids, classes + attributes, types)
    pub fn specificity(&self) -> (u16, u16, u16) {
        self.parts.iter().fold((0, 0, 0), |(a, b, c), (_, compound)| {
            (
                a + u16::from(compound.id.is_some()),
                b + (compound.classes.len() + compound.attrs.len()) as u16,
                c + u16::from(compound.tag.is_some()),
            )
        })
    }

    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        match self.parts.len().checked_sub(1) {
            Some(last) => match_from(&self.parts, last, doc, node),
            None => false,
        }
    }
}

fn match_from(
    parts: &[(Combinator, Compound)],
    index: usize,
    doc: &Document,
    node: NodeId,
) -> bool {
    let (combinator, compound) = &parts[index];
    if !compound_matches(compound, doc, node) {
        return false;
    }
    if index == 0 {
        return true;
    }

    match combinator {
        Combinator::Child => doc
            .parent(node)
            .is_some_and(|parent| match_from(parts, index - 1, doc, parent)),
        Combinator::Descendant => doc
            .ancestors(node)
            .any(|ancestor| match_from(parts, index - 1, doc, ancestor)),
    }
}

fn compound_matches(compound: &Compound, doc: &Document, node: NodeId) -> bool {
    let Some(element) = doc.element(node) else {
        return false;
    };

    if let Some(tag) = &compound.tag {
        if !element.tag.eq_ignore_ascii_case(tag) {
            return false;
        }
    }
    if let Some(id) = &compound.id {
        if element.attr("id") != Some(id.as_str()) {
            return false;
        }
    }
    if !compound.classes.iter().all(|class| element.has_class(class)) {
        return false;
    }
    compound.attrs.iter().all(|attr| match (&attr.value, element.attr(&attr.name)) {
        (_, None) => false,
        (None, Some(_)) => true,
        (Some(expected), Some(actual)) => expected == actual,
    })
}

fn parse_compound(token: &str) -> Option<Compound> {
    let bytes = token.as_bytes();
    let mut compound = Compound::default();
    let mut idx = 0_usize;

    if bytes.first().copied() == Some(b'*') {
        idx = 1;
    } else {
        let end = ident_end(bytes, 0);
        if end > 0 {
            compound.tag = Some(token[..end].to_ascii_lowercase());
            idx = end;
        }
    }

    while idx < bytes.len() {
        match bytes[idx] {
            b'#' => {
                let end = ident_end(bytes, idx + 1);
                if end == idx + 1 {
                    return None;
                }
                compound.id = Some(token[idx + 1..end].to_owned());
                idx = end;
            }
            b'.' => {
                let end = ident_end(bytes, idx + 1);
                if end == idx + 1 {
                    return None;
                }
                compound.classes.push(token[idx + 1..end].to_owned());
                idx = end;
            }
            b'[' => {
                let close = token[idx..].find(']').map(|offset| idx + offset)?;
                let inner = &token[idx + 1..close];
                let attr = match inner.split_once('=') {
                    Some((name, value)) => AttrMatch {
                        name: name.trim().to_ascii_lowercase(),
                        value: Some(value.trim().trim_matches(['"', '\'']).to_owned()),
                    },
                    None => AttrMatch {
                        name: inner.trim().to_ascii_lowercase(),
                        value: None,
                    },
                };
                if attr.name.is_empty() || !attr.name.bytes().all(is_ident_byte) {
                    return None;
                }
                compound.attrs.push(attr);
                idx = close + 1;
            }
            _ => return None,
        }
    }

    Some(compound)
}

fn ident_end(bytes: &[u8], start: usize) -> usize {
    let mut idx = start;
    while idx < bytes.len() && is_ident_byte(bytes[idx]) {
        idx += 1;
    }
    idx
}

fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_') || byte >= 0x80
}

#[cfg(test)]
mod tests {
    use super::Selector;
    use lp_dom::Document;

    fn tree() -> (Document, usize, usize) {
        let mut doc = Document::new();
        let body = doc.create_element("body");
        let section = doc.create_element_with_attrs(
            "section",
            vec![("id".to_owned(), "intro".to_owned())],
        );
        let para = doc.create_element_with_attrs(
            "p",
            vec![
                ("class".to_owned(), "lead muted".to_owned()),
                ("data-role".to_owned(), "copy".to_owned()),
            ],
        );
        doc.append_child(Document::ROOT, body);
        doc.append_child(body, section);
        doc.append_child(section, para);
        (doc, section, para)
    }

    #[test]
    fn matches_compound_and_descendant_selectors() {
        let (doc, _, para) = tree();
        for source in [
            "p",
            ".lead.muted",
            "#intro p",
            "body p.lead",
            "section > p",
            "[data-role=copy]",
            "p[data-role]",
            "*",
        ] {
            let selector = Selector::parse(source);
            assert!(selector.is_some(), "failed to parse {source}");
            assert!(
                selector.is_some_and(|selector| selector.matches(&doc, para)),
                "expected {source} to match"
            );
        }
    }

    #[test]
    fn rejects_non_matching_paths() {
        let (doc, section, para) = tree();
        let child = Selector::parse("body > p");
        assert!(child.is_some_and(|selector| !selector.matches(&doc, para)));
        let class = Selector::parse("section.lead");
        assert!(class.is_some_and(|selector| !selector.matches(&doc, section)));
    }

    #[test]
    fn rejects_unsupported_syntax() {
        assert!(Selector::parse("a:hover").is_none());
        assert!(Selector::parse("h1 + p").is_none());
        assert!(Selector::parse("> p").is_none());
        assert!(Selector::parse("").is_none());
    }

    #[test]
    fn computes_specificity() {
        let selector = Selector::parse("#intro p.lead[data-role]");
        assert_eq!(selector.map(|selector| selector.specificity()), Some((1, 2, 1)));
    }
}
