//! CSS tokenization, stylesheet model and computed-value resolution.

mod color;
mod computed;
mod selector;

pub use color::normalize_color;
pub use computed::StyleResolver;
pub use selector::Selector;

use lp_dom::Document;

/// One declaration inside a rule block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub value: String,
    pub important: bool,
}

/// Selector list plus declarations, tagged with its position in the sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssRule {
    pub selectors: Vec<Selector>,
    pub declarations: Vec<Declaration>,
    pub source_order: usize,
}

/// Style rules compiled from source CSS.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    pub rules: Vec<CssRule>,
}

impl StyleSheet {
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Collects every `<style>` block except those whose id is listed in `skip_ids`.
    pub fn from_document(doc: &Document, skip_ids: &[&str]) -> Self {
        let mut source = String::new();
        for node in doc.elements_by_tag("style") {
            let skipped = doc
                .attribute(node, "id")
                .is_some_and(|id| skip_ids.contains(&id));
            if skipped {
                continue;
            }
            source.push_str(&doc.text_content(node));
            source.push('\n');
        }
        CssParser.parse(&source)
    }
}

/// Parses CSS source text.
#[derive(Debug, Default)]
pub struct CssParser;

impl CssParser {
    pub fn parse(&self, input: &str) -> StyleSheet {
        let sanitized = strip_comments_preserve_strings(input);
        let mut rules = Vec::new();
        parse_rules_recursive(&sanitized, &mut rules);
        StyleSheet { rules }
    }
}

/// Splits a declaration block into declarations, honouring `!important`.
pub fn parse_declarations(input: &str) -> Vec<Declaration> {
    let mut out = Vec::new();
    for entry in split_top_level(input, b';') {
        let Some((name, value)) = entry.split_once(':') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        let (value, important) = split_important(value.trim());
        if name.is_empty() || value.is_empty() {
            continue;
        }
        out.push(Declaration {
            name,
            value: value.to_owned(),
            important,
        });
    }
    out
}

pub(crate) fn split_important(value: &str) -> (&str, bool) {
    let lower = value.to_ascii_lowercase();
    if let Some(index) = lower.rfind("!important") {
        if lower[index + "!important".len()..].trim().is_empty() {
            return (value[..index].trim(), true);
        }
    }
    (value, false)
}

fn parse_rules_recursive(input: &str, out: &mut Vec<CssRule>) {
    let mut cursor = 0_usize;

    while let Some((selector_raw, body_raw, next_cursor)) = next_rule_block(input, cursor) {
        cursor = next_cursor;

        let selector_text = normalize_ws(selector_raw);
        if selector_text.is_empty() {
            continue;
        }

        if is_grouping_at_rule(&selector_text) {
            parse_rules_recursive(body_raw, out);
            continue;
        }
        if selector_text.starts_with('@') {
            continue;
        }

        let selectors = selector_text
            .split(',')
            .filter_map(Selector::parse)
            .collect::<Vec<_>>();
        let declarations = parse_declarations(body_raw);
        if selectors.is_empty() || declarations.is_empty() {
            continue;
        }

        let source_order = out.len();
        out.push(CssRule {
            selectors,
            declarations,
            source_order,
        });
    }
}

fn next_rule_block(input: &str, from: usize) -> Option<(&str, &str, usize)> {
    let start = skip_rule_separators(input, from);
    if start >= input.len() {
        return None;
    }

    let open = find_top_level_open_brace(input, start)?;
    let close = find_matching_brace(input, open)?;
    let selector = &input[start..open];
    let body = &input[open + 1..close];

    Some((selector, body, close + 1))
}

fn skip_rule_separators(input: &str, mut idx: usize) -> usize {
    while idx < input.len() {
        let byte = input.as_bytes()[idx];
        if byte.is_ascii_whitespace() || byte == b';' {
            idx = idx.saturating_add(1);
            continue;
        }
        break;
    }

    idx
}

fn find_top_level_open_brace(input: &str, from: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    let mut idx = from;
    let mut quote: Option<u8> = None;
    let mut escape = false;
    let mut paren_depth = 0_u32;
    let mut bracket_depth = 0_u32;

    while idx < bytes.len() {
        let byte = bytes[idx];

        if let Some(open) = quote {
            if !escape && byte == b'\\' {
                escape = true;
            } else if !escape && byte == open {
                quote = None;
            } else {
                escape = false;
            }
            idx = idx.saturating_add(1);
            continue;
        }

        match byte {
            b'\'' | b'"' => quote = Some(byte),
            b'(' => paren_depth = paren_depth.saturating_add(1),
            b')' => paren_depth = paren_depth.saturating_sub(1),
            b'[' => bracket_depth = bracket_depth.saturating_add(1),
            b']' => bracket_depth = bracket_depth.saturating_sub(1),
            b'{' if paren_depth == 0 && bracket_depth == 0 => return Some(idx),
            _ => {}
        }

        idx = idx.saturating_add(1);
    }

    None
}

fn find_matching_brace(input: &str, open_brace: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    if bytes.get(open_brace).copied() != Some(b'{') {
        return None;
    }

    let mut idx = open_brace.saturating_add(1);
    let mut quote: Option<u8> = None;
    let mut escape = false;
    let mut depth = 1_u32;

    while idx < bytes.len() {
        let byte = bytes[idx];

        if let Some(open) = quote {
            if !escape && byte == b'\\' {
                escape = true;
            } else if !escape && byte == open {
                quote = None;
            } else {
                escape = false;
            }
            idx = idx.saturating_add(1);
            continue;
        }

        match byte {
            b'\'' | b'"' => quote = Some(byte),
            b'{' => depth = depth.saturating_add(1),
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }

        idx = idx.saturating_add(1);
    }

    None
}

fn split_top_level(input: &str, delimiter: u8) -> Vec<&str> {
    let bytes = input.as_bytes();
    let mut out = Vec::new();
    let mut start = 0_usize;
    let mut quote: Option<u8> = None;
    let mut paren_depth = 0_u32;

    for (idx, byte) in bytes.iter().copied().enumerate() {
        if let Some(open) = quote {
            if byte == open {
                quote = None;
            }
            continue;
        }
        match byte {
            b'\'' | b'"' => quote = Some(byte),
            b'(' => paren_depth = paren_depth.saturating_add(1),
            b')' => paren_depth = paren_depth.saturating_sub(1),
            _ if byte == delimiter && paren_depth == 0 => {
                out.push(&input[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }

    if start < input.len() {
        out.push(&input[start..]);
    }
    out
}

fn is_grouping_at_rule(selector: &str) -> bool {
    let lower = selector.to_ascii_lowercase();
    lower.starts_with("@media") || lower.starts_with("@supports") || lower.starts_with("@layer")
}

fn normalize_ws(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_comments_preserve_strings(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut idx = 0_usize;
    let mut segment_start = 0_usize;
    let mut quote: Option<u8> = None;

    while idx < bytes.len() {
        let byte = bytes[idx];
        if let Some(open) = quote {
            if byte == b'\\' {
                idx = idx.saturating_add(2);
                continue;
            }
            if byte == open {
                quote = None;
            }
            idx = idx.saturating_add(1);
            continue;
        }

        if byte == b'"' || byte == b'\'' {
            quote = Some(byte);
            idx = idx.saturating_add(1);
            continue;
        }

        if byte == b'/' && bytes.get(idx + 1).copied() == Some(b'*') {
            out.push_str(&input[segment_start..idx]);
            let end = input[idx + 2..]
                .find("*/")
                .map(|offset| idx + 2 + offset + 2)
                .unwrap_or(bytes.len());
            idx = end;
            segment_start = end;
            continue;
        }

        idx = idx.saturating_add(1);
    }

    if segment_start < bytes.len() {
        out.push_str(&input[segment_start..]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::CssParser;
    use super::parse_declarations;
    use super::strip_comments_preserve_strings;

    #[test]
    fn parses_rules_and_flattens_media_blocks() {
        let sheet = CssParser.parse(
            "/* hero */ .hero { color: red; } @media (min-width: 600px) { p, h1 { margin: 0 !important } } @font-face { font-family: x; }",
        );
        assert_eq!(sheet.rule_count(), 2);
        assert_eq!(sheet.rules[1].selectors.len(), 2);
        assert!(sheet.rules[1].declarations[0].important);
        assert_eq!(sheet.rules[1].declarations[0].value, "0");
    }

    #[test]
    fn skips_rules_with_unsupported_selectors() {
        let sheet = CssParser.parse("a:hover { color: blue } a { color: green }");
        assert_eq!(sheet.rule_count(), 1);
    }

    #[test]
    fn declarations_ignore_empty_entries() {
        let declarations = parse_declarations(" ; color : Red ;; background: url('a;b') ");
        assert_eq!(declarations.len(), 2);
        assert_eq!(declarations[0].name, "color");
        assert_eq!(declarations[1].value, "url('a;b')");
    }

    #[test]
    fn comment_markers_inside_strings_survive() {
        let stripped = strip_comments_preserve_strings("a { content: \"/* x */\"; } /* gone */");
        assert_eq!(stripped, "a { content: \"/* x */\"; } ");
    }
}
