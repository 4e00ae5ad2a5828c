use crate::StyleSheet;
use crate::color::normalize_color;
use crate::split_important;
use lp_dom::Document;
use lp_dom::NodeId;

const ROOT_FONT_SIZE_PX: f32 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Priority {
    important: bool,
    inline: bool,
    specificity: (u16, u16, u16),
    order: usize,
}

/// Resolves computed values for individual CSS properties against one stylesheet.
///
/// Cascade: inline declarations and matching author rules compete by
/// `!important`, origin, specificity and source order. Unset `color` and
/// `font-size` inherit from the parent; everything else falls back to the
/// user-agent default for the element.
#[derive(Debug, Clone, Default)]
pub struct StyleResolver {
    sheet: StyleSheet,
}

impl StyleResolver {
    pub fn new(sheet: StyleSheet) -> Self {
        Self { sheet }
    }

    /// Resolver over the author styles embedded in `doc`, ignoring the listed `<style>` ids.
    pub fn for_document(doc: &Document, skip_ids: &[&str]) -> Self {
        Self::new(StyleSheet::from_document(doc, skip_ids))
    }

    pub fn sheet(&self) -> &StyleSheet {
        &self.sheet
    }

    /// Cascaded value before inheritance and defaults, if any declaration applies.
    pub fn specified_value(&self, doc: &Document, node: NodeId, property: &str) -> Option<String> {
        let mut winner: Option<(Priority, String)> = None;
        let mut consider = |priority: Priority, value: &str| {
            if winner.as_ref().is_none_or(|(best, _)| priority > *best) {
                winner = Some((priority, value.to_owned()));
            }
        };

        for rule in &self.sheet.rules {
            let specificity = rule
                .selectors
                .iter()
                .filter(|selector| selector.matches(doc, node))
                .map(|selector| selector.specificity())
                .max();
            let Some(specificity) = specificity else {
                continue;
            };

            for declaration in &rule.declarations {
                let Some(value) = declared_value(property, &declaration.name, &declaration.value)
                else {
                    continue;
                };
                consider(
                    Priority {
                        important: declaration.important,
                        inline: false,
                        specificity,
                        order: rule.source_order,
                    },
                    value,
                );
            }
        }

        let inline = doc.inline_style(node);
        for (order, (name, raw)) in inline.iter().enumerate() {
            let (raw, important) = split_important(raw);
            let Some(value) = declared_value(property, name, raw) else {
                continue;
            };
            consider(
                Priority {
                    important,
                    inline: true,
                    specificity: (0, 0, 0),
                    order,
                },
                value,
            );
        }

        winner.map(|(_, value)| value)
    }

    pub fn computed_value(&self, doc: &Document, node: NodeId, property: &str) -> String {
        let property = property.to_ascii_lowercase();
        let parent = doc
            .parent(node)
            .filter(|parent| doc.element(*parent).is_some());

        let specified = self
            .specified_value(doc, node, &property)
            .filter(|value| !value.eq_ignore_ascii_case("initial"));
        let specified = match specified {
            Some(value) if value.eq_ignore_ascii_case("inherit") => {
                return match parent {
                    Some(parent) => self.computed_value(doc, parent, &property),
                    None => self.default_value(doc, node, &property, None),
                };
            }
            Some(value) => Some(value),
            None if is_inherited(&property) => {
                if let Some(parent) = parent {
                    if ua_specified(doc.tag_name(node).unwrap_or_default(), &property).is_none() {
                        return self.computed_value(doc, parent, &property);
                    }
                }
                None
            }
            None => None,
        };

        match specified {
            Some(value) => self.finish(doc, parent, &property, &value),
            None => self.default_value(doc, node, &property, parent),
        }
    }

    fn default_value(
        &self,
        doc: &Document,
        node: NodeId,
        property: &str,
        parent: Option<NodeId>,
    ) -> String {
        let tag = doc.tag_name(node).unwrap_or_default();
        let value = ua_specified(tag, property).unwrap_or_else(|| initial_value(property));
        self.finish(doc, parent, property, value)
    }

    fn finish(&self, doc: &Document, parent: Option<NodeId>, property: &str, value: &str) -> String {
        match property {
            "color" | "background-color" => normalize_color(value),
            "font-size" => {
                let parent_px = parent
                    .map(|parent| self.computed_value(doc, parent, "font-size"))
                    .and_then(|computed| parse_px(&computed))
                    .unwrap_or(ROOT_FONT_SIZE_PX);
                resolve_font_size(value, parent_px)
            }
            _ => value.trim().to_owned(),
        }
    }
}

/// Maps a declaration onto the requested property, unpacking the `background`
/// shorthand when it carries a bare colour.
fn declared_value<'a>(property: &str, name: &str, value: &'a str) -> Option<&'a str> {
    if name.eq_ignore_ascii_case(property) {
        return Some(value);
    }
    if property == "background-color" && name.eq_ignore_ascii_case("background") {
        let mut tokens = value.split_whitespace();
        let first = tokens.next()?;
        if tokens.next().is_none() && !first.contains("url(") {
            return Some(value.trim());
        }
    }
    None
}

fn is_inherited(property: &str) -> bool {
    matches!(property, "color" | "font-size")
}

fn initial_value(property: &str) -> &'static str {
    match property {
        "background-color" => "rgba(0, 0, 0, 0)",
        "color" => "rgb(0, 0, 0)",
        "font-size" => "16px",
        "padding" | "margin" => "0px",
        _ => "",
    }
}

fn ua_specified(tag: &str, property: &str) -> Option<&'static str> {
    match (property, tag) {
        ("margin", "body") => Some("8px"),
        ("margin", "p" | "ul" | "ol" | "blockquote") => Some("16px 0px"),
        ("padding", "ul" | "ol") => Some("0px 0px 0px 40px"),
        ("font-size", "h1") => Some("2em"),
        ("font-size", "h2") => Some("1.5em"),
        ("font-size", "h3") => Some("1.17em"),
        ("font-size", "h5") => Some("0.83em"),
        ("font-size", "h6") => Some("0.67em"),
        ("font-size", "small") => Some("smaller"),
        _ => None,
    }
}

fn parse_px(value: &str) -> Option<f32> {
    value.trim().strip_suffix("px")?.trim().parse::<f32>().ok()
}

fn resolve_font_size(value: &str, parent_px: f32) -> String {
    let lower = value.trim().to_ascii_lowercase();
    let keyword = match lower.as_str() {
        "xx-small" => Some(9.0),
        "x-small" => Some(10.0),
        "small" => Some(13.0),
        "medium" => Some(16.0),
        "large" => Some(18.0),
        "x-large" => Some(24.0),
        "xx-large" => Some(32.0),
        "smaller" => Some(parent_px / 1.2),
        "larger" => Some(parent_px * 1.2),
        _ => None,
    };

    let px = keyword.or_else(|| {
        let split = lower
            .find(|ch: char| !(ch.is_ascii_digit() || ch == '.' || ch == '-'))
            .unwrap_or(lower.len());
        let number = lower[..split].parse::<f32>().ok()?;
        match &lower[split..] {
            "px" => Some(number),
            "em" => Some(number * parent_px),
            "rem" => Some(number * ROOT_FONT_SIZE_PX),
            "%" => Some(number / 100.0 * parent_px),
            "pt" => Some(number * 4.0 / 3.0),
            "" if number == 0.0 => Some(0.0),
            _ => None,
        }
    });

    match px {
        Some(px) => format_px(px),
        None => value.trim().to_owned(),
    }
}

fn format_px(px: f32) -> String {
    let rounded = (px * 100.0).round() / 100.0;
    let text = format!("{rounded:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{text}px")
}

#[cfg(test)]
mod tests {
    use super::StyleResolver;
    use super::resolve_font_size;
    use crate::CssParser;
    use lp_dom::Document;

    fn page(css: &str) -> (StyleResolver, Document, usize, usize) {
        let mut doc = Document::new();
        let html = doc.create_element("html");
        let body = doc.create_element("body");
        let heading = doc.create_element_with_attrs(
            "h1",
            vec![("class".to_owned(), "title".to_owned())],
        );
        let span = doc.create_element("span");
        doc.append_child(Document::ROOT, html);
        doc.append_child(html, body);
        doc.append_child(body, heading);
        doc.append_child(heading, span);
        (StyleResolver::new(CssParser.parse(css)), doc, heading, span)
    }

    #[test]
    fn falls_back_to_user_agent_defaults() {
        let (resolver, doc, heading, _) = page("");
        assert_eq!(resolver.computed_value(&doc, heading, "padding"), "0px");
        assert_eq!(resolver.computed_value(&doc, heading, "font-size"), "32px");
        assert_eq!(
            resolver.computed_value(&doc, heading, "background-color"),
            "rgba(0, 0, 0, 0)"
        );
        assert_eq!(resolver.computed_value(&doc, heading, "color"), "rgb(0, 0, 0)");
    }

    #[test]
    fn inherits_color_and_font_size() {
        let (resolver, doc, _, span) = page("body { color: #ff0000 } .title { font-size: 20px }");
        assert_eq!(resolver.computed_value(&doc, span, "color"), "rgb(255, 0, 0)");
        assert_eq!(resolver.computed_value(&doc, span, "font-size"), "20px");
        assert_eq!(resolver.computed_value(&doc, span, "margin"), "0px");
    }

    #[test]
    fn inline_beats_rules_unless_rule_is_important() {
        let (resolver, mut doc, heading, _) =
            page("h1 { padding: 2px } .title { padding: 4px } h1 { margin: 1px !important }");
        doc.set_attribute(heading, "style", "padding: 9px; margin: 3px");
        assert_eq!(resolver.computed_value(&doc, heading, "padding"), "9px");
        assert_eq!(resolver.computed_value(&doc, heading, "margin"), "1px");
        doc.remove_attribute(heading, "style");
        assert_eq!(resolver.computed_value(&doc, heading, "padding"), "4px");
    }

    #[test]
    fn background_shorthand_supplies_background_color() {
        let (resolver, doc, heading, _) = page(".title { background: #000 }");
        assert_eq!(
            resolver.computed_value(&doc, heading, "background-color"),
            "rgb(0, 0, 0)"
        );
    }

    #[test]
    fn resolves_relative_font_sizes() {
        assert_eq!(resolve_font_size("1.5em", 16.0), "24px");
        assert_eq!(resolve_font_size("125%", 16.0), "20px");
        assert_eq!(resolve_font_size("1.17em", 16.0), "18.72px");
        assert_eq!(resolve_font_size("12pt", 16.0), "16px");
        assert_eq!(resolve_font_size("clamp(1rem, 2vw, 2rem)", 16.0), "clamp(1rem, 2vw, 2rem)");
    }
}
