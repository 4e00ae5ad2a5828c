use eframe::egui;
use lp_css::StyleResolver;
use lp_dom::Document;
use lp_dom::NodeData;
use lp_dom::NodeId;
use lp_inspector::markers;

const SELECTION_STROKE: egui::Color32 = egui::Color32::from_rgb(0x63, 0x66, 0xf1);
const PAGE_FILL: egui::Color32 = egui::Color32::WHITE;

const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "cite", "code", "em", "i", "label", "mark", "q", "s", "small", "span",
    "strong", "sub", "sup", "u",
];
const HIDDEN_TAGS: &[&str] = &["head", "link", "meta", "noscript", "script", "style", "template", "title"];

/// Per-element box values read from the computed style.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BoxStyle {
    color: egui::Color32,
    background: Option<egui::Color32>,
    font_size: f32,
    padding: Edges,
    margin: Edges,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Edges {
    top: f32,
    right: f32,
    bottom: f32,
    left: f32,
}

struct Ctx<'a> {
    doc: &'a Document,
    resolver: StyleResolver,
    clicked: Option<NodeId>,
}

/// Draws the embedded document's body and reports the element the user
/// clicked, if any. Text clicks resolve to their enclosing element.
pub(crate) fn render_document(ui: &mut egui::Ui, doc: &Document) -> Option<NodeId> {
    let Some(body) = doc.body() else {
        ui.label("Document has no body.");
        return None;
    };

    let mut ctx = Ctx {
        doc,
        resolver: StyleResolver::for_document(doc, &[markers::STYLE_ID]),
        clicked: None,
    };
    egui::Frame::NONE.fill(PAGE_FILL).show(ui, |ui| {
        ui.set_min_width(ui.available_width());
        render_block(ui, &mut ctx, body);
    });
    ctx.clicked
}

fn render_node(ui: &mut egui::Ui, ctx: &mut Ctx<'_>, node: NodeId, owner: NodeId) {
    match ctx.doc.data(node) {
        Some(NodeData::Text(text)) => render_text(ui, ctx, owner, text),
        Some(NodeData::Element(element)) => {
            let tag = element.tag.as_str();
            if HIDDEN_TAGS.contains(&tag) || markers::is_instrumentation(ctx.doc, node) {
                return;
            }
            if tag == "br" {
                ui.add_space(2.0);
            } else if INLINE_TAGS.contains(&tag) {
                ui.horizontal_wrapped(|ui| render_children(ui, ctx, node));
            } else {
                render_block(ui, ctx, node);
            }
        }
        _ => {}
    }
}

fn render_children(ui: &mut egui::Ui, ctx: &mut Ctx<'_>, node: NodeId) {
    for child in ctx.doc.children(node).to_vec() {
        render_node(ui, ctx, child, node);
    }
}

fn render_block(ui: &mut egui::Ui, ctx: &mut Ctx<'_>, node: NodeId) {
    let style = box_style(ctx, node);
    let selected = ctx.doc.has_class(node, markers::SELECTED_CLASS);

    let mut frame = egui::Frame::NONE;
    if let Some(background) = style.background {
        frame = frame.fill(background);
    }
    if selected {
        frame = frame.stroke(egui::Stroke::new(2.0, SELECTION_STROKE));
    }

    ui.add_space(style.margin.top);
    let response = ui
        .horizontal(|ui| {
            ui.add_space(style.margin.left);
            let width = (ui.available_width() - style.margin.right).max(1.0);
            ui.allocate_ui_with_layout(
                egui::vec2(width, 0.0),
                egui::Layout::top_down(egui::Align::Min),
                |ui| {
                    frame
                        .show(ui, |ui| {
                            ui.set_min_width(width);
                            ui.add_space(style.padding.top);
                            ui.horizontal(|ui| {
                                ui.add_space(style.padding.left);
                                ui.vertical(|ui| {
                                    if has_only_inline_content(ctx.doc, node) {
                                        ui.horizontal_wrapped(|ui| render_children(ui, ctx, node));
                                    } else {
                                        render_children(ui, ctx, node);
                                    }
                                });
                                ui.add_space(style.padding.right);
                            });
                            ui.add_space(style.padding.bottom);
                        })
                        .response
                },
            )
            .inner
        })
        .inner;
    ui.add_space(style.margin.bottom);

    if ctx.clicked.is_none() && response.interact(egui::Sense::click()).clicked() {
        ctx.clicked = Some(node);
    }
}

fn render_text(ui: &mut egui::Ui, ctx: &mut Ctx<'_>, owner: NodeId, text: &str) {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return;
    }

    let style = box_style(ctx, owner);
    let mut rich = egui::RichText::new(collapsed)
        .size(style.font_size)
        .color(style.color);
    if ctx.doc.tag_name(owner).is_some_and(is_heading) {
        rich = rich.strong();
    }
    if let Some(background) = style.background.filter(|_| is_inline(ctx.doc, owner)) {
        rich = rich.background_color(background);
    }

    let response = ui.add(
        egui::Label::new(rich)
            .wrap_mode(egui::TextWrapMode::Wrap)
            .sense(egui::Sense::click()),
    );
    if response.clicked() {
        ctx.clicked = Some(owner);
    }
}

fn box_style(ctx: &Ctx<'_>, node: NodeId) -> BoxStyle {
    let value = |property: &str| ctx.resolver.computed_value(ctx.doc, node, property);
    BoxStyle {
        color: parse_color(&value("color")).unwrap_or(egui::Color32::BLACK),
        background: parse_color(&value("background-color")).filter(|color| color.a() > 0),
        font_size: parse_px(&value("font-size")).unwrap_or(16.0),
        padding: parse_edges(&value("padding")),
        margin: parse_edges(&value("margin")),
    }
}

fn has_only_inline_content(doc: &Document, node: NodeId) -> bool {
    doc.children(node).iter().all(|child| match doc.tag_name(*child) {
        Some(tag) => INLINE_TAGS.contains(&tag) || tag == "br",
        None => true,
    })
}

fn is_inline(doc: &Document, node: NodeId) -> bool {
    doc.tag_name(node).is_some_and(|tag| INLINE_TAGS.contains(&tag))
}

fn is_heading(tag: &str) -> bool {
    matches!(tag, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// Reads a computed `rgb(..)` / `rgba(..)` value.
fn parse_color(value: &str) -> Option<egui::Color32> {
    let args = value
        .trim()
        .strip_prefix("rgba(")
        .or_else(|| value.trim().strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let parts = args.split(',').map(str::trim).collect::<Vec<_>>();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let channel = |raw: &str| raw.parse::<f32>().ok().map(|v| v.clamp(0.0, 255.0) as u8);
    let r = channel(parts[0])?;
    let g = channel(parts[1])?;
    let b = channel(parts[2])?;
    let a = match parts.get(3) {
        Some(raw) => (raw.parse::<f32>().ok()?.clamp(0.0, 1.0) * 255.0).round() as u8,
        None => 255,
    };
    Some(egui::Color32::from_rgba_unmultiplied(r, g, b, a))
}

fn parse_px(value: &str) -> Option<f32> {
    let number = value.trim().strip_suffix("px")?.trim().parse::<f32>().ok()?;
    number.is_finite().then_some(number.max(0.0))
}

/// Expands a 1-4 value `px` shorthand. Anything unreadable counts as zero.
fn parse_edges(value: &str) -> Edges {
    let parts = value
        .split_whitespace()
        .map(|part| parse_px(part).unwrap_or(0.0))
        .collect::<Vec<_>>();
    let (top, right, bottom, left) = match parts.as_slice() {
        [all] => (*all, *all, *all, *all),
        [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
        [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
        [top, right, bottom, left, ..] => (*top, *right, *bottom, *left),
        [] => (0.0, 0.0, 0.0, 0.0),
    };
    Edges {
        top,
        right,
        bottom,
        left,
    }
}

#[cfg(test)]
mod tests {
    use super::Edges;
    use super::parse_color;
    use super::parse_edges;
    use super::parse_px;
    use eframe::egui::Color32;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_computed_colors() {
        assert_eq!(parse_color("rgb(255, 0, 16)"), Some(Color32::from_rgb(255, 0, 16)));
        assert_eq!(
            parse_color("rgba(0, 0, 0, 0)"),
            Some(Color32::from_rgba_unmultiplied(0, 0, 0, 0))
        );
        assert_eq!(parse_color("red"), None);
        assert_eq!(parse_color("rgb(1, 2)"), None);
    }

    #[test]
    fn reads_pixel_lengths() {
        assert_eq!(parse_px("16px"), Some(16.0));
        assert_eq!(parse_px("18.72px"), Some(18.72));
        assert_eq!(parse_px("2em"), None);
    }

    #[test]
    fn expands_edge_shorthands() {
        assert_eq!(
            parse_edges("16px 0px"),
            Edges {
                top: 16.0,
                right: 0.0,
                bottom: 16.0,
                left: 0.0
            }
        );
        assert_eq!(
            parse_edges("0px 0px 0px 40px"),
            Edges {
                top: 0.0,
                right: 0.0,
                bottom: 0.0,
                left: 40.0
            }
        );
        assert_eq!(parse_edges("8px").left, 8.0);
        assert_eq!(parse_edges("auto"), Edges::default());
    }
}
