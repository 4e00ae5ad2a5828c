use lp_html::HtmlParser;
use lp_inspector::markers;

/// Prepares raw HTML for rendering in the preview frame.
///
/// Missing or empty input renders nothing. With editing disabled the HTML is
/// passed through untouched; otherwise the instrumentation payload goes right
/// before the first `</body>` (any case), or at the end when there is none.
/// Already-instrumented input comes back unchanged.
pub fn inject_preview(html: Option<&str>, editing_enabled: bool) -> String {
    let Some(html) = html.filter(|html| !html.is_empty()) else {
        return String::new();
    };
    if !editing_enabled || is_instrumented(html) {
        return html.to_owned();
    }

    let payload = markers::INSTRUMENTATION_PAYLOAD;
    let mut out = String::with_capacity(html.len() + payload.len());
    match html.to_ascii_lowercase().find("</body>") {
        Some(index) => {
            out.push_str(&html[..index]);
            out.push_str(payload);
            out.push_str(&html[index..]);
        }
        None => {
            out.push_str(html);
            out.push_str(payload);
        }
    }
    out
}

/// True when `html` already carries the instrumentation script block, however
/// the tag is spelled.
pub fn is_instrumented(html: &str) -> bool {
    let doc = HtmlParser.parse(html);
    doc.get_element_by_id(markers::SCRIPT_ID)
        .is_some_and(|node| doc.is_tag(node, "script"))
}

#[cfg(test)]
mod tests {
    use super::inject_preview;
    use super::is_instrumented;
    use lp_inspector::markers::INSTRUMENTATION_PAYLOAD;
    use pretty_assertions::assert_eq;

    #[test]
    fn inserts_before_closing_body() {
        let out = inject_preview(Some("<html><body><p>x</p></BODY></html>"), true);
        assert_eq!(
            out,
            format!("<html><body><p>x</p>{INSTRUMENTATION_PAYLOAD}</BODY></html>")
        );
    }

    #[test]
    fn appends_when_body_is_not_closed() {
        let out = inject_preview(Some("<p>x</p>"), true);
        assert_eq!(out, format!("<p>x</p>{INSTRUMENTATION_PAYLOAD}"));
        assert!(is_instrumented(&out));
    }

    #[test]
    fn passes_through_when_editing_is_disabled() {
        let html = "<html><body></body></html>";
        assert_eq!(inject_preview(Some(html), false), html);
    }

    #[test]
    fn recognizes_the_script_block_in_any_spelling() {
        for html in [
            "<body><SCRIPT id='ai-preview-script'>1</SCRIPT></body>",
            "<body><script type=\"module\" ID=ai-preview-script></script></body>",
        ] {
            assert!(is_instrumented(html), "{html}");
            assert_eq!(inject_preview(Some(html), true), html);
        }
        assert!(!is_instrumented("<div id=\"ai-preview-script\"></div>"));
    }

    #[test]
    fn missing_html_renders_nothing() {
        assert_eq!(inject_preview(None, true), "");
        assert_eq!(inject_preview(Some(""), true), "");
    }
}
