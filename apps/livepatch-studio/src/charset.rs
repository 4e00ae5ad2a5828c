use encoding_rs::Encoding;
use encoding_rs::UTF_8;

const META_SCAN_BYTES: usize = 8192;

/// Decodes a saved HTML file: BOM first, then a `charset=` in the first few
/// kilobytes, then UTF-8.
pub(crate) fn decode_html(body: &[u8]) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(body) {
        let (decoded, _) = encoding.decode_without_bom_handling(&body[bom_len..]);
        return decoded.into_owned();
    }

    let encoding = parse_charset_from_html_prefix(body)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

fn parse_charset_from_html_prefix(body: &[u8]) -> Option<String> {
    let prefix = String::from_utf8_lossy(&body[..body.len().min(META_SCAN_BYTES)]);
    let lower = prefix.to_ascii_lowercase();
    let mut search_start = 0_usize;

    while let Some(relative) = lower[search_start..].find("charset=") {
        let charset_start = search_start + relative + "charset=".len();
        if let Some(label) = parse_charset_label(&prefix[charset_start..]) {
            return Some(label);
        }
        search_start = charset_start;
    }

    None
}

fn parse_charset_label(input: &str) -> Option<String> {
    let trimmed = input.trim_start();
    let first = trimmed.chars().next()?;

    let label = if first == '"' || first == '\'' {
        let rest = &trimmed[first.len_utf8()..];
        &rest[..rest.find(first)?]
    } else {
        let end = trimmed
            .find(|ch: char| ch.is_whitespace() || matches!(ch, '"' | '\'' | ';' | '>' | '/'))
            .unwrap_or(trimmed.len());
        &trimmed[..end]
    };

    let label = label.trim();
    (!label.is_empty()).then(|| label.to_owned())
}

#[cfg(test)]
mod tests {
    use super::decode_html;
    use super::parse_charset_from_html_prefix;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_meta_charset_forms() {
        assert_eq!(
            parse_charset_from_html_prefix(b"<meta charset=\"windows-1252\">"),
            Some("windows-1252".to_owned())
        );
        assert_eq!(
            parse_charset_from_html_prefix(
                b"<meta http-equiv=Content-Type content='text/html; CHARSET=iso-8859-1'>"
            ),
            Some("iso-8859-1".to_owned())
        );
        assert_eq!(parse_charset_from_html_prefix(b"<meta charset=>"), None);
    }

    #[test]
    fn decodes_legacy_bytes_using_the_declared_charset() {
        let body = b"<meta charset=windows-1252><p>caf\xe9</p>";
        assert_eq!(decode_html(body), "<meta charset=windows-1252><p>caf\u{e9}</p>");
    }

    #[test]
    fn bom_wins_over_meta() {
        let body = b"\xef\xbb\xbf<meta charset=windows-1252><p>caf\xc3\xa9</p>";
        assert_eq!(decode_html(body), "<meta charset=windows-1252><p>caf\u{e9}</p>");
    }

    #[test]
    fn falls_back_to_utf8() {
        assert_eq!(decode_html("<p>h\u{e9}</p>".as_bytes()), "<p>h\u{e9}</p>");
    }
}
