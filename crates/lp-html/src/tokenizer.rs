#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Doctype(String),
    Comment(String),
    Start {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    End {
        name: String,
    },
    Text(String),
}

pub(crate) fn tokenize(source: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let bytes = source.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if starts_with(bytes, i, b"<!--") {
            let (comment, next) = parse_comment(bytes, i);
            out.push(Token::Comment(comment));
            i = next;
            continue;
        }

        if bytes[i] == b'<' {
            if starts_with(bytes, i, b"</") {
                if let Some((tok, next)) = parse_end_tag(bytes, i) {
                    out.push(tok);
                    i = next;
                    continue;
                }
            } else if starts_with(bytes, i, b"<!") || starts_with(bytes, i, b"<?") {
                let (decl, next) = parse_decl(bytes, i);
                if let Some(name) = doctype_name(&decl) {
                    out.push(Token::Doctype(name));
                }
                i = next;
                continue;
            } else if let Some((tok, next)) = parse_start_tag(bytes, i) {
                let mut raw_text_tag: Option<String> = None;
                if let Token::Start {
                    name, self_closing, ..
                } = &tok
                {
                    if !*self_closing && is_raw_text_tag(name) {
                        raw_text_tag = Some(name.clone());
                    }
                }

                out.push(tok);
                i = next;

                if let Some(tag_name) = raw_text_tag {
                    let (raw_text, closing_end) = parse_raw_text_until_end_tag(bytes, i, &tag_name);
                    if !raw_text.is_empty() {
                        out.push(Token::Text(raw_text));
                    }

                    if let Some(closing_end) = closing_end {
                        out.push(Token::End { name: tag_name });
                        i = closing_end;
                    } else {
                        i = bytes.len();
                    }
                }

                continue;
            }
        }

        let (txt, next) = parse_text(bytes, i);
        if !txt.is_empty() {
            out.push(Token::Text(decode_entities(&txt)));
        }
        i = next;
    }

    out
}

pub(crate) fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut cursor = 0_usize;

    while let Some(rel_amp) = input[cursor..].find('&') {
        let amp = cursor + rel_amp;
        out.push_str(&input[cursor..amp]);

        let rest = &input[(amp + 1)..];
        let Some(rel_semi) = rest.find(';') else {
            out.push('&');
            cursor = amp + 1;
            continue;
        };

        let semi = amp + 1 + rel_semi;
        let entity = &input[(amp + 1)..semi];
        if let Some(decoded) = decode_entity(entity) {
            out.push(decoded);
            cursor = semi + 1;
        } else {
            out.push('&');
            cursor = amp + 1;
        }
    }

    out.push_str(&input[cursor..]);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "nbsp" => Some('\u{a0}'),
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "copy" => Some('\u{a9}'),
        _ => {
            if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                let value = u32::from_str_radix(hex, 16).ok()?;
                char::from_u32(value)
            } else if let Some(dec) = entity.strip_prefix('#') {
                let value = dec.parse::<u32>().ok()?;
                char::from_u32(value)
            } else {
                None
            }
        }
    }
}

fn doctype_name(decl: &str) -> Option<String> {
    let body = decl.trim();
    let keyword = body.get(..7)?;
    if !keyword.eq_ignore_ascii_case("doctype") {
        return None;
    }
    let name = body[7..].trim();
    Some(if name.is_empty() {
        "html".to_owned()
    } else {
        name.to_owned()
    })
}

fn starts_with(bytes: &[u8], i: usize, pat: &[u8]) -> bool {
    let end = i.saturating_add(pat.len());
    end <= bytes.len() && &bytes[i..end] == pat
}

fn parse_comment(bytes: &[u8], start: usize) -> (String, usize) {
    let body_start = start.saturating_add(4);
    let mut i = body_start;
    while i + 2 < bytes.len() {
        if bytes[i] == b'-' && bytes[i + 1] == b'-' && bytes[i + 2] == b'>' {
            let text = String::from_utf8_lossy(&bytes[body_start..i]).to_string();
            return (text, i + 3);
        }
        i += 1;
    }
    let text = String::from_utf8_lossy(&bytes[body_start.min(bytes.len())..]).to_string();
    (text, bytes.len())
}

fn parse_decl(bytes: &[u8], start: usize) -> (String, usize) {
    let body_start = start + 2;
    let mut i = body_start;
    while i < bytes.len() {
        if bytes[i] == b'>' {
            let text = String::from_utf8_lossy(&bytes[body_start..i]).to_string();
            return (text, i + 1);
        }
        i += 1;
    }
    (String::new(), bytes.len())
}

fn parse_text(bytes: &[u8], start: usize) -> (String, usize) {
    let mut i = start;
    // A `<` that failed to open a tag is literal text.
    if i < bytes.len() && bytes[i] == b'<' {
        i += 1;
    }
    while i < bytes.len() && bytes[i] != b'<' {
        i += 1;
    }
    (String::from_utf8_lossy(&bytes[start..i]).to_string(), i)
}

fn parse_raw_text_until_end_tag(
    bytes: &[u8],
    start: usize,
    tag_name: &str,
) -> (String, Option<usize>) {
    let tag_bytes = tag_name.as_bytes();
    let mut i = start;

    while i < bytes.len() {
        if bytes[i] != b'<' || i + 2 + tag_bytes.len() > bytes.len() {
            i = i.saturating_add(1);
            continue;
        }
        if bytes[i + 1] != b'/' {
            i = i.saturating_add(1);
            continue;
        }

        let name_start = i + 2;
        let name_end = name_start + tag_bytes.len();
        if !bytes_eq_ignore_ascii_case(&bytes[name_start..name_end], tag_bytes) {
            i = i.saturating_add(1);
            continue;
        }

        let mut close = name_end;
        while close < bytes.len() && bytes[close].is_ascii_whitespace() {
            close = close.saturating_add(1);
        }

        if close < bytes.len() && bytes[close] == b'>' {
            let text = String::from_utf8_lossy(&bytes[start..i]).to_string();
            return (text, Some(close + 1));
        }

        i = i.saturating_add(1);
    }

    (String::from_utf8_lossy(&bytes[start..]).to_string(), None)
}

fn bytes_eq_ignore_ascii_case(left: &[u8], right: &[u8]) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right.iter())
            .all(|(lhs, rhs)| lhs.eq_ignore_ascii_case(rhs))
}

fn parse_end_tag(bytes: &[u8], start: usize) -> Option<(Token, usize)> {
    let mut i = start + 2;
    skip_spaces(bytes, &mut i);
    let begin = i;
    while i < bytes.len() && is_name_char(bytes[i]) {
        i += 1;
    }
    if i == begin {
        return None;
    }

    let name = String::from_utf8_lossy(&bytes[begin..i]).to_ascii_lowercase();
    while i < bytes.len() && bytes[i] != b'>' {
        i += 1;
    }
    if i >= bytes.len() {
        return None;
    }

    Some((Token::End { name }, i + 1))
}

fn parse_start_tag(bytes: &[u8], start: usize) -> Option<(Token, usize)> {
    let mut i = start + 1;
    let begin = i;
    while i < bytes.len() && is_name_char(bytes[i]) {
        i += 1;
    }
    if i == begin || !bytes[begin].is_ascii_alphabetic() {
        return None;
    }

    let name = String::from_utf8_lossy(&bytes[begin..i]).to_ascii_lowercase();
    let mut attrs: Vec<(String, String)> = Vec::new();
    let mut self_closing = false;

    loop {
        skip_spaces(bytes, &mut i);
        if i >= bytes.len() {
            return None;
        }

        if bytes[i] == b'>' {
            i += 1;
            break;
        }

        if bytes[i] == b'/' {
            self_closing = true;
            i += 1;
            skip_spaces(bytes, &mut i);
            if i < bytes.len() && bytes[i] == b'>' {
                i += 1;
                break;
            }
            continue;
        }

        let a_start = i;
        while i < bytes.len() && is_attr_name_char(bytes[i]) {
            i += 1;
        }
        if i == a_start {
            while i < bytes.len() && bytes[i] != b'>' {
                i += 1;
            }
            if i < bytes.len() {
                i += 1;
            }
            break;
        }

        let a_name = String::from_utf8_lossy(&bytes[a_start..i]).to_ascii_lowercase();
        skip_spaces(bytes, &mut i);

        let mut val = String::new();
        if i < bytes.len() && bytes[i] == b'=' {
            i += 1;
            skip_spaces(bytes, &mut i);
            if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
                let q = bytes[i];
                i += 1;
                let v_start = i;
                while i < bytes.len() && bytes[i] != q {
                    i += 1;
                }
                val = String::from_utf8_lossy(&bytes[v_start..i]).to_string();
                if i < bytes.len() && bytes[i] == q {
                    i += 1;
                }
            } else {
                let v_start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                    i += 1;
                }
                val = String::from_utf8_lossy(&bytes[v_start..i]).to_string();
            }
        }

        // First occurrence wins for duplicated attributes.
        if !attrs.iter().any(|(existing, _)| *existing == a_name) {
            attrs.push((a_name, decode_entities(&val)));
        }
    }

    Some((
        Token::Start {
            name,
            attrs,
            self_closing,
        },
        i,
    ))
}

fn skip_spaces(bytes: &[u8], i: &mut usize) {
    while *i < bytes.len() && bytes[*i].is_ascii_whitespace() {
        *i += 1;
    }
}

fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':')
}

fn is_attr_name_char(b: u8) -> bool {
    !b.is_ascii_whitespace() && !matches!(b, b'>' | b'/' | b'=' | b'"' | b'\'')
}

fn is_raw_text_tag(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

#[cfg(test)]
mod tests {
    use super::Token;
    use super::decode_entities;
    use super::tokenize;

    #[test]
    fn tokenizes_doctype_and_attributes() {
        let tokens = tokenize("<!doctype html><div id=main data-x='1' hidden>");
        assert_eq!(tokens.first(), Some(&Token::Doctype("html".to_owned())));
        assert_eq!(
            tokens.get(1),
            Some(&Token::Start {
                name: "div".to_owned(),
                attrs: vec![
                    ("id".to_owned(), "main".to_owned()),
                    ("data-x".to_owned(), "1".to_owned()),
                    ("hidden".to_owned(), String::new()),
                ],
                self_closing: false,
            })
        );
    }

    #[test]
    fn keeps_unmatched_angle_bracket_as_text() {
        let tokens = tokenize("a < b");
        assert_eq!(
            tokens,
            vec![Token::Text("a ".to_owned()), Token::Text("< b".to_owned())]
        );
    }

    #[test]
    fn unterminated_entities_pass_through() {
        assert_eq!(decode_entities("AT&T &amp; co"), "AT&T & co");
        assert_eq!(decode_entities("&bogus;"), "&bogus;");
    }
}
