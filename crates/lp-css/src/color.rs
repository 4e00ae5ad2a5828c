/// Normalizes hex, named and `rgb()`/`rgba()` colours to the `rgb(r, g, b)` /
/// `rgba(r, g, b, a)` form reported for computed styles. Unknown values are
/// returned trimmed but otherwise untouched.
pub fn normalize_color(value: &str) -> String {
    let trimmed = value.trim();
    match parse_color(trimmed) {
        Some(rgba) => format_rgba(rgba),
        None => trimmed.to_owned(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rgba {
    r: u8,
    g: u8,
    b: u8,
    a: f32,
}

fn format_rgba(color: Rgba) -> String {
    if color.a >= 1.0 {
        return format!("rgb({}, {}, {})", color.r, color.g, color.b);
    }
    let alpha = format!("{:.3}", color.a.max(0.0));
    let alpha = alpha.trim_end_matches('0').trim_end_matches('.');
    let alpha = if alpha.is_empty() { "0" } else { alpha };
    format!("rgba({}, {}, {}, {alpha})", color.r, color.g, color.b)
}

fn parse_color(value: &str) -> Option<Rgba> {
    let lower = value.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(args) = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_function(args);
    }
    named_color(&lower)
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |start: usize, len: usize| -> Option<u8> {
        let digits = hex.get(start..start + len)?;
        let value = u8::from_str_radix(digits, 16).ok()?;
        Some(if len == 1 { value * 17 } else { value })
    };

    let (r, g, b, a) = match hex.len() {
        3 => (channel(0, 1)?, channel(1, 1)?, channel(2, 1)?, 255),
        4 => (channel(0, 1)?, channel(1, 1)?, channel(2, 1)?, channel(3, 1)?),
        6 => (channel(0, 2)?, channel(2, 2)?, channel(4, 2)?, 255),
        8 => (channel(0, 2)?, channel(2, 2)?, channel(4, 2)?, channel(6, 2)?),
        _ => return None,
    };
    Some(Rgba {
        r,
        g,
        b,
        a: f32::from(a) / 255.0,
    })
}

fn parse_rgb_function(args: &str) -> Option<Rgba> {
    let normalized = args.replace('/', " ").replace(',', " ");
    let parts = normalized.split_whitespace().collect::<Vec<_>>();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let channel = |raw: &str| -> Option<u8> {
        if let Some(percent) = raw.strip_suffix('%') {
            let value = percent.parse::<f32>().ok()?;
            return Some((value.clamp(0.0, 100.0) * 2.55).round() as u8);
        }
        let value = raw.parse::<f32>().ok()?;
        Some(value.clamp(0.0, 255.0).round() as u8)
    };
    let alpha = match parts.get(3) {
        Some(raw) => match raw.strip_suffix('%') {
            Some(percent) => percent.parse::<f32>().ok()? / 100.0,
            None => raw.parse::<f32>().ok()?,
        },
        None => 1.0,
    };

    Some(Rgba {
        r: channel(parts[0])?,
        g: channel(parts[1])?,
        b: channel(parts[2])?,
        a: alpha.clamp(0.0, 1.0),
    })
}

fn named_color(name: &str) -> Option<Rgba> {
    let (r, g, b) = match name {
        "transparent" => {
            return Some(Rgba {
                r: 0,
                g: 0,
                b: 0,
                a: 0.0,
            });
        }
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "lime" => (0, 255, 0),
        "blue" => (0, 0, 255),
        "navy" => (0, 0, 128),
        "yellow" => (255, 255, 0),
        "orange" => (255, 165, 0),
        "purple" => (128, 0, 128),
        "indigo" => (75, 0, 130),
        "gray" | "grey" => (128, 128, 128),
        "silver" => (192, 192, 192),
        "teal" => (0, 128, 128),
        "maroon" => (128, 0, 0),
        _ => return None,
    };
    Some(Rgba { r, g, b, a: 1.0 })
}

#[cfg(test)]
mod tests {
    use super::normalize_color;

    #[test]
    fn normalizes_hex_forms() {
        assert_eq!(normalize_color("#fff"), "rgb(255, 255, 255)");
        assert_eq!(normalize_color("#6366F1"), "rgb(99, 102, 241)");
        assert_eq!(normalize_color("#00000080"), "rgba(0, 0, 0, 0.502)");
    }

    #[test]
    fn normalizes_functions_and_names() {
        assert_eq!(normalize_color("rgb(1,2,3)"), "rgb(1, 2, 3)");
        assert_eq!(normalize_color("rgba(0,0,0,0)"), "rgba(0, 0, 0, 0)");
        assert_eq!(normalize_color("rgb(10 20 30 / 50%)"), "rgba(10, 20, 30, 0.5)");
        assert_eq!(normalize_color("Transparent"), "rgba(0, 0, 0, 0)");
        assert_eq!(normalize_color("red"), "rgb(255, 0, 0)");
    }

    #[test]
    fn leaves_unknown_values_alone() {
        assert_eq!(normalize_color(" var(--brand) "), "var(--brand)");
        assert_eq!(normalize_color("#12"), "#12");
    }
}
