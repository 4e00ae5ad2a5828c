use core::fmt;

/// Ordered `style` attribute declarations.
///
/// Setting a property that already exists rewrites it in place; new properties are
/// appended. An empty value removes the declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    declarations: Vec<(String, String)>,
}

impl InlineStyle {
    pub fn parse(input: &str) -> Self {
        let mut style = Self::default();
        for entry in split_declarations(input) {
            let Some((name, value)) = entry.split_once(':') else {
                continue;
            };
            let name = name.trim().to_ascii_lowercase();
            if name.is_empty() {
                continue;
            }
            style.set(&name, value.trim());
        }
        style
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn set(&mut self, name: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            self.remove(name);
            return;
        }

        if let Some(slot) = self
            .declarations
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            slot.1 = value.to_owned();
            return;
        }
        self.declarations
            .push((name.trim().to_ascii_lowercase(), value.to_owned()));
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.declarations.len();
        self.declarations
            .retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        self.declarations.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Serializes as `name: value;` pairs separated by single spaces.
    pub fn to_css_text(&self) -> String {
        self.declarations
            .iter()
            .map(|(name, value)| format!("{name}: {value};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for InlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css_text())
    }
}

fn split_declarations(input: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0_usize;
    let mut paren_depth = 0_u32;
    let mut quote: Option<char> = None;

    for (idx, ch) in input.char_indices() {
        if let Some(open) = quote {
            if ch == open {
                quote = None;
            }
            continue;
        }

        match ch {
            '\'' | '"' => quote = Some(ch),
            '(' => paren_depth = paren_depth.saturating_add(1),
            ')' => paren_depth = paren_depth.saturating_sub(1),
            ';' if paren_depth == 0 => {
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
