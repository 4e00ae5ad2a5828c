use serde::Deserialize;
use serde::Serialize;

/// One of the five style properties the inspector tracks and edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleProperty {
    Padding,
    Margin,
    BackgroundColor,
    Color,
    FontSize,
}

impl StyleProperty {
    pub const ALL: [StyleProperty; 5] = [
        Self::Padding,
        Self::Margin,
        Self::BackgroundColor,
        Self::Color,
        Self::FontSize,
    ];

    /// Hyphenated CSS property name.
    pub fn css_name(self) -> &'static str {
        match self {
            Self::Padding => "padding",
            Self::Margin => "margin",
            Self::BackgroundColor => "background-color",
            Self::Color => "color",
            Self::FontSize => "font-size",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Padding => "Padding",
            Self::Margin => "Margin",
            Self::BackgroundColor => "Background",
            Self::Color => "Text Color",
            Self::FontSize => "Font Size",
        }
    }
}

/// Computed values of the tracked properties at selection time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleSnapshot {
    pub padding: String,
    pub margin: String,
    pub background_color: String,
    pub color: String,
    pub font_size: String,
}

impl StyleSnapshot {
    pub fn get(&self, property: StyleProperty) -> &str {
        match property {
            StyleProperty::Padding => &self.padding,
            StyleProperty::Margin => &self.margin,
            StyleProperty::BackgroundColor => &self.background_color,
            StyleProperty::Color => &self.color,
            StyleProperty::FontSize => &self.font_size,
        }
    }

    pub fn set(&mut self, property: StyleProperty, value: impl Into<String>) {
        let slot = match property {
            StyleProperty::Padding => &mut self.padding,
            StyleProperty::Margin => &mut self.margin,
            StyleProperty::BackgroundColor => &mut self.background_color,
            StyleProperty::Color => &mut self.color,
            StyleProperty::FontSize => &mut self.font_size,
        };
        *slot = value.into();
    }
}

/// Snapshot of the element the embedded runtime currently has marked.
///
/// Value object only: it carries no reference back into the embedded document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedElementDescriptor {
    pub tag_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub styles: StyleSnapshot,
}

/// Partial style map carried by an update. Absent keys are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StylePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
}

impl StylePatch {
    pub fn single(property: StyleProperty, value: impl Into<String>) -> Self {
        let mut patch = Self::default();
        patch.set(property, value);
        patch
    }

    pub fn get(&self, property: StyleProperty) -> Option<&str> {
        let slot = match property {
            StyleProperty::Padding => &self.padding,
            StyleProperty::Margin => &self.margin,
            StyleProperty::BackgroundColor => &self.background_color,
            StyleProperty::Color => &self.color,
            StyleProperty::FontSize => &self.font_size,
        };
        slot.as_deref()
    }

    pub fn set(&mut self, property: StyleProperty, value: impl Into<String>) {
        let slot = match property {
            StyleProperty::Padding => &mut self.padding,
            StyleProperty::Margin => &mut self.margin,
            StyleProperty::BackgroundColor => &mut self.background_color,
            StyleProperty::Color => &mut self.color,
            StyleProperty::FontSize => &mut self.font_size,
        };
        *slot = Some(value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }

    /// Present entries in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (StyleProperty, &str)> {
        StyleProperty::ALL
            .into_iter()
            .filter_map(|property| self.get(property).map(|value| (property, value)))
    }
}

/// Partial update addressed to whichever element is currently marked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<StylePatch>,
}

impl ElementPatch {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            text: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn class_name(value: impl Into<String>) -> Self {
        Self {
            class_name: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn style(property: StyleProperty, value: impl Into<String>) -> Self {
        Self {
            styles: Some(StylePatch::single(property, value)),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.class_name.is_none()
            && self.styles.as_ref().is_none_or(StylePatch::is_empty)
    }
}

/// Envelope exchanged across the document boundary: `{"type": TAG, "payload": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE"
)]
pub enum BridgeMessage {
    /// embedded -> host
    ElementSelected(SelectedElementDescriptor),
    /// embedded -> host
    ClearSelection,
    /// host -> embedded
    UpdateElement(ElementPatch),
    /// host -> embedded
    ClearSelectionRequest,
}

impl BridgeMessage {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::ElementSelected(_) => "ELEMENT_SELECTED",
            Self::ClearSelection => "CLEAR_SELECTION",
            Self::UpdateElement(_) => "UPDATE_ELEMENT",
            Self::ClearSelectionRequest => "CLEAR_SELECTION_REQUEST",
        }
    }
}
