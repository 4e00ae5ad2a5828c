use lp_ipc::ElementPatch;
use lp_ipc::SelectedElementDescriptor;
use lp_ipc::StyleProperty;

/// Form state mirroring the last reported selection.
///
/// Every edit updates the working copy immediately and yields exactly one
/// patch carrying only the edited field. A closed panel yields nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorPanel {
    values: Option<SelectedElementDescriptor>,
}

impl EditorPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.values.is_some()
    }

    pub fn values(&self) -> Option<&SelectedElementDescriptor> {
        self.values.as_ref()
    }

    /// Replaces the working copy wholesale; local edits to a previous selection are discarded.
    pub fn sync(&mut self, descriptor: Option<SelectedElementDescriptor>) {
        self.values = descriptor;
    }

    pub fn text(&self) -> &str {
        self.values
            .as_ref()
            .and_then(|values| values.text.as_deref())
            .unwrap_or_default()
    }

    pub fn class_name(&self) -> &str {
        self.values
            .as_ref()
            .and_then(|values| values.class_name.as_deref())
            .unwrap_or_default()
    }

    pub fn style(&self, property: StyleProperty) -> &str {
        self.values
            .as_ref()
            .map(|values| values.styles.get(property))
            .unwrap_or_default()
    }

    pub fn edit_text(&mut self, value: &str) -> Option<ElementPatch> {
        let values = self.values.as_mut()?;
        values.text = Some(value.to_owned());
        Some(ElementPatch::text(value))
    }

    pub fn edit_class_name(&mut self, value: &str) -> Option<ElementPatch> {
        let values = self.values.as_mut()?;
        values.class_name = Some(value.to_owned());
        Some(ElementPatch::class_name(value))
    }

    pub fn edit_style(&mut self, property: StyleProperty, value: &str) -> Option<ElementPatch> {
        let values = self.values.as_mut()?;
        values.styles.set(property, value);
        Some(ElementPatch::style(property, value))
    }

    /// Returns true when the panel was open.
    pub fn close(&mut self) -> bool {
        self.values.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::EditorPanel;
    use lp_ipc::ElementPatch;
    use lp_ipc::SelectedElementDescriptor;
    use lp_ipc::StyleProperty;
    use lp_ipc::StylePatch;
    use pretty_assertions::assert_eq;

    fn descriptor(tag: &str, text: &str) -> SelectedElementDescriptor {
        SelectedElementDescriptor {
            tag_name: tag.to_owned(),
            text: Some(text.to_owned()),
            ..SelectedElementDescriptor::default()
        }
    }

    #[test]
    fn closed_panel_emits_nothing() {
        let mut panel = EditorPanel::new();
        assert!(!panel.is_open());
        assert_eq!(panel.edit_text("x"), None);
        assert_eq!(panel.edit_style(StyleProperty::Margin, "0"), None);
        assert!(!panel.close());
    }

    #[test]
    fn class_edit_emits_only_the_class_field() {
        let mut panel = EditorPanel::new();
        panel.sync(Some(descriptor("P", "hello")));

        let patch = panel.edit_class_name("lead");
        assert_eq!(
            patch,
            Some(ElementPatch {
                text: None,
                class_name: Some("lead".to_owned()),
                styles: None,
            })
        );
        assert_eq!(panel.class_name(), "lead");
        assert_eq!(panel.text(), "hello");
    }

    #[test]
    fn style_edit_carries_one_property_and_updates_working_copy() {
        let mut panel = EditorPanel::new();
        panel.sync(Some(descriptor("P", "hello")));

        let patch = panel.edit_style(StyleProperty::FontSize, "20px");
        assert_eq!(
            patch.and_then(|patch| patch.styles),
            Some(StylePatch {
                font_size: Some("20px".to_owned()),
                ..StylePatch::default()
            })
        );
        assert_eq!(panel.style(StyleProperty::FontSize), "20px");
    }

    #[test]
    fn new_selection_discards_local_edits() {
        let mut panel = EditorPanel::new();
        panel.sync(Some(descriptor("P", "hello")));
        panel.edit_text("edited");

        panel.sync(Some(descriptor("H2", "title")));
        assert_eq!(panel.values().map(|values| values.tag_name.as_str()), Some("H2"));
        assert_eq!(panel.text(), "title");
        assert!(panel.close());
        assert!(!panel.is_open());
    }
}
