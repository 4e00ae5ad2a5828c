use crate::EditorPanel;
use crate::PreviewConfig;
use crate::inject_preview;
use lp_core::LpResult;
use lp_dom::Document;
use lp_dom::NodeId;
use lp_inspector::ClickOutcome;
use lp_inspector::EmbeddedFrame;
use lp_inspector::sanitize_html;
use lp_ipc::BridgeMessage;
use lp_ipc::BridgeRole;
use lp_ipc::ChannelConfig;
use lp_ipc::ElementPatch;
use lp_ipc::LocalBridgeEndpoint;
use lp_ipc::SelectedElementDescriptor;
use lp_ipc::StyleProperty;
use lp_ipc::local_channel_pair;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Viewport presets for the preview frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Device {
    Phone,
    Tablet,
    #[default]
    Desktop,
}

impl Device {
    pub const ALL: [Device; 3] = [Self::Phone, Self::Tablet, Self::Desktop];

    /// Fixed frame width in CSS pixels; `None` fills the available width.
    pub fn width_px(self) -> Option<u32> {
        match self {
            Self::Phone => Some(412),
            Self::Tablet => Some(768),
            Self::Desktop => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Phone => "Phone",
            Self::Tablet => "Tablet",
            Self::Desktop => "Desktop",
        }
    }
}

/// Host controller for one rendered project.
///
/// Holds the host end of the bridge, the last reported selection and the
/// editor panel. The embedded frame it mounts is reachable only through
/// pointer clicks and a read-only view of its document; selection state comes
/// back as descriptors.
#[derive(Debug)]
pub struct ProjectPreview {
    config: PreviewConfig,
    device: Device,
    host: Option<LocalBridgeEndpoint>,
    frame: Option<EmbeddedFrame>,
    selected: Option<SelectedElementDescriptor>,
    editor: EditorPanel,
}

impl ProjectPreview {
    pub fn new(config: PreviewConfig) -> LpResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            device: Device::default(),
            host: None,
            frame: None,
            selected: None,
            editor: EditorPanel::new(),
        })
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn set_device(&mut self, device: Device) {
        self.device = device;
    }

    /// Renders `html`, replacing any previously mounted document.
    ///
    /// Empty input unmounts, leaving nothing to edit or export. The snapshot is
    /// stripped of any instrumentation it still carries before it is injected
    /// afresh, so stale marks never reach the frame.
    pub fn mount(&mut self, html: &str) -> LpResult<()> {
        self.unmount();
        if html.is_empty() {
            return Ok(());
        }

        let source = inject_preview(Some(&sanitize_html(html)), self.config.editing_enabled);

        let host = ChannelConfig::with_limit(BridgeRole::Host, self.config.max_message_bytes)?;
        let embedded =
            ChannelConfig::with_limit(BridgeRole::Embedded, self.config.max_message_bytes)?;
        let (host, embedded) = local_channel_pair(host, embedded)?;

        self.frame = Some(EmbeddedFrame::mount(&source, embedded));
        self.host = Some(host);
        info!(
            editing = self.config.editing_enabled,
            bytes = source.len(),
            "preview mounted"
        );
        Ok(())
    }

    /// Drops the frame and the host listener.
    pub fn unmount(&mut self) {
        if self.frame.take().is_some() {
            info!("preview unmounted");
        }
        self.host = None;
        self.selected = None;
        self.editor.sync(None);
    }

    pub fn is_mounted(&self) -> bool {
        self.frame.is_some()
    }

    /// Read-only view of the mounted document, for rendering.
    pub fn document(&self) -> Option<&Document> {
        self.frame.as_ref().map(EmbeddedFrame::document)
    }

    /// Delivers a pointer click to the embedded document. The outcome of the
    /// selection reaches the host only through the bridge.
    pub fn dispatch_click(&mut self, target: NodeId) -> ClickOutcome {
        self.frame
            .as_mut()
            .map_or_else(ClickOutcome::default, |frame| frame.click(target))
    }

    pub fn selected(&self) -> Option<&SelectedElementDescriptor> {
        self.selected.as_ref()
    }

    pub fn editor(&self) -> &EditorPanel {
        &self.editor
    }

    /// The panel shows only while editing is enabled and something is selected.
    pub fn editor_visible(&self) -> bool {
        self.config.editing_enabled && self.editor.is_open()
    }

    /// Applies host-bound messages that have arrived. Returns how many changed state.
    pub fn poll(&mut self) -> usize {
        let Some(host) = self.host.as_ref() else {
            return 0;
        };

        let mut applied = 0;
        for message in host.drain() {
            match message {
                BridgeMessage::ElementSelected(descriptor) => {
                    debug!(tag = %descriptor.tag_name, "element selected");
                    self.editor.sync(Some(descriptor.clone()));
                    self.selected = Some(descriptor);
                    applied += 1;
                }
                BridgeMessage::ClearSelection => {
                    self.selected = None;
                    self.editor.sync(None);
                    applied += 1;
                }
                other => debug!(tag = other.tag(), "ignoring embedded-bound message"),
            }
        }
        applied
    }

    /// Runs one turn of both sides: the frame handles inbound commands, then
    /// the host picks up whatever the frame posted.
    pub fn pump(&mut self) -> usize {
        let handled = self.frame.as_mut().map_or(0, EmbeddedFrame::pump);
        handled + self.poll()
    }

    pub fn edit_text(&mut self, value: &str) -> bool {
        let patch = self.editor.edit_text(value);
        self.send_patch(patch)
    }

    pub fn edit_class_name(&mut self, value: &str) -> bool {
        let patch = self.editor.edit_class_name(value);
        self.send_patch(patch)
    }

    pub fn edit_style(&mut self, property: StyleProperty, value: &str) -> bool {
        let patch = self.editor.edit_style(property, value);
        self.send_patch(patch)
    }

    /// Clears the host-side selection and asks the frame to drop its mark.
    pub fn close_editor(&mut self) {
        self.editor.close();
        self.selected = None;
        self.send(&BridgeMessage::ClearSelectionRequest);
    }

    /// Clean HTML of the live document, or `None` before anything is mounted.
    pub fn get_code(&self) -> Option<String> {
        self.frame.as_ref().map(EmbeddedFrame::export_snapshot)
    }

    fn send_patch(&self, patch: Option<ElementPatch>) -> bool {
        match patch {
            Some(patch) => self.send(&BridgeMessage::UpdateElement(patch)),
            None => false,
        }
    }

    fn send(&self, message: &BridgeMessage) -> bool {
        let Some(host) = self.host.as_ref() else {
            debug!(tag = message.tag(), "nothing mounted; dropping message");
            return false;
        };
        match host.send(message) {
            Ok(()) => true,
            Err(error) => {
                warn!(code = error.code, "preview could not post: {}", error.message);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Device;
    use super::ProjectPreview;
    use crate::PreviewConfig;
    use lp_dom::NodeId;
    use lp_inspector::markers;
    use lp_ipc::StyleProperty;
    use pretty_assertions::assert_eq;

    fn preview(editing_enabled: bool) -> ProjectPreview {
        let preview = ProjectPreview::new(PreviewConfig {
            editing_enabled,
            ..PreviewConfig::default()
        });
        assert!(preview.is_ok());
        preview.unwrap_or_else(|_| unreachable!())
    }

    fn node(preview: &ProjectPreview, id: &str) -> NodeId {
        preview
            .document()
            .and_then(|doc| doc.get_element_by_id(id))
            .unwrap_or_else(|| unreachable!("missing #{id}"))
    }

    fn click(preview: &mut ProjectPreview, id: &str) -> bool {
        let target = node(preview, id);
        preview.dispatch_click(target).is_handled()
    }

    fn marked(preview: &ProjectPreview) -> Vec<NodeId> {
        let Some(doc) = preview.document() else {
            return Vec::new();
        };
        doc.elements()
            .filter(|node| {
                doc.has_class(*node, markers::SELECTED_CLASS)
                    || doc.attribute(*node, markers::SELECTED_ATTR).is_some()
            })
            .collect()
    }

    #[test]
    fn device_widths() {
        assert_eq!(Device::Phone.width_px(), Some(412));
        assert_eq!(Device::Tablet.width_px(), Some(768));
        assert_eq!(Device::Desktop.width_px(), None);
        assert_eq!(Device::default(), Device::Desktop);
    }

    #[test]
    fn selection_round_trip_opens_and_closes_the_editor() {
        let mut preview = preview(true);
        assert!(preview.mount("<h1 id=t>Hello</h1>").is_ok());

        assert!(click(&mut preview, "t"));
        assert_eq!(preview.pump(), 1);
        assert!(preview.editor_visible());
        assert_eq!(preview.editor().text(), "Hello");

        assert!(preview.edit_style(StyleProperty::Color, "#ff0000"));
        preview.pump();
        assert_eq!(preview.editor().style(StyleProperty::Color), "#ff0000");

        preview.close_editor();
        assert!(!preview.editor_visible());
        preview.pump();
        assert_eq!(preview.selected(), None);
        assert!(marked(&preview).is_empty());
    }

    #[test]
    fn disabled_editing_mounts_plain_html() {
        let mut preview = preview(false);
        assert!(preview.mount("<p id=p>x</p>").is_ok());
        assert!(!click(&mut preview, "p"));
        assert_eq!(preview.pump(), 0);
        assert!(!preview.editor_visible());
        assert!(!preview.edit_text("ignored"));
    }

    #[test]
    fn remount_replaces_document_and_selection() {
        let mut preview = preview(true);
        assert!(preview.mount("<p id=p>one</p>").is_ok());
        assert!(click(&mut preview, "p"));
        preview.pump();
        assert!(preview.selected().is_some());

        assert!(preview.mount("<p id=p>two</p>").is_ok());
        assert_eq!(preview.selected(), None);
        assert!(preview.get_code().is_some_and(|code| code.contains("two")));

        preview.unmount();
        assert!(!preview.is_mounted());
        assert_eq!(preview.get_code(), None);
        assert!(!preview.dispatch_click(0).is_handled());
    }

    #[test]
    fn stored_marks_do_not_survive_a_mount() {
        let stale = format!(
            "<p id=a class=\"{}\" {}=\"true\" style=\"outline: 2px solid #6366f1\">A</p><p id=b>B</p>",
            markers::SELECTED_CLASS,
            markers::SELECTED_ATTR
        );
        let mut preview = preview(true);
        assert!(preview.mount(&stale).is_ok());
        assert!(marked(&preview).is_empty());

        assert!(click(&mut preview, "b"));
        assert_eq!(marked(&preview), vec![node(&preview, "b")]);
        preview.pump();
        assert_eq!(preview.selected().map(|selected| selected.tag_name.as_str()), Some("P"));
    }

    #[test]
    fn disabled_editing_ignores_instrumented_snapshots() {
        let instrumented = format!(
            "<html><body><p id=p>x</p>{}</body></html>",
            markers::INSTRUMENTATION_PAYLOAD
        );
        let mut preview = preview(false);
        assert!(preview.mount(&instrumented).is_ok());
        assert!(
            preview
                .document()
                .is_some_and(|doc| doc.get_element_by_id(markers::SCRIPT_ID).is_none())
        );
        assert!(!click(&mut preview, "p"));
        assert!(marked(&preview).is_empty());
        assert_eq!(preview.pump(), 0);
    }

    #[test]
    fn oversized_selection_leaves_both_sides_idle() {
        let mut preview = preview(true);
        let html = format!("<p id=p>{}</p>", "x".repeat(70 * 1024));
        assert!(preview.mount(&html).is_ok());

        assert!(!click(&mut preview, "p"));
        assert_eq!(preview.pump(), 0);
        assert_eq!(preview.selected(), None);
        assert!(!preview.editor_visible());
        assert!(marked(&preview).is_empty());
    }
}
