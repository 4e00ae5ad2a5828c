use crate::ClickOutcome;
use crate::SelectionRuntime;
use crate::export;
use crate::markers;
use crate::runtime::ClickEffect;
use lp_dom::Document;
use lp_dom::NodeId;
use lp_html::HtmlParser;
use lp_ipc::BridgeMessage;
use lp_ipc::LocalBridgeEndpoint;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Isolated browsing context holding one rendered snapshot.
///
/// The frame owns the live document and the embedded end of the bridge. It
/// talks to the host only through that endpoint.
#[derive(Debug)]
pub struct EmbeddedFrame {
    document: Document,
    endpoint: LocalBridgeEndpoint,
    runtime: Option<SelectionRuntime>,
}

impl EmbeddedFrame {
    /// Parses `html` and installs the selection runtime when the document
    /// carries the instrumentation script.
    ///
    /// Marks left over from an earlier session are cleared first; the runtime
    /// starts idle and must be the only source of marks.
    pub fn mount(html: &str, endpoint: LocalBridgeEndpoint) -> Self {
        let mut document = HtmlParser.parse(html);
        let stale = export::clear_marks(&mut document);
        let runtime = document
            .get_element_by_id(markers::SCRIPT_ID)
            .map(|_| SelectionRuntime::install(&document));
        info!(
            bytes = html.len(),
            instrumented = runtime.is_some(),
            stale_marks = stale,
            "mounted embedded frame"
        );
        Self {
            document,
            endpoint,
            runtime,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn has_runtime(&self) -> bool {
        self.runtime.is_some()
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.runtime.as_ref().and_then(SelectionRuntime::selected)
    }

    /// Dispatches a pointer click on `target`.
    pub fn click(&mut self, target: NodeId) -> ClickOutcome {
        let Some(runtime) = self.runtime.as_mut() else {
            return ClickOutcome::default();
        };

        match runtime.click(&mut self.document, target) {
            ClickEffect::Ignored => ClickOutcome::default(),
            ClickEffect::Cleared => {
                self.post(&BridgeMessage::ClearSelection);
                ClickOutcome::handled()
            }
            ClickEffect::Selected(descriptor) => {
                if self.post(&BridgeMessage::ElementSelected(descriptor)) {
                    return ClickOutcome::handled();
                }
                // the host never heard about this mark
                if let Some(runtime) = self.runtime.as_mut() {
                    runtime.clear(&mut self.document);
                }
                ClickOutcome::default()
            }
        }
    }

    /// Handles every inbound message that has arrived. Returns how many were acted on.
    pub fn pump(&mut self) -> usize {
        self.endpoint
            .drain()
            .into_iter()
            .filter(|message| self.handle_message(message))
            .count()
    }

    fn handle_message(&mut self, message: &BridgeMessage) -> bool {
        let Some(runtime) = self.runtime.as_mut() else {
            debug!(tag = message.tag(), "frame has no runtime; ignoring message");
            return false;
        };

        match message {
            BridgeMessage::UpdateElement(patch) => runtime.apply(&mut self.document, patch),
            BridgeMessage::ClearSelectionRequest => {
                runtime.clear(&mut self.document);
                self.post(&BridgeMessage::ClearSelection);
                true
            }
            BridgeMessage::ElementSelected(_) | BridgeMessage::ClearSelection => {
                debug!(tag = message.tag(), "ignoring host-bound message sent inward");
                false
            }
        }
    }

    /// Clean serialization of a copy of the live document.
    pub fn export_snapshot(&self) -> String {
        export::clean_snapshot(&self.document)
    }

    fn post(&self, message: &BridgeMessage) -> bool {
        match self.endpoint.send(message) {
            Ok(()) => true,
            Err(error) => {
                warn!(code = error.code, "embedded frame could not post: {}", error.message);
                false
            }
        }
    }
}
