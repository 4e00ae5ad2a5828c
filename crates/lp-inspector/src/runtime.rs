use crate::markers;
use lp_css::StyleResolver;
use lp_dom::Document;
use lp_dom::NodeData;
use lp_dom::NodeId;
use lp_ipc::ElementPatch;
use lp_ipc::SelectedElementDescriptor;
use lp_ipc::StyleProperty;
use lp_ipc::StyleSnapshot;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Idle,
    Selected(NodeId),
}

/// What a click did to the document's event flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickOutcome {
    pub propagation_stopped: bool,
    pub default_prevented: bool,
}

impl ClickOutcome {
    pub(crate) fn handled() -> Self {
        Self {
            propagation_stopped: true,
            default_prevented: true,
        }
    }

    pub fn is_handled(&self) -> bool {
        self.propagation_stopped || self.default_prevented
    }
}

/// Result of a click, before anything is posted to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ClickEffect {
    Ignored,
    Cleared,
    Selected(SelectedElementDescriptor),
}

/// Selection state machine living inside the embedded document.
///
/// Owns the single reference to the marked node. Clearing the previous mark
/// always happens in the same call that applies a new one.
#[derive(Debug, Clone)]
pub struct SelectionRuntime {
    state: SelectionState,
    styles: StyleResolver,
}

impl SelectionRuntime {
    pub fn install(doc: &Document) -> Self {
        let styles = StyleResolver::for_document(doc, &[markers::STYLE_ID]);
        debug!(rules = styles.sheet().rule_count(), "installed selection runtime");
        Self {
            state: SelectionState::Idle,
            styles,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn selected(&self) -> Option<NodeId> {
        match self.state {
            SelectionState::Idle => None,
            SelectionState::Selected(node) => Some(node),
        }
    }

    pub(crate) fn click(&mut self, doc: &mut Document, target: NodeId) -> ClickEffect {
        let Some(target) = event_target(doc, target) else {
            return ClickEffect::Ignored;
        };
        if markers::is_instrumentation(doc, target) {
            return ClickEffect::Ignored;
        }
        let Some(body) = doc.body() else {
            return ClickEffect::Ignored;
        };

        if target == body || Some(target) == doc.document_element() {
            self.clear(doc);
            return ClickEffect::Cleared;
        }
        if !doc.contains(body, target) {
            return ClickEffect::Ignored;
        }

        self.clear(doc);
        markers::mark(doc, target);
        self.state = SelectionState::Selected(target);
        ClickEffect::Selected(self.describe(doc, target))
    }

    pub fn clear(&mut self, doc: &mut Document) {
        if let SelectionState::Selected(node) = self.state {
            markers::unmark(doc, node);
        }
        self.state = SelectionState::Idle;
    }

    /// Applies `patch` to the marked element. Returns false when nothing is marked.
    pub fn apply(&mut self, doc: &mut Document, patch: &ElementPatch) -> bool {
        let Some(node) = self.selected() else {
            debug!("dropping element update: nothing is selected");
            return false;
        };

        if let Some(text) = &patch.text {
            doc.replace_direct_text(node, text);
        }
        if let Some(class_name) = &patch.class_name {
            doc.set_attribute(node, "class", class_name.trim());
            doc.add_class(node, markers::SELECTED_CLASS);
        }
        if let Some(styles) = &patch.styles {
            let mut inline = doc.inline_style(node);
            for (property, value) in styles.entries() {
                inline.set(property.css_name(), value);
            }
            doc.set_inline_style(node, &inline);
        }
        true
    }

    pub fn describe(&self, doc: &Document, node: NodeId) -> SelectedElementDescriptor {
        let class_name = doc
            .element(node)
            .map(|element| {
                element
                    .classes()
                    .filter(|class| *class != markers::SELECTED_CLASS)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .filter(|classes| !classes.is_empty());
        let text = doc.direct_text(node).trim().to_owned();

        let mut styles = StyleSnapshot::default();
        for property in StyleProperty::ALL {
            styles.set(
                property,
                self.styles.computed_value(doc, node, property.css_name()),
            );
        }

        SelectedElementDescriptor {
            tag_name: doc
                .tag_name(node)
                .unwrap_or_default()
                .to_ascii_uppercase(),
            class_name,
            text: (!text.is_empty()).then_some(text),
            styles,
        }
    }
}

/// Clicks on text land on the enclosing element, as DOM event targets do.
fn event_target(doc: &Document, node: NodeId) -> Option<NodeId> {
    match doc.data(node)? {
        NodeData::Element(_) => Some(node),
        NodeData::Text(_) => doc.parent(node).filter(|parent| doc.element(*parent).is_some()),
        _ => None,
    }
}
