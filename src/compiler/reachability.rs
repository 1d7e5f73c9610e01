use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::graph::{Button, ButtonAction, Graph, NodeData};
use ahash::AHashSet;

/// The deduplicated, insertion-ordered set of node ids that receive an
/// emitted handler. Iteration order is first-seen order, which downstream
/// passes rely on for byte-identical output.
#[derive(Debug, Default)]
pub(crate) struct ReachableSet {
    order: Vec<String>,
    members: AHashSet<String>,
}

impl ReachableSet {
    fn add(&mut self, id: &str) {
        if self.members.insert(id.to_string()) {
            self.order.push(id.to_string());
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }
}

/// Walks the graph plus all indirect reference sources and returns every node
/// that needs a handler. Nodes referenced by nothing and not entry points are
/// left out (dead-node elimination).
///
/// Seeds are the unconditional entry points (start/command nodes) and explicit
/// connection targets; after that, every node's button targets, conditional
/// branch button targets, multi-select continue target, auto-transition target
/// and capture transition target contribute. Unresolvable targets are recorded
/// and skipped, never a fault.
pub(crate) fn collect(graph: &Graph, diagnostics: &mut Diagnostics) -> ReachableSet {
    let existing: AHashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
    let mut reachable = ReachableSet::default();

    let mut resolve = |set: &mut ReachableSet, source_id: &str, target: &str| {
        if existing.contains(target) {
            set.add(target);
        } else {
            diagnostics.push(
                DiagnosticKind::DanglingTarget,
                Some(source_id),
                format!("target '{target}' does not exist; navigation dropped"),
            );
        }
    };

    for node in &graph.nodes {
        if matches!(node.data, NodeData::Start(_) | NodeData::Command(_)) {
            reachable.add(&node.id);
        }
    }

    for connection in &graph.connections {
        resolve(&mut reachable, &connection.source, &connection.target);
    }

    for node in &graph.nodes {
        match &node.data {
            NodeData::Start(content) | NodeData::Message(content) => {
                for target in message_targets(&content.buttons) {
                    resolve(&mut reachable, &node.id, target);
                }
                for cm in &content.conditional_messages {
                    for target in message_targets(&cm.buttons) {
                        resolve(&mut reachable, &node.id, target);
                    }
                }
                if let Some(ms) = &content.multi_select {
                    if let Some(target) = &ms.continue_target {
                        resolve(&mut reachable, &node.id, target);
                    }
                }
                if let Some(auto) = &content.auto_transition {
                    resolve(&mut reachable, &node.id, &auto.target);
                }
            }
            NodeData::Command(data) => {
                for target in message_targets(&data.content.buttons) {
                    resolve(&mut reachable, &node.id, target);
                }
                for cm in &data.content.conditional_messages {
                    for target in message_targets(&cm.buttons) {
                        resolve(&mut reachable, &node.id, target);
                    }
                }
                if let Some(ms) = &data.content.multi_select {
                    if let Some(target) = &ms.continue_target {
                        resolve(&mut reachable, &node.id, target);
                    }
                }
                if let Some(auto) = &data.content.auto_transition {
                    resolve(&mut reachable, &node.id, &auto.target);
                }
            }
            NodeData::TextInput(data) => {
                if let Some(target) = &data.target {
                    resolve(&mut reachable, &node.id, target);
                }
                for target in message_targets(&data.buttons) {
                    resolve(&mut reachable, &node.id, target);
                }
            }
            NodeData::MediaCapture(data) => {
                if let Some(target) = &data.target {
                    resolve(&mut reachable, &node.id, target);
                }
            }
            NodeData::AdminAction(_) | NodeData::AdminRights(_) => {}
        }
    }

    reachable
}

/// Navigation targets contributed by a button list. Toggle-selection and URL
/// buttons never navigate.
fn message_targets(buttons: &[Button]) -> impl Iterator<Item = &str> {
    buttons.iter().filter_map(|b| match b.action {
        ButtonAction::Navigate | ButtonAction::InvokeCommand => b.target.as_deref(),
        ButtonAction::ToggleSelection | ButtonAction::Url => None,
    })
}
