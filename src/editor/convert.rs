use super::types::{
    EditorButton, EditorConditionalMessage, EditorConnection, EditorGraph, EditorNode,
    EditorNodeData,
};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::error::GraphConversionError;
use crate::graph::{
    AdminAction, AdminActionData, AdminRightsData, AutoTransition, Button, ButtonAction,
    ButtonKind, CommandData, ConditionalMessage, Connection, Graph, GraphSettings, IntoGraph,
    KeyboardKind, MediaCaptureData, MediaKind, MessageData, MultiSelect, Node, NodeData, Position,
    TextInputData,
};

/// Parses the editor's JSON document and converts it into a canonical graph.
///
/// The only failure mode is top-level JSON that does not parse; entry-level
/// defects (null entries, wrong-typed fields, unknown types) degrade and are
/// reported in the returned diagnostics.
pub fn graph_from_editor_json(
    json: &str,
) -> Result<(Graph, Vec<Diagnostic>), GraphConversionError> {
    let document: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| GraphConversionError::JsonParseError(e.to_string()))?;

    let mut report = Vec::new();
    let mut editor = EditorGraph::default();

    if let Some(settings) = document.get("settings") {
        editor.settings = serde_json::from_value(settings.clone()).ok();
    }

    for entry in json_array(&document, "nodes", &mut report) {
        if entry.is_null() {
            editor.nodes.push(None);
            continue;
        }
        match serde_json::from_value::<EditorNode>(entry.clone()) {
            Ok(node) => editor.nodes.push(Some(node)),
            // A record with garbage in its data fields still keeps its place
            // in the graph as long as it carries an id.
            Err(e) => match entry.get("id").and_then(serde_json::Value::as_str) {
                Some(id) => {
                    report.push(Diagnostic {
                        kind: DiagnosticKind::MalformedEntry,
                        node_id: Some(id.to_string()),
                        message: format!("node data could not be parsed ({e}); fields defaulted"),
                    });
                    editor.nodes.push(Some(EditorNode {
                        id: id.to_string(),
                        node_type: entry
                            .get("type")
                            .and_then(serde_json::Value::as_str)
                            .unwrap_or("message")
                            .to_string(),
                        position: None,
                        data: Default::default(),
                    }));
                }
                None => {
                    report.push(Diagnostic {
                        kind: DiagnosticKind::MalformedEntry,
                        node_id: None,
                        message: format!("node entry without an id skipped ({e})"),
                    });
                    editor.nodes.push(None);
                }
            },
        }
    }

    for entry in json_array(&document, "connections", &mut report) {
        if entry.is_null() {
            editor.connections.push(None);
            continue;
        }
        match serde_json::from_value::<EditorConnection>(entry.clone()) {
            Ok(connection) => editor.connections.push(Some(connection)),
            Err(e) => {
                report.push(Diagnostic {
                    kind: DiagnosticKind::MalformedEntry,
                    node_id: None,
                    message: format!("connection entry skipped ({e})"),
                });
                editor.connections.push(None);
            }
        }
    }

    let (graph, mut conversion_report) = editor.into_graph_reporting();
    report.append(&mut conversion_report);
    Ok((graph, report))
}

fn json_array(
    document: &serde_json::Value,
    field: &str,
    report: &mut Vec<Diagnostic>,
) -> Vec<serde_json::Value> {
    match document.get(field) {
        None | Some(serde_json::Value::Null) => Vec::new(),
        Some(serde_json::Value::Array(entries)) => entries.clone(),
        Some(other) => {
            report.push(Diagnostic {
                kind: DiagnosticKind::MalformedEntry,
                node_id: None,
                message: format!("'{field}' is not an array ({other}); treated as empty"),
            });
            Vec::new()
        }
    }
}

impl EditorGraph {
    /// Infallible conversion that reports every degradation it applied.
    pub fn into_graph_reporting(self) -> (Graph, Vec<Diagnostic>) {
        let mut report = Vec::new();

        let nodes = self
            .nodes
            .into_iter()
            .flatten()
            .map(|node| convert_node(node, &mut report))
            .collect();

        let connections = self
            .connections
            .into_iter()
            .flatten()
            .map(|c| Connection {
                source: c.source,
                target: c.target,
                source_handle: c.source_handle,
                target_handle: c.target_handle,
            })
            .collect();

        let settings = self.settings.map(|s| GraphSettings {
            title: s.title,
            description: s.description,
        });

        (
            Graph {
                nodes,
                connections,
                settings,
            },
            report,
        )
    }
}

impl IntoGraph for EditorGraph {
    fn into_graph(self) -> Result<Graph, GraphConversionError> {
        let (graph, _report) = self.into_graph_reporting();
        Ok(graph)
    }
}

fn convert_node(node: EditorNode, report: &mut Vec<Diagnostic>) -> Node {
    let position = node
        .position
        .map(|p| Position { x: p.x, y: p.y })
        .unwrap_or_default();

    let data = match node.node_type.as_str() {
        "start" => NodeData::Start(message_data(&node.data)),
        "command" => NodeData::Command(CommandData {
            command: node
                .data
                .command
                .clone()
                .unwrap_or_default()
                .trim_start_matches('/')
                .to_string(),
            aliases: node
                .data
                .aliases
                .clone()
                .unwrap_or_default()
                .into_iter()
                .map(|a| a.trim_start_matches('/').to_string())
                .collect(),
            content: message_data(&node.data),
        }),
        "message" | "text" => NodeData::Message(message_data(&node.data)),
        "textInput" | "text_input" | "userInput" => NodeData::TextInput(TextInputData {
            prompt: node.data.message_text.clone().unwrap_or_default(),
            variable: node.data.input_variable.clone().unwrap_or_default(),
            target: node.data.next_node.clone(),
            buttons: buttons(node.data.buttons.as_deref()),
        }),
        "photo" | "video" | "audio" | "document" | "sticker" | "voice" | "animation"
        | "location" | "contact" => NodeData::MediaCapture(MediaCaptureData {
            media: media_kind(&node.node_type),
            prompt: node.data.message_text.clone().unwrap_or_default(),
            variable: node.data.input_variable.clone().unwrap_or_default(),
            reply_text: node.data.reply_text.clone().unwrap_or_default(),
            target: node.data.next_node.clone(),
        }),
        "ban" | "unban" | "mute" | "unmute" | "promote" | "demote" => {
            NodeData::AdminAction(AdminActionData {
                action: admin_action(&node.node_type),
                reply_text: node.data.reply_text.clone().unwrap_or_default(),
                target_variable: node.data.target_variable.clone().unwrap_or_default(),
                duration_seconds: node.data.duration_seconds,
            })
        }
        "adminRights" | "admin_rights" | "permissions" => NodeData::AdminRights(AdminRightsData {
            text: node.data.message_text.clone().unwrap_or_default(),
            target_variable: node.data.target_variable.clone().unwrap_or_default(),
        }),
        other => {
            report.push(Diagnostic {
                kind: DiagnosticKind::UnknownNodeType,
                node_id: Some(node.id.clone()),
                message: format!("unknown node type '{other}', degraded to a plain message node"),
            });
            NodeData::Message(message_data(&node.data))
        }
    };

    Node {
        id: node.id,
        position,
        data,
    }
}

fn message_data(data: &EditorNodeData) -> MessageData {
    let multi_select = data.multi_select_variable.as_ref().map(|var| MultiSelect {
        variable: var.clone(),
        continue_target: data.continue_button_target.clone(),
        continue_label: data
            .continue_button_text
            .clone()
            .unwrap_or_else(|| "Continue".to_string()),
    });

    let auto_transition = match (data.auto_transition_enabled, &data.auto_transition_to) {
        (Some(true), Some(target)) => Some(AutoTransition {
            target: target.clone(),
            delay_seconds: data.auto_transition_delay.unwrap_or(0),
        }),
        _ => None,
    };

    MessageData {
        text: data.message_text.clone().unwrap_or_default(),
        synonyms: data.synonyms.clone().unwrap_or_default(),
        keyboard: keyboard_kind(data.keyboard_type.as_deref()),
        buttons: buttons(data.buttons.as_deref()),
        conditional_messages: conditional_messages(data.conditional_messages.as_deref()),
        multi_select,
        auto_transition,
    }
}

fn keyboard_kind(raw: Option<&str>) -> KeyboardKind {
    match raw {
        Some("reply") => KeyboardKind::Reply,
        Some("inline") => KeyboardKind::Inline,
        _ => KeyboardKind::None,
    }
}

fn buttons(raw: Option<&[Option<EditorButton>]>) -> Vec<Button> {
    raw.unwrap_or_default()
        .iter()
        .flatten()
        .map(convert_button)
        .collect()
}

fn convert_button(raw: &EditorButton) -> Button {
    let action = match raw.action.as_deref() {
        Some("navigate") | Some("callback") | Some("goto") | None => ButtonAction::Navigate,
        Some("invoke-command") | Some("invokeCommand") | Some("command") => {
            ButtonAction::InvokeCommand
        }
        Some("toggle-selection") | Some("toggleSelection") | Some("toggle") => {
            ButtonAction::ToggleSelection
        }
        Some("url") | Some("link") => ButtonAction::Url,
        Some(_) => ButtonAction::Navigate,
    };

    // Url buttons historically stored the link in either field.
    let target = match action {
        ButtonAction::Url => raw.url.clone().or_else(|| raw.target.clone()),
        _ => raw.target.clone(),
    };

    Button {
        id: raw.id.clone().unwrap_or_default(),
        text: raw.text.clone().unwrap_or_default(),
        action,
        target,
        kind: match raw.button_type.as_deref() {
            Some("request_contact") | Some("requestContact") => ButtonKind::RequestContact,
            Some("request_location") | Some("requestLocation") => ButtonKind::RequestLocation,
            _ => ButtonKind::Text,
        },
        skip_data_collection: raw.skip_data_collection.unwrap_or(false),
        hide_after_click: raw.hide_after_click.unwrap_or(false),
    }
}

fn conditional_messages(
    raw: Option<&[Option<EditorConditionalMessage>]>,
) -> Vec<ConditionalMessage> {
    raw.unwrap_or_default()
        .iter()
        .flatten()
        .map(|cm| ConditionalMessage {
            condition: cm.condition.clone().unwrap_or_default(),
            value: cm.value.clone().unwrap_or_default(),
            text: cm.message_text.clone().unwrap_or_default(),
            buttons: buttons(cm.buttons.as_deref()),
        })
        .collect()
}

fn media_kind(node_type: &str) -> MediaKind {
    match node_type {
        "photo" => MediaKind::Photo,
        "video" => MediaKind::Video,
        "audio" => MediaKind::Audio,
        "document" => MediaKind::Document,
        "sticker" => MediaKind::Sticker,
        "voice" => MediaKind::Voice,
        "animation" => MediaKind::Animation,
        "location" => MediaKind::Location,
        _ => MediaKind::Contact,
    }
}

fn admin_action(node_type: &str) -> AdminAction {
    match node_type {
        "ban" => AdminAction::Ban,
        "unban" => AdminAction::Unban,
        "mute" => AdminAction::Mute,
        "unmute" => AdminAction::Unmute,
        "promote" => AdminAction::Promote,
        _ => AdminAction::Demote,
    }
}
