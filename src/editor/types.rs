use serde::Deserialize;

/// The visual editor's flow document as serialized by the canvas.
///
/// This layer is deliberately loose: every per-kind field is optional, list
/// entries may be `null`, and field names accept both snake_case and the
/// editor's camelCase. Conversion into the canonical [`crate::graph::Graph`]
/// never fails on node-level garbage; it degrades and reports.
#[derive(Debug, Default, Deserialize)]
pub struct EditorGraph {
    #[serde(default)]
    pub nodes: Vec<Option<EditorNode>>,
    #[serde(default)]
    pub connections: Vec<Option<EditorConnection>>,
    #[serde(default)]
    pub settings: Option<EditorSettings>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EditorSettings {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditorNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub position: Option<EditorPosition>,
    #[serde(default)]
    pub data: EditorNodeData,
}

#[derive(Debug, Default, Deserialize)]
pub struct EditorPosition {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// Union of every field any node kind can carry. Which fields are meaningful
/// depends on the node's `type`; the converter picks the legal subset.
#[derive(Debug, Default, Deserialize)]
pub struct EditorNodeData {
    #[serde(default, alias = "messageText")]
    pub message_text: Option<String>,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub aliases: Option<Vec<String>>,
    #[serde(default)]
    pub synonyms: Option<Vec<String>>,
    #[serde(default, alias = "keyboardType")]
    pub keyboard_type: Option<String>,
    #[serde(default)]
    pub buttons: Option<Vec<Option<EditorButton>>>,
    #[serde(default, alias = "conditionalMessages")]
    pub conditional_messages: Option<Vec<Option<EditorConditionalMessage>>>,
    #[serde(default, alias = "multiSelectVariable")]
    pub multi_select_variable: Option<String>,
    #[serde(default, alias = "continueButtonTarget")]
    pub continue_button_target: Option<String>,
    #[serde(default, alias = "continueButtonText")]
    pub continue_button_text: Option<String>,
    #[serde(default, alias = "autoTransitionEnabled")]
    pub auto_transition_enabled: Option<bool>,
    #[serde(default, alias = "autoTransitionTo")]
    pub auto_transition_to: Option<String>,
    #[serde(default, alias = "autoTransitionDelay")]
    pub auto_transition_delay: Option<u32>,
    #[serde(default, alias = "inputVariable")]
    pub input_variable: Option<String>,
    #[serde(default, alias = "replyText")]
    pub reply_text: Option<String>,
    #[serde(default, alias = "targetVariable")]
    pub target_variable: Option<String>,
    #[serde(default, alias = "durationSeconds")]
    pub duration_seconds: Option<u64>,
    #[serde(default, alias = "inputTarget", alias = "nextNode")]
    pub next_node: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EditorButton {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, alias = "buttonType")]
    pub button_type: Option<String>,
    #[serde(default, alias = "skipDataCollection")]
    pub skip_data_collection: Option<bool>,
    #[serde(default, alias = "hideAfterClick")]
    pub hide_after_click: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EditorConditionalMessage {
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default, alias = "messageText")]
    pub message_text: Option<String>,
    #[serde(default)]
    pub buttons: Option<Vec<Option<EditorButton>>>,
}

#[derive(Debug, Deserialize)]
pub struct EditorConnection {
    pub source: String,
    pub target: String,
    #[serde(default, alias = "sourceHandle")]
    pub source_handle: Option<String>,
    #[serde(default, alias = "targetHandle")]
    pub target_handle: Option<String>,
}
