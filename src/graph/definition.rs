/// The complete, canonical definition of a conversation flow, ready for compilation.
/// This is the target structure for any custom editor-format conversion.
///
/// Iteration order is part of the contract: `nodes` and `connections` are kept
/// in insertion order, and the compiler walks them in that order so identical
/// graphs always produce byte-identical output. The compiler never mutates a
/// `Graph`.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
    pub settings: Option<GraphSettings>,
}

/// Flow-wide editor settings. Not consumed by emission, carried for round-trips.
#[derive(Debug, Clone, Default)]
pub struct GraphSettings {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// One step in the conversation graph.
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique within the graph. Duplicate ids are tolerated; the first wins.
    pub id: String,
    /// Canvas position. Irrelevant to emission.
    pub position: Position,
    pub data: NodeData,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// The closed set of node kinds the compiler emits handlers for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Start,
    Command,
    Message,
    TextInput,
    PhotoCapture,
    VideoCapture,
    AudioCapture,
    DocumentCapture,
    StickerCapture,
    VoiceCapture,
    AnimationCapture,
    LocationCapture,
    ContactCapture,
    Ban,
    Unban,
    Mute,
    Unmute,
    Promote,
    Demote,
    AdminRights,
}

/// Per-node payload, keyed by node kind.
///
/// Each variant carries only the fields that are legal for its kind, so an
/// emission dispatch over this enum is checked for exhaustiveness by the
/// compiler rather than by test breadth.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Entry point registered on `/start`.
    Start(MessageData),
    /// Entry point registered on an explicit command string plus aliases.
    Command(CommandData),
    /// A plain outbound message, optionally with keyboards, conditional
    /// branches, multi-select and auto-transition features.
    Message(MessageData),
    /// Prompts the user and captures the next free-text message into a variable.
    TextInput(TextInputData),
    /// Prompts the user and captures the next media message of one kind.
    MediaCapture(MediaCaptureData),
    /// A one-shot group administration action (ban, mute, promote, ...).
    AdminAction(AdminActionData),
    /// The interactive admin-rights toggle keyboard.
    AdminRights(AdminRightsData),
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Start(_) => NodeKind::Start,
            NodeData::Command(_) => NodeKind::Command,
            NodeData::Message(_) => NodeKind::Message,
            NodeData::TextInput(_) => NodeKind::TextInput,
            NodeData::MediaCapture(data) => match data.media {
                MediaKind::Photo => NodeKind::PhotoCapture,
                MediaKind::Video => NodeKind::VideoCapture,
                MediaKind::Audio => NodeKind::AudioCapture,
                MediaKind::Document => NodeKind::DocumentCapture,
                MediaKind::Sticker => NodeKind::StickerCapture,
                MediaKind::Voice => NodeKind::VoiceCapture,
                MediaKind::Animation => NodeKind::AnimationCapture,
                MediaKind::Location => NodeKind::LocationCapture,
                MediaKind::Contact => NodeKind::ContactCapture,
            },
            NodeData::AdminAction(data) => match data.action {
                AdminAction::Ban => NodeKind::Ban,
                AdminAction::Unban => NodeKind::Unban,
                AdminAction::Mute => NodeKind::Mute,
                AdminAction::Unmute => NodeKind::Unmute,
                AdminAction::Promote => NodeKind::Promote,
                AdminAction::Demote => NodeKind::Demote,
            },
            NodeData::AdminRights(_) => NodeKind::AdminRights,
        }
    }
}

/// Message composition shared by start, command and plain message nodes.
#[derive(Debug, Clone, Default)]
pub struct MessageData {
    pub text: String,
    /// Alternate phrasings that trigger this node as a free-text message.
    /// Matched case- and whitespace-normalized. Empty = no text trigger.
    pub synonyms: Vec<String>,
    pub keyboard: KeyboardKind,
    pub buttons: Vec<Button>,
    /// Evaluated in declaration order against the per-user variable store;
    /// the first matching entry replaces text and buttons.
    pub conditional_messages: Vec<ConditionalMessage>,
    pub multi_select: Option<MultiSelect>,
    pub auto_transition: Option<AutoTransition>,
}

#[derive(Debug, Clone)]
pub struct CommandData {
    /// Command string without the leading slash.
    pub command: String,
    /// Additional command strings that trigger the same node.
    pub aliases: Vec<String>,
    pub content: MessageData,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyboardKind {
    #[default]
    None,
    Reply,
    Inline,
}

#[derive(Debug, Clone)]
pub struct Button {
    pub id: String,
    pub text: String,
    pub action: ButtonAction,
    /// Node id for navigation actions, URL for `Url`.
    pub target: Option<String>,
    pub kind: ButtonKind,
    /// Pressing this button abandons a pending input capture.
    pub skip_data_collection: bool,
    /// Pressing this button removes the inline keyboard it came from.
    pub hide_after_click: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    /// Open the target node.
    Navigate,
    /// Run the target command node as if its command had been typed.
    InvokeCommand,
    /// Toggle membership in the node's multi-select accumulator.
    ToggleSelection,
    /// External link; no callback is generated.
    Url,
}

/// Rendering hint for reply-keyboard buttons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonKind {
    #[default]
    Text,
    RequestContact,
    RequestLocation,
}

/// One branch of a conditional message, matched against a per-user variable.
#[derive(Debug, Clone)]
pub struct ConditionalMessage {
    /// Variable name looked up in the per-user store.
    pub condition: String,
    /// Expected value for this branch to fire.
    pub value: String,
    pub text: String,
    /// Restricted to Navigate / InvokeCommand actions at emission time.
    pub buttons: Vec<Button>,
}

/// Multi-select configuration. Only meaningful with an inline keyboard whose
/// buttons use the toggle-selection action.
#[derive(Debug, Clone)]
pub struct MultiSelect {
    /// Variable receiving the comma-joined selection on continue.
    pub variable: String,
    pub continue_target: Option<String>,
    pub continue_label: String,
}

/// Timed, non-interactive transition emitted after this node's send.
#[derive(Debug, Clone)]
pub struct AutoTransition {
    pub target: String,
    pub delay_seconds: u32,
}

#[derive(Debug, Clone)]
pub struct TextInputData {
    pub prompt: String,
    /// Variable receiving the captured text.
    pub variable: String,
    pub target: Option<String>,
    pub buttons: Vec<Button>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Photo,
    Video,
    Audio,
    Document,
    Sticker,
    Voice,
    Animation,
    Location,
    Contact,
}

impl MediaKind {
    /// Tag used in pending-capture markers and dispatch tables.
    pub fn tag(self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Document => "document",
            MediaKind::Sticker => "sticker",
            MediaKind::Voice => "voice",
            MediaKind::Animation => "animation",
            MediaKind::Location => "location",
            MediaKind::Contact => "contact",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MediaCaptureData {
    pub media: MediaKind,
    pub prompt: String,
    /// Variable receiving the captured file id (or coordinates / phone number).
    pub variable: String,
    /// Confirmation text sent when no transition target is configured.
    pub reply_text: String,
    pub target: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    Ban,
    Unban,
    Mute,
    Unmute,
    Promote,
    Demote,
}

#[derive(Debug, Clone)]
pub struct AdminActionData {
    pub action: AdminAction,
    /// Confirmation text; failure details are appended at runtime.
    pub reply_text: String,
    /// Variable holding the numeric id of the user being acted on.
    pub target_variable: String,
    /// Mute duration. Ignored by other actions.
    pub duration_seconds: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AdminRightsData {
    pub text: String,
    /// Variable holding the numeric id of the administrator being edited.
    pub target_variable: String,
}

/// An explicit edge between two nodes. One of several reference sources for
/// reachability; button targets and transitions contribute independently.
#[derive(Debug, Clone)]
pub struct Connection {
    pub source: String,
    pub target: String,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
}
