//! Common test utilities for building flow graphs and inspecting emitted code.
use botforge::prelude::*;

/// Creates a minimal valid graph: `/start` greets and links to one message.
#[allow(dead_code)]
pub fn create_simple_graph() -> Graph {
    Graph {
        nodes: vec![
            Node {
                id: "start-1".to_string(),
                position: Position::default(),
                data: NodeData::Start(MessageData {
                    text: "Welcome!".to_string(),
                    keyboard: KeyboardKind::Inline,
                    buttons: vec![nav_button("b1", "Open menu", "menu-1")],
                    ..MessageData::default()
                }),
            },
            Node {
                id: "menu-1".to_string(),
                position: Position::default(),
                data: NodeData::Message(MessageData {
                    text: "Main menu".to_string(),
                    ..MessageData::default()
                }),
            },
        ],
        connections: vec![],
        settings: None,
    }
}

/// A multi-select node with options A, B, C and a continue button targeting a
/// follow-up message node.
#[allow(dead_code)]
pub fn create_multi_select_graph() -> Graph {
    Graph {
        nodes: vec![
            Node {
                id: "start-1".to_string(),
                position: Position::default(),
                data: NodeData::Start(MessageData {
                    text: "Hi".to_string(),
                    keyboard: KeyboardKind::Inline,
                    buttons: vec![nav_button("b0", "Pick", "pick-1")],
                    ..MessageData::default()
                }),
            },
            Node {
                id: "pick-1".to_string(),
                position: Position::default(),
                data: NodeData::Message(MessageData {
                    text: "Pick your toppings".to_string(),
                    keyboard: KeyboardKind::Inline,
                    buttons: vec![
                        toggle_button("t1", "A"),
                        toggle_button("t2", "B"),
                        toggle_button("t3", "C"),
                    ],
                    multi_select: Some(MultiSelect {
                        variable: "toppings".to_string(),
                        continue_target: Some("done-1".to_string()),
                        continue_label: "Continue".to_string(),
                    }),
                    ..MessageData::default()
                }),
            },
            Node {
                id: "done-1".to_string(),
                position: Position::default(),
                data: NodeData::Message(MessageData {
                    text: "You chose: {toppings}".to_string(),
                    ..MessageData::default()
                }),
            },
        ],
        connections: vec![],
        settings: None,
    }
}

/// A graph exercising the admin-rights keyboard plus a ban action.
#[allow(dead_code)]
pub fn create_admin_graph() -> Graph {
    Graph {
        nodes: vec![
            Node {
                id: "start-1".to_string(),
                position: Position::default(),
                data: NodeData::Start(MessageData {
                    text: "Admin panel".to_string(),
                    ..MessageData::default()
                }),
            },
            Node {
                id: "rights-1".to_string(),
                position: Position::default(),
                data: NodeData::AdminRights(AdminRightsData {
                    text: "Edit permissions:".to_string(),
                    target_variable: "admin_target".to_string(),
                }),
            },
            Node {
                id: "ban-1".to_string(),
                position: Position::default(),
                data: NodeData::AdminAction(AdminActionData {
                    action: AdminAction::Ban,
                    reply_text: "User banned.".to_string(),
                    target_variable: "target_user".to_string(),
                    duration_seconds: None,
                }),
            },
        ],
        connections: vec![
            Connection {
                source: "start-1".to_string(),
                target: "rights-1".to_string(),
                source_handle: None,
                target_handle: None,
            },
            Connection {
                source: "start-1".to_string(),
                target: "ban-1".to_string(),
                source_handle: None,
                target_handle: None,
            },
        ],
        settings: None,
    }
}

/// A graph with a text capture and a photo capture feeding a confirmation.
#[allow(dead_code)]
pub fn create_capture_graph() -> Graph {
    Graph {
        nodes: vec![
            Node {
                id: "start-1".to_string(),
                position: Position::default(),
                data: NodeData::Start(MessageData {
                    text: "Hello".to_string(),
                    ..MessageData::default()
                }),
            },
            Node {
                id: "ask-name".to_string(),
                position: Position::default(),
                data: NodeData::TextInput(TextInputData {
                    prompt: "What is your name?".to_string(),
                    variable: "name".to_string(),
                    target: Some("thanks-1".to_string()),
                    buttons: vec![],
                }),
            },
            Node {
                id: "ask-photo".to_string(),
                position: Position::default(),
                data: NodeData::MediaCapture(MediaCaptureData {
                    media: MediaKind::Photo,
                    prompt: "Send a photo".to_string(),
                    variable: "photo_file".to_string(),
                    reply_text: "Got it!".to_string(),
                    target: None,
                }),
            },
            Node {
                id: "thanks-1".to_string(),
                position: Position::default(),
                data: NodeData::Message(MessageData {
                    text: "Thanks, {name}!".to_string(),
                    ..MessageData::default()
                }),
            },
        ],
        connections: vec![
            Connection {
                source: "start-1".to_string(),
                target: "ask-name".to_string(),
                source_handle: None,
                target_handle: None,
            },
            Connection {
                source: "start-1".to_string(),
                target: "ask-photo".to_string(),
                source_handle: None,
                target_handle: None,
            },
        ],
        settings: None,
    }
}

#[allow(dead_code)]
pub fn nav_button(id: &str, text: &str, target: &str) -> Button {
    Button {
        id: id.to_string(),
        text: text.to_string(),
        action: ButtonAction::Navigate,
        target: Some(target.to_string()),
        kind: ButtonKind::Text,
        skip_data_collection: false,
        hide_after_click: false,
    }
}

#[allow(dead_code)]
pub fn toggle_button(id: &str, text: &str) -> Button {
    Button {
        id: id.to_string(),
        text: text.to_string(),
        action: ButtonAction::ToggleSelection,
        target: None,
        kind: ButtonKind::Text,
        skip_data_collection: false,
        hide_after_click: false,
    }
}

/// Splits generated code into top-level function blocks and returns, for each,
/// the function's header line and the number of outbound send statements.
#[allow(dead_code)]
pub fn send_counts_per_function(code: &str) -> Vec<(String, usize)> {
    let mut blocks: Vec<(String, usize)> = Vec::new();
    for line in code.lines() {
        let is_def = line.starts_with("async def ") || line.starts_with("def ");
        if is_def {
            blocks.push((line.to_string(), 0));
        } else if let Some(block) = blocks.last_mut() {
            if line.contains("await bot.send_message(") {
                block.1 += 1;
            }
        }
    }
    blocks
}
