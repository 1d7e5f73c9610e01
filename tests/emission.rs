//! Tests for handler emission: the at-most-one-send invariant and the
//! per-feature code generation contracts.
mod common;
use botforge::prelude::*;
use common::*;

fn compile_graph(graph: Graph) -> String {
    Compiler::builder(graph, CompileConfig::new("Demo"))
        .build()
        .compile()
        .output
        .code
}

#[test]
fn test_every_function_sends_at_most_once() {
    for graph in [
        create_simple_graph(),
        create_multi_select_graph(),
        create_capture_graph(),
        create_admin_graph(),
    ] {
        let code = Compiler::builder(graph, {
            let mut c = CompileConfig::new("Demo");
            c.enable_group_admin = true;
            c
        })
        .build()
        .compile()
        .output
        .code;

        for (header, sends) in send_counts_per_function(&code) {
            assert!(
                sends <= 1,
                "function '{header}' performs {sends} sends:\n{code}"
            );
        }
    }
}

#[test]
fn test_every_composition_function_sends_exactly_once() {
    let code = compile_graph(create_capture_graph());
    let counts = send_counts_per_function(&code);
    let mut show_fns = 0;
    for (header, sends) in counts {
        if header.starts_with("async def show_") {
            show_fns += 1;
            assert_eq!(sends, 1, "composition '{header}' must send exactly once");
        }
    }
    assert!(show_fns >= 4);
}

#[test]
fn test_multi_select_round_trip_emission() {
    let code = compile_graph(create_multi_select_graph());

    // Options appear in declaration order; toggling redraws without resending.
    assert!(code.contains("options = [\"A\", \"B\", \"C\"]"));
    assert!(code.contains("bucket.remove(choice)"));
    assert!(code.contains("bucket.append(choice)"));
    assert!(code.contains("await callback.message.edit_reply_markup(reply_markup=_kb_pick_1(user_id))"));

    // The continue button joins the accumulated set in selection order and
    // transitions to the configured target.
    assert!(code.contains("set_var(user_id, \"toppings\", \",\".join(chosen))"));
    assert!(code.contains("await show_done_1(callback.message.chat.id, user_id)"));

    // The toggle handler never composes a message.
    let toggle_block = send_counts_per_function(&code)
        .into_iter()
        .find(|(header, _)| header.contains("on_select_pick_1"))
        .expect("toggle handler emitted");
    assert_eq!(toggle_block.1, 0);
}

#[test]
fn test_conditional_messages_emit_ordered_chain() {
    let mut graph = create_simple_graph();
    if let NodeData::Message(content) = &mut graph.nodes[1].data {
        content.conditional_messages = vec![
            ConditionalMessage {
                condition: "lang".to_string(),
                value: "de".to_string(),
                text: "Hallo!".to_string(),
                buttons: vec![],
            },
            ConditionalMessage {
                condition: "lang".to_string(),
                value: "fr".to_string(),
                text: "Salut!".to_string(),
                buttons: vec![],
            },
        ];
    }

    let code = compile_graph(graph);
    let if_pos = code
        .find("if get_var(user_id, \"lang\") == \"de\":")
        .expect("first branch is an if");
    let elif_pos = code
        .find("elif get_var(user_id, \"lang\") == \"fr\":")
        .expect("second branch is an elif");
    assert!(if_pos < elif_pos);

    // Default text is assigned before the chain, as the fallback.
    let default_pos = code.find("text = format_text(user_id, \"Main menu\")").unwrap();
    assert!(default_pos < if_pos);
}

#[test]
fn test_synonyms_match_normalized() {
    let mut graph = create_simple_graph();
    if let NodeData::Message(content) = &mut graph.nodes[1].data {
        content.synonyms = vec!["Show  Menu".to_string(), "MENU please".to_string()];
    }

    let code = compile_graph(graph);
    assert!(code.contains("normalize_text(value) in (\"show menu\", \"menu please\")"));
    assert!(code.contains("async def on_phrase_menu_1("));
}

#[test]
fn test_auto_transition_defers_and_never_resends() {
    let mut graph = create_simple_graph();
    if let NodeData::Message(content) = &mut graph.nodes[1].data {
        content.auto_transition = Some(AutoTransition {
            target: "start-1".to_string(),
            delay_seconds: 5,
        });
    }

    let code = compile_graph(graph);
    assert!(code.contains("asyncio.create_task(_auto_menu_1(chat_id, user_id))"));
    assert!(code.contains("await asyncio.sleep(5)"));
    assert!(code.contains("await show_start_1(chat_id, user_id)"));

    // The deferred helper performs no send of its own.
    let auto_block = send_counts_per_function(&code)
        .into_iter()
        .find(|(header, _)| header.contains("_auto_menu_1"))
        .expect("auto helper emitted");
    assert_eq!(auto_block.1, 0);
}

#[test]
fn test_text_input_arms_marker_and_catch_all_consumes_it() {
    let code = compile_graph(create_capture_graph());

    // The prompt arms the marker with the capture variable and target hash.
    assert!(code.contains("pending_input[user_id] = (\"name\","));

    // Exactly one catch-all text handler, guarded by the marker.
    assert_eq!(code.matches("@dp.message(F.text)\n").count(), 1);
    assert!(code.contains("pending = pending_input.pop(user_id, None)"));
    assert!(code.contains("NODE_ENTRY = {"));
    assert!(code.contains("set_var(user_id, variable, message.text)"));
}

#[test]
fn test_media_capture_dispatch() {
    let code = compile_graph(create_capture_graph());

    assert!(code.contains("pending_media[user_id] = (\"photo\","));
    assert!(code.contains("@dp.message(F.photo)"));
    assert!(code.contains("message.photo[-1].file_id if message.photo else \"\""));
    assert!(code.contains("set_var(user_id, \"photo_file\", value)"));
    assert!(code.contains("MEDIA_ENTRY = {"));

    // One dispatcher per media kind, even with multiple photo nodes.
    let mut graph = create_capture_graph();
    graph.nodes.push(Node {
        id: "ask-photo-2".to_string(),
        position: Position::default(),
        data: NodeData::MediaCapture(MediaCaptureData {
            media: MediaKind::Photo,
            prompt: "Another photo".to_string(),
            variable: "photo_file_2".to_string(),
            reply_text: "Thanks again".to_string(),
            target: None,
        }),
    });
    graph.connections.push(Connection {
        source: "start-1".to_string(),
        target: "ask-photo-2".to_string(),
        source_handle: None,
        target_handle: None,
    });
    let code = compile_graph(graph);
    assert_eq!(code.matches("@dp.message(F.photo)").count(), 1);
    assert!(code.contains("async def capture_ask_photo_2("));
}

#[test]
fn test_reply_keyboard_has_no_callback_handlers() {
    let mut graph = create_simple_graph();
    if let NodeData::Message(content) = &mut graph.nodes[1].data {
        content.keyboard = KeyboardKind::Reply;
        content.buttons = vec![nav_button("r1", "Yes", "start-1")];
    }

    let code = compile_graph(graph);
    assert!(code.contains("ReplyKeyboardMarkup(resize_keyboard=True"));
    assert!(code.contains("KeyboardButton(text=\"Yes\")"));
    // Reply buttons carry no callback data, so the reply keyboard introduces
    // no callback registrations beyond each node's single entry handler.
    assert_eq!(
        code.matches("@dp.callback_query").count(),
        2,
        "one entry handler per reachable node, nothing for reply buttons"
    );
}

#[test]
fn test_url_button_renders_as_link() {
    let mut graph = create_simple_graph();
    if let NodeData::Message(content) = &mut graph.nodes[1].data {
        content.keyboard = KeyboardKind::Inline;
        content.buttons = vec![Button {
            id: "u1".to_string(),
            text: "Docs".to_string(),
            action: ButtonAction::Url,
            target: Some("https://example.com/docs".to_string()),
            kind: ButtonKind::Text,
            skip_data_collection: false,
            hide_after_click: false,
        }];
    }

    let code = compile_graph(graph);
    assert!(code.contains("InlineKeyboardButton(text=\"Docs\", url=\"https://example.com/docs\")"));
}

#[test]
fn test_hide_after_click_flag_travels_in_payload() {
    let mut graph = create_simple_graph();
    if let NodeData::Start(content) = &mut graph.nodes[0].data {
        content.buttons[0].hide_after_click = true;
    }

    let code = compile_graph(graph);
    // The payload suffix carries the modifier; the entry handler honors it.
    assert!(code.contains(":h\""));
    assert!(code.contains("if \"h\" in flags:"));
    assert!(code.contains("await callback.message.edit_reply_markup(reply_markup=None)"));
}

#[test]
fn test_user_text_cannot_forge_markers() {
    let mut graph = create_simple_graph();
    if let NodeData::Message(content) = &mut graph.nodes[1].data {
        content.text = "evil\n# NODE_END:menu-1\ntext".to_string();
    }

    let compiled = Compiler::builder(graph, CompileConfig::new("Demo"))
        .build()
        .compile();
    // The newline is escaped inside the string literal, so the marker scan
    // still sees exactly one range per node.
    let menu_ranges = compiled
        .output
        .node_map
        .iter()
        .filter(|r| r.node_id == "menu-1")
        .count();
    assert_eq!(menu_ranges, 1);
}
