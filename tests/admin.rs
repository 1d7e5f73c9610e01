//! Tests for group-admin emission: the permission toggle keyboard, flag
//! preservation, and the disabled-feature degradation.
mod common;
use botforge::compiler::PERMISSION_FLAGS;
use botforge::prelude::*;
use common::*;

fn compile_admin(enable: bool) -> CompiledBot {
    let mut config = CompileConfig::new("Admin Bot");
    config.enable_group_admin = enable;
    Compiler::builder(create_admin_graph(), config)
        .build()
        .compile()
}

#[test]
fn test_one_toggle_handler_per_permission_flag() {
    let code = compile_admin(true).output.code;

    for (flag, _label) in PERMISSION_FLAGS {
        let prefix: String = flag.chars().take(12).collect();
        assert!(
            code.contains(&format!(
                "@dp.callback_query(F.data.startswith(\"ap:{prefix}:\"))"
            )),
            "missing toggle handler for {flag}"
        );
        assert!(code.contains(&format!("async def on_toggle_rights_1_{flag}(")));
    }

    // A sibling refresh handler redraws without toggling.
    assert!(code.contains("@dp.callback_query(F.data.startswith(\"apr:\"))"));
    assert!(code.contains("async def on_refresh_rights_1("));
}

#[test]
fn test_toggle_preserves_every_other_flag() {
    let code = compile_admin(true).output.code;

    // The handler reads the full current set, flips exactly the one targeted
    // flag, and applies the whole set in a single call.
    assert!(code.contains(
        "rights = {flag: bool(getattr(member, flag, False)) for flag, _prefix, _label in ADMIN_PERMISSIONS}"
    ));
    assert!(code.contains("rights[\"can_pin_messages\"] = not rights[\"can_pin_messages\"]"));
    assert!(code.contains("await bot.promote_chat_member(chat_id, target_id, **rights)"));

    // Exactly one flip statement per flag-specific handler.
    for (flag, _label) in PERMISSION_FLAGS {
        let flip = format!("rights[\"{flag}\"] = not rights[\"{flag}\"]");
        assert_eq!(code.matches(flip.as_str()).count(), 1);
    }
}

#[test]
fn test_toggle_guards_bot_rights_and_target_status() {
    let code = compile_admin(true).output.code;

    let handler_start = code
        .find("async def on_toggle_rights_1_can_manage_chat(")
        .expect("toggle handler present");
    let body = &code[handler_start..];
    let bot_check = body
        .find("if not getattr(me, \"can_promote_members\", False):")
        .expect("bot rights check");
    let target_check = body
        .find("if getattr(member, \"status\", \"\") != \"administrator\":")
        .expect("target admin check");
    let apply = body
        .find("await bot.promote_chat_member(chat_id, target_id, **rights)")
        .expect("apply call");
    assert!(bot_check < target_check && target_check < apply);
}

#[test]
fn test_keyboard_reflects_current_state_and_redraws() {
    let code = compile_admin(true).output.code;
    assert!(code.contains("async def _admin_keyboard_rights_1(chat_id, target_id):"));
    assert!(code.contains("for flag, prefix, label in ADMIN_PERMISSIONS:"));
    assert!(code.contains(
        "await callback.message.edit_reply_markup(reply_markup=await _admin_keyboard_rights_1(chat_id, target_id))"
    ));

    // The permission table carries all 11 flags with their payload prefixes.
    for (flag, _label) in PERMISSION_FLAGS {
        let prefix: String = flag.chars().take(12).collect();
        assert!(code.contains(&format!("(\"{flag}\", \"{prefix}\",")));
    }
}

#[test]
fn test_admin_action_single_confirmation_send() {
    let code = compile_admin(true).output.code;
    assert!(code.contains("await bot.ban_chat_member(chat_id, int(target_raw))"));

    let ban_block = send_counts_per_function(&code)
        .into_iter()
        .find(|(header, _)| header.contains("show_ban_1"))
        .expect("ban composition emitted");
    assert_eq!(ban_block.1, 1);
}

#[test]
fn test_disabled_admin_degrades_to_plain_message() {
    let compiled = compile_admin(false);
    let code = &compiled.output.code;

    assert!(!code.contains("promote_chat_member"));
    assert!(!code.contains("ban_chat_member"));
    assert!(!code.contains("ADMIN_PERMISSIONS"));
    // The nodes still compose and send their text.
    assert!(code.contains("async def show_rights_1("));
    assert!(code.contains("async def show_ban_1("));
    assert!(
        compiled
            .diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::AdminDisabled)
            .count()
            >= 2
    );
}

#[test]
fn test_second_admin_rights_node_does_not_duplicate_patterns() {
    let mut graph = create_admin_graph();
    graph.nodes.push(Node {
        id: "rights-2".to_string(),
        position: Position::default(),
        data: NodeData::AdminRights(AdminRightsData {
            text: "More permissions:".to_string(),
            target_variable: "admin_target".to_string(),
        }),
    });
    graph.connections.push(Connection {
        source: "start-1".to_string(),
        target: "rights-2".to_string(),
        source_handle: None,
        target_handle: None,
    });

    let mut config = CompileConfig::new("Admin Bot");
    config.enable_group_admin = true;
    let compiled = Compiler::builder(graph, config).build().compile();
    let code = &compiled.output.code;

    for (flag, _label) in PERMISSION_FLAGS {
        let prefix: String = flag.chars().take(12).collect();
        assert_eq!(
            code.matches(&format!(
                "@dp.callback_query(F.data.startswith(\"ap:{prefix}:\"))"
            ))
            .count(),
            1,
            "pattern for {flag} must register exactly once"
        );
    }
    assert!(
        compiled
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::DuplicateCallback)
    );
}
