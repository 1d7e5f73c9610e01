//! Tests for the compilation pipeline: determinism, degradation, reachability.
mod common;
use botforge::prelude::*;
use common::*;

#[test]
fn test_compile_is_deterministic() {
    let first = Compiler::builder(create_simple_graph(), CompileConfig::new("Demo"))
        .build()
        .compile();
    let second = Compiler::builder(create_simple_graph(), CompileConfig::new("Demo"))
        .build()
        .compile();

    assert_eq!(first.output.code, second.output.code);
    assert_eq!(first.output.node_map, second.output.node_map);
}

#[test]
fn test_flag_weaving_does_not_disturb_other_output() {
    let base = Compiler::builder(create_simple_graph(), CompileConfig::new("Demo"))
        .build()
        .compile();

    let mut config = CompileConfig::new("Demo");
    config.enable_logging = true;
    let with_logging = Compiler::builder(create_simple_graph(), config)
        .build()
        .compile();

    // The logging middleware is additive: every line of the base program is
    // still present, in order.
    let mut base_lines = base.output.code.lines().peekable();
    for line in with_logging.output.code.lines() {
        if base_lines.peek() == Some(&line) {
            base_lines.next();
        }
    }
    assert!(
        base_lines.peek().is_none(),
        "enabling logging must only insert lines, never change existing ones"
    );
    assert!(with_logging.output.code.contains("logging_middleware"));
    assert!(!base.output.code.contains("logging_middleware"));
}

#[test]
fn test_compile_none_graph_returns_minimal_program() {
    let result = compile(None, "My Support Bot");
    assert!(!result.code.is_empty());
    assert!(result.code.contains("My Support Bot"));
    assert!(result.node_map.is_empty());
}

#[test]
fn test_compile_empty_graph_returns_minimal_program() {
    let graph = Graph {
        nodes: vec![],
        connections: vec![],
        settings: None,
    };
    let result = compile(Some(graph), "Bot");
    assert!(result.code.contains("Bot"));
    assert!(result.code.contains("dp.start_polling"));
}

#[test]
fn test_editor_json_with_null_entries_compiles() {
    let json = r#"{
        "nodes": [
            null,
            {"id": "start-1", "type": "start", "data": {"messageText": "Hi"}},
            null
        ],
        "connections": [null]
    }"#;
    let (graph, report) = graph_from_editor_json(json).expect("parseable document");
    assert!(report.is_empty());
    assert_eq!(graph.nodes.len(), 1);

    let result = compile(Some(graph), "Bot");
    assert!(result.code.contains("Bot"));
    assert!(result.code.contains("CommandStart()"));
}

#[test]
fn test_unknown_node_type_degrades_to_message() {
    let json = r#"{
        "nodes": [{"id": "x-1", "type": "hologram", "data": {"messageText": "???"}}],
        "connections": [{"source": "x-1", "target": "x-1"}]
    }"#;
    let (graph, report) = graph_from_editor_json(json).expect("parseable document");
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].kind, DiagnosticKind::UnknownNodeType);
    assert_eq!(graph.nodes[0].kind(), NodeKind::Message);
}

#[test]
fn test_reachability_includes_button_targets() {
    let compiled = Compiler::builder(create_simple_graph(), CompileConfig::new("Demo"))
        .build()
        .compile();
    // menu-1 is only referenced by a button, never by a connection.
    assert!(compiled.output.code.contains("# NODE_START:menu-1"));
    assert!(compiled.output.code.contains("async def show_menu_1("));
}

#[test]
fn test_unreferenced_node_is_eliminated() {
    let mut graph = create_simple_graph();
    graph.nodes.push(Node {
        id: "orphan-1".to_string(),
        position: Position::default(),
        data: NodeData::Message(MessageData {
            text: "Never shown".to_string(),
            ..MessageData::default()
        }),
    });

    let compiled = Compiler::builder(graph, CompileConfig::new("Demo"))
        .build()
        .compile();
    assert!(!compiled.output.code.contains("orphan-1"));
}

#[test]
fn test_dangling_target_degrades_with_diagnostic() {
    let mut graph = create_simple_graph();
    if let NodeData::Start(content) = &mut graph.nodes[0].data {
        content.buttons.push(nav_button("b2", "Ghost", "missing-node"));
    }

    let compiled = Compiler::builder(graph, CompileConfig::new("Demo"))
        .build()
        .compile();
    assert!(
        compiled
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::DanglingTarget)
    );
    // The button is still rendered, as a no-op affordance.
    assert!(compiled.output.code.contains("callback_data=\"noop\""));
    assert!(compiled.output.code.contains("async def on_noop("));
}

#[test]
fn test_duplicate_command_registers_once() {
    let mut graph = create_simple_graph();
    graph.nodes.push(Node {
        id: "help-1".to_string(),
        position: Position::default(),
        data: NodeData::Command(CommandData {
            command: "help".to_string(),
            aliases: vec![],
            content: MessageData {
                text: "First help".to_string(),
                ..MessageData::default()
            },
        }),
    });
    graph.nodes.push(Node {
        id: "help-2".to_string(),
        position: Position::default(),
        data: NodeData::Command(CommandData {
            command: "help".to_string(),
            aliases: vec![],
            content: MessageData {
                text: "Second help".to_string(),
                ..MessageData::default()
            },
        }),
    });

    let compiled = Compiler::builder(graph, CompileConfig::new("Demo"))
        .build()
        .compile();
    let registrations = compiled
        .output
        .code
        .matches("@dp.message(Command(\"help\"))")
        .count();
    assert_eq!(registrations, 1);
    assert!(
        compiled
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::DuplicateCommand)
    );
}

#[test]
fn test_command_aliases_each_get_a_handler() {
    let mut graph = create_simple_graph();
    graph.nodes.push(Node {
        id: "info-1".to_string(),
        position: Position::default(),
        data: NodeData::Command(CommandData {
            command: "info".to_string(),
            aliases: vec!["about".to_string(), "version".to_string()],
            content: MessageData {
                text: "All about this bot".to_string(),
                ..MessageData::default()
            },
        }),
    });

    let compiled = Compiler::builder(graph, CompileConfig::new("Demo"))
        .build()
        .compile();
    let code = &compiled.output.code;
    assert!(code.contains("@dp.message(Command(\"info\"))"));
    assert!(code.contains("@dp.message(Command(\"about\"))"));
    assert!(code.contains("@dp.message(Command(\"version\"))"));
    // All aliases delegate to the same composition function.
    assert_eq!(code.matches("await show_info_1(message.chat.id, user_id)").count(), 3);
}

#[test]
fn test_persistence_weaving() {
    let mut config = CompileConfig::new("Demo");
    config.enable_database = true;
    config.project_id = Some(77);

    let compiled = Compiler::builder(create_simple_graph(), config)
        .build()
        .compile();
    let code = &compiled.output.code;
    assert!(code.contains("from database import save_user, update_user_activity"));
    assert!(code.contains("PROJECT_ID = 77"));
    assert!(code.contains("await save_user(user_id, PROJECT_ID)"));
    assert!(code.contains("await update_user_activity(user_id, PROJECT_ID)"));
}

#[test]
fn test_command_groups_emit_set_my_commands() {
    let mut config = CompileConfig::new("Demo");
    config.command_groups = vec![CommandGroup {
        title: "Main".to_string(),
        commands: vec![
            CommandSpec {
                command: "start".to_string(),
                description: "Start the bot".to_string(),
            },
            CommandSpec {
                command: "help".to_string(),
                description: "Show help".to_string(),
            },
        ],
    }];

    let compiled = Compiler::builder(create_simple_graph(), config)
        .build()
        .compile();
    let code = &compiled.output.code;
    assert!(code.contains("await bot.set_my_commands(["));
    assert!(code.contains("BotCommand(command=\"start\", description=\"Start the bot\")"));
    assert!(code.contains("BotCommand(command=\"help\", description=\"Show help\")"));
}

#[test]
fn test_artifact_round_trip() {
    let compiled = Compiler::builder(create_simple_graph(), CompileConfig::new("Demo"))
        .build()
        .compile();

    let dir = std::env::temp_dir().join("botforge-artifact-test");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("compiled.bin");
    let path = path.to_str().unwrap();

    compiled.save(path).expect("save artifact");
    let loaded = CompiledBot::from_file(path).expect("load artifact");
    assert_eq!(loaded.output.code, compiled.output.code);
    assert_eq!(loaded.output.node_map, compiled.output.node_map);
}
