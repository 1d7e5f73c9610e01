use botforge::compiler::{CompileConfig, Compiler};
use botforge::editor::graph_from_editor_json;
use std::env;
use std::fs;

fn main() {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: cargo run -- <path/to/flow.json> [bot name]");
        std::process::exit(1);
    }

    let flow_path = &args[1];
    let bot_name = args.get(2).map(String::as_str).unwrap_or("Bot");

    println!("Loading flow from: {}", flow_path);

    let flow_json = match fs::read_to_string(flow_path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Failed to read flow file '{}': {}", flow_path, e);
            std::process::exit(1);
        }
    };

    let (graph, report) = match graph_from_editor_json(&flow_json) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Failed to parse flow: {}", e);
            std::process::exit(1);
        }
    };

    println!(
        "Compiling {} nodes, {} connections...",
        graph.nodes.len(),
        graph.connections.len()
    );

    let compiled = Compiler::builder(graph, CompileConfig::new(bot_name))
        .build()
        .compile();

    for diagnostic in report.iter().chain(compiled.diagnostics.iter()) {
        eprintln!("warning: {}", diagnostic.message);
    }

    if let Err(e) = fs::write("bot.py", &compiled.output.code) {
        eprintln!("Failed to write bot.py: {}", e);
        std::process::exit(1);
    }

    println!(
        "Wrote bot.py ({} lines, {} mapped nodes)",
        compiled.output.code.lines().count(),
        compiled.output.node_map.len()
    );
}
