use botforge::compiler::{CommandGroup, CommandSpec, CompileConfig, Compiler};
use botforge::editor::graph_from_editor_json;
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

// --- JSON Deserialization Structs (Input Format Specific) ---
// Command groups arrive as a separate document next to the flow; this shape
// is only used here for conversion into the compiler's config.

#[derive(Deserialize)]
struct RawCommandGroup {
    title: String,
    commands: Vec<RawCommandSpec>,
}

#[derive(Deserialize)]
struct RawCommandSpec {
    command: String,
    #[serde(default)]
    description: String,
}

/// A deterministic chat-flow to bot-script compiler CLI
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the editor flow JSON file
    flow_path: String,

    /// Bot display name embedded in the generated header
    #[arg(short, long, default_value = "Bot")]
    name: String,

    /// Path to write the generated bot script to
    #[arg(short, long, default_value = "bot.py")]
    output: String,

    /// Optional path to write the node map as JSON
    #[arg(long)]
    map_output: Option<String>,

    /// Optional path to a command-groups JSON file
    #[arg(long)]
    command_groups: Option<String>,

    /// Weave user-persistence calls into the generated handlers
    #[arg(long)]
    database: bool,

    /// Project id threaded into persistence calls
    #[arg(long)]
    project_id: Option<i64>,

    /// Emit the logging middleware registration
    #[arg(long)]
    logging: bool,

    /// Emit real group-admin handlers
    #[arg(long)]
    admin: bool,

    /// Optional path to cache the compiled artifact (bincode)
    #[arg(long)]
    artifact: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let flow_json = fs::read_to_string(&cli.flow_path)
        .map_err(|e| format!("could not read '{}': {e}", cli.flow_path))?;

    let command_groups = match &cli.command_groups {
        Some(path) => {
            let raw = fs::read_to_string(path)?;
            let groups: Vec<RawCommandGroup> = serde_json::from_str(&raw)?;
            groups
                .into_iter()
                .map(|g| CommandGroup {
                    title: g.title,
                    commands: g
                        .commands
                        .into_iter()
                        .map(|c| CommandSpec {
                            command: c.command,
                            description: c.description,
                        })
                        .collect(),
                })
                .collect()
        }
        None => Vec::new(),
    };

    let (graph, report) = graph_from_editor_json(&flow_json)?;
    let config = CompileConfig {
        bot_name: cli.name.clone(),
        command_groups,
        enable_database: cli.database,
        project_id: cli.project_id,
        enable_logging: cli.logging,
        enable_group_admin: cli.admin,
    };

    let started = Instant::now();
    let compiled = Compiler::builder(graph, config).build().compile();
    let elapsed = started.elapsed();

    for diagnostic in report.iter().chain(compiled.diagnostics.iter()) {
        tracing::warn!(node_id = ?diagnostic.node_id, "{}", diagnostic.message);
    }

    fs::write(&cli.output, &compiled.output.code)?;
    println!(
        "Compiled in {:.2?}: {} -> {} ({} lines, {} mapped nodes)",
        elapsed,
        cli.flow_path,
        cli.output,
        compiled.output.code.lines().count(),
        compiled.output.node_map.len()
    );

    if let Some(map_path) = &cli.map_output {
        fs::write(map_path, serde_json::to_string_pretty(&compiled.output.node_map)?)?;
        println!("Wrote node map to {}", map_path);
    }

    if let Some(artifact_path) = &cli.artifact {
        compiled.save(artifact_path)?;
        println!("Cached artifact at {}", artifact_path);
    }

    Ok(())
}
