use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Value, json};
use std::fs;

/// A CLI tool to generate synthetic editor flows for benchmarks and testing
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_flow.json")]
    output: String,

    /// Number of nodes to generate
    #[arg(short, long, default_value_t = 50)]
    nodes: usize,

    /// Connection density: connections per node, on average
    #[arg(short, long, default_value_t = 0.5)]
    density: f64,

    /// Seed for reproducible output
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.nodes == 0 {
        eprintln!("Error: --nodes must be at least 1");
        std::process::exit(1);
    }

    println!(
        "Generating flow with {} nodes (density {}, seed {})...",
        cli.nodes, cli.density, cli.seed
    );

    let mut rng = StdRng::seed_from_u64(cli.seed);
    let flow = generate_flow(&mut rng, cli.nodes, cli.density);

    fs::write(&cli.output, serde_json::to_string_pretty(&flow)?)?;
    println!("Wrote {}", cli.output);
    Ok(())
}

fn generate_flow(rng: &mut StdRng, node_count: usize, density: f64) -> Value {
    let mut nodes = Vec::with_capacity(node_count);

    nodes.push(json!({
        "id": "node-0",
        "type": "start",
        "position": {"x": 0.0, "y": 0.0},
        "data": {"messageText": "Welcome!"},
    }));

    for index in 1..node_count {
        let id = format!("node-{index}");
        let position = json!({"x": (index % 20) as f64 * 180.0, "y": (index / 20) as f64 * 120.0});
        let node = match rng.random_range(0..10u32) {
            0 => json!({
                "id": id,
                "type": "command",
                "position": position,
                "data": {"command": format!("cmd{index}"), "messageText": format!("Command {index}")},
            }),
            1 => json!({
                "id": id,
                "type": "textInput",
                "position": position,
                "data": {"messageText": "Type something:", "inputVariable": format!("var{index}")},
            }),
            2 => json!({
                "id": id,
                "type": "photo",
                "position": position,
                "data": {"messageText": "Send a photo:", "inputVariable": format!("photo{index}"), "replyText": "Thanks!"},
            }),
            3 => json!({
                "id": id,
                "type": "message",
                "position": position,
                "data": {
                    "messageText": format!("Pick options ({index})"),
                    "keyboardType": "inline",
                    "multiSelectVariable": format!("choices{index}"),
                    "buttons": [
                        {"id": format!("b{index}-1"), "text": "Alpha", "action": "toggle-selection"},
                        {"id": format!("b{index}-2"), "text": "Beta", "action": "toggle-selection"},
                    ],
                },
            }),
            _ => json!({
                "id": id,
                "type": "message",
                "position": position,
                "data": {"messageText": format!("Message {index}")},
            }),
        };
        nodes.push(node);
    }

    let connection_count = ((node_count as f64) * density) as usize;
    let mut connections = Vec::with_capacity(connection_count);
    for _ in 0..connection_count {
        let source = rng.random_range(0..node_count);
        let target = rng.random_range(0..node_count);
        connections.push(json!({
            "source": format!("node-{source}"),
            "target": format!("node-{target}"),
        }));
    }

    json!({"nodes": nodes, "connections": connections})
}
