//! Prelude module for convenient imports
//!
//! Re-exports the most commonly used types and functions from the botforge
//! crate. Import this module to get access to the core functionality without
//! having to import each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use botforge::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let flow_json = std::fs::read_to_string("path/to/flow.json")?;
//! let (graph, _report) = botforge::editor::graph_from_editor_json(&flow_json)?;
//!
//! let config = CompileConfig::new("Support Bot");
//! let compiled = Compiler::builder(graph, config).build().compile();
//!
//! std::fs::write("bot.py", &compiled.output.code)?;
//! println!("{} nodes mapped", compiled.output.node_map.len());
//! # Ok(())
//! # }
//! ```

// Core compilation
pub use crate::compiler::{
    CodeWithMap, CommandGroup, CommandSpec, CompileConfig, CompiledBot, Compiler, CompilerBuilder,
    compile,
};

// Graph model
pub use crate::graph::{
    AdminAction, AdminActionData, AdminRightsData, AutoTransition, Button, ButtonAction,
    ButtonKind, CommandData, ConditionalMessage, Connection, Graph, GraphSettings, IntoGraph,
    KeyboardKind, MediaCaptureData, MediaKind, MessageData, MultiSelect, Node, NodeData, NodeKind,
    Position, TextInputData,
};

// Editor JSON layer
pub use crate::editor::{EditorGraph, graph_from_editor_json};

// Source map
pub use crate::sourcemap::{NodeRange, build_node_map};

// Diagnostics and errors
pub use crate::diagnostics::{Diagnostic, DiagnosticKind};
pub use crate::error::{ArtifactError, CodecError, GraphConversionError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
