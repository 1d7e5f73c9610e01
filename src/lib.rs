//! # botforge - Visual Chat-Flow Compiler
//!
//! **botforge** is the compiler at the heart of a visual conversational-flow
//! builder. It takes a directed graph describing a chat-bot's dialogue
//! (messages, commands, input captures, media handlers, group-admin actions)
//! and deterministically emits a runnable bot script for an asynchronous
//! command/callback-driven messaging runtime, together with a source map that
//! correlates generated lines with graph nodes.
//!
//! ## Core Workflow
//!
//! The compiler is format-agnostic. It operates on a canonical `Graph` model:
//!
//! 1.  **Load Your Flow**: Parse the editor's JSON with
//!     [`editor::graph_from_editor_json`], or implement [`graph::IntoGraph`]
//!     for your own storage format.
//! 2.  **Configure**: Build a [`compiler::CompileConfig`] with the bot name
//!     and feature flags (persistence, logging, group-admin handlers).
//! 3.  **Compile**: `Compiler::builder(graph, config).build().compile()`
//!     returns the generated code, the node→line map, and structured
//!     diagnostics. Compilation never fails: malformed node data degrades to
//!     conservative output.
//!
//! Identical graph and configuration always produce byte-identical output;
//! the editor relies on that for diffing and caching.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use botforge::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let graph = Graph {
//!         nodes: vec![Node {
//!             id: "start-1".to_string(),
//!             position: Position::default(),
//!             data: NodeData::Start(MessageData {
//!                 text: "Welcome!".to_string(),
//!                 ..MessageData::default()
//!             }),
//!         }],
//!         connections: vec![],
//!         settings: None,
//!     };
//!
//!     let mut config = CompileConfig::new("Demo Bot");
//!     config.enable_logging = true;
//!
//!     let compiled = Compiler::builder(graph, config).build().compile();
//!     println!("{}", compiled.output.code);
//!     for range in &compiled.output.node_map {
//!         println!("{} -> lines {}..={}", range.node_id, range.start_line, range.end_line);
//!     }
//!     Ok(())
//! }
//! ```

pub mod artifact;
pub mod compiler;
pub mod diagnostics;
pub mod editor;
pub mod error;
pub mod graph;
pub mod prelude;
pub mod sourcemap;

#[cfg(feature = "python-bindings")]
mod python;
