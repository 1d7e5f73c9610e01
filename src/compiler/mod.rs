use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::graph::{Graph, MediaKind, Node, NodeData};
use crate::sourcemap::{self, NodeRange};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

mod callback;
mod emit;
mod ident;
mod reachability;
mod router;
mod writer;

pub use callback::{
    AdminTogglePayload, CALLBACK_DATA_LIMIT, EntryPayload, FLAG_PREFIX_LEN, NavFlags,
    PERMISSION_FLAGS, PermissionEntry, decode_admin_refresh, decode_admin_toggle, decode_entry,
    encode_admin_refresh, encode_admin_toggle, encode_command_entry, encode_continue, encode_nav,
    encode_selection, permission_prefix_table, verify_flag_prefixes,
};

use ident::IdentTable;
use reachability::ReachableSet;
use router::HandlerRegistry;
use writer::CodeWriter;

/// A user-visible command list entry, surfaced through the generated
/// `set_my_commands` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub command: String,
    pub description: String,
}

/// A named group of commands supplied by the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandGroup {
    pub title: String,
    pub commands: Vec<CommandSpec>,
}

/// Everything one compilation needs beyond the graph itself.
///
/// Passed explicitly through the whole pass; there is no process-wide state,
/// so concurrent compilations with different configurations never observe
/// each other.
#[derive(Debug, Clone, Default)]
pub struct CompileConfig {
    /// Embedded verbatim into the generated header docstring.
    pub bot_name: String,
    pub command_groups: Vec<CommandGroup>,
    /// Weave user-persistence calls into command and callback handlers.
    pub enable_database: bool,
    /// Threaded into persistence calls when `enable_database` is set.
    pub project_id: Option<i64>,
    /// Emit a logging middleware registration into the generated bot, and
    /// forward compiler diagnostics to `tracing`.
    pub enable_logging: bool,
    /// Emit real group-administration handlers. When disabled, admin nodes
    /// degrade to informational messages.
    pub enable_group_admin: bool,
}

impl CompileConfig {
    pub fn new(bot_name: impl Into<String>) -> Self {
        Self {
            bot_name: bot_name.into(),
            ..Self::default()
        }
    }
}

/// The generated program plus the node→line table the editor uses to
/// correlate source lines with graph nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeWithMap {
    pub code: String,
    pub node_map: Vec<NodeRange>,
}

/// Full result of one compilation: the output plus structured warnings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledBot {
    pub output: CodeWithMap,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct Compiler {
    graph: Graph,
    config: CompileConfig,
}

pub struct CompilerBuilder {
    graph: Graph,
    config: CompileConfig,
}

impl CompilerBuilder {
    pub fn new(graph: Graph, config: CompileConfig) -> Self {
        Self { graph, config }
    }

    pub fn build(self) -> Compiler {
        Compiler {
            graph: self.graph,
            config: self.config,
        }
    }
}

impl Compiler {
    pub fn builder(graph: Graph, config: CompileConfig) -> CompilerBuilder {
        CompilerBuilder::new(graph, config)
    }

    /// Runs the full pass pipeline. Never fails: malformed node data degrades
    /// to conservative output and is reported through diagnostics.
    pub fn compile(self) -> CompiledBot {
        let mut diagnostics = Diagnostics::new(self.config.enable_logging);

        let reachable = reachability::collect(&self.graph, &mut diagnostics);
        let idents = IdentTable::build(reachable.iter(), &mut diagnostics);

        let (permissions, collisions) = callback::permission_prefix_table();
        for (first, second) in collisions {
            diagnostics.push(
                crate::diagnostics::DiagnosticKind::FlagPrefixCollision,
                None,
                format!(
                    "permission flags '{first}' and '{second}' collide after truncation; \
                     prefixes were disambiguated"
                ),
            );
        }

        // First node wins on duplicate ids; later duplicates are shadowed.
        let mut nodes: AHashMap<&str, &Node> = AHashMap::with_capacity(self.graph.nodes.len());
        for node in &self.graph.nodes {
            nodes.entry(node.id.as_str()).or_insert(node);
        }

        let mut ctx = EmitCtx {
            config: &self.config,
            nodes,
            reachable: &reachable,
            idents: &idents,
            permissions,
            registry: HandlerRegistry::default(),
            diagnostics,
            node_entries: Vec::new(),
            media_entries: Vec::new(),
            media_kinds: Vec::new(),
            has_text_input: false,
            needs_noop: false,
            needs_admin_table: false,
        };

        let mut blocks: Vec<CodeWriter> = Vec::with_capacity(reachable.len());
        for node_id in reachable.iter() {
            if let Some(node) = ctx.nodes.get(node_id.as_str()).copied() {
                blocks.push(emit::emit_node(node, &mut ctx));
            }
        }

        let code = router::assemble(blocks, &mut ctx);
        let node_map = sourcemap::build_node_map(&code);

        CompiledBot {
            output: CodeWithMap { code, node_map },
            diagnostics: ctx.diagnostics.into_entries(),
        }
    }
}

/// Compiles a graph with default flags. `None` stands in for a missing or
/// unparseable graph and yields the minimal valid program carrying the bot
/// name, per the graceful-degradation contract.
pub fn compile(graph: Option<Graph>, bot_name: impl Into<String>) -> CodeWithMap {
    let graph = graph.unwrap_or_default();
    let config = CompileConfig::new(bot_name);
    Compiler::builder(graph, config).build().compile().output
}

/// Shared state threaded through handler emission. All of it is local to one
/// `compile` call.
pub(crate) struct EmitCtx<'a> {
    pub config: &'a CompileConfig,
    pub nodes: AHashMap<&'a str, &'a Node>,
    pub reachable: &'a ReachableSet,
    pub idents: &'a IdentTable,
    pub permissions: Vec<PermissionEntry>,
    pub registry: HandlerRegistry,
    pub diagnostics: Diagnostics,
    /// (node hash, composition function) pairs for the `NODE_ENTRY` table.
    pub node_entries: Vec<(String, String)>,
    /// (node hash, capture function) pairs for the `MEDIA_ENTRY` table.
    pub media_entries: Vec<(String, String)>,
    /// Media kinds that need a dispatcher, in first-use order.
    pub media_kinds: Vec<MediaKind>,
    pub has_text_input: bool,
    pub needs_noop: bool,
    pub needs_admin_table: bool,
}

impl<'a> EmitCtx<'a> {
    pub fn stem(&self, node_id: &str) -> String {
        self.idents
            .stem(node_id)
            .map(str::to_string)
            .unwrap_or_else(|| ident::sanitize_ident(node_id))
    }

    pub fn show_fn(&self, node_id: &str) -> String {
        format!("show_{}", self.stem(node_id))
    }

    pub fn hash(&self, node_id: &str) -> String {
        self.idents
            .hash(node_id)
            .map(str::to_string)
            .unwrap_or_else(|| ident::stable_hash(node_id))
    }

    /// The callback payload that opens `target_id`, or `None` when the target
    /// never received a handler (dangling reference).
    pub fn entry_payload(&self, target_id: &str, flags: NavFlags) -> Option<String> {
        if !self.reachable.contains(target_id) {
            return None;
        }
        let hash = self.hash(target_id);
        let payload = match self.nodes.get(target_id).map(|n| &n.data) {
            Some(NodeData::Command(_)) => callback::encode_command_entry(&hash, flags),
            _ => callback::encode_nav(&hash, flags),
        };
        Some(payload)
    }

    /// Persistence hook for command/start handlers.
    pub fn persistence_save(&self) -> Option<String> {
        self.config
            .enable_database
            .then(|| "await save_user(user_id, PROJECT_ID)".to_string())
    }

    /// Persistence hook for callback handlers.
    pub fn persistence_update(&self) -> Option<String> {
        self.config
            .enable_database
            .then(|| "await update_user_activity(user_id, PROJECT_ID)".to_string())
    }
}
