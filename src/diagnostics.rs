use serde::{Deserialize, Serialize};

/// Classification of a compilation warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// A button, conditional branch or transition references a node id that
    /// does not exist in the graph.
    DanglingTarget,
    /// Two nodes register the same command string; only the first wins.
    DuplicateCommand,
    /// Two nodes register the same callback pattern; only the first wins.
    DuplicateCallback,
    /// Two node ids sanitized to the same function name; a suffix was added.
    NameCollision,
    /// Two permission flags collide after prefix truncation; the prefixes were
    /// disambiguated deterministically.
    FlagPrefixCollision,
    /// A statically-known callback payload exceeds the payload size limit.
    PayloadTooLong,
    /// The editor supplied a node type the compiler does not know; the node
    /// was degraded to a plain message node.
    UnknownNodeType,
    /// A node or connection entry in the editor document was not a usable
    /// record; it was degraded or skipped.
    MalformedEntry,
    /// A group-admin node was present but group-admin emission is disabled.
    AdminDisabled,
}

/// A single structured compilation warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub node_id: Option<String>,
    pub message: String,
}

/// Collects diagnostics during one compilation.
///
/// All intermediate state is local to a single `compile` call; when logging is
/// enabled the collector additionally forwards each entry to `tracing`.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    log: bool,
}

impl Diagnostics {
    pub fn new(log: bool) -> Self {
        Self {
            entries: Vec::new(),
            log,
        }
    }

    pub fn push(&mut self, kind: DiagnosticKind, node_id: Option<&str>, message: impl Into<String>) {
        let message = message.into();
        if self.log {
            tracing::warn!(?kind, node_id, "{}", message);
        }
        self.entries.push(Diagnostic {
            kind,
            node_id: node_id.map(str::to_string),
            message,
        });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}
