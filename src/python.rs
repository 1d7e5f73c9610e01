use crate::compiler::{CompileConfig, CompiledBot, Compiler};
use crate::editor::graph_from_editor_json;
use pyo3::prelude::*;

/// A deterministic chat-flow compiler.
///
/// Compiles the editor's flow JSON on construction; the generated code, node
/// map and diagnostics are then available as cheap accessors. Compilation
/// itself never raises - only unparseable JSON does.
#[pyclass(name = "BotForge")]
struct BotForgePy {
    compiled: CompiledBot,
}

#[pymethods]
impl BotForgePy {
    /// Compiles a flow document.
    ///
    /// Args:
    ///     flow_json (str): The visual editor's flow document.
    ///     bot_name (str): Display name embedded in the generated header.
    ///     enable_database (bool): Weave persistence calls into handlers.
    ///     project_id (int | None): Project key threaded into persistence calls.
    ///     enable_logging (bool): Emit the logging middleware registration.
    ///     enable_group_admin (bool): Emit real group-admin handlers.
    ///
    /// Raises:
    ///     ValueError: If `flow_json` is not parseable JSON.
    #[new]
    #[pyo3(signature = (flow_json, bot_name, enable_database = false, project_id = None, enable_logging = false, enable_group_admin = false))]
    fn new(
        flow_json: &str,
        bot_name: &str,
        enable_database: bool,
        project_id: Option<i64>,
        enable_logging: bool,
        enable_group_admin: bool,
    ) -> PyResult<Self> {
        let (graph, mut report) = graph_from_editor_json(flow_json)
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string()))?;

        let config = CompileConfig {
            bot_name: bot_name.to_string(),
            command_groups: Vec::new(),
            enable_database,
            project_id,
            enable_logging,
            enable_group_admin,
        };

        let mut compiled = Compiler::builder(graph, config).build().compile();
        // Conversion degradations surface alongside compilation warnings.
        report.append(&mut compiled.diagnostics);
        compiled.diagnostics = report;
        Ok(BotForgePy { compiled })
    }

    /// The generated bot source text.
    fn code(&self) -> String {
        self.compiled.output.code.clone()
    }

    /// The node→line table as `(node_id, start_line, end_line)` tuples,
    /// 1-based and inclusive.
    fn node_map(&self) -> Vec<(String, usize, usize)> {
        self.compiled
            .output
            .node_map
            .iter()
            .map(|r| (r.node_id.clone(), r.start_line, r.end_line))
            .collect()
    }

    /// Structured warnings as human-readable strings.
    fn diagnostics(&self) -> Vec<String> {
        self.compiled
            .diagnostics
            .iter()
            .map(|d| match &d.node_id {
                Some(id) => format!("[{:?}] {}: {}", d.kind, id, d.message),
                None => format!("[{:?}] {}", d.kind, d.message),
            })
            .collect()
    }
}

#[pymodule]
fn botforge(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<BotForgePy>()?;
    Ok(())
}
