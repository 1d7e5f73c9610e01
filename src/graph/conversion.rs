use super::definition::Graph;
use crate::error::GraphConversionError;

/// A trait for custom data models that can be converted into a canonical `Graph`.
///
/// This is the primary extension point for making the compiler format-agnostic.
/// The crate ships one implementation, for the visual editor's JSON format
/// (`EditorGraph`); backends with their own flow storage implement this trait
/// on their own structs.
///
/// # Example
///
/// ```rust,no_run
/// use botforge::error::GraphConversionError;
/// use botforge::graph::{Graph, IntoGraph, MessageData, Node, NodeData, Position};
///
/// struct MyNode { id: String, text: String }
/// struct MyFlow { nodes: Vec<MyNode> }
///
/// impl IntoGraph for MyFlow {
///     fn into_graph(self) -> Result<Graph, GraphConversionError> {
///         let nodes = self
///             .nodes
///             .into_iter()
///             .map(|n| Node {
///                 id: n.id,
///                 position: Position::default(),
///                 data: NodeData::Message(MessageData {
///                     text: n.text,
///                     ..MessageData::default()
///                 }),
///             })
///             .collect();
///         Ok(Graph {
///             nodes,
///             connections: vec![],
///             settings: None,
///         })
///     }
/// }
/// ```
pub trait IntoGraph {
    /// Consumes the object and converts it into a compiler-ready flow graph.
    fn into_graph(self) -> Result<Graph, GraphConversionError>;
}
