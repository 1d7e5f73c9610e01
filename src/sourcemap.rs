//! Node-to-line source map, built as a post-pass over the emitted text.
//!
//! Each node's contribution to the generated program is bracketed by a pair of
//! dedicated comment lines. The builder scans the final text line by line and
//! matches the pairs with a stack discipline: an end marker for node X closes
//! the most recently opened unmatched start marker for X. Unmatched starts
//! produce no range. Marker lines cannot collide with ordinary program text
//! because every user-supplied string is emitted as an escaped single-line
//! Python literal.

use serde::{Deserialize, Serialize};

pub(crate) const NODE_START_MARKER: &str = "# NODE_START:";
pub(crate) const NODE_END_MARKER: &str = "# NODE_END:";

/// The 1-based, inclusive line range a node occupies in the generated code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRange {
    pub node_id: String,
    pub start_line: usize,
    pub end_line: usize,
}

/// Scans emitted code for marker pairs and returns ranges ordered by start line.
pub fn build_node_map(code: &str) -> Vec<NodeRange> {
    let mut open: Vec<(String, usize)> = Vec::new();
    let mut ranges: Vec<NodeRange> = Vec::new();

    for (index, line) in code.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = line.trim_start();

        if let Some(id) = trimmed.strip_prefix(NODE_START_MARKER) {
            open.push((id.to_string(), line_no));
        } else if let Some(id) = trimmed.strip_prefix(NODE_END_MARKER) {
            // Close the most recent unmatched start for this id.
            if let Some(pos) = open.iter().rposition(|(open_id, _)| open_id == id) {
                let (node_id, start_line) = open.remove(pos);
                ranges.push(NodeRange {
                    node_id,
                    start_line,
                    end_line: line_no,
                });
            }
        }
    }

    ranges.sort_by_key(|r| r.start_line);
    ranges
}
