use crate::diagnostics::{DiagnosticKind, Diagnostics};
use ahash::{AHashMap, AHashSet, RandomState};
use std::hash::{BuildHasher, Hash, Hasher};

// Fixed seeds: output must be byte-identical across processes and machines,
// so the hasher cannot use ahash's per-process random state.
const HASH_SEEDS: (u64, u64, u64, u64) = (
    0x9e37_79b9_7f4a_7c15,
    0x2545_f491_4f6c_dd1d,
    0x27d4_eb2f_1656_67c5,
    0x1656_67b1_9e37_79f9,
);

/// Stable 8-hex digest of a node id, used inside callback payloads.
pub(crate) fn stable_hash(value: &str) -> String {
    stable_hash_salted(value, 0)
}

fn stable_hash_salted(value: &str, salt: u64) -> String {
    let state = RandomState::with_seeds(HASH_SEEDS.0, HASH_SEEDS.1, HASH_SEEDS.2, HASH_SEEDS.3);
    let mut hasher = state.build_hasher();
    value.hash(&mut hasher);
    salt.hash(&mut hasher);
    format!("{:08x}", hasher.finish() as u32)
}

/// Sanitizes a node id into an identifier-legal, case-preserving stem.
pub(crate) fn sanitize_ident(raw: &str) -> String {
    let mut stem: String = raw
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        stem.push('_');
    }
    if stem.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        stem.insert(0, '_');
    }
    stem
}

/// Per-compilation table of derived node identifiers.
///
/// Built over the reachable set in iteration order so suffix assignment is
/// deterministic: the first node to claim a stem keeps it, later collisions
/// get `_2`, `_3`, ...
#[derive(Debug, Default)]
pub(crate) struct IdentTable {
    stems: AHashMap<String, String>,
    hashes: AHashMap<String, String>,
}

impl IdentTable {
    pub fn build<'a>(
        node_ids: impl Iterator<Item = &'a String>,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let mut table = Self::default();
        let mut used_stems: AHashSet<String> = AHashSet::new();
        let mut used_hashes: AHashSet<String> = AHashSet::new();

        for id in node_ids {
            let base = sanitize_ident(id);
            let mut stem = base.clone();
            let mut suffix = 2usize;
            while !used_stems.insert(stem.clone()) {
                stem = format!("{base}_{suffix}");
                suffix += 1;
            }
            if stem != base {
                diagnostics.push(
                    DiagnosticKind::NameCollision,
                    Some(id.as_str()),
                    format!("node id sanitized to '{base}' collides; using '{stem}'"),
                );
            }

            let mut salt = 0u64;
            let mut hash = stable_hash_salted(id, salt);
            while !used_hashes.insert(hash.clone()) {
                salt += 1;
                hash = stable_hash_salted(id, salt);
            }

            table.stems.insert(id.clone(), stem);
            table.hashes.insert(id.clone(), hash);
        }

        table
    }

    pub fn stem(&self, node_id: &str) -> Option<&str> {
        self.stems.get(node_id).map(String::as_str)
    }

    /// Name of the node's shared composition function.
    pub fn show_fn(&self, node_id: &str) -> Option<String> {
        self.stem(node_id).map(|s| format!("show_{s}"))
    }

    pub fn hash(&self, node_id: &str) -> Option<&str> {
        self.hashes.get(node_id).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_preserves_case_and_replaces_illegal_chars() {
        assert_eq!(sanitize_ident("Node-3 a"), "Node_3_a");
        assert_eq!(sanitize_ident("7up"), "_7up");
        assert_eq!(sanitize_ident(""), "_");
    }

    #[test]
    fn stable_hash_is_reproducible() {
        assert_eq!(stable_hash("node-1"), stable_hash("node-1"));
        assert_ne!(stable_hash("node-1"), stable_hash("node-2"));
        assert_eq!(stable_hash("node-1").len(), 8);
    }

    #[test]
    fn colliding_stems_get_deterministic_suffixes() {
        let ids = vec!["a b".to_string(), "a-b".to_string(), "a_b".to_string()];
        let mut diags = Diagnostics::new(false);
        let table = IdentTable::build(ids.iter(), &mut diags);
        assert_eq!(table.stem("a b"), Some("a_b"));
        assert_eq!(table.stem("a-b"), Some("a_b_2"));
        assert_eq!(table.stem("a_b"), Some("a_b_3"));
        assert_eq!(diags.entries().len(), 2);
    }
}
