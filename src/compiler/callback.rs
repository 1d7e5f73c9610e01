//! Compact callback-payload codec.
//!
//! Telegram bounds callback data to 64 bytes, so every generated payload is a
//! short colon-separated form built from an 8-hex node hash plus a fixed action
//! tag. Decoding is the exact inverse of encoding; the tests rely on that to
//! pin the wire format.

use crate::error::CodecError;

/// Hard ceiling imposed by the target runtime on callback data.
pub const CALLBACK_DATA_LIMIT: usize = 64;

/// Permission-flag keys are truncated to this many characters inside admin
/// toggle payloads, leaving room for the user id and node hash.
pub const FLAG_PREFIX_LEN: usize = 12;

/// The fixed set of chat administrator rights the toggle keyboard manages,
/// with their keyboard labels.
pub const PERMISSION_FLAGS: [(&str, &str); 11] = [
    ("can_manage_chat", "Manage chat"),
    ("can_delete_messages", "Delete messages"),
    ("can_manage_video_chats", "Manage video chats"),
    ("can_restrict_members", "Restrict members"),
    ("can_promote_members", "Promote members"),
    ("can_change_info", "Change info"),
    ("can_invite_users", "Invite users"),
    ("can_pin_messages", "Pin messages"),
    ("can_post_stories", "Post stories"),
    ("can_edit_stories", "Edit stories"),
    ("can_delete_stories", "Delete stories"),
];

/// One row of the emitted permission table: flag, payload prefix, label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionEntry {
    pub flag: &'static str,
    pub prefix: String,
    pub label: &'static str,
}

fn truncate_flag(flag: &str) -> String {
    flag.chars().take(FLAG_PREFIX_LEN).collect()
}

/// Builds the flag→prefix table for the known permission set.
///
/// Truncated prefixes must stay distinguishable. If a future flag addition
/// breaks that, the colliding prefix is disambiguated deterministically by
/// replacing its tail with an index, and the collision is returned so the
/// compiler can surface a diagnostic; generation itself still succeeds.
pub fn permission_prefix_table() -> (Vec<PermissionEntry>, Vec<(String, String)>) {
    let mut entries: Vec<PermissionEntry> = Vec::with_capacity(PERMISSION_FLAGS.len());
    let mut collisions = Vec::new();

    for (index, &(flag, label)) in PERMISSION_FLAGS.iter().enumerate() {
        let mut prefix = truncate_flag(flag);
        if let Some(existing) = entries.iter().find(|e| e.prefix == prefix) {
            collisions.push((existing.flag.to_string(), flag.to_string()));
            // Deterministic fallback: keep the head, end with the flag index.
            let suffix = format!("~{index}");
            prefix.truncate(FLAG_PREFIX_LEN.saturating_sub(suffix.len()));
            prefix.push_str(&suffix);
        }
        entries.push(PermissionEntry {
            flag,
            prefix,
            label,
        });
    }

    (entries, collisions)
}

/// Checks that the known permission-flag set survives truncation without
/// collisions. Exercised by tests so a flag addition fails loudly at
/// development time rather than silently merging two toggles.
pub fn verify_flag_prefixes() -> Result<(), CodecError> {
    let (_, collisions) = permission_prefix_table();
    match collisions.into_iter().next() {
        None => Ok(()),
        Some((first, second)) => Err(CodecError::PrefixCollision {
            first,
            second,
            prefix_len: FLAG_PREFIX_LEN,
        }),
    }
}

/// Per-button modifiers carried as a payload suffix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavFlags {
    /// Remove the inline keyboard the button came from.
    pub hide: bool,
    /// Abandon a pending input capture.
    pub skip_input: bool,
}

impl NavFlags {
    fn suffix(self) -> String {
        match (self.hide, self.skip_input) {
            (false, false) => String::new(),
            (true, false) => ":h".to_string(),
            (false, true) => ":s".to_string(),
            (true, true) => ":hs".to_string(),
        }
    }

    fn parse(suffix: &str) -> Option<Self> {
        match suffix {
            "" => Some(Self::default()),
            ":h" => Some(Self {
                hide: true,
                skip_input: false,
            }),
            ":s" => Some(Self {
                hide: false,
                skip_input: true,
            }),
            ":hs" => Some(Self {
                hide: true,
                skip_input: true,
            }),
            _ => None,
        }
    }
}

/// Payload for opening a message-family node.
pub fn encode_nav(node_hash: &str, flags: NavFlags) -> String {
    format!("nav:{node_hash}{}", flags.suffix())
}

/// Payload for invoking a command node from a button.
pub fn encode_command_entry(node_hash: &str, flags: NavFlags) -> String {
    format!("cmd:{node_hash}{}", flags.suffix())
}

/// Payload for toggling one multi-select option, identified by its
/// declaration index.
pub fn encode_selection(node_hash: &str, index: usize) -> String {
    format!("sel:{node_hash}:{index}")
}

/// Payload for the multi-select continue button.
pub fn encode_continue(node_hash: &str) -> String {
    format!("cont:{node_hash}")
}

/// Admin-toggle payload: action tag, truncated flag, target user id,
/// originating node hash, in that fixed order.
pub fn encode_admin_toggle(flag: &str, user_id: i64, node_hash: &str) -> String {
    format!("ap:{}:{user_id}:{node_hash}", truncate_flag(flag))
}

/// Admin refresh payload: redraw the keyboard without toggling.
pub fn encode_admin_refresh(user_id: i64, node_hash: &str) -> String {
    format!("apr:{user_id}:{node_hash}")
}

/// Registration pattern for one flag's toggle handler.
pub fn admin_toggle_pattern(prefix: &str) -> String {
    format!("ap:{prefix}:")
}

/// Registration pattern for the refresh handler.
pub fn admin_refresh_pattern() -> &'static str {
    "apr:"
}

/// A decoded entry payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryPayload {
    Nav { node_hash: String, flags: NavFlags },
    Command { node_hash: String, flags: NavFlags },
    Selection { node_hash: String, index: usize },
    Continue { node_hash: String },
}

/// Decoded admin-toggle payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminTogglePayload {
    pub flag_prefix: String,
    pub user_id: i64,
    pub node_hash: String,
}

fn split_hash_and_flags(rest: &str) -> Result<(String, NavFlags), CodecError> {
    let (hash, suffix) = match rest.find(':') {
        Some(pos) => (&rest[..pos], &rest[pos..]),
        None => (rest, ""),
    };
    if hash.len() != 8 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CodecError::Malformed(rest.to_string()));
    }
    let flags = NavFlags::parse(suffix).ok_or_else(|| CodecError::Malformed(rest.to_string()))?;
    Ok((hash.to_string(), flags))
}

/// Decodes any entry payload; the exact inverse of the `encode_*` family.
pub fn decode_entry(payload: &str) -> Result<EntryPayload, CodecError> {
    if let Some(rest) = payload.strip_prefix("nav:") {
        let (node_hash, flags) = split_hash_and_flags(rest)?;
        return Ok(EntryPayload::Nav { node_hash, flags });
    }
    if let Some(rest) = payload.strip_prefix("cmd:") {
        let (node_hash, flags) = split_hash_and_flags(rest)?;
        return Ok(EntryPayload::Command { node_hash, flags });
    }
    if let Some(rest) = payload.strip_prefix("sel:") {
        let (hash, index) = rest
            .split_once(':')
            .ok_or_else(|| CodecError::Malformed(payload.to_string()))?;
        let index = index
            .parse::<usize>()
            .map_err(|_| CodecError::Malformed(payload.to_string()))?;
        return Ok(EntryPayload::Selection {
            node_hash: hash.to_string(),
            index,
        });
    }
    if let Some(rest) = payload.strip_prefix("cont:") {
        return Ok(EntryPayload::Continue {
            node_hash: rest.to_string(),
        });
    }
    Err(CodecError::Malformed(payload.to_string()))
}

/// Decodes an admin-toggle payload; the exact inverse of [`encode_admin_toggle`].
pub fn decode_admin_toggle(payload: &str) -> Result<AdminTogglePayload, CodecError> {
    let rest = payload
        .strip_prefix("ap:")
        .ok_or_else(|| CodecError::Malformed(payload.to_string()))?;
    let mut parts = rest.split(':');
    let (flag_prefix, user_id, node_hash) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(flag), Some(uid), Some(hash), None) => (flag, uid, hash),
        _ => return Err(CodecError::Malformed(payload.to_string())),
    };
    let user_id = user_id
        .parse::<i64>()
        .map_err(|_| CodecError::Malformed(payload.to_string()))?;
    Ok(AdminTogglePayload {
        flag_prefix: flag_prefix.to_string(),
        user_id,
        node_hash: node_hash.to_string(),
    })
}

/// Decodes an admin-refresh payload; inverse of [`encode_admin_refresh`].
pub fn decode_admin_refresh(payload: &str) -> Result<(i64, String), CodecError> {
    let rest = payload
        .strip_prefix("apr:")
        .ok_or_else(|| CodecError::Malformed(payload.to_string()))?;
    let (uid, hash) = rest
        .split_once(':')
        .ok_or_else(|| CodecError::Malformed(payload.to_string()))?;
    let user_id = uid
        .parse::<i64>()
        .map_err(|_| CodecError::Malformed(payload.to_string()))?;
    Ok((user_id, hash.to_string()))
}
