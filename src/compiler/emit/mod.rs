//! Handler emission: one strategy per node kind and feature combination.
//!
//! Every generated trigger block performs at most one outbound send, and every
//! composition function (`show_*`) performs exactly one. The helpers here keep
//! that invariant structural: text and keyboard are accumulated into locals
//! and a single `bot.send_message` closes each composition.

mod admin;
mod command;
mod input;
mod media;
mod message;
mod multiselect;

use super::writer::{CodeWriter, py_str};
use super::{EmitCtx, NavFlags};
use crate::diagnostics::DiagnosticKind;
use crate::graph::{Button, ButtonAction, ButtonKind, Node, NodeData};

/// Emits the full marker-bracketed block for one reachable node.
pub(crate) fn emit_node(node: &Node, ctx: &mut EmitCtx) -> CodeWriter {
    // Every node exposes its composition function through the dispatch table.
    let hash = ctx.hash(&node.id);
    let show_fn = ctx.show_fn(&node.id);
    ctx.node_entries.push((hash, show_fn));

    let mut w = CodeWriter::new();
    w.node_block(&node.id, |w| match &node.data {
        NodeData::Start(content) => command::emit_start(w, node, content, ctx),
        NodeData::Command(data) => command::emit_command(w, node, data, ctx),
        NodeData::Message(content) => message::emit_message(w, node, content, ctx),
        NodeData::TextInput(data) => input::emit_text_input(w, node, data, ctx),
        NodeData::MediaCapture(data) => media::emit_media_capture(w, node, data, ctx),
        NodeData::AdminAction(data) => admin::emit_admin_action(w, node, data, ctx),
        NodeData::AdminRights(data) => admin::emit_admin_rights(w, node, data, ctx),
    });
    w
}

/// Lowercases and collapses whitespace, mirroring the generated
/// `normalize_text` helper exactly.
pub(super) fn normalize_phrase(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Emits the callback-query handler that opens this node from a button press.
pub(super) fn emit_entry_callback(w: &mut CodeWriter, node: &Node, ctx: &mut EmitCtx) {
    let stem = ctx.stem(&node.id);
    let hash = ctx.hash(&node.id);
    let tag = match node.data {
        NodeData::Command(_) => "cmd",
        _ => "nav",
    };
    let pattern = format!("{tag}:{hash}");

    if !ctx.registry.claim_callback(&pattern) {
        ctx.diagnostics.push(
            DiagnosticKind::DuplicateCallback,
            Some(node.id.as_str()),
            format!("callback pattern '{pattern}' already registered"),
        );
        return;
    }

    w.blank();
    w.line(format!(
        "@dp.callback_query(F.data.startswith(\"{pattern}\"))"
    ));
    w.line(format!("async def on_open_{stem}(callback: CallbackQuery):"));
    w.block(|w| {
        w.line("user_id = callback.from_user.id");
        if let Some(hook) = ctx.persistence_update() {
            w.line(hook);
        }
        // Payload suffix carries per-button modifiers: 4-byte tag + 8-hex hash.
        w.line("flags = callback.data[12:]");
        w.line("if \"h\" in flags:");
        w.block(|w| w.line("await callback.message.edit_reply_markup(reply_markup=None)"));
        w.line("if \"s\" in flags:");
        w.block(|w| w.line("pending_input.pop(user_id, None)"));
        w.line("await callback.answer()");
        w.line(format!(
            "await {}(callback.message.chat.id, user_id)",
            ctx.show_fn(&node.id)
        ));
    });
}

/// Emits a normalized free-text matcher for a node's declared phrasings.
pub(super) fn emit_text_trigger(
    w: &mut CodeWriter,
    node: &Node,
    phrases: &[String],
    ctx: &mut EmitCtx,
) {
    let mut matched: Vec<String> = Vec::new();
    for phrase in phrases {
        let normalized = normalize_phrase(phrase);
        if normalized.is_empty() {
            continue;
        }
        if ctx.registry.claim_text(&normalized) {
            matched.push(normalized);
        } else {
            ctx.diagnostics.push(
                DiagnosticKind::DuplicateCommand,
                Some(node.id.as_str()),
                format!("text phrase '{normalized}' already handled by an earlier node"),
            );
        }
    }
    if matched.is_empty() {
        return;
    }

    let stem = ctx.stem(&node.id);
    let tuple = if matched.len() == 1 {
        format!("({},)", py_str(&matched[0]))
    } else {
        format!(
            "({})",
            matched
                .iter()
                .map(|p| py_str(p))
                .collect::<Vec<_>>()
                .join(", ")
        )
    };

    w.blank();
    w.line(format!(
        "@dp.message(F.text.func(lambda value: value is not None and normalize_text(value) in {tuple}))"
    ));
    w.line(format!("async def on_phrase_{stem}(message: Message):"));
    w.block(|w| {
        w.line("user_id = message.from_user.id");
        w.line(format!(
            "await {}(message.chat.id, user_id)",
            ctx.show_fn(&node.id)
        ));
    });
}

/// Renders one inline button. Buttons whose target never resolved become
/// no-op affordances rather than holes in the keyboard.
pub(super) fn inline_button_expr(button: &Button, ctx: &mut EmitCtx) -> String {
    let text = py_str(&button.text);
    match button.action {
        ButtonAction::Url => match &button.target {
            Some(url) if !url.is_empty() => {
                format!("InlineKeyboardButton(text={text}, url={})", py_str(url))
            }
            _ => {
                ctx.needs_noop = true;
                format!("InlineKeyboardButton(text={text}, callback_data=\"noop\")")
            }
        },
        ButtonAction::Navigate | ButtonAction::InvokeCommand => {
            let flags = NavFlags {
                hide: button.hide_after_click,
                skip_input: button.skip_data_collection,
            };
            match button
                .target
                .as_deref()
                .and_then(|t| ctx.entry_payload(t, flags))
            {
                Some(payload) => {
                    format!("InlineKeyboardButton(text={text}, callback_data=\"{payload}\")")
                }
                None => {
                    ctx.needs_noop = true;
                    format!("InlineKeyboardButton(text={text}, callback_data=\"noop\")")
                }
            }
        }
        // Toggle buttons outside a multi-select keyboard have no meaning.
        ButtonAction::ToggleSelection => {
            ctx.needs_noop = true;
            format!("InlineKeyboardButton(text={text}, callback_data=\"noop\")")
        }
    }
}

/// Emits `{var} = InlineKeyboardMarkup(...)` from a button list, one button
/// per row. Empty lists assign `None`.
pub(super) fn emit_inline_keyboard_assign(
    w: &mut CodeWriter,
    var: &str,
    buttons: &[Button],
    ctx: &mut EmitCtx,
) {
    if buttons.is_empty() {
        w.line(format!("{var} = None"));
        return;
    }
    w.line(format!("{var} = InlineKeyboardMarkup(inline_keyboard=["));
    w.block(|w| {
        for button in buttons {
            let expr = inline_button_expr(button, ctx);
            w.line(format!("[{expr}],"));
        }
    });
    w.line("])");
}

/// Emits `{var} = ReplyKeyboardMarkup(...)`. Reply keyboards never carry
/// callback data; pressing a button just sends its text.
pub(super) fn emit_reply_keyboard_assign(w: &mut CodeWriter, var: &str, buttons: &[Button]) {
    if buttons.is_empty() {
        w.line(format!("{var} = None"));
        return;
    }
    w.line(format!(
        "{var} = ReplyKeyboardMarkup(resize_keyboard=True, keyboard=["
    ));
    w.block(|w| {
        for button in buttons {
            let text = py_str(&button.text);
            let expr = match button.kind {
                ButtonKind::Text => format!("KeyboardButton(text={text})"),
                ButtonKind::RequestContact => {
                    format!("KeyboardButton(text={text}, request_contact=True)")
                }
                ButtonKind::RequestLocation => {
                    format!("KeyboardButton(text={text}, request_location=True)")
                }
            };
            w.line(format!("[{expr}],"));
        }
    });
    w.line("])");
}
