use super::{emit_entry_callback, emit_inline_keyboard_assign};
use crate::compiler::writer::{CodeWriter, py_str};
use crate::compiler::EmitCtx;
use crate::graph::{Node, TextInputData};

/// Text-input node: the composition function sends the prompt and arms the
/// pending-input marker; the router's single catch-all handler consumes it.
pub(super) fn emit_text_input(w: &mut CodeWriter, node: &Node, data: &TextInputData, ctx: &mut EmitCtx) {
    ctx.has_text_input = true;
    let stem = ctx.stem(&node.id);

    let target_hash = data
        .target
        .as_deref()
        .filter(|t| ctx.reachable.contains(t))
        .map(|t| ctx.hash(t))
        .unwrap_or_default();

    w.line(format!("async def show_{stem}(chat_id, user_id):"));
    w.block(|w| {
        w.line(format!(
            "pending_input[user_id] = ({}, \"{target_hash}\")",
            py_str(&data.variable)
        ));
        w.line(format!(
            "text = format_text(user_id, {})",
            py_str(&data.prompt)
        ));
        emit_inline_keyboard_assign(w, "keyboard", &data.buttons, ctx);
        w.line("await bot.send_message(chat_id, text, reply_markup=keyboard)");
    });

    emit_entry_callback(w, node, ctx);
}
