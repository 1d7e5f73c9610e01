use super::{
    emit_entry_callback, emit_inline_keyboard_assign, emit_reply_keyboard_assign,
    emit_text_trigger, multiselect,
};
use crate::compiler::writer::{CodeWriter, py_str};
use crate::compiler::EmitCtx;
use crate::graph::{Button, ButtonAction, KeyboardKind, MessageData, Node};

/// Plain message node: composition function, optional multi-select handlers,
/// entry callback and free-text trigger.
pub(super) fn emit_message(w: &mut CodeWriter, node: &Node, content: &MessageData, ctx: &mut EmitCtx) {
    emit_show_fn(w, node, content, ctx);
    if multi_select_active(content) {
        multiselect::emit_handlers(w, node, content, ctx);
    }
    emit_entry_callback(w, node, ctx);
    emit_text_trigger(w, node, &content.synonyms, ctx);
}

pub(super) fn multi_select_active(content: &MessageData) -> bool {
    content.multi_select.is_some() && content.keyboard == KeyboardKind::Inline
}

/// Emits `show_{stem}`: the node's single composition function, shared by
/// every trigger that opens the node. Exactly one send statement.
pub(super) fn emit_show_fn(w: &mut CodeWriter, node: &Node, content: &MessageData, ctx: &mut EmitCtx) {
    let stem = ctx.stem(&node.id);

    if multi_select_active(content) {
        multiselect::emit_keyboard_helper(w, node, content, ctx);
        w.blank();
    }

    let auto = content
        .auto_transition
        .as_ref()
        .filter(|a| ctx.reachable.contains(&a.target));

    w.line(format!("async def show_{stem}(chat_id, user_id):"));
    w.block(|w| {
        w.line(format!(
            "text = format_text(user_id, {})",
            py_str(&content.text)
        ));

        if multi_select_active(content) {
            w.line(format!("keyboard = _kb_{stem}(user_id)"));
        } else {
            match content.keyboard {
                KeyboardKind::Inline => {
                    emit_inline_keyboard_assign(w, "keyboard", &content.buttons, ctx)
                }
                KeyboardKind::Reply => {
                    emit_reply_keyboard_assign(w, "keyboard", &content.buttons)
                }
                KeyboardKind::None => w.line("keyboard = None"),
            }
        }

        for (index, cm) in content.conditional_messages.iter().enumerate() {
            let keyword = if index == 0 { "if" } else { "elif" };
            w.line(format!(
                "{keyword} get_var(user_id, {}) == {}:",
                py_str(&cm.condition),
                py_str(&cm.value)
            ));
            w.block(|w| {
                w.line(format!("text = format_text(user_id, {})", py_str(&cm.text)));
                let branch_buttons = navigation_only(&cm.buttons);
                if !branch_buttons.is_empty() {
                    emit_inline_keyboard_assign(w, "keyboard", &branch_buttons, ctx);
                }
            });
        }

        w.line("await bot.send_message(chat_id, text, reply_markup=keyboard)");
        if auto.is_some() {
            w.line(format!("asyncio.create_task(_auto_{stem}(chat_id, user_id))"));
        }
    });

    if let Some(auto) = auto {
        let target_show = ctx.show_fn(&auto.target);
        w.blank();
        w.line(format!("async def _auto_{stem}(chat_id, user_id):"));
        w.block(|w| {
            w.line(format!("await asyncio.sleep({})", auto.delay_seconds));
            w.line(format!("await {target_show}(chat_id, user_id)"));
        });
    }
}

/// Conditional branches only admit navigation buttons.
fn navigation_only(buttons: &[Button]) -> Vec<Button> {
    buttons
        .iter()
        .filter(|b| {
            matches!(
                b.action,
                ButtonAction::Navigate | ButtonAction::InvokeCommand
            )
        })
        .cloned()
        .collect()
}
