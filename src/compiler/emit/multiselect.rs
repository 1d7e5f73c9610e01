use super::inline_button_expr;
use crate::compiler::callback;
use crate::compiler::writer::{CodeWriter, py_str};
use crate::compiler::EmitCtx;
use crate::diagnostics::DiagnosticKind;
use crate::graph::{ButtonAction, MessageData, Node};

/// Emits `_kb_{stem}(user_id)`: the multi-select keyboard builder, reused by
/// the composition function and by the toggle handler's redraw.
///
/// Toggle buttons are indexed by declaration order; selected options are
/// marked with a leading checkmark. The continue button is appended exactly
/// once.
pub(super) fn emit_keyboard_helper(
    w: &mut CodeWriter,
    node: &Node,
    content: &MessageData,
    ctx: &mut EmitCtx,
) {
    let stem = ctx.stem(&node.id);
    let hash = ctx.hash(&node.id);
    let ms = content.multi_select.as_ref().expect("gated by caller");

    w.line(format!("def _kb_{stem}(user_id):"));
    w.block(|w| {
        w.line(format!(
            "selected = multi_select.get(user_id, {{}}).get({}, [])",
            py_str(&ms.variable)
        ));
        w.line("rows = []");

        let mut toggle_index = 0usize;
        for button in &content.buttons {
            if button.action == ButtonAction::ToggleSelection {
                let option = py_str(&button.text);
                let payload = callback::encode_selection(&hash, toggle_index);
                w.line(format!(
                    "rows.append([InlineKeyboardButton(text=(\"\\u2705 \" if {option} in selected else \"\") + {option}, callback_data=\"{payload}\")])"
                ));
                toggle_index += 1;
            } else {
                let expr = inline_button_expr(button, ctx);
                w.line(format!("rows.append([{expr}])"));
            }
        }

        let continue_payload = callback::encode_continue(&hash);
        w.line(format!(
            "rows.append([InlineKeyboardButton(text={}, callback_data=\"{continue_payload}\")])",
            py_str(&ms.continue_label)
        ));
        w.line("return InlineKeyboardMarkup(inline_keyboard=rows)");
    });
}

/// Emits the toggle and continue callback handlers for a multi-select node.
pub(super) fn emit_handlers(
    w: &mut CodeWriter,
    node: &Node,
    content: &MessageData,
    ctx: &mut EmitCtx,
) {
    let stem = ctx.stem(&node.id);
    let hash = ctx.hash(&node.id);
    let ms = content.multi_select.as_ref().expect("gated by caller");

    let options: Vec<String> = content
        .buttons
        .iter()
        .filter(|b| b.action == ButtonAction::ToggleSelection)
        .map(|b| py_str(&b.text))
        .collect();

    let toggle_pattern = format!("sel:{hash}:");
    if ctx.registry.claim_callback(&toggle_pattern) {
        w.blank();
        w.line(format!(
            "@dp.callback_query(F.data.startswith(\"{toggle_pattern}\"))"
        ));
        w.line(format!("async def on_select_{stem}(callback: CallbackQuery):"));
        w.block(|w| {
            w.line("user_id = callback.from_user.id");
            if let Some(hook) = ctx.persistence_update() {
                w.line(hook);
            }
            w.line(format!("options = [{}]", options.join(", ")));
            w.line("index = int(callback.data.rsplit(\":\", 1)[1])");
            w.line("if 0 <= index < len(options):");
            w.block(|w| {
                w.line("choice = options[index]");
                w.line(format!(
                    "bucket = multi_select.setdefault(user_id, {{}}).setdefault({}, [])",
                    py_str(&ms.variable)
                ));
                w.line("if choice in bucket:");
                w.block(|w| w.line("bucket.remove(choice)"));
                w.line("else:");
                w.block(|w| w.line("bucket.append(choice)"));
                // Redraw only; the message body is never re-sent.
                w.line(format!(
                    "await callback.message.edit_reply_markup(reply_markup=_kb_{stem}(user_id))"
                ));
            });
            w.line("await callback.answer()");
        });
    } else {
        ctx.diagnostics.push(
            DiagnosticKind::DuplicateCallback,
            Some(node.id.as_str()),
            format!("callback pattern '{toggle_pattern}' already registered"),
        );
    }

    let continue_payload = callback::encode_continue(&hash);
    if ctx.registry.claim_callback(&continue_payload) {
        w.blank();
        w.line(format!(
            "@dp.callback_query(F.data == \"{continue_payload}\")"
        ));
        w.line(format!(
            "async def on_continue_{stem}(callback: CallbackQuery):"
        ));
        w.block(|w| {
            w.line("user_id = callback.from_user.id");
            if let Some(hook) = ctx.persistence_update() {
                w.line(hook);
            }
            w.line(format!(
                "chosen = multi_select.get(user_id, {{}}).get({}, [])",
                py_str(&ms.variable)
            ));
            // Selection order, comma-joined, becomes the variable value.
            w.line(format!(
                "set_var(user_id, {}, \",\".join(chosen))",
                py_str(&ms.variable)
            ));
            w.line("await callback.answer()");
            if let Some(target) = ms
                .continue_target
                .as_deref()
                .filter(|t| ctx.reachable.contains(t))
            {
                w.line(format!(
                    "await {}(callback.message.chat.id, user_id)",
                    ctx.show_fn(target)
                ));
            }
        });
    } else {
        ctx.diagnostics.push(
            DiagnosticKind::DuplicateCallback,
            Some(node.id.as_str()),
            format!("callback pattern '{continue_payload}' already registered"),
        );
    }
}
