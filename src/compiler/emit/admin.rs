use super::emit_entry_callback;
use crate::compiler::callback;
use crate::compiler::writer::{CodeWriter, py_str};
use crate::compiler::EmitCtx;
use crate::diagnostics::DiagnosticKind;
use crate::graph::{AdminAction, AdminActionData, AdminRightsData, Node};

/// One-shot group administration node (ban, mute, promote, ...).
///
/// The composition accumulates an outcome text through the guard and failure
/// paths and closes with the node's single send.
pub(super) fn emit_admin_action(
    w: &mut CodeWriter,
    node: &Node,
    data: &AdminActionData,
    ctx: &mut EmitCtx,
) {
    let stem = ctx.stem(&node.id);

    if !ctx.config.enable_group_admin {
        emit_disabled_stub(w, &stem, &data.reply_text, node, ctx);
        emit_entry_callback(w, node, ctx);
        return;
    }

    w.line(format!("async def show_{stem}(chat_id, user_id):"));
    w.block(|w| {
        w.line(format!(
            "target_raw = get_var(user_id, {})",
            py_str(&data.target_variable)
        ));
        w.line(format!(
            "text = format_text(user_id, {})",
            py_str(&data.reply_text)
        ));
        w.line("if not target_raw:");
        w.block(|w| w.line("text = \"No target user selected.\""));
        w.line("else:");
        w.block(|w| {
            w.line("try:");
            w.block(|w| emit_action_call(w, data));
            w.line("except Exception as exc:");
            w.block(|w| w.line("text = f\"Action failed: {exc}\""));
        });
        w.line("await bot.send_message(chat_id, text)");
    });

    emit_entry_callback(w, node, ctx);
}

fn emit_action_call(w: &mut CodeWriter, data: &AdminActionData) {
    match data.action {
        AdminAction::Ban => {
            w.line("await bot.ban_chat_member(chat_id, int(target_raw))");
        }
        AdminAction::Unban => {
            w.line("await bot.unban_chat_member(chat_id, int(target_raw))");
        }
        AdminAction::Mute => match data.duration_seconds {
            Some(duration) => {
                w.line(format!(
                    "await bot.restrict_chat_member(chat_id, int(target_raw), permissions=ChatPermissions(can_send_messages=False), until_date=int(time.time()) + {duration})"
                ));
            }
            None => {
                w.line(
                    "await bot.restrict_chat_member(chat_id, int(target_raw), permissions=ChatPermissions(can_send_messages=False))",
                );
            }
        },
        AdminAction::Unmute => {
            w.line(
                "await bot.restrict_chat_member(chat_id, int(target_raw), permissions=ChatPermissions(can_send_messages=True, can_send_other_messages=True, can_add_web_page_previews=True))",
            );
        }
        AdminAction::Promote => {
            w.line(
                "await bot.promote_chat_member(chat_id, int(target_raw), can_manage_chat=True, can_delete_messages=True, can_invite_users=True, can_pin_messages=True)",
            );
        }
        AdminAction::Demote => {
            w.line("await bot.promote_chat_member(");
            w.block(|w| {
                w.line("chat_id,");
                w.line("int(target_raw),");
                for (flag, _) in callback::PERMISSION_FLAGS {
                    w.line(format!("{flag}=False,"));
                }
            });
            w.line(")");
        }
    }
}

/// Admin-rights node: the interactive permission toggle keyboard.
///
/// Each of the fixed permission flags gets its own callback handler matching
/// the encoded payload prefix; the refresh handler redraws without toggling.
pub(super) fn emit_admin_rights(
    w: &mut CodeWriter,
    node: &Node,
    data: &AdminRightsData,
    ctx: &mut EmitCtx,
) {
    let stem = ctx.stem(&node.id);
    let hash = ctx.hash(&node.id);

    if !ctx.config.enable_group_admin {
        emit_disabled_stub(w, &stem, &data.text, node, ctx);
        emit_entry_callback(w, node, ctx);
        return;
    }

    ctx.needs_admin_table = true;

    w.line(format!("async def show_{stem}(chat_id, user_id):"));
    w.block(|w| {
        w.line(format!(
            "target_raw = get_var(user_id, {})",
            py_str(&data.target_variable)
        ));
        w.line(format!(
            "text = format_text(user_id, {})",
            py_str(&data.text)
        ));
        w.line("keyboard = None");
        w.line("if target_raw:");
        w.block(|w| {
            w.line(format!(
                "keyboard = await _admin_keyboard_{stem}(chat_id, int(target_raw))"
            ));
        });
        w.line("else:");
        w.block(|w| w.line("text = \"No administrator selected.\""));
        w.line("await bot.send_message(chat_id, text, reply_markup=keyboard)");
    });

    w.blank();
    w.line(format!(
        "async def _admin_keyboard_{stem}(chat_id, target_id):"
    ));
    w.block(|w| {
        w.line("member = await bot.get_chat_member(chat_id, target_id)");
        w.line("rows = []");
        w.line("for flag, prefix, label in ADMIN_PERMISSIONS:");
        w.block(|w| {
            w.line("mark = \"\\u2705\" if bool(getattr(member, flag, False)) else \"\\u274c\"");
            w.line(format!(
                "rows.append([InlineKeyboardButton(text=f\"{{mark}} {{label}}\", callback_data=f\"ap:{{prefix}}:{{target_id}}:{hash}\")])"
            ));
        });
        w.line(format!(
            "rows.append([InlineKeyboardButton(text=\"\\U0001f504 Refresh\", callback_data=f\"apr:{{target_id}}:{hash}\")])"
        ));
        w.line("return InlineKeyboardMarkup(inline_keyboard=rows)");
    });

    let permissions = ctx.permissions.clone();
    for entry in &permissions {
        let pattern = callback::admin_toggle_pattern(&entry.prefix);
        if !ctx.registry.claim_callback(&pattern) {
            ctx.diagnostics.push(
                DiagnosticKind::DuplicateCallback,
                Some(node.id.as_str()),
                format!("callback pattern '{pattern}' already registered"),
            );
            continue;
        }

        w.blank();
        w.line(format!(
            "@dp.callback_query(F.data.startswith(\"{pattern}\"))"
        ));
        w.line(format!(
            "async def on_toggle_{stem}_{}(callback: CallbackQuery):",
            entry.flag
        ));
        w.block(|w| {
            w.line("user_id = callback.from_user.id");
            if let Some(hook) = ctx.persistence_update() {
                w.line(hook);
            }
            w.line("target_id = int(callback.data.split(\":\")[2])");
            w.line("chat_id = callback.message.chat.id");
            w.line("me = await bot.get_chat_member(chat_id, bot.id)");
            w.line("status = \"\"");
            w.line("if not getattr(me, \"can_promote_members\", False):");
            w.block(|w| {
                w.line("status = \"The bot needs promote rights to edit administrators.\"");
            });
            w.line("else:");
            w.block(|w| {
                w.line("member = await bot.get_chat_member(chat_id, target_id)");
                w.line("if getattr(member, \"status\", \"\") != \"administrator\":");
                w.block(|w| w.line("status = \"That user is not an administrator.\""));
                w.line("else:");
                w.block(|w| {
                    // Read the full current set, flip exactly one flag, apply
                    // the whole set in one call, then redraw.
                    w.line(
                        "rights = {flag: bool(getattr(member, flag, False)) for flag, _prefix, _label in ADMIN_PERMISSIONS}",
                    );
                    w.line(format!(
                        "rights[\"{}\"] = not rights[\"{}\"]",
                        entry.flag, entry.flag
                    ));
                    w.line("await bot.promote_chat_member(chat_id, target_id, **rights)");
                    w.line(format!(
                        "await callback.message.edit_reply_markup(reply_markup=await _admin_keyboard_{stem}(chat_id, target_id))"
                    ));
                });
            });
            w.line("await callback.answer(status or \"Permissions updated\")");
        });
    }

    let refresh_pattern = callback::admin_refresh_pattern();
    if ctx.registry.claim_callback(refresh_pattern) {
        w.blank();
        w.line(format!(
            "@dp.callback_query(F.data.startswith(\"{refresh_pattern}\"))"
        ));
        w.line(format!(
            "async def on_refresh_{stem}(callback: CallbackQuery):"
        ));
        w.block(|w| {
            w.line("user_id = callback.from_user.id");
            if let Some(hook) = ctx.persistence_update() {
                w.line(hook);
            }
            w.line("target_id = int(callback.data.split(\":\")[1])");
            w.line("chat_id = callback.message.chat.id");
            w.line(format!(
                "await callback.message.edit_reply_markup(reply_markup=await _admin_keyboard_{stem}(chat_id, target_id))"
            ));
            w.line("await callback.answer()");
        });
    } else {
        ctx.diagnostics.push(
            DiagnosticKind::DuplicateCallback,
            Some(node.id.as_str()),
            format!("callback pattern '{refresh_pattern}' already registered"),
        );
    }

    emit_entry_callback(w, node, ctx);
}

/// Conservative stand-in when group-admin emission is disabled: the node
/// still composes and sends its text, without any admin API calls.
fn emit_disabled_stub(
    w: &mut CodeWriter,
    stem: &str,
    text: &str,
    node: &Node,
    ctx: &mut EmitCtx,
) {
    ctx.diagnostics.push(
        DiagnosticKind::AdminDisabled,
        Some(node.id.as_str()),
        "group-admin emission is disabled; node degraded to a plain message".to_string(),
    );
    let fallback = if text.is_empty() {
        "Admin features are not enabled for this bot."
    } else {
        text
    };
    w.line(format!("async def show_{stem}(chat_id, user_id):"));
    w.block(|w| {
        w.line(format!(
            "await bot.send_message(chat_id, format_text(user_id, {}))",
            py_str(fallback)
        ));
    });
}
