use super::message::{emit_show_fn, multi_select_active};
use super::{emit_entry_callback, emit_text_trigger, multiselect};
use crate::compiler::writer::{CodeWriter, py_str};
use crate::compiler::EmitCtx;
use crate::compiler::ident::sanitize_ident;
use crate::diagnostics::DiagnosticKind;
use crate::graph::{CommandData, MessageData, Node};

/// Start node: the `/start` entry point.
pub(super) fn emit_start(w: &mut CodeWriter, node: &Node, content: &MessageData, ctx: &mut EmitCtx) {
    emit_show_fn(w, node, content, ctx);
    if multi_select_active(content) {
        multiselect::emit_handlers(w, node, content, ctx);
    }

    let stem = ctx.stem(&node.id);
    if ctx.registry.claim_command("start") {
        w.blank();
        w.line("@dp.message(CommandStart())");
        w.line(format!("async def cmd_{stem}(message: Message):"));
        emit_command_body(w, node, ctx);
    } else {
        ctx.diagnostics.push(
            DiagnosticKind::DuplicateCommand,
            Some(node.id.as_str()),
            "command 'start' already registered".to_string(),
        );
    }

    emit_entry_callback(w, node, ctx);
    emit_text_trigger(w, node, &content.synonyms, ctx);
}

/// Command node: one handler per distinct command string (the primary plus
/// each alias), all delegating to the shared composition function.
pub(super) fn emit_command(w: &mut CodeWriter, node: &Node, data: &CommandData, ctx: &mut EmitCtx) {
    emit_show_fn(w, node, &data.content, ctx);
    if multi_select_active(&data.content) {
        multiselect::emit_handlers(w, node, &data.content, ctx);
    }

    let stem = ctx.stem(&node.id);
    let mut first = true;
    for command in std::iter::once(&data.command).chain(data.aliases.iter()) {
        if command.is_empty() {
            continue;
        }
        if !ctx.registry.claim_command(command) {
            ctx.diagnostics.push(
                DiagnosticKind::DuplicateCommand,
                Some(node.id.as_str()),
                format!("command '{command}' already registered"),
            );
            continue;
        }
        let fn_name = if first {
            format!("cmd_{stem}")
        } else {
            format!("cmd_{stem}_{}", sanitize_ident(command))
        };
        first = false;

        w.blank();
        w.line(format!("@dp.message(Command({}))", py_str(command)));
        w.line(format!("async def {fn_name}(message: Message):"));
        emit_command_body(w, node, ctx);
    }

    emit_entry_callback(w, node, ctx);
    emit_text_trigger(w, node, &data.content.synonyms, ctx);
}

/// Shared body of every command alias handler: extract the user id first,
/// run the persistence hook, then delegate composition.
fn emit_command_body(w: &mut CodeWriter, node: &Node, ctx: &mut EmitCtx) {
    let show = ctx.show_fn(&node.id);
    let hook = ctx.persistence_save();
    w.block(|w| {
        w.line("user_id = message.from_user.id");
        if let Some(hook) = hook {
            w.line(hook);
        }
        w.line(format!("await {show}(message.chat.id, user_id)"));
    });
}
