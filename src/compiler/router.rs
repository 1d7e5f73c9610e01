use super::EmitCtx;
use super::writer::{CodeWriter, py_str};
use ahash::AHashSet;
use itertools::Itertools;

/// Claims command strings, callback patterns and text phrases during
/// emission. First claim wins; later duplicates are skipped by their
/// emitters, so at most one handler is ever registered per trigger pattern.
#[derive(Debug, Default)]
pub(crate) struct HandlerRegistry {
    commands: AHashSet<String>,
    callbacks: AHashSet<String>,
    texts: AHashSet<String>,
}

impl HandlerRegistry {
    pub fn claim_command(&mut self, command: &str) -> bool {
        self.commands.insert(command.to_string())
    }

    pub fn claim_callback(&mut self, pattern: &str) -> bool {
        self.callbacks.insert(pattern.to_string())
    }

    pub fn claim_text(&mut self, phrase: &str) -> bool {
        self.texts.insert(phrase.to_string())
    }
}

/// Assembles the final program: boilerplate, woven optional features, the
/// node blocks in stable input order, shared dispatchers and tables, and the
/// entry point.
pub(crate) fn assemble(blocks: Vec<CodeWriter>, ctx: &mut EmitCtx) -> String {
    let mut w = CodeWriter::new();

    emit_header(&mut w, ctx);
    emit_imports(&mut w, ctx);
    emit_setup(&mut w, ctx);

    for block in blocks {
        w.blank();
        w.append(block);
    }

    if ctx.needs_noop {
        w.blank();
        w.line("@dp.callback_query(F.data == \"noop\")");
        w.line("async def on_noop(callback: CallbackQuery):");
        w.block(|w| w.line("await callback.answer()"));
    }

    if ctx.has_text_input {
        emit_text_catch_all(&mut w);
    }

    for media in ctx.media_kinds.clone() {
        let tag = media.tag();
        w.blank();
        w.line(format!("@dp.message(F.{tag})"));
        w.line(format!("async def on_{tag}_message(message: Message):"));
        w.block(|w| {
            w.line("user_id = message.from_user.id");
            w.line("pending = pending_media.get(user_id)");
            w.line(format!("if pending is None or pending[0] != \"{tag}\":"));
            w.block(|w| w.line("return"));
            w.line("pending_media.pop(user_id, None)");
            w.line("handler = MEDIA_ENTRY.get(pending[1])");
            w.line("if handler is not None:");
            w.block(|w| w.line("await handler(message)"));
        });
    }

    if ctx.has_text_input {
        w.blank();
        w.line("NODE_ENTRY = {");
        w.block(|w| {
            for (hash, show_fn) in &ctx.node_entries {
                w.line(format!("\"{hash}\": {show_fn},"));
            }
        });
        w.line("}");
    }

    if !ctx.media_entries.is_empty() {
        w.blank();
        w.line("MEDIA_ENTRY = {");
        w.block(|w| {
            for (hash, capture_fn) in &ctx.media_entries {
                w.line(format!("\"{hash}\": {capture_fn},"));
            }
        });
        w.line("}");
    }

    emit_main(&mut w, ctx);
    w.into_code()
}

fn emit_header(w: &mut CodeWriter, ctx: &EmitCtx) {
    // The bot name goes in verbatim; only a literal triple quote would break
    // the docstring, so that one sequence is escaped.
    let name = ctx.config.bot_name.replace("\"\"\"", "\\\"\\\"\\\"");
    w.line("\"\"\"");
    w.line(name);
    w.blank();
    w.line("Conversation flow bot. Generated automatically - edit the flow, not this file.");
    w.line("\"\"\"");
}

fn emit_imports(w: &mut CodeWriter, ctx: &EmitCtx) {
    w.blank();
    w.line("import asyncio");
    w.line("import logging");
    w.line("import time");
    w.blank();
    w.line("from aiogram import Bot, Dispatcher, F");
    w.line("from aiogram.filters import Command, CommandStart");
    w.line("from aiogram.types import (");
    w.block(|w| {
        w.line("BotCommand,");
        w.line("CallbackQuery,");
        w.line("ChatPermissions,");
        w.line("InlineKeyboardButton,");
        w.line("InlineKeyboardMarkup,");
        w.line("KeyboardButton,");
        w.line("Message,");
        w.line("ReplyKeyboardMarkup,");
    });
    w.line(")");
    if ctx.config.enable_database {
        w.blank();
        w.line("from database import save_user, update_user_activity");
    }
}

fn emit_setup(w: &mut CodeWriter, ctx: &EmitCtx) {
    w.blank();
    w.line("BOT_TOKEN = \"PASTE_YOUR_BOT_TOKEN_HERE\"");
    if ctx.config.enable_database {
        w.line(format!(
            "PROJECT_ID = {}",
            ctx.config.project_id.unwrap_or(0)
        ));
    }
    w.blank();
    w.line("bot = Bot(token=BOT_TOKEN)");
    w.line("dp = Dispatcher()");

    if ctx.config.enable_logging {
        w.blank();
        w.line(
            "logging.basicConfig(level=logging.INFO, format=\"%(asctime)s %(levelname)s %(name)s %(message)s\")",
        );
        w.line("logger = logging.getLogger(\"bot\")");
    }

    w.blank();
    w.line("user_vars = {}");
    w.line("pending_input = {}");
    w.line("pending_media = {}");
    w.line("multi_select = {}");
    w.blank();
    w.line("def set_var(user_id, name, value):");
    w.block(|w| w.line("user_vars.setdefault(user_id, {})[name] = value"));
    w.blank();
    w.line("def get_var(user_id, name):");
    w.block(|w| w.line("return user_vars.get(user_id, {}).get(name, \"\")"));
    w.blank();
    w.line("def format_text(user_id, text):");
    w.block(|w| {
        w.line("for key, value in user_vars.get(user_id, {}).items():");
        w.block(|w| w.line("text = text.replace(\"{\" + key + \"}\", str(value))"));
        w.line("return text");
    });
    w.blank();
    w.line("def normalize_text(value):");
    w.block(|w| w.line("return \" \".join(value.lower().split())"));

    if ctx.config.enable_logging {
        w.blank();
        w.line("@dp.update.outer_middleware()");
        w.line("async def logging_middleware(handler, event, data):");
        w.block(|w| {
            w.line("logger.info(\"update: %s\", type(event).__name__)");
            w.line("return await handler(event, data)");
        });
    }

    if ctx.needs_admin_table {
        w.blank();
        w.line("ADMIN_PERMISSIONS = [");
        w.block(|w| {
            for entry in &ctx.permissions {
                w.line(format!(
                    "(\"{}\", \"{}\", {}),",
                    entry.flag,
                    entry.prefix,
                    py_str(entry.label)
                ));
            }
        });
        w.line("]");
    }
}

fn emit_text_catch_all(w: &mut CodeWriter) {
    w.blank();
    w.line("@dp.message(F.text)");
    w.line("async def on_text_message(message: Message):");
    w.block(|w| {
        w.line("user_id = message.from_user.id");
        w.line("pending = pending_input.pop(user_id, None)");
        w.line("if pending is None:");
        w.block(|w| w.line("return"));
        w.line("variable, next_node = pending");
        w.line("set_var(user_id, variable, message.text)");
        w.line("handler = NODE_ENTRY.get(next_node)");
        w.line("if handler is not None:");
        w.block(|w| w.line("await handler(message.chat.id, user_id)"));
    });
}

fn emit_main(w: &mut CodeWriter, ctx: &EmitCtx) {
    let commands: Vec<(String, String)> = ctx
        .config
        .command_groups
        .iter()
        .flat_map(|group| group.commands.iter())
        .map(|spec| (spec.command.clone(), spec.description.clone()))
        .unique_by(|(command, _)| command.clone())
        .collect();

    w.blank();
    w.line("async def main():");
    w.block(|w| {
        if !commands.is_empty() {
            w.line("await bot.set_my_commands([");
            w.block(|w| {
                for (command, description) in &commands {
                    w.line(format!(
                        "BotCommand(command={}, description={}),",
                        py_str(command),
                        py_str(description)
                    ));
                }
            });
            w.line("])");
        }
        w.line("await dp.start_polling(bot)");
    });
    w.blank();
    w.line("if __name__ == \"__main__\":");
    w.block(|w| w.line("asyncio.run(main())"));
}
