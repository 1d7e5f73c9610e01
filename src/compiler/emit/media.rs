use super::emit_entry_callback;
use crate::compiler::writer::{CodeWriter, py_str};
use crate::compiler::EmitCtx;
use crate::graph::{MediaCaptureData, MediaKind, Node};

/// Python expression extracting the captured value from an incoming message.
fn extraction_expr(media: MediaKind) -> &'static str {
    match media {
        MediaKind::Photo => "message.photo[-1].file_id if message.photo else \"\"",
        MediaKind::Video => "message.video.file_id if message.video else \"\"",
        MediaKind::Audio => "message.audio.file_id if message.audio else \"\"",
        MediaKind::Document => "message.document.file_id if message.document else \"\"",
        MediaKind::Sticker => "message.sticker.file_id if message.sticker else \"\"",
        MediaKind::Voice => "message.voice.file_id if message.voice else \"\"",
        MediaKind::Animation => "message.animation.file_id if message.animation else \"\"",
        MediaKind::Location => {
            "f\"{message.location.latitude},{message.location.longitude}\" if message.location else \"\""
        }
        MediaKind::Contact => "message.contact.phone_number if message.contact else \"\"",
    }
}

/// Media-capture node: the composition function arms a typed pending marker
/// and sends the prompt; the per-kind dispatcher routes the next matching
/// message into this node's capture function.
pub(super) fn emit_media_capture(
    w: &mut CodeWriter,
    node: &Node,
    data: &MediaCaptureData,
    ctx: &mut EmitCtx,
) {
    if !ctx.media_kinds.contains(&data.media) {
        ctx.media_kinds.push(data.media);
    }

    let stem = ctx.stem(&node.id);
    let hash = ctx.hash(&node.id);
    let tag = data.media.tag();
    ctx.media_entries
        .push((hash.clone(), format!("capture_{stem}")));

    w.line(format!("async def show_{stem}(chat_id, user_id):"));
    w.block(|w| {
        w.line(format!(
            "pending_media[user_id] = (\"{tag}\", \"{hash}\")"
        ));
        w.line(format!(
            "await bot.send_message(chat_id, format_text(user_id, {}))",
            py_str(&data.prompt)
        ));
    });

    let target = data
        .target
        .as_deref()
        .filter(|t| ctx.reachable.contains(t))
        .map(|t| ctx.show_fn(t));

    w.blank();
    w.line(format!("async def capture_{stem}(message):"));
    w.block(|w| {
        w.line("user_id = message.from_user.id");
        w.line(format!("value = {}", extraction_expr(data.media)));
        w.line(format!("set_var(user_id, {}, value)", py_str(&data.variable)));
        match target {
            Some(show) => w.line(format!("await {show}(message.chat.id, user_id)")),
            None => w.line(format!(
                "await bot.send_message(message.chat.id, format_text(user_id, {}))",
                py_str(&data.reply_text)
            )),
        }
    });

    emit_entry_callback(w, node, ctx);
}
