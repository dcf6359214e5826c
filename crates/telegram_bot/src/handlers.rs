use conversation::{Event, Reply};
use teloxide::{
    prelude::*,
    types::{CallbackQuery, ChatId, InputFile, User},
};

use crate::{ConfigParameters, ui};

pub(crate) async fn handle_message(
    bot: Bot,
    msg: Message,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    if !is_allowed(&cfg, msg.from.as_ref()) {
        return Ok(());
    }

    let Some(owner_id) = msg.from.as_ref().and_then(owner_id) else {
        bot.send_message(msg.chat.id, "Unable to identify the user.")
            .await?;
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let replies = cfg.router.route(owner_id, Event::from_text(text)).await;
    deliver(&bot, msg.chat.id, replies).await
}

pub(crate) async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    let _ = bot.answer_callback_query(q.id.clone()).await;

    if !is_allowed(&cfg, Some(&q.from)) {
        return Ok(());
    }

    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let chat_id = message.chat().id;
    let Some(owner_id) = owner_id(&q.from) else {
        return Ok(());
    };
    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };

    let event = match Event::decode_payload(data) {
        Ok(event) => event,
        Err(err) => {
            tracing::warn!(owner_id, "ignoring callback: {err}");
            return Ok(());
        }
    };

    let replies = cfg.router.route(owner_id, event).await;
    deliver(&bot, chat_id, replies).await
}

async fn deliver(bot: &Bot, chat_id: ChatId, replies: Vec<Reply>) -> ResponseResult<()> {
    for reply in replies {
        match reply {
            Reply::Text {
                text,
                keyboard: Some(keyboard),
            } => {
                bot.send_message(chat_id, text)
                    .reply_markup(ui::render_reply_keyboard(keyboard))
                    .await?;
            }
            Reply::Text {
                text,
                keyboard: None,
            } => {
                bot.send_message(chat_id, text).await?;
            }
            Reply::Choices {
                text,
                choices,
                columns,
            } => {
                bot.send_message(chat_id, text)
                    .reply_markup(ui::render_choices(&choices, columns))
                    .await?;
            }
            Reply::File {
                bytes,
                filename,
                caption,
            } => {
                bot.send_document(chat_id, InputFile::memory(bytes).file_name(filename))
                    .caption(caption)
                    .await?;
            }
        }
    }
    Ok(())
}

fn is_allowed(cfg: &ConfigParameters, from: Option<&User>) -> bool {
    let Some(from) = from else {
        return false;
    };
    match &cfg.allowed_users {
        None => true,
        Some(ids) if ids.contains(&from.id) => true,
        Some(_) => {
            tracing::warn!(user_id = from.id.0, "rejected user not in the allow-list");
            false
        }
    }
}

fn owner_id(user: &User) -> Option<i64> {
    i64::try_from(user.id.0).ok()
}
