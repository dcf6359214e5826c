//! Telegram bot.
//!
//! A thin transport over the conversation router: messages and button presses
//! are decoded into events, replies are rendered as Telegram messages,
//! keyboards and documents.

use conversation::Router;
use teloxide::{prelude::*, utils::command::BotCommands};

mod commands;
mod handlers;
mod ui;

#[derive(Clone)]
pub struct ConfigParameters {
    allowed_users: Option<Vec<UserId>>,
    router: Router,
}

pub struct Bot {
    token: String,
    allowed_users: Option<Vec<UserId>>,
    router: Router,
}

impl Bot {
    pub fn new(token: &str, allowed_users: Option<Vec<UserId>>, router: Router) -> Self {
        Self {
            token: token.to_string(),
            allowed_users,
            router,
        }
    }

    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    pub async fn run(&self) {
        tracing::info!("Starting telegram bot...");

        let bot = teloxide::Bot::new(&self.token);
        if let Err(err) = bot
            .set_my_commands(commands::MenuCommands::bot_commands())
            .await
        {
            tracing::warn!("failed to register bot commands: {err}");
        }

        let parameters = ConfigParameters {
            allowed_users: self.allowed_users.clone(),
            router: self.router.clone(),
        };

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(handlers::handle_message))
            .branch(Update::filter_callback_query().endpoint(handlers::handle_callback));

        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![parameters])
            .default_handler(|upd| async move {
                tracing::warn!("Unhandled update: {:?}", upd);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }
}

#[derive(Default)]
pub struct BotBuilder {
    token: String,
    allowed_users: Option<Vec<UserId>>,
    router: Option<Router>,
}

impl BotBuilder {
    pub fn token(mut self, token: &str) -> BotBuilder {
        self.token = token.to_string();
        self
    }

    /// Telegram user ids allowed to use the bot. Empty means everyone.
    pub fn allowed_users(mut self, allowed_users: Vec<u64>) -> BotBuilder {
        if !allowed_users.is_empty() {
            self.allowed_users = Some(allowed_users.into_iter().map(UserId).collect());
        }
        self
    }

    pub fn router(mut self, router: Router) -> BotBuilder {
        self.router = Some(router);
        self
    }

    pub fn build(self) -> Result<Bot, String> {
        tracing::info!("Initializing telegram bot...");
        if self.token.is_empty() {
            return Err("missing telegram token".to_string());
        }
        let router = self
            .router
            .ok_or_else(|| "missing conversation router".to_string())?;
        Ok(Bot::new(&self.token, self.allowed_users, router))
    }
}
