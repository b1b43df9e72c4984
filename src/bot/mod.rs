//! Telegram front-end: a dialogue-driven menu over the assistant.
//!
//! Updates arrive through long polling and are handled one at a time
//! per chat; retrieval and generation run inline in the handler, so a
//! slow generation call delays the next update.

pub mod handlers;
pub mod state;

use std::sync::Arc;

use teloxide::dispatching::dialogue::{self, InMemStorage};
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::config::AppConfig;
use crate::history::SessionStore;
use crate::rag::Assistant;
use self::state::ChatState;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Поддерживаемые команды:")]
pub enum Command {
    #[command(description = "начать работу с ботом")]
    Start,
    #[command(description = "помощь по использованию")]
    Help,
    #[command(description = "отменить текущее действие")]
    Cancel,
}

pub async fn run(
    bot: Bot,
    assistant: Arc<Assistant>,
    sessions: Arc<SessionStore>,
    config: Arc<AppConfig>,
) {
    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![
            InMemStorage::<ChatState>::new(),
            assistant,
            sessions,
            config
        ])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start].endpoint(handlers::on_start))
        .branch(case![Command::Help].endpoint(handlers::on_help))
        .branch(case![Command::Cancel].endpoint(handlers::on_cancel));

    let message_handler = Update::filter_message()
        .branch(command_handler)
        .branch(case![ChatState::MainMenu].endpoint(handlers::on_main_menu))
        .branch(case![ChatState::Chatting].endpoint(handlers::on_chatting));

    dialogue::enter::<Update, InMemStorage<ChatState>, ChatState, _>().branch(message_handler)
}
