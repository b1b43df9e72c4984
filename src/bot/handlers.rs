//! Telegram handlers for the menu and consultation states.

use std::sync::Arc;

use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, KeyboardButton, KeyboardMarkup, ParseMode};
use tracing::error;

use super::state::{
    route_chatting, route_main_menu, ChatState, ConsultAction, MenuAction, BTN_BEGIN, BTN_END,
    BTN_HELP, BTN_HISTORY, BTN_RETURN,
};
use crate::config::AppConfig;
use crate::history::{Role, SessionStore, Turn};
use crate::rag::Assistant;

pub type BotDialogue = Dialogue<ChatState, InMemStorage<ChatState>>;
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

const GENERATION_FAILED: &str =
    "⚠️ Произошла ошибка при обработке вашего запроса. Попробуйте задать вопрос иначе.";
const NO_HISTORY: &str = "📭 История диалога пуста.";

fn main_menu_keyboard() -> KeyboardMarkup {
    let mut markup = KeyboardMarkup::new(vec![
        vec![KeyboardButton::new(BTN_BEGIN)],
        vec![KeyboardButton::new(BTN_HISTORY)],
        vec![KeyboardButton::new(BTN_END)],
        vec![KeyboardButton::new(BTN_HELP)],
    ]);
    markup.resize_keyboard = true;
    markup
}

fn consultation_keyboard() -> KeyboardMarkup {
    let mut markup = KeyboardMarkup::new(vec![
        vec![KeyboardButton::new(BTN_END)],
        vec![KeyboardButton::new(BTN_RETURN)],
    ]);
    markup.resize_keyboard = true;
    markup
}

/// Private-chat id doubles as the session id.
fn session_id(msg: &Message) -> String {
    msg.chat.id.0.to_string()
}

pub async fn on_start(bot: Bot, dialogue: BotDialogue, msg: Message) -> HandlerResult {
    let welcome = "👋 Приветствую!\n\n\
        Я ваш персональный юридический ассистент.\n\
        Могу помочь с вопросами по законодательству РФ:\n\
        - Гражданский кодекс\n\
        - Закон о защите прав потребителей\n\
        - Воздушный кодекс\n\
        - Обязательное страхование\n\n\
        Выберите действие:";

    bot.send_message(msg.chat.id, welcome)
        .reply_markup(main_menu_keyboard())
        .await?;
    dialogue.update(ChatState::MainMenu).await?;
    Ok(())
}

pub async fn on_help(bot: Bot, msg: Message) -> HandlerResult {
    let help = "📚 *Помощь по использованию бота*\n\n\
        ✅ *Начать консультацию* - задайте юридический вопрос\n\
        📜 *История диалога* - показать сохранённые сообщения\n\
        🧹 *Завершить консультацию* - очистить историю диалога\n\
        ↩️ *Вернуться в меню* - прервать консультацию\n\n\
        Пример вопроса:\n\
        Как оформить наследство по завещанию?\n\n\
        ⚠️ *Важно:* Я отвечаю только на юридические вопросы!";

    bot.send_message(msg.chat.id, help)
        .parse_mode(ParseMode::Markdown)
        .await?;
    Ok(())
}

pub async fn on_cancel(bot: Bot, dialogue: BotDialogue, msg: Message) -> HandlerResult {
    bot.send_message(
        msg.chat.id,
        "Действие отменено. Используйте меню для навигации.",
    )
    .reply_markup(main_menu_keyboard())
    .await?;
    dialogue.update(ChatState::MainMenu).await?;
    Ok(())
}

pub async fn on_main_menu(
    bot: Bot,
    dialogue: BotDialogue,
    msg: Message,
    sessions: Arc<SessionStore>,
    config: Arc<AppConfig>,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(
            msg.chat.id,
            "⚠️ Я работаю только с текстовыми сообщениями.\n\n\
             Пожалуйста, задайте ваш вопрос текстом или используйте кнопки меню.",
        )
        .reply_markup(main_menu_keyboard())
        .await?;
        return Ok(());
    };

    match route_main_menu(text) {
        MenuAction::BeginConsultation => {
            bot.send_message(
                msg.chat.id,
                "💼 Вы в режиме консультации. Задайте ваш юридический вопрос.\n\n\
                 Я отвечу на основе:\n\
                 - Гражданского кодекса РФ\n\
                 - Закона о защите прав потребителей\n\
                 - Воздушного кодекса РФ\n\
                 - ФЗ об обязательном страховании\n\n\
                 Для очистки истории нажмите «Завершить консультацию»",
            )
            .reply_markup(consultation_keyboard())
            .await?;
            dialogue.update(ChatState::Chatting).await?;
        }
        MenuAction::ClearHistory => {
            sessions.clear(&session_id(&msg))?;
            bot.send_message(
                msg.chat.id,
                "🧹 История диалога очищена. Вы можете начать новую консультацию.",
            )
            .reply_markup(main_menu_keyboard())
            .await?;
        }
        MenuAction::ShowHelp => on_help(bot, msg).await?,
        MenuAction::ShowHistory => {
            let listing =
                render_history(&sessions.recent(&session_id(&msg), config.history_limit));
            bot.send_message(msg.chat.id, listing)
                .reply_markup(main_menu_keyboard())
                .await?;
        }
        MenuAction::Unrecognized => {
            bot.send_message(
                msg.chat.id,
                "ℹ️ Я вас не понял. Пожалуйста, используйте кнопки меню для навигации.\n\n\
                 Если вы хотите задать юридический вопрос, нажмите «📢 Начать консультацию».",
            )
            .reply_markup(main_menu_keyboard())
            .await?;
        }
    }

    Ok(())
}

pub async fn on_chatting(
    bot: Bot,
    dialogue: BotDialogue,
    msg: Message,
    assistant: Arc<Assistant>,
    sessions: Arc<SessionStore>,
    config: Arc<AppConfig>,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(
            msg.chat.id,
            "⚠️ Я могу анализировать только текстовые юридические вопросы.\n\n\
             Пожалуйста, опишите ваш вопрос текстом или используйте кнопки управления консультацией.",
        )
        .reply_markup(consultation_keyboard())
        .await?;
        return Ok(());
    };

    match route_chatting(text) {
        ConsultAction::ReturnToMenu => {
            bot.send_message(msg.chat.id, "Возвращаемся в главное меню.")
                .reply_markup(main_menu_keyboard())
                .await?;
            dialogue.update(ChatState::MainMenu).await?;
        }
        ConsultAction::EndConsultation => {
            sessions.clear(&session_id(&msg))?;
            bot.send_message(
                msg.chat.id,
                "🧹 История диалога очищена. Вы можете начать новую консультацию.",
            )
            .reply_markup(main_menu_keyboard())
            .await?;
            dialogue.update(ChatState::MainMenu).await?;
        }
        ConsultAction::Question => {
            let session = session_id(&msg);

            // The user turn is stored before generation: a failed call
            // keeps the question in the history file.
            let history = sessions.recent(&session, config.history_limit);
            sessions.append(&session, Turn::user(text))?;

            bot.send_chat_action(msg.chat.id, ChatAction::Typing)
                .await?;

            match assistant.ask(text, &history).await {
                Ok(answer) => {
                    sessions.append(&session, Turn::assistant(answer.clone()))?;
                    bot.send_message(msg.chat.id, answer).await?;
                }
                Err(err) => {
                    error!("ошибка обработки запроса: {err}");
                    bot.send_message(msg.chat.id, GENERATION_FAILED).await?;
                }
            }
        }
    }

    Ok(())
}

/// Numbered listing of the stored turns, oldest first.
fn render_history(turns: &[Turn]) -> String {
    if turns.is_empty() {
        return NO_HISTORY.to_string();
    }

    let mut listing = String::from("📜 История диалога:\n");
    for (idx, turn) in turns.iter().enumerate() {
        let speaker = match turn.role {
            Role::User => "Вы",
            Role::Assistant => "Ассистент",
        };
        listing.push_str(&format!("\n{}. {}: {}", idx + 1, speaker, turn.content));
    }
    listing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_renders_the_no_history_message() {
        assert_eq!(render_history(&[]), NO_HISTORY);
    }

    #[test]
    fn history_listing_is_numbered_and_ordered() {
        let turns = vec![
            Turn::user("вопрос о наследстве"),
            Turn::assistant("ответ о наследстве"),
        ];
        let listing = render_history(&turns);

        assert!(listing.starts_with("📜 История диалога:"));
        assert!(listing.contains("1. Вы: вопрос о наследстве"));
        assert!(listing.contains("2. Ассистент: ответ о наследстве"));
    }
}
