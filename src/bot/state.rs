//! Menu/chat state machine.
//!
//! Two dialogue states with an explicit routing table per state, so
//! button handling is a pure function of the message text and can be
//! tested without the bot framework.

pub const BTN_BEGIN: &str = "📢 Начать консультацию";
pub const BTN_END: &str = "🧹 Завершить консультацию";
pub const BTN_HELP: &str = "ℹ️ Помощь";
pub const BTN_HISTORY: &str = "📜 История диалога";
pub const BTN_RETURN: &str = "↩️ Вернуться в меню";

/// Dialogue states. Every chat starts in the main menu.
#[derive(Clone, Default)]
pub enum ChatState {
    #[default]
    MainMenu,
    Chatting,
}

/// What the main menu does with a text message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    BeginConsultation,
    ClearHistory,
    ShowHelp,
    ShowHistory,
    Unrecognized,
}

pub fn route_main_menu(text: &str) -> MenuAction {
    match text {
        BTN_BEGIN => MenuAction::BeginConsultation,
        BTN_END => MenuAction::ClearHistory,
        BTN_HELP => MenuAction::ShowHelp,
        BTN_HISTORY => MenuAction::ShowHistory,
        _ => MenuAction::Unrecognized,
    }
}

/// What consultation mode does with a text message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsultAction {
    EndConsultation,
    ReturnToMenu,
    Question,
}

pub fn route_chatting(text: &str) -> ConsultAction {
    match text {
        BTN_END => ConsultAction::EndConsultation,
        BTN_RETURN => ConsultAction::ReturnToMenu,
        _ => ConsultAction::Question,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_menu_routes_every_button() {
        assert_eq!(route_main_menu(BTN_BEGIN), MenuAction::BeginConsultation);
        assert_eq!(route_main_menu(BTN_END), MenuAction::ClearHistory);
        assert_eq!(route_main_menu(BTN_HELP), MenuAction::ShowHelp);
        assert_eq!(route_main_menu(BTN_HISTORY), MenuAction::ShowHistory);
    }

    #[test]
    fn main_menu_rejects_free_text() {
        assert_eq!(
            route_main_menu("как оформить наследство?"),
            MenuAction::Unrecognized
        );
        // The consultation-only button is not a menu action either.
        assert_eq!(route_main_menu(BTN_RETURN), MenuAction::Unrecognized);
    }

    #[test]
    fn chatting_routes_buttons_and_treats_the_rest_as_questions() {
        assert_eq!(route_chatting(BTN_END), ConsultAction::EndConsultation);
        assert_eq!(route_chatting(BTN_RETURN), ConsultAction::ReturnToMenu);
        assert_eq!(
            route_chatting("какая статья имеет высшую юридическую силу?"),
            ConsultAction::Question
        );
        // Main-menu-only buttons fall through to the generator.
        assert_eq!(route_chatting(BTN_HELP), ConsultAction::Question);
    }
}
