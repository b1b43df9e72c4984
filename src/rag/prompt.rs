//! Prompt assembly: one system message with persona, policy and the
//! retrieved context, then the conversation history in original order,
//! then the new question as the final turn.

use crate::history::Turn;
use crate::index::ScoredChunk;
use crate::llm::ChatMessage;

/// Persona and answering policy. `{context}` is replaced with the
/// retrieved chunk texts.
const SYSTEM_TEMPLATE: &str = "\
Вы - опытный юрист-консультант с именем «Юридический Ассистент». \
Ваша задача - давать точные, профессиональные и структурированные ответы \
на основе Конституции РФ и действующего законодательства.

Основные правила:
1. Отвечайте ТОЛЬКО на русском языке.
2. Базируйте ответы исключительно на предоставленном контексте.
3. Если информация отсутствует в контексте, отвечайте: \
«Моя компетенция ограничена предоставленными юридическими документами. \
Для детального ответа обратитесь к официальным источникам.»
4. Сохраняйте формально-деловой стиль общения.
5. Структурируйте ответы с использованием маркированных списков.
6. Цитируйте конкретные статьи законов из контекста.
7. Для сложных вопросов предлагайте пошаговый алгоритм действий.
8. Отказывайтесь отвечать на неправовые вопросы.

Контекст для ответа:
{context}";

/// Build the full message sequence for one generation call. The
/// history passed in is already capped by the caller.
pub fn assemble(chunks: &[ScoredChunk], history: &[Turn], question: &str) -> Vec<ChatMessage> {
    let context = render_context(chunks);
    let system = SYSTEM_TEMPLATE.replace("{context}", &context);

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system));
    messages.extend(history.iter().map(Turn::to_chat_message));
    messages.push(ChatMessage::user(question));
    messages
}

/// Retrieved chunk texts, verbatim, separated by blank lines.
fn render_context(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .map(|scored| scored.chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::StoredChunk;

    fn scored(content: &str) -> ScoredChunk {
        ScoredChunk {
            chunk: StoredChunk {
                id: "c".to_string(),
                content: content.to_string(),
                source: "document_0.md".to_string(),
                section: None,
                chapter: None,
                article: None,
            },
            score: 0.9,
        }
    }

    #[test]
    fn system_message_contains_chunks_verbatim() {
        let chunks = vec![
            scored("Статья 15. Конституция имеет высшую юридическую силу."),
            scored("Статья 16. Положения настоящей главы составляют основы строя."),
        ];
        let messages = assemble(&chunks, &[], "какая статья имеет высшую юридическую силу?");

        assert_eq!(messages[0].role, "system");
        assert!(messages[0]
            .content
            .contains("Статья 15. Конституция имеет высшую юридическую силу."));
        assert!(messages[0].content.contains("Статья 16."));
        assert!(messages[0].content.contains("Юридический Ассистент"));
    }

    #[test]
    fn history_sits_between_system_and_question() {
        let history = vec![
            Turn::user("первый вопрос"),
            Turn::assistant("первый ответ"),
        ];
        let messages = assemble(&[], &history, "второй вопрос");

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[1].content, "первый вопрос");
        assert_eq!(messages[2].role, "assistant");
        assert_eq!(messages[2].content, "первый ответ");
        assert_eq!(messages[3].role, "user");
        assert_eq!(messages[3].content, "второй вопрос");
    }

    #[test]
    fn empty_index_still_assembles() {
        let messages = assemble(&[], &[], "вопрос");
        assert_eq!(messages.len(), 2);
        assert!(messages[0].content.contains("Контекст для ответа:"));
    }
}
