//! Interactive question loop over stdin/stdout.
//!
//! One question is read, answered end-to-end, and printed before the
//! next prompt. History lives in memory for the lifetime of the
//! process and is only extended after a successful answer.

use std::io::{self, BufRead, Write};

use crate::errors::AppError;
use crate::history::Turn;
use crate::rag::Assistant;

const EXIT_WORDS: [&str; 2] = ["exit", "выход"];

pub async fn run(assistant: &Assistant, history_limit: usize) -> Result<(), AppError> {
    let indexed = assistant.indexed_chunks().await?;

    println!("✅ Инициализация прошла успешно!");
    println!("🔎 Загружено фрагментов из индекса: {indexed}");
    println!("{}", "=".repeat(50));
    println!("Добро пожаловать в юридический RAG-ассистент!");
    println!("Введите ваш вопрос или 'exit' для выхода");
    println!("{}", "=".repeat(50));

    let mut history: Vec<Turn> = Vec::new();
    let stdin = io::stdin();

    loop {
        print!("Вы: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let input = line.trim();
        if input.is_empty() {
            println!("Пожалуйста, введите вопрос");
            continue;
        }
        if EXIT_WORDS.contains(&input.to_lowercase().as_str()) {
            println!("До свидания!");
            break;
        }

        let skip = history.len().saturating_sub(history_limit);
        match assistant.ask(input, &history[skip..]).await {
            Ok(answer) => {
                history.push(Turn::user(input));
                history.push(Turn::assistant(answer.clone()));

                println!("\nАссистент:\n{answer}");
                println!("{}", "-".repeat(50));
            }
            Err(err) => {
                tracing::error!("ошибка обработки запроса: {err}");
                println!("\nОшибка при обработке запроса: {err}");
                println!("{}", "-".repeat(50));
            }
        }
    }

    Ok(())
}
