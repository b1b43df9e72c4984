//! Local Ollama backend, used for generation in the offline variant and
//! for embeddings by both variants.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::provider::LlmProvider;
use super::types::ChatRequest;
use crate::errors::AppError;

pub struct OllamaProvider {
    base_url: String,
    client: Client,
}

impl OllamaProvider {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }
}

fn build_chat_payload(model_id: &str, request: &ChatRequest) -> Value {
    let mut options = serde_json::Map::new();
    if let Some(t) = request.temperature {
        options.insert("temperature".to_string(), json!(t));
    }
    if let Some(t) = request.top_p {
        options.insert("top_p".to_string(), json!(t));
    }
    if let Some(t) = request.top_k {
        options.insert("top_k".to_string(), json!(t));
    }
    if let Some(t) = request.repeat_penalty {
        options.insert("repeat_penalty".to_string(), json!(t));
    }
    if let Some(t) = request.num_ctx {
        options.insert("num_ctx".to_string(), json!(t));
    }
    if let Some(s) = &request.stop {
        options.insert("stop".to_string(), json!(s));
    }

    json!({
        "model": model_id,
        "messages": request.messages,
        "stream": false,
        "options": Value::Object(options),
    })
}

/// Reasoning models wrap their scratch work in a `<think>…</think>` pair.
/// The block is dropped before the answer is shown or stored.
fn strip_reasoning(text: &str) -> String {
    if let (Some(start), Some(end)) = (text.find("<think>"), text.find("</think>")) {
        if start < end {
            let mut cleaned = String::with_capacity(text.len());
            cleaned.push_str(&text[..start]);
            cleaned.push_str(&text[end + "</think>".len()..]);
            return cleaned.trim().to_string();
        }
    }
    text.trim().to_string()
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, AppError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = build_chat_payload(model_id, &request);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(AppError::backend)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Backend(format!(
                "Ollama chat error ({status}): {text}"
            )));
        }

        let payload: Value = response.json().await.map_err(AppError::backend)?;
        let content = payload["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string();

        Ok(strip_reasoning(&content))
    }

    async fn embed(&self, inputs: &[String], model_id: &str) -> Result<Vec<Vec<f32>>, AppError> {
        let url = format!("{}/api/embeddings", self.base_url);
        let mut embeddings = Vec::with_capacity(inputs.len());

        for input in inputs {
            let body = json!({
                "model": model_id,
                "prompt": input,
            });

            let response = self
                .client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(AppError::backend)?;

            if !response.status().is_success() {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                return Err(AppError::Backend(format!(
                    "Ollama embed error ({status}): {text}"
                )));
            }

            let payload: Value = response.json().await.map_err(AppError::backend)?;
            let vector: Vec<f32> = payload["embedding"]
                .as_array()
                .map(|values| {
                    values
                        .iter()
                        .filter_map(|v| v.as_f64().map(|f| f as f32))
                        .collect()
                })
                .unwrap_or_default();

            if vector.is_empty() {
                return Err(AppError::Backend(
                    "Ollama returned an empty embedding".to_string(),
                ));
            }

            embeddings.push(vector);
        }

        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::ChatMessage;

    #[test]
    fn chat_payload_maps_sampling_options() {
        let mut request = ChatRequest::new(vec![ChatMessage::user("q")]).with_temperature(0.1);
        request.top_k = Some(40);
        request.num_ctx = Some(4096);

        let body = build_chat_payload("llama3.2:latest", &request);

        assert_eq!(body["model"], "llama3.2:latest");
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["temperature"], 0.1);
        assert_eq!(body["options"]["top_k"], 40);
        assert_eq!(body["options"]["num_ctx"], 4096);
        assert!(body["options"].get("stop").is_none());
    }

    #[test]
    fn reasoning_block_is_stripped() {
        let raw = "<think>надо посмотреть статью 15</think>\nСтатья 15 закрепляет высшую силу.";
        assert_eq!(
            strip_reasoning(raw),
            "Статья 15 закрепляет высшую силу."
        );
    }

    #[test]
    fn text_without_reasoning_is_untouched() {
        assert_eq!(strip_reasoning("Ответ готов."), "Ответ готов.");
        assert_eq!(strip_reasoning("</think> misplaced <think>"), "</think> misplaced <think>");
    }

    #[tokio::test]
    #[ignore]
    async fn live_ollama_chat_and_embed() {
        let provider = OllamaProvider::new("http://localhost:11434".to_string());

        let request = ChatRequest::new(vec![ChatMessage::user("Привет")]).with_temperature(0.1);
        match provider.chat(request, "llama3.2:latest").await {
            Ok(answer) => println!("ollama answered: {answer}"),
            Err(err) => panic!("failed to reach local Ollama: {err}"),
        }

        let vectors = provider
            .embed(&["высшая юридическая сила".to_string()], "mxbai-embed-large")
            .await
            .expect("embedding failed");
        assert_eq!(vectors.len(), 1);
        assert!(!vectors[0].is_empty());
    }
}
