//! Hosted GigaChat backend.
//!
//! Authenticates with the Sber OAuth endpoint (Basic authorization key,
//! per-request `RqUID`), caches the short-lived access token, and calls
//! the chat completions API with it. The service presents a certificate
//! chain that standard roots reject, so certificate verification is
//! disabled, matching the reference deployment.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::Mutex;

use super::provider::LlmProvider;
use super::types::ChatRequest;
use crate::errors::AppError;

const AUTH_URL: &str = "https://ngw.devices.sberbank.ru:9443/api/v2/oauth";
const CHAT_URL: &str = "https://gigachat.devices.sberbank.ru/api/v1/chat/completions";
const SCOPE: &str = "GIGACHAT_API_PERS";

/// Refresh the token this many milliseconds before it expires.
const TOKEN_MARGIN_MS: i64 = 60_000;

#[derive(Debug, Clone, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Expiry as unix epoch milliseconds.
    expires_at: i64,
}

pub struct GigaChatProvider {
    credentials: String,
    client: Client,
    token: Mutex<Option<TokenResponse>>,
}

impl GigaChatProvider {
    pub fn new(credentials: String) -> Result<Self, AppError> {
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(AppError::backend)?;

        Ok(Self {
            credentials: credentials.trim().to_string(),
            client,
            token: Mutex::new(None),
        })
    }

    async fn access_token(&self) -> Result<String, AppError> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if !token_expired(token.expires_at, chrono::Utc::now().timestamp_millis()) {
                return Ok(token.access_token.clone());
            }
        }

        let response = self
            .client
            .post(AUTH_URL)
            .header("Accept", "application/json")
            .header("RqUID", uuid::Uuid::new_v4().to_string())
            .header("Authorization", format!("Basic {}", self.credentials))
            .form(&[("scope", SCOPE)])
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Auth(format!(
                "token request rejected ({status}): {text}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Auth(format!("malformed token response: {e}")))?;

        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }
}

fn token_expired(expires_at_ms: i64, now_ms: i64) -> bool {
    now_ms >= expires_at_ms - TOKEN_MARGIN_MS
}

fn build_chat_payload(model_id: &str, request: &ChatRequest) -> Value {
    let mut body = json!({
        "model": model_id,
        "messages": request.messages,
        "stream": false,
        "profanity_check": false,
    });

    if let Some(obj) = body.as_object_mut() {
        if let Some(t) = request.temperature {
            obj.insert("temperature".to_string(), json!(t));
        }
        if let Some(t) = request.top_p {
            obj.insert("top_p".to_string(), json!(t));
        }
        if let Some(t) = request.repeat_penalty {
            obj.insert("repetition_penalty".to_string(), json!(t));
        }
    }

    body
}

#[async_trait]
impl LlmProvider for GigaChatProvider {
    fn name(&self) -> &str {
        "gigachat"
    }

    async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, AppError> {
        let token = self.access_token().await?;
        let body = build_chat_payload(model_id, &request);

        let response = self
            .client
            .post(CHAT_URL)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(AppError::backend)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Backend(format!(
                "GigaChat chat error ({status}): {text}"
            )));
        }

        let payload: Value = response.json().await.map_err(AppError::backend)?;
        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string();

        Ok(content)
    }

    async fn embed(&self, _inputs: &[String], _model_id: &str) -> Result<Vec<Vec<f32>>, AppError> {
        Err(AppError::Backend(
            "GigaChat is not used for embeddings; the Ollama embedder serves both backends"
                .to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::ChatMessage;

    #[test]
    fn chat_payload_carries_model_and_flags() {
        let request =
            ChatRequest::new(vec![ChatMessage::user("вопрос")]).with_temperature(0.2);
        let body = build_chat_payload("GigaChat", &request);

        assert_eq!(body["model"], "GigaChat");
        assert_eq!(body["stream"], false);
        assert_eq!(body["profanity_check"], false);
        assert_eq!(body["temperature"], 0.2);
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[test]
    fn omitted_sampling_params_stay_out_of_payload() {
        let request = ChatRequest::new(vec![ChatMessage::user("q")]);
        let body = build_chat_payload("GigaChat", &request);

        assert!(body.get("temperature").is_none());
        assert!(body.get("top_p").is_none());
    }

    #[test]
    fn token_refresh_honors_margin() {
        let expires = 1_000_000;
        assert!(!token_expired(expires, expires - TOKEN_MARGIN_MS - 1));
        assert!(token_expired(expires, expires - TOKEN_MARGIN_MS));
        assert!(token_expired(expires, expires + 1));
    }
}
