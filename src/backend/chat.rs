//! Chat completion collaborator.
//!
//! [`OpenAiChat`] talks to any OpenAI-compatible `/chat/completions`
//! endpoint. The worker holds it as `Arc<dyn ChatService>`, so tests and
//! other backends can be swapped in.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::AiSettings;
use crate::error::ExternalServiceError;
use crate::protocol::ChatRequest;

pub const SYSTEM_PROMPT: &str =
    "You are a helpful assistant inside a desktop application. Answer clearly and concisely.";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_ERROR_BODY: usize = 300;

#[async_trait]
pub trait ChatService: Send + Sync {
    /// Produce the next assistant message for `request`.
    async fn complete(&self, request: ChatRequest) -> Result<String, ExternalServiceError>;

    /// Apply new settings. Backends without settings ignore this.
    fn configure(&self, _settings: AiSettings) {}
}

pub struct OpenAiChat {
    client: Client,
    settings: RwLock<AiSettings>,
}

impl OpenAiChat {
    pub fn new(settings: AiSettings) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });
        Self {
            client,
            settings: RwLock::new(settings),
        }
    }

    fn snapshot(&self) -> AiSettings {
        match self.settings.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl ChatService for OpenAiChat {
    async fn complete(&self, request: ChatRequest) -> Result<String, ExternalServiceError> {
        let settings = self.snapshot();
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or(ExternalServiceError::MissingApiKey)?;

        let url = completions_url(&settings.base_url);
        tracing::debug!(%url, model = %settings.model, turns = request.history.len(), "chat request");

        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(&build_body(&settings, &request))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ExternalServiceError::Status {
                status: status.as_u16(),
                body: truncate(&text, MAX_ERROR_BODY),
            });
        }
        parse_reply(&text)
    }

    fn configure(&self, settings: AiSettings) {
        match self.settings.write() {
            Ok(mut guard) => *guard = settings,
            Err(poisoned) => *poisoned.into_inner() = settings,
        }
    }
}

fn completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

fn build_body(settings: &AiSettings, request: &ChatRequest) -> Value {
    let mut messages = vec![json!({ "role": "system", "content": SYSTEM_PROMPT })];
    messages.extend(
        request
            .history
            .iter()
            .map(|turn| json!({ "role": turn.role.as_str(), "content": turn.text })),
    );
    messages.push(json!({ "role": "user", "content": request.message }));

    json!({
        "model": settings.model,
        "messages": messages,
        "temperature": settings.temperature,
    })
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

fn parse_reply(body: &str) -> Result<String, ExternalServiceError> {
    let response: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| ExternalServiceError::InvalidResponse(e.to_string()))?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ExternalServiceError::InvalidResponse("response has no message".into()))
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ChatRole, ChatTurn};

    #[test]
    fn test_body_orders_system_history_then_message() {
        let settings = AiSettings::default();
        let request = ChatRequest {
            history: vec![
                ChatTurn::new(ChatRole::User, "hi"),
                ChatTurn::new(ChatRole::Assistant, "hello"),
            ],
            message: "how are you?".into(),
        };
        let body = build_body(&settings, &request);

        assert_eq!(body["model"], "gpt-4o-mini");
        let messages = body["messages"].as_array().unwrap();
        let roles: Vec<&str> = messages.iter().map(|m| m["role"].as_str().unwrap()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
        assert_eq!(messages[3]["content"], "how are you?");
    }

    #[test]
    fn test_parse_reply() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Fine, thanks."}}]}"#;
        assert_eq!(parse_reply(body).unwrap(), "Fine, thanks.");
    }

    #[test]
    fn test_parse_reply_rejects_empty_or_garbage() {
        assert!(matches!(
            parse_reply(r#"{"choices":[]}"#),
            Err(ExternalServiceError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_reply("<html>"),
            Err(ExternalServiceError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_completions_url() {
        assert_eq!(
            completions_url("https://api.openai.com/v1/"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            completions_url("http://localhost:1234/v1"),
            "http://localhost:1234/v1/chat/completions"
        );
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc…");
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_network() {
        let chat = OpenAiChat::new(AiSettings::default());
        let result = chat
            .complete(ChatRequest {
                history: vec![],
                message: "hello".into(),
            })
            .await;
        assert!(matches!(result, Err(ExternalServiceError::MissingApiKey)));
    }

    #[test]
    fn test_configure_replaces_settings() {
        let chat = OpenAiChat::new(AiSettings::default());
        let mut settings = AiSettings::default();
        settings.model = "gpt-4o".into();
        chat.configure(settings);
        assert_eq!(chat.snapshot().model, "gpt-4o");
    }
}
