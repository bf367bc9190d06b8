//! OpenAI-compatible chat-completions client.
//!
//! Serves Groq, OpenAI, Ollama and any other endpoint speaking the same
//! non-streaming `/chat/completions` protocol.

use crate::llm::client::ChatProvider;
use crate::llm::config::ProviderConfig;
use crate::llm::error::LLMError;
use crate::messages::Message;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP client for OpenAI-compatible APIs.
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    client: Client,
    endpoint: String,
    /// None for local providers
    api_key: Option<String>,
    max_tokens: Option<u32>,
    timeout: Duration,
}

/// Request body for the chat completions API.
#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAIErrorDetail {
    #[serde(rename = "type")]
    error_type: Option<String>,
    #[serde(default)]
    code: Option<String>,
    message: String,
}

impl OpenAIClient {
    /// Creates a client for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns `LLMError::invalid_config` when the provider requires a key
    /// and none was resolved, or when no base URL is known.
    /// Returns `LLMError::network` if the HTTP client cannot be created.
    pub fn new(config: &ProviderConfig) -> Result<Self, LLMError> {
        if config.base_url.is_empty() {
            return Err(LLMError::invalid_config(
                "base_url",
                "a custom provider needs an explicit base_url",
            ));
        }
        if config.kind.requires_api_key() && config.api_key.is_empty() {
            let variable = config.kind.default_api_key_env().unwrap_or("api_key");
            return Err(LLMError::invalid_config(
                "api_key",
                format!("{} requires an API key; set {}", config.kind, variable),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LLMError::network(format!("failed to create HTTP client: {}", e)))?;

        let api_key = if config.api_key.is_empty() {
            None
        } else {
            Some(config.api_key.clone())
        };

        Ok(Self {
            client,
            endpoint: config.chat_completions_endpoint(),
            api_key,
            max_tokens: config.max_tokens,
            timeout: config.timeout,
        })
    }

    /// Returns the chat completions endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Builds the request with optional authorization header.
    fn build_request(&self, body: &ChatCompletionRequest<'_>) -> reqwest::RequestBuilder {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .json(body);

        if let Some(ref api_key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {}", api_key));
        }

        request
    }

    /// Maps a non-success response to an error.
    async fn parse_error_response(response: reqwest::Response) -> LLMError {
        let status = response.status();
        let status_code = status.as_u16();

        if status_code == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);

            return LLMError::rate_limited(Duration::from_secs(retry_after));
        }

        let error_body = response.text().await.unwrap_or_default();
        Self::classify_error_body(status_code, status.canonical_reason(), &error_body)
    }

    fn classify_error_body(status_code: u16, reason: Option<&str>, body: &str) -> LLMError {
        if status_code == 401 {
            let message = serde_json::from_str::<OpenAIErrorResponse>(body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| "unauthorized".to_string());
            return LLMError::authentication_failed(message);
        }

        match serde_json::from_str::<OpenAIErrorResponse>(body) {
            Ok(api_error) => {
                let detail = api_error.error;
                let kind = detail
                    .error_type
                    .as_deref()
                    .or(detail.code.as_deref())
                    .unwrap_or("unknown");
                match kind {
                    "authentication_error" | "invalid_api_key" => {
                        LLMError::authentication_failed(detail.message)
                    }
                    "invalid_request_error" => LLMError::invalid_request(detail.message),
                    _ => LLMError::api_error(status_code, detail.message, detail.error_type),
                }
            }
            Err(_) => LLMError::api_error(
                status_code,
                if body.is_empty() {
                    reason.unwrap_or("Unknown error")
                } else {
                    body
                },
                None,
            ),
        }
    }
}

#[async_trait]
impl ChatProvider for OpenAIClient {
    async fn complete(
        &self,
        model: &str,
        messages: &[Message],
        temperature: f32,
    ) -> Result<String, LLMError> {
        let body = ChatCompletionRequest {
            model,
            messages,
            temperature,
            max_tokens: self.max_tokens,
            stream: false,
        };

        tracing::debug!(
            endpoint = %self.endpoint,
            model,
            message_count = messages.len(),
            "Requesting chat completion"
        );

        let response = self.build_request(&body).send().await.map_err(|e| {
            if e.is_timeout() {
                LLMError::timeout(self.timeout)
            } else {
                LLMError::network(format!("request failed: {}", e))
            }
        })?;

        if !response.status().is_success() {
            return Err(Self::parse_error_response(response).await);
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LLMError::parse_error(format!("failed to parse response: {}", e)))?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(LLMError::empty_response)?;

        Ok(choice.message.content.unwrap_or_default())
    }

    fn provider_name(&self) -> &'static str {
        "openai-compatible"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::error::LLMErrorKind;

    #[test]
    fn groq_client_targets_groq_endpoint() {
        let client = OpenAIClient::new(&ProviderConfig::groq("gsk_test")).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
        assert_eq!(client.api_key.as_deref(), Some("gsk_test"));
    }

    #[test]
    fn hosted_provider_without_key_is_rejected() {
        let error = OpenAIClient::new(&ProviderConfig::groq("")).unwrap_err();
        assert!(matches!(error.kind, LLMErrorKind::InvalidConfig { .. }));
        assert!(error.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn ollama_client_has_no_key() {
        let client = OpenAIClient::new(&ProviderConfig::ollama("llama3.2")).unwrap();
        assert!(client.api_key.is_none());
    }

    #[test]
    fn request_body_serializes_messages_and_temperature() {
        let messages = vec![Message::system("sys"), Message::user("hi")];
        let body = ChatCompletionRequest {
            model: "m",
            messages: &messages,
            temperature: 0.5,
            max_tokens: None,
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "m");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert_eq!(json["temperature"], 0.5);
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn classify_unauthorized() {
        let body = r#"{"error":{"message":"Invalid API Key","type":"invalid_request_error","code":"invalid_api_key"}}"#;
        let error = OpenAIClient::classify_error_body(401, Some("Unauthorized"), body);
        assert!(matches!(error.kind, LLMErrorKind::AuthenticationFailed { .. }));
        assert!(error.to_string().contains("Invalid API Key"));
    }

    #[test]
    fn classify_invalid_request() {
        let body = r#"{"error":{"message":"model not found","type":"invalid_request_error"}}"#;
        let error = OpenAIClient::classify_error_body(404, Some("Not Found"), body);
        assert!(matches!(error.kind, LLMErrorKind::InvalidRequest { .. }));
    }

    #[test]
    fn classify_unstructured_body_falls_back_to_reason() {
        let error = OpenAIClient::classify_error_body(502, Some("Bad Gateway"), "");
        assert_eq!(
            error.to_string(),
            "provider rejected the completion (HTTP 502): Bad Gateway"
        );
    }

    #[test]
    fn response_without_content_deserializes() {
        let json = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant"},"finish_reason":"stop"}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices[0].message.content, None);
    }
}
