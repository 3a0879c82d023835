use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::agent::Backend;
use crate::config::BackendConfig;
use crate::error::{AppError, Result};

const API_VERSION: &str = "2023-06-01";

pub struct ClaudeClient {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl ClaudeClient {
    pub fn new(config: &BackendConfig, api_key: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: api_key.to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    pub async fn send_message(&self, request: &MessagesRequest) -> Result<MessagesResponse> {
        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, body));
        }

        let body = response.json::<MessagesResponse>().await?;
        Ok(body)
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

fn classify_failure(status: StatusCode, body: String) -> AppError {
    let message = format!("API returned {status}: {body}");
    if status == StatusCode::TOO_MANY_REQUESTS {
        AppError::ClaudeRateLimited(message)
    } else if status.is_server_error() {
        AppError::ClaudeTransient(message)
    } else {
        AppError::ClaudeApi(message)
    }
}

#[async_trait]
impl Backend for ClaudeClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, system: &str, user: &str, temperature: f32) -> Result<String> {
        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens(),
            temperature: Some(temperature),
            system: system.to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: user.to_string(),
            }],
        };

        let response = self.send_message(&request).await?;

        tracing::info!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            stop_reason = ?response.stop_reason,
            "Claude response"
        );

        reply_text(&response)
    }
}

/// Joined text blocks of a finished reply. A reply cut off by the token limit
/// is rejected so a truncated rewrite never reaches the disk.
fn reply_text(response: &MessagesResponse) -> Result<String> {
    if response.stop_reason.as_deref() == Some("max_tokens") {
        return Err(AppError::Agent(format!(
            "Reply {} was truncated at the max_tokens limit",
            response.id
        )));
    }

    let text = response
        .content
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            ContentBlock::Other => None,
        })
        .collect::<Vec<_>>()
        .join("\n");

    if text.trim().is_empty() {
        return Err(AppError::Agent(format!(
            "Reply {} contained no text",
            response.id
        )));
    }

    Ok(text)
}

// --- Request types ---

#[derive(Debug, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub system: String,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

// --- Response types ---

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    pub id: String,
    pub content: Vec<ContentBlock>,
    pub stop_reason: Option<String>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: serde_json::Value) -> MessagesResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_reply_text_joins_text_blocks() {
        let resp = response(json!({
            "id": "msg_1",
            "content": [
                { "type": "text", "text": "## Critical Issues" },
                { "type": "thinking", "thinking": "hidden" },
                { "type": "text", "text": "- divide by zero" }
            ],
            "stop_reason": "end_turn",
            "usage": { "input_tokens": 10, "output_tokens": 5 }
        }));
        assert_eq!(reply_text(&resp).unwrap(), "## Critical Issues\n- divide by zero");
    }

    #[test]
    fn test_truncated_reply_is_rejected() {
        let resp = response(json!({
            "id": "msg_2",
            "content": [{ "type": "text", "text": "def add(a, b):\n    return" }],
            "stop_reason": "max_tokens",
            "usage": { "input_tokens": 10, "output_tokens": 16384 }
        }));
        assert!(matches!(reply_text(&resp), Err(AppError::Agent(_))));
    }

    #[test]
    fn test_empty_reply_is_rejected() {
        let resp = response(json!({
            "id": "msg_3",
            "content": [],
            "stop_reason": "end_turn",
            "usage": { "input_tokens": 10, "output_tokens": 0 }
        }));
        assert!(reply_text(&resp).is_err());
    }

    #[test]
    fn test_failure_classification() {
        assert!(matches!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, String::new()),
            AppError::ClaudeRateLimited(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::BAD_GATEWAY, String::new()),
            AppError::ClaudeTransient(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::UNAUTHORIZED, "invalid x-api-key".to_string()),
            AppError::ClaudeApi(_)
        ));
    }

    #[test]
    fn test_request_omits_missing_temperature() {
        let request = MessagesRequest {
            model: "m".to_string(),
            max_tokens: 1,
            temperature: None,
            system: "s".to_string(),
            messages: vec![],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("temperature").is_none());
    }
}
