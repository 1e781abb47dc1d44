use crate::app_config::LlmConfig;
use async_trait::async_trait;
use aviox_core::structuring::{ModelError, StructuringModel, StructuringRequest};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Chat-completions client for OpenAI-compatible endpoints
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
    refusal: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl StructuringModel for OpenAiClient {
    async fn structure(&self, request: &StructuringRequest) -> Result<String, ModelError> {
        let body = ChatRequest {
            model: &self.model,
            temperature: 0.0,
            messages: [
                ChatMessage { role: "system", content: &request.instruction },
                ChatMessage { role: "user", content: &request.text },
            ],
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;
        debug!("Chat completion answered with status {}", status);

        if !status.is_success() {
            return Err(ModelError::Status { status: status.as_u16(), body: text });
        }
        answer_from(&text)
    }
}

/// Content of the first choice in a chat-completions response body.
fn answer_from(body: &str) -> Result<String, ModelError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ModelError::Transport(format!("unreadable completion: {}", e)))?;
    let reply = response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or(ModelError::EmptyResponse)?;

    if let Some(refusal) = reply.refusal {
        return Err(ModelError::Refused(refusal));
    }
    reply
        .content
        .filter(|content| !content.trim().is_empty())
        .ok_or(ModelError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_from_first_choice() {
        let body = r#"{
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "```json\n{}\n```"}, "finish_reason": "stop"},
                {"index": 1, "message": {"role": "assistant", "content": "second"}}
            ]
        }"#;
        assert_eq!(answer_from(body).unwrap(), "```json\n{}\n```");
    }

    #[test]
    fn test_answer_errors() {
        assert!(matches!(answer_from(r#"{"choices": []}"#), Err(ModelError::EmptyResponse)));
        assert!(matches!(
            answer_from(r#"{"choices": [{"message": {"content": "  "}}]}"#),
            Err(ModelError::EmptyResponse)
        ));
        assert!(matches!(
            answer_from(r#"{"choices": [{"message": {"content": null, "refusal": "I can't help"}}]}"#),
            Err(ModelError::Refused(msg)) if msg == "I can't help"
        ));
        assert!(matches!(answer_from("<html>"), Err(ModelError::Transport(_))));
    }

    #[test]
    fn test_request_shape() {
        let body = ChatRequest {
            model: "gpt-3.5-turbo",
            temperature: 0.0,
            messages: [
                ChatMessage { role: "system", content: "Return JSON" },
                ChatMessage { role: "user", content: "LHR to JFK" },
            ],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "LHR to JFK");
        assert_eq!(json["temperature"], 0.0);
    }

    #[test]
    fn test_base_url_is_normalized() {
        let client = OpenAiClient::new(&LlmConfig {
            base_url: "http://localhost:11434/v1/".to_string(),
            api_key: "key".to_string(),
            model: "llama3.2".to_string(),
            timeout_seconds: 5,
        })
        .unwrap();
        assert_eq!(client.base_url, "http://localhost:11434/v1");
    }
}
