use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use trendscout_core::{CoreError, LlmError, ScorerSettings};

use crate::request::{ScoreRequest, SYSTEM_PROMPT};
use crate::Scorer;

const OPENAI_API_URL: &str = "https://api.openai.com/v1";
const PROVIDER: &str = "openai";

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponseMessage {
    pub content: Option<String>,
}

impl ChatResponse {
    pub fn into_text(self) -> Option<String> {
        self.choices.into_iter().next().and_then(|c| c.message.content)
    }
}

pub struct OpenAiScorer {
    api_key: String,
    http: Client,
    base_url: String,
    settings: ScorerSettings,
}

impl OpenAiScorer {
    pub fn new(api_key: String, settings: ScorerSettings) -> Result<Self, CoreError> {
        let http = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self {
            api_key,
            http,
            base_url: OPENAI_API_URL.to_string(),
            settings,
        })
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn headers(&self) -> Result<HeaderMap, CoreError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key)).map_err(|_| {
            LlmError::InvalidApiKey {
                provider: PROVIDER.to_string(),
            }
        })?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    pub fn build_chat_request(&self, request: &ScoreRequest) -> ChatRequest {
        ChatRequest {
            model: self.settings.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.render_prompt(),
                },
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        }
    }
}

fn status_error(status: u16, body: String) -> LlmError {
    match status {
        401 | 403 => LlmError::InvalidApiKey {
            provider: PROVIDER.to_string(),
        },
        429 => LlmError::RateLimitExceeded {
            provider: PROVIDER.to_string(),
        },
        502..=504 => LlmError::ServiceUnavailable {
            provider: PROVIDER.to_string(),
        },
        _ => LlmError::UnexpectedStatus {
            provider: PROVIDER.to_string(),
            status_code: status,
            body: body.chars().take(300).collect(),
        },
    }
}

impl Scorer for OpenAiScorer {
    async fn score(&self, request: &ScoreRequest) -> Result<String, CoreError> {
        let url = format!("{}/chat/completions", self.base_url);
        let chat_request = self.build_chat_request(request);

        debug!(model = %chat_request.model, post_id = %request.post_id, "OpenAI chat request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CoreError::Llm(LlmError::RequestTimeout {
                        provider: PROVIDER.to_string(),
                    })
                } else {
                    CoreError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, post_id = %request.post_id, "OpenAI returned non-success");
            return Err(status_error(status.as_u16(), body).into());
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            debug!("Failed to decode chat response: {}", e);
            LlmError::InvalidResponseFormat {
                provider: PROVIDER.to_string(),
            }
        })?;

        chat_response.into_text().ok_or_else(|| {
            LlmError::InvalidResponseFormat {
                provider: PROVIDER.to_string(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> OpenAiScorer {
        OpenAiScorer::new("sk-test".to_string(), ScorerSettings::default()).unwrap()
    }

    fn request() -> ScoreRequest {
        ScoreRequest {
            post_id: "x1".to_string(),
            title: "Professional overthinker".to_string(),
            community: "antiwork".to_string(),
            score: 2400,
            velocity: 800.0,
            top_comments: vec!["lol same".to_string()],
            buying_signal_count: 0,
            buying_signal_excerpts: Vec::new(),
            paths: Vec::new(),
        }
    }

    #[test]
    fn test_chat_request_shape() {
        let chat = scorer().build_chat_request(&request());
        assert_eq!(chat.model, "gpt-3.5-turbo");
        assert_eq!(chat.max_tokens, 250);
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[0].role, "system");
        assert!(chat.messages[1].content.contains("Professional overthinker"));

        let json = serde_json::to_value(&chat).unwrap();
        assert_eq!(json["messages"][1]["role"], "user");
        assert!((json["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_response_text_extraction() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"SCORE: 8\nANALYSIS: Works"}}]}"#;
        let response: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            response.into_text().as_deref(),
            Some("SCORE: 8\nANALYSIS: Works")
        );

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(empty.into_text().is_none());
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(401, String::new()),
            LlmError::InvalidApiKey { .. }
        ));
        assert!(matches!(
            status_error(429, String::new()),
            LlmError::RateLimitExceeded { .. }
        ));
        assert!(matches!(
            status_error(503, String::new()),
            LlmError::ServiceUnavailable { .. }
        ));
        match status_error(400, "x".repeat(1000)) {
            LlmError::UnexpectedStatus {
                status_code, body, ..
            } => {
                assert_eq!(status_code, 400);
                assert_eq!(body.len(), 300);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_base_url_override() {
        let scorer = scorer().with_base_url("http://localhost:9999/v1/");
        assert_eq!(scorer.base_url, "http://localhost:9999/v1");
    }
}
