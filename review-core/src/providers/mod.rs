//! Provider pool (§4.7): opaque adapters exposing `Review(prompt,
//! timeout)` and `HealthCheck(timeout)`, with no shared base beyond those
//! two operations (the "dynamic dispatch" design note replaces a trait
//! object with a concrete per-provider enum, in the same style as the
//! teacher's `LlmClient` enum-dispatch client). Ollama/OpenAI requests
//! follow the same `model`/`prompt`/`stream=false` and `messages`/`choices`
//! shapes as the sibling `ai-llm-service` crate's HTTP clients.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::timeout;

use crate::model::Finding;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderStatus {
    Success,
    Error,
    Timeout,
    RateLimited,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResultBody {
    pub content: String,
    #[serde(default)]
    pub findings: Option<Vec<Finding>>,
    #[serde(default)]
    pub usage_tokens: Option<u64>,
}

/// Outcome of one provider call. Any failure reaching the provider
/// adapter is translated into `status != Success` here — the executor
/// never lets an adapter's exception propagate past this boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResult {
    pub name: String,
    pub status: ProviderStatus,
    #[serde(default)]
    pub result: Option<ProviderResultBody>,
    #[serde(default)]
    pub error: Option<String>,
    pub duration_seconds: f64,
}

#[derive(Debug, Clone)]
pub struct OllamaProviderConfig {
    pub name: String,
    pub endpoint: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    pub name: String,
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
}

/// A provider that never actually calls out — used in tests and the
/// thin demo binary.
#[derive(Debug, Clone)]
pub struct MockProviderConfig {
    pub name: String,
    pub canned_response: String,
    pub healthy: bool,
}

/// Concrete per-provider adapter. No shared base beyond `review` and
/// `health_check`.
#[derive(Debug, Clone)]
pub enum Provider {
    Ollama(OllamaProviderConfig),
    OpenAi(OpenAiProviderConfig),
    Mock(MockProviderConfig),
}

impl Provider {
    pub fn name(&self) -> &str {
        match self {
            Provider::Ollama(c) => &c.name,
            Provider::OpenAi(c) => &c.name,
            Provider::Mock(c) => &c.name,
        }
    }

    /// `Review(prompt, timeout) -> ProviderResult`. Exceptions while
    /// contacting the underlying service are caught here and turned into
    /// `status = Error`.
    pub async fn review(&self, prompt: &str, deadline: Duration) -> ProviderResult {
        let start = std::time::Instant::now();
        let outcome = timeout(deadline, self.call(prompt)).await;
        let duration_seconds = start.elapsed().as_secs_f64();

        match outcome {
            Ok(Ok(content)) => ProviderResult {
                name: self.name().to_string(),
                status: ProviderStatus::Success,
                result: Some(ProviderResultBody {
                    content,
                    findings: None,
                    usage_tokens: None,
                }),
                error: None,
                duration_seconds,
            },
            Ok(Err(call_error)) => ProviderResult {
                name: self.name().to_string(),
                status: call_error.status,
                result: None,
                error: Some(call_error.message),
                duration_seconds,
            },
            Err(_elapsed) => ProviderResult {
                name: self.name().to_string(),
                status: ProviderStatus::Timeout,
                result: None,
                error: Some("provider call exceeded deadline".to_string()),
                duration_seconds,
            },
        }
    }

    pub async fn health_check(&self, deadline: Duration) -> bool {
        matches!(timeout(deadline, self.probe()).await, Ok(true))
    }

    async fn call(&self, prompt: &str) -> Result<String, CallError> {
        match self {
            Provider::Mock(cfg) => {
                if !cfg.healthy {
                    return Err(CallError {
                        status: ProviderStatus::Error,
                        message: "mock provider marked unhealthy".to_string(),
                    });
                }
                Ok(cfg.canned_response.clone())
            }
            Provider::Ollama(cfg) => call_ollama(cfg, prompt).await,
            Provider::OpenAi(cfg) => call_openai(cfg, prompt).await,
        }
    }

    async fn probe(&self) -> bool {
        match self {
            Provider::Mock(cfg) => cfg.healthy,
            Provider::Ollama(cfg) => probe_ollama(cfg).await,
            Provider::OpenAi(cfg) => probe_openai(cfg).await,
        }
    }
}

struct CallError {
    status: ProviderStatus,
    message: String,
}

impl From<reqwest::Error> for CallError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CallError {
                status: ProviderStatus::Timeout,
                message: e.to_string(),
            }
        } else if e.status().map(|s| s.as_u16()) == Some(429) {
            CallError {
                status: ProviderStatus::RateLimited,
                message: e.to_string(),
            }
        } else {
            CallError {
                status: ProviderStatus::Error,
                message: e.to_string(),
            }
        }
    }
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

async fn call_ollama(cfg: &OllamaProviderConfig, prompt: &str) -> Result<String, CallError> {
    let url = format!("{}/api/generate", cfg.endpoint.trim_end_matches('/'));
    let req = OllamaRequest {
        model: &cfg.model,
        prompt,
        stream: false,
    };
    let resp = reqwest::Client::new()
        .post(url)
        .json(&req)
        .send()
        .await?
        .error_for_status()?;
    let body: OllamaResponse = resp.json().await?;
    Ok(body.response)
}

async fn probe_ollama(cfg: &OllamaProviderConfig) -> bool {
    let url = format!("{}/api/tags", cfg.endpoint.trim_end_matches('/'));
    reqwest::Client::new()
        .get(url)
        .send()
        .await
        .map(|r| r.status().is_success())
        .unwrap_or(false)
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
}

#[derive(Serialize)]
struct OpenAiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    content: String,
}

async fn call_openai(cfg: &OpenAiProviderConfig, prompt: &str) -> Result<String, CallError> {
    let url = format!("{}/v1/chat/completions", cfg.endpoint.trim_end_matches('/'));
    let req = OpenAiRequest {
        model: &cfg.model,
        messages: vec![OpenAiMessage { role: "user", content: prompt }],
    };
    let resp = reqwest::Client::new()
        .post(url)
        .bearer_auth(&cfg.api_key)
        .json(&req)
        .send()
        .await?
        .error_for_status()?;
    let body: OpenAiResponse = resp.json().await?;
    body.choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| CallError {
            status: ProviderStatus::Error,
            message: "empty choices array".to_string(),
        })
}

async fn probe_openai(cfg: &OpenAiProviderConfig) -> bool {
    let url = format!("{}/v1/models", cfg.endpoint.trim_end_matches('/'));
    reqwest::Client::new()
        .get(url)
        .bearer_auth(&cfg.api_key)
        .send()
        .await
        .map(|r| r.status().is_success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_provider_reviews_successfully() {
        let provider = Provider::Mock(MockProviderConfig {
            name: "mock".into(),
            canned_response: "ANCHOR: a.rs:1".into(),
            healthy: true,
        });
        let result = provider.review("prompt", Duration::from_secs(1)).await;
        assert_eq!(result.status, ProviderStatus::Success);
    }

    #[tokio::test]
    async fn unhealthy_mock_provider_never_panics_and_reports_error() {
        let provider = Provider::Mock(MockProviderConfig {
            name: "mock".into(),
            canned_response: String::new(),
            healthy: false,
        });
        let result = provider.review("prompt", Duration::from_secs(1)).await;
        assert_eq!(result.status, ProviderStatus::Error);
        assert!(!provider.health_check(Duration::from_secs(1)).await);
    }
}
