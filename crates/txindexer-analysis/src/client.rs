use {
    crate::errors::{AnalysisError, Result},
    async_trait::async_trait,
    reqwest::{Client, Response},
    serde::{Deserialize, Serialize},
    tracing::{debug, info},
    txindexer_common::AnalysisConfig,
};

/// A text-in, text-out completion service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionResponse {
    fn into_content(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AnalysisError::MalformedResponse("no choices[0].message.content".to_string()))
    }
}

/// Client for an LM Studio (or any OpenAI-compatible) server.
#[derive(Debug, Clone)]
pub struct LmStudioClient {
    client: Client,
    config: AnalysisConfig,
}

impl LmStudioClient {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AnalysisError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url(), path)
    }

    /// Probe `/v1/models`, failing when the server is unreachable or unhappy.
    pub async fn check_connection(&self) -> Result<()> {
        let response = self.client.get(self.endpoint("/v1/models")).send().await?;
        ensure_success(response).await?;
        info!("Connected to analysis backend at {}", self.config.base_url());
        Ok(())
    }
}

#[async_trait]
impl CompletionBackend for LmStudioClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            model: &self.config.model,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        debug!("Requesting completion from {}", self.config.model);

        let response = self
            .client
            .post(self.endpoint("/v1/chat/completions"))
            .json(&request)
            .send()
            .await?;

        let body: ChatCompletionResponse = ensure_success(response).await?.json().await?;
        body.into_content()
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(AnalysisError::Status {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let client = LmStudioClient::new(AnalysisConfig {
            api_url: "http://localhost:1234/".to_string(),
            ..AnalysisConfig::default()
        })
        .unwrap();

        assert_eq!(client.endpoint("/v1/models"), "http://localhost:1234/v1/models");
    }

    #[test]
    fn test_request_shape() {
        let request = ChatCompletionRequest {
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            model: "llama-3.2-3b-instruct",
            temperature: 0.5,
            max_tokens: 500,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["model"], "llama-3.2-3b-instruct");
        assert_eq!(json["max_tokens"], 500);
    }

    #[test]
    fn test_completion_content_extraction() {
        let body: ChatCompletionResponse = serde_json::from_value(serde_json::json!({
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": "1. Risk: 5" } }]
        }))
        .unwrap();
        assert_eq!(body.into_content().unwrap(), "1. Risk: 5");

        let empty: ChatCompletionResponse = serde_json::from_value(serde_json::json!({ "choices": [] })).unwrap();
        assert!(matches!(empty.into_content(), Err(AnalysisError::MalformedResponse(_))));
    }
}
