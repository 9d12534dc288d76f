//! Model-agnostic HTTP client for chat-completion and image APIs.
//!
//! Anthropic's Messages API is used when the URL points at anthropic.com;
//! anything else is treated as OpenAI-compatible.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{ContentError, Result};

const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";
const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
}

impl ApiFormat {
    fn detect(url: &str) -> Self {
        if url.contains("anthropic.com") {
            Self::Anthropic
        } else {
            Self::OpenAI
        }
    }
}

pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    api_format: ApiFormat,
    /// OpenAI-style `images/generations` endpoint; portraits fail without it.
    image_url: Option<String>,
}

impl LlmClient {
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        let api_format = ApiFormat::detect(&api_url);
        Self {
            client: Client::new(),
            api_key,
            api_url,
            model,
            api_format,
            image_url: None,
        }
    }

    #[must_use]
    pub fn with_image_url(mut self, image_url: String) -> Self {
        self.image_url = Some(image_url);
        self
    }

    /// Required: `LLM_API_KEY`.
    /// Optional: `LLM_API_URL`, `LLM_MODEL`, `LLM_IMAGE_URL`.
    pub fn from_env() -> Result<Self> {
        let api_key =
            std::env::var("LLM_API_KEY").map_err(|_| ContentError::NotConfigured("LLM_API_KEY"))?;
        let api_url = std::env::var("LLM_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        let client = Self::new(api_key, api_url, model);
        Ok(match std::env::var("LLM_IMAGE_URL") {
            Ok(url) => client.with_image_url(url),
            Err(_) => client,
        })
    }

    pub fn api_format(&self) -> ApiFormat {
        self.api_format
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one system + user exchange and return the reply text.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        match self.api_format {
            ApiFormat::Anthropic => self.complete_anthropic(system, user).await,
            ApiFormat::OpenAI => self.complete_openai(system, user).await,
        }
    }

    async fn complete_anthropic(&self, system: &str, user: &str) -> Result<String> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            system: system.into(),
            messages: vec![Message {
                role: "user".into(),
                content: user.into(),
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await?;
        let completion: AnthropicResponse = read_json(response).await?;

        completion
            .content
            .into_iter()
            .next()
            .map(|block| block.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or(ContentError::Empty)
    }

    async fn complete_openai(&self, system: &str, user: &str) -> Result<String> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            messages: vec![
                Message {
                    role: "system".into(),
                    content: system.into(),
                },
                Message {
                    role: "user".into(),
                    content: user.into(),
                },
            ],
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let completion: OpenAIResponse = read_json(response).await?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(ContentError::Empty)
    }

    /// Generate one image and return it as a `data:` URI.
    pub async fn generate_image(&self, prompt: &str) -> Result<String> {
        let Some(url) = &self.image_url else {
            return Err(ContentError::NotConfigured("LLM_IMAGE_URL"));
        };
        let request = ImageRequest {
            prompt: prompt.into(),
            n: 1,
            size: "512x512".into(),
            response_format: "b64_json".into(),
        };
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let images: ImageResponse = read_json(response).await?;

        images
            .data
            .into_iter()
            .next()
            .map(|image| format!("data:image/png;base64,{}", image.b64_json))
            .ok_or(ContentError::Empty)
    }
}

async fn read_json<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ContentError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json().await?)
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

// OpenAI-compatible API format
#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ImageRequest {
    prompt: String,
    n: u32,
    size: String,
    response_format: String,
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    b64_json: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_the_url() {
        let anthropic = LlmClient::new("k".into(), DEFAULT_API_URL.into(), "m".into());
        assert_eq!(anthropic.api_format(), ApiFormat::Anthropic);
        let deepseek = LlmClient::new(
            "k".into(),
            "https://api.deepseek.com/chat/completions".into(),
            "deepseek-chat".into(),
        );
        assert_eq!(deepseek.api_format(), ApiFormat::OpenAI);
        assert_eq!(deepseek.model(), "deepseek-chat");
    }

    #[tokio::test]
    async fn portraits_need_an_image_endpoint() {
        let client = LlmClient::new("k".into(), DEFAULT_API_URL.into(), "m".into());
        let err = client.generate_image("a face").await.unwrap_err();
        assert!(matches!(err, ContentError::NotConfigured("LLM_IMAGE_URL")));
    }
}
