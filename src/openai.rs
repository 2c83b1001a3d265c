//! Minimal OpenAI REST client: chat completions and image generation.
//!
//! Only the two calls the pipeline needs. Everything returns [`anyhow::Result`] with
//! enough context to tell which endpoint failed and why.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::IMAGE_SIZE;

/// Who said a chat message.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions for the model
    System,
    /// The request itself
    User,
}

/// One message of a chat completion request.
#[derive(Clone, Debug, Serialize)]
pub struct ChatMessage {
    /// Author of the message
    pub role: Role,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// A system-role message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// A user-role message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

// -----------------------------
// Chat completions API
// -----------------------------

#[derive(Serialize, Debug)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize, Debug)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// -----------------------------
// Images API
// -----------------------------

/// Request body for POST /images/generations
#[derive(Serialize, Debug)]
struct ImagesGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,

    // GPT image models always answer with base64 and reject this field.
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<&'a str>,
}

#[derive(Deserialize, Debug)]
struct ImagesGenerateResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Deserialize, Debug)]
struct ImageData {
    b64_json: Option<String>,
    revised_prompt: Option<String>,
}

/// Authenticated handle on the OpenAI REST API.
#[derive(Clone, Debug)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    /// Creates a client for `base_url` (e.g. `https://api.openai.com/v1`).
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Sends a chat completion and returns the first choice's text.
    pub async fn chat_completion(&self, model: &str, messages: &[ChatMessage]) -> Result<String> {
        let req_body = ChatCompletionRequest { model, messages };
        let bytes = self
            .post_json("chat/completions", &req_body)
            .await?;

        let parsed: ChatCompletionResponse = serde_json::from_slice(&bytes)
            .context("Failed to parse /chat/completions JSON")?;

        parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("/chat/completions returned no choices"))?
            .message
            .content
            .ok_or_else(|| anyhow!("/chat/completions choice has no content"))
    }

    /// Asks for exactly one square image and returns its base64 payload.
    pub async fn generate_image(&self, model: &str, prompt: &str) -> Result<String> {
        let req_body = ImagesGenerateRequest {
            model,
            prompt,
            n: 1,
            size: IMAGE_SIZE,
            response_format: (!is_gpt_image(model)).then_some("b64_json"),
        };
        let bytes = self
            .post_json("images/generations", &req_body)
            .await?;

        let parsed: ImagesGenerateResponse = serde_json::from_slice(&bytes)
            .context("Failed to parse /images/generations JSON")?;

        let first = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No image data returned"))?;

        if let Some(revised_prompt) = first.revised_prompt {
            debug!("Revised prompt from OpenAI: {revised_prompt}");
        }

        first
            .b64_json
            .ok_or_else(|| anyhow!("Image response missing b64_json field"))
    }

    async fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Vec<u8>> {
        let url = self.endpoint(path);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Request to /{path} failed"))?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .with_context(|| format!("Failed reading /{path} body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenAI API error {status} from /{path}: {}",
                String::from_utf8_lossy(&bytes)
            ));
        }
        Ok(bytes.to_vec())
    }
}

fn is_gpt_image(model: &str) -> bool {
    model.starts_with("gpt-image")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_shape() {
        let messages = [ChatMessage::system("be brief"), ChatMessage::user("Owlbear")];
        let body = serde_json::to_value(ChatCompletionRequest {
            model: "gpt-4o",
            messages: &messages,
        })
        .expect("serialize");
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Owlbear");
    }

    #[test]
    fn image_request_omits_response_format_for_gpt_image() {
        let body = serde_json::to_value(ImagesGenerateRequest {
            model: "gpt-image-1",
            prompt: "an owlbear",
            n: 1,
            size: IMAGE_SIZE,
            response_format: (!is_gpt_image("gpt-image-1")).then_some("b64_json"),
        })
        .expect("serialize");
        assert!(body.get("response_format").is_none());
        assert_eq!(body["n"], 1);
        assert_eq!(body["size"], "1024x1024");
    }

    #[test]
    fn dalle_asks_for_base64() {
        assert!(!is_gpt_image("dall-e-3"));
        assert!(is_gpt_image("gpt-image-1.5"));
    }

    #[test]
    fn parses_chat_response() {
        let raw = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"A hulking owlbear"}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).expect("parse");
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("A hulking owlbear")
        );
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = OpenAiClient::new("sk-test", "http://localhost:8080/v1/");
        assert_eq!(
            client.endpoint("images/generations"),
            "http://localhost:8080/v1/images/generations"
        );
    }
}
