use futures_util::TryStreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use warp::{
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE},
        Response as HttpResponse,
    },
    hyper::Body,
    reply::Response,
};

use super::client::{relay, require_key, send};
use crate::{
    constants::{OPENAI_DEFAULT_MODEL, OPENAI_MAX_TOKENS, OPENAI_TEMPERATURE},
    database::error::TypeError,
    error::{Error, HtmlError},
};

const PROVIDER: &str = "OpenAI";
const REQUEST_FAILED: &str = "OpenAI API request failed";

#[derive(Deserialize, Debug, Default, Clone)]
pub struct ChatForm {
    pub messages: Option<Value>,
    pub model: Option<String>,
    pub stream: Option<bool>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Value>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
}

impl TryFrom<ChatForm> for ChatRequest {
    type Error = TypeError;

    fn try_from(form: ChatForm) -> Result<Self, Self::Error> {
        let messages = match form.messages {
            Some(Value::Array(messages)) => messages,
            _ => return Err(TypeError::new("Invalid messages format")),
        };

        Ok(Self {
            model: form
                .model
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| OPENAI_DEFAULT_MODEL.to_string()),
            messages,
            temperature: OPENAI_TEMPERATURE,
            max_tokens: OPENAI_MAX_TOKENS,
            stream: form.stream.unwrap_or(false),
        })
    }
}

fn openai_message(body: &Value) -> Option<String> {
    body.get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .map(String::from)
}

#[derive(Clone)]
pub struct OpenAi {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAi {
    pub fn new(http: Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub async fn chat(&self, form: ChatForm) -> Result<Response, Error> {
        let key = require_key(self.api_key.as_deref(), PROVIDER)?;
        let body = ChatRequest::try_from(form)?;

        let request = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(key)
            .json(&body);

        let res = send(request, openai_message, REQUEST_FAILED).await?;

        if body.stream {
            stream_events(res)
        } else {
            relay(res).await
        }
    }
}

/// Relays upstream chunks as they arrive. The upstream connection lives as
/// long as the response body, so a client disconnect closes it too.
fn stream_events(res: reqwest::Response) -> Result<Response, Error> {
    let chunks = res.bytes_stream().inspect_err(|e| {
        log::warn!("Chat stream interrupted: {e}");
    });

    HttpResponse::builder()
        .status(200)
        .header(CONTENT_TYPE, "text/event-stream")
        .header(CACHE_CONTROL, "no-cache")
        .body(Body::wrap_stream(chunks))
        .map_err(|e| HtmlError::InternalServerError.new(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn chat_request_applies_defaults() {
        let form: ChatForm = serde_json::from_value(json!({
            "messages": [{"role": "user", "content": "Something with gin?"}]
        }))
        .unwrap();

        let request = ChatRequest::try_from(form).unwrap();
        assert_eq!(request.model, OPENAI_DEFAULT_MODEL);
        assert_eq!(request.max_tokens, 500);
        assert!(!request.stream);
        assert_eq!(request.messages.len(), 1);
    }

    #[test]
    fn messages_must_be_an_array() {
        let form: ChatForm = serde_json::from_value(json!({"messages": "hi"})).unwrap();
        assert_eq!(
            ChatRequest::try_from(form).unwrap_err().to_string(),
            "(Invalid messages format)"
        );
    }

    #[test]
    fn upstream_error_message_is_extracted() {
        let body = json!({"error": {"message": "Incorrect API key provided"}});
        assert_eq!(
            openai_message(&body).as_deref(),
            Some("Incorrect API key provided")
        );
        assert_eq!(openai_message(&json!({})), None);
    }
}
