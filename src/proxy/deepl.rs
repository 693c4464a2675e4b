use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use warp::reply::Response;

use super::client::{forward, require_key};
use crate::{database::error::TypeError, error::Error};

const PROVIDER: &str = "DeepL";

#[derive(Deserialize, Debug, Default, Clone)]
pub struct DeepLQuery {
    pub endpoint: Option<String>,
    pub r#type: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct TranslateForm {
    pub text: Option<Value>,
    pub target_lang: Option<String>,
    pub source_lang: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TranslateRequest {
    pub text: Vec<String>,
    pub target_lang: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_lang: Option<String>,
}

fn language(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_uppercase())
        .filter(|v| !v.is_empty())
}

impl TryFrom<TranslateForm> for TranslateRequest {
    type Error = TypeError;

    /// A single string is sent as a one-element batch.
    fn try_from(form: TranslateForm) -> Result<Self, Self::Error> {
        let missing = || TypeError::new("Text and target_lang are required");

        let text = match form.text {
            Some(Value::String(text)) if !text.is_empty() => vec![text],
            Some(Value::Array(texts)) if !texts.is_empty() => texts
                .into_iter()
                .map(|t| match t {
                    Value::String(t) => Ok(t),
                    _ => Err(TypeError::new("Text entries must be strings")),
                })
                .collect::<Result<Vec<String>, TypeError>>()?,
            _ => return Err(missing()),
        };

        Ok(Self {
            text,
            target_lang: language(form.target_lang).ok_or_else(missing)?,
            source_lang: language(form.source_lang),
        })
    }
}

fn deepl_message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .map(String::from)
}

#[derive(Clone)]
pub struct DeepL {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl DeepL {
    pub fn new(http: Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn authorization(&self) -> Result<String, Error> {
        let key = require_key(self.api_key.as_deref(), PROVIDER)?;
        Ok(format!("DeepL-Auth-Key {key}"))
    }

    pub async fn translate(&self, form: TranslateForm) -> Result<Response, Error> {
        let authorization = self.authorization()?;
        let body = TranslateRequest::try_from(form)?;

        let request = self
            .http
            .post(format!("{}/translate", self.base_url))
            .header(reqwest::header::AUTHORIZATION, authorization)
            .json(&body);

        forward(request, deepl_message, "Translation failed").await
    }

    pub async fn languages(&self, r#type: Option<&str>) -> Result<Response, Error> {
        let authorization = self.authorization()?;
        let r#type = r#type.filter(|t| !t.is_empty()).unwrap_or("target");

        let request = self
            .http
            .get(format!("{}/languages", self.base_url))
            .header(reqwest::header::AUTHORIZATION, authorization)
            .query(&[("type", r#type)]);

        forward(request, |_| None, "Failed to fetch languages").await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn form(value: Value) -> TranslateForm {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn single_text_becomes_a_batch() {
        let request =
            TranslateRequest::try_from(form(json!({"text": "Shake well", "target_lang": "de"})))
                .unwrap();
        assert_eq!(request.text, vec!["Shake well"]);
        assert_eq!(request.target_lang, "DE");
        assert_eq!(request.source_lang, None);
    }

    #[test]
    fn source_language_is_uppercased() {
        let request = TranslateRequest::try_from(form(json!({
            "text": ["Stir", "Strain"],
            "target_lang": "fr",
            "source_lang": "en"
        })))
        .unwrap();
        assert_eq!(request.text.len(), 2);
        assert_eq!(request.source_lang.as_deref(), Some("EN"));

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["source_lang"], "EN");
    }

    #[test]
    fn text_and_target_are_required() {
        assert!(TranslateRequest::try_from(form(json!({"text": "Stir"}))).is_err());
        assert!(TranslateRequest::try_from(form(json!({"target_lang": "DE"}))).is_err());
        assert!(TranslateRequest::try_from(form(json!({"text": [1], "target_lang": "DE"}))).is_err());
    }

    #[tokio::test]
    async fn missing_key_short_circuits() {
        let deepl = DeepL::new(Client::new(), "http://127.0.0.1:9", None);
        let error = deepl
            .translate(form(json!({"text": "Stir", "target_lang": "DE"})))
            .await
            .unwrap_err();
        assert_eq!(error.message(), "DeepL API key not configured");
    }
}
