use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use warp::{
    http::{header::CONTENT_TYPE, Response as HttpResponse},
    hyper::Body,
    reply::Response,
};

use crate::error::{Error, HtmlError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub struct ProxyError(reqwest::Error);

impl From<reqwest::Error> for ProxyError {
    fn from(value: reqwest::Error) -> Self {
        Self(value)
    }
}

impl From<ProxyError> for Error {
    fn from(value: ProxyError) -> Self {
        log::error!("Upstream request failed: {}", value.0);
        HtmlError::InternalServerError.new(&value.0.to_string())
    }
}

pub fn build_client() -> Result<Client, Error> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("cocktail_api/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ProxyError::from(e).into())
}

/// Fails with the provider's "not configured" error when no key is set.
pub fn require_key<'a>(key: Option<&'a str>, provider: &str) -> Result<&'a str, Error> {
    key.ok_or_else(|| HtmlError::InternalServerError.new(&format!("{provider} API key not configured")))
}

/// Sends the request and turns a non-2xx answer into an error carrying the
/// upstream status. `message` extracts a provider-specific message from the
/// error body; `fallback` is used when it finds none.
pub async fn send<F>(
    request: RequestBuilder,
    message: F,
    fallback: &str,
) -> Result<reqwest::Response, Error>
where
    F: FnOnce(&Value) -> Option<String>,
{
    let res = request.send().await.map_err(ProxyError::from)?;

    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body: Value = res.json().await.unwrap_or(Value::Null);
    let info = message(&body).unwrap_or_else(|| fallback.to_string());
    log::warn!("Upstream answered {status}: {info}");

    Err(HtmlError::Upstream(status.as_u16()).new(&info))
}

/// Relays a successful upstream answer as-is: status, content type and body.
pub async fn relay(res: reqwest::Response) -> Result<Response, Error> {
    let status = res.status().as_u16();
    let content_type = res
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/json")
        .to_string();
    let bytes = res.bytes().await.map_err(ProxyError::from)?;

    HttpResponse::builder()
        .status(status)
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(bytes))
        .map_err(|e| HtmlError::InternalServerError.new(&e.to_string()))
}

pub async fn forward<F>(request: RequestBuilder, message: F, fallback: &str) -> Result<Response, Error>
where
    F: FnOnce(&Value) -> Option<String>,
{
    relay(send(request, message, fallback).await?).await
}

pub async fn fetch_json<F>(request: RequestBuilder, message: F, fallback: &str) -> Result<Value, Error>
where
    F: FnOnce(&Value) -> Option<String>,
{
    let res = send(request, message, fallback).await?;
    let value = res.json::<Value>().await.map_err(ProxyError::from)?;
    Ok(value)
}

pub fn no_message(_: &Value) -> Option<String> {
    None
}
