use std::{
    convert::Infallible,
    fmt::{self, Display},
};

use serde::Serialize;
use warp::{
    http::StatusCode,
    reject::{self, Rejection},
    reply::{self, Reply, Response},
};

/// Error returned by every request path; rendered as `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub code: u16,
    pub info: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HtmlError {
    InvalidRequest,
    InvalidSession,
    Unauthorized,
    NotFound,
    InternalServerError,
    Upstream(u16),
}

impl HtmlError {
    pub fn code(&self) -> u16 {
        match self {
            HtmlError::InvalidRequest => 400,
            HtmlError::InvalidSession => 401,
            HtmlError::Unauthorized => 403,
            HtmlError::NotFound => 404,
            HtmlError::InternalServerError => 500,
            HtmlError::Upstream(code) => *code,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            HtmlError::InvalidRequest => "Invalid request",
            HtmlError::InvalidSession => "Please authenticate.",
            HtmlError::Unauthorized => "You don't have permission to perform this action",
            HtmlError::NotFound => "Not found",
            HtmlError::InternalServerError => "Internal server error",
            HtmlError::Upstream(_) => "Upstream request failed",
        }
    }

    pub fn new(self, info: &str) -> Error {
        Error {
            code: self.code(),
            info: Some(info.to_string()),
        }
    }

    pub fn default(self) -> Error {
        self.new(self.message())
    }
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: &'a str,
}

impl Error {
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn message(&self) -> &str {
        self.info.as_deref().unwrap_or("Unknown error")
    }

    pub fn into_response(&self) -> Response {
        reply::with_status(
            reply::json(&ErrorEnvelope {
                error: self.message(),
            }),
            self.status(),
        )
        .into_response()
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code)
    }
}

impl std::error::Error for Error {}

impl reject::Reject for Error {}

/// Renders every rejection that reaches the top of the filter tree.
pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let error = if let Some(error) = err.find::<Error>() {
        error.to_owned()
    } else if err.is_not_found() {
        HtmlError::NotFound.new("Route not found")
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        HtmlError::InvalidRequest.new(&format!("Malformed body: {e}"))
    } else if let Some(e) = err.find::<reject::InvalidQuery>() {
        HtmlError::InvalidRequest.new(&format!("{e}"))
    } else if err.find::<reject::PayloadTooLarge>().is_some() {
        Error {
            code: 413,
            info: Some(String::from("Payload too large")),
        }
    } else if err.find::<reject::UnsupportedMediaType>().is_some() {
        Error {
            code: 415,
            info: Some(String::from("Unsupported media type")),
        }
    } else if err.find::<reject::MethodNotAllowed>().is_some() {
        Error {
            code: 405,
            info: Some(String::from("Method not allowed")),
        }
    } else {
        log::error!("Unhandled rejection: {err:?}");
        HtmlError::InternalServerError.default()
    };

    if error.code >= 500 {
        log::error!("{error}");
    }

    Ok(error.into_response())
}
