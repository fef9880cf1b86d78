use thiserror::Error;
use wasm_bindgen::JsValue;

use crate::posts::PostId;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("response is not json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("javascript error: {0}")]
    Js(String),
    #[error("element not found: {0}")]
    MissingElement(String),
    #[error("missing attribute {0}")]
    MissingAttribute(&'static str),
    #[error("invalid post id {0:?}")]
    InvalidPostId(String),
    #[error("unknown post {0}")]
    UnknownPost(PostId),
    #[error("post {0} is not being edited")]
    NotEditing(PostId),
    #[error("csrf token field is missing")]
    MissingCsrfToken,
    #[error("invalid page config: {0}")]
    Config(String),
}

impl From<JsValue> for FrontendError {
    fn from(value: JsValue) -> Self {
        FrontendError::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}
