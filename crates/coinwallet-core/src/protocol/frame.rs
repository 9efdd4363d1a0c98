//! Stream frame format.
//!
//! Every item of a streaming call is one JSON text frame `{"item": ...}`.
//! A stream that fails sends a single `{"error": {"code", "message"}}` frame
//! and then closes; a stream that ends normally just closes.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Code, Result, WalletError};

/// Error body used both as the terminal stream frame and as the unary
/// error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl From<&WalletError> for ErrorBody {
    fn from(e: &WalletError) -> Self {
        Self {
            code: e.code().as_str().to_string(),
            message: e.message().to_string(),
        }
    }
}

impl ErrorBody {
    /// Rebuild the error, keeping the code it was sent with.
    pub fn into_error(self) -> WalletError {
        match self.code.parse::<Code>() {
            Ok(code) => WalletError::new(code, self.message),
            Err(_) => WalletError::Internal(format!(
                "upstream sent unknown code {}: {}",
                self.code, self.message
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamFrame<T> {
    Item(T),
    Error(ErrorBody),
}

impl<T> StreamFrame<T> {
    pub fn into_result(self) -> Result<T> {
        match self {
            StreamFrame::Item(v) => Ok(v),
            StreamFrame::Error(body) => Err(body.into_error()),
        }
    }
}

impl<T> From<Result<T>> for StreamFrame<T> {
    fn from(r: Result<T>) -> Self {
        match r {
            Ok(v) => StreamFrame::Item(v),
            Err(e) => StreamFrame::Error(ErrorBody::from(&e)),
        }
    }
}

pub fn encode_frame<T: Serialize>(frame: &StreamFrame<T>) -> Result<String> {
    serde_json::to_string(frame)
        .map_err(|e| WalletError::Internal(format!("frame encode failed: {e}")))
}

pub fn decode_frame<T: DeserializeOwned>(s: &str) -> Result<StreamFrame<T>> {
    serde_json::from_str(s)
        .map_err(|e| WalletError::Internal(format!("malformed stream frame: {e}")))
}
