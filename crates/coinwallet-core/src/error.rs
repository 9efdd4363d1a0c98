//! Shared error type across coinwallet crates.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Caller-facing status codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code {
    /// Missing/malformed credentials or a tier escalation attempt.
    Unauthenticated,
    /// Valid identity, but the endpoint requires a higher tier.
    PermissionDenied,
    /// Unknown token or user.
    NotFound,
    /// Malformed request body or configuration.
    InvalidArgument,
    /// A chained call could not be established.
    Unavailable,
    /// Malformed response from a trusted upstream.
    Internal,
}

impl Code {
    /// String representation used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Code::Unauthenticated => "UNAUTHENTICATED",
            Code::PermissionDenied => "PERMISSION_DENIED",
            Code::NotFound => "NOT_FOUND",
            Code::InvalidArgument => "INVALID_ARGUMENT",
            Code::Unavailable => "UNAVAILABLE",
            Code::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Code {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "UNAUTHENTICATED" => Ok(Code::Unauthenticated),
            "PERMISSION_DENIED" => Ok(Code::PermissionDenied),
            "NOT_FOUND" => Ok(Code::NotFound),
            "INVALID_ARGUMENT" => Ok(Code::InvalidArgument),
            "UNAVAILABLE" => Ok(Code::Unavailable),
            "INTERNAL" => Ok(Code::Internal),
            other => Err(WalletError::Internal(format!("unknown status code: {other}"))),
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, WalletError>;

/// Unified error type used by core, services and clients.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("unavailable: {0}")]
    Unavailable(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl WalletError {
    /// Build an error from a wire code and message.
    pub fn new(code: Code, msg: impl Into<String>) -> Self {
        let msg = msg.into();
        match code {
            Code::Unauthenticated => WalletError::Unauthenticated(msg),
            Code::PermissionDenied => WalletError::PermissionDenied(msg),
            Code::NotFound => WalletError::NotFound(msg),
            Code::InvalidArgument => WalletError::InvalidArgument(msg),
            Code::Unavailable => WalletError::Unavailable(msg),
            Code::Internal => WalletError::Internal(msg),
        }
    }

    /// Map to the stable caller-facing code.
    pub fn code(&self) -> Code {
        match self {
            WalletError::Unauthenticated(_) => Code::Unauthenticated,
            WalletError::PermissionDenied(_) => Code::PermissionDenied,
            WalletError::NotFound(_) => Code::NotFound,
            WalletError::InvalidArgument(_) => Code::InvalidArgument,
            WalletError::Unavailable(_) => Code::Unavailable,
            WalletError::Internal(_) => Code::Internal,
        }
    }

    /// Message without the code prefix.
    pub fn message(&self) -> &str {
        match self {
            WalletError::Unauthenticated(m)
            | WalletError::PermissionDenied(m)
            | WalletError::NotFound(m)
            | WalletError::InvalidArgument(m)
            | WalletError::Unavailable(m)
            | WalletError::Internal(m) => m,
        }
    }

    /// Prefix the message with `context`, keeping the original code.
    pub fn wrap(self, context: &str) -> Self {
        let msg = format!("{context}: {}", self.message());
        WalletError::new(self.code(), msg)
    }
}
