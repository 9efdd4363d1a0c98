//! Mapping between the service types and HTTP: metadata headers, status
//! codes, and error bodies.

use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use coinwallet_core::error::{Code, Result, WalletError};
use coinwallet_core::protocol::{metadata, Envelope, ErrorBody, Metadata};

/// Headers that carry call metadata.
const METADATA_HEADERS: [&str; 4] = [
    metadata::AUTHORIZATION,
    metadata::MEMBERSHIP,
    metadata::ROUTE,
    metadata::HOSTNAME,
];

/// Pull the known metadata keys out of a header map. Non-UTF-8 values are
/// treated as absent.
pub fn metadata_from_headers(headers: &HeaderMap) -> Metadata {
    let mut md = Metadata::new();
    for key in METADATA_HEADERS {
        if let Some(v) = headers.get(key).and_then(|v| v.to_str().ok()) {
            md.insert(key, v);
        }
    }
    md
}

/// Write metadata into a header map, skipping entries that are not valid
/// header names or values.
pub fn write_metadata(headers: &mut HeaderMap, md: &Metadata) {
    for (k, v) in md.iter() {
        let (Ok(name), Ok(value)) = (HeaderName::from_bytes(k.as_bytes()), HeaderValue::from_str(v))
        else {
            tracing::warn!(key = k, "metadata not representable as header");
            continue;
        };
        headers.insert(name, value);
    }
}

pub fn status_for(code: Code) -> StatusCode {
    match code {
        Code::Unauthenticated => StatusCode::UNAUTHORIZED,
        Code::PermissionDenied => StatusCode::FORBIDDEN,
        Code::NotFound => StatusCode::NOT_FOUND,
        Code::InvalidArgument => StatusCode::BAD_REQUEST,
        Code::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        Code::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Best-effort inverse of `status_for`, used when an error response has no
/// readable body.
pub fn code_for_status(status: StatusCode) -> Code {
    match status {
        StatusCode::UNAUTHORIZED => Code::Unauthenticated,
        StatusCode::FORBIDDEN => Code::PermissionDenied,
        StatusCode::NOT_FOUND => Code::NotFound,
        StatusCode::BAD_REQUEST => Code::InvalidArgument,
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY | StatusCode::GATEWAY_TIMEOUT => {
            Code::Unavailable
        }
        _ => Code::Internal,
    }
}

/// Rebuild an error from a non-success response body.
pub fn error_from_body(status: StatusCode, body: &[u8]) -> WalletError {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(b) => b.into_error(),
        Err(_) => WalletError::new(
            code_for_status(status),
            format!("upstream returned {status}"),
        ),
    }
}

pub fn error_response(err: &WalletError, hostname: &str) -> Response {
    let mut resp = (status_for(err.code()), Json(ErrorBody::from(err))).into_response();
    write_metadata(resp.headers_mut(), &Metadata::new().with(metadata::HOSTNAME, hostname));
    resp
}

/// Unary result to response: payload as JSON with the envelope's metadata
/// as headers, or the error body.
pub fn respond<T: Serialize>(result: Result<Envelope<T>>, hostname: &str) -> Response {
    match result {
        Ok(env) => {
            let mut resp = Json(env.payload).into_response();
            write_metadata(resp.headers_mut(), &env.metadata);
            resp
        }
        Err(e) => {
            tracing::debug!(code = %e.code(), error = %e, "call failed");
            error_response(&e, hostname)
        }
    }
}
