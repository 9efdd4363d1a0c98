//! Transport layer: HTTP for unary calls, WebSocket for watch calls, and
//! the matching remote clients.

pub mod client;
pub mod codec;
pub mod http;
pub mod ws;
