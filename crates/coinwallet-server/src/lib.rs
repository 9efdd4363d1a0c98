//! coinwallet server library.
//!
//! Wires the account, price and wallet services with membership
//! validation, the streaming runtime, HTTP/WebSocket transport and remote
//! clients. Consumed by the server binary, the command-line client, and
//! integration tests.

pub mod app_state;
pub mod config;
pub mod context;
pub mod host;
pub mod obs;
pub mod policy;
pub mod realtime;
pub mod router;
pub mod services;
pub mod transport;
