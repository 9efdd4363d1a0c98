//! Per-call context types shared across layers.
//!
//! `CallContext` carries cancellation and deadlines; `AccessContext` carries
//! the validated caller identity.

pub mod access;
pub mod call;

pub use access::AccessContext;
pub use call::{CallContext, CancelHandle};
