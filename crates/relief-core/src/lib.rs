//! Core types and the relief-request workflow.
//!
//! This crate has no HTTP or database dependencies.
//! Storage backends implement [`store::ReliefStore`]; transports wrap
//! [`workflow::ReliefService`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod duplicate;
pub mod error;
pub mod identity;
pub mod policy;
pub mod request;
pub mod retry;
pub mod scope;
pub mod store;
pub mod workflow;

pub use error::{Error, Result};
pub use identity::{Identity, Role};
pub use workflow::ReliefService;
