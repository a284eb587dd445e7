//! Progress broadcasting.
//!
//! [`ProgressHub`] owns one event source per job; transport adapters
//! (WebSocket and SSE in the binary) subscribe and serialize
//! [`ProgressMessage`] values. A subscriber going away never affects the job
//! or other subscribers.

mod hub;
mod message;

pub use hub::{ProgressHub, Subscription};
pub use message::ProgressMessage;

#[cfg(test)]
mod tests;
