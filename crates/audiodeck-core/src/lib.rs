pub mod config;
pub mod error;
pub mod logging;

pub mod expiry;
pub mod filename;
pub mod job;
pub mod limiter;
pub mod metadata;
pub mod origin;
pub mod pipeline;
pub mod progress;
pub mod tools;
pub mod trim;
