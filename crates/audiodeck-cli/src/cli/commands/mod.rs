//! CLI command handlers, one file per subcommand.

mod config;
mod fetch;
mod info;
mod serve;
mod trim;

pub use config::run_config;
pub use fetch::run_fetch;
pub use info::run_info;
pub use serve::run_serve;
pub use trim::run_trim;
