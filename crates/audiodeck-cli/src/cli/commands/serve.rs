//! `audiodeck serve` – run the HTTP server.

use anyhow::Result;
use audiodeck_core::config::DeckConfig;

use crate::server::{self, AppState};

pub async fn run_serve(cfg: &DeckConfig, addr: Option<&str>) -> Result<()> {
    let state = AppState::from_config(cfg)?;
    let addr = addr.unwrap_or(&cfg.listen_addr);
    server::serve(state, addr).await
}
