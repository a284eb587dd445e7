//! `audiodeck info` – print title and duration of a link.

use anyhow::Result;
use audiodeck_core::config::DeckConfig;

use crate::server::AppState;

pub async fn run_info(cfg: &DeckConfig, url: &str) -> Result<()> {
    let state = AppState::from_config(cfg)?;
    let check = state.pipeline.check_duration(url).await?;
    let title = state.pipeline.title(url).await?;
    println!("Title:    {title}");
    println!("Duration: {}s", check.duration);
    if check.is_too_long {
        println!("Too long: the limit is {}s", check.max_duration);
    }
    Ok(())
}
