//! `audiodeck trim` – cut a section of a clip into a new clip.

use anyhow::Result;
use audiodeck_core::config::DeckConfig;
use audiodeck_core::trim::TrimRequest;

use crate::server::AppState;

pub async fn run_trim(
    cfg: &DeckConfig,
    file: String,
    start: f64,
    end: f64,
    name: String,
) -> Result<()> {
    let state = AppState::from_config(cfg)?;
    let filename = state
        .trims
        .trim(&TrimRequest {
            filename: file,
            start_time: start,
            end_time: end,
            new_name: name,
        })
        .await?;
    println!("Saved {}", state.pipeline.clips_dir().join(filename).display());
    Ok(())
}
