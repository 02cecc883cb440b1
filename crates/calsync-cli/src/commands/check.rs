use calsync_core::{Config, SyncOrchestrator};

use crate::common::build_clients;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_resolved()?;
    let zone = config.time_zone()?;
    let clients = build_clients(&config)?;

    let orchestrator = SyncOrchestrator::new(&clients.notion, &clients.google, zone);
    orchestrator.preflight().await?;
    println!("Notion and Google Calendar are reachable");
    Ok(())
}
