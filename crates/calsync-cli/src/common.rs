//! Shared helpers for commands that talk to the services.

use calsync_core::{Config, GoogleCalendarClient, NotionClient};

/// Both collaborators, built once from the resolved config.
pub struct Clients {
    pub notion: NotionClient,
    pub google: GoogleCalendarClient,
}

pub fn build_clients(config: &Config) -> Result<Clients, Box<dyn std::error::Error>> {
    let http = config.http_client()?;
    Ok(Clients {
        notion: NotionClient::new(&config.notion, http.clone()),
        google: GoogleCalendarClient::new(&config.google, &config.calendars, http),
    })
}
