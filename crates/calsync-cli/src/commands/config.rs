use clap::Subcommand;
use calsync_core::config::{self, Config};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the config file path
    Path,
    /// Print the effective configuration with secrets redacted
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Path => {
            println!("{}", config::default_path()?.display());
        }
        ConfigAction::Show { json } => {
            let config = Config::load_resolved()?.redacted();
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print!("{}", toml::to_string_pretty(&config)?);
            }
        }
        ConfigAction::Init { force } => {
            let path = config::default_path()?;
            if path.exists() && !force {
                return Err(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )
                .into());
            }
            Config::default().save_to(&path)?;
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}
