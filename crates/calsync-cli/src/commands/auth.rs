use clap::{Subcommand, ValueEnum};
use calsync_core::config::SecretKey;
use calsync_core::integrations::keyring_store;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Store a secret in the OS keyring
    Set {
        secret: Secret,
        /// Secret value (prompted for when omitted)
        #[arg(long)]
        value: Option<String>,
    },
    /// Remove a secret from the OS keyring
    Clear { secret: Secret },
    /// Show which secrets are stored
    Status { secret: Option<Secret> },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Secret {
    NotionToken,
    PersonalClientSecret,
    PersonalRefreshToken,
    WorkClientSecret,
    WorkRefreshToken,
}

impl From<Secret> for SecretKey {
    fn from(secret: Secret) -> Self {
        match secret {
            Secret::NotionToken => SecretKey::NotionToken,
            Secret::PersonalClientSecret => SecretKey::PersonalClientSecret,
            Secret::PersonalRefreshToken => SecretKey::PersonalRefreshToken,
            Secret::WorkClientSecret => SecretKey::WorkClientSecret,
            Secret::WorkRefreshToken => SecretKey::WorkRefreshToken,
        }
    }
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AuthAction::Set { secret, value } => {
            let key = SecretKey::from(secret);
            let value = match value {
                Some(v) => v,
                None => inquire::Password::new(&format!("{}:", key.as_str()))
                    .without_confirmation()
                    .prompt()?,
            };
            if value.trim().is_empty() {
                return Err("secret must not be empty".into());
            }
            keyring_store::set(key.as_str(), value.trim())?;
            println!("{} stored", key.as_str());
        }
        AuthAction::Clear { secret } => {
            let key = SecretKey::from(secret);
            keyring_store::delete(key.as_str())?;
            println!("{} removed", key.as_str());
        }
        AuthAction::Status { secret } => {
            let keys: Vec<SecretKey> = match secret {
                Some(s) => vec![s.into()],
                None => SecretKey::ALL.to_vec(),
            };
            for key in keys {
                let state = match keyring_store::get(key.as_str())? {
                    Some(_) => "stored",
                    None => "not stored",
                };
                println!("{}: {state}", key.as_str());
            }
        }
    }
    Ok(())
}
