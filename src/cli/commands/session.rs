use anyhow::Context;
use chrono::Utc;
use clap::Subcommand;
use serde_json::json;
use std::io::Read;
use std::path::PathBuf;

use crate::cli::config::{clear_session, load_session, save_session};
use crate::cli::utils::{output_json, output_success};
use crate::cli::OutputFormat;
use crate::session::Session;

#[derive(Subcommand)]
pub enum SessionCommands {
    #[command(about = "Store the auth payload returned by the login endpoint")]
    Import {
        #[arg(help = "JSON file holding the payload; reads stdin when omitted")]
        file: Option<PathBuf>,
    },

    #[command(about = "Show the stored session")]
    Show,

    #[command(about = "Forget the stored session")]
    Clear,
}

pub async fn handle(cmd: SessionCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        SessionCommands::Import { file } => {
            let content = match &file {
                Some(path) => std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let session = Session::from_json_str(&content)?;
            if session.account_id().is_none() {
                tracing::warn!("Imported session has no account id; list commands will fail");
            }

            let path = save_session(&session)?;
            output_success(
                &output_format,
                "Session imported",
                Some(json!({
                    "path": path.display().to_string(),
                    "account_id": session.account_id(),
                    "permissions": session.permissions().len(),
                })),
            )
        }
        SessionCommands::Show => {
            let Some(session) = load_session()? else {
                return match output_format {
                    OutputFormat::Json => output_json(&json!({ "session": null })),
                    OutputFormat::Text => {
                        println!("No session stored");
                        Ok(())
                    }
                };
            };

            // The token is opaque to the backend's clients; an unreadable one
            // is reported rather than treated as fatal
            let (expires_at, expired) = match session.token_expiry() {
                Ok(exp) => (exp, session.is_expired(Utc::now()).unwrap_or(false)),
                Err(e) => {
                    tracing::warn!("Cannot read token expiry: {}", e);
                    (None, false)
                }
            };

            match output_format {
                OutputFormat::Json => output_json(&json!({
                    "session": {
                        "user": session.user_name(),
                        "account_id": session.account_id(),
                        "permissions": session.permissions(),
                        "expires_at": expires_at.map(|d| d.to_rfc3339()),
                        "expired": expired,
                    }
                })),
                OutputFormat::Text => {
                    println!("User:        {}", session.user_name().unwrap_or("-"));
                    println!("Account:     {}", session.account_id().as_deref().unwrap_or("-"));
                    match expires_at {
                        Some(exp) if expired => println!("Token:       expired at {}", exp.to_rfc3339()),
                        Some(exp) => println!("Token:       valid until {}", exp.to_rfc3339()),
                        None => println!("Token:       no expiry"),
                    }
                    println!("Permissions:");
                    for permission in session.permissions().iter() {
                        let entity = permission
                            .entity_name
                            .as_deref()
                            .or(permission.name.as_deref())
                            .unwrap_or("?");
                        let granted: Vec<&str> = permission
                            .actions
                            .iter()
                            .filter(|(_, allowed)| **allowed)
                            .map(|(action, _)| action.as_str())
                            .collect();
                        println!("  {:<20} {}", entity, granted.join(", "));
                    }
                    Ok(())
                }
            }
        }
        SessionCommands::Clear => {
            let message = if clear_session()? { "Session cleared" } else { "No session stored" };
            output_success(&output_format, message, None)
        }
    }
}
