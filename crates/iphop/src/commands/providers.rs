//! Providers command - DNS provider account management.

use std::collections::HashMap;

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use console::{Style, style};
use iphop_client::{CreateProviderRequest, ListProvidersQuery, Provider, UpdateProviderRequest};

use super::{Context, confirm, failed};

/// Provider kinds the backend knows how to drive.
pub const PROVIDER_TYPES: &[&str] = &["cloudflare", "dynu", "duckdns", "noip"];

/// Arguments for the providers command.
#[derive(Args, Debug)]
pub struct ProvidersArgs {
    #[command(subcommand)]
    pub command: ProvidersCommand,
}

#[derive(Subcommand, Debug)]
pub enum ProvidersCommand {
    /// List providers
    List {
        /// Number of providers to skip
        #[arg(long)]
        skip: Option<usize>,

        /// Maximum providers to return
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Add a provider account
    Add {
        /// Display name
        name: String,

        /// Provider kind (cloudflare, dynu, duckdns, noip)
        #[arg(short = 't', long = "type", default_value = "dynu")]
        provider_type: String,

        /// API token (prompted if omitted)
        #[arg(long)]
        token: Option<String>,

        /// Create the provider disabled
        #[arg(long)]
        disabled: bool,
    },

    /// Update a provider account
    Update {
        /// Provider ID
        id: i64,

        /// New display name
        #[arg(long)]
        name: Option<String>,

        /// Replace the API token
        #[arg(long)]
        token: Option<String>,

        /// Enable or disable the provider
        #[arg(long)]
        enabled: Option<bool>,
    },

    /// Delete a provider account
    Delete {
        /// Provider ID
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Run the providers command.
pub async fn run(args: ProvidersArgs, ctx: &Context) -> Result<()> {
    let client = ctx.authenticated_client().await?;
    let green = Style::new().green();

    match args.command {
        ProvidersCommand::List { skip, limit } => {
            let providers = client
                .providers()
                .list_with_query(ListProvidersQuery { skip, limit })
                .await?;
            if ctx.json_output {
                return super::print_json(&providers);
            }
            print_providers(&providers);
        }
        ProvidersCommand::Add {
            name,
            provider_type,
            token,
            disabled,
        } => {
            if !PROVIDER_TYPES.contains(&provider_type.as_str()) {
                bail!(
                    "Unknown provider type '{}' (expected one of: {})",
                    provider_type,
                    PROVIDER_TYPES.join(", ")
                );
            }
            let token = match token {
                Some(token) => token,
                None => rpassword::prompt_password("API token: ")?,
            };

            let request = CreateProviderRequest {
                name,
                provider_type,
                is_enabled: !disabled,
                credentials: token_credentials(token),
            };
            let provider = client
                .providers()
                .create(&request)
                .await
                .map_err(|e| failed("Failed to create provider", e))?;

            if ctx.json_output {
                return super::print_json(&provider);
            }
            println!(
                "{} Provider created: {} {}",
                green.apply_to("✓"),
                provider.name,
                Style::new().dim().apply_to(format!("[{}]", provider.id))
            );
        }
        ProvidersCommand::Update {
            id,
            name,
            token,
            enabled,
        } => {
            let request = UpdateProviderRequest {
                name,
                is_enabled: enabled,
                // Credentials are only sent when a new token is given
                credentials: token.filter(|t| !t.is_empty()).map(token_credentials),
            };
            let provider = client
                .providers()
                .update(id, &request)
                .await
                .map_err(|e| failed("Failed to update provider", e))?;

            if ctx.json_output {
                return super::print_json(&provider);
            }
            println!("{} Provider updated: {}", green.apply_to("✓"), provider.name);
        }
        ProvidersCommand::Delete { id, yes } => {
            if !yes {
                let name = client
                    .providers()
                    .list()
                    .await?
                    .into_iter()
                    .find(|p| p.id == id)
                    .map(|p| p.name)
                    .unwrap_or_else(|| format!("provider {}", id));
                let question = format!(
                    "Are you sure you want to delete \"{}\"? This action cannot be undone.",
                    name
                );
                if !confirm(&question)? {
                    println!("{}", Style::new().dim().apply_to("Cancelled"));
                    return Ok(());
                }
            }

            let response = client
                .providers()
                .delete(id)
                .await
                .map_err(|e| failed("Failed to delete provider", e))?;
            if ctx.json_output {
                return super::print_json(&response);
            }
            println!("{} {}", green.apply_to("✓"), response.message);
        }
    }

    Ok(())
}

fn token_credentials(token: String) -> HashMap<String, serde_json::Value> {
    HashMap::from([("token".to_string(), serde_json::Value::String(token))])
}

/// Print a provider table.
pub fn print_providers(providers: &[Provider]) {
    let dim = Style::new().dim();
    let green = Style::new().green();

    println!("{}", style("Providers").bold());
    println!("{}", dim.apply_to("─".repeat(50)));

    if providers.is_empty() {
        println!("{}", dim.apply_to("No providers configured"));
        return;
    }

    for provider in providers {
        let state = if provider.is_enabled {
            green.apply_to("enabled")
        } else {
            dim.apply_to("disabled")
        };
        println!(
            "{} {:<24} {:<12} {}",
            dim.apply_to(format!("[{:>3}]", provider.id)),
            provider.name,
            provider.provider_type,
            state
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_credentials_shape() {
        let credentials = token_credentials("abc123".into());
        assert_eq!(
            serde_json::to_value(&credentials).unwrap(),
            serde_json::json!({ "token": "abc123" })
        );
    }
}
