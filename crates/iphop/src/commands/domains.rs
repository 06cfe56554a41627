//! Domains command - DDNS domain management.

use std::collections::HashMap;

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use console::{Style, style};
use iphop_client::{
    CreateDomainRequest, DashboardClient, Domain, HistoryQuery, IpHistory, ListDomainsQuery,
    UpdateDomainRequest,
};

use super::{Context, confirm, failed, format_timestamp, status_style, truncate};

/// Arguments for the domains command.
#[derive(Args, Debug)]
pub struct DomainsArgs {
    #[command(subcommand)]
    pub command: DomainsCommand,
}

#[derive(Subcommand, Debug)]
pub enum DomainsCommand {
    /// List domains
    List {
        /// Number of domains to skip
        #[arg(long)]
        skip: Option<usize>,

        /// Maximum domains to return
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Add a domain
    Add {
        /// Fully qualified domain name
        name: String,

        /// Provider ID that serves this domain
        #[arg(short, long)]
        provider: i64,

        /// Provider-side record or zone ID
        #[arg(long)]
        external_id: Option<String>,

        /// Cron expression for scheduled updates
        #[arg(long)]
        cron: Option<String>,

        /// Cloudflare DNS record ID
        #[arg(long)]
        record_id: Option<String>,

        /// Proxy through Cloudflare
        #[arg(long)]
        proxied: bool,
    },

    /// Update a domain
    Update {
        /// Domain ID
        id: i64,

        /// New domain name
        #[arg(long)]
        name: Option<String>,

        /// Provider-side record or zone ID (empty string clears it)
        #[arg(long)]
        external_id: Option<String>,

        /// Cron expression for scheduled updates (empty string clears it)
        #[arg(long)]
        cron: Option<String>,

        /// Cloudflare DNS record ID
        #[arg(long)]
        record_id: Option<String>,

        /// Proxy through Cloudflare
        #[arg(long)]
        proxied: Option<bool>,
    },

    /// Delete a domain
    Delete {
        /// Domain ID
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show recent update attempts for a domain
    History {
        /// Domain ID
        id: i64,

        /// Maximum entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Push the current public IP to the provider now
    UpdateIp {
        /// Domain ID
        id: i64,
    },
}

/// Run the domains command.
pub async fn run(args: DomainsArgs, ctx: &Context) -> Result<()> {
    let client = ctx.authenticated_client().await?;
    let green = Style::new().green();

    match args.command {
        DomainsCommand::List { skip, limit } => {
            let domains = client
                .domains()
                .list_with_query(ListDomainsQuery { skip, limit })
                .await?;
            if ctx.json_output {
                return super::print_json(&domains);
            }
            print_domains(&domains);
        }
        DomainsCommand::Add {
            name,
            provider,
            external_id,
            cron,
            record_id,
            proxied,
        } => {
            let mut config: HashMap<String, serde_json::Value> = HashMap::new();
            if let Some(record_id) = record_id {
                config.insert("record_id".to_string(), record_id.into());
            }
            if proxied {
                config.insert("proxied".to_string(), true.into());
            }

            let request = CreateDomainRequest {
                domain_name: name,
                provider_id: provider,
                external_id: external_id.filter(|s| !s.is_empty()),
                config,
                cron_schedule: cron.filter(|s| !s.is_empty()),
            };
            let domain = client
                .domains()
                .create(&request)
                .await
                .map_err(|e| failed("Failed to create domain", e))?;

            if ctx.json_output {
                return super::print_json(&domain);
            }
            println!(
                "{} Domain created: {} {}",
                green.apply_to("✓"),
                domain.domain_name,
                Style::new().dim().apply_to(format!("[{}]", domain.id))
            );
        }
        DomainsCommand::Update {
            id,
            name,
            external_id,
            cron,
            record_id,
            proxied,
        } => {
            let config = if record_id.is_some() || proxied.is_some() {
                let mut config = existing_config(&client, id).await?;
                if let Some(record_id) = record_id {
                    config.insert("record_id".to_string(), record_id.into());
                }
                if let Some(proxied) = proxied {
                    config.insert("proxied".to_string(), proxied.into());
                }
                Some(config)
            } else {
                None
            };

            let request = update_request(name, external_id, cron, config);
            let domain = client
                .domains()
                .update(id, &request)
                .await
                .map_err(|e| failed("Failed to update domain", e))?;

            if ctx.json_output {
                return super::print_json(&domain);
            }
            println!("{} Domain updated: {}", green.apply_to("✓"), domain.domain_name);
        }
        DomainsCommand::Delete { id, yes } => {
            if !yes {
                let name = client
                    .domains()
                    .list()
                    .await?
                    .into_iter()
                    .find(|d| d.id == id)
                    .map(|d| d.domain_name)
                    .unwrap_or_else(|| format!("domain {}", id));
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
                .domains()
                .delete(id)
                .await
                .map_err(|e| failed("Failed to delete domain", e))?;
            if ctx.json_output {
                return super::print_json(&response);
            }
            println!("{} {}", green.apply_to("✓"), response.message);
        }
        DomainsCommand::History { id, limit } => {
            let history = client
                .domains()
                .history(id, HistoryQuery { limit: Some(limit) })
                .await?;
            if ctx.json_output {
                return super::print_json(&history);
            }
            print_history(id, &history);
        }
        DomainsCommand::UpdateIp { id } => {
            let response = client
                .domains()
                .update_ip(id)
                .await
                .map_err(|e| failed("Failed to update IP", e))?;
            if ctx.json_output {
                return super::print_json(&response);
            }
            println!(
                "{} IP Updated: {}",
                green.apply_to("✓"),
                response.message
            );
        }
    }

    Ok(())
}

/// Build an update payload. Empty strings are sent as-is so the server
/// clears `external_id` and `cron_schedule`; unset flags are omitted.
fn update_request(
    name: Option<String>,
    external_id: Option<String>,
    cron: Option<String>,
    config: Option<HashMap<String, serde_json::Value>>,
) -> UpdateDomainRequest {
    UpdateDomainRequest {
        domain_name: name.filter(|s| !s.is_empty()),
        external_id,
        config,
        cron_schedule: cron,
    }
}

async fn existing_config(
    client: &DashboardClient,
    id: i64,
) -> Result<HashMap<String, serde_json::Value>> {
    let domains = client.domains().list().await?;
    match domains.into_iter().find(|d| d.id == id) {
        Some(domain) => Ok(domain.config),
        None => bail!("Domain {} not found", id),
    }
}

/// Print a domain table.
pub fn print_domains(domains: &[Domain]) {
    let dim = Style::new().dim();

    println!("{}", style("Domains").bold());
    println!("{}", dim.apply_to("─".repeat(70)));

    if domains.is_empty() {
        println!("{}", dim.apply_to("No domains configured"));
        return;
    }

    for domain in domains {
        let status = domain.last_update_status.as_deref().unwrap_or("PENDING");
        println!(
            "{} {:<32} {:<16} {}",
            dim.apply_to(format!("[{:>3}]", domain.id)),
            truncate(&domain.domain_name, 32),
            domain.last_known_ip.as_deref().unwrap_or("-"),
            status_style(status).apply_to(status)
        );
        if let Some(cron) = &domain.cron_schedule {
            println!(
                "      {}",
                dim.apply_to(format!("provider {} · schedule {}", domain.provider_id, cron))
            );
        }
    }
}

/// Print a domain's update history.
pub fn print_history(id: i64, history: &[IpHistory]) {
    let dim = Style::new().dim();

    println!("{}", style(format!("History for domain {}", id)).bold());
    println!("{}", dim.apply_to("─".repeat(70)));

    if history.is_empty() {
        println!("{}", dim.apply_to("No updates recorded"));
        return;
    }

    for entry in history {
        println!(
            "{} {:<16} {}",
            dim.apply_to(format_timestamp(&entry.timestamp)),
            entry.ip_address,
            status_style(&entry.status).apply_to(&entry.status)
        );
        if let Some(message) = &entry.message {
            println!("    {}", dim.apply_to(truncate(message, 66)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_clears_with_empty_strings() {
        let request = update_request(None, Some(String::new()), Some(String::new()), None);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({ "external_id": "", "cron_schedule": "" })
        );
    }

    #[test]
    fn test_update_request_omits_unset_flags() {
        let request = update_request(Some("home.example.com".into()), None, None, None);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({ "domain_name": "home.example.com" })
        );
    }
}
