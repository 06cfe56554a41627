//! Metrics command - dashboard numbers and activity.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::{Style, style};
use iphop_client::{
    ActivityEntry, ActivityQuery, DashboardMetrics, IpChangeMetrics, ProviderStatsResponse,
    ResponseTimeMetrics, UptimeMetrics,
};
use serde::Serialize;

use super::{Context, format_timestamp, status_style, truncate};

/// Arguments for the metrics command.
#[derive(Args, Debug)]
pub struct MetricsArgs {
    #[command(subcommand)]
    pub command: MetricsCommand,
}

#[derive(Subcommand, Debug)]
pub enum MetricsCommand {
    /// Headline numbers and update timing
    Dashboard,

    /// Update reliability over 24h and 7d
    Uptime,

    /// IP change frequency over the last week
    IpChanges,

    /// Per-provider success rates
    Providers,

    /// Recent update activity
    Activity {
        /// Maximum entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

/// Dashboard view for JSON output.
#[derive(Debug, Serialize)]
struct DashboardOutput {
    #[serde(flatten)]
    metrics: DashboardMetrics,
    response_time: ResponseTimeMetrics,
}

/// Run the metrics command.
pub async fn run(args: MetricsArgs, ctx: &Context) -> Result<()> {
    let client = ctx.authenticated_client().await?;
    let metrics = client.metrics();

    match args.command {
        MetricsCommand::Dashboard => {
            let (dashboard, response_time) =
                futures::try_join!(metrics.dashboard(), metrics.response_time())?;
            if ctx.json_output {
                return super::print_json(&DashboardOutput {
                    metrics: dashboard,
                    response_time,
                });
            }
            print_dashboard(&dashboard);
            print_response_time(&response_time);
        }
        MetricsCommand::Uptime => {
            let uptime = metrics.uptime().await?;
            if ctx.json_output {
                return super::print_json(&uptime);
            }
            print_uptime(&uptime);
        }
        MetricsCommand::IpChanges => {
            let changes = metrics.ip_changes().await?;
            if ctx.json_output {
                return super::print_json(&changes);
            }
            print_ip_changes(&changes);
        }
        MetricsCommand::Providers => {
            let stats = metrics.provider_stats().await?;
            if ctx.json_output {
                return super::print_json(&stats);
            }
            print_provider_stats(&stats);
        }
        MetricsCommand::Activity { limit } => {
            let activity = metrics.activity(ActivityQuery { limit: Some(limit) }).await?;
            if ctx.json_output {
                return super::print_json(&activity);
            }
            print_activity(&activity.activity);
        }
    }

    Ok(())
}

fn heading(title: &str) {
    println!("{}", style(title).bold());
    println!("{}", Style::new().dim().apply_to("─".repeat(50)));
}

fn row(label: &str, value: impl std::fmt::Display) {
    println!("  {:<22} {}", Style::new().dim().apply_to(label), value);
}

/// Print the headline dashboard numbers.
pub fn print_dashboard(metrics: &DashboardMetrics) {
    heading("Dashboard");
    row(
        "Domains:",
        format!("{} ({} active)", metrics.total_domains, metrics.active_domains),
    );
    row("Success rate (24h):", format!("{:.1}%", metrics.success_rate_24h));
    row(
        "Updates (24h):",
        format!(
            "{} ({} failed)",
            metrics.total_updates_24h, metrics.failed_updates_24h
        ),
    );
    row("Unique IPs (24h):", metrics.unique_ips_24h);
    row(
        "Last update:",
        metrics
            .last_update_time
            .as_deref()
            .map(format_timestamp)
            .unwrap_or_else(|| "never".to_string()),
    );

    if !metrics.providers_stats.is_empty() {
        println!();
        for stats in &metrics.providers_stats {
            row(
                &format!("{}:", stats.provider_type),
                format!("{} domains ({} active)", stats.count, stats.active),
            );
        }
    }
    println!();
}

fn print_response_time(windows: &ResponseTimeMetrics) {
    if windows.is_empty() {
        return;
    }
    heading("Update Timing");
    for (window, timing) in windows {
        row(
            &format!("{}:", window),
            format!(
                "{} updates, avg {:.2}s (min {:.2}s, max {:.2}s)",
                timing.count, timing.avg_time, timing.min_time, timing.max_time
            ),
        );
    }
    println!();
}

/// Print update reliability.
pub fn print_uptime(uptime: &UptimeMetrics) {
    heading("Uptime");
    row(
        "Last 24h:",
        format!(
            "{:.2}% ({}/{})",
            uptime.uptime_24h, uptime.successful_requests_24h, uptime.total_requests_24h
        ),
    );
    row(
        "Last 7d:",
        format!(
            "{:.2}% ({}/{})",
            uptime.uptime_7d, uptime.successful_requests_7d, uptime.total_requests_7d
        ),
    );
    row("Scheduler:", &uptime.scheduler_status);
    println!();
}

/// Print IP change frequency.
pub fn print_ip_changes(changes: &IpChangeMetrics) {
    heading("IP Changes (7d)");
    row("Total:", changes.total_changes_last_week);
    row(
        "Per day:",
        format!("{:.2}", changes.average_changes_per_day),
    );
    if !changes.domains.is_empty() {
        println!();
        for domain in &changes.domains {
            row(
                &format!("{}:", truncate(&domain.domain_name, 20)),
                format!(
                    "{} changes ({:.2}/day)",
                    domain.changes_last_week, domain.changes_per_day
                ),
            );
        }
    }
    println!();
}

/// Print per-provider success rates.
pub fn print_provider_stats(stats: &ProviderStatsResponse) {
    let dim = Style::new().dim();
    heading("Provider Success (24h)");

    if stats.providers.is_empty() {
        println!("{}", dim.apply_to("No providers configured"));
        return;
    }

    for provider in &stats.providers {
        let name = if provider.is_enabled {
            style(provider.provider_name.clone())
        } else {
            style(provider.provider_name.clone()).dim()
        };
        println!(
            "  {:<24} {:<12} {:>6.1}%  {}",
            name,
            provider.provider_type,
            provider.success_rate_24h,
            dim.apply_to(format!(
                "{}/{} updates · {} domains",
                provider.successful_updates_24h, provider.updates_24h, provider.total_domains
            ))
        );
    }
    println!();
}

/// Print the activity timeline.
pub fn print_activity(entries: &[ActivityEntry]) {
    let dim = Style::new().dim();
    heading("Recent Activity");

    if entries.is_empty() {
        println!("{}", dim.apply_to("No activity yet"));
        return;
    }

    for entry in entries {
        println!(
            "{} {:<28} {:<16} {}",
            dim.apply_to(format_timestamp(&entry.timestamp)),
            truncate(&entry.domain_name, 28),
            entry.ip_address,
            status_style(&entry.status).apply_to(&entry.status)
        );
    }
}
