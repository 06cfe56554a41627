//! Status command - shows server reachability and setup state.

use anyhow::Result;
use clap::Args;
use console::{Style, style};
use serde::Serialize;

use super::Context;

/// Arguments for the status command.
#[derive(Args, Debug)]
pub struct StatusArgs {}

/// Status response for JSON output.
#[derive(Debug, Serialize)]
struct StatusOutput {
    running: bool,
    initialized: Option<bool>,
    version: Option<String>,
    server_url: String,
}

/// Run the status command.
pub async fn run(_args: StatusArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let dim = Style::new().dim();

    match client.system().status().await {
        Ok(status) => {
            if ctx.json_output {
                return super::print_json(&StatusOutput {
                    running: true,
                    initialized: Some(status.initialized),
                    version: Some(status.version),
                    server_url: ctx.server_url.clone(),
                });
            }

            let green = Style::new().green();
            let yellow = Style::new().yellow();

            println!();
            println!("{}", style("ip-hop Server Status").bold());
            println!("{}", dim.apply_to("─".repeat(40)));
            println!();
            println!(
                "  {} {}",
                dim.apply_to("Status:"),
                green.apply_to("● running")
            );
            println!("  {} {}", dim.apply_to("Version:"), status.version);
            println!("  {} {}", dim.apply_to("Server:"), ctx.server_url);
            if status.initialized {
                println!("  {} {}", dim.apply_to("Setup:"), green.apply_to("done"));
            } else {
                println!(
                    "  {} {}",
                    dim.apply_to("Setup:"),
                    yellow.apply_to("pending (run `iphop setup`)")
                );
            }
            println!();
        }
        Err(e) => {
            tracing::debug!(error = %e, "status check failed");
            if ctx.json_output {
                return super::print_json(&StatusOutput {
                    running: false,
                    initialized: None,
                    version: None,
                    server_url: ctx.server_url.clone(),
                });
            }

            let red = Style::new().red();
            println!();
            println!("{}", style("ip-hop Server Status").bold());
            println!("{}", dim.apply_to("─".repeat(40)));
            println!();
            println!(
                "  {} {}",
                dim.apply_to("Status:"),
                red.apply_to("● unreachable")
            );
            println!("  {} {}", dim.apply_to("Server:"), ctx.server_url);
            println!("  {} {}", dim.apply_to("Reason:"), e.display_message());
            println!();
        }
    }

    Ok(())
}
