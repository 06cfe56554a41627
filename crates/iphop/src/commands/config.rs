//! Config command - client configuration management.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use console::{Style, style};
use iphop_config::ClientConfig;

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective client configuration
    Show,

    /// Print the path of client.toml
    Path,

    /// Set a configuration value
    Set {
        /// Key: server, username, timeout_secs, expiry_redirect_delay_ms
        key: String,

        /// New value (empty clears username)
        value: String,
    },
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    let dim = Style::new().dim();

    match args.command {
        ConfigCommand::Show => {
            if ctx.json_output {
                return super::print_json(&ctx.config);
            }
            println!("{}", style("Client Configuration").bold());
            println!("{}", dim.apply_to("─".repeat(50)));
            print!("{}", ctx.config.to_toml()?);
            if ctx.server_url != ctx.config.server {
                println!();
                println!(
                    "{}",
                    dim.apply_to(format!("server overridden by flag/env: {}", ctx.server_url))
                );
            }
        }
        ConfigCommand::Path => match iphop_config::client_config_path() {
            Some(path) => println!("{}", path.display()),
            None => bail!("could not determine config directory"),
        },
        ConfigCommand::Set { key, value } => {
            let mut config = ctx.config.clone();
            apply_setting(&mut config, &key, &value)?;
            iphop_config::save_client_config(&config)?;
            println!(
                "{} {} = {}",
                Style::new().green().apply_to("✓"),
                key,
                dim.apply_to(&value)
            );
        }
    }

    Ok(())
}

fn apply_setting(config: &mut ClientConfig, key: &str, value: &str) -> Result<()> {
    match key {
        "server" => config.server = value.to_string(),
        "username" => {
            config.username = Some(value.to_string()).filter(|v| !v.is_empty());
        }
        "timeout_secs" => config.timeout_secs = value.parse()?,
        "expiry_redirect_delay_ms" => config.expiry_redirect_delay_ms = value.parse()?,
        other => bail!("unknown config key '{}'", other),
    }
    config.validate()?;
    Ok(())
}
