//! Setup command - creates the first admin account.

use anyhow::{Result, bail};
use clap::Args;
use console::Style;
use iphop_client::{SetupRequest, validate_setup_password};

use super::{Context, PASSWORD_ENV, prompt_line, read_password};

/// Arguments for the setup command.
#[derive(Args, Debug)]
pub struct SetupArgs {}

/// Run the setup command.
pub async fn run(_args: SetupArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;

    let status = client.system().status().await?;
    if status.initialized {
        bail!("Setup already completed. Log in with `iphop console`.");
    }

    let username = match ctx.username() {
        Some(username) => username,
        None => prompt_line("Username: ")?,
    };
    if username.is_empty() {
        bail!("Username is required");
    }

    let password = read_password("Password: ")?;
    let confirmation = if std::env::var(PASSWORD_ENV).is_ok_and(|p| !p.is_empty()) {
        password.clone()
    } else {
        rpassword::prompt_password("Confirm password: ")?
    };

    if password != confirmation {
        bail!("Passwords do not match");
    }
    if !validate_setup_password(&password) {
        bail!(
            "Password must be at least 8 characters with an uppercase letter, \
             a special character and two digits"
        );
    }

    let user = client
        .auth()
        .setup(&SetupRequest { username, password })
        .await
        .map_err(|e| super::failed("Setup failed", e))?;

    if ctx.json_output {
        return super::print_json(&user);
    }

    let green = Style::new().green();
    let dim = Style::new().dim();
    println!(
        "{} Admin account '{}' created",
        green.apply_to("✓"),
        user.username
    );
    println!("{}", dim.apply_to("Log in with `iphop console`."));

    Ok(())
}
