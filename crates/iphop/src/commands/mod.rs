//! CLI command handlers.

use std::sync::Arc;

use anyhow::{Result, bail};
use ::console::Style;
use iphop_client::{DashboardClient, Navigator, Notifier, SessionExpiryDispatcher};
use iphop_config::ClientConfig;
use serde::Serialize;

pub mod config;
pub mod console;
pub mod domains;
pub mod metrics;
pub mod providers;
pub mod setup;
pub mod status;

/// Environment variable holding the password for non-interactive logins.
pub const PASSWORD_ENV: &str = "IPHOP_PASSWORD";

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Server URL to connect to.
    pub server_url: String,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
    /// Username given on the command line.
    pub username: Option<String>,
    /// Loaded client configuration.
    pub config: ClientConfig,
}

impl Context {
    /// Build an unauthenticated client for this invocation.
    pub fn client(&self) -> Result<DashboardClient> {
        Ok(DashboardClient::builder()
            .base_url(&self.server_url)
            .timeout(self.config.timeout())
            .build()?)
    }

    /// Build a client whose unexpected 401s raise the session-expiry notice
    /// and redirect `navigator` to the login route.
    pub fn client_with_expiry(
        &self,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<DashboardClient> {
        let dispatcher = SessionExpiryDispatcher::new(notifier, navigator)
            .with_redirect_delay(self.config.expiry_redirect_delay());
        Ok(DashboardClient::builder()
            .base_url(&self.server_url)
            .timeout(self.config.timeout())
            .session_expiry(dispatcher)
            .build()?)
    }

    /// Username from the command line, else from `client.toml`.
    pub fn username(&self) -> Option<String> {
        self.username
            .clone()
            .or_else(|| self.config.username.clone())
    }

    /// Build a client and log in for a one-shot command.
    pub async fn authenticated_client(&self) -> Result<DashboardClient> {
        let Some(username) = self.username() else {
            bail!("no username: pass --username or set `username` in client.toml");
        };
        let password = read_password("Password: ")?;

        let client = self.client()?;
        client.auth().login(&username, &password).await?;
        tracing::debug!(%username, "logged in");
        if self.verbose {
            let dim = Style::new().dim();
            eprintln!("{}", dim.apply_to(format!("Logged in as {}", username)));
        }
        Ok(client)
    }
}

/// Read a password from `IPHOP_PASSWORD`, else prompt without echo.
pub fn read_password(prompt: &str) -> Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV)
        && !password.is_empty()
    {
        return Ok(password);
    }
    Ok(rpassword::prompt_password(prompt)?)
}

/// Read one line from stdin after printing `prompt`.
pub fn prompt_line(prompt: &str) -> Result<String> {
    use std::io::Write;

    print!("{}", prompt);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Ask a yes/no question; anything but `y`/`yes` is a no.
pub fn confirm(question: &str) -> Result<bool> {
    let answer = prompt_line(&format!("{} [y/N] ", question))?;
    Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// User-facing text for a failed command.
pub fn describe(err: &anyhow::Error) -> String {
    iphop_client::describe_error(err.as_ref())
}

/// Attach a toast-style title to a failed call, e.g. "Failed to create domain".
pub fn failed(title: &str, err: iphop_client::Error) -> anyhow::Error {
    anyhow::anyhow!("{}: {}", title, err.display_message())
}

/// Print a value as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Render a server timestamp for display.
///
/// The backend sends naive UTC timestamps, sometimes with fractional
/// seconds. Anything unparseable is shown as-is.
pub fn format_timestamp(raw: &str) -> String {
    match chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(ts) => ts.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => match chrono::DateTime::parse_from_rfc3339(raw) {
            Ok(ts) => ts.naive_utc().format("%Y-%m-%d %H:%M").to_string(),
            Err(_) => raw.to_string(),
        },
    }
}

/// Style for an update status such as `SUCCESS` or `FAILED`.
pub fn status_style(status: &str) -> Style {
    match status.to_ascii_uppercase().as_str() {
        "SUCCESS" => Style::new().green(),
        "FAILED" | "ERROR" => Style::new().red(),
        _ => Style::new().yellow(),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    let s = s.replace('\n', " ");
    if s.chars().count() <= max_len {
        s
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp("2025-03-01T10:04:59"), "2025-03-01 10:04");
        assert_eq!(
            format_timestamp("2025-03-01T10:04:59.123456"),
            "2025-03-01 10:04"
        );
        assert_eq!(
            format_timestamp("2025-03-01T10:04:59+02:00"),
            "2025-03-01 08:04"
        );
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer message", 10), "a much ...");
        assert_eq!(truncate("two\nlines", 20), "two lines");
    }

    #[test]
    fn test_describe_api_error_prefers_detail() {
        let err: anyhow::Error = iphop_client::Error::Api {
            status: 409,
            detail: Some("Domain already exists".into()),
            message: "Request failed with status code 409".into(),
        }
        .into();
        assert_eq!(describe(&err), "Domain already exists");
    }

    #[test]
    fn test_describe_plain_error() {
        let err = anyhow::anyhow!("no username");
        assert_eq!(describe(&err), "no username");
    }

    #[test]
    fn test_username_falls_back_to_config() {
        let mut ctx = Context {
            server_url: "http://localhost:8001".into(),
            json_output: false,
            verbose: false,
            username: None,
            config: ClientConfig {
                username: Some("ops".into()),
                ..Default::default()
            },
        };
        assert_eq!(ctx.username().as_deref(), Some("ops"));

        ctx.username = Some("admin".into());
        assert_eq!(ctx.username().as_deref(), Some("admin"));
    }
}
