//! Console command - interactive dashboard session.
//!
//! The console hosts one [`AuthProvider`] over an in-memory navigator. Its
//! prompt shows the current route, protected commands go through the
//! dashboard guard, and a session that expires mid-use produces the global
//! "Session Expired" notice followed by a hard redirect to `/login`, which
//! remounts the provider.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use console::{Style, Term, style};
use iphop_client::{
    ActivityQuery, AuthContext, AuthProvider, AuthStatus, DashboardClient, GuardDecision,
    HistoryQuery, MemoryNavigator, NavigationKind, Navigator, Notice, NoticeLevel, Notifier,
    describe_error, use_auth,
};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};

use super::{Context, domains, metrics, prompt_line, providers, read_password};

/// Route for domain management in the dashboard.
const DOMAINS_PATH: &str = "/dashboard/domains";

/// Route for provider management in the dashboard.
const PROVIDERS_PATH: &str = "/dashboard/providers";

/// Arguments for the console command.
#[derive(Args, Debug)]
pub struct ConsoleArgs {
    /// Route to open the console on
    #[arg(long, default_value = "/dashboard")]
    pub route: String,
}

/// Run the console command.
pub async fn run(args: ConsoleArgs, ctx: &Context) -> Result<()> {
    let mut console = Console::new(ctx.clone(), &args.route)?;
    console.run().await
}

// ─────────────────────────────────────────────────────────────────────────────
// Notices
// ─────────────────────────────────────────────────────────────────────────────

/// Prints notices as one-line toasts.
#[derive(Debug, Default)]
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: &Notice) {
        let (icon, colour) = match notice.level {
            NoticeLevel::Error => ("✗", Style::new().red()),
            NoticeLevel::Success => ("✓", Style::new().green()),
            NoticeLevel::Info => ("•", Style::new().cyan()),
        };
        match &notice.description {
            Some(description) => println!(
                "{} {} {}",
                colour.apply_to(icon),
                style(&notice.title).bold(),
                Style::new().dim().apply_to(description)
            ),
            None => println!("{} {}", colour.apply_to(icon), style(&notice.title).bold()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConsoleCommand {
    Help,
    Quit,
    Clear,
    Status,
    Login(Option<String>),
    Logout,
    Go(String),
    Domains,
    Providers,
    History(i64),
    UpdateIp(i64),
    Metrics,
    Activity,
    Invalid(String),
}

impl ConsoleCommand {
    fn parse(line: &str) -> Self {
        let line = line.trim().trim_start_matches('/');
        let mut parts = line.split_whitespace();
        let cmd = parts.next().unwrap_or("");
        let arg = parts.next();

        let id = |name: &str| match arg.map(str::parse::<i64>) {
            Some(Ok(id)) => Ok(id),
            _ => Err(ConsoleCommand::Invalid(format!("usage: {} <domain id>", name))),
        };

        match cmd {
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            "clear" | "cls" => Self::Clear,
            "status" | "whoami" => Self::Status,
            "login" => Self::Login(arg.map(str::to_string)),
            "logout" => Self::Logout,
            "go" => match arg {
                Some(path) => Self::Go(path.to_string()),
                None => Self::Invalid("usage: go <path>".to_string()),
            },
            "domains" => Self::Domains,
            "providers" => Self::Providers,
            "history" => id("history").map_or_else(|e| e, Self::History),
            "update-ip" => id("update-ip").map_or_else(|e| e, Self::UpdateIp),
            "metrics" => Self::Metrics,
            "activity" => Self::Activity,
            other => Self::Invalid(format!("unknown command '{}' (try help)", other)),
        }
    }
}

/// Control flow for the console.
#[derive(Debug, PartialEq, Eq)]
enum ControlFlow {
    Continue,
    Exit,
}

/// Run the dashboard guard, then move to `path` when allowed.
async fn enter_protected(
    auth: &AuthContext,
    navigator: &dyn Navigator,
    path: &str,
) -> GuardDecision {
    // Commands issued while the probe is still running wait for it.
    auth.resolved().await;
    let decision = auth.guard();
    if decision == GuardDecision::Allowed && navigator.pathname() != path {
        navigator.push(path);
    }
    decision
}

// ─────────────────────────────────────────────────────────────────────────────
// Console
// ─────────────────────────────────────────────────────────────────────────────

/// Console state.
pub struct Console {
    ctx: Context,
    client: DashboardClient,
    navigator: Arc<MemoryNavigator>,
    notifier: Arc<dyn Notifier>,
    provider: AuthProvider,
    editor: Editor<(), DefaultHistory>,
    term: Term,
    seen_navigations: usize,
}

impl Console {
    /// Create a console starting on `route`. Mounts the provider, which
    /// starts the session probe.
    pub fn new(ctx: Context, route: &str) -> Result<Self> {
        let navigator = Arc::new(MemoryNavigator::new(route));
        let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);
        let client = ctx.client_with_expiry(notifier.clone(), navigator.clone())?;
        let provider = AuthProvider::mount(client.clone(), navigator.clone());

        let config = Config::builder()
            .history_ignore_space(true)
            .auto_add_history(true)
            .build();
        let editor = Editor::with_config(config)?;

        Ok(Self {
            ctx,
            client,
            navigator,
            notifier,
            provider,
            editor,
            term: Term::stdout(),
            seen_navigations: 0,
        })
    }

    /// Run the console loop.
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome();
        self.print_dim("Checking session...");
        let state = self.provider.context().resolved().await;
        self.print_session(state.status());

        loop {
            self.sync_navigation().await;
            let prompt = self.format_prompt();

            match self.editor.readline(&prompt) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let command = ConsoleCommand::parse(&line);
                    if command == ConsoleCommand::Clear {
                        self.term.clear_screen()?;
                        continue;
                    }

                    match self.provider.scope(self.handle_command(command)).await {
                        Ok(ControlFlow::Continue) => continue,
                        Ok(ControlFlow::Exit) => break,
                        Err(e) => {
                            self.print_error(&super::describe(&e));
                            continue;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!();
                    self.print_dim("(Interrupted - type quit to exit)");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(e) => {
                    self.print_error(&format!("Input error: {}", e));
                    break;
                }
            }
        }

        self.print_dim("Goodbye!");
        Ok(())
    }

    /// Handle one command inside the provider scope.
    async fn handle_command(&self, command: ConsoleCommand) -> Result<ControlFlow> {
        let auth = use_auth();

        match command {
            ConsoleCommand::Quit => return Ok(ControlFlow::Exit),
            ConsoleCommand::Help => self.print_help(),
            ConsoleCommand::Clear => {}
            ConsoleCommand::Invalid(message) => self.print_dim(&message),
            ConsoleCommand::Status => {
                let dim = Style::new().dim();
                println!("  {} {}", dim.apply_to("Server:"), self.ctx.server_url);
                println!("  {} {}", dim.apply_to("Route:"), self.navigator.pathname());
                println!("  {} {:?}", dim.apply_to("Session:"), auth.status());
                if auth.is_authenticated() {
                    match auth.client().auth().me().await {
                        Ok(user) => println!(
                            "  {} {} ({})",
                            dim.apply_to("User:"),
                            user.username,
                            user.role
                        ),
                        Err(e) => self.print_error(&describe_error(&e)),
                    }
                }
            }
            ConsoleCommand::Login(username) => self.login(&auth, username).await?,
            ConsoleCommand::Logout => {
                auth.logout().await;
                self.print_dim("Logged out");
            }
            ConsoleCommand::Go(path) => {
                self.navigator.push(&path);
                if path.starts_with("/dashboard") {
                    enter_protected(&auth, self.navigator.as_ref(), &path).await;
                }
            }
            ConsoleCommand::Domains => {
                if self.enter(&auth, DOMAINS_PATH).await {
                    match auth.client().domains().list().await {
                        Ok(list) => domains::print_domains(&list),
                        Err(e) => self.print_error(&describe_error(&e)),
                    }
                }
            }
            ConsoleCommand::Providers => {
                if self.enter(&auth, PROVIDERS_PATH).await {
                    match auth.client().providers().list().await {
                        Ok(list) => providers::print_providers(&list),
                        Err(e) => self.print_error(&describe_error(&e)),
                    }
                }
            }
            ConsoleCommand::History(id) => {
                if self.enter(&auth, DOMAINS_PATH).await {
                    let query = HistoryQuery { limit: None };
                    match auth.client().domains().history(id, query).await {
                        Ok(history) => domains::print_history(id, &history),
                        Err(e) => self.print_error(&describe_error(&e)),
                    }
                }
            }
            ConsoleCommand::UpdateIp(id) => {
                if self.enter(&auth, DOMAINS_PATH).await {
                    match auth.client().domains().update_ip(id).await {
                        Ok(_) => self.notifier.notify(&Notice::success(
                            "IP Updated",
                            "Domain IP has been updated successfully",
                        )),
                        Err(e) => self
                            .notifier
                            .notify(&Notice::error("Failed to update IP", describe_error(&e))),
                    }
                }
            }
            ConsoleCommand::Metrics => {
                if self.enter(&auth, "/dashboard").await {
                    match auth.client().metrics().dashboard().await {
                        Ok(dashboard) => metrics::print_dashboard(&dashboard),
                        Err(e) => self.print_error(&describe_error(&e)),
                    }
                }
            }
            ConsoleCommand::Activity => {
                if self.enter(&auth, "/dashboard").await {
                    let query = ActivityQuery { limit: Some(10) };
                    match auth.client().metrics().activity(query).await {
                        Ok(activity) => metrics::print_activity(&activity.activity),
                        Err(e) => self.print_error(&describe_error(&e)),
                    }
                }
            }
        }

        Ok(ControlFlow::Continue)
    }

    /// Exchange credentials, then record the login in the context.
    async fn login(&self, auth: &AuthContext, username: Option<String>) -> Result<()> {
        let username = match username.or_else(|| self.ctx.username()) {
            Some(username) => username,
            None => prompt_line("Username: ")?,
        };
        let password = read_password("Password: ")?;

        match auth.client().auth().login(&username, &password).await {
            Ok(_) => {
                auth.login();
                self.notifier
                    .notify(&Notice::success("Logged in", format!("Welcome, {}", username)));
            }
            // Shown inline like the login form's error, not as a toast.
            Err(e) => self.print_error(&describe_error(&e)),
        }
        Ok(())
    }

    async fn enter(&self, auth: &AuthContext, path: &str) -> bool {
        match enter_protected(auth, self.navigator.as_ref(), path).await {
            GuardDecision::Allowed => true,
            GuardDecision::Pending => {
                self.print_dim("Session check still running");
                false
            }
            GuardDecision::Redirected => {
                self.print_dim("Not logged in (type login)");
                false
            }
        }
    }

    /// Report navigations made since the last prompt. A hard navigation
    /// reloads the dashboard: the provider is remounted and probes again.
    async fn sync_navigation(&mut self) {
        let history = self.navigator.history();
        let fresh = history.get(self.seen_navigations..).unwrap_or_default();
        self.seen_navigations = history.len();

        let mut reload = false;
        for navigation in fresh {
            tracing::debug!(path = %navigation.path, kind = ?navigation.kind, "navigated");
            if navigation.kind == NavigationKind::Assign {
                reload = true;
            }
        }

        if reload {
            self.print_dim(&format!("Reloading at {}", self.navigator.pathname()));
            self.provider = AuthProvider::mount(self.client.clone(), self.navigator.clone());
            let state = self.provider.context().resolved().await;
            self.print_session(state.status());
            self.seen_navigations = self.navigator.history().len();
        }
    }

    fn format_prompt(&self) -> String {
        format!(
            "{} {}> ",
            style("iphop").cyan(),
            style(self.navigator.pathname()).dim()
        )
    }

    fn print_welcome(&self) {
        let dim = Style::new().dim();
        println!();
        println!("{}", style("ip-hop Console").bold().cyan());
        println!("{}", dim.apply_to("─".repeat(40)));
        println!("{}", dim.apply_to(format!("Server: {}", self.ctx.server_url)));
        println!("{}", dim.apply_to("Type help for commands, Ctrl+D to exit."));
        println!();
    }

    fn print_session(&self, status: AuthStatus) {
        match status {
            AuthStatus::Authenticated => {
                println!("{}", Style::new().green().apply_to("● session active"))
            }
            AuthStatus::Unauthenticated => {
                self.print_dim("No active session (type login)")
            }
            AuthStatus::Loading => self.print_dim("Session check still running"),
        }
    }

    fn print_help(&self) {
        let dim = Style::new().dim();
        println!();
        println!("{}", style("Available Commands").bold());
        println!("{}", dim.apply_to("─".repeat(40)));
        println!("  {}  - Log in", style("login [user]").cyan());
        println!("  {}  - End the session", style("logout").cyan());
        println!("  {}  - Session and route", style("status").cyan());
        println!("  {}  - Navigate", style("go <path>").cyan());
        println!("  {}  - List domains", style("domains").cyan());
        println!("  {}  - List providers", style("providers").cyan());
        println!("  {}  - Domain update history", style("history <id>").cyan());
        println!("  {}  - Push current IP now", style("update-ip <id>").cyan());
        println!("  {}  - Dashboard numbers", style("metrics").cyan());
        println!("  {}  - Recent activity", style("activity").cyan());
        println!("  {}  - Clear the screen", style("clear").cyan());
        println!("  {}  - Exit", style("quit, q").cyan());
        println!();
    }

    fn print_dim(&self, msg: &str) {
        let dim = Style::new().dim();
        println!("{}", dim.apply_to(msg));
    }

    fn print_error(&self, msg: &str) {
        let red = Style::new().red();
        println!("{} {}", red.apply_to("Error:"), msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_commands() {
        assert_eq!(ConsoleCommand::parse("help"), ConsoleCommand::Help);
        assert_eq!(ConsoleCommand::parse("/quit"), ConsoleCommand::Quit);
        assert_eq!(
            ConsoleCommand::parse("login admin"),
            ConsoleCommand::Login(Some("admin".into()))
        );
        assert_eq!(ConsoleCommand::parse("login"), ConsoleCommand::Login(None));
        assert_eq!(
            ConsoleCommand::parse("  go /setup "),
            ConsoleCommand::Go("/setup".into())
        );
        assert_eq!(ConsoleCommand::parse("history 4"), ConsoleCommand::History(4));
        assert_eq!(ConsoleCommand::parse("update-ip 2"), ConsoleCommand::UpdateIp(2));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            ConsoleCommand::parse("history"),
            ConsoleCommand::Invalid(_)
        ));
        assert!(matches!(
            ConsoleCommand::parse("update-ip abc"),
            ConsoleCommand::Invalid(_)
        ));
        assert!(matches!(
            ConsoleCommand::parse("reboot"),
            ConsoleCommand::Invalid(_)
        ));
    }

    async fn mounted(status: u16) -> (MockServer, AuthProvider, Arc<MemoryNavigator>) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/auth/me"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let client = DashboardClient::builder()
            .base_url(server.uri())
            .build()
            .unwrap();
        let navigator = Arc::new(MemoryNavigator::new("/dashboard"));
        let provider = AuthProvider::mount(client, navigator.clone());
        (server, provider, navigator)
    }

    #[tokio::test]
    async fn test_enter_protected_moves_to_section() {
        let (_server, provider, navigator) = mounted(200).await;
        let auth = provider.context();

        let decision = enter_protected(&auth, navigator.as_ref(), DOMAINS_PATH).await;
        assert_eq!(decision, GuardDecision::Allowed);
        assert_eq!(navigator.pathname(), DOMAINS_PATH);

        // Already there: no second push.
        enter_protected(&auth, navigator.as_ref(), DOMAINS_PATH).await;
        assert_eq!(navigator.count_to(DOMAINS_PATH), 1);
    }

    #[tokio::test]
    async fn test_enter_protected_redirects_without_session() {
        let (_server, provider, navigator) = mounted(401).await;
        let auth = provider.context();

        let decision = enter_protected(&auth, navigator.as_ref(), PROVIDERS_PATH).await;
        assert_eq!(decision, GuardDecision::Redirected);
        assert_eq!(navigator.pathname(), "/login");
        assert_eq!(navigator.count_to(PROVIDERS_PATH), 0);
    }
}
