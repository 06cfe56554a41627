//! Authentication context.
//!
//! An [`AuthProvider`] is mounted once per dashboard instance. Mounting puts
//! the state into `loading` and issues a single probe (`GET auth/me`):
//!
//! - probe succeeds: `authenticated`, no navigation
//! - probe fails: `unauthenticated`, and a push to `/login` unless the
//!   current path is already a public entry point
//!
//! Dependents read the state through an [`AuthContext`] handle, either held
//! directly or looked up with [`use_auth`] inside [`AuthProvider::scope`].
//! State changes are published on a `watch` channel so views can wait for
//! the probe before rendering anything.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::futures::TaskLocalFuture;

use crate::client::DashboardClient;
use crate::navigation::{Navigator, Route, is_public_path};

/// Panic message of [`use_auth`] outside a provider scope.
pub const MISSING_PROVIDER_MESSAGE: &str = "use_auth must be used within an AuthProvider";

tokio::task_local! {
    static CURRENT_AUTH: AuthContext;
}

/// Error looking up the ambient authentication context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("use_auth must be used within an AuthProvider")]
    MissingProvider,
}

/// Observable authentication state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthState {
    pub is_authenticated: bool,
    pub is_loading: bool,
}

impl AuthState {
    /// State of a freshly mounted provider.
    pub const LOADING: Self = Self {
        is_authenticated: false,
        is_loading: true,
    };

    pub fn status(&self) -> AuthStatus {
        if self.is_loading {
            AuthStatus::Loading
        } else if self.is_authenticated {
            AuthStatus::Authenticated
        } else {
            AuthStatus::Unauthenticated
        }
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::LOADING
    }
}

/// The three states a dependent view distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Loading,
    Authenticated,
    Unauthenticated,
}

/// Decision of the protected-area guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Probe still in flight; render nothing yet.
    Pending,
    /// Session present; render the protected view.
    Allowed,
    /// No session; a push to `/login` was issued.
    Redirected,
}

struct Shared {
    state: watch::Sender<AuthState>,
    client: DashboardClient,
    navigator: Arc<dyn Navigator>,
    mounted: AtomicBool,
}

impl Shared {
    fn finish_probe(&self, authenticated: bool) {
        if !self.mounted.load(Ordering::Acquire) {
            tracing::debug!("auth provider unmounted before probe completed");
            return;
        }

        if !authenticated {
            let path = self.navigator.pathname();
            if !is_public_path(&path) {
                tracing::info!(from = %path, "no active session, redirecting to login");
                self.navigator.push(Route::Login.path());
            }
        }

        self.state.send_modify(|state| {
            state.is_authenticated = authenticated;
            state.is_loading = false;
        });
    }
}

/// Owner of the authentication state for one dashboard instance.
///
/// Dropping the provider unmounts it: a probe that completes afterwards
/// leaves the state untouched.
pub struct AuthProvider {
    shared: Arc<Shared>,
}

impl AuthProvider {
    /// Mount the provider and start the probe.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn mount(client: DashboardClient, navigator: Arc<dyn Navigator>) -> Self {
        let (state, _) = watch::channel(AuthState::LOADING);
        let shared = Arc::new(Shared {
            state,
            client: client.clone(),
            navigator,
            mounted: AtomicBool::new(true),
        });

        let weak = Arc::downgrade(&shared);
        tokio::spawn(async move {
            let outcome = client.auth().probe().await;
            if let Err(err) = &outcome {
                tracing::debug!(error = %err, "auth probe failed");
            }
            match weak.upgrade() {
                Some(shared) => shared.finish_probe(outcome.is_ok()),
                None => tracing::debug!("auth provider dropped before probe completed"),
            }
        });

        Self { shared }
    }

    /// Handle to the context this provider owns.
    pub fn context(&self) -> AuthContext {
        AuthContext {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Run `future` with this provider's context available to [`use_auth`].
    ///
    /// Tasks spawned from inside the future do not inherit the scope.
    pub fn scope<F>(&self, future: F) -> TaskLocalFuture<AuthContext, F>
    where
        F: Future,
    {
        CURRENT_AUTH.scope(self.context(), future)
    }
}

impl Drop for AuthProvider {
    fn drop(&mut self) {
        self.shared.mounted.store(false, Ordering::Release);
    }
}

/// Handle to the authentication state and its actions.
#[derive(Clone)]
pub struct AuthContext {
    shared: Arc<Shared>,
}

impl AuthContext {
    /// Current state snapshot.
    pub fn state(&self) -> AuthState {
        *self.shared.state.borrow()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.state().is_loading
    }

    pub fn status(&self) -> AuthStatus {
        self.state().status()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.shared.state.subscribe()
    }

    /// Wait until the probe has completed and return the resulting state.
    ///
    /// Never resolves if the provider was unmounted before its probe
    /// finished.
    pub async fn resolved(&self) -> AuthState {
        let mut rx = self.subscribe();
        match rx.wait_for(|state| !state.is_loading).await {
            Ok(state) => *state,
            // The sender lives in `shared`, which `self` keeps alive.
            Err(_) => self.state(),
        }
    }

    /// Record a successful credential exchange and go to the dashboard.
    ///
    /// Call only after [`AuthApi::login`](crate::api::AuthApi::login) has
    /// succeeded; the session cookie is already in place by then.
    pub fn login(&self) {
        self.shared
            .state
            .send_modify(|state| state.is_authenticated = true);
        self.shared.navigator.push(Route::Dashboard.path());
    }

    /// End the session.
    ///
    /// The server-side logout is best effort: its failure is logged and
    /// otherwise ignored. The state always ends up `unauthenticated` with a
    /// push to `/login`, however many times this is called.
    pub async fn logout(&self) {
        if let Err(err) = self.shared.client.auth().logout().await {
            tracing::debug!(error = %err, "logout request failed");
        }
        self.shared
            .state
            .send_modify(|state| state.is_authenticated = false);
        self.shared.navigator.push(Route::Login.path());
    }

    /// Gate a protected view on the current state.
    pub fn guard(&self) -> GuardDecision {
        match self.status() {
            AuthStatus::Loading => GuardDecision::Pending,
            AuthStatus::Authenticated => GuardDecision::Allowed,
            AuthStatus::Unauthenticated => {
                self.shared.navigator.push(Route::Login.path());
                GuardDecision::Redirected
            }
        }
    }

    /// Client the context was mounted with.
    pub fn client(&self) -> &DashboardClient {
        &self.shared.client
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// The context of the enclosing [`AuthProvider::scope`].
///
/// # Panics
///
/// Panics with [`MISSING_PROVIDER_MESSAGE`] when called outside a provider
/// scope; that is always a wiring bug.
pub fn use_auth() -> AuthContext {
    match try_use_auth() {
        Ok(ctx) => ctx,
        Err(err) => panic!("{}", err),
    }
}

/// Non-panicking form of [`use_auth`].
pub fn try_use_auth() -> Result<AuthContext, ContextError> {
    CURRENT_AUTH
        .try_with(AuthContext::clone)
        .map_err(|_| ContextError::MissingProvider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interceptor::SessionExpiryDispatcher;
    use crate::navigation::{MemoryNavigator, Navigation, NavigationKind};
    use crate::notify::MemoryNotifier;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> DashboardClient {
        DashboardClient::builder()
            .base_url(server.uri())
            .build()
            .unwrap()
    }

    async fn probe_responds(server: &MockServer, status: u16) {
        Mock::given(method("GET"))
            .and(path("/api/v1/auth/me"))
            .respond_with(
                ResponseTemplate::new(status)
                    .set_body_json(serde_json::json!({ "username": "test" })),
            )
            .expect(1)
            .mount(server)
            .await;
    }

    fn push(path: &str) -> Navigation {
        Navigation {
            kind: NavigationKind::Push,
            path: path.to_string(),
        }
    }

    #[test]
    fn test_state_status() {
        assert_eq!(AuthState::default(), AuthState::LOADING);
        assert_eq!(AuthState::LOADING.status(), AuthStatus::Loading);
        let authed = AuthState {
            is_authenticated: true,
            is_loading: false,
        };
        assert_eq!(authed.status(), AuthStatus::Authenticated);
        let anon = AuthState {
            is_authenticated: false,
            is_loading: false,
        };
        assert_eq!(anon.status(), AuthStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn test_probe_success_authenticates_without_redirect() {
        let server = MockServer::start().await;
        probe_responds(&server, 200).await;
        let navigator = Arc::new(MemoryNavigator::new("/dashboard"));

        let provider = AuthProvider::mount(client(&server), navigator.clone());
        let mut rx = provider.context().subscribe();
        assert_eq!(*rx.borrow_and_update(), AuthState::LOADING);

        rx.changed().await.unwrap();
        let state = *rx.borrow_and_update();
        assert!(state.is_authenticated);
        assert!(!state.is_loading);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!rx.has_changed().unwrap());
        assert!(navigator.history().is_empty());
    }

    #[tokio::test]
    async fn test_probe_failure_redirects_from_protected_route() {
        let server = MockServer::start().await;
        probe_responds(&server, 401).await;
        let navigator = Arc::new(MemoryNavigator::new("/dashboard"));

        let provider = AuthProvider::mount(client(&server), navigator.clone());
        let state = provider.context().resolved().await;

        assert_eq!(state.status(), AuthStatus::Unauthenticated);
        assert_eq!(navigator.history(), vec![push("/login")]);
    }

    #[tokio::test]
    async fn test_probe_failure_on_public_routes_does_not_redirect() {
        for start in ["/login", "/setup"] {
            let server = MockServer::start().await;
            probe_responds(&server, 401).await;
            let navigator = Arc::new(MemoryNavigator::new(start));

            let provider = AuthProvider::mount(client(&server), navigator.clone());
            let state = provider.context().resolved().await;

            assert_eq!(state.status(), AuthStatus::Unauthenticated);
            assert!(navigator.history().is_empty(), "redirected from {}", start);
        }
    }

    #[tokio::test]
    async fn test_probe_network_failure_counts_as_unauthenticated() {
        let client = DashboardClient::builder()
            .base_url("http://127.0.0.1:1")
            .build()
            .unwrap();
        let navigator = Arc::new(MemoryNavigator::new("/dashboard/domains"));

        let provider = AuthProvider::mount(client, navigator.clone());
        let state = provider.context().resolved().await;

        assert!(!state.is_authenticated);
        assert_eq!(navigator.count_to("/login"), 1);
    }

    #[tokio::test]
    async fn test_probe_401_does_not_raise_session_expiry() {
        let server = MockServer::start().await;
        probe_responds(&server, 401).await;
        let notifier = Arc::new(MemoryNotifier::new());
        let navigator = Arc::new(MemoryNavigator::new("/login"));
        let client = DashboardClient::builder()
            .base_url(server.uri())
            .session_expiry(
                SessionExpiryDispatcher::new(notifier.clone(), navigator.clone())
                    .with_redirect_delay(Duration::from_millis(10)),
            )
            .build()
            .unwrap();

        let provider = AuthProvider::mount(client, navigator.clone());
        provider.context().resolved().await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(notifier.notices().is_empty());
        assert!(navigator.history().is_empty());
    }

    #[tokio::test]
    async fn test_unmount_before_probe_completes_is_noop() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/auth/me"))
            .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(200)))
            .mount(&server)
            .await;
        let navigator = Arc::new(MemoryNavigator::new("/dashboard"));

        let provider = AuthProvider::mount(client(&server), navigator.clone());
        let ctx = provider.context();
        drop(provider);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(ctx.state(), AuthState::LOADING);
        assert!(navigator.history().is_empty());
    }

    #[tokio::test]
    async fn test_login_sets_authenticated_and_goes_to_dashboard() {
        let server = MockServer::start().await;
        probe_responds(&server, 401).await;
        let navigator = Arc::new(MemoryNavigator::new("/login"));

        let provider = AuthProvider::mount(client(&server), navigator.clone());
        let ctx = provider.context();
        ctx.resolved().await;

        ctx.login();
        assert!(ctx.is_authenticated());
        assert_eq!(navigator.history(), vec![push("/dashboard")]);
    }

    #[tokio::test]
    async fn test_logout_calls_backend_and_redirects() {
        let server = MockServer::start().await;
        probe_responds(&server, 200).await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/logout"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "message": "Logged out" })),
            )
            .expect(1)
            .mount(&server)
            .await;
        let navigator = Arc::new(MemoryNavigator::new("/dashboard"));

        let provider = AuthProvider::mount(client(&server), navigator.clone());
        let ctx = provider.context();
        assert!(ctx.resolved().await.is_authenticated);

        ctx.logout().await;
        assert_eq!(ctx.status(), AuthStatus::Unauthenticated);
        assert_eq!(navigator.history(), vec![push("/login")]);
    }

    #[tokio::test]
    async fn test_logout_failure_is_swallowed() {
        let server = MockServer::start().await;
        probe_responds(&server, 200).await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/logout"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let navigator = Arc::new(MemoryNavigator::new("/dashboard"));

        let provider = AuthProvider::mount(client(&server), navigator.clone());
        let ctx = provider.context();
        ctx.resolved().await;

        ctx.logout().await;
        assert!(!ctx.is_authenticated());
        assert_eq!(navigator.pathname(), "/login");
    }

    #[tokio::test]
    async fn test_repeated_logout_is_idempotent() {
        let server = MockServer::start().await;
        probe_responds(&server, 200).await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/logout"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "message": "Logged out" })),
            )
            .expect(2)
            .mount(&server)
            .await;
        let navigator = Arc::new(MemoryNavigator::new("/dashboard"));

        let provider = AuthProvider::mount(client(&server), navigator.clone());
        let ctx = provider.context();
        ctx.resolved().await;

        tokio::join!(ctx.logout(), ctx.logout());
        assert_eq!(ctx.status(), AuthStatus::Unauthenticated);
        assert!(navigator.history().iter().all(|n| n.path == "/login"));
        assert_eq!(navigator.pathname(), "/login");
    }

    #[tokio::test]
    async fn test_guard() {
        let server = MockServer::start().await;
        probe_responds(&server, 401).await;
        let navigator = Arc::new(MemoryNavigator::new("/login"));

        let provider = AuthProvider::mount(client(&server), navigator.clone());
        let ctx = provider.context();
        assert_eq!(ctx.guard(), GuardDecision::Pending);

        ctx.resolved().await;
        navigator.push("/dashboard/providers");
        assert_eq!(ctx.guard(), GuardDecision::Redirected);
        assert_eq!(navigator.pathname(), "/login");

        ctx.login();
        assert_eq!(ctx.guard(), GuardDecision::Allowed);
    }

    #[tokio::test]
    async fn test_scope_provides_context() {
        let server = MockServer::start().await;
        probe_responds(&server, 200).await;
        let navigator = Arc::new(MemoryNavigator::new("/dashboard"));
        let provider = AuthProvider::mount(client(&server), navigator);

        let state = provider
            .scope(async {
                let ctx = use_auth();
                ctx.resolved().await
            })
            .await;
        assert!(state.is_authenticated);
        assert_eq!(try_use_auth().unwrap_err(), ContextError::MissingProvider);
    }

    #[test]
    #[should_panic(expected = "use_auth must be used within an AuthProvider")]
    fn test_use_auth_outside_provider_panics() {
        let _ = use_auth();
    }

    #[test]
    fn test_missing_provider_message() {
        assert_eq!(
            ContextError::MissingProvider.to_string(),
            MISSING_PROVIDER_MESSAGE
        );
    }
}
