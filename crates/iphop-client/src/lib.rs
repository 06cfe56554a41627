//! HTTP client and session lifecycle for the ip-hop DDNS dashboard API.
//!
//! This crate provides the pieces a dashboard front end is built on:
//!
//! - [`DashboardClient`]: the single configured transport. Cookie-based
//!   session, JSON by default, and a response classifier that raises the
//!   session-expiry side channel on unexpected 401s.
//! - [`error_message`] / [`describe_error`]: turn any failure into text
//!   that can be shown to the user.
//! - [`AuthProvider`] / [`AuthContext`]: the authentication state machine
//!   (`loading` → `authenticated` | `unauthenticated`) with login, logout
//!   and route-aware redirects.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use iphop_client::{
//!     AuthProvider, DashboardClient, MemoryNavigator, SessionExpiryDispatcher,
//!     TracingNotifier,
//! };
//!
//! # async fn example() -> iphop_client::Result<()> {
//! let navigator = Arc::new(MemoryNavigator::new("/dashboard"));
//! let client = DashboardClient::builder()
//!     .base_url("http://localhost:8001")
//!     .session_expiry(SessionExpiryDispatcher::new(
//!         Arc::new(TracingNotifier),
//!         navigator.clone(),
//!     ))
//!     .build()?;
//!
//! let provider = AuthProvider::mount(client.clone(), navigator);
//! let auth = provider.context();
//! if !auth.resolved().await.is_authenticated {
//!     client.auth().login("admin", "Secret!12").await?;
//!     auth.login();
//! }
//!
//! for domain in client.domains().list().await? {
//!     println!("{} -> {:?}", domain.domain_name, domain.last_known_ip);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod interceptor;
pub mod navigation;
pub mod notify;
pub mod session;
pub mod types;

pub use client::{API_PREFIX, ClientBuilder, DashboardClient};
pub use error::{
    ApiError, Error, GENERIC_ERROR_MESSAGE, Result, UNKNOWN_ERROR_MESSAGE, describe_error,
    error_message, is_transport_error,
};
pub use interceptor::{
    DEFAULT_EXPIRY_REDIRECT_DELAY, PROBE_PATH, ResponseClass, SessionExpiryDispatcher, classify,
};
pub use navigation::{MemoryNavigator, Navigation, NavigationKind, Navigator, Route};
pub use notify::{MemoryNotifier, Notice, NoticeLevel, Notifier, TracingNotifier};
pub use session::{
    AuthContext, AuthProvider, AuthState, AuthStatus, ContextError, GuardDecision,
    MISSING_PROVIDER_MESSAGE, try_use_auth, use_auth,
};
pub use types::*;

// Re-export API types that are commonly used with query methods
pub use api::{
    ActivityQuery, HistoryQuery, ListDomainsQuery, ListProvidersQuery, validate_setup_password,
};
