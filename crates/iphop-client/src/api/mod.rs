//! API endpoint implementations.

mod auth;
mod domains;
mod metrics;
mod providers;
mod system;

pub use auth::{AuthApi, SETUP_PASSWORD_SPECIALS, validate_setup_password};
pub use domains::{DomainsApi, HistoryQuery, ListDomainsQuery};
pub use metrics::{ActivityQuery, MetricsApi};
pub use providers::{ListProvidersQuery, ProvidersApi};
pub use system::SystemApi;
