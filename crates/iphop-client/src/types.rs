//! Request and response types for the ip-hop API.
//!
//! These types mirror the server's API contract. Timestamps are kept as the
//! ISO 8601 strings the server sends.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ─────────────────────────────────────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────────────────────────────────────

/// The authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: String,
    pub created_at: String,
}

/// Access token returned by the credential exchange.
///
/// The server also sets the session cookie; callers never need the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

/// First-run admin creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupRequest {
    pub username: String,
    pub password: String,
}

/// Generic `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// System
// ─────────────────────────────────────────────────────────────────────────────

/// Whether the backend has been set up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStatus {
    pub initialized: bool,
    pub version: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────────────────────────────────────

/// A configured DDNS provider account. Credentials are never returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub id: i64,
    pub name: String,
    /// Provider kind, e.g. `cloudflare`, `dynu`, `duckdns`, `noip`.
    #[serde(rename = "type")]
    pub provider_type: String,
    #[serde(default = "default_true")]
    pub is_enabled: bool,
}

/// Request to create a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProviderRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub provider_type: String,
    #[serde(default = "default_true")]
    pub is_enabled: bool,
    /// Provider credentials; encrypted at rest by the server.
    #[serde(default)]
    pub credentials: HashMap<String, serde_json::Value>,
}

/// Request to update a provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProviderRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<HashMap<String, serde_json::Value>>,
}

fn default_true() -> bool {
    true
}

// ─────────────────────────────────────────────────────────────────────────────
// Domains
// ─────────────────────────────────────────────────────────────────────────────

/// A DNS record kept up to date by a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Domain {
    pub id: i64,
    pub provider_id: i64,
    pub domain_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default)]
    pub config: HashMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_known_ip: Option<String>,
    /// `SUCCESS` or `FAILED` after the first update attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron_schedule: Option<String>,
}

/// Request to create a domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDomainRequest {
    pub domain_name: String,
    pub provider_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default)]
    pub config: HashMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron_schedule: Option<String>,
}

/// Request to update a domain.
///
/// An empty `cron_schedule` removes the schedule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDomainRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<HashMap<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron_schedule: Option<String>,
}

/// One recorded update attempt for a domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpHistory {
    pub id: i64,
    pub domain_id: i64,
    pub ip_address: String,
    pub timestamp: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Metrics
// ─────────────────────────────────────────────────────────────────────────────

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub total_domains: u64,
    pub active_domains: u64,
    pub success_rate_24h: f64,
    pub total_updates_24h: u64,
    pub failed_updates_24h: u64,
    pub unique_ips_24h: u64,
    #[serde(default)]
    pub last_update_time: Option<String>,
    #[serde(default)]
    pub providers_stats: Vec<ProviderTypeStats>,
}

/// Domain counts per provider kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderTypeStats {
    #[serde(rename = "type")]
    pub provider_type: String,
    pub count: u64,
    pub active: u64,
}

/// Update reliability over the last day and week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UptimeMetrics {
    pub uptime_24h: f64,
    pub uptime_7d: f64,
    pub total_requests_24h: u64,
    pub successful_requests_24h: u64,
    pub total_requests_7d: u64,
    pub successful_requests_7d: u64,
    pub scheduler_status: String,
}

/// IP change frequency over the last week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpChangeMetrics {
    pub total_changes_last_week: u64,
    pub average_changes_per_day: f64,
    #[serde(default)]
    pub domains: Vec<DomainIpChanges>,
}

/// IP change frequency for one domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainIpChanges {
    pub domain_id: i64,
    pub domain_name: String,
    pub changes_last_week: u64,
    pub changes_per_day: f64,
}

/// Per-provider success rates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderStatsResponse {
    pub providers: Vec<ProviderStats>,
    pub total_providers: u64,
}

/// Success statistics for one provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderStats {
    pub provider_id: i64,
    pub provider_name: String,
    pub provider_type: String,
    pub is_enabled: bool,
    pub total_domains: u64,
    pub updates_24h: u64,
    pub successful_updates_24h: u64,
    pub success_rate_24h: f64,
    #[serde(default)]
    pub last_update_time: Option<String>,
}

/// Update timing for one window (`1h`, `6h`, `24h`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseTimeWindow {
    pub count: u64,
    pub avg_time: f64,
    pub min_time: f64,
    pub max_time: f64,
}

/// Update timing keyed by window name.
pub type ResponseTimeMetrics = BTreeMap<String, ResponseTimeWindow>;

/// Recent update activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityResponse {
    pub activity: Vec<ActivityEntry>,
    pub count: u64,
}

/// One entry of the activity timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: i64,
    pub domain_id: i64,
    pub domain_name: String,
    pub ip_address: String,
    pub status: String,
    pub timestamp: String,
    #[serde(default)]
    pub message: Option<String>,
}
