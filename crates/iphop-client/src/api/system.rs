//! System API.

use crate::client::DashboardClient;
use crate::error::Result;
use crate::types::SystemStatus;

/// System API client.
///
/// The status endpoint does not require a session.
pub struct SystemApi {
    client: DashboardClient,
}

impl SystemApi {
    pub(crate) fn new(client: DashboardClient) -> Self {
        Self { client }
    }

    /// Check whether the backend has been set up.
    pub async fn status(&self) -> Result<SystemStatus> {
        self.client.get("system/status").await
    }

    /// Simple connectivity check - returns true if the server answers.
    pub async fn is_reachable(&self) -> bool {
        self.status().await.is_ok()
    }
}
