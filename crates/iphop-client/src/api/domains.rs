//! Domains API.

use crate::client::DashboardClient;
use crate::error::Result;
use crate::types::{CreateDomainRequest, Domain, IpHistory, MessageResponse, UpdateDomainRequest};

/// Query parameters for listing domains.
#[derive(Debug, Default, serde::Serialize)]
pub struct ListDomainsQuery {
    /// Number of domains to skip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<usize>,
    /// Maximum number of domains to return (server default 100).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// Query parameters for a domain's update history.
#[derive(Debug, Default, serde::Serialize)]
pub struct HistoryQuery {
    /// Maximum number of entries (server default 20).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// Domains API client.
pub struct DomainsApi {
    client: DashboardClient,
}

impl DomainsApi {
    pub(crate) fn new(client: DashboardClient) -> Self {
        Self { client }
    }

    /// List all domains.
    pub async fn list(&self) -> Result<Vec<Domain>> {
        self.client.get("domains").await
    }

    /// List domains with query parameters.
    pub async fn list_with_query(&self, query: ListDomainsQuery) -> Result<Vec<Domain>> {
        self.client.get_with_query("domains", &query).await
    }

    /// Create a new domain.
    pub async fn create(&self, request: &CreateDomainRequest) -> Result<Domain> {
        self.client.post("domains", request).await
    }

    /// Update a domain.
    pub async fn update(&self, id: i64, request: &UpdateDomainRequest) -> Result<Domain> {
        self.client.put(&format!("domains/{}", id), request).await
    }

    /// Delete a domain.
    pub async fn delete(&self, id: i64) -> Result<MessageResponse> {
        self.client.delete(&format!("domains/{}", id)).await
    }

    /// Most recent update attempts for a domain, newest first.
    pub async fn history(&self, id: i64, query: HistoryQuery) -> Result<Vec<IpHistory>> {
        self.client
            .get_with_query(&format!("domains/{}/history", id), &query)
            .await
    }

    /// Push the current public IP to the provider now.
    pub async fn update_ip(&self, id: i64) -> Result<MessageResponse> {
        self.client
            .post_empty(&format!("domains/{}/update_ip", id))
            .await
    }
}
