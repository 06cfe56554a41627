//! Providers API.

use crate::client::DashboardClient;
use crate::error::Result;
use crate::types::{CreateProviderRequest, MessageResponse, Provider, UpdateProviderRequest};

/// Query parameters for listing providers.
#[derive(Debug, Default, serde::Serialize)]
pub struct ListProvidersQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// Providers API client.
pub struct ProvidersApi {
    client: DashboardClient,
}

impl ProvidersApi {
    pub(crate) fn new(client: DashboardClient) -> Self {
        Self { client }
    }

    /// List all providers.
    pub async fn list(&self) -> Result<Vec<Provider>> {
        self.client.get("providers").await
    }

    /// List providers with query parameters.
    pub async fn list_with_query(&self, query: ListProvidersQuery) -> Result<Vec<Provider>> {
        self.client.get_with_query("providers", &query).await
    }

    /// Create a new provider. Names are unique server-side.
    pub async fn create(&self, request: &CreateProviderRequest) -> Result<Provider> {
        self.client.post("providers", request).await
    }

    /// Update a provider.
    pub async fn update(&self, id: i64, request: &UpdateProviderRequest) -> Result<Provider> {
        self.client.put(&format!("providers/{}", id), request).await
    }

    /// Delete a provider and every domain attached to it.
    pub async fn delete(&self, id: i64) -> Result<MessageResponse> {
        self.client.delete(&format!("providers/{}", id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_create_sends_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/providers"))
            .and(body_json(serde_json::json!({
                "name": "duck",
                "type": "duckdns",
                "is_enabled": true,
                "credentials": { "token": "abc" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 3, "name": "duck", "type": "duckdns", "is_enabled": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = DashboardClient::builder()
            .base_url(server.uri())
            .build()
            .unwrap();
        let provider = client
            .providers()
            .create(&CreateProviderRequest {
                name: "duck".into(),
                provider_type: "duckdns".into(),
                is_enabled: true,
                credentials: HashMap::from([("token".to_string(), serde_json::json!("abc"))]),
            })
            .await
            .unwrap();
        assert_eq!(provider.id, 3);
    }

    #[tokio::test]
    async fn test_duplicate_name_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/providers"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "detail": "Provider with this name already exists"
            })))
            .mount(&server)
            .await;

        let client = DashboardClient::builder()
            .base_url(server.uri())
            .build()
            .unwrap();
        let err = client
            .providers()
            .create(&CreateProviderRequest {
                name: "duck".into(),
                provider_type: "duckdns".into(),
                is_enabled: true,
                credentials: HashMap::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(
            crate::error_message(&err),
            "Provider with this name already exists"
        );
    }

    #[tokio::test]
    async fn test_disable_provider() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/v1/providers/3"))
            .and(body_json(serde_json::json!({ "is_enabled": false })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 3, "name": "duck", "type": "duckdns", "is_enabled": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = DashboardClient::builder()
            .base_url(server.uri())
            .build()
            .unwrap();
        let provider = client
            .providers()
            .update(
                3,
                &UpdateProviderRequest {
                    is_enabled: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!provider.is_enabled);
    }
}
