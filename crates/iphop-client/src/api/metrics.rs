//! Metrics API.

use crate::client::DashboardClient;
use crate::error::Result;
use crate::types::{
    ActivityResponse, DashboardMetrics, IpChangeMetrics, ProviderStatsResponse,
    ResponseTimeMetrics, UptimeMetrics,
};

/// Query parameters for the activity timeline.
#[derive(Debug, Default, serde::Serialize)]
pub struct ActivityQuery {
    /// Maximum number of entries (server default 20).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// Metrics API client.
pub struct MetricsApi {
    client: DashboardClient,
}

impl MetricsApi {
    pub(crate) fn new(client: DashboardClient) -> Self {
        Self { client }
    }

    /// Headline dashboard numbers.
    pub async fn dashboard(&self) -> Result<DashboardMetrics> {
        self.client.get("metrics/dashboard").await
    }

    /// Update reliability over 24h and 7d.
    pub async fn uptime(&self) -> Result<UptimeMetrics> {
        self.client.get("metrics/uptime").await
    }

    /// IP change frequency over the last week.
    pub async fn ip_changes(&self) -> Result<IpChangeMetrics> {
        self.client.get("metrics/ip-changes").await
    }

    /// Per-provider success rates.
    pub async fn provider_stats(&self) -> Result<ProviderStatsResponse> {
        self.client.get("metrics/provider-stats").await
    }

    /// Update timing per window.
    pub async fn response_time(&self) -> Result<ResponseTimeMetrics> {
        self.client.get("metrics/response-time").await
    }

    /// Recent update activity, newest first.
    pub async fn activity(&self, query: ActivityQuery) -> Result<ActivityResponse> {
        self.client.get_with_query("metrics/activity", &query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_uptime() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/metrics/uptime"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "uptime_24h": 100,
                "uptime_7d": 97.5,
                "total_requests_24h": 0,
                "successful_requests_24h": 0,
                "total_requests_7d": 40,
                "successful_requests_7d": 39,
                "scheduler_status": "running"
            })))
            .mount(&server)
            .await;

        let client = DashboardClient::builder()
            .base_url(server.uri())
            .build()
            .unwrap();
        let uptime = client.metrics().uptime().await.unwrap();
        assert_eq!(uptime.uptime_24h, 100.0);
        assert_eq!(uptime.scheduler_status, "running");
    }

    #[tokio::test]
    async fn test_response_time_windows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/metrics/response-time"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "1h": { "count": 1, "avg_time": 0, "min_time": 0, "max_time": 0 },
                "6h": { "count": 4, "avg_time": 0, "min_time": 0, "max_time": 0 },
                "24h": { "count": 9, "avg_time": 0, "min_time": 0, "max_time": 0 }
            })))
            .mount(&server)
            .await;

        let client = DashboardClient::builder()
            .base_url(server.uri())
            .build()
            .unwrap();
        let windows = client.metrics().response_time().await.unwrap();
        assert_eq!(windows.len(), 3);
        assert_eq!(windows["24h"].count, 9);
    }

    #[tokio::test]
    async fn test_activity_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/metrics/activity"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "activity": [{
                    "id": 1,
                    "domain_id": 2,
                    "domain_name": "home.example.com",
                    "ip_address": "203.0.113.7",
                    "status": "SUCCESS",
                    "timestamp": "2025-03-01T10:00:00",
                    "message": null
                }],
                "count": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = DashboardClient::builder()
            .base_url(server.uri())
            .build()
            .unwrap();
        let activity = client
            .metrics()
            .activity(ActivityQuery { limit: Some(5) })
            .await
            .unwrap();
        assert_eq!(activity.count, 1);
        assert_eq!(activity.activity[0].domain_name, "home.example.com");
    }
}
