use async_trait::async_trait;
use reqwest::Client;

use super::types::{HealthStatus, SearchRequest, SearchResponse};
use super::{GatewayError, SearchGateway};

#[derive(Clone)]
pub struct HttpSearchClient {
    client: Client,
    base_url: String,
}

impl HttpSearchClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn complete(&self, request: &SearchRequest) -> Result<SearchResponse, GatewayError> {
        let url = format!("{}/complete", self.base_url);
        tracing::debug!(
            %url,
            brand = %request.brand,
            model = %request.model,
            "Sending search request"
        );

        let response = self.client.post(&url).json(request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let detail = match server_error_message(&text) {
                Some(message) => {
                    tracing::warn!(
                        status = status.as_u16(),
                        server_error = %message,
                        "Search service rejected the request"
                    );
                    message
                }
                None => {
                    tracing::warn!(status = status.as_u16(), "Search request failed");
                    text
                }
            };
            return Err(GatewayError::status(
                status.as_u16(),
                format!("Search request failed with status {}: {}", status, detail),
            ));
        }

        let search_response: SearchResponse = response.json().await?;
        Ok(search_response)
    }

    pub async fn health_check(&self) -> Result<HealthStatus, GatewayError> {
        let url = format!("{}/health", self.base_url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(GatewayError::status(
                status.as_u16(),
                format!("Health check failed: {}", status),
            ));
        }

        let health: HealthStatus = response.json().await?;
        Ok(health)
    }
}

/// The `error` field of a failure body, when the service sent one
fn server_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("error")?.as_str().map(str::to_string)
}

#[async_trait]
impl SearchGateway for HttpSearchClient {
    async fn complete_search(
        &self,
        request: &SearchRequest,
    ) -> Result<SearchResponse, GatewayError> {
        self.complete(request).await
    }
}
