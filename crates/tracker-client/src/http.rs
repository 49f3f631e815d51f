use async_trait::async_trait;
use tracker_core::{AppConfig, TrackerError, TrackerResult};

use crate::api::{ApiEnvelope, ApiRequest, HttpMethod, RemoteApi};

/// `RemoteApi` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(config: &AppConfig) -> TrackerResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| TrackerError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

#[async_trait]
impl RemoteApi for HttpApi {
    async fn send(&self, request: ApiRequest) -> TrackerResult<serde_json::Value> {
        let url = self.build_url(&request.path);
        let mut builder = self.client.request(Self::method(request.method), &url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TrackerError::Network(format!("{} {} failed: {}", request.method, url, e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TrackerError::Network(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiEnvelope>(&text)
                .ok()
                .and_then(|envelope| envelope.message)
                .unwrap_or_else(|| format!("{} {} returned {}", request.method, request.target(), status));
            return Err(TrackerError::from_status(status.as_u16(), message));
        }

        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }

        let envelope: ApiEnvelope = serde_json::from_str(&text)
            .map_err(|e| TrackerError::Serialization(format!("Failed to parse response: {}", e)))?;

        Ok(envelope.result.unwrap_or(serde_json::Value::Null))
    }
}
