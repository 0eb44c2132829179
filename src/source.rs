//! Upstream data sources for a location's history and prediction.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::fetch::{HttpClient, fetch_text};
use crate::prediction::PredictionRecord;

/// Anything that can supply raw history and a prediction for a city key.
#[async_trait]
pub trait AirQualitySource: Send + Sync {
    /// Returns the raw historical payload (JSON) for `city`.
    async fn history(&self, city: &str) -> Result<String>;

    /// Returns the 24-hour prediction for `city`.
    async fn prediction(&self, city: &str) -> Result<PredictionRecord>;
}

#[async_trait]
impl<S: AirQualitySource + ?Sized> AirQualitySource for Arc<S> {
    async fn history(&self, city: &str) -> Result<String> {
        (**self).history(city).await
    }

    async fn prediction(&self, city: &str) -> Result<PredictionRecord> {
        (**self).prediction(city).await
    }
}

/// The dashboard backend: `GET {base}/data/{city}` and `GET {base}/predict/{city}`.
pub struct BackendClient<C> {
    client: C,
    base_url: String,
}

impl<C: HttpClient> BackendClient<C> {
    pub fn new(client: C, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, endpoint: &str, city: &str) -> String {
        format!("{}/{}/{}", self.base_url, endpoint, city)
    }
}

#[async_trait]
impl<C: HttpClient> AirQualitySource for BackendClient<C> {
    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    async fn history(&self, city: &str) -> Result<String> {
        let url = self.url("data", city);
        let body = fetch_text(&self.client, &url).await?;
        debug!(bytes = body.len(), "History payload received");
        Ok(body)
    }

    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    async fn prediction(&self, city: &str) -> Result<PredictionRecord> {
        let url = self.url("predict", city);
        let body = fetch_text(&self.client, &url).await?;
        serde_json::from_str(&body)
            .with_context(|| format!("failed to parse prediction from '{url}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::BasicClient;

    #[test]
    fn test_backend_urls() {
        let backend = BackendClient::new(BasicClient::new(), "http://localhost:5000/api/");
        assert_eq!(
            backend.url("data", "mexicocity"),
            "http://localhost:5000/api/data/mexicocity"
        );
        assert_eq!(
            backend.url("predict", "la"),
            "http://localhost:5000/api/predict/la"
        );
    }
}
