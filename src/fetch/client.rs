use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes a prepared request. Wrapping this lets callers add headers,
/// retries or canned responses without touching the sources.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

#[async_trait]
impl<C: HttpClient + ?Sized> HttpClient for Arc<C> {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        (**self).execute(req).await
    }
}
