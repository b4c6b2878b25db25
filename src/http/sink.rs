use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::HttpSettings;
use crate::document::Document;
use crate::error::{AppError, Result};
use crate::http::pool::create_http_client;

pub const SIGNATURE_HEADER: &str = "Signature";

/// Destination for signed documents.
///
/// Implementations perform the actual rate limited call; throttling happens
/// before `submit` is invoked.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    async fn submit(&self, document: &Document, signature: &str) -> Result<()>;
}

/// Posts documents as JSON to the "create document" endpoint.
#[derive(Debug, Clone)]
pub struct HttpDocumentSink {
    client: Client,
    endpoint: String,
}

impl HttpDocumentSink {
    pub fn new(endpoint: impl Into<String>, settings: &HttpSettings) -> Result<Self> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(AppError::Init("No endpoint provided".into()));
        }

        Ok(Self {
            client: create_http_client(settings)?,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl DocumentSink for HttpDocumentSink {
    async fn submit(&self, document: &Document, signature: &str) -> Result<()> {
        let body = document.to_json()?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(SIGNATURE_HEADER, signature)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Document rejected by {}: HTTP {}", self.endpoint, status);
            return Err(AppError::Api {
                status: status.as_u16(),
            });
        }

        debug!(
            "Document {:?} accepted: HTTP {}",
            document.doc_id.as_deref().unwrap_or("-"),
            status
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> HttpSettings {
        HttpSettings {
            connect_timeout_ms: 100,
            request_timeout_ms: 100,
            pool_idle_timeout_secs: 1,
            https_only: true,
        }
    }

    #[test]
    fn test_rejects_empty_endpoint() {
        assert!(matches!(
            HttpDocumentSink::new(" ", &settings()),
            Err(AppError::Init(_))
        ));
    }

    #[tokio::test]
    async fn test_https_only_refuses_plain_http() {
        let sink = HttpDocumentSink::new("http://127.0.0.1:9/create", &settings()).unwrap();

        let result = sink.submit(&Document::sample(), "sig").await;

        assert!(matches!(result, Err(AppError::Http(_))));
    }
}
