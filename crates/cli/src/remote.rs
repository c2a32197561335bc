use anyhow::{Context as AnyhowContext, Result};
use async_trait::async_trait;
use product_vector_index::{EmbeddingProvider, VectorIndexError};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

#[derive(Serialize)]
struct EmbedRequest<'a> {
    text: &'a [String],
}

/// Embedding service reached over HTTP.
///
/// Sends `{"text": [...]}` as JSON and expects a JSON array holding one float array per
/// input text.
pub struct HttpEmbedder {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpEmbedder {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    fn request_error(&self, err: &reqwest::Error, stage: &str) -> VectorIndexError {
        if err.is_timeout() {
            provider_error(&self.url, format!("timed out after {:?}", self.timeout))
        } else {
            provider_error(&self.url, format!("{stage}{err}"))
        }
    }
}

fn provider_error(url: &str, err: impl std::fmt::Display) -> VectorIndexError {
    VectorIndexError::EmbeddingProvider(format!("{url}: {err}"))
}

#[async_trait]
impl EmbeddingProvider for HttpEmbedder {
    fn name(&self) -> &str {
        &self.url
    }

    async fn embed(&self, texts: &[String]) -> product_vector_index::Result<Vec<Vec<f32>>> {
        let response = self
            .client
            .post(&self.url)
            .json(&EmbedRequest { text: texts })
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| self.request_error(&err, ""))?;

        let embeddings: Vec<Vec<f32>> = response
            .json()
            .await
            .map_err(|err| self.request_error(&err, "malformed response: "))?;

        if embeddings.len() != texts.len() {
            return Err(provider_error(
                &self.url,
                format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    embeddings.len()
                ),
            ));
        }
        Ok(embeddings)
    }
}
