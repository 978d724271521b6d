use futures_util::StreamExt;
use http::StatusCode;
use thiserror::Error;

use super::decoder::Utf8StreamDecoder;
use crate::api::public::health::HealthResponse;
use crate::chat::ChatRequest;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Request failed: {0}")]
    Status(StatusCode),
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// HTTP client for the chat server
#[derive(Clone, Debug)]
pub struct ChatClient {
    http: reqwest::Client,
    api_url: String,
}

impl ChatClient {
    pub fn new(api_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub async fn health(&self) -> Result<HealthResponse, RequestError> {
        let url = format!("{}/api/health", self.api_url);
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(RequestError::Status(response.status()));
        }
        Ok(response.json::<HealthResponse>().await?)
    }

    /// Post the request and call `on_chunk` with each piece of text as
    /// the response body arrives. Returns once the body is complete.
    pub async fn stream_chat<F>(
        &self,
        request: &ChatRequest,
        mut on_chunk: F,
    ) -> Result<(), RequestError>
    where
        F: FnMut(&str),
    {
        let url = format!("{}/api/chat", self.api_url);
        let response = self.http.post(url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Chat request rejected with {}", status);
            return Err(RequestError::Status(status));
        }

        let mut stream = response.bytes_stream();
        let mut decoder = Utf8StreamDecoder::new();

        while let Some(chunk) = stream.next().await {
            let text = decoder.decode(&chunk?);
            if !text.is_empty() {
                on_chunk(&text);
            }
        }

        if decoder.has_pending() {
            tracing::debug!("Response body ended in the middle of a character");
        }
        let rest = decoder.finish();
        if !rest.is_empty() {
            on_chunk(&rest);
        }

        Ok(())
    }
}
