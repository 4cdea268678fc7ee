// src/fetch/mod.rs

use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::Error;

pub mod vehicle;
pub mod weather;

/// Thin wrapper over a `reqwest::Client` whose every request is bounded by
/// the configured timeout. Faults are classified into address, connection
/// and timeout errors and are never retried here.
#[derive(Clone, Debug)]
pub struct SourceClient {
    client: Client,
}

impl SourceClient {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Issue one GET against `url`.
    pub async fn get(&self, url: &str) -> Result<Response, Error> {
        let parsed = parse_source_url(url)?;
        debug!(%url, "GET");
        self.client
            .get(parsed)
            .send()
            .await
            .map_err(|e| classify(url, e))
    }

    /// Issue one GET and return the status code with the whole body.
    pub async fn get_bytes(&self, url: &str) -> Result<(reqwest::StatusCode, bytes::Bytes), Error> {
        let resp = self.get(url).await?;
        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| classify(url, e))?;
        debug!(%url, %status, bytes = body.len(), "response");
        Ok((status, body))
    }
}

pub(crate) fn parse_source_url(url: &str) -> Result<Url, Error> {
    let parsed = Url::parse(url).map_err(|e| Error::SourceAddress {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(Error::SourceAddress {
            url: url.to_string(),
            reason: format!("unsupported scheme {}", other),
        }),
    }
}

fn classify(url: &str, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::SourceTimeout {
            url: url.to_string(),
            source: err,
        }
    } else if err.is_builder() {
        Error::SourceAddress {
            url: url.to_string(),
            reason: err.without_url().to_string(),
        }
    } else {
        Error::SourceConnection {
            url: url.to_string(),
            source: err,
        }
    }
}
