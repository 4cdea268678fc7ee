// src/fetch/vehicle.rs

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{info, instrument};

use super::SourceClient;
use crate::error::Error;

/// One vehicle observation exactly as the feed delivered it; key order is
/// preserved.
pub type RawRecord = Map<String, Value>;

#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    result: Option<ResultBody>,
}

#[derive(Debug, Deserialize)]
struct ResultBody {
    records: Vec<RawRecord>,
}

/// Fetch the vehicle feed at `url`.
///
/// Returns `None` when the feed reports `"success": false`.
#[instrument(level = "info", skip(client))]
pub async fn fetch_records(client: &SourceClient, url: &str) -> Result<Option<Vec<RawRecord>>, Error> {
    let (status, body) = client.get_bytes(url).await?;
    let records = decode_envelope(url, &body).map_err(|e| match e {
        Error::MalformedResponse { url, reason } if !status.is_success() => {
            Error::MalformedResponse {
                url,
                reason: format!("HTTP {}: {}", status, reason),
            }
        }
        other => other,
    })?;

    match &records {
        Some(r) => info!(records = r.len(), "vehicle feed fetched"),
        None => info!("vehicle feed reported no success"),
    }
    Ok(records)
}

/// Decode `{"success": bool, "result": {"records": [...]}}`.
pub fn decode_envelope(url: &str, body: &[u8]) -> Result<Option<Vec<RawRecord>>, Error> {
    let envelope: Envelope = serde_json::from_slice(body).map_err(|e| Error::MalformedResponse {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    if !envelope.success {
        return Ok(None);
    }

    match envelope.result {
        Some(result) => Ok(Some(result.records)),
        None => Err(Error::MalformedResponse {
            url: url.to_string(),
            reason: "success without a result section".to_string(),
        }),
    }
}
