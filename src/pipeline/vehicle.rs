// src/pipeline/vehicle.rs

use anyhow::Context;
use tracing::{error, info, instrument, warn};

use super::{FeedRequest, Outcome};
use crate::config::Config;
use crate::error::{Error, FailureKind};
use crate::fetch::{vehicle::fetch_records, SourceClient};
use crate::store::{BlobStore, WriteMode, WriteOutcome};
use crate::transform::vehicle::to_table;

pub const VEHICLE_BLOB_PREFIX: &str = "vehicle_location";

/// fetch → table → create-only write.
pub struct VehiclePipeline {
    client: SourceClient,
    store: BlobStore,
}

impl VehiclePipeline {
    pub fn new(client: SourceClient, store: BlobStore) -> Self {
        Self { client, store }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client =
            SourceClient::new(config.request_timeout).context("building HTTP client")?;
        let store = BlobStore::connect(&config.store)?;
        Ok(Self::new(client, store))
    }

    #[instrument(level = "info", skip(self, request), fields(url = %request.source_url()))]
    pub async fn run(&self, request: &FeedRequest) -> Outcome {
        match self.try_run(request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(kind = %e.kind(), error = %e.detail(), "vehicle pipeline failed");
                Outcome::from(&e)
            }
        }
    }

    async fn try_run(&self, request: &FeedRequest) -> Result<Outcome, Error> {
        let Some(records) = fetch_records(&self.client, request.source_url()).await? else {
            warn!("source returned no data");
            return Ok(Outcome::no_data());
        };

        let Some(table) = to_table(&records)? else {
            warn!("source returned an empty batch");
            return Ok(Outcome::no_data());
        };

        let name = request.blob_name(VEHICLE_BLOB_PREFIX);
        match self
            .store
            .write(&name, table.as_str(), WriteMode::CreateOnly)
            .await?
        {
            WriteOutcome::Written(blob_name) => {
                info!(blob = %blob_name, lines = table.line_count(), "vehicle locations saved");
                Ok(Outcome::Succeeded { blob_name })
            }
            WriteOutcome::Rejected(blob_name) => Ok(Outcome::failed(
                FailureKind::WriteRejected,
                format!("blob {} already exists", blob_name),
            )),
        }
    }
}
