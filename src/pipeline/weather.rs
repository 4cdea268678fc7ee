// src/pipeline/weather.rs

use anyhow::Context;
use tracing::{error, info, instrument, warn};

use super::{FeedRequest, Outcome};
use crate::accumulate::{StateAccumulator, WEATHER_ANCHOR};
use crate::config::{Config, WeatherConfig};
use crate::error::{Error, FailureKind};
use crate::fetch::{weather::fetch_all, SourceClient};
use crate::store::{BlobStore, WriteMode, WriteOutcome};
use crate::transform::weather::{rows_to_csv, to_row, WeatherRow};

pub const WEATHER_BLOB_PREFIX: &str = "weather";

/// fetch every city → rows → append onto the anchor table → write.
///
/// The anchor is written back first, conditional on the version that was
/// read, so overlapping runs cannot drop each other's rows: the later one
/// ends as `WriteRejected` with nothing written. The timestamped blob is
/// written second; if that write fails the run reports a store fault even
/// though the anchor already carries the new rows.
pub struct WeatherPipeline {
    client: SourceClient,
    store: BlobStore,
    weather: WeatherConfig,
}

impl WeatherPipeline {
    pub fn new(client: SourceClient, store: BlobStore, weather: WeatherConfig) -> Self {
        Self {
            client,
            store,
            weather,
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let weather = config.weather()?.clone();
        let client =
            SourceClient::new(config.request_timeout).context("building HTTP client")?;
        let store = BlobStore::connect(&config.store)?;
        Ok(Self::new(client, store, weather))
    }

    /// A request for this run, stamped now.
    pub fn request(&self) -> FeedRequest {
        FeedRequest::new(self.weather.api_url.clone())
    }

    #[instrument(level = "info", skip(self, request), fields(cities = self.weather.cities.len()))]
    pub async fn run(&self, request: &FeedRequest) -> Outcome {
        match self.try_run(request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(kind = %e.kind(), error = %e.detail(), "weather pipeline failed");
                Outcome::from(&e)
            }
        }
    }

    async fn try_run(&self, request: &FeedRequest) -> Result<Outcome, Error> {
        let reports = fetch_all(&self.client, &self.weather).await?;
        let rows: Vec<WeatherRow> = reports
            .iter()
            .filter_map(|(city, report)| to_row(report.as_ref(), &city.name))
            .collect();

        if rows.is_empty() {
            warn!("no city returned weather data");
            return Ok(Outcome::no_data());
        }
        info!(rows = rows.len(), "weather rows collected");

        let segment = rows_to_csv(&rows)?;
        let accumulator = StateAccumulator::new(&self.store, WEATHER_ANCHOR);
        let anchor = accumulator.merge(&segment).await?;

        if let WriteOutcome::Rejected(anchor_name) = accumulator.save(&anchor).await? {
            return Ok(Outcome::failed(
                FailureKind::WriteRejected,
                format!("blob {} changed during the run", anchor_name),
            ));
        }

        let name = request.blob_name(WEATHER_BLOB_PREFIX);
        let written = self
            .store
            .write(&name, anchor.as_str(), WriteMode::Overwrite)
            .await
            .map_err(|e| {
                warn!(blob = %name, anchor = WEATHER_ANCHOR, "anchor updated but snapshot not saved");
                e
            })?;
        let blob_name = match written {
            WriteOutcome::Written(blob_name) => blob_name,
            WriteOutcome::Rejected(blob_name) => {
                return Ok(Outcome::failed(
                    FailureKind::WriteRejected,
                    format!("blob {} already exists", blob_name),
                ))
            }
        };
        info!(blob = %blob_name, lines = anchor.table.line_count(), "weather table saved");

        Ok(Outcome::Succeeded { blob_name })
    }
}
