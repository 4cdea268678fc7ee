// src/accumulate.rs

use tracing::{info, warn};

use crate::error::Error;
use crate::store::{BlobStore, UpdateVersion, WriteMode, WriteOutcome};
use crate::transform::{weather::header_line, Table};

/// Name of the running weather table that new rows are appended onto.
pub const WEATHER_ANCHOR: &str = "weather_latest.csv";

/// The running table plus the version it was loaded at (`None` when it did
/// not exist yet).
#[derive(Debug, Clone)]
pub struct Anchor {
    pub table: Table,
    version: Option<UpdateVersion>,
}

impl Anchor {
    pub fn as_str(&self) -> &str {
        self.table.as_str()
    }

    pub fn is_new(&self) -> bool {
        self.version.is_none()
    }
}

/// Loads the running weather table, appends new rows to it and writes it
/// back only if nobody else did in between.
pub struct StateAccumulator<'a> {
    store: &'a BlobStore,
    anchor: &'a str,
}

impl<'a> StateAccumulator<'a> {
    pub fn new(store: &'a BlobStore, anchor: &'a str) -> Self {
        Self { store, anchor }
    }

    /// The anchor's content verbatim, or a header-only table when the anchor
    /// does not exist yet. Every other store fault propagates.
    pub async fn load_anchor(&self) -> Result<Anchor, Error> {
        match self.store.read_versioned(self.anchor).await {
            Ok((text, version)) => {
                info!(anchor = self.anchor, bytes = text.len(), "loaded anchor table");
                Ok(Anchor {
                    table: Table::from_text(text),
                    version: Some(version),
                })
            }
            Err(Error::BlobNotFound { .. }) => {
                warn!(anchor = self.anchor, "no anchor table yet, starting from header");
                Ok(Anchor {
                    table: Table::from_text(header_line()),
                    version: None,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// `load_anchor() + rows`, by plain concatenation.
    pub async fn merge(&self, rows: &str) -> Result<Anchor, Error> {
        let mut anchor = self.load_anchor().await?;
        anchor.table.append(rows);
        Ok(anchor)
    }

    /// Persist `anchor` as the new running table. `Rejected` when the anchor
    /// was created or changed since it was loaded.
    pub async fn save(&self, anchor: &Anchor) -> Result<WriteOutcome, Error> {
        let mode = match &anchor.version {
            Some(version) => WriteMode::Replace(version.clone()),
            None => WriteMode::CreateOnly,
        };
        self.store.write(self.anchor, anchor.as_str(), mode).await
    }
}
