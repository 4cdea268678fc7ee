// src/store/mod.rs

use anyhow::Context;
use bytes::Bytes;
use object_store::{
    parse_url_opts, path::Path, GetResult, ObjectStore, PutMode, PutOptions, PutPayload,
};
use std::sync::Arc;
use tracing::{debug, error, info};
use url::Url;

use crate::config::StoreConfig;
use crate::error::Error;

pub use object_store::UpdateVersion;

#[derive(Clone, Debug)]
pub enum WriteMode {
    /// Refuse to replace an existing blob.
    CreateOnly,
    Overwrite,
    /// Replace the blob only if it is still at the given version.
    Replace(UpdateVersion),
}

impl WriteMode {
    fn is_conditional(&self) -> bool {
        !matches!(self, WriteMode::Overwrite)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(String),
    /// The blob already existed (or had moved past the expected version) and
    /// the mode forbade replacing it.
    Rejected(String),
}

/// Named text blobs inside one container.
#[derive(Clone, Debug)]
pub struct BlobStore {
    store: Arc<dyn ObjectStore>,
    prefix: Path,
}

impl BlobStore {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            prefix: Path::default(),
        }
    }

    /// Open the container described by `config`.
    pub fn connect(config: &StoreConfig) -> anyhow::Result<Self> {
        let url = Url::parse(&config.url)
            .with_context(|| format!("parsing store URL {}", config.url))?;
        let (store, prefix) = parse_url_opts(&url, config.options.iter())
            .with_context(|| format!("opening object store {}", config.url))?;
        info!(url = %config.url, "object store ready");
        Ok(Self {
            store: Arc::from(store),
            prefix,
        })
    }

    fn location(&self, name: &str) -> Path {
        self.prefix.child(name)
    }

    pub async fn write(&self, name: &str, content: &str, mode: WriteMode) -> Result<WriteOutcome, Error> {
        let location = self.location(name);
        let opts = match &mode {
            WriteMode::CreateOnly => PutOptions::from(PutMode::Create),
            WriteMode::Overwrite => PutOptions::from(PutMode::Overwrite),
            WriteMode::Replace(version) => PutOptions::from(PutMode::Update(version.clone())),
        };
        let payload = PutPayload::from_bytes(Bytes::copy_from_slice(content.as_bytes()));

        match self.store.put_opts(&location, payload, opts).await {
            Ok(_) => {
                info!(blob = %location, bytes = content.len(), ?mode, "saved blob");
                Ok(WriteOutcome::Written(name.to_string()))
            }
            Err(object_store::Error::AlreadyExists { .. })
            | Err(object_store::Error::Precondition { .. })
                if mode.is_conditional() =>
            {
                error!(blob = %location, ?mode, "failed to save blob (already exists or changed)");
                Ok(WriteOutcome::Rejected(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Read a whole blob as text. An absent blob is reported as
    /// [`Error::BlobNotFound`], distinct from every other store fault.
    pub async fn read(&self, name: &str) -> Result<String, Error> {
        let result = self.get(name).await?;
        text(name, result).await
    }

    /// Like [`BlobStore::read`], also returning the version that was read so
    /// a later [`WriteMode::Replace`] can detect concurrent changes.
    pub async fn read_versioned(&self, name: &str) -> Result<(String, UpdateVersion), Error> {
        let result = self.get(name).await?;
        let version = UpdateVersion {
            e_tag: result.meta.e_tag.clone(),
            version: result.meta.version.clone(),
        };
        Ok((text(name, result).await?, version))
    }

    async fn get(&self, name: &str) -> Result<GetResult, Error> {
        let location = self.location(name);
        match self.store.get(&location).await {
            Ok(result) => Ok(result),
            Err(object_store::Error::NotFound { .. }) => {
                debug!(blob = %location, "blob not found");
                Err(Error::BlobNotFound {
                    name: name.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}

async fn text(name: &str, result: GetResult) -> Result<String, Error> {
    let bytes = result.bytes().await?;
    debug!(blob = name, bytes = bytes.len(), "read blob");
    String::from_utf8(bytes.to_vec()).map_err(|source| Error::BlobNotText {
        name: name.to_string(),
        source,
    })
}
