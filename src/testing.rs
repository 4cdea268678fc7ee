// Test doubles shared across modules.

use async_trait::async_trait;
use futures::stream::BoxStream;
use object_store::{
    memory::InMemory, path::Path, GetOptions, GetResult, ListResult, MultipartUpload, ObjectMeta,
    ObjectStore, PutMultipartOpts, PutOptions, PutPayload, PutResult,
};
use std::{
    fmt,
    net::{SocketAddr, TcpListener},
    sync::Arc,
    time::Duration,
};
use tracing_subscriber::EnvFilter;
use warp::{Filter, Rejection, Reply};

use crate::store::BlobStore;

pub(crate) fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_target(false)
        .with_test_writer()
        .try_init();
}

/// Serve `routes` on an ephemeral localhost port for the rest of the test.
pub(crate) fn spawn_server<F, R>(routes: F) -> SocketAddr
where
    F: Filter<Extract = (R,), Error = Rejection> + Clone + Send + Sync + 'static,
    R: Reply,
{
    let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

/// A blob store backed by memory, plus a handle for inspecting it.
pub(crate) fn memory_store() -> (BlobStore, Arc<dyn ObjectStore>) {
    let inner: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
    (BlobStore::new(inner.clone()), inner)
}

/// In-memory store that can slow down every read and write and fail chosen
/// operations with a generic (non "not found") fault.
#[derive(Debug)]
pub(crate) struct FlakyStore {
    inner: Arc<InMemory>,
    delay: Duration,
    fail_get: bool,
    fail_put: Vec<Path>,
}

impl FlakyStore {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(InMemory::new()),
            delay: Duration::ZERO,
            fail_get: false,
            fail_put: Vec::new(),
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn failing_get(mut self) -> Self {
        self.fail_get = true;
        self
    }

    pub(crate) fn failing_put(mut self, name: &str) -> Self {
        self.fail_put.push(Path::from(name));
        self
    }

    /// The backing store, unaffected by delays and faults.
    pub(crate) fn inner(&self) -> Arc<dyn ObjectStore> {
        self.inner.clone()
    }
}

fn injected_fault() -> object_store::Error {
    object_store::Error::Generic {
        store: "flaky",
        source: "injected fault".into(),
    }
}

impl fmt::Display for FlakyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FlakyStore({})", self.inner)
    }
}

#[async_trait]
impl ObjectStore for FlakyStore {
    async fn put_opts(
        &self,
        location: &Path,
        payload: PutPayload,
        opts: PutOptions,
    ) -> object_store::Result<PutResult> {
        tokio::time::sleep(self.delay).await;
        if self.fail_put.contains(location) {
            return Err(injected_fault());
        }
        self.inner.put_opts(location, payload, opts).await
    }

    async fn put_multipart_opts(
        &self,
        location: &Path,
        opts: PutMultipartOpts,
    ) -> object_store::Result<Box<dyn MultipartUpload>> {
        self.inner.put_multipart_opts(location, opts).await
    }

    async fn get_opts(
        &self,
        location: &Path,
        options: GetOptions,
    ) -> object_store::Result<GetResult> {
        tokio::time::sleep(self.delay).await;
        if self.fail_get {
            return Err(injected_fault());
        }
        self.inner.get_opts(location, options).await
    }

    async fn delete(&self, location: &Path) -> object_store::Result<()> {
        self.inner.delete(location).await
    }

    fn list(&self, prefix: Option<&Path>) -> BoxStream<'_, object_store::Result<ObjectMeta>> {
        self.inner.list(prefix)
    }

    async fn list_with_delimiter(&self, prefix: Option<&Path>) -> object_store::Result<ListResult> {
        self.inner.list_with_delimiter(prefix).await
    }

    async fn copy(&self, from: &Path, to: &Path) -> object_store::Result<()> {
        self.inner.copy(from, to).await
    }

    async fn copy_if_not_exists(&self, from: &Path, to: &Path) -> object_store::Result<()> {
        self.inner.copy_if_not_exists(from, to).await
    }
}

/// A localhost port nothing listens on.
pub(crate) fn unused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// A current-weather payload as the weather API returns it.
pub(crate) const WEATHER_SAMPLE: &str = r#"{
    "coord": {"lon": 17.0365, "lat": 51.1072},
    "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}],
    "base": "stations",
    "main": {"temp": 12.5, "feels_like": 11.61, "temp_min": 11.0, "temp_max": 13.9, "pressure": 1013, "humidity": 71},
    "visibility": 10000,
    "wind": {"speed": 4.12, "deg": 250},
    "clouds": {"all": 75},
    "dt": 1700000000,
    "name": "Wroclaw",
    "cod": 200
}"#;
