//! Scripted transport and recording ports shared by gateway, API and flow tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use session::{MemoryStorage, SessionStorage, SessionStore, StorageError};

use super::gateway::{ApiGateway, Navigator};
use super::transport::{OutgoingRequest, RawResponse, Transport, TransportError};

pub const TEST_BASE_URL: &str = "http://api.test/api/v1";

type Handler = dyn Fn(&OutgoingRequest) -> Result<RawResponse, TransportError> + Send + Sync;

pub struct MockTransport {
    handler: Box<Handler>,
    log: Mutex<Vec<OutgoingRequest>>,
    refresh_delay: Option<Duration>,
}

impl MockTransport {
    pub fn new(handler: impl Fn(&OutgoingRequest) -> Result<RawResponse, TransportError> + Send + Sync + 'static) -> Self {
        Self { handler: Box::new(handler), log: Mutex::new(Vec::new()), refresh_delay: None }
    }

    /// Answer every request with `status` and `body`.
    pub fn fixed(status: u16, body: &str) -> Self {
        let body = body.to_owned();
        Self::new(move |_| Ok(response(status, &body)))
    }

    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<OutgoingRequest> {
        self.log.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> OutgoingRequest {
        self.requests().pop().expect("no request was sent")
    }

    pub fn count_path(&self, path: &str) -> usize {
        self.requests().iter().filter(|r| path_of(&r.url) == path).count()
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<RawResponse, TransportError> {
        self.log.lock().unwrap().push(request.clone());
        if path_of(&request.url) == super::gateway::REFRESH_PATH {
            if let Some(delay) = self.refresh_delay {
                tokio::time::sleep(delay).await;
            }
        }
        (self.handler)(&request)
    }
}

pub fn response(status: u16, body: &str) -> RawResponse {
    RawResponse { status, body: body.to_owned() }
}

/// Path and query of `url` relative to [`TEST_BASE_URL`].
pub fn path_of(url: &str) -> &str {
    url.strip_prefix(TEST_BASE_URL).unwrap_or(url)
}

pub fn bearer(request: &OutgoingRequest) -> Option<&str> {
    request.header("Authorization").and_then(|v| v.strip_prefix("Bearer "))
}

pub fn refresh_body(access: &str, refresh: &str) -> String {
    format!(r#"{{"success":true,"data":{{"accessToken":"{access}","refreshToken":"{refresh}"}}}}"#)
}

// =============================================================================
// PORTS
// =============================================================================

#[derive(Default)]
pub struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.paths.lock().unwrap().push(path.to_owned());
    }
}

/// Memory storage that counts removals, i.e. session clears.
#[derive(Default)]
pub struct CountingStorage {
    inner: MemoryStorage,
    removals: AtomicUsize,
}

impl CountingStorage {
    pub fn removals(&self) -> usize {
        self.removals.load(Ordering::SeqCst)
    }
}

impl SessionStorage for CountingStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.removals.fetch_add(1, Ordering::SeqCst);
        self.inner.remove_item(key)
    }
}

// =============================================================================
// FIXTURES
// =============================================================================

pub struct Harness {
    pub gateway: ApiGateway,
    pub transport: Arc<MockTransport>,
    pub navigator: Arc<RecordingNavigator>,
    pub storage: Arc<CountingStorage>,
}

impl Harness {
    pub fn session(&self) -> &Arc<SessionStore> {
        self.gateway.session()
    }
}

/// Gateway over `transport` with a hydrated session holding `tokens`.
pub fn harness(transport: MockTransport, tokens: Option<(&str, &str)>) -> Harness {
    let storage = Arc::new(CountingStorage::default());
    let session = Arc::new(SessionStore::hydrate(storage.clone()));
    if let Some((access, refresh)) = tokens {
        session.set_tokens(access, refresh);
    }
    let transport = Arc::new(transport);
    let navigator = Arc::new(RecordingNavigator::default());
    let gateway = ApiGateway::with_transport(TEST_BASE_URL, session, transport.clone())
        .with_navigator(navigator.clone());
    Harness { gateway, transport, navigator, storage }
}
