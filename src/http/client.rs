//! Routing HTTP client.
//!
//! # Responsibilities
//! - Own the live route table, the transport and the log sink
//! - Resolve internal hosts on every outbound request
//! - Refresh routes from redundant sources, once or periodically
//! - Expose read-only route snapshots
//!
//! # Design Decisions
//! - Cheap to clone; all clones share one route table
//! - The background updater holds only a weak handle, so dropping every
//!   client handle also ends the updater
//! - A refresh that finds no source keeps the previous routes

use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use url::Url;

use crate::config::{FailMode, RouterConfig, SelectionPolicy};
use crate::error::RouterResult;
use crate::http::resolve::HostResolver;
use crate::http::transport::{build_transport, HttpTransport};
use crate::load_balancer::{selector_for, Selector};
use crate::observability::metrics;
use crate::observability::{LogSink, Logger, TracingSink};
use crate::routing::{RouteStore, RouteTable};
use crate::updater::fetch::fetch_first;
use crate::updater::periodic::RouteUpdater;
use crate::updater::signal::StopSignal;

struct ClientInner {
    store: RouteStore,
    transport: Arc<dyn HttpTransport>,
    resolver: HostResolver,
    fail_mode: FailMode,
    logger: Logger,
    updater: Mutex<Option<StopSignal>>,
}

/// HTTP client that routes `*.internal` (or a configured suffix) hosts to
/// backend IPs and passes everything else straight through.
#[derive(Clone)]
pub struct RoutingClient {
    inner: Arc<ClientInner>,
}

/// Weak handle held by the background updater.
#[derive(Clone)]
pub(crate) struct WeakRoutingClient {
    inner: Weak<ClientInner>,
}

impl WeakRoutingClient {
    pub(crate) fn upgrade(&self) -> Option<RoutingClient> {
        self.inner.upgrade().map(|inner| RoutingClient { inner })
    }
}

/// Builder for [`RoutingClient`].
pub struct RoutingClientBuilder {
    transport: Arc<dyn HttpTransport>,
    suffix: String,
    selector: Box<dyn Selector>,
    fail_mode: FailMode,
    sink: Option<Arc<dyn LogSink>>,
    routes: RouteTable,
}

impl RoutingClientBuilder {
    /// Hostname suffix that marks internal hosts. Defaults to ".internal".
    pub fn internal_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn selection(mut self, policy: SelectionPolicy) -> Self {
        self.selector = selector_for(policy);
        self
    }

    /// Use a specific selector, e.g. a seeded `RandomSelector`.
    pub fn selector(mut self, selector: Box<dyn Selector>) -> Self {
        self.selector = selector;
        self
    }

    pub fn fail_mode(mut self, mode: FailMode) -> Self {
        self.fail_mode = mode;
        self
    }

    pub fn log_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Routes to install before any refresh.
    pub fn routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    pub fn build(self) -> RoutingClient {
        let logger = match self.sink {
            Some(sink) => Logger::with_sink(sink),
            None => Logger::disabled(),
        };
        RoutingClient {
            inner: Arc::new(ClientInner {
                store: RouteStore::with_routes(self.routes),
                transport: self.transport,
                resolver: HostResolver::new(self.suffix, self.selector),
                fail_mode: self.fail_mode,
                logger,
                updater: Mutex::new(None),
            }),
        }
    }
}

impl RoutingClient {
    /// Start building a client around `transport`.
    pub fn builder(transport: impl HttpTransport + 'static) -> RoutingClientBuilder {
        RoutingClientBuilder {
            transport: Arc::new(transport),
            suffix: ".internal".to_string(),
            selector: selector_for(SelectionPolicy::default()),
            fail_mode: FailMode::default(),
            sink: None,
            routes: RouteTable::new(),
        }
    }

    /// Client with default settings and no logging.
    pub fn new(transport: impl HttpTransport + 'static) -> Self {
        Self::builder(transport).build()
    }

    /// Client over a fresh `reqwest` transport with a total request timeout.
    pub fn with_timeout(timeout: Duration) -> RouterResult<Self> {
        let transport = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::new(transport))
    }

    /// Client built from configuration, logging through `tracing`.
    pub fn from_config(config: &RouterConfig) -> RouterResult<Self> {
        let transport = build_transport(&config.transport)?;
        Ok(Self::builder(transport)
            .internal_suffix(config.routing.internal_suffix.clone())
            .selection(config.routing.selection)
            .fail_mode(config.routing.fail_mode)
            .log_sink(Arc::new(TracingSink))
            .routes(config.routing.static_routes.clone())
            .build())
    }

    pub(crate) fn downgrade(&self) -> WeakRoutingClient {
        WeakRoutingClient {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Replace the log sink at runtime. `None` silences the client.
    pub fn set_logger(&self, sink: Option<Arc<dyn LogSink>>) {
        self.inner.logger.set_sink(sink);
    }

    /// Deep copy of all live backend IPs.
    pub fn routes(&self) -> RouteTable {
        self.inner.store.snapshot()
    }

    /// Install `routes` directly, replacing the table even if unchanged.
    ///
    /// Use this for manual route management; periodic refresh goes through
    /// [`RoutingClient::start_updating`].
    pub fn set_routes(&self, routes: RouteTable) {
        self.inner.store.replace(routes);
        metrics::record_route_change(self.inner.store.len());
    }

    /// Install `routes` if they differ from the live table. Returns whether they did.
    pub fn apply_routes(&self, routes: RouteTable) -> bool {
        let changed = self.inner.store.install_if_changed(routes);
        if changed {
            let hosts = self.inner.store.len();
            metrics::record_route_change(hosts);
            self.inner
                .logger
                .info(format_args!("routes changed: {} internal hosts", hosts));
        }
        changed
    }

    /// Number of route installs so far.
    pub fn routes_generation(&self) -> u64 {
        self.inner.store.generation()
    }

    /// When the route table was last replaced.
    pub fn routes_changed_at(&self) -> Option<Instant> {
        self.inner.store.last_changed()
    }

    /// Race all `sources` and return the first valid route document.
    ///
    /// If no source answers before `timeout`, the current routes are
    /// returned so a slow upstream never empties the table.
    pub async fn refresh(&self, sources: &[Url], timeout: Duration) -> RouteTable {
        match self.fetch(sources, timeout).await {
            Some(routes) => routes,
            None => self.routes(),
        }
    }

    async fn fetch(&self, sources: &[Url], timeout: Duration) -> Option<RouteTable> {
        fetch_first(
            self.inner.transport.as_ref(),
            sources,
            timeout,
            &self.inner.logger,
        )
        .await
    }

    /// One refresh followed by a conditional install. Returns whether routes changed.
    pub async fn refresh_and_apply(&self, sources: &[Url], timeout: Duration) -> bool {
        match self.fetch(sources, timeout).await {
            Some(routes) => {
                let changed = self.apply_routes(routes);
                metrics::record_refresh(if changed { "updated" } else { "unchanged" });
                changed
            }
            None => {
                metrics::record_refresh("fallback");
                false
            }
        }
    }

    /// Refresh once now, then every `interval` in the background.
    ///
    /// The initial refresh completes before this returns. A failed initial
    /// refresh is not an error: internal hosts simply stay unrouted until a
    /// source answers. Any updater already running is stopped.
    pub async fn start_updating(&self, sources: Vec<Url>, interval: Duration, timeout: Duration) {
        self.refresh_and_apply(&sources, timeout).await;

        let signal = StopSignal::new();
        let updater = RouteUpdater::new(self.downgrade(), sources, interval, timeout);
        tokio::spawn(updater.run(signal.subscribe()));

        if let Some(previous) = self.inner.updater.lock().replace(signal) {
            previous.trigger();
        }
    }

    /// Signal the background updater to exit after its current tick.
    ///
    /// Never blocks. Safe to call when nothing is running, or repeatedly.
    pub fn stop_updating(&self) {
        if let Some(signal) = self.inner.updater.lock().take() {
            signal.trigger();
        }
    }

    /// Whether a background updater has been started and not stopped.
    pub fn is_updating(&self) -> bool {
        self.inner.updater.lock().is_some()
    }

    /// Rewrite `url` to a backend IP if it names an internal host.
    ///
    /// Unknown internal hosts and hosts without live backends are returned
    /// unchanged.
    pub fn resolve(&self, url: Url) -> Url {
        self.inner.resolver.resolve(&self.inner.store, url)
    }

    /// Like [`RoutingClient::resolve`], but fails for internal hosts without a backend.
    pub fn try_resolve(&self, url: Url) -> RouterResult<Url> {
        self.inner.resolver.try_resolve(&self.inner.store, url)
    }

    /// Resolve the request's URL per the configured fail mode, then send it.
    pub async fn execute(&self, mut request: reqwest::Request) -> RouterResult<reqwest::Response> {
        let url = request.url().clone();
        *request.url_mut() = match self.inner.fail_mode {
            FailMode::Open => self.resolve(url),
            FailMode::Closed => self.try_resolve(url)?,
        };
        Ok(self.inner.transport.execute(request).await?)
    }

    /// Routed GET request.
    pub async fn get(&self, url: &str) -> RouterResult<reqwest::Response> {
        let url = Url::parse(url)?;
        self.execute(reqwest::Request::new(reqwest::Method::GET, url))
            .await
    }
}

impl std::fmt::Debug for RoutingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingClient")
            .field("internal_suffix", &self.inner.resolver.suffix())
            .field("fail_mode", &self.inner.fail_mode)
            .field("hosts", &self.inner.store.len())
            .field("updating", &self.is_updating())
            .finish()
    }
}
