//! The mutable route registry.
//!
//! # Responsibilities
//! - Validate and compile registrations
//! - Keep routes grouped by method, in registration order
//! - Rebuild and publish the `Dispatcher` after every mutation
//! - Persist templates and restore them at startup
//!
//! # Design Decisions
//! - Readers never lock: `resolve` loads the current `Arc<Dispatcher>`,
//!   listings load the route list published alongside it
//! - Writers are serialized by a mutex held across compile, mutate,
//!   rebuild and persist
//! - Persistence is best-effort; a failed write never undoes a live change

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

use crate::routing::dispatcher::{Dispatcher, Resolution};
use crate::routing::matcher::RequestTarget;
use crate::routing::pattern::{PathPattern, PatternError};
use crate::routing::store::{RouteStore, StoredRoutes};

/// A registered binding of tenant host and path template to an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    pub host: String,
    pub path: String,
    pub endpoint: String,
}

impl Route {
    pub fn new(host: impl Into<String>, path: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
            endpoint: endpoint.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub(crate) route: Route,
    pub(crate) pattern: PathPattern,
}

/// Method (uppercase) -> entries in registration order.
pub(crate) type MethodRoutes = BTreeMap<String, Vec<Entry>>;

/// Reasons a registration is rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("malformed path {path:?}: {source}")]
    InvalidPattern {
        path: String,
        #[source]
        source: PatternError,
    },

    #[error("invalid HTTP method {0:?}")]
    InvalidMethod(String),

    #[error("route host must not be empty")]
    EmptyHost,
}

/// Registry of routes plus the dispatcher compiled from them.
pub struct RouteTable {
    routes: Mutex<MethodRoutes>,
    dispatcher: ArcSwap<Dispatcher>,
    listing: ArcSwap<StoredRoutes>,
    store: Option<RouteStore>,
    primary_domain_len: usize,
}

impl RouteTable {
    /// An empty table that is never written to disk.
    pub fn in_memory(primary_domain_len: usize) -> Self {
        Self {
            routes: Mutex::new(MethodRoutes::new()),
            dispatcher: ArcSwap::from_pointee(Dispatcher::empty()),
            listing: ArcSwap::from_pointee(StoredRoutes::new()),
            store: None,
            primary_domain_len,
        }
    }

    /// A table backed by `store`, restored from it if the file exists.
    ///
    /// An unreadable file leaves the table empty. Stored routes that no longer
    /// compile are skipped.
    pub fn open(store: RouteStore, primary_domain_len: usize) -> Self {
        let stored = match store.load() {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Failed to load persisted routes, starting with an empty table"
                );
                None
            }
        };

        let table = Self {
            store: Some(store),
            ..Self::in_memory(primary_domain_len)
        };

        if let Some(stored) = stored {
            let mut routes = table.lock();
            restore(&mut routes, stored);
            let count = route_count(&routes);
            table.rebuild(&routes);
            tracing::info!(routes = count, "Restored persisted routes");
        }

        table
    }

    /// Compile and add a route, replacing an identical one in place.
    ///
    /// A rejected registration leaves the table untouched.
    pub fn register(&self, host: &str, method: &str, path: &str, endpoint: &str) -> Result<(), RouteError> {
        let compiled = normalize_method(method).and_then(|method| {
            if host.is_empty() {
                return Err(RouteError::EmptyHost);
            }
            let pattern = PathPattern::compile(path).map_err(|source| RouteError::InvalidPattern {
                path: path.to_string(),
                source,
            })?;
            Ok((method, pattern))
        });

        let (method, pattern) = match compiled {
            Ok(compiled) => compiled,
            Err(e) => {
                tracing::warn!(%method, %host, %path, error = %e, "Cannot add route");
                return Err(e);
            }
        };

        tracing::info!(%method, %host, %path, %endpoint, "Adding route");
        let mut routes = self.lock();
        insert(&mut routes, method, Route::new(host, path, endpoint), pattern);
        self.rebuild(&routes);
        self.persist();
        Ok(())
    }

    /// Remove a route. Returns whether anything was removed.
    pub fn unregister(&self, host: &str, method: &str, path: &str, endpoint: &str) -> bool {
        let method = method.to_ascii_uppercase();
        let mut routes = self.lock();

        let Some(entries) = routes.get_mut(&method) else {
            return false;
        };
        let Some(index) = entries.iter().position(|e| {
            e.route.host == host && e.route.path == path && e.route.endpoint == endpoint
        }) else {
            return false;
        };

        entries.remove(index);
        if entries.is_empty() {
            routes.remove(&method);
        }

        tracing::info!(%method, %host, %path, %endpoint, "Removed route");
        self.rebuild(&routes);
        self.persist();
        true
    }

    /// Resolve a request against the current dispatcher.
    pub fn resolve(&self, method: &str, host: &str, path: &str) -> Option<Resolution> {
        self.dispatcher
            .load()
            .resolve(&RequestTarget::new(method, host, path))
    }

    /// The currently published dispatcher.
    pub fn snapshot(&self) -> Arc<Dispatcher> {
        self.dispatcher.load_full()
    }

    /// Registered routes grouped by method, in registration order.
    ///
    /// Reads the list published with the current dispatcher, so it never
    /// waits on a writer.
    pub fn routes(&self) -> StoredRoutes {
        self.listing.load().as_ref().clone()
    }

    pub fn len(&self) -> usize {
        self.snapshot().rule_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, MethodRoutes> {
        self.routes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn rebuild(&self, routes: &MethodRoutes) {
        let dispatcher = Dispatcher::build(routes, self.primary_domain_len);
        self.dispatcher.store(Arc::new(dispatcher));
        self.listing.store(Arc::new(to_stored(routes)));
    }

    /// Must be called with the mutation lock held, after `rebuild`.
    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(e) = store.save(self.routes()) {
            tracing::error!(error = %e, "Failed to persist routes; in-memory table is still current");
        }
    }
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTable")
            .field("routes", &self.len())
            .field("store", &self.store)
            .field("primary_domain_len", &self.primary_domain_len)
            .finish()
    }
}

/// Uppercases a method after checking it is an HTTP token.
fn normalize_method(method: &str) -> Result<String, RouteError> {
    let is_tchar = |b: u8| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b);
    if method.is_empty() || !method.bytes().all(is_tchar) {
        return Err(RouteError::InvalidMethod(method.to_string()));
    }
    Ok(method.to_ascii_uppercase())
}

fn insert(routes: &mut MethodRoutes, method: String, route: Route, pattern: PathPattern) {
    let entries = routes.entry(method).or_default();
    match entries.iter_mut().find(|e| e.route == route) {
        Some(existing) => existing.pattern = pattern,
        None => entries.push(Entry { route, pattern }),
    }
}

fn restore(routes: &mut MethodRoutes, stored: StoredRoutes) {
    for (method, stored_routes) in stored {
        let method = match normalize_method(&method) {
            Ok(method) => method,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping persisted routes");
                continue;
            }
        };
        for route in stored_routes {
            match PathPattern::compile(&route.path) {
                Ok(pattern) => insert(routes, method.clone(), route, pattern),
                Err(e) => tracing::warn!(
                    %method,
                    host = %route.host,
                    path = %route.path,
                    error = %e,
                    "Skipping persisted route with malformed path"
                ),
            }
        }
    }
}

fn to_stored(routes: &MethodRoutes) -> StoredRoutes {
    routes
        .iter()
        .map(|(method, entries)| {
            let routes = entries.iter().map(|e| e.route.clone()).collect();
            (method.clone(), routes)
        })
        .collect()
}

fn route_count(routes: &MethodRoutes) -> usize {
    routes.values().map(Vec::len).sum()
}
