//! Capability registry
//!
//! Process-wide routing table from (method, path) to a handler. Capability
//! paths carry a random UUID segment, so knowing the URL is the credential.
//!
//! Single-use entries are claimed with an atomic remove before their handler
//! runs. A second dispatch to the same path, concurrent or later, finds
//! nothing and the handler runs at most once.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use axum::http::{Method, StatusCode};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;
use uuid::Uuid;

use super::request::{CapsRequest, CapsResponse};

/// Registry error type
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("No capability registered for {method} {path}")]
    NotFound { method: Method, path: String },

    #[error("Capability already registered for {method} {path}")]
    DuplicateRoute { method: Method, path: String },
}

/// A capability endpoint implementation
pub trait CapsHandler: Send + Sync {
    fn handle(&self, request: &CapsRequest) -> CapsResponse;
}

impl<F> CapsHandler for F
where
    F: Fn(&CapsRequest) -> CapsResponse + Send + Sync,
{
    fn handle(&self, request: &CapsRequest) -> CapsResponse {
        self(request)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RouteKey {
    method: Method,
    path: String,
}

impl RouteKey {
    fn new(method: &Method, path: &str) -> Self {
        Self {
            method: method.clone(),
            path: path.to_string(),
        }
    }
}

struct CapsEntry {
    handler: Arc<dyn CapsHandler>,
    single_use: bool,
}

/// Routing table for dynamically minted capabilities
pub struct CapsRegistry {
    server_uri: String,
    routes: DashMap<RouteKey, CapsEntry>,
}

impl CapsRegistry {
    /// Create a registry whose URLs are rooted at `server_uri`
    /// (e.g. `http://127.0.0.1:9000`)
    pub fn new(server_uri: impl Into<String>) -> Self {
        let server_uri = server_uri.into().trim_end_matches('/').to_string();
        Self {
            server_uri,
            routes: DashMap::new(),
        }
    }

    pub fn server_uri(&self) -> &str {
        &self.server_uri
    }

    /// Mint a fresh unguessable path: `/CAPS/<name>/<uuid>/`
    pub fn mint_path(name: &str) -> String {
        format!("/CAPS/{}/{}/", name, Uuid::new_v4())
    }

    /// Absolute URL for a registered path
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.server_uri, path)
    }

    /// Register a handler. Fails if (method, path) is already taken.
    pub fn register(
        &self,
        method: Method,
        path: impl Into<String>,
        handler: Arc<dyn CapsHandler>,
        single_use: bool,
    ) -> Result<(), RegistryError> {
        let path = path.into();
        match self.routes.entry(RouteKey { method, path }) {
            Entry::Occupied(entry) => {
                let key = entry.key();
                Err(RegistryError::DuplicateRoute {
                    method: key.method.clone(),
                    path: key.path.clone(),
                })
            }
            Entry::Vacant(entry) => {
                tracing::debug!(
                    "Registered capability {} {} (single use: {})",
                    entry.key().method,
                    entry.key().path,
                    single_use
                );
                entry.insert(CapsEntry { handler, single_use });
                Ok(())
            }
        }
    }

    /// Remove a registration. Returns false if nothing was registered.
    pub fn revoke(&self, method: &Method, path: &str) -> bool {
        let removed = self.routes.remove(&RouteKey::new(method, path)).is_some();
        if removed {
            tracing::debug!("Revoked capability {} {}", method, path);
        }
        removed
    }

    pub fn contains(&self, method: &Method, path: &str) -> bool {
        self.routes.contains_key(&RouteKey::new(method, path))
    }

    /// Number of live registrations
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Route a request to its handler.
    ///
    /// Single-use entries are removed before the handler runs, so the route
    /// is gone whether the handler succeeds, fails or panics.
    pub fn dispatch(&self, request: &CapsRequest) -> Result<CapsResponse, RegistryError> {
        let key = RouteKey::new(&request.method, &request.path);

        let handler = match self.routes.remove_if(&key, |_, entry| entry.single_use) {
            Some((_, entry)) => entry.handler,
            None => match self.routes.get(&key) {
                Some(entry) => Arc::clone(&entry.handler),
                None => {
                    return Err(RegistryError::NotFound {
                        method: key.method,
                        path: key.path,
                    })
                }
            },
        };

        match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(request))) {
            Ok(response) => Ok(response),
            Err(_) => {
                tracing::error!(
                    "Capability handler panicked for {} {}",
                    request.method,
                    request.path
                );
                Ok(CapsResponse::blank(StatusCode::INTERNAL_SERVER_ERROR))
            }
        }
    }
}
