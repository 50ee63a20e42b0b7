//! Mutable route table.
//!
//! # Responsibilities
//! - Store pattern → backend entries
//! - Longest-pattern lookup, host-qualified patterns first
//! - Maintain implicit redirects for rooted subtrees
//! - Canonicalize request paths before dispatch
//!
//! # Design Decisions
//! - One `parking_lot::RwLock` around a plain `BTreeMap`
//! - Readers clone the backend `Arc` and release the lock before awaiting it
//! - Writers only touch memory; no I/O inside the critical section
//! - Equal-length candidates resolve to the lexicographically smallest pattern

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use parking_lot::RwLock;
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use serde::Serialize;

use crate::backend::{BackendHandler, NotFoundBackend, RedirectBackend, redirect};
use crate::routing::error::RouteError;
use crate::routing::path::{canonicalize, pattern_matches, split_host, subtree_root, validate_pattern};

/// Bytes re-escaped when a decoded path goes back into a `Location` header.
const LOCATION_PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A single registered pattern.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub pattern: String,
    /// `false` for automatically generated subtree redirects.
    pub explicit: bool,
    pub backend: BackendHandler,
}

/// Snapshot of an entry for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    pub pattern: String,
    pub explicit: bool,
    pub backend: String,
}

/// The unlocked pattern map.
///
/// Only reachable through [`RouteTable`], either one operation at a time or
/// inside [`RouteTable::transaction`].
#[derive(Debug, Clone, Default)]
pub struct RouteMap {
    entries: BTreeMap<String, RouteEntry>,
}

impl RouteMap {
    /// Register an explicit entry for `pattern`.
    ///
    /// A subtree pattern (`/tree/`) also gets an implicit permanent redirect at
    /// `/tree`, unless `/tree` is already explicit. A later explicit
    /// registration at `/tree` replaces the redirect.
    pub fn handle(&mut self, pattern: &str, backend: BackendHandler) -> Result<(), RouteError> {
        validate_pattern(pattern)?;
        if self.is_explicit(pattern) {
            return Err(RouteError::DuplicateRegistration(pattern.to_string()));
        }

        self.entries.insert(
            pattern.to_string(),
            RouteEntry {
                pattern: pattern.to_string(),
                explicit: true,
                backend,
            },
        );

        if let Some(bare) = subtree_root(pattern) {
            if !self.is_explicit(bare) {
                let (_, location) = split_host(pattern);
                self.entries.insert(
                    bare.to_string(),
                    RouteEntry {
                        pattern: bare.to_string(),
                        explicit: false,
                        backend: Arc::new(RedirectBackend::permanent(location)),
                    },
                );
            }
        }
        Ok(())
    }

    /// Remove whatever is registered at exactly `pattern`.
    ///
    /// Removing a subtree pattern also drops its implicit redirect; an explicit
    /// entry at the bare path is left alone.
    pub fn remove_handler(&mut self, pattern: &str) -> Result<RouteEntry, RouteError> {
        let removed = self
            .entries
            .remove(pattern)
            .ok_or_else(|| RouteError::UnknownPattern(pattern.to_string()))?;

        if let Some(bare) = subtree_root(pattern) {
            if self.entries.get(bare).is_some_and(|e| !e.explicit) {
                self.entries.remove(bare);
            }
        }
        Ok(removed)
    }

    /// Most specific entry matching `path`.
    pub fn lookup(&self, path: &str) -> Option<&RouteEntry> {
        self.entries
            .iter()
            .filter(|(pattern, _)| pattern_matches(pattern, path))
            .max_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| b.cmp(a)))
            .map(|(_, entry)| entry)
    }

    pub fn get(&self, pattern: &str) -> Option<&RouteEntry> {
        self.entries.get(pattern)
    }

    pub fn is_explicit(&self, pattern: &str) -> bool {
        self.entries.get(pattern).is_some_and(|e| e.explicit)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.values()
    }
}

/// Concurrency-safe route table shared by the data and control planes.
#[derive(Debug)]
pub struct RouteTable {
    map: RwLock<RouteMap>,
    not_found: BackendHandler,
}

impl RouteTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            map: RwLock::new(RouteMap::default()),
            not_found: Arc::new(NotFoundBackend),
        }
    }

    /// Register an explicit entry. See [`RouteMap::handle`].
    pub fn handle(&self, pattern: &str, backend: BackendHandler) -> Result<(), RouteError> {
        self.map.write().handle(pattern, backend)
    }

    /// Remove the entry at `pattern`. See [`RouteMap::remove_handler`].
    pub fn remove_handler(&self, pattern: &str) -> Result<(), RouteError> {
        self.map.write().remove_handler(pattern).map(|_| ())
    }

    /// Run several mutations in one write critical section.
    ///
    /// If `f` fails, the table is restored to the state it had before the call.
    pub fn transaction<T, F>(&self, f: F) -> Result<T, RouteError>
    where
        F: FnOnce(&mut RouteMap) -> Result<T, RouteError>,
    {
        let mut map = self.map.write();
        let snapshot = map.clone();
        match f(&mut map) {
            Ok(value) => Ok(value),
            Err(e) => {
                *map = snapshot;
                Err(e)
            }
        }
    }

    /// Backend of the longest pattern matching `path`.
    pub fn match_path(&self, path: &str) -> Option<BackendHandler> {
        self.map.read().lookup(path).map(|e| e.backend.clone())
    }

    /// Resolve the backend for a request.
    ///
    /// Host-qualified patterns win over host-less ones; unmatched requests get
    /// the not-found backend.
    pub fn dispatch(&self, method: &Method, host: &str, path: &str) -> BackendHandler {
        let map = self.map.read();

        let host_entry = if host.is_empty() {
            None
        } else {
            map.lookup(&format!("{}{}", host, path))
        };

        match host_entry.or_else(|| map.lookup(path)) {
            Some(entry) => {
                tracing::trace!(method = %method, host = %host, path = %path, pattern = %entry.pattern, "Route matched");
                entry.backend.clone()
            }
            None => {
                tracing::debug!(method = %method, host = %host, path = %path, "No route matched");
                self.not_found.clone()
            }
        }
    }

    /// Serve a data-plane request.
    ///
    /// The path is percent-decoded before anything else looks at it.
    /// Non-canonical paths are answered with a 301 to the canonical path
    /// (except for CONNECT); everything else goes to the dispatched backend.
    pub async fn serve(&self, request: Request<Body>) -> Response {
        let path = percent_decode_str(request.uri().path())
            .decode_utf8_lossy()
            .into_owned();

        if request.method() != Method::CONNECT {
            let canonical = canonicalize(&path);
            if canonical != path {
                let encoded = utf8_percent_encode(&canonical, LOCATION_PATH).to_string();
                let location = match request.uri().query() {
                    Some(query) => format!("{}?{}", encoded, query),
                    None => encoded,
                };
                tracing::debug!(path = %path, location = %location, "Redirecting to canonical path");
                return redirect(StatusCode::MOVED_PERMANENTLY, &location);
            }
        }

        let backend = {
            let host = request_host(&request);
            self.dispatch(request.method(), &host, &path)
        };
        backend.call(request).await
    }

    /// Sorted snapshot of every entry.
    pub fn routes(&self) -> Vec<RouteInfo> {
        self.map
            .read()
            .iter()
            .map(|e| RouteInfo {
                pattern: e.pattern.clone(),
                explicit: e.explicit,
                backend: e.backend.describe(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Lower-cased request host, including any port.
///
/// A host containing `/` is ignored so it cannot splice into the path.
fn request_host(request: &Request<Body>) -> String {
    request
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| request.uri().authority().map(|a| a.as_str()))
        .filter(|host| !host.contains('/'))
        .unwrap_or_default()
        .to_lowercase()
}
