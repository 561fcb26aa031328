// Copyright (c) 2025 - Cowboy AI, Inc.
//! Subject router
//!
//! Maps the first token of a subject to the constructor of the event that
//! handles it. The table is built once at startup and never mutated, so it is
//! shared between concurrent dispatches without locking.
//!
//! ```rust
//! use cim_resource_connector::event::constructor;
//! use cim_resource_connector::resources::ResourceKind;
//! use cim_resource_connector::router::RoutingTable;
//!
//! let table = RoutingTable::builder()
//!     .resource(ResourceKind::Network, constructor(|_| None))
//!     .build()
//!     .unwrap();
//!
//! let singular = table.route("network.create").unwrap();
//! let plural = table.route("networks.create").unwrap();
//! assert!(singular.same_constructor(plural));
//! assert!(table.route("mainframe.create").is_none());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::errors::{ConnectorError, ConnectorResult};
use crate::event::EventConstructor;
use crate::resources::ResourceKind;
use crate::subjects::{routing_key, SUBJECT_SEPARATOR};

/// A routing table entry
#[derive(Clone)]
pub struct Route {
    variant: Arc<str>,
    constructor: Arc<dyn EventConstructor>,
}

impl Route {
    /// Name of the event variant this route builds
    pub fn variant(&self) -> &str {
        &self.variant
    }

    pub fn constructor(&self) -> &dyn EventConstructor {
        self.constructor.as_ref()
    }

    /// Whether both routes build events with the same constructor
    pub fn same_constructor(&self, other: &Route) -> bool {
        Arc::ptr_eq(&self.constructor, &other.constructor)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("variant", &self.variant)
            .finish_non_exhaustive()
    }
}

/// Immutable mapping from resource tag to event constructor
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    routes: HashMap<String, Route>,
}

impl RoutingTable {
    pub fn builder() -> RoutingTableBuilder {
        RoutingTableBuilder::new()
    }

    /// Resolve a subject by its first token.
    ///
    /// Exact, case-sensitive match; nothing beyond the first token is
    /// consulted. `None` is the ordinary answer for subjects nobody handles.
    pub fn route(&self, subject: &str) -> Option<&Route> {
        routing_key(subject).and_then(|tag| self.routes.get(tag))
    }

    /// Look up a tag directly
    pub fn lookup(&self, tag: &str) -> Option<&Route> {
        self.routes.get(tag)
    }

    /// Registered tags, sorted
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Registered variant names, sorted and deduplicated
    pub fn variants(&self) -> Vec<&str> {
        let mut variants: Vec<&str> = self.routes.values().map(Route::variant).collect();
        variants.sort_unstable();
        variants.dedup();
        variants
    }

    /// Number of registered tags
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Builder for [`RoutingTable`]
///
/// Registration problems (duplicate or malformed tags) are collected and
/// reported together by [`RoutingTableBuilder::build`].
#[derive(Default)]
pub struct RoutingTableBuilder {
    routes: HashMap<String, Route>,
    problems: Vec<String>,
}

impl RoutingTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource kind under its singular and plural tags
    pub fn resource(self, kind: ResourceKind, constructor: Arc<dyn EventConstructor>) -> Self {
        self.variant(kind.as_str(), &kind.tags(), constructor)
    }

    /// Register several resource kinds, building each constructor with `make`
    pub fn resources<I, F>(self, kinds: I, make: F) -> Self
    where
        I: IntoIterator<Item = ResourceKind>,
        F: Fn(ResourceKind) -> Arc<dyn EventConstructor>,
    {
        kinds
            .into_iter()
            .fold(self, |builder, kind| builder.resource(kind, make(kind)))
    }

    /// Register an arbitrary variant under one or more tags
    pub fn variant(
        mut self,
        name: &str,
        tags: &[&str],
        constructor: Arc<dyn EventConstructor>,
    ) -> Self {
        let variant: Arc<str> = Arc::from(name);

        for tag in tags {
            if tag.is_empty() || tag.contains(SUBJECT_SEPARATOR) {
                self.problems
                    .push(format!("invalid tag '{}' for variant '{}'", tag, name));
                continue;
            }

            let route = Route {
                variant: Arc::clone(&variant),
                constructor: Arc::clone(&constructor),
            };
            if let Some(previous) = self.routes.insert(tag.to_string(), route) {
                self.problems.push(format!(
                    "tag '{}' registered by both '{}' and '{}'",
                    tag,
                    previous.variant(),
                    name
                ));
            }
        }

        self
    }

    pub fn build(self) -> ConnectorResult<RoutingTable> {
        if !self.problems.is_empty() {
            return Err(ConnectorError::Configuration(self.problems.join("; ")));
        }

        Ok(RoutingTable {
            routes: self.routes,
        })
    }
}
