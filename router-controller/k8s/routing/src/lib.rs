//! Keeps the proxy's HTTP route in sync with Kubernetes backend objects.
//!
//! Each watched kind has its own [`RoutingResolver`], which extracts the
//! routing intent of an object: a route name, a backend address, and the
//! public domain names that should reach it. A [`Reconciler`] fetches the
//! proxy's `http` route, applies the minimal change for one object, replaces
//! the route only if it changed, and records the primary domain in the
//! object's status. [`dispatch::run`] feeds a watch stream through a
//! reconciler, one event at a time.
//!
//! ```text
//! [ watch ] -> [ dispatch ] -> [ Reconciler ] -> [ RouterApi ]
//!                                   |  \
//!                      [ RoutingResolver ] [ StatusStore ]
//! ```

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod dispatch;
mod metrics;
mod reconcile;
pub mod resolve;
mod store;

#[cfg(test)]
mod tests;

pub use self::{
    metrics::ReconcileMetrics,
    reconcile::Reconciler,
    resolve::{IngressResolver, RoutingConfig, RoutingResolver, ServiceResolver},
    store::StatusStore,
};
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{resolver} resolver cannot handle a {found}")]
    WrongKind {
        resolver: &'static str,
        found: &'static str,
    },

    #[error("{kind} {name} has no namespace")]
    MissingNamespace { kind: &'static str, name: String },

    #[error("{kind} {namespace}/{name} has no backend address")]
    MissingBackendAddress {
        kind: &'static str,
        namespace: String,
        name: String,
    },

    #[error(transparent)]
    Route(#[from] vamp_router_controller_core::NotFound),

    #[error("router API request failed: {0}")]
    Router(#[source] anyhow::Error),

    #[error("failed to update status: {0}")]
    Store(#[source] anyhow::Error),
}
