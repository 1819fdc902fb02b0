#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod ident;
pub mod route;

pub use self::{
    ident::dns_identifier,
    route::{BackendService, Filter, NotFound, Protocol, Route, Server},
};
use anyhow::Result;

/// The name of the single route managed on the proxy.
pub const HTTP_ROUTE_NAME: &str = "http";

/// The only port exposed by the managed route and by backend servers.
pub const HTTP_PORT: u16 = 80;

/// Models the proxy's route management API.
///
/// Each call is a single request against the proxy; implementations do not
/// retry.
#[async_trait::async_trait]
pub trait RouterApi {
    /// Fetches a route by name, returning `None` if the proxy does not know it.
    async fn get_route(&self, name: &str) -> Result<Option<Route>>;

    async fn create_route(&self, route: &Route) -> Result<Route>;

    /// Replaces the whole route resource.
    async fn replace_route(&self, route: &Route) -> Result<Route>;
}
