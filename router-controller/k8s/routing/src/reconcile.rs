use crate::{Error, ReconcileMetrics, Result, RoutingResolver, StatusStore};
use tracing::{debug, info};
use vamp_router_controller_core::{dns_identifier, Route, RouterApi, HTTP_ROUTE_NAME};
use vamp_router_controller_k8s_api::BackendObject;

/// Applies the routing intent of one backend object at a time to the proxy's
/// `http` route.
///
/// Each call fetches the whole route, changes a private copy, and replaces
/// the whole route only if something changed. Nothing is retried or rolled
/// back: the first failure aborts the call, and a later event for the same
/// object reconciles it again.
pub struct Reconciler<R, P, S> {
    resolver: R,
    router: P,
    store: S,
    metrics: ReconcileMetrics,
}

// === impl Reconciler ===

impl<R, P, S> Reconciler<R, P, S>
where
    R: RoutingResolver,
    P: RouterApi + Send + Sync,
    S: StatusStore + Send + Sync,
{
    pub fn new(resolver: R, router: P, store: S, metrics: ReconcileMetrics) -> Self {
        Self {
            resolver,
            router,
            store,
            metrics,
        }
    }

    pub fn should_handle(&self, object: &BackendObject) -> bool {
        self.resolver.should_handle(object)
    }

    /// Brings the proxy route in line with `object` and publishes its primary
    /// domain in the object's status.
    pub async fn reconcile(&self, object: &mut BackendObject) -> Result<()> {
        let kind = self.resolver.kind();
        self.metrics.reconcile(kind);

        let res = async {
            let domains = self.update_route_if_needed(object).await?;
            self.write_back(object, &domains).await
        }
        .await;

        if res.is_err() {
            self.metrics.error(kind);
        }
        res
    }

    /// Removing an object's filters and backend service is not supported:
    /// routes outlive the objects that created them.
    pub fn remove_routing(&self, object: &BackendObject) {
        info!(
            kind = object.kind(),
            namespace = object.namespace().unwrap_or_default(),
            name = object.name(),
            "Object deleted; leaving its routes in place"
        );
    }

    /// Ensures the object's backend service and filters exist, replacing the
    /// route if either changed. Returns the object's domain names.
    async fn update_route_if_needed(&self, object: &BackendObject) -> Result<Vec<String>> {
        let mut route = self.get_or_create_http_route().await?;

        let route_name = self.resolver.route_name(object)?;
        let address = self.resolver.backend_address(object)?;
        let mut updated = route.ensure_backend(&route_name, &address)?;
        if updated {
            debug!(service = %route_name, %address, "Backend service changed");
        }

        let domains = self.resolver.domain_names(object)?;
        for domain in &domains {
            if route.ensure_filter(domain, &route_name) {
                info!(
                    filter = %dns_identifier(domain),
                    %domain,
                    service = %route_name,
                    "Adding filter"
                );
                updated = true;
            }
        }

        if !updated {
            debug!(route = %route.name, "Route is up to date");
            return Ok(domains);
        }

        self.router
            .replace_route(&route)
            .await
            .map_err(Error::Router)?;
        self.metrics.route_updated(self.resolver.kind());
        info!(route = %route.name, service = %route_name, %address, "Updated route");
        Ok(domains)
    }

    async fn get_or_create_http_route(&self) -> Result<Route> {
        if let Some(route) = self
            .router
            .get_route(HTTP_ROUTE_NAME)
            .await
            .map_err(Error::Router)?
        {
            return Ok(route);
        }

        info!(route = HTTP_ROUTE_NAME, "Creating route");
        self.router
            .create_route(&Route::http())
            .await
            .map_err(Error::Router)
    }

    /// Publishes the domains in the object's status unless it already has a
    /// public address.
    async fn write_back(&self, object: &mut BackendObject, domains: &[String]) -> Result<()> {
        if self.resolver.has_public_address(object)? {
            debug!("Object already has a public address; not updating its status");
            return Ok(());
        }

        self.resolver.apply_domain_names(object, domains)?;
        self.store
            .update_status(object)
            .await
            .map_err(Error::Store)?;
        self.metrics.status_updated(self.resolver.kind());
        info!(
            domain = domains.first().map(String::as_str).unwrap_or_default(),
            "Updated status"
        );
        Ok(())
    }
}
