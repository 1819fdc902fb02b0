use super::{missing_address, wrong_kind, RoutingConfig, RoutingResolver};
use crate::Result;
use tracing::debug;
use vamp_router_controller_core::HTTP_PORT;
use vamp_router_controller_k8s_api::{
    BackendObject, LoadBalancerIngress, LoadBalancerStatus, Service,
};

const LOAD_BALANCER: &str = "LoadBalancer";

/// Routes `LoadBalancer` services that expose port 80 to their cluster IP.
#[derive(Clone, Debug)]
pub struct ServiceResolver {
    config: RoutingConfig,
}

// === impl ServiceResolver ===

impl ServiceResolver {
    pub fn new(config: RoutingConfig) -> Self {
        Self { config }
    }

    fn service<'o>(&self, object: &'o BackendObject) -> Result<&'o Service> {
        match object {
            BackendObject::Service(svc) => Ok(&**svc),
            _ => Err(wrong_kind(BackendObject::SERVICE, object)),
        }
    }
}

impl RoutingResolver for ServiceResolver {
    fn kind(&self) -> &'static str {
        BackendObject::SERVICE
    }

    fn should_handle(&self, object: &BackendObject) -> bool {
        let Ok(svc) = self.service(object) else {
            debug!(kind = object.kind(), "Ignoring non-Service object");
            return false;
        };
        let spec = svc.spec.as_ref();

        if spec.and_then(|s| s.type_.as_deref()) != Some(LOAD_BALANCER) {
            debug!(
                namespace = object.namespace().unwrap_or_default(),
                name = object.name(),
                "Skipping Service that is not a LoadBalancer"
            );
            return false;
        }

        let exposes_http = spec
            .and_then(|s| s.ports.as_ref())
            .into_iter()
            .flatten()
            .any(|p| p.port == i32::from(HTTP_PORT));
        if !exposes_http {
            debug!(
                namespace = object.namespace().unwrap_or_default(),
                name = object.name(),
                "Skipping Service that does not expose port 80; other ports are not supported"
            );
            return false;
        }

        true
    }

    fn route_name(&self, object: &BackendObject) -> Result<String> {
        self.service(object)?;
        self.config.route_name(object)
    }

    fn backend_address(&self, object: &BackendObject) -> Result<String> {
        self.service(object)?
            .spec
            .as_ref()
            .and_then(|spec| spec.cluster_ip.as_deref())
            .filter(|ip| !ip.is_empty() && !ip.eq_ignore_ascii_case("none"))
            .map(ToString::to_string)
            .ok_or_else(|| missing_address(object))
    }

    fn domain_names(&self, object: &BackendObject) -> Result<Vec<String>> {
        self.service(object)?;
        self.config.domain_names(object)
    }

    fn has_public_address(&self, object: &BackendObject) -> Result<bool> {
        let has_address = self
            .service(object)?
            .status
            .as_ref()
            .and_then(|status| status.load_balancer.as_ref())
            .and_then(|lb| lb.ingress.as_ref())
            .is_some_and(|ingress| !ingress.is_empty());
        Ok(has_address)
    }

    /// Publishes the primary domain as the service's load-balancer hostname.
    fn apply_domain_names(&self, object: &mut BackendObject, domains: &[String]) -> Result<()> {
        let BackendObject::Service(svc) = object else {
            return Err(wrong_kind(BackendObject::SERVICE, object));
        };
        let Some(primary) = domains.first() else {
            return Ok(());
        };

        let load_balancer = LoadBalancerStatus {
            ingress: Some(vec![LoadBalancerIngress {
                hostname: Some(primary.clone()),
                ..Default::default()
            }]),
        };
        svc.status.get_or_insert_with(Default::default).load_balancer = Some(load_balancer);
        Ok(())
    }
}
