use super::{missing_address, namespace, wrong_kind, RoutingConfig, RoutingResolver};
use crate::Result;
use tracing::debug;
use vamp_router_controller_k8s_api::{
    annotations, BackendObject, Ingress, IngressLoadBalancerIngress, IngressLoadBalancerStatus,
};

/// Routes ingresses of a given class to their default backend service.
#[derive(Clone, Debug)]
pub struct IngressResolver {
    config: RoutingConfig,
    class: String,
}

// === impl IngressResolver ===

impl IngressResolver {
    pub fn new(config: RoutingConfig, class: impl ToString) -> Self {
        Self {
            config,
            class: class.to_string(),
        }
    }

    fn ingress<'o>(&self, object: &'o BackendObject) -> Result<&'o Ingress> {
        match object {
            BackendObject::Ingress(ing) => Ok(&**ing),
            _ => Err(wrong_kind(BackendObject::INGRESS, object)),
        }
    }
}

impl RoutingResolver for IngressResolver {
    fn kind(&self) -> &'static str {
        BackendObject::INGRESS
    }

    /// Handles ingresses whose class annotation or `ingressClassName` matches
    /// the configured class.
    fn should_handle(&self, object: &BackendObject) -> bool {
        let Ok(ing) = self.ingress(object) else {
            debug!(kind = object.kind(), "Ignoring non-Ingress object");
            return false;
        };

        let annotated = object.annotations().get(annotations::INGRESS_CLASS);
        let class_name = ing
            .spec
            .as_ref()
            .and_then(|spec| spec.ingress_class_name.as_ref());
        if annotated == Some(&self.class) || class_name == Some(&self.class) {
            return true;
        }

        debug!(
            namespace = object.namespace().unwrap_or_default(),
            name = object.name(),
            class = %self.class,
            "Skipping Ingress of another class"
        );
        false
    }

    fn route_name(&self, object: &BackendObject) -> Result<String> {
        self.ingress(object)?;
        self.config.route_name(object)
    }

    /// The cluster DNS name of the ingress's default backend service.
    fn backend_address(&self, object: &BackendObject) -> Result<String> {
        let service = self
            .ingress(object)?
            .spec
            .as_ref()
            .and_then(|spec| spec.default_backend.as_ref())
            .and_then(|backend| backend.service.as_ref())
            .map(|svc| svc.name.as_str())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| missing_address(object))?;

        Ok(format!(
            "{}.{}.svc.{}",
            service,
            namespace(object)?,
            self.config.cluster_domain
        ))
    }

    fn domain_names(&self, object: &BackendObject) -> Result<Vec<String>> {
        self.ingress(object)?;
        self.config.domain_names(object)
    }

    fn has_public_address(&self, object: &BackendObject) -> Result<bool> {
        let has_address = self
            .ingress(object)?
            .status
            .as_ref()
            .and_then(|status| status.load_balancer.as_ref())
            .and_then(|lb| lb.ingress.as_ref())
            .is_some_and(|ingress| !ingress.is_empty());
        Ok(has_address)
    }

    /// Publishes every domain as a load-balancer hostname, primary first.
    fn apply_domain_names(&self, object: &mut BackendObject, domains: &[String]) -> Result<()> {
        let BackendObject::Ingress(ing) = object else {
            return Err(wrong_kind(BackendObject::INGRESS, object));
        };

        let load_balancer = IngressLoadBalancerStatus {
            ingress: Some(
                domains
                    .iter()
                    .map(|domain| IngressLoadBalancerIngress {
                        hostname: Some(domain.clone()),
                        ..Default::default()
                    })
                    .collect(),
            ),
        };
        ing.status.get_or_insert_with(Default::default).load_balancer = Some(load_balancer);
        Ok(())
    }
}
