mod ingress;
mod service;

pub use self::{ingress::IngressResolver, service::ServiceResolver};
use crate::{Error, Result};
use vamp_router_controller_core::dns_identifier;
use vamp_router_controller_k8s_api::{annotations, BackendObject};

/// Extracts the routing intent of one kind of backend object.
///
/// Every method other than `should_handle` fails with [`Error::WrongKind`]
/// when given an object of another kind.
pub trait RoutingResolver: Send + Sync {
    /// The kind of object this resolver handles.
    fn kind(&self) -> &'static str;

    /// Indicates whether the object should be routed at all.
    fn should_handle(&self, object: &BackendObject) -> bool;

    /// The name of the object's backend service on the proxy.
    fn route_name(&self, object: &BackendObject) -> Result<String>;

    /// The address the proxy forwards to.
    fn backend_address(&self, object: &BackendObject) -> Result<String>;

    /// Public hostnames routed to the object. The first is the primary
    /// domain.
    fn domain_names(&self, object: &BackendObject) -> Result<Vec<String>>;

    /// Indicates whether the object's status already exposes a public
    /// address.
    fn has_public_address(&self, object: &BackendObject) -> Result<bool>;

    /// Records the domain names in the object's status.
    fn apply_domain_names(&self, object: &mut BackendObject, domains: &[String]) -> Result<()>;
}

/// Naming configuration shared by all resolvers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutingConfig {
    /// The domain under which default hostnames are generated.
    pub root_domain: String,

    /// Joins an object's namespace and name in its route name.
    pub domain_separator: String,

    /// The cluster's DNS domain, used to address services.
    pub cluster_domain: String,
}

// === impl RoutingConfig ===

impl RoutingConfig {
    pub fn new(root_domain: impl AsRef<str>) -> Self {
        Self {
            root_domain: root_domain.as_ref().trim_matches('.').to_string(),
            domain_separator: ".".to_string(),
            cluster_domain: "cluster.local".to_string(),
        }
    }

    pub fn with_domain_separator(self, domain_separator: impl ToString) -> Self {
        Self {
            domain_separator: domain_separator.to_string(),
            ..self
        }
    }

    pub fn with_cluster_domain(self, cluster_domain: impl AsRef<str>) -> Self {
        Self {
            cluster_domain: cluster_domain.as_ref().trim_matches('.').to_string(),
            ..self
        }
    }

    /// `<namespace><separator><name>`, bounded by the identifier codec.
    fn route_name(&self, object: &BackendObject) -> Result<String> {
        let namespace = namespace(object)?;
        let name = format!("{}{}{}", namespace, self.domain_separator, object.name());
        Ok(dns_identifier(&name))
    }

    /// The generated hostname followed by any annotated hostnames.
    fn domain_names(&self, object: &BackendObject) -> Result<Vec<String>> {
        let route_name = self.route_name(object)?;
        let mut domains = vec![format!("{}.{}", route_name, self.root_domain)];
        for domain in annotations::extra_domain_names(object.annotations()) {
            if !domains.contains(&domain) {
                domains.push(domain);
            }
        }
        Ok(domains)
    }
}

fn namespace(object: &BackendObject) -> Result<&str> {
    object.namespace().ok_or_else(|| Error::MissingNamespace {
        kind: object.kind(),
        name: object.name().to_string(),
    })
}

fn wrong_kind(resolver: &'static str, object: &BackendObject) -> Error {
    Error::WrongKind {
        resolver,
        found: object.kind(),
    }
}

fn missing_address(object: &BackendObject) -> Error {
    Error::MissingBackendAddress {
        kind: object.kind(),
        namespace: object.namespace().unwrap_or_default().to_string(),
        name: object.name().to_string(),
    }
}
