use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Carries a JSON document listing extra public hostnames for an object.
pub const REVERSE_PROXY: &str = "kubernetesReverseproxy";

/// Selects the controller responsible for an ingress.
pub const INGRESS_CLASS: &str = "kubernetes.io/ingress.class";

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ReverseProxyConfig {
    #[serde(default)]
    pub hosts: Vec<HostConfig>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub host: String,
}

/// Reads the extra hostnames from the reverse-proxy annotation.
///
/// A missing or malformed annotation yields no hostnames.
pub fn extra_domain_names(annotations: &BTreeMap<String, String>) -> Vec<String> {
    let Some(value) = annotations.get(REVERSE_PROXY) else {
        return Vec::new();
    };

    match serde_json::from_str::<ReverseProxyConfig>(value) {
        Ok(ReverseProxyConfig { hosts }) => hosts
            .into_iter()
            .map(|HostConfig { host }| host)
            .filter(|host| !host.is_empty())
            .collect(),
        Err(error) => {
            debug!(%error, annotation = REVERSE_PROXY, "Ignoring malformed annotation");
            Vec::new()
        }
    }
}
