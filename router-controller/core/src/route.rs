use crate::{dns_identifier, HTTP_PORT, HTTP_ROUTE_NAME};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// A listener configuration on the proxy.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Route {
    pub name: String,
    pub port: u16,
    pub protocol: Protocol,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub filters: Vec<Filter>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub services: Vec<BackendService>,

    /// Fields this controller does not manage, preserved so that replacing
    /// the route does not reset them.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Tcp,
}

/// A host-match rule directing requests to a backend service.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Filter {
    pub name: String,
    pub condition: String,
    pub destination: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct BackendService {
    pub name: String,
    #[serde(default)]
    pub weight: u32,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub servers: Vec<Server>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Server {
    pub name: String,
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("route {route} has no service named {service}")]
pub struct NotFound {
    pub route: String,
    pub service: String,
}

// === impl Route ===

impl Route {
    /// The route created when the proxy has none: port 80, HTTP, no filters
    /// or services.
    pub fn http() -> Self {
        Self {
            name: HTTP_ROUTE_NAME.to_string(),
            port: HTTP_PORT,
            protocol: Protocol::Http,
            filters: Vec::new(),
            services: Vec::new(),
            extra: Default::default(),
        }
    }

    pub fn filter(&self, name: &str) -> Option<&Filter> {
        self.filters.iter().find(|f| f.name == name)
    }

    pub fn service(&self, name: &str) -> Option<&BackendService> {
        self.services.iter().find(|s| s.name == name)
    }

    /// Replaces the service named `name` in place.
    pub fn replace_service(&mut self, name: &str, service: BackendService) -> Result<(), NotFound> {
        match self.services.iter_mut().find(|s| s.name == name) {
            Some(existing) => {
                *existing = service;
                Ok(())
            }
            None => Err(NotFound {
                route: self.name.clone(),
                service: name.to_string(),
            }),
        }
    }

    /// Ensures that a backend service named `name` exists and points at
    /// exactly one server on `host`.
    ///
    /// Any server list other than a single server with the expected host is
    /// replaced outright. Returns true if the route was modified.
    pub fn ensure_backend(&mut self, name: &str, host: &str) -> Result<bool, NotFound> {
        let mut changed = false;
        let current = match self.service(name) {
            Some(service) => service.clone(),
            None => {
                self.services.push(BackendService::new(name));
                changed = true;
                BackendService::new(name)
            }
        };

        if current.has_single_server(host) {
            return Ok(changed);
        }

        let service = BackendService {
            servers: vec![Server::http(name, host)],
            ..current
        };
        self.replace_service(name, service)?;
        Ok(true)
    }

    /// Ensures that a filter routes `domain` to the `destination` service.
    ///
    /// The filter is identified by the domain alone; an existing filter is
    /// left untouched even if its destination differs. Returns true if a
    /// filter was added.
    pub fn ensure_filter(&mut self, domain: &str, destination: &str) -> bool {
        let name = dns_identifier(domain);
        if self.filter(&name).is_some() {
            return false;
        }

        self.filters.push(Filter {
            name,
            condition: Filter::host_condition(domain),
            destination: destination.to_string(),
        });
        true
    }
}

// === impl Filter ===

impl Filter {
    /// Matches the `Host` header case-insensitively.
    pub fn host_condition(domain: &str) -> String {
        format!("hdr(Host) -i {domain}")
    }
}

// === impl BackendService ===

impl BackendService {
    pub fn new(name: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            weight: 0,
            servers: Vec::new(),
        }
    }

    fn has_single_server(&self, host: &str) -> bool {
        matches!(self.servers.as_slice(), [server] if server.host == host)
    }
}

// === impl Server ===

impl Server {
    pub fn http(name: impl ToString, host: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            host: host.to_string(),
            port: HTTP_PORT,
        }
    }
}

/// The proxy encodes empty lists as `null`.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn route_with_backend(host: &str) -> Route {
        let mut route = Route::http();
        route.ensure_backend("ns1.svc-a", host).unwrap();
        route.ensure_filter("ns1.svc-a.example.com", "ns1.svc-a");
        route
    }

    #[test]
    fn lookups() {
        let route = route_with_backend("10.0.0.5");
        assert!(route.service("ns1.svc-a").is_some());
        assert!(route.service("ns1.svc-b").is_none());
        assert!(route.filter("ns1.svc-a.example.com").is_some());
        assert!(route.filter("ns1.svc-a").is_none());
    }

    #[test]
    fn replace_missing_service() {
        let mut route = Route::http();
        let err = route
            .replace_service("nope", BackendService::new("nope"))
            .unwrap_err();
        assert_eq!(
            err,
            NotFound {
                route: "http".to_string(),
                service: "nope".to_string(),
            }
        );
        assert!(route.services.is_empty());
    }

    #[test]
    fn replace_service_in_place() {
        let mut route = Route::http();
        route.services.push(BackendService::new("a"));
        route.services.push(BackendService::new("b"));

        let mut b = BackendService::new("b");
        b.weight = 3;
        route.replace_service("b", b.clone()).unwrap();
        assert_eq!(route.services, vec![BackendService::new("a"), b]);
    }

    #[test]
    fn ensure_backend_creates_single_server() {
        let mut route = Route::http();
        assert!(route.ensure_backend("ns1.svc-a", "10.0.0.5").unwrap());
        assert_eq!(
            route.services,
            vec![BackendService {
                name: "ns1.svc-a".to_string(),
                weight: 0,
                servers: vec![Server {
                    name: "ns1.svc-a".to_string(),
                    host: "10.0.0.5".to_string(),
                    port: 80,
                }],
            }]
        );
    }

    #[test]
    fn ensure_backend_is_idempotent() {
        let mut route = route_with_backend("10.0.0.5");
        let before = route.clone();
        assert!(!route.ensure_backend("ns1.svc-a", "10.0.0.5").unwrap());
        assert_eq!(route, before);
    }

    #[test]
    fn ensure_backend_replaces_changed_host() {
        let mut route = route_with_backend("10.0.0.5");
        assert!(route.ensure_backend("ns1.svc-a", "10.0.0.9").unwrap());

        let service = route.service("ns1.svc-a").unwrap();
        assert_eq!(service.servers, vec![Server::http("ns1.svc-a", "10.0.0.9")]);
    }

    #[test]
    fn ensure_backend_collapses_multiple_servers() {
        let mut route = Route::http();
        route.services.push(BackendService {
            name: "ns1.svc-a".to_string(),
            weight: 7,
            servers: vec![
                Server::http("ns1.svc-a", "10.0.0.5"),
                Server::http("other", "10.0.0.6"),
            ],
        });

        assert!(route.ensure_backend("ns1.svc-a", "10.0.0.5").unwrap());
        let service = route.service("ns1.svc-a").unwrap();
        assert_eq!(service.weight, 7);
        assert_eq!(service.servers, vec![Server::http("ns1.svc-a", "10.0.0.5")]);
    }

    #[test]
    fn ensure_backend_fills_empty_service() {
        let mut route = Route::http();
        route.services.push(BackendService::new("ns1.svc-a"));

        assert!(route.ensure_backend("ns1.svc-a", "10.0.0.5").unwrap());
        assert_eq!(route.services.len(), 1);
        assert_eq!(route.services[0].servers.len(), 1);
    }

    #[test]
    fn ensure_filter_never_modifies_existing() {
        let mut route = route_with_backend("10.0.0.5");
        let filter = route.filter("ns1.svc-a.example.com").cloned().unwrap();
        assert_eq!(filter.condition, "hdr(Host) -i ns1.svc-a.example.com");
        assert_eq!(filter.destination, "ns1.svc-a");

        assert!(!route.ensure_filter("ns1.svc-a.example.com", "somewhere-else"));
        assert_eq!(route.filters, vec![filter]);
    }

    #[test]
    fn ensure_filter_uses_identifier_for_long_domains() {
        let domain = format!("{}.example.com", "d".repeat(60));
        let mut route = Route::http();
        assert!(route.ensure_filter(&domain, "svc"));

        let filter = &route.filters[0];
        assert_eq!(filter.name.len(), 63);
        assert_eq!(filter.name, dns_identifier(&domain));
        assert_eq!(filter.condition, format!("hdr(Host) -i {domain}"));
        assert!(!route.ensure_filter(&domain, "svc"));
    }

    #[test]
    fn decodes_null_lists() {
        let route: Route = serde_json::from_str(
            r#"{"name":"http","port":80,"protocol":"http","filters":null,"services":null}"#,
        )
        .unwrap();
        assert_eq!(route, Route::http());

        let service: BackendService =
            serde_json::from_str(r#"{"name":"svc","weight":0,"servers":null}"#).unwrap();
        assert_eq!(service, BackendService::new("svc"));
    }

    #[test]
    fn preserves_unknown_fields() {
        let json = serde_json::json!({
            "name": "http",
            "port": 80,
            "protocol": "http",
            "httpQuota": { "sampleWindow": "1s", "rate": 10000, "expiryTime": "10s" },
            "filters": [],
            "services": [],
        });
        let route: Route = serde_json::from_value(json.clone()).unwrap();
        assert!(route.extra.contains_key("httpQuota"));
        assert_eq!(serde_json::to_value(&route).unwrap(), json);
    }

    #[test]
    fn encodes_wire_format() {
        let route = route_with_backend("10.0.0.5");
        assert_eq!(
            serde_json::to_value(&route).unwrap(),
            serde_json::json!({
                "name": "http",
                "port": 80,
                "protocol": "http",
                "filters": [{
                    "name": "ns1.svc-a.example.com",
                    "condition": "hdr(Host) -i ns1.svc-a.example.com",
                    "destination": "ns1.svc-a",
                }],
                "services": [{
                    "name": "ns1.svc-a",
                    "weight": 0,
                    "servers": [{ "name": "ns1.svc-a", "host": "10.0.0.5", "port": 80 }],
                }],
            })
        );
    }
}
