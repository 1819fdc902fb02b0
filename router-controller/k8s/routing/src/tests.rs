
use crate::{ReconcileMetrics, Reconciler, RoutingConfig, ServiceResolver, StatusStore};
use anyhow::{bail, Result};
use maplit::btreemap;
use parking_lot::Mutex;
use std::sync::Arc;
use vamp_router_controller_core::{Route, RouterApi};
use vamp_router_controller_k8s_api::{
    annotations, BackendObject, Ingress, IngressBackend, IngressServiceBackend, IngressSpec,
    ObjectMeta, Service, ServicePort, ServiceSpec,
};

const ROOT_DOMAIN: &str = "example.com";

/// An in-memory proxy that counts the calls made against it.
#[derive(Clone, Default)]
struct FakeRouter(Arc<Mutex<RouterState>>);

#[derive(Default)]
struct RouterState {
    route: Option<Route>,
    gets: usize,
    creates: usize,
    replaces: usize,
    fail_create: bool,
    fail_replace: bool,
}

/// An in-memory object store recording every status update.
#[derive(Clone, Default)]
struct FakeStore(Arc<Mutex<StoreState>>);

#[derive(Default)]
struct StoreState {
    updates: Vec<BackendObject>,
    fail: bool,
}

// === impl FakeRouter ===

impl FakeRouter {
    fn with_route(route: Route) -> Self {
        let router = Self::default();
        router.0.lock().route = Some(route);
        router
    }

    fn route(&self) -> Route {
        self.0.lock().route.clone().expect("route must exist")
    }

    /// The number of calls that changed the proxy's configuration.
    fn mutations(&self) -> usize {
        let state = self.0.lock();
        state.creates + state.replaces
    }

    fn gets(&self) -> usize {
        self.0.lock().gets
    }

    fn creates(&self) -> usize {
        self.0.lock().creates
    }

    fn replaces(&self) -> usize {
        self.0.lock().replaces
    }

    fn fail_create(&self) {
        self.0.lock().fail_create = true;
    }

    fn fail_replace(&self) {
        self.0.lock().fail_replace = true;
    }
}

#[async_trait::async_trait]
impl RouterApi for FakeRouter {
    async fn get_route(&self, name: &str) -> Result<Option<Route>> {
        let mut state = self.0.lock();
        state.gets += 1;
        Ok(state.route.clone().filter(|r| r.name == name))
    }

    async fn create_route(&self, route: &Route) -> Result<Route> {
        let mut state = self.0.lock();
        if state.fail_create {
            bail!("create refused");
        }
        state.creates += 1;
        state.route = Some(route.clone());
        Ok(route.clone())
    }

    async fn replace_route(&self, route: &Route) -> Result<Route> {
        let mut state = self.0.lock();
        if state.fail_replace {
            bail!("replace refused");
        }
        state.replaces += 1;
        state.route = Some(route.clone());
        Ok(route.clone())
    }
}

// === impl FakeStore ===

impl FakeStore {
    fn updates(&self) -> Vec<BackendObject> {
        self.0.lock().updates.clone()
    }

    fn fail(&self) {
        self.0.lock().fail = true;
    }
}

#[async_trait::async_trait]
impl StatusStore for FakeStore {
    async fn update_status(&self, object: &BackendObject) -> Result<()> {
        let mut state = self.0.lock();
        if state.fail {
            bail!("update refused");
        }
        state.updates.push(object.clone());
        Ok(())
    }
}

fn config() -> RoutingConfig {
    RoutingConfig::new(ROOT_DOMAIN)
}

fn mk_reconciler<R>(
    resolver: R,
    router: &FakeRouter,
    store: &FakeStore,
) -> Reconciler<R, FakeRouter, FakeStore>
where
    R: crate::RoutingResolver,
{
    Reconciler::new(
        resolver,
        router.clone(),
        store.clone(),
        ReconcileMetrics::register(&mut Default::default()),
    )
}

fn mk_service_reconciler(
    router: &FakeRouter,
    store: &FakeStore,
) -> Reconciler<ServiceResolver, FakeRouter, FakeStore> {
    mk_reconciler(ServiceResolver::new(config()), router, store)
}

fn mk_meta(ns: &str, name: &str) -> ObjectMeta {
    ObjectMeta {
        namespace: Some(ns.to_string()),
        name: Some(name.to_string()),
        ..Default::default()
    }
}

/// A `LoadBalancer` service exposing port 80.
fn mk_service(ns: &str, name: &str, cluster_ip: &str) -> Service {
    Service {
        metadata: mk_meta(ns, name),
        spec: Some(ServiceSpec {
            type_: Some("LoadBalancer".to_string()),
            cluster_ip: Some(cluster_ip.to_string()),
            ports: Some(vec![ServicePort {
                port: 80,
                ..Default::default()
            }]),
            ..Default::default()
        }),
        status: None,
    }
}

fn with_extra_hosts(mut svc: Service, hosts: &str) -> Service {
    svc.metadata.annotations = Some(btreemap! {
        annotations::REVERSE_PROXY.to_string() => hosts.to_string(),
    });
    svc
}

fn mk_ingress(ns: &str, name: &str, class: &str, backend: &str) -> Ingress {
    let mut metadata = mk_meta(ns, name);
    metadata.annotations = Some(btreemap! {
        annotations::INGRESS_CLASS.to_string() => class.to_string(),
    });
    Ingress {
        metadata,
        spec: Some(IngressSpec {
            default_backend: Some(IngressBackend {
                service: Some(IngressServiceBackend {
                    name: backend.to_string(),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }),
        status: None,
    }
}
