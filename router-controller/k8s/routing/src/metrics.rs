use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{counter::Counter, family::Family},
    registry::Registry,
};

#[derive(Clone, Debug)]
pub struct ReconcileMetrics {
    reconciles: Family<KindLabels, Counter>,
    errors: Family<KindLabels, Counter>,
    route_updates: Family<KindLabels, Counter>,
    status_updates: Family<KindLabels, Counter>,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct KindLabels {
    kind: &'static str,
}

// === impl ReconcileMetrics ===

impl ReconcileMetrics {
    pub fn register(reg: &mut Registry) -> Self {
        let reconciles = Family::default();
        reg.register(
            "reconcile",
            "Count of backend object reconciliations",
            reconciles.clone(),
        );

        let errors = Family::default();
        reg.register(
            "reconcile_errors",
            "Count of backend object reconciliations that failed",
            errors.clone(),
        );

        let route_updates = Family::default();
        reg.register(
            "route_updates",
            "Count of route replacements sent to the proxy",
            route_updates.clone(),
        );

        let status_updates = Family::default();
        reg.register(
            "status_updates",
            "Count of backend object status updates",
            status_updates.clone(),
        );

        Self {
            reconciles,
            errors,
            route_updates,
            status_updates,
        }
    }

    pub(crate) fn reconcile(&self, kind: &'static str) {
        self.reconciles.get_or_create(&KindLabels { kind }).inc();
    }

    pub(crate) fn error(&self, kind: &'static str) {
        self.errors.get_or_create(&KindLabels { kind }).inc();
    }

    pub(crate) fn route_updated(&self, kind: &'static str) {
        self.route_updates.get_or_create(&KindLabels { kind }).inc();
    }

    pub(crate) fn status_updated(&self, kind: &'static str) {
        self.status_updates.get_or_create(&KindLabels { kind }).inc();
    }
}
