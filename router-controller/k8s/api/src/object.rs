use crate::{Ingress, ObjectMeta, ResourceExt, Service};
use std::collections::BTreeMap;

/// A watched resource that may produce routing configuration.
///
/// The variant is fixed by the watch that delivered the object.
#[derive(Clone, Debug, PartialEq)]
pub enum BackendObject {
    Service(Box<Service>),
    Ingress(Box<Ingress>),
}

// === impl BackendObject ===

impl BackendObject {
    pub const SERVICE: &'static str = "Service";
    pub const INGRESS: &'static str = "Ingress";

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Service(_) => Self::SERVICE,
            Self::Ingress(_) => Self::INGRESS,
        }
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Self::Service(svc) => &svc.metadata,
            Self::Ingress(ing) => &ing.metadata,
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.metadata().namespace.as_deref()
    }

    pub fn name(&self) -> &str {
        self.metadata().name.as_deref().unwrap_or_default()
    }

    pub fn annotations(&self) -> &BTreeMap<String, String> {
        match self {
            Self::Service(svc) => svc.annotations(),
            Self::Ingress(ing) => ing.annotations(),
        }
    }
}

impl From<Service> for BackendObject {
    fn from(svc: Service) -> Self {
        Self::Service(Box::new(svc))
    }
}

impl From<Ingress> for BackendObject {
    fn from(ing: Ingress) -> Self {
        Self::Ingress(Box::new(ing))
    }
}
