#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod annotations;
mod event;
mod object;

pub use self::{event::Event, object::BackendObject};
pub use k8s_openapi::NamespaceResourceScope;
pub use k8s_openapi::api::{
    self,
    core::v1::{
        LoadBalancerIngress, LoadBalancerStatus, Service, ServicePort, ServiceSpec, ServiceStatus,
    },
    networking::v1::{
        Ingress, IngressBackend, IngressLoadBalancerIngress, IngressLoadBalancerStatus,
        IngressServiceBackend, IngressSpec, IngressStatus,
    },
};
pub use kube::{
    api::{Api, ObjectMeta, Patch, PatchParams, ResourceExt},
    runtime::watcher,
    Client, Error, Resource,
};
