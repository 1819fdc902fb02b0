use anyhow::{anyhow, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;
use vamp_router_controller_k8s_api::{
    self as k8s, BackendObject, NamespaceResourceScope, Resource, ResourceExt,
};

const FIELD_MANAGER: &str = "vamp-router-controller";

/// Persists the status of backend objects.
#[async_trait::async_trait]
pub trait StatusStore {
    async fn update_status(&self, object: &BackendObject) -> Result<()>;
}

/// Merge-patches the object's status subresource.
#[async_trait::async_trait]
impl StatusStore for k8s::Client {
    async fn update_status(&self, object: &BackendObject) -> Result<()> {
        match object {
            BackendObject::Service(svc) => patch_status(self, &**svc).await,
            BackendObject::Ingress(ing) => patch_status(self, &**ing).await,
        }
    }
}

async fn patch_status<K>(client: &k8s::Client, resource: &K) -> Result<()>
where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>,
    K: Clone + Debug + DeserializeOwned + Serialize + Send + Sync,
{
    let name = resource.name_any();
    let namespace = resource
        .namespace()
        .ok_or_else(|| anyhow!("{} {} has no namespace", K::kind(&()), name))?;
    let status = serde_json::to_value(resource)?
        .get("status")
        .cloned()
        .unwrap_or_default();

    let api = k8s::Api::<K>::namespaced(client.clone(), &namespace);
    let patch = k8s::Patch::Merge(serde_json::json!({ "status": status }));
    api.patch_status(&name, &k8s::PatchParams::apply(FIELD_MANAGER), &patch)
        .await?;
    tracing::debug!(%namespace, %name, "Patched status");
    Ok(())
}
