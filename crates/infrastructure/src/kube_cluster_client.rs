use async_trait::async_trait;
use k8s_openapi::api::core::v1::{
    PersistentVolume as KubePersistentVolume, PersistentVolumeClaim as KubePersistentVolumeClaim,
    Secret,
};
use kube::api::ListParams;
use kube::{Api, Client, Resource};
use mapr_ticket_application::ClusterClient;
use mapr_ticket_core::{AppError, AppResult};
use mapr_ticket_domain::{ClusterSecret, NAMESPACE_ALL, PersistentVolume, PersistentVolumeClaim};
use serde::de::DeserializeOwned;
use tracing::debug;

mod conversion;

use conversion::{claim_from_kube, secret_from_kube, volume_from_kube};

/// Kubernetes API backed cluster client.
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
}

impl KubeClusterClient {
    /// Creates a cluster client from an established Kubernetes client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a cluster client from the ambient kubeconfig or in-cluster
    /// service account.
    pub async fn try_default() -> AppResult<Self> {
        let client = Client::try_default().await.map_err(|error| {
            AppError::Cluster(format!("failed to configure Kubernetes client: {error}"))
        })?;

        Ok(Self::new(client))
    }

    fn scoped_api<K>(&self, namespace: &str) -> Api<K>
    where
        K: Resource<Scope = k8s_openapi::NamespaceResourceScope>,
        <K as Resource>::DynamicType: Default,
    {
        if namespace == NAMESPACE_ALL {
            Api::all(self.client.clone())
        } else {
            Api::namespaced(self.client.clone(), namespace)
        }
    }
}

async fn list_all<K>(api: Api<K>, kind: &str) -> AppResult<Vec<K>>
where
    K: Resource + Clone + DeserializeOwned + std::fmt::Debug,
{
    let objects = api
        .list(&ListParams::default())
        .await
        .map_err(|error| AppError::Cluster(format!("failed to list {kind}: {error}")))?;

    debug!(kind, count = objects.items.len(), "listed cluster objects");

    Ok(objects.items)
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    async fn list_secrets(&self, namespace: &str) -> AppResult<Vec<ClusterSecret>> {
        let secrets = list_all(self.scoped_api::<Secret>(namespace), "secrets").await?;
        Ok(secrets.into_iter().map(secret_from_kube).collect())
    }

    async fn list_volumes(&self) -> AppResult<Vec<PersistentVolume>> {
        let api: Api<KubePersistentVolume> = Api::all(self.client.clone());
        let volumes = list_all(api, "persistentvolumes").await?;
        Ok(volumes.into_iter().map(volume_from_kube).collect())
    }

    async fn list_claims(&self, namespace: &str) -> AppResult<Vec<PersistentVolumeClaim>> {
        let claims = list_all(
            self.scoped_api::<KubePersistentVolumeClaim>(namespace),
            "persistentvolumeclaims",
        )
        .await?;
        Ok(claims.into_iter().map(claim_from_kube).collect())
    }
}
