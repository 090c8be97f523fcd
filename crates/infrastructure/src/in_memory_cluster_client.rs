use async_trait::async_trait;
use mapr_ticket_application::ClusterClient;
use mapr_ticket_core::AppResult;
use mapr_ticket_domain::{ClusterSecret, NAMESPACE_ALL, PersistentVolume, PersistentVolumeClaim};
use tokio::sync::RwLock;

/// In-memory cluster snapshot used for offline listing.
#[derive(Debug, Default)]
pub struct InMemoryClusterClient {
    secrets: RwLock<Vec<ClusterSecret>>,
    volumes: RwLock<Vec<PersistentVolume>>,
    claims: RwLock<Vec<PersistentVolumeClaim>>,
}

impl InMemoryClusterClient {
    /// Creates an empty cluster snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a secret, replacing any secret with the same reference.
    pub async fn insert_secret(&self, secret: ClusterSecret) {
        let mut secrets = self.secrets.write().await;
        secrets.retain(|existing| existing.secret_ref() != secret.secret_ref());
        secrets.push(secret);
    }

    /// Stores a volume, replacing any volume with the same name.
    pub async fn insert_volume(&self, volume: PersistentVolume) {
        let mut volumes = self.volumes.write().await;
        volumes.retain(|existing| existing.name() != volume.name());
        volumes.push(volume);
    }

    /// Stores a claim, replacing any claim with the same reference.
    pub async fn insert_claim(&self, claim: PersistentVolumeClaim) {
        let mut claims = self.claims.write().await;
        claims.retain(|existing| existing.claim_ref() != claim.claim_ref());
        claims.push(claim);
    }
}

fn in_namespace(namespace: &str, object_namespace: &str) -> bool {
    namespace == NAMESPACE_ALL || namespace == object_namespace
}

#[async_trait]
impl ClusterClient for InMemoryClusterClient {
    async fn list_secrets(&self, namespace: &str) -> AppResult<Vec<ClusterSecret>> {
        Ok(self
            .secrets
            .read()
            .await
            .iter()
            .filter(|secret| in_namespace(namespace, secret.secret_ref().namespace()))
            .cloned()
            .collect())
    }

    async fn list_volumes(&self) -> AppResult<Vec<PersistentVolume>> {
        Ok(self.volumes.read().await.clone())
    }

    async fn list_claims(&self, namespace: &str) -> AppResult<Vec<PersistentVolumeClaim>> {
        Ok(self
            .claims
            .read()
            .await
            .iter()
            .filter(|claim| in_namespace(namespace, claim.claim_ref().namespace()))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests;
