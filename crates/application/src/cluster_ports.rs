use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mapr_ticket_core::AppResult;
use mapr_ticket_domain::{ClusterSecret, PersistentVolume, PersistentVolumeClaim, Ticket};

/// Read-only port onto the orchestrator's object store.
///
/// Every method is one bounded list call. `namespace` equal to
/// `NAMESPACE_ALL` lists across all namespaces.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Lists secrets in a namespace scope.
    async fn list_secrets(&self, namespace: &str) -> AppResult<Vec<ClusterSecret>>;

    /// Lists persistent volumes cluster-wide.
    async fn list_volumes(&self) -> AppResult<Vec<PersistentVolume>>;

    /// Lists persistent volume claims in a namespace scope.
    async fn list_claims(&self, namespace: &str) -> AppResult<Vec<PersistentVolumeClaim>>;
}

/// Decoder of raw ticket payloads.
///
/// Pure over its input: no I/O, and the sole authority on whether a payload
/// is a ticket.
pub trait TicketDecoder: Send + Sync {
    /// Decodes one payload, returning `AppError::Decode` on malformed input.
    fn decode(&self, payload: &[u8]) -> AppResult<Ticket>;
}

/// Wall clock used for expiry predicates.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the process wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
