use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use mapr_ticket_core::{AppError, AppResult};
use mapr_ticket_domain::{
    CONTAINER_TICKET_KEY, ClaimPhase, ClusterSecret, CsiVolumeSource, NAMESPACE_ALL, ObjectRef,
    PersistentVolume, PersistentVolumeClaim, RECOGNIZED_CSI_DRIVERS, Ticket,
};

use crate::{CancelHandle, Clock, ClusterClient, TicketDecoder};

pub(crate) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_else(|| unreachable!())
}

pub(crate) struct FixedClock(pub(crate) DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Default)]
pub(crate) struct FakeClusterClient {
    pub(crate) secrets: Vec<ClusterSecret>,
    pub(crate) volumes: Vec<PersistentVolume>,
    pub(crate) claims: Vec<PersistentVolumeClaim>,
    pub(crate) secrets_error: Option<AppError>,
    pub(crate) volumes_error: Option<AppError>,
    pub(crate) claims_error: Option<AppError>,
    /// Cancelled once volumes have been listed.
    pub(crate) cancel_after_volumes: Option<CancelHandle>,
    /// Cancelled once claims have been listed.
    pub(crate) cancel_after_claims: Option<CancelHandle>,
    pub(crate) calls: AtomicUsize,
}

impl FakeClusterClient {
    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn in_scope(namespace: &str, object_namespace: &str) -> bool {
    namespace == NAMESPACE_ALL || namespace == object_namespace
}

#[async_trait]
impl ClusterClient for FakeClusterClient {
    async fn list_secrets(&self, namespace: &str) -> AppResult<Vec<ClusterSecret>> {
        self.record_call();
        if let Some(error) = &self.secrets_error {
            return Err(error.clone());
        }

        Ok(self
            .secrets
            .iter()
            .filter(|secret| in_scope(namespace, secret.secret_ref().namespace()))
            .cloned()
            .collect())
    }

    async fn list_volumes(&self) -> AppResult<Vec<PersistentVolume>> {
        self.record_call();
        if let Some(error) = &self.volumes_error {
            return Err(error.clone());
        }

        if let Some(handle) = &self.cancel_after_volumes {
            handle.cancel();
        }
        Ok(self.volumes.clone())
    }

    async fn list_claims(&self, namespace: &str) -> AppResult<Vec<PersistentVolumeClaim>> {
        self.record_call();
        if let Some(error) = &self.claims_error {
            return Err(error.clone());
        }

        if let Some(handle) = &self.cancel_after_claims {
            handle.cancel();
        }
        Ok(self
            .claims
            .iter()
            .filter(|claim| in_scope(namespace, claim.claim_ref().namespace()))
            .cloned()
            .collect())
    }
}

/// Decodes payloads by looking them up in a fixed table.
#[derive(Default)]
pub(crate) struct FakeTicketDecoder {
    tickets: HashMap<Vec<u8>, Ticket>,
}

impl FakeTicketDecoder {
    pub(crate) fn with_ticket(mut self, payload: &str, ticket: Ticket) -> Self {
        self.tickets.insert(payload.as_bytes().to_vec(), ticket);
        self
    }
}

impl TicketDecoder for FakeTicketDecoder {
    fn decode(&self, payload: &[u8]) -> AppResult<Ticket> {
        self.tickets
            .get(payload)
            .cloned()
            .ok_or_else(|| AppError::Decode("unrecognized ticket payload".to_owned()))
    }
}

pub(crate) fn ticket(cluster: &str, user: &str, expiry_offset: Duration) -> Ticket {
    Ticket::new(cluster, now() - Duration::days(30), now() + expiry_offset).with_user(user)
}

pub(crate) fn ticket_secret(namespace: &str, name: &str, payload: &str) -> ClusterSecret {
    ClusterSecret::new(namespace, name)
        .with_data(CONTAINER_TICKET_KEY, payload.as_bytes().to_vec())
}

pub(crate) fn volume(name: &str, driver: &str, mount: (&str, &str)) -> PersistentVolume {
    PersistentVolume::new(name).with_csi(
        CsiVolumeSource::new(driver)
            .with_volume_handle(format!("{name}-handle"))
            .with_volume_attribute("volumePath", format!("/data/{name}"))
            .with_node_publish_secret_ref(ObjectRef::new(mount.0, mount.1)),
    )
}

pub(crate) fn recognized(index: usize) -> &'static str {
    RECOGNIZED_CSI_DRIVERS[index]
}

pub(crate) fn claim(
    namespace: &str,
    name: &str,
    phase: ClaimPhase,
    volume: &str,
) -> PersistentVolumeClaim {
    PersistentVolumeClaim::new(namespace, name, phase).with_volume_name(volume)
}

/// Volumes of the shared listing scenarios: `v1`..`v5`.
pub(crate) fn scenario_volumes() -> Vec<PersistentVolume> {
    vec![
        volume("v1", recognized(0), ("default", "s2")),
        volume("v2", recognized(1), ("default", "s2")),
        volume("v3", "other", ("default", "s2")),
        volume("v4", recognized(0), ("other", "s2")),
        volume("v5", recognized(0), ("default", "s3")),
    ]
}

/// Secrets and decoder of the shared listing scenarios: `s1` has no payload,
/// `s2` is valid on cluster A, `s3` is expired on cluster B.
pub(crate) fn scenario_secrets() -> (Vec<ClusterSecret>, FakeTicketDecoder) {
    let secrets = vec![
        ClusterSecret::new("default", "s1").with_data("other", b"x".to_vec()),
        ticket_secret("default", "s2", "ticket-s2"),
        ticket_secret("default", "s3", "ticket-s3"),
    ];
    let decoder = FakeTicketDecoder::default()
        .with_ticket("ticket-s2", ticket("A", "alice", Duration::hours(1)))
        .with_ticket("ticket-s3", ticket("B", "bob", Duration::hours(-1)));

    (secrets, decoder)
}
