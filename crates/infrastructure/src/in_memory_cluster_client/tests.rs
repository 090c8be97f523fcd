use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use chrono::{DateTime, Utc};
use mapr_ticket_application::{
    ClaimLister, Clock, ListContext, SecretLister, TicketInspector, VolumeLister,
};
use mapr_ticket_core::AppError;
use mapr_ticket_domain::{
    CONTAINER_TICKET_KEY, ClaimPhase, ClusterSecret, CsiVolumeSource, NAMESPACE_ALL, ObjectRef,
    PersistentVolume, PersistentVolumeClaim, RECOGNIZED_CSI_DRIVERS, SECRET_ALL, SecretSelector,
    SecretSortKey, VolumeSortKey,
};

use super::InMemoryClusterClient;
use crate::EnvelopeTicketDecoder;

const NOW_SECONDS: i64 = 1_704_067_200;
const HOUR: i64 = 3_600;

struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(NOW_SECONDS, 0).unwrap_or_else(|| unreachable!())
    }
}

fn ticket_secret(name: &str, cluster: &str, user: &str, expiry_offset: i64) -> ClusterSecret {
    let body = serde_json::json!({
        "user": user,
        "uid": 5000,
        "gids": [5000],
        "creation_time_sec": NOW_SECONDS - 720 * HOUR,
        "expiry_time_sec": NOW_SECONDS + expiry_offset,
    })
    .to_string();
    let envelope = format!("{cluster} {}", BASE64_STANDARD.encode(body));
    ClusterSecret::new("default", name).with_data(CONTAINER_TICKET_KEY, envelope.into_bytes())
}

fn volume(name: &str, driver: &str, mount: (&str, &str)) -> PersistentVolume {
    PersistentVolume::new(name).with_csi(
        CsiVolumeSource::new(driver)
            .with_volume_handle(format!("{name}-handle"))
            .with_volume_attribute("volumePath", format!("/apps/{name}"))
            .with_node_publish_secret_ref(ObjectRef::new(mount.0, mount.1)),
    )
}

async fn scenario_client() -> Arc<InMemoryClusterClient> {
    let client = InMemoryClusterClient::new();

    client
        .insert_secret(ClusterSecret::new("default", "s1").with_data("token", b"x".to_vec()))
        .await;
    client.insert_secret(ticket_secret("s2", "A", "alice", HOUR)).await;
    client.insert_secret(ticket_secret("s3", "B", "bob", -HOUR)).await;

    let recognized = RECOGNIZED_CSI_DRIVERS;
    client.insert_volume(volume("v1", recognized[0], ("default", "s2"))).await;
    client.insert_volume(volume("v2", recognized[1], ("default", "s2"))).await;
    client.insert_volume(volume("v3", "other", ("default", "s2"))).await;
    client.insert_volume(volume("v4", recognized[0], ("other", "s2"))).await;
    client.insert_volume(volume("v5", recognized[0], ("default", "s3"))).await;

    client
        .insert_claim(
            PersistentVolumeClaim::new("default", "c1", ClaimPhase::Bound).with_volume_name("v1"),
        )
        .await;
    client
        .insert_claim(
            PersistentVolumeClaim::new("default", "c2", ClaimPhase::Pending).with_volume_name("v2"),
        )
        .await;
    client
        .insert_claim(
            PersistentVolumeClaim::new("default", "c3", ClaimPhase::Bound).with_volume_name("vX"),
        )
        .await;

    Arc::new(client)
}

fn secret_lister(client: Arc<InMemoryClusterClient>) -> SecretLister {
    SecretLister::new(client, Arc::new(EnvelopeTicketDecoder::new()), "default")
        .with_clock(Arc::new(FixedClock))
}

#[tokio::test]
async fn secret_listing_scenarios() {
    let client = scenario_client().await;
    let context = ListContext::background();

    let cases = [
        (secret_lister(client.clone()), vec!["s2", "s3"]),
        (
            secret_lister(client.clone()).with_filter_only_expired(true),
            vec!["s3"],
        ),
        (
            secret_lister(client.clone()).with_filter_by_cluster("A"),
            vec!["s2"],
        ),
    ];

    for (lister, expected) in cases {
        let result = lister.list(&context).await;
        assert!(result.is_ok());

        let secrets = result.unwrap_or_else(|_| unreachable!());
        let names: Vec<&str> = secrets
            .iter()
            .map(|secret| secret.secret_ref().name())
            .collect();
        assert_eq!(names, expected);
    }
}

#[tokio::test]
async fn volume_selector_scenarios() {
    let client = scenario_client().await;
    let context = ListContext::background();

    let cases = [
        (SecretSelector::new("default", "s2"), vec!["v1", "v2"]),
        (SecretSelector::new("default", SECRET_ALL), vec!["v1", "v2", "v5"]),
        (
            SecretSelector::new(NAMESPACE_ALL, "s2"),
            vec!["v1", "v2", "v4", "v5"],
        ),
    ];

    for (selector, expected) in cases {
        let result = VolumeLister::new(client.clone(), selector)
            .with_sort_by(vec![VolumeSortKey::Name])
            .list(&context)
            .await;
        assert!(result.is_ok());

        let records = result.unwrap_or_else(|_| unreachable!());
        let names: Vec<&str> = records.iter().map(|record| record.name()).collect();
        assert_eq!(names, expected);
    }
}

#[tokio::test]
async fn claim_scenario_keeps_bound_claims_with_volumes() {
    let client = scenario_client().await;

    let result = ClaimLister::new(client.clone(), "default")
        .with_secret_source(Arc::new(secret_lister(client)))
        .list(&ListContext::background())
        .await;
    assert!(result.is_ok());

    let records = result.unwrap_or_else(|_| unreachable!());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].claim_ref().name(), "c1");
    assert_eq!(
        records[0]
            .ticket_secret()
            .map(|secret| secret.ticket().cluster()),
        Some("A")
    );
}

#[tokio::test]
async fn usage_counts_follow_recognized_mounts() {
    let client = scenario_client().await;
    let volumes = Arc::new(VolumeLister::new(client.clone(), SecretSelector::all()));

    let result = secret_lister(client)
        .with_show_in_use(true)
        .with_volume_source(volumes)
        .with_sort_by(vec![SecretSortKey::UsageCount, SecretSortKey::Name])
        .list(&ListContext::background())
        .await;
    assert!(result.is_ok());

    let secrets = result.unwrap_or_else(|_| unreachable!());
    let counts: Vec<(&str, u32)> = secrets
        .iter()
        .map(|secret| (secret.secret_ref().name(), secret.usage_count()))
        .collect();
    assert_eq!(counts, vec![("s3", 1), ("s2", 2)]);
}

#[tokio::test]
async fn sort_by_cluster_then_name() {
    let client = InMemoryClusterClient::new();
    client.insert_secret(ticket_secret("s2", "A", "alice", HOUR)).await;
    client.insert_secret(ticket_secret("s1", "B", "bob", HOUR)).await;
    client.insert_secret(ticket_secret("s3", "A", "carol", HOUR)).await;

    let result = secret_lister(Arc::new(client))
        .with_sort_by(vec![SecretSortKey::Cluster, SecretSortKey::Name])
        .list(&ListContext::background())
        .await;
    assert!(result.is_ok());

    let secrets = result.unwrap_or_else(|_| unreachable!());
    let names: Vec<&str> = secrets
        .iter()
        .map(|secret| secret.secret_ref().name())
        .collect();
    assert_eq!(names, vec!["s2", "s3", "s1"]);
}

#[tokio::test]
async fn inspect_decodes_one_secret() {
    let client = scenario_client().await;
    let inspector = TicketInspector::new(client, Arc::new(EnvelopeTicketDecoder::new()));

    let result = inspector
        .inspect(&ListContext::background(), &ObjectRef::new("default", "s3"))
        .await;
    assert!(result.is_ok());

    let secret = result.unwrap_or_else(|_| unreachable!());
    assert_eq!(secret.ticket().user(), Some("bob"));
    assert!(secret.ticket().is_expired_at(FixedClock.now()));

    let missing = inspector
        .inspect(&ListContext::background(), &ObjectRef::new("default", "s1"))
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn insert_replaces_existing_objects() {
    let client = InMemoryClusterClient::new();
    client.insert_secret(ticket_secret("s2", "A", "alice", HOUR)).await;
    client.insert_secret(ticket_secret("s2", "B", "bob", HOUR)).await;

    let result = secret_lister(Arc::new(client))
        .list(&ListContext::background())
        .await;
    assert!(result.is_ok());

    let secrets = result.unwrap_or_else(|_| unreachable!());
    assert_eq!(secrets.len(), 1);
    assert_eq!(secrets[0].ticket().cluster(), "B");
}
