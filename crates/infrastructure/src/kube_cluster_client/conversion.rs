//! Conversions from Kubernetes API objects into cluster object views.

use k8s_openapi::api::core::v1::{
    PersistentVolume as KubePersistentVolume, PersistentVolumeClaim as KubePersistentVolumeClaim,
    Secret,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use mapr_ticket_domain::{
    ClaimPhase, ClusterSecret, CsiVolumeSource, ObjectRef, PersistentVolume,
    PersistentVolumeClaim,
};

fn namespace_and_name(metadata: &ObjectMeta) -> (String, String) {
    (
        metadata.namespace.clone().unwrap_or_default(),
        metadata.name.clone().unwrap_or_default(),
    )
}

pub(super) fn secret_from_kube(secret: Secret) -> ClusterSecret {
    let (namespace, name) = namespace_and_name(&secret.metadata);
    let mut converted = ClusterSecret::new(namespace, name);

    if let Some(created) = secret.metadata.creation_timestamp {
        converted = converted.with_creation_timestamp(created.0);
    }

    for (key, value) in secret.data.unwrap_or_default() {
        converted = converted.with_data(key, value.0);
    }

    converted
}

pub(super) fn volume_from_kube(volume: KubePersistentVolume) -> PersistentVolume {
    let mut converted = PersistentVolume::new(volume.metadata.name.unwrap_or_default());

    if let Some(created) = volume.metadata.creation_timestamp {
        converted = converted.with_creation_timestamp(created.0);
    }

    let Some(spec) = volume.spec else {
        return converted;
    };

    if let Some(claim_ref) = spec.claim_ref
        && let Some(name) = claim_ref.name
    {
        converted = converted.with_claim_ref(ObjectRef::new(
            claim_ref.namespace.unwrap_or_default(),
            name,
        ));
    }

    if let Some(csi) = spec.csi {
        let mut source = CsiVolumeSource::new(csi.driver).with_volume_handle(csi.volume_handle);
        for (key, value) in csi.volume_attributes.unwrap_or_default() {
            source = source.with_volume_attribute(key, value);
        }
        if let Some(secret_ref) = csi.node_publish_secret_ref
            && let Some(name) = secret_ref.name
        {
            source = source.with_node_publish_secret_ref(ObjectRef::new(
                secret_ref.namespace.unwrap_or_default(),
                name,
            ));
        }
        converted = converted.with_csi(source);
    }

    converted
}

pub(super) fn claim_from_kube(claim: KubePersistentVolumeClaim) -> PersistentVolumeClaim {
    let (namespace, name) = namespace_and_name(&claim.metadata);
    let phase = claim
        .status
        .and_then(|status| status.phase)
        .map_or(ClaimPhase::Unknown, |phase| ClaimPhase::from_phase(&phase));
    let mut converted = PersistentVolumeClaim::new(namespace, name, phase);

    if let Some(created) = claim.metadata.creation_timestamp {
        converted = converted.with_creation_timestamp(created.0);
    }

    if let Some(volume_name) = claim.spec.and_then(|spec| spec.volume_name) {
        converted = converted.with_volume_name(volume_name);
    }

    converted
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{TimeZone, Utc};
    use k8s_openapi::ByteString;
    use k8s_openapi::api::core::v1::{
        CSIPersistentVolumeSource, ObjectReference, PersistentVolume as KubePersistentVolume,
        PersistentVolumeClaim as KubePersistentVolumeClaim, PersistentVolumeClaimSpec,
        PersistentVolumeClaimStatus, PersistentVolumeSpec, Secret, SecretReference,
    };
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
    use mapr_ticket_domain::{CONTAINER_TICKET_KEY, ClaimPhase, ObjectRef};

    use super::{claim_from_kube, secret_from_kube, volume_from_kube};

    fn metadata(namespace: Option<&str>, name: &str) -> ObjectMeta {
        ObjectMeta {
            namespace: namespace.map(str::to_owned),
            name: Some(name.to_owned()),
            creation_timestamp: Utc
                .with_ymd_and_hms(2023, 6, 1, 12, 0, 0)
                .single()
                .map(Time),
            ..ObjectMeta::default()
        }
    }

    #[test]
    fn secret_keeps_ticket_payload() {
        let secret = Secret {
            metadata: metadata(Some("default"), "mapr-ticket"),
            data: Some(BTreeMap::from([(
                CONTAINER_TICKET_KEY.to_owned(),
                ByteString(b"demo.mapr.com abc".to_vec()),
            )])),
            ..Secret::default()
        };

        let converted = secret_from_kube(secret);
        assert_eq!(converted.secret_ref(), &ObjectRef::new("default", "mapr-ticket"));
        assert_eq!(converted.ticket_payload(), Some(&b"demo.mapr.com abc"[..]));
        assert!(converted.creation_timestamp().is_some());
    }

    #[test]
    fn secret_without_data_has_no_payload() {
        let converted = secret_from_kube(Secret {
            metadata: metadata(Some("default"), "empty"),
            ..Secret::default()
        });
        assert_eq!(converted.ticket_payload(), None);
    }

    #[test]
    fn csi_volume_maps_mount_secret_and_attributes() {
        let volume = KubePersistentVolume {
            metadata: metadata(None, "pv-1"),
            spec: Some(PersistentVolumeSpec {
                claim_ref: Some(ObjectReference {
                    namespace: Some("apps".to_owned()),
                    name: Some("data".to_owned()),
                    ..ObjectReference::default()
                }),
                csi: Some(CSIPersistentVolumeSource {
                    driver: "com.mapr.csi-kdf".to_owned(),
                    volume_handle: "pv-1-handle".to_owned(),
                    volume_attributes: Some(BTreeMap::from([(
                        "volumePath".to_owned(),
                        "/apps/data".to_owned(),
                    )])),
                    node_publish_secret_ref: Some(SecretReference {
                        namespace: Some("default".to_owned()),
                        name: Some("mapr-ticket".to_owned()),
                    }),
                    ..CSIPersistentVolumeSource::default()
                }),
                ..PersistentVolumeSpec::default()
            }),
            ..KubePersistentVolume::default()
        };

        let converted = volume_from_kube(volume);
        assert_eq!(converted.name(), "pv-1");
        assert!(converted.has_recognized_driver());
        assert_eq!(converted.claim_ref(), Some(&ObjectRef::new("apps", "data")));
        assert_eq!(
            converted.mount_secret_ref(),
            Some(&ObjectRef::new("default", "mapr-ticket"))
        );
        assert_eq!(converted.volume_handle(), Some("pv-1-handle"));
        assert_eq!(converted.volume_path(), Some("/apps/data"));
    }

    #[test]
    fn non_csi_volume_has_no_driver() {
        let converted = volume_from_kube(KubePersistentVolume {
            metadata: metadata(None, "hostpath"),
            spec: Some(PersistentVolumeSpec::default()),
            ..KubePersistentVolume::default()
        });
        assert_eq!(converted.csi_driver(), None);
        assert!(!converted.has_recognized_driver());
        assert_eq!(converted.mount_secret_ref(), None);
    }

    #[test]
    fn claim_maps_phase_and_volume_name() {
        let claim = KubePersistentVolumeClaim {
            metadata: metadata(Some("apps"), "data"),
            spec: Some(PersistentVolumeClaimSpec {
                volume_name: Some("pv-1".to_owned()),
                ..PersistentVolumeClaimSpec::default()
            }),
            status: Some(PersistentVolumeClaimStatus {
                phase: Some("Bound".to_owned()),
                ..PersistentVolumeClaimStatus::default()
            }),
        };

        let converted = claim_from_kube(claim);
        assert_eq!(converted.claim_ref(), &ObjectRef::new("apps", "data"));
        assert_eq!(converted.volume_name(), Some("pv-1"));
        assert!(converted.is_bound());
    }

    #[test]
    fn claim_without_status_is_unknown() {
        let converted = claim_from_kube(KubePersistentVolumeClaim {
            metadata: metadata(Some("apps"), "data"),
            ..KubePersistentVolumeClaim::default()
        });
        assert_eq!(converted.phase(), ClaimPhase::Unknown);
        assert!(!converted.is_bound());
    }
}
