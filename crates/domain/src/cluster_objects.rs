use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ObjectRef;

/// Data key under which a ticket secret stores its ticket payload.
pub const CONTAINER_TICKET_KEY: &str = "CONTAINER_TICKET";

/// CSI driver identifiers of the MapR filesystem plug-in (block and NFS
/// variants). Volumes using any other driver are ignored by every view.
pub const RECOGNIZED_CSI_DRIVERS: [&str; 2] = ["com.mapr.csi-kdf", "com.mapr.csi-nfskdf"];

/// Volume attribute carrying the filesystem path mounted by the volume.
pub const VOLUME_PATH_ATTRIBUTE: &str = "volumePath";

/// Returns whether a CSI driver identifier belongs to the recognized set.
#[must_use]
pub fn is_recognized_csi_driver(driver: &str) -> bool {
    RECOGNIZED_CSI_DRIVERS.contains(&driver)
}

/// Secret object as returned by the cluster, reduced to the fields the
/// listers read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSecret {
    secret_ref: ObjectRef,
    creation_timestamp: Option<DateTime<Utc>>,
    data: BTreeMap<String, Vec<u8>>,
}

impl ClusterSecret {
    /// Creates a secret without data.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            secret_ref: ObjectRef::new(namespace, name),
            creation_timestamp: None,
            data: BTreeMap::new(),
        }
    }

    /// Sets the creation timestamp.
    #[must_use]
    pub fn with_creation_timestamp(mut self, creation_timestamp: DateTime<Utc>) -> Self {
        self.creation_timestamp = Some(creation_timestamp);
        self
    }

    /// Adds one data entry.
    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Returns the secret identity.
    #[must_use]
    pub fn secret_ref(&self) -> &ObjectRef {
        &self.secret_ref
    }

    /// Returns the creation timestamp, if the cluster reported one.
    #[must_use]
    pub fn creation_timestamp(&self) -> Option<DateTime<Utc>> {
        self.creation_timestamp
    }

    /// Returns the raw data value stored under `key`.
    #[must_use]
    pub fn data(&self, key: &str) -> Option<&[u8]> {
        self.data.get(key).map(Vec::as_slice)
    }

    /// Returns the ticket payload, if this is a ticket secret.
    #[must_use]
    pub fn ticket_payload(&self) -> Option<&[u8]> {
        self.data(CONTAINER_TICKET_KEY)
    }
}

/// CSI-specific part of a persistent volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsiVolumeSource {
    driver: String,
    volume_handle: Option<String>,
    volume_attributes: BTreeMap<String, String>,
    node_publish_secret_ref: Option<ObjectRef>,
}

impl CsiVolumeSource {
    /// Creates a CSI source for the given driver.
    #[must_use]
    pub fn new(driver: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            volume_handle: None,
            volume_attributes: BTreeMap::new(),
            node_publish_secret_ref: None,
        }
    }

    /// Sets the volume handle. Blank handles are dropped.
    #[must_use]
    pub fn with_volume_handle(mut self, volume_handle: impl Into<String>) -> Self {
        let volume_handle = volume_handle.into();
        self.volume_handle = (!volume_handle.is_empty()).then_some(volume_handle);
        self
    }

    /// Adds one volume attribute.
    #[must_use]
    pub fn with_volume_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.volume_attributes.insert(key.into(), value.into());
        self
    }

    /// Sets the node-publish secret reference.
    #[must_use]
    pub fn with_node_publish_secret_ref(mut self, secret_ref: ObjectRef) -> Self {
        self.node_publish_secret_ref = Some(secret_ref);
        self
    }

    /// Returns the driver identifier.
    #[must_use]
    pub fn driver(&self) -> &str {
        self.driver.as_str()
    }

    /// Returns the volume handle.
    #[must_use]
    pub fn volume_handle(&self) -> Option<&str> {
        self.volume_handle.as_deref()
    }

    /// Returns the mounted filesystem path from the volume attributes.
    #[must_use]
    pub fn volume_path(&self) -> Option<&str> {
        self.volume_attributes
            .get(VOLUME_PATH_ATTRIBUTE)
            .map(String::as_str)
    }

    /// Returns the secret used at mount time.
    #[must_use]
    pub fn node_publish_secret_ref(&self) -> Option<&ObjectRef> {
        self.node_publish_secret_ref.as_ref()
    }
}

/// Persistent volume object, reduced to the fields the listers read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistentVolume {
    name: String,
    creation_timestamp: Option<DateTime<Utc>>,
    claim_ref: Option<ObjectRef>,
    csi: Option<CsiVolumeSource>,
}

impl PersistentVolume {
    /// Creates a volume without CSI source or claim.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            creation_timestamp: None,
            claim_ref: None,
            csi: None,
        }
    }

    /// Sets the creation timestamp.
    #[must_use]
    pub fn with_creation_timestamp(mut self, creation_timestamp: DateTime<Utc>) -> Self {
        self.creation_timestamp = Some(creation_timestamp);
        self
    }

    /// Sets the claim the volume is bound to.
    #[must_use]
    pub fn with_claim_ref(mut self, claim_ref: ObjectRef) -> Self {
        self.claim_ref = Some(claim_ref);
        self
    }

    /// Sets the CSI source.
    #[must_use]
    pub fn with_csi(mut self, csi: CsiVolumeSource) -> Self {
        self.csi = Some(csi);
        self
    }

    /// Returns the cluster-wide volume name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the creation timestamp, if the cluster reported one.
    #[must_use]
    pub fn creation_timestamp(&self) -> Option<DateTime<Utc>> {
        self.creation_timestamp
    }

    /// Returns the bound claim reference.
    #[must_use]
    pub fn claim_ref(&self) -> Option<&ObjectRef> {
        self.claim_ref.as_ref()
    }

    /// Returns the CSI driver identifier.
    #[must_use]
    pub fn csi_driver(&self) -> Option<&str> {
        self.csi.as_ref().map(CsiVolumeSource::driver)
    }

    /// Returns whether the volume is backed by a recognized CSI driver.
    #[must_use]
    pub fn has_recognized_driver(&self) -> bool {
        self.csi_driver().is_some_and(is_recognized_csi_driver)
    }

    /// Returns the mount-time secret reference.
    #[must_use]
    pub fn mount_secret_ref(&self) -> Option<&ObjectRef> {
        self.csi
            .as_ref()
            .and_then(CsiVolumeSource::node_publish_secret_ref)
    }

    /// Returns the CSI volume handle.
    #[must_use]
    pub fn volume_handle(&self) -> Option<&str> {
        self.csi.as_ref().and_then(CsiVolumeSource::volume_handle)
    }

    /// Returns the mounted filesystem path.
    #[must_use]
    pub fn volume_path(&self) -> Option<&str> {
        self.csi.as_ref().and_then(CsiVolumeSource::volume_path)
    }
}

/// Lifecycle phase of a persistent volume claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimPhase {
    /// Claim is not yet bound.
    Pending,
    /// Claim is bound to exactly one volume.
    Bound,
    /// Claim lost its underlying volume.
    Lost,
    /// Phase missing or not understood.
    Unknown,
}

impl ClaimPhase {
    /// Maps the orchestrator's phase string. Unrecognized values map to
    /// `Unknown`.
    #[must_use]
    pub fn from_phase(value: &str) -> Self {
        match value {
            "Pending" => Self::Pending,
            "Bound" => Self::Bound,
            "Lost" => Self::Lost,
            _ => Self::Unknown,
        }
    }
}

/// Persistent volume claim object, reduced to the fields the listers read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistentVolumeClaim {
    claim_ref: ObjectRef,
    creation_timestamp: Option<DateTime<Utc>>,
    volume_name: Option<String>,
    phase: ClaimPhase,
}

impl PersistentVolumeClaim {
    /// Creates a claim in the given phase.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, phase: ClaimPhase) -> Self {
        Self {
            claim_ref: ObjectRef::new(namespace, name),
            creation_timestamp: None,
            volume_name: None,
            phase,
        }
    }

    /// Sets the creation timestamp.
    #[must_use]
    pub fn with_creation_timestamp(mut self, creation_timestamp: DateTime<Utc>) -> Self {
        self.creation_timestamp = Some(creation_timestamp);
        self
    }

    /// Sets the backing volume name. Blank names are dropped.
    #[must_use]
    pub fn with_volume_name(mut self, volume_name: impl Into<String>) -> Self {
        let volume_name = volume_name.into();
        self.volume_name = (!volume_name.is_empty()).then_some(volume_name);
        self
    }

    /// Returns the claim identity.
    #[must_use]
    pub fn claim_ref(&self) -> &ObjectRef {
        &self.claim_ref
    }

    /// Returns the creation timestamp, if the cluster reported one.
    #[must_use]
    pub fn creation_timestamp(&self) -> Option<DateTime<Utc>> {
        self.creation_timestamp
    }

    /// Returns the name of the backing volume.
    #[must_use]
    pub fn volume_name(&self) -> Option<&str> {
        self.volume_name.as_deref()
    }

    /// Returns the claim phase.
    #[must_use]
    pub fn phase(&self) -> ClaimPhase {
        self.phase
    }

    /// Returns whether the claim is bound.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.phase == ClaimPhase::Bound
    }
}
