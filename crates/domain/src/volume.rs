use std::cmp::Ordering;
use std::str::FromStr;

use mapr_ticket_core::AppError;
use serde::{Deserialize, Serialize};

use crate::sort::unknown_sort_key;
use crate::{ObjectRef, PersistentVolume, SortKey, TicketSecret};

/// Recognized-driver volume, optionally joined to the ticket secret it
/// mounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeRecord {
    volume: PersistentVolume,
    ticket_secret: Option<TicketSecret>,
}

impl VolumeRecord {
    /// Creates a record without ticket metadata.
    #[must_use]
    pub fn new(volume: PersistentVolume) -> Self {
        Self {
            volume,
            ticket_secret: None,
        }
    }

    /// Returns the underlying volume.
    #[must_use]
    pub fn volume(&self) -> &PersistentVolume {
        &self.volume
    }

    /// Returns the volume name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.volume.name()
    }

    /// Returns the claim the volume is bound to.
    #[must_use]
    pub fn claim_ref(&self) -> Option<&ObjectRef> {
        self.volume.claim_ref()
    }

    /// Returns the mounted filesystem path.
    #[must_use]
    pub fn volume_path(&self) -> Option<&str> {
        self.volume.volume_path()
    }

    /// Returns the CSI volume handle.
    #[must_use]
    pub fn volume_handle(&self) -> Option<&str> {
        self.volume.volume_handle()
    }

    /// Returns the CSI driver identifier.
    #[must_use]
    pub fn csi_driver(&self) -> Option<&str> {
        self.volume.csi_driver()
    }

    /// Returns the mount-time secret reference.
    #[must_use]
    pub fn mount_secret_ref(&self) -> Option<&ObjectRef> {
        self.volume.mount_secret_ref()
    }

    /// Returns the joined ticket secret.
    #[must_use]
    pub fn ticket_secret(&self) -> Option<&TicketSecret> {
        self.ticket_secret.as_ref()
    }

    /// Attaches the ticket secret mounted by the volume.
    pub fn attach_ticket_secret(&mut self, ticket_secret: TicketSecret) {
        self.ticket_secret = Some(ticket_secret);
    }
}

/// Sort keys of the volume view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeSortKey {
    /// Volume name.
    Name,
    /// Namespace of the mount secret.
    SecretNamespace,
    /// Name of the mount secret.
    SecretName,
    /// Namespace of the bound claim.
    ClaimNamespace,
    /// Name of the bound claim.
    ClaimName,
    /// Mounted filesystem path.
    VolumePath,
    /// CSI volume handle.
    VolumeHandle,
    /// Expiry of the joined ticket.
    ExpiryTime,
    /// Volume creation timestamp.
    Age,
}

impl VolumeSortKey {
    /// Default volume view order.
    pub const DEFAULT_ORDER: [Self; 2] = [Self::SecretNamespace, Self::SecretName];
}

impl FromStr for VolumeSortKey {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "name" => Ok(Self::Name),
            "secret_namespace" => Ok(Self::SecretNamespace),
            "secret_name" => Ok(Self::SecretName),
            "claim_namespace" => Ok(Self::ClaimNamespace),
            "claim_name" => Ok(Self::ClaimName),
            "volume_path" => Ok(Self::VolumePath),
            "volume_handle" => Ok(Self::VolumeHandle),
            "expiry_time" => Ok(Self::ExpiryTime),
            "age" => Ok(Self::Age),
            _ => Err(unknown_sort_key::<Self>(value)),
        }
    }
}

impl SortKey for VolumeSortKey {
    type Record = VolumeRecord;

    const ALL: &'static [Self] = &[
        Self::Name,
        Self::SecretNamespace,
        Self::SecretName,
        Self::ClaimNamespace,
        Self::ClaimName,
        Self::VolumePath,
        Self::VolumeHandle,
        Self::ExpiryTime,
        Self::Age,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::SecretNamespace => "secret_namespace",
            Self::SecretName => "secret_name",
            Self::ClaimNamespace => "claim_namespace",
            Self::ClaimName => "claim_name",
            Self::VolumePath => "volume_path",
            Self::VolumeHandle => "volume_handle",
            Self::ExpiryTime => "expiry_time",
            Self::Age => "age",
        }
    }

    fn compare(self, left: &VolumeRecord, right: &VolumeRecord) -> Ordering {
        match self {
            Self::Name => left.name().cmp(right.name()),
            Self::SecretNamespace => left
                .mount_secret_ref()
                .map(ObjectRef::namespace)
                .cmp(&right.mount_secret_ref().map(ObjectRef::namespace)),
            Self::SecretName => left
                .mount_secret_ref()
                .map(ObjectRef::name)
                .cmp(&right.mount_secret_ref().map(ObjectRef::name)),
            Self::ClaimNamespace => left
                .claim_ref()
                .map(ObjectRef::namespace)
                .cmp(&right.claim_ref().map(ObjectRef::namespace)),
            Self::ClaimName => left
                .claim_ref()
                .map(ObjectRef::name)
                .cmp(&right.claim_ref().map(ObjectRef::name)),
            Self::VolumePath => left.volume_path().cmp(&right.volume_path()),
            Self::VolumeHandle => left.volume_handle().cmp(&right.volume_handle()),
            Self::ExpiryTime => {
                expiry_of(left.ticket_secret()).cmp(&expiry_of(right.ticket_secret()))
            }
            Self::Age => left
                .volume
                .creation_timestamp()
                .cmp(&right.volume.creation_timestamp()),
        }
    }
}

pub(crate) fn expiry_of(
    ticket_secret: Option<&TicketSecret>,
) -> Option<chrono::DateTime<chrono::Utc>> {
    ticket_secret.map(|secret| secret.ticket().expiry_time())
}
