use std::cmp::Ordering;
use std::str::FromStr;

use mapr_ticket_core::AppError;
use serde::{Deserialize, Serialize};

use crate::sort::unknown_sort_key;
use crate::volume::expiry_of;
use crate::{ObjectRef, PersistentVolume, PersistentVolumeClaim, SortKey, TicketSecret};

/// Bound claim resolved to its recognized-driver volume and, when found, the
/// ticket secret that volume mounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    claim: PersistentVolumeClaim,
    volume: PersistentVolume,
    ticket_secret: Option<TicketSecret>,
}

impl ClaimRecord {
    /// Creates a record joining a claim to its backing volume.
    #[must_use]
    pub fn new(claim: PersistentVolumeClaim, volume: PersistentVolume) -> Self {
        Self {
            claim,
            volume,
            ticket_secret: None,
        }
    }

    /// Returns the claim.
    #[must_use]
    pub fn claim(&self) -> &PersistentVolumeClaim {
        &self.claim
    }

    /// Returns the claim identity.
    #[must_use]
    pub fn claim_ref(&self) -> &ObjectRef {
        self.claim.claim_ref()
    }

    /// Returns the backing volume.
    #[must_use]
    pub fn volume(&self) -> &PersistentVolume {
        &self.volume
    }

    /// Returns the joined ticket secret.
    #[must_use]
    pub fn ticket_secret(&self) -> Option<&TicketSecret> {
        self.ticket_secret.as_ref()
    }

    /// Attaches the ticket secret mounted by the backing volume.
    pub fn attach_ticket_secret(&mut self, ticket_secret: TicketSecret) {
        self.ticket_secret = Some(ticket_secret);
    }
}

/// Sort keys of the claim view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClaimSortKey {
    /// Claim namespace.
    Namespace,
    /// Claim name.
    Name,
    /// Namespace of the mount secret.
    SecretNamespace,
    /// Name of the mount secret.
    SecretName,
    /// Backing volume name.
    VolumeName,
    /// Mounted filesystem path.
    VolumePath,
    /// CSI volume handle.
    VolumeHandle,
    /// Expiry of the joined ticket.
    ExpiryTime,
    /// Claim creation timestamp.
    Age,
}

impl ClaimSortKey {
    /// Default claim view order.
    pub const DEFAULT_ORDER: [Self; 2] = [Self::Namespace, Self::Name];
}

impl FromStr for ClaimSortKey {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "namespace" => Ok(Self::Namespace),
            "name" => Ok(Self::Name),
            "secret_namespace" => Ok(Self::SecretNamespace),
            "secret_name" => Ok(Self::SecretName),
            "volume_name" => Ok(Self::VolumeName),
            "volume_path" => Ok(Self::VolumePath),
            "volume_handle" => Ok(Self::VolumeHandle),
            "expiry_time" => Ok(Self::ExpiryTime),
            "age" => Ok(Self::Age),
            _ => Err(unknown_sort_key::<Self>(value)),
        }
    }
}

impl SortKey for ClaimSortKey {
    type Record = ClaimRecord;

    const ALL: &'static [Self] = &[
        Self::Namespace,
        Self::Name,
        Self::SecretNamespace,
        Self::SecretName,
        Self::VolumeName,
        Self::VolumePath,
        Self::VolumeHandle,
        Self::ExpiryTime,
        Self::Age,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Namespace => "namespace",
            Self::Name => "name",
            Self::SecretNamespace => "secret_namespace",
            Self::SecretName => "secret_name",
            Self::VolumeName => "volume_name",
            Self::VolumePath => "volume_path",
            Self::VolumeHandle => "volume_handle",
            Self::ExpiryTime => "expiry_time",
            Self::Age => "age",
        }
    }

    fn compare(self, left: &ClaimRecord, right: &ClaimRecord) -> Ordering {
        match self {
            Self::Namespace => left.claim_ref().namespace().cmp(right.claim_ref().namespace()),
            Self::Name => left.claim_ref().name().cmp(right.claim_ref().name()),
            Self::SecretNamespace => left
                .volume
                .mount_secret_ref()
                .map(ObjectRef::namespace)
                .cmp(&right.volume.mount_secret_ref().map(ObjectRef::namespace)),
            Self::SecretName => left
                .volume
                .mount_secret_ref()
                .map(ObjectRef::name)
                .cmp(&right.volume.mount_secret_ref().map(ObjectRef::name)),
            Self::VolumeName => left.volume.name().cmp(right.volume.name()),
            Self::VolumePath => left.volume.volume_path().cmp(&right.volume.volume_path()),
            Self::VolumeHandle => left
                .volume
                .volume_handle()
                .cmp(&right.volume.volume_handle()),
            Self::ExpiryTime => {
                expiry_of(left.ticket_secret()).cmp(&expiry_of(right.ticket_secret()))
            }
            Self::Age => left
                .claim
                .creation_timestamp()
                .cmp(&right.claim.creation_timestamp()),
        }
    }
}
