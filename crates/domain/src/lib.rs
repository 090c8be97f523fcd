//! Domain model for MapR ticket secrets, the volumes that mount them and the
//! claims bound to those volumes.

#![forbid(unsafe_code)]

mod claim;
mod cluster_objects;
mod object_ref;
mod sort;
mod ticket;
mod ticket_secret;
mod volume;

pub use claim::{ClaimRecord, ClaimSortKey};
pub use cluster_objects::{
    CONTAINER_TICKET_KEY, ClaimPhase, ClusterSecret, CsiVolumeSource, PersistentVolume,
    PersistentVolumeClaim, RECOGNIZED_CSI_DRIVERS, VOLUME_PATH_ATTRIBUTE,
    is_recognized_csi_driver,
};
pub use object_ref::{NAMESPACE_ALL, ObjectRef, SECRET_ALL, SecretSelector};
pub use sort::{SortKey, parse_sort_keys, sort_records, validate_sort_keys};
pub use ticket::{Ticket, TicketStatus};
pub use ticket_secret::{SecretSortKey, TicketSecret};
pub use volume::{VolumeRecord, VolumeSortKey};
