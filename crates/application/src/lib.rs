//! Application services and ports.

#![forbid(unsafe_code)]

mod claim_lister;
mod cluster_ports;
mod list_context;
mod lister_ports;
mod secret_lister;
mod ticket_inspector;
mod volume_lister;

#[cfg(test)]
mod test_support;

pub use claim_lister::ClaimLister;
pub use cluster_ports::{Clock, ClusterClient, SystemClock, TicketDecoder};
pub use list_context::{CancelHandle, ListContext};
pub use lister_ports::{TicketSecretSource, VolumeSource};
pub use secret_lister::{SecretFilter, SecretFilterOptions, SecretLister};
pub use ticket_inspector::TicketInspector;
pub use volume_lister::VolumeLister;
