//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod envelope_ticket_decoder;
mod in_memory_cluster_client;
mod kube_cluster_client;

pub use envelope_ticket_decoder::EnvelopeTicketDecoder;
pub use in_memory_cluster_client::InMemoryClusterClient;
pub use kube_cluster_client::KubeClusterClient;
