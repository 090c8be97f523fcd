use std::cmp::Ordering;
use std::str::FromStr;

use mapr_ticket_core::AppError;
use serde::{Deserialize, Serialize};

use crate::sort::unknown_sort_key;
use crate::{ObjectRef, SortKey, Ticket};

/// Secret holding a decoded ticket, identified by `(namespace, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketSecret {
    secret_ref: ObjectRef,
    ticket: Ticket,
    usage_count: u32,
}

impl TicketSecret {
    /// Creates a ticket secret with a zero usage count.
    #[must_use]
    pub fn new(secret_ref: ObjectRef, ticket: Ticket) -> Self {
        Self {
            secret_ref,
            ticket,
            usage_count: 0,
        }
    }

    /// Returns the secret identity.
    #[must_use]
    pub fn secret_ref(&self) -> &ObjectRef {
        &self.secret_ref
    }

    /// Returns the decoded ticket.
    #[must_use]
    pub fn ticket(&self) -> &Ticket {
        &self.ticket
    }

    /// Returns how many recognized volumes mount this secret. Zero unless
    /// usage enrichment ran.
    #[must_use]
    pub fn usage_count(&self) -> u32 {
        self.usage_count
    }

    /// Records the number of volumes mounting this secret.
    pub fn set_usage_count(&mut self, usage_count: u32) {
        self.usage_count = usage_count;
    }
}

/// Sort keys of the secret view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecretSortKey {
    /// Secret name.
    Name,
    /// Secret namespace.
    Namespace,
    /// Ticket cluster.
    Cluster,
    /// Ticket user.
    User,
    /// Ticket creation time.
    CreationTime,
    /// Ticket expiry time.
    ExpiryTime,
    /// Number of volumes mounting the secret.
    UsageCount,
}

impl SecretSortKey {
    /// Default secret view order.
    pub const DEFAULT_ORDER: [Self; 2] = [Self::Namespace, Self::Name];
}

impl FromStr for SecretSortKey {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "name" => Ok(Self::Name),
            "namespace" => Ok(Self::Namespace),
            "cluster" => Ok(Self::Cluster),
            "user" => Ok(Self::User),
            "creation_time" => Ok(Self::CreationTime),
            "expiry_time" => Ok(Self::ExpiryTime),
            "usage_count" => Ok(Self::UsageCount),
            _ => Err(unknown_sort_key::<Self>(value)),
        }
    }
}

impl SortKey for SecretSortKey {
    type Record = TicketSecret;

    const ALL: &'static [Self] = &[
        Self::Name,
        Self::Namespace,
        Self::Cluster,
        Self::User,
        Self::CreationTime,
        Self::ExpiryTime,
        Self::UsageCount,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Namespace => "namespace",
            Self::Cluster => "cluster",
            Self::User => "user",
            Self::CreationTime => "creation_time",
            Self::ExpiryTime => "expiry_time",
            Self::UsageCount => "usage_count",
        }
    }

    fn compare(self, left: &TicketSecret, right: &TicketSecret) -> Ordering {
        match self {
            Self::Name => left.secret_ref.name().cmp(right.secret_ref.name()),
            Self::Namespace => left
                .secret_ref
                .namespace()
                .cmp(right.secret_ref.namespace()),
            Self::Cluster => left.ticket.cluster().cmp(right.ticket.cluster()),
            Self::User => left.ticket.user().cmp(&right.ticket.user()),
            Self::CreationTime => left
                .ticket
                .creation_time()
                .cmp(&right.ticket.creation_time()),
            Self::ExpiryTime => left.ticket.expiry_time().cmp(&right.ticket.expiry_time()),
            Self::UsageCount => left.usage_count.cmp(&right.usage_count),
        }
    }
}
