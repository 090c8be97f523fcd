use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Decoded MapR ticket.
///
/// A `Ticket` only exists for payloads the decoder accepted; optional fields
/// the payload did not carry read as `None` or empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    cluster: String,
    user: Option<String>,
    uid: Option<u32>,
    gids: Vec<u32>,
    creation_time: DateTime<Utc>,
    expiry_time: DateTime<Utc>,
}

impl Ticket {
    /// Creates a ticket for a cluster with creation and expiry times.
    #[must_use]
    pub fn new(
        cluster: impl Into<String>,
        creation_time: DateTime<Utc>,
        expiry_time: DateTime<Utc>,
    ) -> Self {
        Self {
            cluster: cluster.into(),
            user: None,
            uid: None,
            gids: Vec::new(),
            creation_time,
            expiry_time,
        }
    }

    /// Sets the user name. Blank names are treated as absent.
    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        let user = user.into();
        self.user = (!user.is_empty()).then_some(user);
        self
    }

    /// Sets the numeric user id.
    #[must_use]
    pub fn with_uid(mut self, uid: u32) -> Self {
        self.uid = Some(uid);
        self
    }

    /// Sets the group ids, preserving order.
    #[must_use]
    pub fn with_gids(mut self, gids: Vec<u32>) -> Self {
        self.gids = gids;
        self
    }

    /// Returns the cluster the ticket was issued for.
    #[must_use]
    pub fn cluster(&self) -> &str {
        self.cluster.as_str()
    }

    /// Returns the user name.
    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Returns the numeric user id.
    #[must_use]
    pub fn uid(&self) -> Option<u32> {
        self.uid
    }

    /// Returns the group ids in ticket order.
    #[must_use]
    pub fn gids(&self) -> &[u32] {
        self.gids.as_slice()
    }

    /// Returns the creation time.
    #[must_use]
    pub fn creation_time(&self) -> DateTime<Utc> {
        self.creation_time
    }

    /// Returns the expiry time.
    #[must_use]
    pub fn expiry_time(&self) -> DateTime<Utc> {
        self.expiry_time
    }

    /// Returns whether the ticket is expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expiry_time
    }

    /// Returns whether the ticket expires within `window` of `now`.
    ///
    /// A non-positive window disables the check and always returns `true`.
    #[must_use]
    pub fn expires_before_at(&self, now: DateTime<Utc>, window: Duration) -> bool {
        if window <= Duration::zero() {
            return true;
        }

        now.checked_add_signed(window)
            .is_none_or(|deadline| self.expiry_time < deadline)
    }

    /// Returns whether `gid` is one of the ticket's group ids.
    #[must_use]
    pub fn has_gid(&self, gid: u32) -> bool {
        self.gids.contains(&gid)
    }

    /// Returns the validity status at `now`.
    #[must_use]
    pub fn status_at(&self, now: DateTime<Utc>) -> TicketStatus {
        if self.is_expired_at(now) {
            TicketStatus::Expired {
                since: now - self.expiry_time,
            }
        } else {
            TicketStatus::Valid {
                remaining: self.expiry_time - now,
            }
        }
    }
}

/// Validity of a ticket relative to a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatus {
    /// Ticket is valid for `remaining` more time.
    Valid {
        /// Time left until expiry.
        remaining: Duration,
    },
    /// Ticket expired `since` ago.
    Expired {
        /// Time elapsed since expiry.
        since: Duration,
    },
}
