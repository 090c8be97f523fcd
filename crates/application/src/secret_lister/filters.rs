use chrono::{DateTime, Duration, Utc};
use mapr_ticket_core::{AppError, AppResult};
use mapr_ticket_domain::Ticket;

/// One secret-side predicate over a decoded ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretFilter {
    /// Keeps expired tickets.
    OnlyExpired,
    /// Keeps tickets that are not expired.
    OnlyUnexpired,
    /// Keeps tickets issued for a cluster.
    Cluster(String),
    /// Keeps tickets issued to a user.
    User(String),
    /// Keeps tickets with a numeric user id. Tickets without uid never match.
    Uid(u32),
    /// Keeps tickets whose group ids include a gid.
    Gid(u32),
    /// Keeps tickets expiring within a window from now.
    ExpiresBefore(Duration),
}

impl SecretFilter {
    /// Evaluates the predicate at `now`.
    #[must_use]
    pub fn matches(&self, ticket: &Ticket, now: DateTime<Utc>) -> bool {
        match self {
            Self::OnlyExpired => ticket.is_expired_at(now),
            Self::OnlyUnexpired => !ticket.is_expired_at(now),
            Self::Cluster(cluster) => ticket.cluster() == cluster,
            Self::User(user) => ticket.user() == Some(user.as_str()),
            Self::Uid(uid) => ticket.uid() == Some(*uid),
            Self::Gid(gid) => ticket.has_gid(*gid),
            Self::ExpiresBefore(window) => ticket.expires_before_at(now, *window),
        }
    }
}

/// Secret-side filter configuration.
///
/// Blank cluster and user values and non-positive windows leave the
/// corresponding filter inactive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretFilterOptions {
    /// Keep only expired tickets.
    pub only_expired: bool,
    /// Keep only unexpired tickets.
    pub only_unexpired: bool,
    /// Keep only tickets for this cluster.
    pub cluster: Option<String>,
    /// Keep only tickets for this user.
    pub user: Option<String>,
    /// Keep only tickets with this uid.
    pub uid: Option<u32>,
    /// Keep only tickets carrying this gid.
    pub gid: Option<u32>,
    /// Keep only tickets expiring within this window.
    pub expires_before: Option<Duration>,
}

impl SecretFilterOptions {
    /// Rejects mutually exclusive settings.
    pub fn validate(&self) -> AppResult<()> {
        if self.only_expired && self.only_unexpired {
            return Err(AppError::Validation(
                "only-expired and only-unexpired filters are mutually exclusive".to_owned(),
            ));
        }

        Ok(())
    }

    /// Returns the active predicates in application order.
    #[must_use]
    pub fn predicates(&self) -> Vec<SecretFilter> {
        let mut predicates = Vec::new();

        if self.only_expired {
            predicates.push(SecretFilter::OnlyExpired);
        }
        if self.only_unexpired {
            predicates.push(SecretFilter::OnlyUnexpired);
        }
        if let Some(cluster) = non_blank(self.cluster.as_deref()) {
            predicates.push(SecretFilter::Cluster(cluster.to_owned()));
        }
        if let Some(user) = non_blank(self.user.as_deref()) {
            predicates.push(SecretFilter::User(user.to_owned()));
        }
        if let Some(uid) = self.uid {
            predicates.push(SecretFilter::Uid(uid));
        }
        if let Some(gid) = self.gid {
            predicates.push(SecretFilter::Gid(gid));
        }
        if let Some(window) = self.expires_before.filter(|window| *window > Duration::zero()) {
            predicates.push(SecretFilter::ExpiresBefore(window));
        }

        predicates
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}
