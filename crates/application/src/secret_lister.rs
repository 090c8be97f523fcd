use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use mapr_ticket_core::{AppError, AppResult};
use mapr_ticket_domain::{
    ObjectRef, SecretSelector, SecretSortKey, TicketSecret, sort_records, validate_sort_keys,
};
use tracing::debug;

use crate::{
    Clock, ClusterClient, ListContext, SystemClock, TicketDecoder, TicketSecretSource,
    VolumeSource,
};

mod filters;

pub use filters::{SecretFilter, SecretFilterOptions};

/// Lists secrets carrying a decodable MapR ticket.
#[derive(Clone)]
pub struct SecretLister {
    client: Arc<dyn ClusterClient>,
    decoder: Arc<dyn TicketDecoder>,
    clock: Arc<dyn Clock>,
    namespace: String,
    filters: SecretFilterOptions,
    filter_in_use: bool,
    show_in_use: bool,
    sort_by: Vec<SecretSortKey>,
    volume_source: Option<Arc<dyn VolumeSource>>,
}

impl SecretLister {
    /// Creates a lister for one namespace scope, `NAMESPACE_ALL` for every
    /// namespace.
    #[must_use]
    pub fn new(
        client: Arc<dyn ClusterClient>,
        decoder: Arc<dyn TicketDecoder>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            client,
            decoder,
            clock: Arc::new(SystemClock),
            namespace: namespace.into(),
            filters: SecretFilterOptions::default(),
            filter_in_use: false,
            show_in_use: false,
            sort_by: SecretSortKey::DEFAULT_ORDER.to_vec(),
            volume_source: None,
        }
    }

    /// Replaces the clock used by expiry filters.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the whole filter configuration.
    #[must_use]
    pub fn with_filters(mut self, filters: SecretFilterOptions) -> Self {
        self.filters = filters;
        self
    }

    /// Keeps only expired tickets.
    #[must_use]
    pub fn with_filter_only_expired(mut self, enabled: bool) -> Self {
        self.filters.only_expired = enabled;
        self
    }

    /// Keeps only unexpired tickets.
    #[must_use]
    pub fn with_filter_only_unexpired(mut self, enabled: bool) -> Self {
        self.filters.only_unexpired = enabled;
        self
    }

    /// Keeps only tickets for a cluster. A blank value disables the filter.
    #[must_use]
    pub fn with_filter_by_cluster(mut self, cluster: impl Into<String>) -> Self {
        self.filters.cluster = Some(cluster.into());
        self
    }

    /// Keeps only tickets for a user. A blank value disables the filter.
    #[must_use]
    pub fn with_filter_by_user(mut self, user: impl Into<String>) -> Self {
        self.filters.user = Some(user.into());
        self
    }

    /// Keeps only tickets with a uid.
    #[must_use]
    pub fn with_filter_by_uid(mut self, uid: u32) -> Self {
        self.filters.uid = Some(uid);
        self
    }

    /// Keeps only tickets carrying a gid.
    #[must_use]
    pub fn with_filter_by_gid(mut self, gid: u32) -> Self {
        self.filters.gid = Some(gid);
        self
    }

    /// Keeps only tickets expiring within `window`. Non-positive windows
    /// disable the filter.
    #[must_use]
    pub fn with_filter_expires_before(mut self, window: Duration) -> Self {
        self.filters.expires_before = Some(window);
        self
    }

    /// Keeps only secrets mounted by at least one recognized volume.
    #[must_use]
    pub fn with_filter_in_use(mut self, enabled: bool) -> Self {
        self.filter_in_use = enabled;
        self
    }

    /// Fills in usage counts without filtering on them.
    #[must_use]
    pub fn with_show_in_use(mut self, enabled: bool) -> Self {
        self.show_in_use = enabled;
        self
    }

    /// Replaces the sort order, highest priority first.
    #[must_use]
    pub fn with_sort_by(mut self, sort_by: Vec<SecretSortKey>) -> Self {
        self.sort_by = sort_by;
        self
    }

    /// Adds the volume collaborator needed by usage counting.
    #[must_use]
    pub fn with_volume_source(mut self, volume_source: Arc<dyn VolumeSource>) -> Self {
        self.volume_source = Some(volume_source);
        self
    }

    /// Checks the configuration without touching the cluster.
    pub fn validate(&self) -> AppResult<()> {
        self.filters.validate()?;
        validate_sort_keys(&self.sort_by)?;

        if self.needs_usage() && self.volume_source.is_none() {
            return Err(AppError::Validation(
                "in-use filtering and display require a volume lister".to_owned(),
            ));
        }

        Ok(())
    }

    /// Lists, filters, enriches and sorts ticket secrets.
    pub async fn list(&self, context: &ListContext) -> AppResult<Vec<TicketSecret>> {
        self.validate()?;

        let mut secrets = self
            .collect_ticket_secrets(context, self.namespace.as_str())
            .await?;

        let now = self.clock.now();
        let predicates = self.filters.predicates();
        secrets.retain(|secret| {
            predicates
                .iter()
                .all(|predicate| predicate.matches(secret.ticket(), now))
        });

        if self.needs_usage() {
            self.enrich_usage(context, &mut secrets).await?;
        }

        if self.filter_in_use {
            secrets.retain(|secret| secret.usage_count() > 0);
        }

        sort_records(&mut secrets, &self.sort_by);

        debug!(
            namespace = %self.namespace,
            count = secrets.len(),
            "listed ticket secrets"
        );

        Ok(secrets)
    }

    fn needs_usage(&self) -> bool {
        self.filter_in_use || self.show_in_use
    }

    async fn collect_ticket_secrets(
        &self,
        context: &ListContext,
        namespace: &str,
    ) -> AppResult<Vec<TicketSecret>> {
        let secrets = context.run(self.client.list_secrets(namespace)).await?;
        let listed_count = secrets.len();

        let ticket_secrets: Vec<TicketSecret> = secrets
            .into_iter()
            .filter_map(|secret| {
                let payload = secret.ticket_payload()?;
                match self.decoder.decode(payload) {
                    Ok(ticket) => Some(TicketSecret::new(secret.secret_ref().clone(), ticket)),
                    Err(error) => {
                        debug!(
                            secret = %secret.secret_ref(),
                            error = %error,
                            "skipping secret with undecodable ticket"
                        );
                        None
                    }
                }
            })
            .collect();

        debug!(
            namespace = %namespace,
            listed_count,
            ticket_count = ticket_secrets.len(),
            "decoded ticket secrets"
        );

        Ok(ticket_secrets)
    }

    async fn enrich_usage(
        &self,
        context: &ListContext,
        secrets: &mut [TicketSecret],
    ) -> AppResult<()> {
        let Some(volume_source) = &self.volume_source else {
            return Err(AppError::Validation(
                "in-use filtering and display require a volume lister".to_owned(),
            ));
        };

        context.check()?;
        let volumes = volume_source
            .list_volume_records(context, &SecretSelector::all())
            .await?;

        let mut usage: HashMap<&ObjectRef, u32> = HashMap::new();
        for volume in &volumes {
            if let Some(secret_ref) = volume.mount_secret_ref() {
                let count = usage.entry(secret_ref).or_default();
                *count = count.saturating_add(1);
            }
        }

        for secret in secrets.iter_mut() {
            let count = usage.get(secret.secret_ref()).copied().unwrap_or_default();
            secret.set_usage_count(count);
        }

        Ok(())
    }
}

#[async_trait]
impl TicketSecretSource for SecretLister {
    async fn list_ticket_secrets(
        &self,
        context: &ListContext,
        namespace: &str,
    ) -> AppResult<Vec<TicketSecret>> {
        self.collect_ticket_secrets(context, namespace).await
    }
}
