use std::collections::HashMap;
use std::sync::Arc;

use mapr_ticket_core::AppResult;
use mapr_ticket_domain::{
    ClaimRecord, ClaimSortKey, PersistentVolume, sort_records, validate_sort_keys,
};
use tracing::debug;

use crate::volume_lister::load_ticket_secret_lookup;
use crate::{ClusterClient, ListContext, TicketSecretSource};

/// Lists bound claims backed by recognized-driver volumes.
#[derive(Clone)]
pub struct ClaimLister {
    client: Arc<dyn ClusterClient>,
    namespace: String,
    sort_by: Vec<ClaimSortKey>,
    secret_source: Option<Arc<dyn TicketSecretSource>>,
}

impl ClaimLister {
    /// Creates a lister for one namespace scope, `NAMESPACE_ALL` for every
    /// namespace.
    #[must_use]
    pub fn new(client: Arc<dyn ClusterClient>, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
            sort_by: ClaimSortKey::DEFAULT_ORDER.to_vec(),
            secret_source: None,
        }
    }

    /// Replaces the sort order, highest priority first.
    #[must_use]
    pub fn with_sort_by(mut self, sort_by: Vec<ClaimSortKey>) -> Self {
        self.sort_by = sort_by;
        self
    }

    /// Adds the collaborator used to attach decoded tickets.
    #[must_use]
    pub fn with_secret_source(mut self, secret_source: Arc<dyn TicketSecretSource>) -> Self {
        self.secret_source = Some(secret_source);
        self
    }

    /// Checks the configuration without touching the cluster.
    pub fn validate(&self) -> AppResult<()> {
        validate_sort_keys(&self.sort_by)
    }

    /// Lists, joins and sorts claim records.
    pub async fn list(&self, context: &ListContext) -> AppResult<Vec<ClaimRecord>> {
        self.validate()?;

        let claims = context
            .run(self.client.list_claims(self.namespace.as_str()))
            .await?;
        let bound_claims: Vec<_> = claims.into_iter().filter(|claim| claim.is_bound()).collect();

        context.check()?;
        let volumes_by_name: HashMap<String, PersistentVolume> = context
            .run(self.client.list_volumes())
            .await?
            .into_iter()
            .map(|volume| (volume.name().to_owned(), volume))
            .collect();

        let mut records: Vec<ClaimRecord> = bound_claims
            .into_iter()
            .filter_map(|claim| {
                let Some(volume) = claim
                    .volume_name()
                    .and_then(|volume_name| volumes_by_name.get(volume_name))
                else {
                    debug!(claim = %claim.claim_ref(), "skipping claim without backing volume");
                    return None;
                };

                volume
                    .has_recognized_driver()
                    .then(|| ClaimRecord::new(claim, volume.clone()))
            })
            .collect();

        if let Some(secret_source) = &self.secret_source
            && let Some(lookup) = load_ticket_secret_lookup(context, secret_source.as_ref()).await?
        {
            for record in &mut records {
                let ticket_secret = record
                    .volume()
                    .mount_secret_ref()
                    .and_then(|secret_ref| lookup.get(secret_ref))
                    .cloned();
                if let Some(ticket_secret) = ticket_secret {
                    record.attach_ticket_secret(ticket_secret);
                }
            }
        }

        sort_records(&mut records, &self.sort_by);

        debug!(
            namespace = %self.namespace,
            count = records.len(),
            "listed ticket claims"
        );

        Ok(records)
    }
}
