use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mapr_ticket_core::AppResult;
use mapr_ticket_domain::{
    NAMESPACE_ALL, ObjectRef, SecretSelector, TicketSecret, VolumeRecord, VolumeSortKey,
    sort_records, validate_sort_keys,
};
use tracing::{debug, warn};

use crate::{ClusterClient, ListContext, TicketSecretSource, VolumeSource};

/// Lists recognized-driver volumes mounting the selected ticket secrets.
#[derive(Clone)]
pub struct VolumeLister {
    client: Arc<dyn ClusterClient>,
    selector: SecretSelector,
    sort_by: Vec<VolumeSortKey>,
    secret_source: Option<Arc<dyn TicketSecretSource>>,
}

impl VolumeLister {
    /// Creates a lister for volumes whose mount secret matches `selector`.
    #[must_use]
    pub fn new(client: Arc<dyn ClusterClient>, selector: SecretSelector) -> Self {
        Self {
            client,
            selector,
            sort_by: VolumeSortKey::DEFAULT_ORDER.to_vec(),
            secret_source: None,
        }
    }

    /// Replaces the sort order, highest priority first.
    #[must_use]
    pub fn with_sort_by(mut self, sort_by: Vec<VolumeSortKey>) -> Self {
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

    /// Lists, joins and sorts volume records.
    pub async fn list(&self, context: &ListContext) -> AppResult<Vec<VolumeRecord>> {
        self.validate()?;

        let mut records = self.collect_volume_records(context, &self.selector).await?;

        if let Some(secret_source) = &self.secret_source {
            attach_ticket_secrets(context, secret_source.as_ref(), &mut records).await?;
        }

        sort_records(&mut records, &self.sort_by);

        debug!(
            namespace = %self.selector.selected_namespace(),
            secret = %self.selector.selected_name(),
            count = records.len(),
            "listed ticket volumes"
        );

        Ok(records)
    }

    async fn collect_volume_records(
        &self,
        context: &ListContext,
        selector: &SecretSelector,
    ) -> AppResult<Vec<VolumeRecord>> {
        let volumes = context.run(self.client.list_volumes()).await?;

        Ok(volumes
            .into_iter()
            .filter(|volume| volume.has_recognized_driver())
            .filter(|volume| {
                // Every recognized volume is listed across all namespaces,
                // with or without a mount secret.
                selector.is_all_namespaces()
                    || volume
                        .mount_secret_ref()
                        .is_some_and(|secret_ref| selector.matches(secret_ref))
            })
            .map(VolumeRecord::new)
            .collect())
    }
}

async fn attach_ticket_secrets(
    context: &ListContext,
    secret_source: &dyn TicketSecretSource,
    records: &mut [VolumeRecord],
) -> AppResult<()> {
    let Some(lookup) = load_ticket_secret_lookup(context, secret_source).await? else {
        return Ok(());
    };

    for record in records.iter_mut() {
        let ticket_secret = record
            .mount_secret_ref()
            .and_then(|secret_ref| lookup.get(secret_ref))
            .cloned();
        if let Some(ticket_secret) = ticket_secret {
            record.attach_ticket_secret(ticket_secret);
        }
    }

    Ok(())
}

/// Lists every ticket secret and indexes it by `(namespace, name)`.
///
/// A failing source yields `None` so the caller keeps its records without
/// tickets; context errors still abort the listing.
pub(crate) async fn load_ticket_secret_lookup(
    context: &ListContext,
    secret_source: &dyn TicketSecretSource,
) -> AppResult<Option<HashMap<ObjectRef, TicketSecret>>> {
    match secret_source.list_ticket_secrets(context, NAMESPACE_ALL).await {
        Ok(secrets) => Ok(Some(
            secrets
                .into_iter()
                .map(|secret| (secret.secret_ref().clone(), secret))
                .collect(),
        )),
        Err(error) if error.is_context_error() => Err(error),
        Err(error) => {
            warn!(
                error = %error,
                "failed to list ticket secrets, continuing without tickets"
            );
            Ok(None)
        }
    }
}

#[async_trait]
impl VolumeSource for VolumeLister {
    async fn list_volume_records(
        &self,
        context: &ListContext,
        selector: &SecretSelector,
    ) -> AppResult<Vec<VolumeRecord>> {
        let mut records = self.collect_volume_records(context, selector).await?;
        sort_records(&mut records, &VolumeSortKey::DEFAULT_ORDER);
        Ok(records)
    }
}
