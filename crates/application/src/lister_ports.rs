use async_trait::async_trait;
use mapr_ticket_core::AppResult;
use mapr_ticket_domain::{SecretSelector, TicketSecret, VolumeRecord};

use crate::ListContext;

/// Optional collaborator supplying decoded ticket secrets to the volume and
/// claim listers.
#[async_trait]
pub trait TicketSecretSource: Send + Sync {
    /// Lists every decodable ticket secret in `namespace`, unfiltered.
    async fn list_ticket_secrets(
        &self,
        context: &ListContext,
        namespace: &str,
    ) -> AppResult<Vec<TicketSecret>>;
}

/// Optional collaborator supplying recognized-driver volumes to the secret
/// lister's usage enrichment.
#[async_trait]
pub trait VolumeSource: Send + Sync {
    /// Lists recognized-driver volumes whose mount secret matches `selector`.
    async fn list_volume_records(
        &self,
        context: &ListContext,
        selector: &SecretSelector,
    ) -> AppResult<Vec<VolumeRecord>>;
}
