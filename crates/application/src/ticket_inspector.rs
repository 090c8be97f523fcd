use std::sync::Arc;

use mapr_ticket_core::{AppError, AppResult};
use mapr_ticket_domain::{CONTAINER_TICKET_KEY, ObjectRef, TicketSecret};

use crate::{ClusterClient, ListContext, TicketDecoder};

/// Decodes the ticket of one named secret.
///
/// Unlike the listers, every failure is reported to the caller.
#[derive(Clone)]
pub struct TicketInspector {
    client: Arc<dyn ClusterClient>,
    decoder: Arc<dyn TicketDecoder>,
}

impl TicketInspector {
    /// Creates an inspector.
    #[must_use]
    pub fn new(client: Arc<dyn ClusterClient>, decoder: Arc<dyn TicketDecoder>) -> Self {
        Self { client, decoder }
    }

    /// Returns the decoded ticket secret named by `secret_ref`.
    pub async fn inspect(
        &self,
        context: &ListContext,
        secret_ref: &ObjectRef,
    ) -> AppResult<TicketSecret> {
        if secret_ref.namespace().is_empty() || secret_ref.name().is_empty() {
            return Err(AppError::Validation(
                "inspect requires a concrete namespace and secret name".to_owned(),
            ));
        }

        let secrets = context
            .run(self.client.list_secrets(secret_ref.namespace()))
            .await?;

        let secret = secrets
            .iter()
            .find(|secret| secret.secret_ref() == secret_ref)
            .ok_or_else(|| AppError::NotFound(format!("secret '{secret_ref}'")))?;

        let payload = secret.ticket_payload().ok_or_else(|| {
            AppError::NotFound(format!(
                "secret '{secret_ref}' has no '{CONTAINER_TICKET_KEY}' entry"
            ))
        })?;

        let ticket = self.decoder.decode(payload).map_err(|error| match error {
            AppError::Decode(message) => {
                AppError::Decode(format!("secret '{secret_ref}': {message}"))
            }
            other => other,
        })?;

        Ok(TicketSecret::new(secret_ref.clone(), ticket))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;
    use mapr_ticket_core::AppError;
    use mapr_ticket_domain::{ClusterSecret, ObjectRef};

    use super::TicketInspector;
    use crate::ListContext;
    use crate::test_support::{FakeClusterClient, scenario_secrets, ticket_secret};

    fn inspector(extra: Vec<ClusterSecret>) -> TicketInspector {
        let (mut secrets, decoder) = scenario_secrets();
        secrets.extend(extra);
        let client = FakeClusterClient {
            secrets,
            ..FakeClusterClient::default()
        };
        TicketInspector::new(Arc::new(client), Arc::new(decoder))
    }

    #[tokio::test]
    async fn inspect_returns_decoded_ticket() {
        let result = inspector(Vec::new())
            .inspect(&ListContext::background(), &ObjectRef::new("default", "s2"))
            .await;
        assert!(result.is_ok());

        let secret = result.unwrap_or_else(|_| unreachable!());
        assert_eq!(secret.ticket().cluster(), "A");
        assert_eq!(secret.ticket().user(), Some("alice"));
        assert_eq!(
            secret.ticket().expiry_time() - crate::test_support::now(),
            Duration::hours(1)
        );
    }

    #[tokio::test]
    async fn missing_secret_is_not_found() {
        let result = inspector(Vec::new())
            .inspect(&ListContext::background(), &ObjectRef::new("default", "nope"))
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn secret_without_payload_is_not_found() {
        let result = inspector(Vec::new())
            .inspect(&ListContext::background(), &ObjectRef::new("default", "s1"))
            .await;
        assert!(matches!(
            result,
            Err(AppError::NotFound(message)) if message.contains("CONTAINER_TICKET")
        ));
    }

    #[tokio::test]
    async fn undecodable_payload_is_reported() {
        let result = inspector(vec![ticket_secret("default", "broken", "garbage")])
            .inspect(&ListContext::background(), &ObjectRef::new("default", "broken"))
            .await;
        assert!(matches!(
            result,
            Err(AppError::Decode(message)) if message.contains("default/broken")
        ));
    }

    #[tokio::test]
    async fn blank_reference_is_rejected_before_listing() {
        let result = inspector(Vec::new())
            .inspect(&ListContext::background(), &ObjectRef::new("", "s2"))
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
