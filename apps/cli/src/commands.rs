use std::sync::Arc;

use clap::Args;
use mapr_ticket_application::{ClusterClient, ListContext, SecretLister, TicketDecoder};
use mapr_ticket_core::AppResult;
use mapr_ticket_domain::{NAMESPACE_ALL, SortKey, parse_sort_keys};

use crate::cli_config::CliConfig;

pub mod claim;
pub mod inspect;
pub mod secret;
pub mod volume;

/// Namespace scope shared by the listing commands.
#[derive(Args, Debug, Clone, Default)]
pub struct ScopeArgs {
    /// Namespace to list from
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// List across all namespaces
    #[arg(short = 'A', long, conflicts_with = "namespace")]
    pub all_namespaces: bool,
}

/// Collaborators and settings shared by every command.
pub struct CommandRuntime {
    pub client: Arc<dyn ClusterClient>,
    pub decoder: Arc<dyn TicketDecoder>,
    pub context: ListContext,
    pub config: CliConfig,
}

impl CommandRuntime {
    /// Resolves the namespace scope, falling back to the configured default.
    pub fn namespace(&self, scope: &ScopeArgs) -> String {
        if scope.all_namespaces {
            return NAMESPACE_ALL.to_owned();
        }

        scope
            .namespace
            .clone()
            .unwrap_or_else(|| self.config.default_namespace.clone())
    }

    /// Builds the secret lister used to attach tickets to volumes and claims.
    pub fn ticket_secret_source(&self) -> Arc<SecretLister> {
        Arc::new(SecretLister::new(
            self.client.clone(),
            self.decoder.clone(),
            NAMESPACE_ALL,
        ))
    }
}

/// Parses `--sort-by` values, keeping `default` when none were given.
pub fn sort_keys<K: SortKey>(values: &[String], default: &[K]) -> AppResult<Vec<K>> {
    if values.iter().all(|value| value.trim().is_empty()) {
        return Ok(default.to_vec());
    }

    parse_sort_keys(values)
}
