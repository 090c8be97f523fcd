use chrono::Utc;
use clap::Args;
use mapr_ticket_application::ClaimLister;
use mapr_ticket_core::AppResult;
use mapr_ticket_domain::ClaimSortKey;

use super::{CommandRuntime, ScopeArgs, sort_keys};
use crate::render::{OutputFormat, render_claims};

/// List bound claims backed by MapR CSI volumes.
#[derive(Args, Debug)]
pub struct ClaimArgs {
    #[command(flatten)]
    scope: ScopeArgs,

    /// Comma separated sort keys, highest priority first
    #[arg(long, value_delimiter = ',')]
    sort_by: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

impl ClaimArgs {
    /// Checks flags that need no cluster access.
    pub fn validate(&self) -> AppResult<()> {
        self.sort_keys().map(|_| ())
    }

    fn sort_keys(&self) -> AppResult<Vec<ClaimSortKey>> {
        sort_keys(&self.sort_by, &ClaimSortKey::DEFAULT_ORDER)
    }
}

pub async fn run(args: &ClaimArgs, runtime: &CommandRuntime) -> AppResult<String> {
    let records = ClaimLister::new(runtime.client.clone(), runtime.namespace(&args.scope))
        .with_sort_by(args.sort_keys()?)
        .with_secret_source(runtime.ticket_secret_source())
        .list(&runtime.context)
        .await?;

    render_claims(&records, args.output, Utc::now())
}
