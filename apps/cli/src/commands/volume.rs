use chrono::Utc;
use clap::Args;
use mapr_ticket_application::VolumeLister;
use mapr_ticket_core::AppResult;
use mapr_ticket_domain::{SECRET_ALL, SecretSelector, VolumeSortKey};

use super::{CommandRuntime, ScopeArgs, sort_keys};
use crate::render::{OutputFormat, render_volumes};

/// List persistent volumes mounting MapR ticket secrets.
#[derive(Args, Debug)]
pub struct VolumeArgs {
    /// Ticket secret name; every secret in the namespace when omitted
    secret: Option<String>,

    #[command(flatten)]
    scope: ScopeArgs,

    /// Comma separated sort keys, highest priority first
    #[arg(long, value_delimiter = ',')]
    sort_by: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

impl VolumeArgs {
    /// Checks flags that need no cluster access.
    pub fn validate(&self) -> AppResult<()> {
        self.sort_keys().map(|_| ())
    }

    fn sort_keys(&self) -> AppResult<Vec<VolumeSortKey>> {
        sort_keys(&self.sort_by, &VolumeSortKey::DEFAULT_ORDER)
    }
}

pub async fn run(args: &VolumeArgs, runtime: &CommandRuntime) -> AppResult<String> {
    let selector = SecretSelector::new(
        runtime.namespace(&args.scope),
        args.secret.as_deref().unwrap_or(SECRET_ALL),
    );

    let records = VolumeLister::new(runtime.client.clone(), selector)
        .with_sort_by(args.sort_keys()?)
        .with_secret_source(runtime.ticket_secret_source())
        .list(&runtime.context)
        .await?;

    render_volumes(&records, args.output, Utc::now())
}
