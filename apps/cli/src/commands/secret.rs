use std::sync::Arc;

use chrono::{Duration, Utc};
use clap::Args;
use mapr_ticket_application::{SecretFilterOptions, SecretLister, VolumeLister};
use mapr_ticket_core::AppResult;
use mapr_ticket_domain::{SecretSelector, SecretSortKey};

use super::{CommandRuntime, ScopeArgs, sort_keys};
use crate::render::{OutputFormat, render_secrets};

/// List secrets holding a MapR ticket.
#[derive(Args, Debug)]
pub struct SecretArgs {
    #[command(flatten)]
    scope: ScopeArgs,

    /// Only show expired tickets
    #[arg(long)]
    only_expired: bool,

    /// Only show tickets that have not expired
    #[arg(long)]
    only_unexpired: bool,

    /// Only show tickets for this cluster
    #[arg(long)]
    cluster: Option<String>,

    /// Only show tickets for this user
    #[arg(long)]
    user: Option<String>,

    /// Only show tickets with this uid
    #[arg(long)]
    uid: Option<u32>,

    /// Only show tickets carrying this gid
    #[arg(long)]
    gid: Option<u32>,

    /// Only show tickets expiring within this window (e.g. 90m, 1h30m, 7d)
    #[arg(long, value_parser = parse_window)]
    expires_before: Option<Duration>,

    /// Only show secrets mounted by at least one volume
    #[arg(long)]
    in_use: bool,

    /// Show the number of volumes mounting each secret
    #[arg(long)]
    show_in_use: bool,

    /// Comma separated sort keys, highest priority first
    #[arg(long, value_delimiter = ',')]
    sort_by: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

impl SecretArgs {
    /// Checks flags that need no cluster access.
    pub fn validate(&self) -> AppResult<()> {
        self.filter_options().validate()?;
        self.sort_keys()?;
        Ok(())
    }

    fn filter_options(&self) -> SecretFilterOptions {
        SecretFilterOptions {
            only_expired: self.only_expired,
            only_unexpired: self.only_unexpired,
            cluster: self.cluster.clone(),
            user: self.user.clone(),
            uid: self.uid,
            gid: self.gid,
            expires_before: self.expires_before,
        }
    }

    fn sort_keys(&self) -> AppResult<Vec<SecretSortKey>> {
        sort_keys(&self.sort_by, &SecretSortKey::DEFAULT_ORDER)
    }
}

pub async fn run(args: &SecretArgs, runtime: &CommandRuntime) -> AppResult<String> {
    let namespace = runtime.namespace(&args.scope);
    let mut lister = SecretLister::new(
        runtime.client.clone(),
        runtime.decoder.clone(),
        namespace,
    )
    .with_filters(args.filter_options())
    .with_filter_in_use(args.in_use)
    .with_show_in_use(args.show_in_use)
    .with_sort_by(args.sort_keys()?);

    if args.in_use || args.show_in_use {
        lister = lister.with_volume_source(Arc::new(VolumeLister::new(
            runtime.client.clone(),
            SecretSelector::all(),
        )));
    }

    let secrets = lister.list(&runtime.context).await?;
    render_secrets(
        &secrets,
        args.output,
        args.in_use || args.show_in_use,
        Utc::now(),
    )
}

/// Parses a window such as `90m`, `1h30m` or `7d`.
fn parse_window(value: &str) -> Result<Duration, String> {
    let window = humantime::parse_duration(value.trim())
        .map_err(|error| format!("invalid window '{value}': {error}"))?;

    Duration::from_std(window).map_err(|_| format!("window '{value}' is out of range"))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::parse_window;

    #[test]
    fn parses_window_units() {
        assert_eq!(parse_window("45s"), Ok(Duration::seconds(45)));
        assert_eq!(parse_window("90m"), Ok(Duration::minutes(90)));
        assert_eq!(parse_window(" 12h "), Ok(Duration::hours(12)));
        assert_eq!(parse_window("7d"), Ok(Duration::days(7)));
    }

    #[test]
    fn parses_compound_windows() {
        assert_eq!(parse_window("1h30m"), Ok(Duration::minutes(90)));
        assert_eq!(parse_window("2d 6h"), Ok(Duration::hours(54)));
    }

    #[test]
    fn rejects_malformed_windows() {
        assert!(parse_window("").is_err());
        assert!(parse_window("3x").is_err());
        assert!(parse_window("h").is_err());
    }
}
