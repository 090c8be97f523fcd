use chrono::Utc;
use clap::Args;
use mapr_ticket_application::TicketInspector;
use mapr_ticket_core::AppResult;
use mapr_ticket_domain::ObjectRef;

use super::CommandRuntime;
use crate::render::{OutputFormat, render_inspection};

/// Show the decoded ticket of one secret.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Ticket secret name
    secret: String,

    /// Namespace of the secret
    #[arg(short, long)]
    namespace: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

pub async fn run(args: &InspectArgs, runtime: &CommandRuntime) -> AppResult<String> {
    let namespace = args
        .namespace
        .clone()
        .unwrap_or_else(|| runtime.config.default_namespace.clone());

    let secret = TicketInspector::new(runtime.client.clone(), runtime.decoder.clone())
        .inspect(&runtime.context, &ObjectRef::new(namespace, args.secret.as_str()))
        .await?;

    render_inspection(&secret, args.output, Utc::now())
}
