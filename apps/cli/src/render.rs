//! Table and JSON rendering of listing results.

use chrono::{DateTime, Duration, Utc};
use clap::ValueEnum;
use mapr_ticket_core::{AppError, AppResult};
use mapr_ticket_domain::{ClaimRecord, Ticket, TicketSecret, TicketStatus, VolumeRecord};
use serde::Serialize;

const NONE: &str = "<none>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Wide,
    Json,
}

#[derive(Debug, Serialize)]
struct TicketView {
    cluster: String,
    user: Option<String>,
    uid: Option<u32>,
    gids: Vec<u32>,
    creation_time: DateTime<Utc>,
    expiry_time: DateTime<Utc>,
    status: String,
}

impl TicketView {
    fn new(ticket: &Ticket, now: DateTime<Utc>) -> Self {
        Self {
            cluster: ticket.cluster().to_owned(),
            user: ticket.user().map(str::to_owned),
            uid: ticket.uid(),
            gids: ticket.gids().to_vec(),
            creation_time: ticket.creation_time(),
            expiry_time: ticket.expiry_time(),
            status: ticket_status(ticket, now),
        }
    }
}

#[derive(Debug, Serialize)]
struct SecretView {
    namespace: String,
    name: String,
    ticket: TicketView,
    #[serde(skip_serializing_if = "Option::is_none")]
    usage_count: Option<u32>,
}

#[derive(Debug, Serialize)]
struct VolumeView {
    name: String,
    csi_driver: Option<String>,
    volume_handle: Option<String>,
    volume_path: Option<String>,
    secret: Option<String>,
    claim: Option<String>,
    ticket: Option<TicketView>,
}

#[derive(Debug, Serialize)]
struct ClaimView {
    namespace: String,
    name: String,
    volume: String,
    volume_handle: Option<String>,
    volume_path: Option<String>,
    secret: Option<String>,
    ticket: Option<TicketView>,
}

/// Formats a ticket status as `Valid (expires in 3d4h)` or `Expired (2h ago)`.
pub fn ticket_status(ticket: &Ticket, now: DateTime<Utc>) -> String {
    match ticket.status_at(now) {
        TicketStatus::Valid { remaining } => {
            format!("Valid (expires in {})", human_duration(remaining))
        }
        TicketStatus::Expired { since } => format!("Expired ({} ago)", human_duration(since)),
    }
}

/// Formats a duration with its two most significant units.
pub fn human_duration(duration: Duration) -> String {
    let seconds = duration.num_seconds().unsigned_abs();
    let days = seconds / 86_400;
    let hours = seconds % 86_400 / 3_600;
    let minutes = seconds % 3_600 / 60;

    let (major, minor) = if days > 0 {
        ((days, 'd'), (hours, 'h'))
    } else if hours > 0 {
        ((hours, 'h'), (minutes, 'm'))
    } else if minutes > 0 {
        ((minutes, 'm'), (seconds % 60, 's'))
    } else {
        return format!("{seconds}s");
    };

    if minor.0 == 0 {
        format!("{}{}", major.0, major.1)
    } else {
        format!("{}{}{}{}", major.0, major.1, minor.0, minor.1)
    }
}

fn or_none(value: Option<&str>) -> String {
    value.unwrap_or(NONE).to_owned()
}

fn expiry_cell(ticket: Option<&Ticket>) -> String {
    ticket.map_or_else(|| NONE.to_owned(), |ticket| ticket.expiry_time().to_rfc3339())
}

fn status_cell(ticket: Option<&Ticket>, now: DateTime<Utc>) -> String {
    ticket.map_or_else(|| NONE.to_owned(), |ticket| ticket_status(ticket, now))
}

fn format_row(cells: &[&str], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("   ")
        .trim_end()
        .to_owned()
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|header| header.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = vec![format_row(headers, &widths)];
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        lines.push(format_row(&cells, &widths));
    }
    lines.join("\n")
}

fn render_json<T: Serialize>(views: &T) -> AppResult<String> {
    serde_json::to_string_pretty(views)
        .map_err(|error| AppError::Internal(format!("failed to encode JSON output: {error}")))
}

/// Renders ticket secrets, with a usage column when counts were computed.
pub fn render_secrets(
    secrets: &[TicketSecret],
    format: OutputFormat,
    show_in_use: bool,
    now: DateTime<Utc>,
) -> AppResult<String> {
    if format == OutputFormat::Json {
        let views: Vec<SecretView> = secrets
            .iter()
            .map(|secret| SecretView {
                namespace: secret.secret_ref().namespace().to_owned(),
                name: secret.secret_ref().name().to_owned(),
                ticket: TicketView::new(secret.ticket(), now),
                usage_count: show_in_use.then_some(secret.usage_count()),
            })
            .collect();
        return render_json(&views);
    }

    let wide = format == OutputFormat::Wide;
    let mut headers = vec!["NAMESPACE", "NAME", "CLUSTER", "USER", "STATUS"];
    if show_in_use {
        headers.push("IN USE");
    }
    if wide {
        headers.extend(["UID", "GIDS", "CREATED", "EXPIRES"]);
    }

    let rows: Vec<Vec<String>> = secrets
        .iter()
        .map(|secret| {
            let ticket = secret.ticket();
            let mut row = vec![
                secret.secret_ref().namespace().to_owned(),
                secret.secret_ref().name().to_owned(),
                ticket.cluster().to_owned(),
                or_none(ticket.user()),
                ticket_status(ticket, now),
            ];
            if show_in_use {
                row.push(secret.usage_count().to_string());
            }
            if wide {
                row.push(ticket.uid().map_or_else(|| NONE.to_owned(), |uid| uid.to_string()));
                row.push(if ticket.gids().is_empty() {
                    NONE.to_owned()
                } else {
                    ticket
                        .gids()
                        .iter()
                        .map(u32::to_string)
                        .collect::<Vec<_>>()
                        .join(",")
                });
                row.push(ticket.creation_time().to_rfc3339());
                row.push(ticket.expiry_time().to_rfc3339());
            }
            row
        })
        .collect();

    Ok(render_table(&headers, &rows))
}

/// Renders volume records.
pub fn render_volumes(
    records: &[VolumeRecord],
    format: OutputFormat,
    now: DateTime<Utc>,
) -> AppResult<String> {
    if format == OutputFormat::Json {
        let views: Vec<VolumeView> = records
            .iter()
            .map(|record| VolumeView {
                name: record.name().to_owned(),
                csi_driver: record.csi_driver().map(str::to_owned),
                volume_handle: record.volume_handle().map(str::to_owned),
                volume_path: record.volume_path().map(str::to_owned),
                secret: record.mount_secret_ref().map(ToString::to_string),
                claim: record.claim_ref().map(ToString::to_string),
                ticket: record
                    .ticket_secret()
                    .map(|secret| TicketView::new(secret.ticket(), now)),
            })
            .collect();
        return render_json(&views);
    }

    let wide = format == OutputFormat::Wide;
    let mut headers = vec!["NAME", "SECRET NAMESPACE", "SECRET", "CLAIM", "STATUS"];
    if wide {
        headers.extend(["DRIVER", "VOLUME HANDLE", "VOLUME PATH", "EXPIRES"]);
    }

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            let ticket = record.ticket_secret().map(TicketSecret::ticket);
            let mut row = vec![
                record.name().to_owned(),
                or_none(record.mount_secret_ref().map(|secret| secret.namespace())),
                or_none(record.mount_secret_ref().map(|secret| secret.name())),
                record
                    .claim_ref()
                    .map_or_else(|| NONE.to_owned(), ToString::to_string),
                status_cell(ticket, now),
            ];
            if wide {
                row.push(or_none(record.csi_driver()));
                row.push(or_none(record.volume_handle()));
                row.push(or_none(record.volume_path()));
                row.push(expiry_cell(ticket));
            }
            row
        })
        .collect();

    Ok(render_table(&headers, &rows))
}

/// Renders claim records.
pub fn render_claims(
    records: &[ClaimRecord],
    format: OutputFormat,
    now: DateTime<Utc>,
) -> AppResult<String> {
    if format == OutputFormat::Json {
        let views: Vec<ClaimView> = records
            .iter()
            .map(|record| ClaimView {
                namespace: record.claim_ref().namespace().to_owned(),
                name: record.claim_ref().name().to_owned(),
                volume: record.volume().name().to_owned(),
                volume_handle: record.volume().volume_handle().map(str::to_owned),
                volume_path: record.volume().volume_path().map(str::to_owned),
                secret: record.volume().mount_secret_ref().map(ToString::to_string),
                ticket: record
                    .ticket_secret()
                    .map(|secret| TicketView::new(secret.ticket(), now)),
            })
            .collect();
        return render_json(&views);
    }

    let wide = format == OutputFormat::Wide;
    let mut headers = vec!["NAMESPACE", "NAME", "VOLUME", "SECRET", "STATUS"];
    if wide {
        headers.extend(["VOLUME HANDLE", "VOLUME PATH", "EXPIRES"]);
    }

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            let ticket = record.ticket_secret().map(TicketSecret::ticket);
            let mut row = vec![
                record.claim_ref().namespace().to_owned(),
                record.claim_ref().name().to_owned(),
                record.volume().name().to_owned(),
                record
                    .volume()
                    .mount_secret_ref()
                    .map_or_else(|| NONE.to_owned(), ToString::to_string),
                status_cell(ticket, now),
            ];
            if wide {
                row.push(or_none(record.volume().volume_handle()));
                row.push(or_none(record.volume().volume_path()));
                row.push(expiry_cell(ticket));
            }
            row
        })
        .collect();

    Ok(render_table(&headers, &rows))
}

/// Renders one inspected ticket secret as key/value lines.
pub fn render_inspection(
    secret: &TicketSecret,
    format: OutputFormat,
    now: DateTime<Utc>,
) -> AppResult<String> {
    let view = SecretView {
        namespace: secret.secret_ref().namespace().to_owned(),
        name: secret.secret_ref().name().to_owned(),
        ticket: TicketView::new(secret.ticket(), now),
        usage_count: None,
    };
    if format == OutputFormat::Json {
        return render_json(&view);
    }

    let ticket = &view.ticket;
    let gids = ticket
        .gids
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",");
    let fields = [
        ("Secret", format!("{}/{}", view.namespace, view.name)),
        ("Cluster", ticket.cluster.clone()),
        ("User", or_none(ticket.user.as_deref())),
        (
            "UID",
            ticket.uid.map_or_else(|| NONE.to_owned(), |uid| uid.to_string()),
        ),
        ("GIDs", if gids.is_empty() { NONE.to_owned() } else { gids }),
        ("Created", ticket.creation_time.to_rfc3339()),
        ("Expires", ticket.expiry_time.to_rfc3339()),
        ("Status", ticket.status.clone()),
    ];

    Ok(fields
        .iter()
        .map(|(label, value)| format!("{:<9}{value}", format!("{label}:")))
        .collect::<Vec<_>>()
        .join("\n"))
}
