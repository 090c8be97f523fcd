//! Decoder for text ticket envelopes `"<cluster-name> <base64-body>"`.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use chrono::{DateTime, Utc};
use mapr_ticket_application::TicketDecoder;
use mapr_ticket_core::{AppError, AppResult};
use mapr_ticket_domain::Ticket;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct TicketBody {
    #[serde(default)]
    cluster: Option<String>,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    uid: Option<u32>,
    #[serde(default)]
    gids: Vec<u32>,
    creation_time_sec: i64,
    expiry_time_sec: i64,
}

/// Ticket decoder for envelopes carrying a base64 JSON ticket body.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeTicketDecoder;

impl EnvelopeTicketDecoder {
    /// Creates a decoder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TicketDecoder for EnvelopeTicketDecoder {
    fn decode(&self, payload: &[u8]) -> AppResult<Ticket> {
        let envelope = std::str::from_utf8(payload)
            .map_err(|error| AppError::Decode(format!("ticket is not valid UTF-8: {error}")))?;

        let (envelope_cluster, encoded_body) = envelope
            .trim()
            .split_once(char::is_whitespace)
            .ok_or_else(|| {
                AppError::Decode("ticket must be '<cluster-name> <base64-body>'".to_owned())
            })?;

        let body = BASE64_STANDARD
            .decode(encoded_body.trim())
            .map_err(|error| AppError::Decode(format!("invalid ticket body encoding: {error}")))?;
        let body: TicketBody = serde_json::from_slice(&body)
            .map_err(|error| AppError::Decode(format!("invalid ticket body: {error}")))?;

        let cluster = body
            .cluster
            .filter(|cluster| !cluster.trim().is_empty())
            .unwrap_or_else(|| envelope_cluster.to_owned());

        let mut ticket = Ticket::new(
            cluster,
            timestamp("creation_time_sec", body.creation_time_sec)?,
            timestamp("expiry_time_sec", body.expiry_time_sec)?,
        )
        .with_gids(body.gids);
        if let Some(user) = body.user {
            ticket = ticket.with_user(user);
        }
        if let Some(uid) = body.uid {
            ticket = ticket.with_uid(uid);
        }

        Ok(ticket)
    }
}

fn timestamp(field: &str, seconds: i64) -> AppResult<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| AppError::Decode(format!("{field} {seconds} is out of range")))
}
