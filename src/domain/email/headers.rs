//! Email headers module.
//!
//! This module extracts the few headers needed to reconcile two
//! folders: the `Message-ID` and the `Date`.

use chrono::{DateTime, NaiveDate};
use log::{trace, warn};
use mailparse::{MailHeader, MailHeaderMap};
use std::fmt;

/// Represents the value of a `Message-ID` header.
///
/// The value is an opaque comparison key: two identities are equal
/// only if their bytes are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(Vec<u8>);

impl MessageId {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self(id.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for MessageId {
    fn from(id: Vec<u8>) -> Self {
        Self(id)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// Represents the headers of an email, reduced to what the
/// synchronization needs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Headers {
    pub message_id: Option<MessageId>,
    pub date: Option<NaiveDate>,
}

impl Headers {
    /// Parses raw header bytes. Headers that cannot be parsed are
    /// reported as absent.
    pub fn parse(raw: &[u8]) -> Self {
        let headers = match mailparse::parse_headers(raw) {
            Ok((headers, _)) => headers,
            Err(err) => {
                warn!("cannot parse email headers, ignoring them: {}", err);
                return Self::default();
            }
        };

        let headers = Self {
            message_id: parse_message_id(&headers),
            date: parse_date(&headers),
        };

        trace!("parsed headers: {:?}", headers);
        headers
    }
}

fn parse_message_id(headers: &[MailHeader]) -> Option<MessageId> {
    let raw = headers.get_first_header("Message-ID")?.get_value_raw();
    let start = raw.iter().position(|b| !b.is_ascii_whitespace())?;
    let end = raw.iter().rposition(|b| !b.is_ascii_whitespace())?;
    Some(MessageId(raw[start..=end].to_vec()))
}

/// Keeps the calendar date as written by the sender, in the sender's
/// own offset. The day name and trailing comments are ignored, so a
/// wrong weekday does not discard the date.
fn parse_date(headers: &[MailHeader]) -> Option<NaiveDate> {
    let raw = headers.get_first_value("Date")?;
    let date = strip_weekday(strip_comments(&raw));

    match DateTime::parse_from_rfc2822(date) {
        Ok(date) => Some(date.date_naive()),
        Err(err) => {
            warn!("cannot parse date {:?}: {}", raw, err);
            None
        }
    }
}

fn strip_comments(mut date: &str) -> &str {
    date = date.trim();
    while date.ends_with(')') {
        match date.rfind('(') {
            Some(pos) => date = date[..pos].trim_end(),
            None => break,
        }
    }
    date
}

fn strip_weekday(date: &str) -> &str {
    match date.split_once(',') {
        Some((day, rest)) if day.trim().chars().all(|c| c.is_ascii_alphabetic()) => rest.trim(),
        _ => date,
    }
}
