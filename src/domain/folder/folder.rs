//! Folder module.
//!
//! This module contains the representation of a folder discovered on
//! an IMAP server.

use std::fmt;
use utf7_imap::decode_utf7_imap as decode_utf7;

use super::{CanonicalPath, Dialect, Error, Result};

/// Represents a folder as listed by a server.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MailboxDescriptor {
    /// Represents the dialect the name is encoded for.
    pub dialect: Dialect,
    /// Represents the attributes reported by the server.
    pub flags: Vec<String>,
    /// Represents the folder hierarchy delimiter, `None` for flat
    /// servers.
    pub delim: Option<char>,
    /// Represents the raw folder name, as sent over the wire.
    pub name: String,
}

impl MailboxDescriptor {
    pub fn new<N: ToString>(dialect: Dialect, delim: Option<char>, name: N) -> Self {
        Self {
            dialect,
            flags: Vec::new(),
            delim,
            name: name.to_string(),
        }
    }

    /// Converts the native name into a dialect-agnostic path.
    ///
    /// Trailing empty segments (a name ending with its delimiter) are
    /// dropped. For the Courier dialect the leading `INBOX` root is
    /// mandatory and stripped, unless it is the only segment: the
    /// inbox itself keeps its name across dialects.
    pub fn to_canonical(&self) -> Result<CanonicalPath> {
        let mut segments: Vec<String> = match self.delim {
            Some(delim) => self.name.split(delim).map(String::from).collect(),
            None => vec![self.name.clone()],
        };

        while segments.len() > 1 && segments.last().map_or(false, String::is_empty) {
            segments.pop();
        }

        if self.dialect == Dialect::Courier {
            if segments.first().map(String::as_str) != Some(CanonicalPath::COURIER_ROOT) {
                return Err(Error::MissingCourierRootError(self.name.clone()));
            }
            if segments.len() > 1 {
                segments.remove(0);
            }
        }

        Ok(CanonicalPath::from_iter(segments))
    }

    /// Decodes the name from IMAP modified UTF-7.
    pub fn decoded_name(&self) -> String {
        decode_utf7(self.name.clone())
    }
}

impl fmt::Display for MailboxDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.decoded_name())
    }
}
