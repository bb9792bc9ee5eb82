//! Folder path module.
//!
//! This module contains the dialect-agnostic representation of a
//! folder path, and its rendering into a dialect native name.

use std::{fmt, ops};

use super::Dialect;

/// Represents a folder path as an ordered list of segments,
/// independent from any server dialect.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalPath(pub Vec<String>);

impl CanonicalPath {
    /// Courier servers nest every folder under this root.
    pub const COURIER_ROOT: &'static str = "INBOX";

    /// Renders the path into the native name of the given dialect.
    ///
    /// The empty path and the inbox render as `INBOX` for every
    /// dialect, an empty mailbox name being invalid. The empty path
    /// never comes out of [`MailboxDescriptor::to_canonical`] and does
    /// not round-trip: it parses back as `[INBOX]`.
    ///
    /// [`MailboxDescriptor::to_canonical`]: super::MailboxDescriptor::to_canonical
    pub fn render(&self, dialect: Dialect) -> String {
        if self.is_inbox() {
            return Self::COURIER_ROOT.to_owned();
        }

        let sep = dialect.separator().to_string();
        let name = self.0.join(&sep);

        match dialect {
            Dialect::Courier => format!("{}{}{}", Self::COURIER_ROOT, sep, name),
            Dialect::Exchange | Dialect::Dovecot | Dialect::Unknown => name,
        }
    }

    pub fn is_inbox(&self) -> bool {
        match self.0.as_slice() {
            [] => true,
            [name] => name == Self::COURIER_ROOT,
            _ => false,
        }
    }

    /// Strips whitespaces surrounding every segment.
    pub fn trim(self) -> Self {
        Self(self.0.into_iter().map(|s| s.trim().to_owned()).collect())
    }
}

impl ops::Deref for CanonicalPath {
    type Target = Vec<String>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: ToString> FromIterator<S> for CanonicalPath {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(|s| s.to_string()).collect())
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}
