//! Folders module.
//!
//! This module contains the representation of the folders listed by
//! a server.

use std::ops;

use crate::MailboxDescriptor;

/// Represents the list of folders.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Folders(pub Vec<MailboxDescriptor>);

impl ops::Deref for Folders {
    type Target = Vec<MailboxDescriptor>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ops::DerefMut for Folders {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl FromIterator<MailboxDescriptor> for Folders {
    fn from_iter<T: IntoIterator<Item = MailboxDescriptor>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Folders {
    type Item = MailboxDescriptor;
    type IntoIter = std::vec::IntoIter<MailboxDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
