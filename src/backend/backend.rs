//! Backend module.
//!
//! This module exposes the backend trait, which describes the few
//! IMAP capabilities the synchronization relies on. It can be used
//! to plug custom backend implementations.

use std::result;
use thiserror::Error;

use crate::{Dialect, Folders};

#[cfg(feature = "imap-backend")]
use crate::backend;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot select folder {0}: {1}")]
    SelectFolderRejectedError(String, String),
    #[error("cannot execute command {0}: {1}")]
    CommandError(String, String),

    #[cfg(feature = "imap-backend")]
    #[error(transparent)]
    ImapBackendError(#[from] backend::imap::Error),
}

impl Error {
    /// Gets the reason given by the server when it refused to select
    /// a folder.
    pub fn rejection(&self) -> Option<&str> {
        match self {
            Self::SelectFolderRejectedError(_, reason) => Some(reason),
            _ => None,
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

/// Represents the way a folder is selected.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SelectMode {
    /// Selects the folder read-only (IMAP `EXAMINE`).
    #[default]
    ReadOnly,
    /// Selects the folder read-write (IMAP `SELECT`).
    ReadWrite,
}

/// Represents the outcome of a folder creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderCreation {
    Created,
    AlreadyExists,
}

/// Operations expected from a connected and authenticated account.
///
/// Folder-scoped operations take the raw folder name and address the
/// folder previously selected with [`Backend::select_folder`].
pub trait Backend: Send + Sync {
    /// Gets the greeting sent by the server when connecting.
    fn greeting(&self) -> &str;

    /// Guesses the dialect of the server from its greeting.
    fn dialect(&self) -> Dialect {
        Dialect::classify(self.greeting()).0
    }

    fn list_folders(&self) -> Result<Folders>;
    fn select_folder(&self, folder: &str, mode: SelectMode) -> Result<()>;
    fn create_folder(&self, folder: &str) -> Result<FolderCreation>;

    /// Lists the sequence numbers of all the emails of the folder, in
    /// ascending order.
    fn search_all(&self, folder: &str) -> Result<Vec<u32>>;
    fn fetch_headers(&self, folder: &str, seq: u32) -> Result<Vec<u8>>;
    fn fetch_email(&self, folder: &str, seq: u32) -> Result<Vec<u8>>;
    fn append_email(&self, folder: &str, email: &[u8]) -> Result<()>;
}
