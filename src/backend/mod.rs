mod backend;

#[cfg(feature = "imap-backend")]
pub mod imap;

pub use self::backend::{Backend, Error, FolderCreation, Result, SelectMode};
#[cfg(feature = "imap-backend")]
pub use self::imap::{ImapBackend, ImapBackendBuilder, ImapConfig};
