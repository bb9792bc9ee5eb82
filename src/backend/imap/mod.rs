pub mod backend;
pub mod config;

pub use self::backend::{Error, ImapBackend, ImapBackendBuilder, ImapSession, Result};
pub use self::config::ImapConfig;
