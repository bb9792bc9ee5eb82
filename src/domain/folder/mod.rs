//! Folder module.
//!
//! This module contains everything related to email folders: server
//! dialects, folder descriptors and dialect-agnostic folder paths.

use std::result;
use thiserror::Error;

pub mod dialect;
pub use dialect::*;

pub mod folder;
pub use folder::*;

pub mod folders;
pub use folders::*;

pub mod path;
pub use path::*;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot parse courier folder {0}: name must start with INBOX")]
    MissingCourierRootError(String),
}

pub type Result<T> = result::Result<T, Error>;
