//! Email module.
//!
//! This module contains everything needed to identify an email
//! without downloading its body.

use std::result;
use thiserror::Error;

pub mod headers;
pub use headers::*;

pub mod index;
pub use index::*;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot build identity index of folder {1}")]
    BuildIndexError(#[source] Box<crate::backend::Error>, String),
}

pub type Result<T> = result::Result<T, Error>;
