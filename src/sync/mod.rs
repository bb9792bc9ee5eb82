//! Sync module.
//!
//! This module contains everything needed to copy the folders and
//! the emails of a source account into a destination account.

pub mod config;
pub use config::*;

pub mod copy;
pub use copy::*;

pub mod error;
pub use error::*;

pub mod event;
pub use event::*;

pub mod report;
pub use report::*;

#[allow(clippy::module_inception)]
pub mod sync;
pub use self::sync::*;

#[cfg(feature = "imap-backend")]
use log::info;

#[cfg(feature = "imap-backend")]
use crate::{ImapBackendBuilder, ImapConfig};

/// Connects to both accounts, synchronizes them then closes the
/// connections.
#[cfg(feature = "imap-backend")]
pub fn run(
    source: &ImapConfig,
    destination: &ImapConfig,
    builder: &SyncBuilder,
) -> Result<SyncReport> {
    builder.emit(SyncEvent::StateChanged(RunState::Idle));
    let backend_builder = ImapBackendBuilder::default().pool_size(builder.config().pool_size);

    builder.emit(SyncEvent::StateChanged(RunState::ConnectingSource));
    info!("connecting to source account {}", source);
    let source = backend_builder
        .build(source)
        .map_err(Error::ConnectSourceError)?;

    builder.emit(SyncEvent::StateChanged(RunState::ConnectingDestination));
    info!("connecting to destination account {}", destination);
    let destination = backend_builder
        .build(destination)
        .map_err(Error::ConnectDestinationError)?;

    let report = builder.sync(&source, &destination)?;

    source.close().map_err(Error::CloseConnectionError)?;
    destination.close().map_err(Error::CloseConnectionError)?;

    Ok(report)
}
