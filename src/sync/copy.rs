//! Copy module.
//!
//! This module contains the only operation of the synchronization
//! that modifies the destination.

use log::debug;

use crate::Backend;

use super::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    Simulated,
}

/// Fetches the whole email from the source folder and appends it
/// verbatim to the destination folder. In simulate mode nothing is
/// fetched nor appended.
pub fn copy_email<S, D>(
    source: &S,
    source_folder: &str,
    seq: u32,
    destination: &D,
    destination_folder: &str,
    simulate: bool,
) -> Result<CopyOutcome>
where
    S: Backend + ?Sized,
    D: Backend + ?Sized,
{
    if simulate {
        debug!("simulate mode, skipping copy of email {}", seq);
        return Ok(CopyOutcome::Simulated);
    }

    let copy_err = |err| {
        Error::CopyEmailError(
            err,
            seq,
            source_folder.to_owned(),
            destination_folder.to_owned(),
        )
    };

    let email = source.fetch_email(source_folder, seq).map_err(copy_err)?;
    destination
        .append_email(destination_folder, &email)
        .map_err(copy_err)?;

    debug!(
        "email {} ({} bytes) copied from {} to {}",
        seq,
        email.len(),
        source_folder,
        destination_folder
    );
    Ok(CopyOutcome::Copied)
}
