//! Sync event module.
//!
//! This module contains the events emitted during a synchronization
//! run. They let callers report progress without the engine writing
//! anything itself.

use chrono::NaiveDate;
use std::fmt;

use crate::{Dialect, MessageId};

/// Represents the states of a synchronization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    ConnectingSource,
    ConnectingDestination,
    EnumeratingFolders,
    PerFolderSync,
    Complete,
}

/// Represents one side of the synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Destination,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Destination => write!(f, "destination"),
        }
    }
}

/// Represents the reason why a folder is not synchronized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderSkipReason {
    /// Filtered out by an exclude pattern or a folder restriction.
    Excluded,
    /// Exchange pseudo-folder that cannot be selected.
    SpecialMailbox(String),
}

/// Represents the reason why an email is not copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailSkipReason {
    /// The destination already contains an email with the same
    /// identity.
    Present,
    /// The email date is outside the configured range.
    OutOfRange(NaiveDate),
    /// A date range is configured but the email has no parsable date.
    NoDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    StateChanged(RunState),
    ServerClassified(Side, Dialect, String),
    FoldersListed(Side, Vec<String>),
    FolderSkipped(String, FolderSkipReason),
    FolderStarted(String, String),
    FolderCreated(String),
    FolderMissing(String),
    SkeletonOnly(String),
    IndexProgress(String, usize, usize),
    IndexBuilt(String, usize),
    DuplicateIdentities(String, usize),
    SourceEmailsFound(String, usize),
    EmailCopied(u32, Option<MessageId>),
    EmailSimulated(u32, Option<MessageId>),
    EmailSkipped(u32, Option<MessageId>, EmailSkipReason),
    FolderDone(String),
}

fn id_or_none(id: &Option<MessageId>) -> String {
    id.as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| String::from("<none>"))
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::StateChanged(state) => write!(f, "state: {:?}", state),
            Self::ServerClassified(side, _, desc) => write!(f, "{side} server type is {desc}"),
            Self::FoldersListed(side, folders) => {
                write!(f, "{side} folders: {}", folders.join(", "))
            }
            Self::FolderSkipped(folder, FolderSkipReason::Excluded) => {
                write!(f, "skipping {folder} (excluded)")
            }
            Self::FolderSkipped(folder, FolderSkipReason::SpecialMailbox(_)) => {
                write!(f, "skipping special Microsoft Exchange mailbox {folder}")
            }
            Self::FolderStarted(source, destination) => {
                write!(f, "syncing {source} into {destination}")
            }
            Self::FolderCreated(folder) => write!(f, "folder {folder} created"),
            Self::FolderMissing(folder) => write!(f, "folder {folder} would be created"),
            Self::SkeletonOnly(folder) => write!(f, "skipping email copy of {folder}"),
            Self::IndexProgress(folder, done, total) => {
                write!(f, "acquiring message ids of {folder}: {done}/{total}")
            }
            Self::IndexBuilt(folder, len) => {
                write!(f, "{len} message ids acquired from {folder}")
            }
            Self::DuplicateIdentities(folder, count) => {
                write!(f, "{count} emails of {folder} share their message id with another one")
            }
            Self::SourceEmailsFound(folder, count) => {
                write!(f, "found {count} emails in source folder {folder}")
            }
            Self::EmailCopied(_, id) => write!(f, "copying email {}", id_or_none(id)),
            Self::EmailSimulated(_, id) => {
                write!(f, "copying email {} (simulated)", id_or_none(id))
            }
            Self::EmailSkipped(_, id, EmailSkipReason::Present) => {
                write!(f, "skipping email {}", id_or_none(id))
            }
            Self::EmailSkipped(seq, _, EmailSkipReason::OutOfRange(date)) => {
                write!(f, "skipping email {seq} dated {date} (out of range)")
            }
            Self::EmailSkipped(seq, _, EmailSkipReason::NoDate) => {
                write!(f, "skipping email {seq} (no date)")
            }
            Self::FolderDone(folder) => write!(f, "folder {folder} synchronized"),
        }
    }
}
