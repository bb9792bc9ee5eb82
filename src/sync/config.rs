//! Sync config module.
//!
//! This module contains the filters and switches of a
//! synchronization run.

use chrono::NaiveDate;
use regex::Regex;
use std::str::FromStr;

use crate::MailboxDescriptor;

use super::{Error, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Restricts the synchronization to a single source folder,
/// optionally copied under another name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRestriction {
    pub source: String,
    pub destination: Option<String>,
}

impl FolderRestriction {
    pub fn matches(&self, folder: &MailboxDescriptor) -> bool {
        folder.name == self.source || folder.decoded_name() == self.source
    }
}

impl FromStr for FolderRestriction {
    type Err = Error;

    /// Parses `source[:destination]`.
    fn from_str(folder: &str) -> Result<Self> {
        let (source, destination) = match folder.split_once(':') {
            Some((source, destination)) => (source, Some(destination)),
            None => (folder, None),
        };

        if source.is_empty() {
            return Err(Error::ParseFolderRestrictionError(folder.to_owned()));
        }

        Ok(Self {
            source: source.to_owned(),
            destination: destination
                .filter(|destination| !destination.is_empty())
                .map(String::from),
        })
    }
}

/// Represents an inclusive range of dates. Missing bounds are open.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Self> {
        match (from, to) {
            (Some(from), Some(to)) if from > to => Err(Error::InvalidDateRangeError(from, to)),
            _ => Ok(Self { from, to }),
        }
    }

    /// Parses a `YYYY-MM-DD` date.
    pub fn parse_date(date: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
            .map_err(|err| Error::ParseDateError(err, date.to_owned()))
    }

    /// Returns `true` if at least one bound is set.
    pub fn is_active(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

/// Represents the configuration of a synchronization run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Source folders matching one of these patterns are skipped.
    pub excludes: Vec<Regex>,
    /// Only synchronizes this folder.
    pub folder: Option<FolderRestriction>,
    /// Only copies emails dated within this range.
    pub date_range: DateRange,
    /// Only creates folders, never copies emails.
    pub skeleton: bool,
    /// Computes decisions without modifying the destination.
    pub simulate: bool,
    /// Strips whitespaces surrounding folder name segments.
    pub trim: bool,
    /// Number of sessions opened per account.
    pub pool_size: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            excludes: Vec::new(),
            folder: None,
            date_range: DateRange::default(),
            skeleton: false,
            simulate: false,
            trim: false,
            pool_size: 1,
        }
    }
}

impl SyncConfig {
    /// Adds an exclude pattern. Like a folder restriction, the
    /// pattern applies to the source folder name and must match from
    /// its beginning.
    pub fn exclude<P: AsRef<str>>(mut self, pattern: P) -> Result<Self> {
        let pattern = pattern.as_ref();
        let regex = Regex::new(&format!("^(?:{})", pattern))
            .map_err(|err| Error::ParseExcludePatternError(err, pattern.to_owned()))?;
        self.excludes.push(regex);
        Ok(self)
    }

    pub fn is_excluded(&self, folder: &MailboxDescriptor) -> bool {
        let decoded = folder.decoded_name();
        self.excludes
            .iter()
            .any(|regex| regex.is_match(&folder.name) || regex.is_match(&decoded))
    }

    /// Returns `true` if the folder is filtered out by the exclude
    /// patterns or by the folder restriction.
    pub fn is_skipped(&self, folder: &MailboxDescriptor) -> bool {
        match &self.folder {
            Some(restriction) => !restriction.matches(folder),
            None => self.is_excluded(folder),
        }
    }
}
