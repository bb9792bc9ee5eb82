//! Identity index module.
//!
//! This module contains the set of `Message-ID` already present in a
//! folder, built by fetching headers only.

use log::{debug, trace};
use rayon::prelude::*;
use std::{
    collections::HashSet,
    sync::atomic::{AtomicUsize, Ordering},
};

use crate::{backend, Backend};

use super::{Error, Headers, MessageId, Result};

/// Represents the identities of the emails of one folder.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IdentityIndex {
    ids: HashSet<MessageId>,
    duplicates: usize,
    anonymous: usize,
}

impl IdentityIndex {
    /// Builds the index of the given folder. Only headers are
    /// fetched. The progress callback receives the number of headers
    /// fetched so far and the total.
    pub fn build<B, P>(backend: &B, folder: &str, progress: P) -> Result<Self>
    where
        B: Backend + ?Sized,
        P: Fn(usize, usize) + Sync,
    {
        let seqs = backend
            .search_all(folder)
            .map_err(|err| Error::BuildIndexError(Box::new(err), folder.to_owned()))?;
        let total = seqs.len();
        let fetched = AtomicUsize::new(0);
        debug!("indexing {} emails of folder {}", total, folder);

        let index = seqs
            .par_iter()
            .try_fold(Self::default, |mut index, seq| {
                let headers = backend.fetch_headers(folder, *seq)?;
                index.insert(Headers::parse(&headers).message_id);
                progress(fetched.fetch_add(1, Ordering::Relaxed) + 1, total);
                backend::Result::Ok(index)
            })
            .try_reduce(Self::default, |a, b| Ok(a.merge(b)))
            .map_err(|err| Error::BuildIndexError(Box::new(err), folder.to_owned()))?;

        trace!("identity index of folder {}: {:#?}", folder, index);
        Ok(index)
    }

    /// Adds an identity to the index. Absent identities are counted
    /// but never indexed.
    pub fn insert(&mut self, id: Option<MessageId>) {
        match id {
            Some(id) => {
                if !self.ids.insert(id) {
                    self.duplicates += 1;
                }
            }
            None => self.anonymous += 1,
        }
    }

    /// Returns `true` if the identity is present. An absent identity
    /// is never present.
    pub fn contains(&self, id: Option<&MessageId>) -> bool {
        id.map_or(false, |id| self.ids.contains(id))
    }

    /// Number of distinct identities.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of emails sharing an identity with another email of the
    /// same folder.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Number of emails without `Message-ID`.
    pub fn anonymous(&self) -> usize {
        self.anonymous
    }

    fn merge(self, other: Self) -> Self {
        let (mut big, small) = if self.ids.len() >= other.ids.len() {
            (self, other)
        } else {
            (other, self)
        };

        big.duplicates += small.duplicates;
        big.anonymous += small.anonymous;
        for id in small.ids {
            big.insert(Some(id));
        }

        big
    }
}

impl FromIterator<Option<MessageId>> for IdentityIndex {
    fn from_iter<T: IntoIterator<Item = Option<MessageId>>>(iter: T) -> Self {
        let mut index = Self::default();
        for id in iter {
            index.insert(id);
        }
        index
    }
}
