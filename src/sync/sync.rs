//! Sync module.
//!
//! This module contains the reconciliation engine: it walks the
//! source folders, translates their names for the destination server
//! and copies the emails the destination does not have yet.

use log::{debug, info, trace, warn};
use rayon::prelude::*;
use std::collections::HashSet;
use utf7_imap::encode_utf7_imap as encode_utf7;

use crate::{
    backend::{FolderCreation, SelectMode},
    Backend, Dialect, Headers, IdentityIndex, MailboxDescriptor,
};

use super::{
    copy_email, CopyOutcome, DateRange, EmailSkipReason, Error, FolderSkipReason, Result,
    RunState, Side, SyncConfig, SyncEvent, SyncReport,
};

/// Exchange refuses to select its pseudo-folders with this reason.
pub const EXCHANGE_SPECIAL_MAILBOX: &str = "special mailbox";

/// Represents what to do with a source email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Copy,
    Skip(EmailSkipReason),
}

/// Decides whether an email must be copied, given its headers, the
/// identities already present in the destination folder and the
/// configured date range.
pub fn decide(headers: &Headers, index: &IdentityIndex, range: &DateRange) -> Decision {
    if range.is_active() {
        match headers.date {
            None => return Decision::Skip(EmailSkipReason::NoDate),
            Some(date) if !range.contains(date) => {
                return Decision::Skip(EmailSkipReason::OutOfRange(date))
            }
            Some(_) => (),
        }
    }

    if index.contains(headers.message_id.as_ref()) {
        Decision::Skip(EmailSkipReason::Present)
    } else {
        Decision::Copy
    }
}

pub struct SyncBuilder<'a> {
    config: SyncConfig,
    on_progress: Box<dyn Fn(SyncEvent) + Sync + Send + 'a>,
}

impl<'a> SyncBuilder<'a> {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            on_progress: Box::new(|_| ()),
        }
    }

    pub fn on_progress<F>(mut self, f: F) -> Self
    where
        F: Fn(SyncEvent) + Sync + Send + 'a,
    {
        self.on_progress = Box::new(f);
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub(super) fn emit(&self, event: SyncEvent) {
        trace!("sync event: {:?}", event);
        (self.on_progress)(event)
    }

    /// Copies every source folder and the emails missing from the
    /// destination. The source is never modified.
    pub fn sync<S, D>(&self, source: &S, destination: &D) -> Result<SyncReport>
    where
        S: Backend + ?Sized,
        D: Backend + ?Sized,
    {
        info!("starting synchronization");

        let mut report = SyncReport {
            simulated: self.config.simulate,
            ..SyncReport::default()
        };

        let (_, desc) = Dialect::classify(source.greeting());
        self.emit(SyncEvent::ServerClassified(Side::Source, source.dialect(), desc));
        let (_, desc) = Dialect::classify(destination.greeting());
        self.emit(SyncEvent::ServerClassified(
            Side::Destination,
            destination.dialect(),
            desc,
        ));

        self.emit(SyncEvent::StateChanged(RunState::EnumeratingFolders));

        let source_folders = source
            .list_folders()
            .map_err(Error::ListSourceFoldersError)?;
        self.emit(SyncEvent::FoldersListed(
            Side::Source,
            source_folders.iter().map(ToString::to_string).collect(),
        ));

        let destination_folders = destination
            .list_folders()
            .map_err(Error::ListDestinationFoldersError)?;
        self.emit(SyncEvent::FoldersListed(
            Side::Destination,
            destination_folders.iter().map(ToString::to_string).collect(),
        ));
        let destination_folders: HashSet<String> = destination_folders
            .into_iter()
            .map(|folder| folder.name)
            .collect();

        self.emit(SyncEvent::StateChanged(RunState::PerFolderSync));

        for folder in source_folders.iter() {
            self.sync_folder(
                folder,
                source,
                destination,
                &destination_folders,
                &mut report,
            )?;
        }

        self.emit(SyncEvent::StateChanged(RunState::Complete));
        info!("synchronization done: {}", report);

        Ok(report)
    }

    fn sync_folder<S, D>(
        &self,
        folder: &MailboxDescriptor,
        source: &S,
        destination: &D,
        destination_folders: &HashSet<String>,
        report: &mut SyncReport,
    ) -> Result<()>
    where
        S: Backend + ?Sized,
        D: Backend + ?Sized,
    {
        let config = &self.config;
        let source_folder = folder.name.as_str();

        let mut path = folder.to_canonical()?;
        if config.trim {
            path = path.trim();
        }
        debug!("canonical path of {}: {}", folder, path);

        if config.is_skipped(folder) {
            report.folders_skipped += 1;
            self.emit(SyncEvent::FolderSkipped(
                folder.to_string(),
                FolderSkipReason::Excluded,
            ));
            return Ok(());
        }

        let destination_folder = match config
            .folder
            .as_ref()
            .and_then(|restriction| restriction.destination.as_ref())
        {
            Some(name) => encode_utf7(name.to_owned()),
            None => path.render(destination.dialect()),
        };

        self.emit(SyncEvent::FolderStarted(
            folder.to_string(),
            destination_folder.clone(),
        ));

        let exists = destination_folders.contains(&destination_folder);
        if !exists && config.simulate {
            self.emit(SyncEvent::FolderMissing(destination_folder.clone()));
        } else if !exists {
            let creation = destination
                .create_folder(&destination_folder)
                .map_err(|err| Error::CreateFolderError(err, destination_folder.clone()))?;
            if creation == FolderCreation::Created {
                self.emit(SyncEvent::FolderCreated(destination_folder.clone()));
            }
        }

        if let Err(err) = source.select_folder(source_folder, SelectMode::ReadOnly) {
            match err.rejection() {
                Some(reason)
                    if folder.dialect == Dialect::Exchange
                        && reason.contains(EXCHANGE_SPECIAL_MAILBOX) =>
                {
                    report.folders_skipped += 1;
                    self.emit(SyncEvent::FolderSkipped(
                        folder.to_string(),
                        FolderSkipReason::SpecialMailbox(reason.to_owned()),
                    ));
                    return Ok(());
                }
                _ => return Err(Error::SelectSourceFolderError(err, source_folder.to_owned())),
            }
        }

        // A folder that does not exist yet cannot be selected in
        // simulate mode: its index is empty.
        let destination_exists = exists || !config.simulate;
        if destination_exists {
            self.select_destination(destination, &destination_folder)?;
        }

        if config.skeleton {
            report.folders_synced += 1;
            self.emit(SyncEvent::SkeletonOnly(folder.to_string()));
            return Ok(());
        }

        let index = if destination_exists {
            IdentityIndex::build(destination, &destination_folder, |done, total| {
                self.emit(SyncEvent::IndexProgress(
                    destination_folder.clone(),
                    done,
                    total,
                ))
            })?
        } else {
            IdentityIndex::default()
        };
        self.emit(SyncEvent::IndexBuilt(destination_folder.clone(), index.len()));

        if index.duplicates() > 0 {
            warn!(
                "{} emails of folder {} share their message id with another email",
                index.duplicates(),
                destination_folder
            );
            self.emit(SyncEvent::DuplicateIdentities(
                destination_folder.clone(),
                index.duplicates(),
            ));
        }

        let seqs = source
            .search_all(source_folder)
            .map_err(|err| Error::SearchEmailsError(err, source_folder.to_owned()))?;
        self.emit(SyncEvent::SourceEmailsFound(folder.to_string(), seqs.len()));

        // Decisions only read from both sides, they can be evaluated
        // in parallel. Copies are then applied one by one, in
        // ascending sequence order.
        let decisions: Vec<_> = seqs
            .par_iter()
            .map(|seq| -> Result<_> {
                let headers = source
                    .fetch_headers(source_folder, *seq)
                    .map_err(|err| Error::FetchHeadersError(err, *seq, source_folder.to_owned()))?;
                let headers = Headers::parse(&headers);
                let decision = decide(&headers, &index, &config.date_range);
                Ok((*seq, headers.message_id, decision))
            })
            .collect::<Result<_>>()?;

        for (seq, message_id, decision) in decisions {
            match decision {
                Decision::Copy => {
                    let outcome = copy_email(
                        source,
                        source_folder,
                        seq,
                        destination,
                        &destination_folder,
                        config.simulate,
                    )?;
                    report.emails_copied += 1;
                    self.emit(match outcome {
                        CopyOutcome::Copied => SyncEvent::EmailCopied(seq, message_id),
                        CopyOutcome::Simulated => SyncEvent::EmailSimulated(seq, message_id),
                    });
                }
                Decision::Skip(reason) => {
                    match reason {
                        EmailSkipReason::Present => report.emails_present += 1,
                        EmailSkipReason::OutOfRange(_) | EmailSkipReason::NoDate => {
                            report.emails_filtered += 1
                        }
                    }
                    self.emit(SyncEvent::EmailSkipped(seq, message_id, reason));
                }
            }
        }

        report.folders_synced += 1;
        self.emit(SyncEvent::FolderDone(folder.to_string()));
        Ok(())
    }

    /// Selects the destination folder. If the server refuses, the
    /// folder creation is requested once more: a folder that exists
    /// but cannot be selected aborts the run.
    fn select_destination<D>(&self, destination: &D, folder: &str) -> Result<()>
    where
        D: Backend + ?Sized,
    {
        let mode = if self.config.simulate {
            SelectMode::ReadOnly
        } else {
            SelectMode::ReadWrite
        };

        let err = match destination.select_folder(folder, mode) {
            Ok(()) => return Ok(()),
            Err(err) if err.rejection().is_some() && !self.config.simulate => err,
            Err(err) => return Err(Error::SelectDestinationFolderError(err, folder.to_owned())),
        };

        warn!("cannot select folder {}, trying to create it: {}", folder, err);

        match destination
            .create_folder(folder)
            .map_err(|err| Error::CreateFolderError(err, folder.to_owned()))?
        {
            FolderCreation::Created => {
                self.emit(SyncEvent::FolderCreated(folder.to_owned()));
                destination
                    .select_folder(folder, mode)
                    .map_err(|err| Error::SelectDestinationFolderError(err, folder.to_owned()))
            }
            FolderCreation::AlreadyExists => {
                Err(Error::SelectDestinationFolderError(err, folder.to_owned()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::{Headers, IdentityIndex, MessageId};

    use super::{decide, DateRange, Decision, EmailSkipReason};

    fn headers(raw: &str) -> Headers {
        Headers::parse(raw.as_bytes())
    }

    #[test]
    fn copy_missing_identities_only() {
        let index = IdentityIndex::from_iter([Some(MessageId::from("<abc@x>"))]);
        let range = DateRange::default();

        assert_eq!(
            decide(&headers("Message-ID: <abc@x>\r\n\r\n"), &index, &range),
            Decision::Skip(EmailSkipReason::Present),
        );
        assert_eq!(
            decide(&headers("Subject: no id\r\n\r\n"), &index, &range),
            Decision::Copy,
        );
        assert_eq!(
            decide(&headers("Message-ID: <def@x>\r\n\r\n"), &index, &range),
            Decision::Copy,
        );
    }

    #[test]
    fn absent_identity_is_always_copied() {
        let indexes = [
            IdentityIndex::default(),
            IdentityIndex::from_iter([None]),
            IdentityIndex::from_iter([Some(MessageId::from("")), None]),
            IdentityIndex::from_iter([Some(MessageId::from("<abc@x>"))]),
        ];

        for index in indexes {
            assert_eq!(
                decide(&headers("Subject: hi\r\n\r\n"), &index, &DateRange::default()),
                Decision::Copy,
            );
        }
    }

    #[test]
    fn date_range_filters_before_identity() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2021, 1, 1),
            NaiveDate::from_ymd_opt(2021, 12, 31),
        )
        .unwrap();
        let index = IdentityIndex::default();

        assert!(matches!(
            decide(
                &headers("Message-ID: <new@x>\r\nDate: Sun, 5 Jun 2022 10:00:00 +0000\r\n\r\n"),
                &index,
                &range,
            ),
            Decision::Skip(EmailSkipReason::OutOfRange(_)),
        ));
        assert_eq!(
            decide(&headers("Message-ID: <new@x>\r\n\r\n"), &index, &range),
            Decision::Skip(EmailSkipReason::NoDate),
        );
        assert_eq!(
            decide(
                &headers("Message-ID: <new@x>\r\nDate: Wed, 16 Jun 2021 10:00:00 +0200\r\n\r\n"),
                &index,
                &range,
            ),
            Decision::Copy,
        );
    }

    #[test]
    fn unparsable_date_is_never_in_range() {
        let range = DateRange::new(None, NaiveDate::from_ymd_opt(2021, 12, 31)).unwrap();
        let index = IdentityIndex::default();

        assert_eq!(
            decide(
                &headers("Message-ID: <x@y>\r\nDate: someday\r\n\r\n"),
                &index,
                &range,
            ),
            Decision::Skip(EmailSkipReason::NoDate),
        );
        assert!(matches!(
            decide(
                &headers("Message-ID: <x@y>\r\nDate: Mon, 5 Jun 2022 23:30:00 -0500\r\n\r\n"),
                &index,
                &DateRange::new(None, NaiveDate::from_ymd_opt(2022, 6, 5)).unwrap(),
            ),
            Decision::Copy,
        ));
    }
}
