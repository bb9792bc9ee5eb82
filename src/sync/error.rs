use chrono::NaiveDate;
use std::result;
use thiserror::Error;

use crate::{backend, email, folder};

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot parse exclude pattern {1}")]
    ParseExcludePatternError(#[source] regex::Error, String),
    #[error("cannot parse date {1}: expected YYYY-MM-DD")]
    ParseDateError(#[source] chrono::ParseError, String),
    #[error("cannot use date range: {0} is after {1}")]
    InvalidDateRangeError(NaiveDate, NaiveDate),
    #[error("cannot parse folder {0}: expected source[:destination]")]
    ParseFolderRestrictionError(String),

    #[cfg(feature = "imap-backend")]
    #[error("cannot connect to source account")]
    ConnectSourceError(#[source] backend::imap::Error),
    #[cfg(feature = "imap-backend")]
    #[error("cannot connect to destination account")]
    ConnectDestinationError(#[source] backend::imap::Error),
    #[cfg(feature = "imap-backend")]
    #[error("cannot close connection")]
    CloseConnectionError(#[source] backend::imap::Error),

    #[error("cannot list folders of source account")]
    ListSourceFoldersError(#[source] backend::Error),
    #[error("cannot list folders of destination account")]
    ListDestinationFoldersError(#[source] backend::Error),
    #[error("cannot translate folder name")]
    TranslateFolderError(#[from] folder::Error),
    #[error("cannot create destination folder {1}")]
    CreateFolderError(#[source] backend::Error, String),
    #[error("cannot select source folder {1}")]
    SelectSourceFolderError(#[source] backend::Error, String),
    #[error("cannot select destination folder {1}")]
    SelectDestinationFolderError(#[source] backend::Error, String),
    #[error("cannot list emails of source folder {1}")]
    SearchEmailsError(#[source] backend::Error, String),
    #[error("cannot fetch headers of email {1} from source folder {2}")]
    FetchHeadersError(#[source] backend::Error, u32, String),
    #[error("cannot copy email {1} from folder {2} to folder {3}")]
    CopyEmailError(#[source] backend::Error, u32, String, String),
    #[error(transparent)]
    IndexError(#[from] email::Error),
}

pub type Result<T> = result::Result<T, Error>;
