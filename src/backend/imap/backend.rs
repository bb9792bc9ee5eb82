//! IMAP backend module.
//!
//! This module contains the definition of the IMAP backend, built on
//! top of the `imap` crate.

use log::{debug, info, log_enabled, trace, Level};
use native_tls::{HandshakeError, TlsConnector, TlsStream};
use std::{
    collections::HashMap,
    io::{self, Read, Write},
    net::TcpStream,
    result,
    sync::{Mutex, MutexGuard},
};
use thiserror::Error;

use crate::{
    backend::{self, FolderCreation, SelectMode},
    Backend, Dialect, Folders, ImapConfig, MailboxDescriptor,
};

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot find session from pool at cursor {0}")]
    FindSessionByCursorError(usize),
    #[error("cannot lock imap session: {0}")]
    LockSessionError(String),
    #[error("cannot lock imap sessions pool cursor: {0}")]
    LockSessionsPoolCursorError(String),
    #[error("cannot lock imap folder modes: {0}")]
    LockFolderModesError(String),

    #[error("cannot create tls connector")]
    CreateTlsConnectorError(#[source] native_tls::Error),
    #[error("cannot connect to imap server {1}")]
    ConnectImapServerError(#[source] io::Error, String),
    #[error("cannot negociate tls with imap server {1}")]
    NegociateTlsError(#[source] native_tls::Error, String),
    #[error("cannot negociate tls with imap server {0}: handshake interrupted")]
    NegociateTlsInterruptedError(String),
    #[error("cannot read greeting of imap server {1}")]
    ReadGreetingError(#[source] imap::Error, String),
    #[error("cannot login to imap server {1}")]
    LoginImapServerError(#[source] imap::Error, String),

    #[error("cannot list mailboxes")]
    ListMboxesError(#[source] imap::Error),
    #[error("cannot select mailbox {1}")]
    SelectFolderError(#[source] imap::Error, String),
    #[error("cannot create mailbox {1}")]
    CreateMboxError(#[source] imap::Error, String),
    #[error("cannot search messages in mailbox {1}")]
    SearchMsgsError(#[source] imap::Error, String),
    #[error("cannot fetch message {1} from mailbox {2}")]
    FetchMsgError(#[source] imap::Error, u32, String),
    #[error("cannot find headers of message {0} from mailbox {1}")]
    GetHeadersError(u32, String),
    #[error("cannot find body of message {0} from mailbox {1}")]
    GetBodyError(u32, String),
    #[error("cannot append message to mailbox {1}")]
    AppendMsgError(#[source] imap::Error, String),
    #[error("cannot logout from imap session")]
    LogoutImapSessionError(#[source] imap::Error),
}

pub type Result<T> = result::Result<T, Error>;

pub enum ImapSessionStream {
    Tls(TlsStream<TcpStream>),
    Tcp(TcpStream),
}

impl Read for ImapSessionStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Tls(stream) => stream.read(buf),
            Self::Tcp(stream) => stream.read(buf),
        }
    }
}

impl Write for ImapSessionStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Tls(stream) => stream.write(buf),
            Self::Tcp(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Tls(stream) => stream.flush(),
            Self::Tcp(stream) => stream.flush(),
        }
    }
}

pub type ImapSession = imap::Session<ImapSessionStream>;

/// Represents a pooled session and the folder it currently has
/// selected.
pub struct PooledSession {
    session: ImapSession,
    selected: Option<(String, SelectMode)>,
}

pub struct ImapBackendBuilder {
    sessions_pool_size: usize,
}

impl Default for ImapBackendBuilder {
    fn default() -> Self {
        Self {
            sessions_pool_size: 1,
        }
    }
}

impl ImapBackendBuilder {
    /// Sets the number of sessions opened with the server. Each
    /// session runs one command at a time.
    pub fn pool_size(mut self, pool_size: usize) -> Self {
        self.sessions_pool_size = pool_size.max(1);
        self
    }

    pub fn build(&self, config: &ImapConfig) -> Result<ImapBackend> {
        let mut greeting = String::new();
        let mut sessions_pool = Vec::with_capacity(self.sessions_pool_size);

        for _ in 0..self.sessions_pool_size {
            let (session, session_greeting) = ImapBackend::create_session(config)?;
            greeting = session_greeting;
            sessions_pool.push(Mutex::new(PooledSession {
                session,
                selected: None,
            }));
        }

        let (dialect, desc) = Dialect::classify(&greeting);
        info!("imap server {} type is {}", config, desc);

        Ok(ImapBackend {
            name: config.to_string(),
            greeting,
            dialect,
            folder_modes: Mutex::new(HashMap::new()),
            sessions_pool_size: self.sessions_pool_size,
            sessions_pool_cursor: Mutex::new(0),
            sessions_pool,
        })
    }
}

pub struct ImapBackend {
    name: String,
    greeting: String,
    dialect: Dialect,
    folder_modes: Mutex<HashMap<String, SelectMode>>,
    sessions_pool_size: usize,
    sessions_pool_cursor: Mutex<usize>,
    sessions_pool: Vec<Mutex<PooledSession>>,
}

impl ImapBackend {
    pub fn new(config: &ImapConfig) -> Result<Self> {
        ImapBackendBuilder::default().build(config)
    }

    fn create_session(config: &ImapConfig) -> Result<(ImapSession, String)> {
        let tcp = TcpStream::connect((config.host.as_str(), config.port))
            .map_err(|err| Error::ConnectImapServerError(err, config.to_string()))?;

        let stream = if config.ssl() {
            let connector = TlsConnector::builder()
                .danger_accept_invalid_certs(config.insecure())
                .danger_accept_invalid_hostnames(config.insecure())
                .build()
                .map_err(Error::CreateTlsConnectorError)?;
            let stream = connector
                .connect(&config.host, tcp)
                .map_err(|err| match err {
                    HandshakeError::Failure(err) => {
                        Error::NegociateTlsError(err, config.to_string())
                    }
                    HandshakeError::WouldBlock(_) => {
                        Error::NegociateTlsInterruptedError(config.to_string())
                    }
                })?;
            ImapSessionStream::Tls(stream)
        } else {
            ImapSessionStream::Tcp(tcp)
        };

        let mut client = imap::Client::new(stream);
        let greeting = client
            .read_greeting()
            .map_err(|err| Error::ReadGreetingError(err, config.to_string()))?;
        let greeting = String::from_utf8_lossy(&greeting).trim().to_owned();
        debug!("imap server greeting: {}", greeting);

        let mut session = client
            .login(&config.login, &config.passwd)
            .map_err(|res| Error::LoginImapServerError(res.0, config.to_string()))?;
        session.debug = log_enabled!(Level::Trace);

        Ok((session, greeting))
    }

    pub fn session(&self) -> Result<MutexGuard<PooledSession>> {
        let mut cursor = self
            .sessions_pool_cursor
            .lock()
            .map_err(|err| Error::LockSessionsPoolCursorError(err.to_string()))?;
        let session = self
            .sessions_pool
            .get(*cursor)
            .ok_or(Error::FindSessionByCursorError(*cursor))?;
        *cursor = (*cursor + 1) % self.sessions_pool_size;
        drop(cursor);

        session
            .lock()
            .map_err(|err| Error::LockSessionError(err.to_string()))
    }

    /// Gets the session dedicated to mutations, so that folder
    /// creations and appends never run concurrently.
    fn mutation_session(&self) -> Result<MutexGuard<PooledSession>> {
        self.sessions_pool
            .first()
            .ok_or(Error::FindSessionByCursorError(0))?
            .lock()
            .map_err(|err| Error::LockSessionError(err.to_string()))
    }

    /// Logs out from every session of the pool.
    pub fn close(&self) -> Result<()> {
        for session in &self.sessions_pool {
            let mut session = session
                .lock()
                .map_err(|err| Error::LockSessionError(err.to_string()))?;
            session
                .session
                .logout()
                .map_err(Error::LogoutImapSessionError)?;
        }

        debug!("imap sessions of {} closed", self.name);
        Ok(())
    }

    fn folder_mode(&self, folder: &str) -> Result<SelectMode> {
        let modes = self
            .folder_modes
            .lock()
            .map_err(|err| Error::LockFolderModesError(err.to_string()))?;
        Ok(modes.get(folder).cloned().unwrap_or_default())
    }

    fn select(session: &mut PooledSession, folder: &str, mode: SelectMode) -> backend::Result<()> {
        session.selected = None;

        let res = match mode {
            SelectMode::ReadOnly => session.session.examine(folder),
            SelectMode::ReadWrite => session.session.select(folder),
        };

        match res {
            Ok(mbox) => {
                debug!("folder {} selected ({:?}): {} emails", folder, mode, mbox.exists);
                session.selected = Some((folder.to_owned(), mode));
                Ok(())
            }
            Err(err @ imap::Error::No(_)) => Err(backend::Error::SelectFolderRejectedError(
                folder.to_owned(),
                err.to_string(),
            )),
            Err(err) => Err(Error::SelectFolderError(err, folder.to_owned()).into()),
        }
    }

    /// Gets the next session of the pool, making sure it has the
    /// given folder selected.
    fn session_for(&self, folder: &str) -> backend::Result<MutexGuard<PooledSession>> {
        let mode = self.folder_mode(folder)?;
        let mut session = self.session()?;

        let selected = matches!(
            session.selected,
            Some((ref selected, selected_mode)) if selected == folder && selected_mode == mode
        );

        if !selected {
            Self::select(&mut session, folder, mode)?;
        }

        Ok(session)
    }
}

impl Backend for ImapBackend {
    fn greeting(&self) -> &str {
        &self.greeting
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn list_folders(&self) -> backend::Result<Folders> {
        let mut session = self.session()?;
        let names = session
            .session
            .list(Some(""), Some("*"))
            .map_err(Error::ListMboxesError)?;

        let folders = Folders::from_iter(names.iter().map(|name| MailboxDescriptor {
            dialect: self.dialect,
            flags: name
                .attributes()
                .iter()
                .map(|attr| format!("{:?}", attr))
                .collect(),
            delim: name.delimiter().and_then(|delim| delim.chars().next()),
            name: name.name().to_owned(),
        }));

        trace!("imap folders: {:#?}", folders);
        Ok(folders)
    }

    fn select_folder(&self, folder: &str, mode: SelectMode) -> backend::Result<()> {
        self.folder_modes
            .lock()
            .map_err(|err| Error::LockFolderModesError(err.to_string()))?
            .insert(folder.to_owned(), mode);

        let mut session = self.session()?;
        Self::select(&mut session, folder, mode)
    }

    fn create_folder(&self, folder: &str) -> backend::Result<FolderCreation> {
        let mut session = self.mutation_session()?;

        match session.session.create(folder) {
            Ok(()) => {
                debug!("folder {} created", folder);
                Ok(FolderCreation::Created)
            }
            Err(err @ imap::Error::No(_)) => {
                debug!("folder {} not created, assuming it exists: {}", folder, err);
                Ok(FolderCreation::AlreadyExists)
            }
            Err(err) => Err(Error::CreateMboxError(err, folder.to_owned()).into()),
        }
    }

    fn search_all(&self, folder: &str) -> backend::Result<Vec<u32>> {
        let mut session = self.session_for(folder)?;
        let mut seqs: Vec<u32> = session
            .session
            .search("ALL")
            .map_err(|err| Error::SearchMsgsError(err, folder.to_owned()))?
            .into_iter()
            .collect();
        seqs.sort_unstable();

        debug!("found {} emails in folder {}", seqs.len(), folder);
        Ok(seqs)
    }

    fn fetch_headers(&self, folder: &str, seq: u32) -> backend::Result<Vec<u8>> {
        let mut session = self.session_for(folder)?;
        let fetches = session
            .session
            .fetch(seq.to_string(), "BODY.PEEK[HEADER]")
            .map_err(|err| Error::FetchMsgError(err, seq, folder.to_owned()))?;
        let headers = fetches
            .iter()
            .find(|fetch| fetch.message == seq)
            .and_then(|fetch| fetch.header())
            .ok_or_else(|| Error::GetHeadersError(seq, folder.to_owned()))?;

        Ok(headers.to_vec())
    }

    fn fetch_email(&self, folder: &str, seq: u32) -> backend::Result<Vec<u8>> {
        let mut session = self.session_for(folder)?;
        let fetches = session
            .session
            .fetch(seq.to_string(), "BODY.PEEK[]")
            .map_err(|err| Error::FetchMsgError(err, seq, folder.to_owned()))?;
        let email = fetches
            .iter()
            .find(|fetch| fetch.message == seq)
            .and_then(|fetch| fetch.body())
            .ok_or_else(|| Error::GetBodyError(seq, folder.to_owned()))?;

        Ok(email.to_vec())
    }

    fn append_email(&self, folder: &str, email: &[u8]) -> backend::Result<()> {
        let mut session = self.mutation_session()?;

        session
            .session
            .append(folder, email)
            .finish()
            .map_err(|err| Error::AppendMsgError(err, folder.to_owned()))?;

        debug!("email appended to folder {}", folder);
        Ok(())
    }
}
