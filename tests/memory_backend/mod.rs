use std::{
    collections::{BTreeMap, HashMap},
    sync::Mutex,
};

use imapcp::{
    backend::{self, FolderCreation, SelectMode},
    Backend, Folders, MailboxDescriptor,
};

pub const EXCHANGE: &str = "* OK The Microsoft Exchange IMAP4 service is ready.";
pub const DOVECOT: &str = "* OK [CAPABILITY IMAP4rev1 LITERAL+ IDLE] Dovecot ready.";
pub const COURIER: &str = "* OK [CAPABILITY IMAP4rev1 UIDPLUS CHILDREN] Courier-IMAP ready.";

/// In-memory account, recording every mutating command it receives.
pub struct MemoryBackend {
    greeting: String,
    folders: Mutex<BTreeMap<String, Vec<Vec<u8>>>>,
    rejections: HashMap<String, String>,
    pub mutations: Mutex<Vec<String>>,
}

impl MemoryBackend {
    pub fn new(greeting: &str) -> Self {
        Self {
            greeting: greeting.to_owned(),
            folders: Mutex::default(),
            rejections: HashMap::new(),
            mutations: Mutex::default(),
        }
    }

    pub fn with_folder(self, folder: &str, emails: Vec<Vec<u8>>) -> Self {
        self.folders
            .lock()
            .unwrap()
            .insert(folder.to_owned(), emails);
        self
    }

    /// Makes the server refuse to select the folder with the given
    /// reason.
    pub fn rejecting(mut self, folder: &str, reason: &str) -> Self {
        self.rejections.insert(folder.to_owned(), reason.to_owned());
        self
    }

    pub fn folder_names(&self) -> Vec<String> {
        self.folders.lock().unwrap().keys().cloned().collect()
    }

    pub fn emails(&self, folder: &str) -> Vec<Vec<u8>> {
        self.folders
            .lock()
            .unwrap()
            .get(folder)
            .cloned()
            .unwrap_or_default()
    }

    pub fn mutations(&self) -> Vec<String> {
        self.mutations.lock().unwrap().clone()
    }

    fn email(&self, folder: &str, seq: u32) -> backend::Result<Vec<u8>> {
        self.folders
            .lock()
            .unwrap()
            .get(folder)
            .and_then(|emails| emails.get(seq as usize - 1))
            .cloned()
            .ok_or_else(|| {
                backend::Error::CommandError(format!("FETCH {}", seq), folder.to_owned())
            })
    }
}

impl Backend for MemoryBackend {
    fn greeting(&self) -> &str {
        &self.greeting
    }

    fn list_folders(&self) -> backend::Result<Folders> {
        let dialect = self.dialect();
        Ok(self
            .folders
            .lock()
            .unwrap()
            .keys()
            .map(|name| MailboxDescriptor::new(dialect, Some(dialect.separator()), name))
            .collect())
    }

    fn select_folder(&self, folder: &str, _mode: SelectMode) -> backend::Result<()> {
        if let Some(reason) = self.rejections.get(folder) {
            return Err(backend::Error::SelectFolderRejectedError(
                folder.to_owned(),
                reason.to_owned(),
            ));
        }

        if self.folders.lock().unwrap().contains_key(folder) {
            Ok(())
        } else {
            Err(backend::Error::SelectFolderRejectedError(
                folder.to_owned(),
                String::from("Mailbox doesn't exist"),
            ))
        }
    }

    fn create_folder(&self, folder: &str) -> backend::Result<FolderCreation> {
        self.mutations
            .lock()
            .unwrap()
            .push(format!("CREATE {}", folder));

        let mut folders = self.folders.lock().unwrap();
        if folders.contains_key(folder) {
            Ok(FolderCreation::AlreadyExists)
        } else {
            folders.insert(folder.to_owned(), Vec::new());
            Ok(FolderCreation::Created)
        }
    }

    fn search_all(&self, folder: &str) -> backend::Result<Vec<u32>> {
        let len = self
            .folders
            .lock()
            .unwrap()
            .get(folder)
            .map(Vec::len)
            .ok_or_else(|| backend::Error::CommandError("SEARCH".into(), folder.to_owned()))?;
        Ok((1..=len as u32).collect())
    }

    fn fetch_headers(&self, folder: &str, seq: u32) -> backend::Result<Vec<u8>> {
        let email = self.email(folder, seq)?;
        let end = email
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .map_or(email.len(), |pos| pos + 4);
        Ok(email[..end].to_vec())
    }

    fn fetch_email(&self, folder: &str, seq: u32) -> backend::Result<Vec<u8>> {
        self.email(folder, seq)
    }

    fn append_email(&self, folder: &str, email: &[u8]) -> backend::Result<()> {
        self.mutations
            .lock()
            .unwrap()
            .push(format!("APPEND {}", folder));

        self.folders
            .lock()
            .unwrap()
            .get_mut(folder)
            .map(|emails| emails.push(email.to_vec()))
            .ok_or_else(|| backend::Error::CommandError("APPEND".into(), folder.to_owned()))
    }
}

/// Builds a raw email.
pub fn email(message_id: Option<&str>, date: Option<&str>, body: &str) -> Vec<u8> {
    let mut email = String::from("From: alice@localhost\r\nTo: bob@localhost\r\n");
    if let Some(id) = message_id {
        email.push_str(&format!("Message-ID: {}\r\n", id));
    }
    if let Some(date) = date {
        email.push_str(&format!("Date: {}\r\n", date));
    }
    email.push_str(&format!("Subject: {}\r\n\r\n{}\r\n", body, body));
    email.into_bytes()
}
