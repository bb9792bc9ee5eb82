//! IMAP backend config module.
//!
//! This module contains the representation of the IMAP backend
//! configuration of an account.

use std::{fmt, num::ParseIntError, result, str::FromStr};
use thiserror::Error;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 143;
pub const DEFAULT_SSL_PORT: u16 = 993;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot parse imap account {0}: expected user:password[:host[:port]]")]
    ParseAccountError(String),
    #[error("cannot parse imap port {1}")]
    ParsePortError(#[source] ParseIntError, String),
}

pub type Result<T> = result::Result<T, Error>;

/// Represents the IMAP backend configuration.
#[derive(Clone, Default, Eq, PartialEq)]
pub struct ImapConfig {
    /// Represents the IMAP server host.
    pub host: String,
    /// Represents the IMAP server port.
    pub port: u16,
    /// Enables TLS. Defaults to `true` on port 993.
    pub ssl: Option<bool>,
    /// Trusts any certificate.
    pub insecure: Option<bool>,
    /// Represents the IMAP server login.
    pub login: String,
    /// Represents the IMAP server password.
    pub passwd: String,
}

impl ImapConfig {
    /// Gets the SSL IMAP option.
    pub fn ssl(&self) -> bool {
        self.ssl.unwrap_or(self.port == DEFAULT_SSL_PORT)
    }

    /// Gets the insecure IMAP option.
    pub fn insecure(&self) -> bool {
        self.insecure.unwrap_or_default()
    }
}

impl FromStr for ImapConfig {
    type Err = Error;

    /// Parses an account of the form `user:password:host:port`,
    /// where host and port are optional.
    fn from_str(account: &str) -> Result<Self> {
        let parts: Vec<&str> = account.split(':').collect();
        let (login, passwd) = match parts.as_slice() {
            [login, passwd, ..] if parts.len() <= 4 && !login.is_empty() => (login, passwd),
            _ => return Err(Error::ParseAccountError(account.to_owned())),
        };

        let host = parts
            .get(2)
            .filter(|host| !host.is_empty())
            .map(|host| host.to_string())
            .unwrap_or_else(|| DEFAULT_HOST.to_owned());

        let port = match parts.get(3) {
            Some(port) => port
                .parse()
                .map_err(|err| Error::ParsePortError(err, port.to_string()))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host,
            port,
            login: login.to_string(),
            passwd: passwd.to_string(),
            ..Self::default()
        })
    }
}

// The password never shows up in logs.
impl fmt::Debug for ImapConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ImapConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("ssl", &self.ssl)
            .field("insecure", &self.insecure)
            .field("login", &self.login)
            .finish()
    }
}

impl fmt::Display for ImapConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}@{}:{}", self.login, self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ImapConfig};

    #[test]
    fn parse_full_account() {
        let config: ImapConfig = "bob:secret:imap.example.org:993".parse().unwrap();
        assert_eq!(config.login, "bob");
        assert_eq!(config.passwd, "secret");
        assert_eq!(config.host, "imap.example.org");
        assert_eq!(config.port, 993);
        assert!(config.ssl());
    }

    #[test]
    fn parse_account_defaults() {
        let config: ImapConfig = "bob:secret".parse().unwrap();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 143);
        assert!(!config.ssl());

        let config: ImapConfig = "bob:secret:mail.local".parse().unwrap();
        assert_eq!(config.host, "mail.local");
        assert_eq!(config.port, 143);
    }

    #[test]
    fn parse_invalid_account() {
        assert!(matches!(
            "bob".parse::<ImapConfig>(),
            Err(Error::ParseAccountError(_))
        ));
        assert!(matches!(
            "bob:a:b:c:d".parse::<ImapConfig>(),
            Err(Error::ParseAccountError(_))
        ));
        assert!(matches!(
            "bob:secret:localhost:imap".parse::<ImapConfig>(),
            Err(Error::ParsePortError(_, ref port)) if port == "imap"
        ));
    }

    #[test]
    fn debug_hides_password() {
        let config: ImapConfig = "bob:secret".parse().unwrap();
        assert!(!format!("{:?}", config).contains("secret"));
    }
}
