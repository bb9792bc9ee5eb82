pub mod email;
pub use email::{Headers, IdentityIndex, MessageId};

pub mod folder;
pub use folder::{CanonicalPath, Dialect, Folders, MailboxDescriptor, DIALECT_PATTERNS};
