#[cfg(feature = "imap-backend")]
use imapcp::{
    backend::{FolderCreation, SelectMode},
    sync::{self, SyncBuilder, SyncConfig},
    Backend, ImapBackendBuilder, ImapConfig,
};

// Needs two accounts on a local IMAP server listening on port 3143.
#[cfg(feature = "imap-backend")]
#[test]
#[ignore]
fn test_imap_backend() {
    let _ = env_logger::builder().is_test(true).try_init();

    let source: ImapConfig = "bob@localhost:password:localhost:3143".parse().unwrap();
    let destination: ImapConfig = "alice@localhost:password:localhost:3143".parse().unwrap();
    assert!(!source.ssl());

    let imap = ImapBackendBuilder::default()
        .pool_size(3)
        .build(&source)
        .unwrap();

    // setting up folders
    match imap.create_folder("Imapcp").unwrap() {
        FolderCreation::Created | FolderCreation::AlreadyExists => (),
    }
    assert!(imap
        .list_folders()
        .unwrap()
        .iter()
        .any(|folder| folder.name == "Imapcp"));

    // checking that an email can be added then fetched
    let email = b"Message-ID: <imapcp-live@localhost>\r\nSubject: live\r\n\r\nHello!\r\n";
    imap.select_folder("Imapcp", SelectMode::ReadWrite).unwrap();
    imap.append_email("Imapcp", email).unwrap();
    let seqs = imap.search_all("Imapcp").unwrap();
    assert!(!seqs.is_empty());
    let headers = imap.fetch_headers("Imapcp", seqs[0]).unwrap();
    assert!(String::from_utf8_lossy(&headers).contains("Message-ID"));
    imap.close().unwrap();

    // checking that a second run copies nothing
    let builder = SyncBuilder::new(SyncConfig {
        folder: Some("Imapcp".parse().unwrap()),
        ..SyncConfig::default()
    });
    sync::run(&source, &destination, &builder).unwrap();
    let report = sync::run(&source, &destination, &builder).unwrap();
    assert_eq!(report.emails_copied, 0);
}
