use crate::store::{MailStore, StoreError};
use log::warn;

/// Prefix of the mailbox holding the archive of another mailbox.
pub const ARCHIVE_PREFIX: &str = "Online Archive - ";

pub fn list_mailboxes<S: MailStore>(store: &S) -> Result<Vec<String>, StoreError> {
    store.mailboxes()
}

/// Names of the folders directly under a mailbox. A mailbox which cannot be
/// found has no folders.
pub fn list_child_folders<S: MailStore>(
    store: &S,
    mailbox_name: &str,
) -> Result<Vec<String>, StoreError> {
    let mailbox = match store.mailbox(mailbox_name) {
        Ok(mailbox) => mailbox,
        Err(StoreError::FolderNotFound(_)) => {
            warn!("Cannot find mailbox: {}", mailbox_name);
            return Ok(vec![]);
        }
        Err(e) => return Err(e),
    };
    Ok(store
        .children(&mailbox)?
        .iter()
        .map(|folder| store.path(folder).name().to_string())
        .collect())
}

/// Finds the archive counterpart of `source` among `mailboxes`. The match is
/// exact and case-sensitive.
pub fn find_archive_mailbox<'a>(mailboxes: &'a [String], source: &str) -> Option<&'a str> {
    let archive_name = format!("{}{}", ARCHIVE_PREFIX, source);
    mailboxes
        .iter()
        .map(String::as_str)
        .find(|&name| name == archive_name)
}
