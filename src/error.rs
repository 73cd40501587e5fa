use thiserror::Error;

/// Errors which end the run.
#[derive(Error, Debug)]
pub enum Fatal {
    #[error("No mailboxes found in the mail store")]
    NoMailboxes,
    #[error("Invalid {what} selection: {input:?}")]
    InvalidSelection { what: &'static str, input: String },
    #[error("No corresponding Online Archive found for mailbox {0:?}")]
    NoArchiveMailbox(String),
    #[error("No folders found in mailbox {0:?}")]
    NoFolders(String),
    #[error("Invalid mode {0:?}, expected 'dry-run' or 'move'")]
    InvalidMode(String),
}
