//! Access to the mail store the pipelines run against.
//!
//! Everything above this module talks to the store through [`MailStore`], a
//! single handle borrowed for the whole run.

pub mod maildir;
#[cfg(test)]
pub mod memory;

use chrono::{DateTime, Utc};
use std::fmt;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("mail store unavailable: {0}")]
    Unavailable(String),
    #[error("folder not found: {0}")]
    FolderNotFound(String),
    #[error("invalid folder name: {0:?}")]
    InvalidName(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// What kind of item a folder entry is. Only `Mail` is exported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemKind {
    Mail,
    Appointment,
    Contact,
}

/// An entry of a folder, with the attributes the pipelines consume.
#[derive(Clone, Debug)]
pub struct Item<K> {
    pub key: K,
    pub kind: ItemKind,
    pub subject: String,
    /// Absent for items which were never received, e.g. contacts.
    pub received: Option<DateTime<Utc>>,
    /// Size in bytes.
    pub size: u64,
}

/// Full path of a folder, starting with its mailbox name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FolderPath(Vec<String>);

impl FolderPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FolderPath(segments.into_iter().map(Into::into).collect())
    }

    pub fn join(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        FolderPath(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn name(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or("")
    }

    pub fn contains_segment(&self, segment: &str) -> bool {
        self.0.iter().any(|s| s == segment)
    }

    /// The part of this path below `base`, or the whole path if `base` is
    /// not a prefix of it.
    pub fn relative_to(&self, base: &FolderPath) -> FolderPath {
        match self.0.strip_prefix(base.0.as_slice()) {
            Some(rest) => FolderPath(rest.to_vec()),
            None => self.clone(),
        }
    }
}

impl fmt::Display for FolderPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

/// The operations both pipelines need from a mail store.
///
/// Folder handles are cheap to clone and only meaningful to the store which
/// produced them. Mutating operations take `&self`: the store is an external
/// stateful resource and the handle is shared by the whole traversal.
pub trait MailStore {
    type Folder: Clone;
    type ItemKey;

    /// Names of the top-level mailboxes, in store order.
    fn mailboxes(&self) -> Result<Vec<String>, StoreError>;
    fn mailbox(&self, name: &str) -> Result<Self::Folder, StoreError>;
    /// Looks up a direct child of `parent` by exact name.
    fn child(&self, parent: &Self::Folder, name: &str) -> Result<Self::Folder, StoreError>;
    fn children(&self, folder: &Self::Folder) -> Result<Vec<Self::Folder>, StoreError>;
    fn path(&self, folder: &Self::Folder) -> FolderPath;
    fn items(&self, folder: &Self::Folder) -> Result<Vec<Item<Self::ItemKey>>, StoreError>;
    fn move_item(
        &self,
        item: &Item<Self::ItemKey>,
        destination: &Self::Folder,
    ) -> Result<(), StoreError>;
    fn create_folder(&self, parent: &Self::Folder, name: &str) -> Result<Self::Folder, StoreError>;
}
