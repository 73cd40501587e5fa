//! In-memory store for tests, with failure injection and a log of the
//! mutating calls it received.

use super::{FolderPath, Item, ItemKind, MailStore, StoreError};
use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::collections::HashSet;
use std::io;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Create(String),
    Move { subject: String, to: String },
}

struct Node {
    name: String,
    parent: Option<usize>,
    children: Vec<usize>,
}

struct Stored {
    folder: usize,
    kind: ItemKind,
    subject: String,
    received: Option<DateTime<Utc>>,
    size: u64,
}

#[derive(Default)]
struct Inner {
    nodes: Vec<Node>,
    mailboxes: Vec<usize>,
    items: Vec<Stored>,
    fail_create: HashSet<String>,
    fail_move: HashSet<String>,
    fail_items: HashSet<String>,
    unavailable: bool,
    calls: Vec<Call>,
    listed: Vec<String>,
}

impl Inner {
    fn path(&self, id: usize) -> FolderPath {
        let mut segments = vec![];
        let mut current = Some(id);
        while let Some(id) = current {
            segments.push(self.nodes[id].name.clone());
            current = self.nodes[id].parent;
        }
        segments.reverse();
        FolderPath::new(segments)
    }

    fn add_node(&mut self, parent: Option<usize>, name: &str) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node {
            name: name.to_string(),
            parent,
            children: vec![],
        });
        match parent {
            Some(parent) => self.nodes[parent].children.push(id),
            None => self.mailboxes.push(id),
        }
        id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RefCell<Inner>,
}

fn simulated(what: &str) -> StoreError {
    io::Error::new(io::ErrorKind::Other, format!("simulated failure: {}", what)).into()
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mailbox(&self, name: &str) -> usize {
        self.inner.borrow_mut().add_node(None, name)
    }

    pub fn add_folder(&self, parent: usize, name: &str) -> usize {
        self.inner.borrow_mut().add_node(Some(parent), name)
    }

    pub fn add_item(
        &self,
        folder: usize,
        kind: ItemKind,
        subject: &str,
        received: Option<DateTime<Utc>>,
        size: u64,
    ) {
        self.inner.borrow_mut().items.push(Stored {
            folder,
            kind,
            subject: subject.to_string(),
            received,
            size,
        });
    }

    pub fn add_mail(&self, folder: usize, subject: &str, received: DateTime<Utc>, size: u64) {
        self.add_item(folder, ItemKind::Mail, subject, Some(received), size);
    }

    /// Makes creating any folder with this name fail.
    pub fn fail_create(&self, name: &str) {
        self.inner.borrow_mut().fail_create.insert(name.to_string());
    }

    /// Makes moving any item with this subject fail.
    pub fn fail_move(&self, subject: &str) {
        self.inner.borrow_mut().fail_move.insert(subject.to_string());
    }

    /// Makes listing the items of any folder with this name fail.
    pub fn fail_items(&self, name: &str) {
        self.inner.borrow_mut().fail_items.insert(name.to_string());
    }

    pub fn set_unavailable(&self) {
        self.inner.borrow_mut().unavailable = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.borrow().calls.clone()
    }

    /// Paths of the folders whose items were listed, in order.
    pub fn listed(&self) -> Vec<String> {
        self.inner.borrow().listed.clone()
    }

    pub fn find(&self, path: &str) -> Option<usize> {
        let inner = self.inner.borrow();
        (0..inner.nodes.len()).find(|&id| inner.path(id).to_string() == path)
    }

    pub fn subjects(&self, folder: usize) -> Vec<String> {
        let inner = self.inner.borrow();
        inner
            .items
            .iter()
            .filter(|item| item.folder == folder)
            .map(|item| item.subject.clone())
            .collect()
    }
}

impl MailStore for MemoryStore {
    type Folder = usize;
    type ItemKey = usize;

    fn mailboxes(&self) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.borrow();
        if inner.unavailable {
            return Err(StoreError::Unavailable("store is offline".to_string()));
        }
        Ok(inner
            .mailboxes
            .iter()
            .map(|&id| inner.nodes[id].name.clone())
            .collect())
    }

    fn mailbox(&self, name: &str) -> Result<usize, StoreError> {
        let inner = self.inner.borrow();
        inner
            .mailboxes
            .iter()
            .copied()
            .find(|&id| inner.nodes[id].name == name)
            .ok_or_else(|| StoreError::FolderNotFound(name.to_string()))
    }

    fn child(&self, parent: &usize, name: &str) -> Result<usize, StoreError> {
        let inner = self.inner.borrow();
        inner.nodes[*parent]
            .children
            .iter()
            .copied()
            .find(|&id| inner.nodes[id].name == name)
            .ok_or_else(|| StoreError::FolderNotFound(inner.path(*parent).join(name).to_string()))
    }

    fn children(&self, folder: &usize) -> Result<Vec<usize>, StoreError> {
        Ok(self.inner.borrow().nodes[*folder].children.clone())
    }

    fn path(&self, folder: &usize) -> FolderPath {
        self.inner.borrow().path(*folder)
    }

    fn items(&self, folder: &usize) -> Result<Vec<Item<usize>>, StoreError> {
        let mut inner = self.inner.borrow_mut();
        let path = inner.path(*folder);
        inner.listed.push(path.to_string());
        if inner.fail_items.contains(path.name()) {
            return Err(simulated("listing items"));
        }
        Ok(inner
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.folder == *folder)
            .map(|(key, item)| Item {
                key,
                kind: item.kind,
                subject: item.subject.clone(),
                received: item.received,
                size: item.size,
            })
            .collect())
    }

    fn move_item(&self, item: &Item<usize>, destination: &usize) -> Result<(), StoreError> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_move.contains(&item.subject) {
            return Err(simulated("moving item"));
        }
        inner.items[item.key].folder = *destination;
        let to = inner.path(*destination).to_string();
        inner.calls.push(Call::Move {
            subject: item.subject.clone(),
            to,
        });
        Ok(())
    }

    fn create_folder(&self, parent: &usize, name: &str) -> Result<usize, StoreError> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_create.contains(name) {
            return Err(simulated("creating folder"));
        }
        let id = inner.add_node(Some(*parent), name);
        let path = inner.path(id).to_string();
        inner.calls.push(Call::Create(path));
        Ok(id)
    }
}
