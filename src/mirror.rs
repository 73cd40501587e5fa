use crate::error::Fatal;
use crate::store::{Item, MailStore, StoreError};
use crate::tally::Tally;
use chrono::{DateTime, Duration, Utc};
use clap::ValueEnum;
use log::{info, warn};
use std::mem;
use std::str::FromStr;
use thiserror::Error;

/// Messages received longer ago than this are moved to the archive.
pub const AGE_THRESHOLD_DAYS: i64 = 365;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Only count what would be moved.
    DryRun,
    /// Move aged emails into the archive mailbox.
    Move,
}

impl FromStr for Mode {
    type Err = Fatal;

    fn from_str(s: &str) -> Result<Self, Fatal> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dry-run" => Ok(Mode::DryRun),
            "move" => Ok(Mode::Move),
            _ => Err(Fatal::InvalidMode(s.trim().to_string())),
        }
    }
}

/// What to do when an archive folder cannot be created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MirrorPolicy {
    /// Use the parent archive folder instead and carry on.
    BestEffort,
    /// Abort the run.
    FailFast,
}

#[derive(Error, Debug)]
#[error("cannot create archive folder {folder_path}: {source}")]
pub struct MirrorFailure {
    pub folder_path: String,
    pub source: StoreError,
}

/// A run stopped by `MirrorPolicy::FailFast`, with what was done before.
#[derive(Error, Debug)]
#[error("{failure}")]
pub struct Aborted {
    pub failure: MirrorFailure,
    pub partial: FolderReport,
}

#[derive(Debug, Default)]
pub struct FolderReport {
    /// Aged messages moved, or which would be moved in a dry run.
    pub moved: Tally,
    /// Aged messages whose move failed. They are not part of `moved`.
    pub failed_moves: u64,
    /// Archive folders replaced by their parent.
    pub mirror_failures: Vec<MirrorFailure>,
}

impl FolderReport {
    pub fn merge(&mut self, other: FolderReport) {
        self.moved += other.moved;
        self.failed_moves += other.failed_moves;
        self.mirror_failures.extend(other.mirror_failures);
    }
}

pub fn is_aged(received: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    received < now - Duration::days(AGE_THRESHOLD_DAYS)
}

/// Returns the child `name` of `parent`, creating it if it cannot be found.
pub fn get_or_create_subfolder<S: MailStore>(
    store: &S,
    parent: &S::Folder,
    name: &str,
) -> Result<S::Folder, MirrorFailure> {
    if let Ok(folder) = store.child(parent, name) {
        return Ok(folder);
    }
    let path = store.path(parent).join(name);
    info!("Archive folder '{}' does not exist. Creating it...", path);
    store
        .create_folder(parent, name)
        .map_err(|source| MirrorFailure {
            folder_path: path.to_string(),
            source,
        })
}

/// A folder waiting to be processed. `destination` is `None` in a dry run
/// when the archive folder does not exist yet.
struct Pending<F> {
    source: F,
    destination: Option<F>,
    depth: usize,
}

pub struct Mover<'a, S: MailStore> {
    store: &'a S,
    mode: Mode,
    policy: MirrorPolicy,
    now: DateTime<Utc>,
}

impl<'a, S: MailStore> Mover<'a, S> {
    pub fn new(store: &'a S, mode: Mode, policy: MirrorPolicy, now: DateTime<Utc>) -> Self {
        Mover {
            store,
            mode,
            policy,
            now,
        }
    }

    /// Archives the folders `names` of `mailbox` into `archive_root`. Names
    /// which cannot be found in the mailbox, or which were already given,
    /// are skipped.
    pub fn archive_selected(
        &self,
        mailbox: &S::Folder,
        archive_root: &S::Folder,
        names: &[String],
    ) -> Result<FolderReport, Aborted> {
        let mut report = FolderReport::default();
        let mut seen: Vec<&str> = vec![];
        for name in names {
            if seen.contains(&name.as_str()) {
                warn!("Folder {} was selected twice, skipping", name);
                continue;
            }
            seen.push(name);
            info!("Accessing folder: {}", name);
            let source = match self.store.child(mailbox, name) {
                Ok(source) => source,
                Err(e) => {
                    warn!("Error accessing folder {}: {}", name, e);
                    continue;
                }
            };
            let destination = match self.mirror(archive_root, name, &mut report) {
                Ok(destination) => destination,
                Err(failure) => {
                    return Err(Aborted {
                        failure,
                        partial: report,
                    })
                }
            };
            let result = match destination {
                Some(destination) => self.process_folder(&source, &destination, 0),
                // Dry run, and the archive folder does not exist yet.
                None => self.run(source, None, 0),
            };
            match result {
                Ok(folder_report) => report.merge(folder_report),
                Err(mut aborted) => {
                    report.merge(mem::take(&mut aborted.partial));
                    aborted.partial = report;
                    return Err(aborted);
                }
            }
        }
        Ok(report)
    }

    /// Moves or counts the aged messages of `source` and all its subfolders,
    /// mirroring the folder tree under `destination`.
    pub fn process_folder(
        &self,
        source: &S::Folder,
        destination: &S::Folder,
        depth: usize,
    ) -> Result<FolderReport, Aborted> {
        self.run(source.clone(), Some(destination.clone()), depth)
    }

    fn run(
        &self,
        source: S::Folder,
        destination: Option<S::Folder>,
        depth: usize,
    ) -> Result<FolderReport, Aborted> {
        let mut report = FolderReport::default();
        let mut pending = vec![Pending {
            source,
            destination,
            depth,
        }];
        while let Some(entry) = pending.pop() {
            report.merge(self.process_items(&entry));

            let children = match self.store.children(&entry.source) {
                Ok(children) => children,
                Err(e) => {
                    warn!(
                        "Cannot list subfolders of {}: {}",
                        self.store.path(&entry.source),
                        e
                    );
                    continue;
                }
            };
            let mut next = Vec::with_capacity(children.len());
            for child in children {
                let name = self.store.path(&child).name().to_string();
                let destination = match &entry.destination {
                    Some(parent) => match self.mirror(parent, &name, &mut report) {
                        Ok(destination) => destination,
                        Err(failure) => {
                            return Err(Aborted {
                                failure,
                                partial: report,
                            })
                        }
                    },
                    None => None,
                };
                next.push(Pending {
                    source: child,
                    destination,
                    depth: entry.depth + 1,
                });
            }
            // Reversed so that the first child is processed first.
            pending.extend(next.into_iter().rev());
        }
        Ok(report)
    }

    fn mirror(
        &self,
        parent: &S::Folder,
        name: &str,
        report: &mut FolderReport,
    ) -> Result<Option<S::Folder>, MirrorFailure> {
        if self.mode == Mode::DryRun {
            return Ok(match self.store.child(parent, name) {
                Ok(folder) => Some(folder),
                Err(_) => {
                    info!(
                        "Archive folder '{}' would be created.",
                        self.store.path(parent).join(name)
                    );
                    None
                }
            });
        }
        match get_or_create_subfolder(self.store, parent, name) {
            Ok(folder) => Ok(Some(folder)),
            Err(failure) => match self.policy {
                MirrorPolicy::FailFast => Err(failure),
                MirrorPolicy::BestEffort => {
                    warn!("{}; using {} instead", failure, self.store.path(parent));
                    report.mirror_failures.push(failure);
                    Ok(Some(parent.clone()))
                }
            },
        }
    }

    fn is_aged(&self, item: &Item<S::ItemKey>) -> bool {
        item.received.map_or(false, |received| is_aged(received, self.now))
    }

    fn process_items(&self, entry: &Pending<S::Folder>) -> FolderReport {
        let mut report = FolderReport::default();
        let path = self.store.path(&entry.source);
        let items = match self.store.items(&entry.source) {
            Ok(items) => items,
            Err(e) => {
                warn!("Error processing folder {}: {}", path, e);
                return report;
            }
        };

        for item in items.iter().filter(|item| self.is_aged(item)) {
            if let (Mode::Move, Some(destination)) = (self.mode, &entry.destination) {
                if let Err(e) = self.store.move_item(item, destination) {
                    warn!("Cannot move {:?} out of {}: {}", item.subject, path, e);
                    report.failed_moves += 1;
                    continue;
                }
            }
            report.moved += Tally::of_bytes(item.size);
        }

        if report.moved.count > 0 {
            let verb = match self.mode {
                Mode::DryRun => "would be moved",
                Mode::Move => "moved",
            };
            info!(
                "{}Folder '{}': {} emails ({:.2} MB) {}.",
                "  ".repeat(entry.depth),
                path.name(),
                report.moved.count,
                report.moved.size_mb(),
                verb
            );
        }
        report
    }
}
