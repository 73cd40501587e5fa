use crate::progress::Progress;
use crate::sink::{ExportRow, RowSink, DATE_FORMAT};
use crate::store::{FolderPath, Item, ItemKind, MailStore};
use log::{debug, warn};

/// Folders with this path segment hold internal data of the mail client
/// and are never exported.
pub const EXCLUDED_SEGMENT: &str = "PersonMetadata";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportStats {
    pub exported: u64,
    pub failed: u64,
}

impl ExportStats {
    fn merge(&mut self, other: ExportStats) {
        self.exported += other.exported;
        self.failed += other.failed;
    }
}

/// The top-level folder a path below the export root belongs to.
pub fn main_folder_label(relative: &FolderPath) -> &str {
    relative.segments().first().map(String::as_str).unwrap_or("")
}

fn to_row<K>(item: &Item<K>, relative: &FolderPath) -> ExportRow {
    let size_kb = item.size as f64 / 1024.0;
    ExportRow {
        subject: item.subject.clone(),
        received: item
            .received
            .map(|dt| dt.format(DATE_FORMAT).to_string())
            .unwrap_or_default(),
        size_kb,
        size_mb: size_kb / 1024.0,
        folder: relative.to_string(),
        main_folder: main_folder_label(relative).to_string(),
    }
}

/// Writes a row for every mail item directly in `folder`. `processed` is
/// the number of rows written before this folder, used for progress.
pub fn process_folder<S, K, P>(
    store: &S,
    folder: &S::Folder,
    sink: &mut K,
    base: &FolderPath,
    processed: u64,
    progress: &mut P,
) -> ExportStats
where
    S: MailStore,
    K: RowSink,
    P: Progress,
{
    let mut stats = ExportStats::default();
    let path = store.path(folder);
    let items = match store.items(folder) {
        Ok(items) => items,
        Err(e) => {
            warn!("Error processing folder {}: {}", path, e);
            return stats;
        }
    };

    let relative = path.relative_to(base);
    for item in items.iter().filter(|item| item.kind == ItemKind::Mail) {
        match sink.write_row(&to_row(item, &relative)) {
            Ok(()) => {
                stats.exported += 1;
                progress.processed(processed + stats.exported);
            }
            Err(e) => {
                warn!("Error processing email {:?} in {}: {}", item.subject, path, e);
                stats.failed += 1;
            }
        }
    }
    stats
}

/// Exports `root` and every folder below it, depth first.
pub fn export_tree<S, K, P>(
    store: &S,
    root: &S::Folder,
    sink: &mut K,
    progress: &mut P,
) -> ExportStats
where
    S: MailStore,
    K: RowSink,
    P: Progress,
{
    let base = store.path(root);
    let mut stats = ExportStats::default();
    let mut pending = vec![root.clone()];
    while let Some(folder) = pending.pop() {
        stats.merge(process_folder(store, &folder, sink, &base, stats.exported, progress));

        let children = match store.children(&folder) {
            Ok(children) => children,
            Err(e) => {
                warn!("Cannot list subfolders of {}: {}", store.path(&folder), e);
                continue;
            }
        };
        let children: Vec<_> = children
            .into_iter()
            .filter(|child| {
                let path = store.path(child);
                let excluded = path.contains_segment(EXCLUDED_SEGMENT);
                if excluded {
                    debug!("Skipping {}", path);
                }
                !excluded
            })
            .collect();
        pending.extend(children.into_iter().rev());
    }
    stats
}
