use super::{FolderPath, Item, ItemKind, MailStore, StoreError};
use chrono::{DateTime, Utc};
use log::warn;
use mailparse::{parse_headers, MailHeaderMap};
use rayon::prelude::*;
use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Subdirectories holding messages.
const MESSAGE_DIRS: [&str; 2] = ["cur", "new"];
/// Subdirectories every maildir folder has, which are never child folders.
const MAILDIR_DIRS: [&str; 3] = ["cur", "new", "tmp"];

/// A store laid out as a tree of maildirs: each subdirectory of the root is
/// a mailbox, and each folder may contain child folders next to its `cur`,
/// `new` and `tmp` directories.
#[derive(Debug)]
pub struct MaildirStore {
    root: PathBuf,
}

#[derive(Clone, Debug)]
pub struct MaildirFolder {
    dir: PathBuf,
    path: FolderPath,
}

impl MaildirStore {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        MaildirStore { root: root.into() }
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains('/')
        && !MAILDIR_DIRS.contains(&name)
}

fn list_dir_names(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = vec![];
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        // Names which are not valid UTF-8 cannot be selected anyway.
        if let Ok(name) = entry.file_name().into_string() {
            if is_valid_name(&name) {
                names.push(name);
            }
        }
    }
    names.sort();
    Ok(names)
}

fn lookup(dir: PathBuf, path: FolderPath) -> Result<MaildirFolder, StoreError> {
    if is_valid_name(path.name()) && dir.is_dir() {
        Ok(MaildirFolder { dir, path })
    } else {
        Err(StoreError::FolderNotFound(path.to_string()))
    }
}

fn normalize_datetime(dt: &str) -> Cow<str> {
    let mut dt = dt;
    // Trailing commentary timezone info is not recognized.
    if dt.ends_with(')') {
        if let Some(pos) = dt.rfind('(') {
            dt = &dt[..pos];
        }
    }
    dt = dt.trim();
    // -0000 means "unknown local offset", which chrono rejects.
    match dt.strip_suffix("-0000") {
        Some(rest) => Cow::Owned(format!("{}+0000", rest)),
        None => Cow::Borrowed(dt),
    }
}

fn parse_received(date: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(&normalize_datetime(date))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn item_kind(content_type: Option<&str>) -> ItemKind {
    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|mime| mime.trim().to_ascii_lowercase());
    match mime.as_deref() {
        Some("text/calendar") => ItemKind::Appointment,
        Some("text/vcard") | Some("text/x-vcard") => ItemKind::Contact,
        _ => ItemKind::Mail,
    }
}

#[derive(Debug, Default)]
struct Headers {
    subject: Option<String>,
    date: Option<String>,
    content_type: Option<String>,
}

/// Reads the header block, up to and including the first empty line.
fn read_header_block(mut reader: impl BufRead) -> io::Result<Vec<u8>> {
    let mut block = vec![];
    loop {
        let start = block.len();
        if reader.read_until(b'\n', &mut block)? == 0 {
            block.extend_from_slice(b"\r\n");
            break;
        }
        if block[start..].iter().all(|b| matches!(b, b'\r' | b'\n')) {
            break;
        }
    }
    Ok(block)
}

fn read_headers(reader: impl BufRead) -> io::Result<Headers> {
    let block = read_header_block(reader)?;
    let (fields, _) = parse_headers(&block)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
    Ok(Headers {
        subject: fields.get_first_value("Subject"),
        date: fields.get_first_value("Date"),
        content_type: fields.get_first_value("Content-Type"),
    })
}

fn read_item(path: PathBuf) -> io::Result<Item<PathBuf>> {
    let file = File::open(&path)?;
    let size = file.metadata()?.len();
    let headers = read_headers(BufReader::new(file))?;
    Ok(Item {
        kind: item_kind(headers.content_type.as_deref()),
        subject: headers.subject.unwrap_or_default(),
        received: headers.date.as_deref().and_then(parse_received),
        size,
        key: path,
    })
}

impl MailStore for MaildirStore {
    type Folder = MaildirFolder;
    type ItemKey = PathBuf;

    fn mailboxes(&self) -> Result<Vec<String>, StoreError> {
        if !self.root.is_dir() {
            return Err(StoreError::Unavailable(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }
        Ok(list_dir_names(&self.root)?)
    }

    fn mailbox(&self, name: &str) -> Result<MaildirFolder, StoreError> {
        lookup(self.root.join(name), FolderPath::new(vec![name]))
    }

    fn child(&self, parent: &MaildirFolder, name: &str) -> Result<MaildirFolder, StoreError> {
        lookup(parent.dir.join(name), parent.path.join(name))
    }

    fn children(&self, folder: &MaildirFolder) -> Result<Vec<MaildirFolder>, StoreError> {
        Ok(list_dir_names(&folder.dir)?
            .into_iter()
            .map(|name| MaildirFolder {
                dir: folder.dir.join(&name),
                path: folder.path.join(&name),
            })
            .collect())
    }

    fn path(&self, folder: &MaildirFolder) -> FolderPath {
        folder.path.clone()
    }

    fn items(&self, folder: &MaildirFolder) -> Result<Vec<Item<PathBuf>>, StoreError> {
        let mut files = vec![];
        for sub in MESSAGE_DIRS.iter() {
            let dir = folder.dir.join(sub);
            if !dir.is_dir() {
                continue;
            }
            for entry in fs::read_dir(&dir)? {
                let entry = entry?;
                if entry.file_type()?.is_file() {
                    files.push(entry.path());
                }
            }
        }
        files.sort();

        let items = files
            .into_par_iter()
            .filter_map(|path| match read_item(path.clone()) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!("Cannot read message {}: {}", path.display(), e);
                    None
                }
            })
            .collect();
        Ok(items)
    }

    fn move_item(
        &self,
        item: &Item<PathBuf>,
        destination: &MaildirFolder,
    ) -> Result<(), StoreError> {
        let file_name = item.key.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a message file: {}", item.key.display()),
            )
        })?;
        let cur = destination.dir.join("cur");
        fs::create_dir_all(&cur)?;
        let target = cur.join(file_name);
        if target.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", target.display()),
            )
            .into());
        }
        fs::rename(&item.key, &target)?;
        Ok(())
    }

    fn create_folder(
        &self,
        parent: &MaildirFolder,
        name: &str,
    ) -> Result<MaildirFolder, StoreError> {
        if !is_valid_name(name) {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        let dir = parent.dir.join(name);
        fs::create_dir(&dir)?;
        for sub in MAILDIR_DIRS.iter() {
            fs::create_dir(dir.join(sub))?;
        }
        Ok(MaildirFolder {
            dir,
            path: parent.path.join(name),
        })
    }
}
