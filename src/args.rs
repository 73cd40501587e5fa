use crate::mirror::Mode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[clap(name = "mailbox-archiver")]
#[clap(author, version, about)]
pub struct Args {
    /// Path to the mail store, holding one directory per mailbox.
    pub root: PathBuf,
    /// Suppress progress output and informational messages if set.
    #[clap(short, long)]
    pub quiet: bool,
    /// What to do. Asked interactively if not given.
    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Export metadata of every email in a mailbox to a CSV file.
    Export(ExportArgs),
    /// Move emails older than a year to the Online Archive of a mailbox.
    Archive(ArchiveArgs),
}

#[derive(Debug, Default, clap::Args)]
pub struct ExportArgs {
    /// Mailbox to export.
    #[clap(long)]
    pub mailbox: Option<String>,
    /// Directory receiving the export, defaults to `export`.
    #[clap(long)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Default, clap::Args)]
pub struct ArchiveArgs {
    /// Mailbox to archive.
    #[clap(long)]
    pub mailbox: Option<String>,
    /// Top-level folder of the mailbox to archive. May be repeated.
    #[clap(long = "folder")]
    pub folders: Vec<String>,
    /// Whether to move emails or only count them. Asked interactively if
    /// not given.
    #[clap(long, value_enum)]
    pub mode: Option<Mode>,
    /// Abort when an archive folder cannot be created, instead of moving
    /// its emails into the parent archive folder.
    #[clap(long)]
    pub fail_fast: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
