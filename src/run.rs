use crate::args::{ArchiveArgs, Args, ExportArgs};
use crate::enumerate::{find_archive_mailbox, list_child_folders, list_mailboxes};
use crate::error::Fatal;
use crate::export::export_tree;
use crate::mirror::{FolderReport, MirrorPolicy, Mode, Mover};
use crate::progress::{create_spinner, Throttled, REPORT_INTERVAL};
use crate::select::Prompt;
use crate::sink::CsvSink;
use crate::store::MailStore;
use crate::summary::ExportSummary;
use anyhow::Context;
use chrono::{Local, Utc};
use log::info;
use std::fs::{self, File};
use std::io::{BufRead, Write};
use std::path::PathBuf;

fn available_mailboxes<S: MailStore>(store: &S) -> anyhow::Result<Vec<String>> {
    let mailboxes = list_mailboxes(store)?;
    if mailboxes.is_empty() {
        return Err(Fatal::NoMailboxes.into());
    }
    Ok(mailboxes)
}

fn select_mailbox<R: BufRead, W: Write>(
    prompt: &mut Prompt<R, W>,
    mailboxes: &[String],
    given: Option<&str>,
) -> anyhow::Result<String> {
    match given {
        Some(name) if mailboxes.iter().any(|m| m == name) => Ok(name.to_string()),
        Some(name) => Err(Fatal::InvalidSelection {
            what: "mailbox",
            input: name.to_string(),
        }
        .into()),
        None => {
            let index = prompt.choose_one("mailbox", "Available mailboxes:", mailboxes)?;
            Ok(mailboxes[index].clone())
        }
    }
}

pub fn export<S, R, W>(
    args: &Args,
    opts: &ExportArgs,
    store: &S,
    prompt: &mut Prompt<R, W>,
) -> anyhow::Result<()>
where
    S: MailStore,
    R: BufRead,
    W: Write,
{
    let mailboxes = available_mailboxes(store)?;
    let name = select_mailbox(prompt, &mailboxes, opts.mailbox.as_deref())?;
    let root = store
        .mailbox(&name)
        .with_context(|| format!("Cannot find folder: {}", name))?;

    let output_dir = opts
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("export"))
        .join(&name);
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Cannot create {}", output_dir.display()))?;
    let output = output_dir.join(format!("{}.csv", Local::now().format("%Y_%m_%d_%H_%M")));
    let file =
        File::create(&output).with_context(|| format!("Cannot create {}", output.display()))?;

    let mut sink = CsvSink::new(file)?;
    let mut progress = Throttled::new(create_spinner(args.quiet), REPORT_INTERVAL);
    let stats = export_tree(store, &root, &mut sink, &mut progress);
    progress.into_inner().finish_and_clear();
    sink.finish()?;

    println!(
        "Export completed. Total emails processed: {}. File saved as: {}",
        stats.exported,
        output.display()
    );
    if stats.failed > 0 {
        println!("Emails which could not be exported: {}", stats.failed);
    }

    let file = File::open(&output).with_context(|| format!("Cannot read {}", output.display()))?;
    println!("{}", ExportSummary::read(file)?);
    Ok(())
}

fn print_report(report: &FolderReport) {
    println!("Total emails processed: {}", report.moved.count);
    println!("Total size processed: {:.2} MB", report.moved.size_mb());
    if report.failed_moves > 0 {
        println!("Emails which could not be moved: {}", report.failed_moves);
    }
    for failure in &report.mirror_failures {
        println!(
            "Archive folder {} could not be created; its emails went to the parent folder.",
            failure.folder_path
        );
    }
}

pub fn archive<S, R, W>(
    opts: &ArchiveArgs,
    store: &S,
    prompt: &mut Prompt<R, W>,
) -> anyhow::Result<()>
where
    S: MailStore,
    R: BufRead,
    W: Write,
{
    let mailboxes = available_mailboxes(store)?;
    let name = select_mailbox(prompt, &mailboxes, opts.mailbox.as_deref())?;
    let archive_name = find_archive_mailbox(&mailboxes, &name)
        .ok_or_else(|| Fatal::NoArchiveMailbox(name.clone()))?
        .to_string();
    info!("Mapped Online Archive: {}", archive_name);

    let folders = list_child_folders(store, &name)?;
    if folders.is_empty() {
        return Err(Fatal::NoFolders(name).into());
    }
    let selected: Vec<String> = if opts.folders.is_empty() {
        let title = format!("Main folders in '{}':", name);
        prompt
            .choose_many("folder", &title, &folders)?
            .into_iter()
            .map(|index| folders[index].clone())
            .collect()
    } else {
        let mut selected = vec![];
        for folder in &opts.folders {
            if !folders.contains(folder) {
                return Err(Fatal::InvalidSelection {
                    what: "folder",
                    input: folder.clone(),
                }
                .into());
            }
            if !selected.contains(folder) {
                selected.push(folder.clone());
            }
        }
        selected
    };
    info!("Selected folders: {}", selected.join(", "));

    let mode = match opts.mode {
        Some(mode) => mode,
        None => prompt.choose_mode()?,
    };
    let policy = if opts.fail_fast {
        MirrorPolicy::FailFast
    } else {
        MirrorPolicy::BestEffort
    };

    let mailbox = store.mailbox(&name)?;
    let archive_root = store.mailbox(&archive_name)?;
    let mover = Mover::new(store, mode, policy, Utc::now());
    let report = match mover.archive_selected(&mailbox, &archive_root, &selected) {
        Ok(report) => report,
        Err(aborted) => {
            println!("Archiving aborted. Emails moved before the failure:");
            print_report(&aborted.partial);
            return Err(aborted.into());
        }
    };

    match mode {
        Mode::DryRun => println!("Dry-run complete. No emails were moved."),
        Mode::Move => println!("Email move completed."),
    }
    print_report(&report);
    Ok(())
}
