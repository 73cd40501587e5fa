mod args;
mod enumerate;
mod error;
mod export;
mod mirror;
mod progress;
mod run;
mod select;
mod sink;
mod store;
mod summary;
mod tally;

use args::{ArchiveArgs, Args, Command, ExportArgs};
use env_logger::Env;
use select::{Action, Prompt};
use std::io;
use store::maildir::MaildirStore;

fn main() -> anyhow::Result<()> {
    let args = Args::parse_args();
    let level = if args.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
    do_main(&args)
}

fn do_main(args: &Args) -> anyhow::Result<()> {
    let store = MaildirStore::open(args.root.clone());
    let stdin = io::stdin();
    let mut prompt = Prompt::new(stdin.lock(), io::stdout());

    match &args.command {
        Some(Command::Export(opts)) => run::export(args, opts, &store, &mut prompt),
        Some(Command::Archive(opts)) => run::archive(opts, &store, &mut prompt),
        None => match prompt.choose_action()? {
            Action::Export => run::export(args, &ExportArgs::default(), &store, &mut prompt),
            Action::Archive => run::archive(&ArchiveArgs::default(), &store, &mut prompt),
        },
    }
}
