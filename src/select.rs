use crate::error::Fatal;
use crate::mirror::Mode;
use std::io::{self, BufRead, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Export,
    Archive,
}

fn invalid(what: &'static str, input: &str) -> Fatal {
    Fatal::InvalidSelection {
        what,
        input: input.to_string(),
    }
}

/// Parses a 1-based index into a list of `len` entries.
fn parse_index(what: &'static str, input: &str, len: usize) -> Result<usize, Fatal> {
    match input.trim().parse::<usize>() {
        Ok(n) if n >= 1 && n <= len => Ok(n - 1),
        _ => Err(invalid(what, input)),
    }
}

/// Parses a comma-separated list of 1-based indices. Duplicates are dropped.
fn parse_indices(what: &'static str, input: &str, len: usize) -> Result<Vec<usize>, Fatal> {
    let mut indices = vec![];
    for part in input.split(',') {
        let index = parse_index(what, part, len).map_err(|_| invalid(what, input))?;
        if !indices.contains(&index) {
            indices.push(index);
        }
    }
    Ok(indices)
}

/// Numbered-list prompts on a line-based terminal.
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Prompt { input, output }
    }

    fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    fn list(&mut self, title: &str, entries: &[String]) -> io::Result<()> {
        writeln!(self.output, "{}", title)?;
        for (i, entry) in entries.iter().enumerate() {
            writeln!(self.output, "{}. {}", i + 1, entry)?;
        }
        Ok(())
    }

    pub fn choose_action(&mut self) -> anyhow::Result<Action> {
        writeln!(self.output, "Choose an action:")?;
        writeln!(self.output, "1. Export emails to CSV")?;
        writeln!(self.output, "2. Move old emails to Online Archive")?;
        let answer = self.ask("Select an option (1 or 2): ")?;
        match answer.as_str() {
            "1" => Ok(Action::Export),
            "2" => Ok(Action::Archive),
            _ => Err(invalid("action", &answer).into()),
        }
    }

    /// Lets the user pick one of `entries`, returning its index.
    pub fn choose_one(
        &mut self,
        what: &'static str,
        title: &str,
        entries: &[String],
    ) -> anyhow::Result<usize> {
        self.list(title, entries)?;
        let answer = self.ask(&format!("Select {} number: ", what))?;
        Ok(parse_index(what, &answer, entries.len())?)
    }

    /// Lets the user pick any number of `entries`, returning their indices
    /// in the order given.
    pub fn choose_many(
        &mut self,
        what: &'static str,
        title: &str,
        entries: &[String],
    ) -> anyhow::Result<Vec<usize>> {
        self.list(title, entries)?;
        let answer = self.ask(&format!(
            "Select {}s by number (comma-separated, e.g., 1,3,6): ",
            what
        ))?;
        Ok(parse_indices(what, &answer, entries.len())?)
    }

    pub fn choose_mode(&mut self) -> anyhow::Result<Mode> {
        let answer = self.ask(
            "Do you want to perform a dry-run or actually move emails? (dry-run/move): ",
        )?;
        Ok(answer.parse()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(input: &str) -> Prompt<&[u8], Vec<u8>> {
        Prompt::new(input.as_bytes(), vec![])
    }

    fn names() -> Vec<String> {
        vec!["Inbox".into(), "Sent Items".into(), "Archive".into()]
    }

    fn is_invalid_selection(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<Fatal>(),
            Some(Fatal::InvalidSelection { .. })
        )
    }

    #[test]
    fn test_parse_indices() {
        assert_eq!(parse_indices("folder", "1, 3,1", 3).unwrap(), vec![0, 2]);
        assert!(parse_indices("folder", "1,4", 3).is_err());
        assert!(parse_indices("folder", "1,,2", 3).is_err());
        assert!(parse_indices("folder", "0", 3).is_err());
        assert!(parse_indices("folder", "", 3).is_err());
    }

    #[test]
    fn test_choose_one() {
        let mut p = prompt("2\n");
        assert_eq!(p.choose_one("mailbox", "Available mailboxes:", &names()).unwrap(), 1);
        let shown = String::from_utf8(p.output).unwrap();
        assert_eq!(
            shown,
            "Available mailboxes:\n1. Inbox\n2. Sent Items\n3. Archive\nSelect mailbox number: "
        );

        for input in &["4\n", "x\n", ""] {
            let err = prompt(input)
                .choose_one("mailbox", "Available mailboxes:", &names())
                .unwrap_err();
            assert!(is_invalid_selection(&err), "{:?} was accepted", input);
        }
    }

    #[test]
    fn test_choose_many() {
        let mut p = prompt("3,1\n");
        assert_eq!(p.choose_many("folder", "Folders:", &names()).unwrap(), vec![2, 0]);
        let err = prompt("1,9\n")
            .choose_many("folder", "Folders:", &names())
            .unwrap_err();
        assert!(is_invalid_selection(&err));
    }

    #[test]
    fn test_choose_mode() {
        assert_eq!(prompt("move\n").choose_mode().unwrap(), Mode::Move);
        assert_eq!(prompt(" DRY-RUN \n").choose_mode().unwrap(), Mode::DryRun);
        let err = prompt("maybe\n").choose_mode().unwrap_err();
        assert!(matches!(err.downcast_ref::<Fatal>(), Some(Fatal::InvalidMode(_))));
    }

    #[test]
    fn test_choose_action() {
        assert_eq!(prompt("1\n").choose_action().unwrap(), Action::Export);
        assert_eq!(prompt("2\n").choose_action().unwrap(), Action::Archive);
        assert!(is_invalid_selection(&prompt("3\n").choose_action().unwrap_err()));
    }
}
