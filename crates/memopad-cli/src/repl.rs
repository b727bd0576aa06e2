//! The interactive loop: one command is read, run to completion (prompts included),
//! and reported before the next one is read.

use anyhow::{anyhow, Result};
use memopad_api::{ApiResult, Bootstrap, Gated, MemoPad, Prompter, RestoreKind};
use memopad_core::{Memo, MemoDraft, MemoError, MemoField};

use crate::commands::{self, Command};
use crate::render;

const COMMAND_PROMPT: &str = "memopad >>>";
const BODY_END: &str = ".";
const STORE_HINT: &str = "store not found; use `add`, `restore-db` or `recreate-db`";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Bootstrap the store, then serve commands until `quit`, a completed `clear`, or the
/// end of input.
///
/// A store that cannot be prepared at startup is reported and the loop still starts,
/// so `restore-db` and `recreate-db` stay reachable.
///
/// # Errors
/// Returns an error only when the terminal fails.
pub fn run(pad: &MemoPad, prompter: &mut dyn Prompter) -> Result<()> {
    say(prompter, "MemoPad: type `help` to list commands.")?;
    match pad.bootstrap(prompter) {
        Ok(Bootstrap::Opened(path)) => say(prompter, &format!("Using memo store {}", path.display()))?,
        Ok(Bootstrap::Created(path)) => {
            say(prompter, &format!("Created new memo store {}", path.display()))?;
        }
        Ok(Bootstrap::Restored(path)) => {
            say(prompter, &format!("Restored memo store {} from backup", path.display()))?;
        }
        Ok(Bootstrap::RestoreDeclined) => say(prompter, &format!("Backup not restored; {STORE_HINT}."))?,
        Err(MemoError::Io(message)) => return Err(anyhow!("terminal i/o failed: {message}")),
        Err(err) => {
            tracing::error!(error = %err, "memo store could not be prepared at startup");
            say(prompter, &describe(&err))?;
            say(prompter, "Use `restore-db` to return to the backup or `recreate-db` to start over.")?;
        }
    }

    loop {
        let Some(line) = ask(prompter, COMMAND_PROMPT)? else {
            tracing::debug!("input ended; leaving command loop");
            return Ok(());
        };
        if line.trim().is_empty() {
            continue;
        }

        let Some(command) = Command::parse(&line) else {
            say(prompter, &format!("Unknown command `{}`. Type `help` to list commands.", line.trim()))?;
            continue;
        };

        tracing::debug!(?command, "running command");
        match execute(pad, prompter, command) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => return Ok(()),
            Err(MemoError::Io(message)) => return Err(anyhow!("terminal i/o failed: {message}")),
            Err(err) => say(prompter, &describe(&err))?,
        }
    }
}

fn describe(err: &MemoError) -> String {
    match err {
        MemoError::StoreMissing(_) => format!("Error: {STORE_HINT}."),
        MemoError::NotFound(message) => format!("Not found: {message}."),
        MemoError::InvalidInput(message) => format!("Invalid input: {message}."),
        MemoError::StorageFault(message) => format!("Storage error: {message}"),
        MemoError::Io(message) => format!("Terminal error: {message}"),
    }
}

fn execute(pad: &MemoPad, prompter: &mut dyn Prompter, command: Command) -> ApiResult<Flow> {
    match command {
        Command::ViewRecent => show(prompter, &[pad.recent()?])?,
        Command::ViewLast => show(prompter, &pad.last()?)?,
        Command::ViewAll => show(prompter, &pad.all()?)?,
        Command::Count => tell(prompter, &format!("Total memos: {}", pad.count()?))?,
        Command::Add => add(pad, prompter)?,
        Command::EditTitle => edit(pad, prompter, MemoField::Title)?,
        Command::EditText => edit(pad, prompter, MemoField::Body)?,
        Command::EditTag => edit(pad, prompter, MemoField::Tags)?,
        Command::DelMemo => delete(pad, prompter)?,
        Command::DelAll => match pad.delete_all(prompter)? {
            Gated::Done(removed) => tell(prompter, &format!("Deleted {removed} memos."))?,
            Gated::Declined => cancelled(prompter)?,
        },
        Command::SearchId => {
            let raw = read_required(prompter, "Memo identifier:")?;
            show(prompter, &[pad.locate(&raw)?])?;
        }
        Command::SearchDate => {
            if let Some(date) = pad.read_search_date(prompter)? {
                show(prompter, &pad.search_date(date)?)?;
            }
        }
        Command::SearchTitle => search(pad, prompter, MemoField::Title)?,
        Command::SearchText => search(pad, prompter, MemoField::Body)?,
        Command::SearchTag => search(pad, prompter, MemoField::Tags)?,
        Command::BackupDb => backup(pad, prompter)?,
        Command::RestoreDb => match pad.restore(prompter)? {
            Gated::Done(RestoreKind::Repopulated) => {
                tell(prompter, "Memo store recreated from backup.")?;
            }
            Gated::Done(RestoreKind::Overwritten) => {
                tell(prompter, "Memo store replaced with backup.")?;
            }
            Gated::Declined => cancelled(prompter)?,
        },
        Command::CheckDb => {
            let report = pad.check()?;
            if report.ok {
                tell(prompter, "Integrity check passed.")?;
                tell(prompter, "If memos still look wrong, try `restore-db` or `recreate-db`.")?;
            } else {
                tell(prompter, &format!("Integrity check FAILED: {}", report.message))?;
                tell(prompter, "Use `restore-db` to return to the backup or `recreate-db` to start over.")?;
            }
        }
        Command::RecreateDb => match pad.recreate(prompter)? {
            Gated::Done(path) => tell(prompter, &format!("Created empty memo store {}", path.display()))?,
            Gated::Declined => cancelled(prompter)?,
        },
        Command::Clear => match pad.clear(prompter)? {
            Gated::Done(()) => {
                tell(prompter, "All MemoPad data removed. Goodbye.")?;
                return Ok(Flow::Exit);
            }
            Gated::Declined => cancelled(prompter)?,
        },
        Command::Help => {
            for line in commands::help() {
                tell(prompter, &line)?;
            }
        }
        Command::Group(group) => {
            for line in commands::group_help(group) {
                tell(prompter, &line)?;
            }
        }
        Command::Quit => {
            if pad.paths().store_exists() {
                backup(pad, prompter)?;
            }
            tell(prompter, "Goodbye.")?;
            return Ok(Flow::Exit);
        }
    }
    Ok(Flow::Continue)
}

fn add(pad: &MemoPad, prompter: &mut dyn Prompter) -> ApiResult<()> {
    let title = ask(prompter, "Title:")?.unwrap_or_default();
    let body = read_body(prompter)?;
    let tags = ask(prompter, "Tags (space separated):")?.unwrap_or_default();

    let memo = pad.add(&MemoDraft::new(&title, &body, &tags))?;
    tell(prompter, &format!("Memo {} saved.", memo.id))?;
    show(prompter, &[memo])
}

fn edit(pad: &MemoPad, prompter: &mut dyn Prompter, field: MemoField) -> ApiResult<()> {
    let raw = read_required(prompter, "Memo identifier:")?;
    let memo = pad.locate(&raw)?;
    pad.check_mutable(&memo)?;
    show(prompter, std::slice::from_ref(&memo))?;

    let value = if field == MemoField::Body {
        read_body(prompter)?
    } else {
        tell(prompter, &format!("Current {}: {}", field.label(), field.editable(memo.field(field))))?;
        ask(prompter, &format!("New {}:", field.label()))?.unwrap_or_default()
    };

    match pad.edit(&memo, field, &value, prompter)? {
        Gated::Done(updated) => {
            tell(prompter, &format!("Memo {} updated.", updated.id))?;
            show(prompter, &[updated])
        }
        Gated::Declined => cancelled(prompter),
    }
}

fn delete(pad: &MemoPad, prompter: &mut dyn Prompter) -> ApiResult<()> {
    let raw = read_required(prompter, "Memo identifier:")?;
    let memo = pad.locate(&raw)?;
    pad.check_mutable(&memo)?;
    show(prompter, std::slice::from_ref(&memo))?;

    match pad.delete(&memo, prompter)? {
        Gated::Done(()) => tell(prompter, &format!("Memo {} deleted.", memo.id)),
        Gated::Declined => cancelled(prompter),
    }
}

fn search(pad: &MemoPad, prompter: &mut dyn Prompter, field: MemoField) -> ApiResult<()> {
    let query = ask(prompter, &format!("Search {}:", field.label()))?.unwrap_or_default();
    show(prompter, &pad.search_text(field, &query)?)
}

fn backup(pad: &MemoPad, prompter: &mut dyn Prompter) -> ApiResult<()> {
    match pad.backup(prompter)? {
        Gated::Done(path) => tell(prompter, &format!("Backup saved to {}", path.display())),
        Gated::Declined => cancelled(prompter),
    }
}

/// Body lines up to a line holding only `.`, or the end of input.
fn read_body(prompter: &mut dyn Prompter) -> ApiResult<String> {
    tell(prompter, "Text (finish with a line containing only `.`):")?;
    let mut lines = Vec::new();
    while let Some(line) = ask(prompter, "|")? {
        if line.trim() == BODY_END {
            break;
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

fn read_required(prompter: &mut dyn Prompter, prompt: &str) -> ApiResult<String> {
    ask(prompter, prompt)?.ok_or_else(|| MemoError::InvalidInput("input ended".to_string()))
}

fn show(prompter: &mut dyn Prompter, memos: &[Memo]) -> ApiResult<()> {
    for memo in memos {
        tell(prompter, &render::memo(memo))?;
    }
    Ok(())
}

fn cancelled(prompter: &mut dyn Prompter) -> ApiResult<()> {
    tell(prompter, "Cancelled; nothing was changed.")
}

fn tell(prompter: &mut dyn Prompter, message: &str) -> ApiResult<()> {
    prompter.say(message).map_err(|err| MemoError::Io(err.to_string()))
}

fn ask(prompter: &mut dyn Prompter, prompt: &str) -> ApiResult<Option<String>> {
    prompter.ask(prompt).map_err(|err| MemoError::Io(err.to_string()))
}

fn say(prompter: &mut dyn Prompter, message: &str) -> Result<()> {
    prompter.say(message).map_err(|err| anyhow!("terminal i/o failed: {err}"))
}
