//! The only channel through which the memo pad talks to a person.

use memopad_core::{parse_search_date, Confirmation, MemoError};
use time::Date;

/// Line-oriented user interaction supplied by the front end.
pub trait Prompter {
    /// Show one message.
    ///
    /// # Errors
    /// Returns an error when the message cannot be written.
    fn say(&mut self, message: &str) -> std::io::Result<()>;

    /// Show `prompt` and read one line. `None` means the input is exhausted.
    ///
    /// # Errors
    /// Returns an error when the terminal cannot be read.
    fn ask(&mut self, prompt: &str) -> std::io::Result<Option<String>>;
}

pub(crate) fn io_error(err: &std::io::Error) -> MemoError {
    MemoError::Io(err.to_string())
}

/// Describe a pending action and block until the user answers with one of
/// [`Confirmation::CHOICES`]. Anything else re-prompts. Exhausted input declines.
///
/// # Errors
/// Returns `MemoError::Io` when the terminal fails.
pub fn confirm(prompter: &mut dyn Prompter, action: &str) -> Result<Confirmation, MemoError> {
    prompter.say(action).map_err(|err| io_error(&err))?;
    loop {
        let Some(line) = prompter.ask("(yes/no)").map_err(|err| io_error(&err))? else {
            tracing::warn!(action, "input ended before confirmation; treating as no");
            return Ok(Confirmation::Decline);
        };

        if let Some(answer) = Confirmation::parse(&line) {
            if !answer.is_affirm() {
                tracing::info!(action, "declined");
            }
            return Ok(answer);
        }

        tracing::debug!(input = %line.trim(), "rejected confirmation answer");
        prompter.say("Please answer `yes` or `no`.").map_err(|err| io_error(&err))?;
    }
}

/// Ask for a `YYYY-MM-DD` date until a valid, non-future one is given.
/// `None` means the input ended first.
///
/// # Errors
/// Returns `MemoError::Io` when the terminal fails.
pub fn ask_search_date(prompter: &mut dyn Prompter, today: Date) -> Result<Option<Date>, MemoError> {
    prompter
        .say("Enter the memo's creation (or last edit) date as `YYYY-MM-DD`:")
        .map_err(|err| io_error(&err))?;
    loop {
        let Some(line) = prompter.ask("(YYYY-MM-DD)").map_err(|err| io_error(&err))? else {
            return Ok(None);
        };

        match parse_search_date(&line, today) {
            Ok(date) => return Ok(Some(date)),
            Err(err) => {
                tracing::debug!(input = %line.trim(), "rejected search date");
                prompter
                    .say(&format!("{err}. Enter a valid past date as `YYYY-MM-DD`:"))
                    .map_err(|err| io_error(&err))?;
            }
        }
    }
}
