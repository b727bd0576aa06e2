use std::io::{BufRead, Write};

use memopad_api::Prompter;

/// Reads answers line by line from `input` and writes everything to `output`.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn say(&mut self, message: &str) -> std::io::Result<()> {
        writeln!(self.output, "{message}")
    }

    fn ask(&mut self, prompt: &str) -> std::io::Result<Option<String>> {
        write!(self.output, "{prompt} ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}
