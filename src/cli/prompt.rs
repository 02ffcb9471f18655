//! Line input for interactive actions.
//!
//! On a terminal we prompt with `dialoguer`; when stdin is piped we read
//! plain lines so `gpam -n -i < records.txt` works in scripts.

use std::collections::VecDeque;
use std::io::{self, BufRead, IsTerminal};

use crate::cli::output;
use crate::errors::{GpamError, Result};
use crate::record::{Record, RecordCollection, DEFAULT_DELIMITER};

/// Source of user-entered lines.
pub trait LineReader {
    /// Read one line without its trailing newline. `None` means end of input.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Stdin: `dialoguer` prompts on a terminal, raw lines otherwise.
#[derive(Debug)]
pub struct Terminal {
    attended: bool,
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            attended: io::stdin().is_terminal(),
        }
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl LineReader for Terminal {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        if self.attended {
            let line: String = dialoguer::Input::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
                .map_err(|e| GpamError::CommandFailed(format!("prompt: {e}")))?;
            return Ok(Some(line));
        }

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Pre-recorded lines, for driving interactive actions without a terminal.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl LineReader for ScriptedInput {
    fn read_line(&mut self, _prompt: &str) -> Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

/// Read a name; empty input (or end of input) aborts with `what`.
pub fn read_name(input: &mut dyn LineReader, prompt: &str, what: &str) -> Result<String> {
    let line = input.read_line(prompt)?.unwrap_or_default();
    let name = line.trim();
    if name.is_empty() {
        return Err(GpamError::UserAborted(what.to_string()));
    }
    Ok(name.to_string())
}

/// Read `NAME=VALUE` lines into `records` until an empty line or end of input.
///
/// Malformed lines are reported and skipped.  Returns how many were added.
pub fn read_records(input: &mut dyn LineReader, records: &mut RecordCollection) -> Result<usize> {
    let mut added = 0;
    while let Some(line) = input.read_line("Enter record (NAME=VALUE, empty to finish)")? {
        let line = line.trim();
        if line.is_empty() {
            break;
        }

        match Record::parse(line, Some(DEFAULT_DELIMITER)) {
            Some(record) => {
                records.add(record);
                added += 1;
            }
            None => output::warning(&format!("Invalid record format: \"{line}\"")),
        }
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_records_stops_at_empty_line() {
        let mut input = ScriptedInput::new(["url=https://x", "pin=1", "", "ignored=yes"]);
        let mut records = RecordCollection::new();
        assert_eq!(read_records(&mut input, &mut records).unwrap(), 2);
        assert_eq!(records.value_of("pin"), Some("1"));
        assert!(records.get("ignored").is_none());
    }

    #[test]
    fn read_records_skips_malformed_lines() {
        let mut input = ScriptedInput::new(["no delimiter", "=x", "k=", "ok=1"]);
        let mut records = RecordCollection::new();
        assert_eq!(read_records(&mut input, &mut records).unwrap(), 1);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn read_records_stops_at_end_of_input() {
        let mut input = ScriptedInput::new(["a=1"]);
        let mut records = RecordCollection::new();
        assert_eq!(read_records(&mut input, &mut records).unwrap(), 1);
    }

    #[test]
    fn read_name_trims_and_aborts_on_empty() {
        let mut input = ScriptedInput::new(["  example.com  ", ""]);
        assert_eq!(
            read_name(&mut input, "Site", "Empty site name").unwrap(),
            "example.com"
        );
        let err = read_name(&mut input, "Site", "Empty site name").unwrap_err();
        assert_eq!(err.to_string(), "Empty site name. Aborted");
        assert_eq!(err.exit_code(), 1);
    }
}
