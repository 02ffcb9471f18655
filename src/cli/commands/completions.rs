//! `gpam --completions SHELL`: generate shell completion scripts.
//!
//! Usage:
//!   gpam --completions bash > ~/.bash_completion.d/gpam
//!   gpam --completions zsh
//!   gpam --completions fish

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::errors::Result;

/// Print the completion script for `shell` to stdout.
pub fn execute(shell: Shell) -> Result<()> {
    write_script(shell, &mut io::stdout())
}

/// Write the completion script for `shell` to `out`.
pub fn write_script(shell: Shell, out: &mut dyn Write) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "gpam", &mut *out);
    out.flush()?;
    Ok(())
}
