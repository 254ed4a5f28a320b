//! Shell completions command.

use crate::cli::{Cli, Shell};
use crate::error::Result;
use clap::CommandFactory;
use clap_complete::{generate, shells};

/// Generate completions for the given shell on stdout.
pub fn execute(shell: &Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    let mut out = std::io::stdout();

    match shell {
        Shell::Bash => generate(shells::Bash, &mut cmd, &name, &mut out),
        Shell::Zsh => generate(shells::Zsh, &mut cmd, &name, &mut out),
        Shell::Fish => generate(shells::Fish, &mut cmd, &name, &mut out),
        Shell::PowerShell => generate(shells::PowerShell, &mut cmd, &name, &mut out),
        Shell::Elvish => generate(shells::Elvish, &mut cmd, &name, &mut out),
    }

    Ok(())
}
