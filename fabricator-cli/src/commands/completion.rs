//! `fabricator completion`: tab completion for the subcommands and flags.

use clap::CommandFactory;
use clap_complete::{generate, shells::Shell};

/// Prints a script that teaches `shell` to complete `fabricator` invocations.
/// Source it from the shell profile, e.g. `fabricator completion -s zsh > _fabricator`.
pub fn generate_completion(shell: Shell) {
    let mut command = crate::Cli::command();
    let name = command.get_name().to_string();
    generate(shell, &mut command, name, &mut std::io::stdout());
}
