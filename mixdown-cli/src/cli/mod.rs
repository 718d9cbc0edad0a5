//! Subcommand implementations and argument handling.

pub mod args;
pub mod bench;
pub mod create;
pub mod probe;
pub mod render;
pub mod settings;

/// Result type shared by CLI commands. Errors are logged by `main` and turn
/// into a non-zero exit code.
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;
