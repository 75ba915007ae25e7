//! Argument vector construction for the optimizer executable.
//!
//! Numbers are rendered with their `Display` form. For `f64` that is the
//! shortest decimal string that parses back to the same value, with no
//! exponent and no locale, so `75.0` becomes `75` and `2.5` stays `2.5`.

use crate::request::ConfigRequest;
use std::fmt;
use std::path::{Path, PathBuf};

/// Program path plus the flags handed to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl InvocationCommand {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Full argv, program first.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

impl fmt::Display for InvocationCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argv().join(" "))
    }
}

/// Build the optimizer invocation for a validated request.
pub fn build_command(program: &Path, request: &ConfigRequest) -> InvocationCommand {
    let available = request
        .available
        .iter()
        .map(f64::to_string)
        .collect::<Vec<_>>()
        .join(",");

    let args = vec![
        "--target".to_string(),
        request.target.to_string(),
        "--branches".to_string(),
        request.branches.to_string(),
        "--fixed".to_string(),
        request.fixed.to_string(),
        "--max-parallel".to_string(),
        request.max_parallel.to_string(),
        "--available".to_string(),
        available,
    ];

    InvocationCommand::new(program, args)
}
