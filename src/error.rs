use std::fmt;
use std::path::PathBuf;

#[cfg(test)]
use serde::{Deserialize, Serialize};
use snafu::Snafu;

pub type CompileResult<T> = Result<T, CompileError>;

/// Errors that stop a compilation. The first one wins; nothing is aggregated.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CompileError {
    #[snafu(display("file '{}' does not exist", path.display()))]
    MissingFile { path: PathBuf },

    #[snafu(display("could not read '{}': {source}", path.display()))]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("no tokens available to parse arguments"))]
    NoTokens,

    #[snafu(display("line {line}: {function} expected opening parenthesis '('"))]
    MissingOpenParen { function: String, line: usize },

    #[snafu(display("line {line}: {function} missing closing parenthesis ')'"))]
    MissingCloseParen { function: String, line: usize },

    #[snafu(display("line {line}: variable '{name}' is already declared"))]
    AlreadyDeclared { name: String, line: usize },

    #[snafu(display(
        "line {line}: memory limit exceeded, no more variables can be declared (tried '{name}')"
    ))]
    MemoryLimit { name: String, line: usize },

    #[snafu(display(
        "line {line}: only numeric values are supported for variables ('{name}' = {value})"
    ))]
    NonNumeric {
        name: String,
        value: String,
        line: usize,
    },

    #[snafu(display("line {line}: invalid argument for print statement: {argument}"))]
    InvalidPrintArgument { argument: String, line: usize },
}

impl CompileError {
    /// Source line the error points at, when it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            CompileError::MissingFile { .. }
            | CompileError::ReadFile { .. }
            | CompileError::NoTokens => None,
            CompileError::MissingOpenParen { line, .. }
            | CompileError::MissingCloseParen { line, .. }
            | CompileError::AlreadyDeclared { line, .. }
            | CompileError::MemoryLimit { line, .. }
            | CompileError::NonNumeric { line, .. }
            | CompileError::InvalidPrintArgument { line, .. } => Some(*line),
        }
    }
}

/// Problems that are reported but do not stop the compilation.
#[cfg_attr(test, derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    UnrecognizedToken { lexeme: String, line: usize },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnrecognizedToken { lexeme, line } => {
                write!(f, "line {}: unrecognized token '{}'", line, lexeme)
            }
        }
    }
}
