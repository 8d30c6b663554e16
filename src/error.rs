//! Application error type.
//!
//! Every fallible operation returns `AppError`. The `kind` drives the process
//! exit code and lets callers decide whether to abort (selection) or to skip
//! and continue (per-row test mapping).

/// Failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An input path does not exist.
    FileNotFound,
    /// A required column is absent, duplicated, or holds unparsable values.
    Schema,
    /// Zero rows (or zero series) where at least one is required.
    EmptyInput,
    /// Degenerate numeric input, e.g. zero-variance x for a line fit.
    Numeric,
    /// Read/write failures other than a missing input file.
    Io,
    /// Invalid flag or option values.
    Config,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::FileNotFound | ErrorKind::Schema | ErrorKind::Config => 2,
            ErrorKind::EmptyInput => 3,
            ErrorKind::Numeric => 4,
            ErrorKind::Io => 5,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn file_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FileNotFound, message)
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Schema, message)
    }

    pub fn empty_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::EmptyInput, message)
    }

    pub fn numeric(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Numeric, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }

    /// Prefix the message with where the failure happened, keeping the kind.
    pub fn context(self, context: impl std::fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{context}: {}", self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_keeps_kind_and_prefixes_message() {
        let err = AppError::numeric("x has zero variance").context("candidate `y7`");
        assert_eq!(err.kind(), ErrorKind::Numeric);
        assert_eq!(err.to_string(), "candidate `y7`: x has zero variance");
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn exit_codes_follow_kind() {
        assert_eq!(AppError::schema("s").exit_code(), 2);
        assert_eq!(AppError::file_not_found("f").exit_code(), 2);
        assert_eq!(AppError::empty_input("e").exit_code(), 3);
        assert_eq!(AppError::io("i").exit_code(), 5);
    }
}
