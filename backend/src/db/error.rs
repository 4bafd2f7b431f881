//! Error types for loading the source tables.
//!
//! Loading happens once at startup, so these errors are fatal: a missing file
//! or header column stops the process. Individual malformed rows are not
//! errors; the loader skips and counts them.

use std::fmt;
use std::path::{Path, PathBuf};

/// Result type for table loading.
pub type DataResult<T> = Result<T, DataError>;

/// Structured context for data errors.
///
/// Records which table and file were being read, and where.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Logical table name (e.g., "observations", "business_hours")
    pub table: Option<String>,
    /// Source file, if the table came from disk
    pub path: Option<PathBuf>,
    /// 1-based data row number
    pub row: Option<u64>,
    /// Additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context for a table.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            ..Default::default()
        }
    }

    /// Set the source file.
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the row number.
    pub fn with_row(mut self, row: u64) -> Self {
        self.row = Some(row);
        self
    }

    /// Set additional details.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref table) = self.table {
            parts.push(format!("table={}", table));
        }
        if let Some(ref path) = self.path {
            parts.push(format!("path={}", path.display()));
        }
        if let Some(row) = self.row {
            parts.push(format!("row={}", row));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Error type for table loading.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// The source file could not be opened or read.
    #[error("I/O error: {source} {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: ErrorContext,
    },

    /// The CSV reader failed below the row level (bad encoding, broken header).
    #[error("CSV error: {source} {context}")]
    Csv {
        #[source]
        source: csv::Error,
        context: ErrorContext,
    },

    /// A required header column is absent.
    #[error("Missing column '{column}' {context}")]
    MissingColumn {
        column: String,
        context: ErrorContext,
    },
}

impl DataError {
    pub fn io(source: std::io::Error, context: ErrorContext) -> Self {
        Self::Io { source, context }
    }

    pub fn csv(source: csv::Error, context: ErrorContext) -> Self {
        Self::Csv { source, context }
    }

    pub fn missing_column(column: impl Into<String>, context: ErrorContext) -> Self {
        Self::MissingColumn {
            column: column.into(),
            context,
        }
    }

    /// Get the error context.
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Io { context, .. }
            | Self::Csv { context, .. }
            | Self::MissingColumn { context, .. } => context,
        }
    }
}
