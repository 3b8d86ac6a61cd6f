//! Error handling for the glstatus sampler.
//!
//! Every failure inside the metric readers is a [`SystemError`]. The public
//! string-returning functions collapse all of them into [`crate::UNKNOWN_STR`],
//! but the typed APIs keep the variant so callers can tell *why* a metric is
//! missing.

use std::path::PathBuf;

/// A specialized `Result` type for glstatus operations.
pub type Result<T> = std::result::Result<T, SystemError>;

/// The main error type for glstatus operations.
#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    /// None of the supported GPU interfaces is present
    #[error("no supported GPU detected")]
    VendorNotFound,

    /// A counter file is missing or unreadable
    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Content could not be parsed as the expected value
    #[error("failed to parse {input:?}: {reason}")]
    Parse { input: String, reason: String },

    /// A wildcard path matched nothing
    #[error("no path matches {pattern}")]
    GlobNoMatch { pattern: String },

    /// The external tool is not installed or could not be spawned
    #[error("{tool} is not available")]
    ToolUnavailable { tool: String },

    /// The external tool ran but exited unsuccessfully
    #[error("{tool} exited with {status}: {output}")]
    ToolFailed {
        tool: String,
        status: String,
        output: String,
    },

    /// A computed value fell outside its valid domain
    #[error("{metric} value {value} is out of range")]
    OutOfRange { metric: &'static str, value: f64 },

    /// A ratio was requested against a zero total
    #[error("{metric} total is zero")]
    ZeroTotal { metric: &'static str },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Field-less discriminant of [`SystemError`], convenient for assertions
/// and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    VendorNotFound,
    Io,
    Parse,
    GlobNoMatch,
    ToolUnavailable,
    ToolFailed,
    OutOfRange,
    ZeroTotal,
    Config,
}

impl SystemError {
    /// Create an I/O error bound to the path that failed
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a new parse error
    pub fn parse_error(input: impl Into<String>, reason: impl ToString) -> Self {
        Self::Parse {
            input: input.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a new out-of-range error
    pub fn out_of_range(metric: &'static str, value: f64) -> Self {
        Self::OutOfRange { metric, value }
    }

    /// Create a new configuration error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::VendorNotFound => ErrorKind::VendorNotFound,
            Self::Io { .. } => ErrorKind::Io,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::GlobNoMatch { .. } => ErrorKind::GlobNoMatch,
            Self::ToolUnavailable { .. } => ErrorKind::ToolUnavailable,
            Self::ToolFailed { .. } => ErrorKind::ToolFailed,
            Self::OutOfRange { .. } => ErrorKind::OutOfRange,
            Self::ZeroTotal { .. } => ErrorKind::ZeroTotal,
            Self::Config(_) => ErrorKind::Config,
        }
    }
}
