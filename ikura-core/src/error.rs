//! Error carrier for the ikura core library.
//!
//! Every fallible operation returns [`Error`]: a stable [`ErrorCode`], an
//! optional message, and the source location where the error was raised.
//! The first failing operation constructs the value and it propagates
//! unchanged through `?`; nothing is retried internally except the
//! two-pass arc-count protocol in the digraph algebra, which is
//! transparent to callers.

use std::{borrow::Cow, fmt, panic::Location};

/// Stable codes classifying [`Error`] values.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum ErrorCode {
    /// Safety net for states that should be unreachable.
    UnknownError,
    /// Function parameters failed validation.
    InvalidInput,
    /// An allocation request could not be satisfied.
    NoMemory,
    /// The clustering problem has no solution under the given constraints.
    NoSolution,
    /// The problem exceeds the capacity of the cluster label type.
    TooLargeProblem,
    /// A digraph would exceed the capacity of the arc index type.
    TooLargeDigraph,
    /// The neighbour search oracle reported a failure.
    DistSearchError,
    /// The requested code path is not implemented.
    NotImplemented,
}

impl ErrorCode {
    /// Return the stable machine-readable representation of this code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownError => "IKURA_UNKNOWN_ERROR",
            Self::InvalidInput => "IKURA_INVALID_INPUT",
            Self::NoMemory => "IKURA_NO_MEMORY",
            Self::NoSolution => "IKURA_NO_SOLUTION",
            Self::TooLargeProblem => "IKURA_TOO_LARGE_PROBLEM",
            Self::TooLargeDigraph => "IKURA_TOO_LARGE_DIGRAPH",
            Self::DistSearchError => "IKURA_DIST_SEARCH_ERROR",
            Self::NotImplemented => "IKURA_NOT_IMPLEMENTED",
        }
    }

    /// Fallback message used when an [`Error`] carries no specific one.
    const fn default_message(self) -> &'static str {
        match self {
            Self::UnknownError => "Unknown error.",
            Self::InvalidInput => "Function parameters are invalid.",
            Self::NoMemory => "Cannot allocate required memory.",
            Self::NoSolution => "Clustering problem has no solution.",
            Self::TooLargeProblem => "Clustering problem is too large.",
            Self::TooLargeDigraph => "Digraph is too large.",
            Self::DistSearchError => "Failed to calculate distances.",
            Self::NotImplemented => "Functionality not yet implemented.",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type produced by the core library.
///
/// Renders as `(ikura:<file>:<line>) <message>` so diagnostics point at
/// the operation that failed first. Compare [`Error::code`] rather than
/// the rendered string; the location is informational.
///
/// # Examples
/// ```
/// use ikura_core::{Digraph, ErrorCode};
///
/// let err = Digraph::with_arc_capacity(10, u32::MAX as usize + 1)
///     .expect_err("capacity exceeds the arc index type");
/// assert_eq!(err.code(), ErrorCode::TooLargeDigraph);
/// assert!(err.to_string().starts_with("(ikura:"));
/// ```
#[derive(Clone, Debug)]
pub struct Error {
    code: ErrorCode,
    message: Option<Cow<'static, str>>,
    location: &'static Location<'static>,
}

impl Error {
    /// Raise an error with the code's default message.
    #[track_caller]
    pub(crate) fn new(code: ErrorCode) -> Self {
        Self {
            code,
            message: None,
            location: Location::caller(),
        }
    }

    /// Raise an error with a specific message.
    #[track_caller]
    pub(crate) fn with_message(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            message: Some(message.into()),
            location: Location::caller(),
        }
    }

    /// The stable code classifying this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// The human-readable message, falling back to the code's default.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message
            .as_deref()
            .unwrap_or_else(|| self.code.default_message())
    }

    /// The source location where the error was raised.
    #[must_use]
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(ikura:{}:{}) {}",
            self.location.file(),
            self.location.line(),
            self.message()
        )
    }
}

impl std::error::Error for Error {}

/// Convenient alias for results returned by the core API.
pub type Result<T> = std::result::Result<T, Error>;
