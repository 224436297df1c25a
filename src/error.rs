//! Error types for STAR/CIF reading and writing.
//!
//! Every failure is fatal for the call that produced it: a parse error never
//! yields a partial [`Document`](crate::Document), and a write error never
//! leaves a half-written file behind.
//!
//! ## Error Categories
//!
//! - **Malformed tokens**: a quoted string or `;` text field that never closes
//! - **Unexpected tokens**: structural violations such as a tag with no value,
//!   a loop whose values do not fill its last row, or a duplicated tag
//! - **Empty input**: text containing no data blocks
//! - **Unwritable documents**: values or names the text form cannot express
//! - **I/O errors**: file reading/writing failures
//!
//! Parse errors carry the 1-based line and column of the offending token and
//! the source line it sits on.
//!
//! ## Examples
//!
//! ```rust
//! use starcif::{from_str, Error};
//!
//! let result = from_str("data_x\n_tag 'never closed\n");
//! assert!(matches!(result, Err(Error::MalformedToken { line: 2, .. })));
//! ```

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Represents all possible errors that can occur while reading or writing STAR/CIF text.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// A quoted string or text field is not terminated
    #[error("Malformed token at line {line}, column {col}: {msg}\n{context}")]
    MalformedToken {
        line: usize,
        col: usize,
        msg: String,
        context: String,
    },

    /// A well-formed token appears where the block structure does not allow it
    #[error("Unexpected token at line {line}, column {col}: {msg}\n{context}")]
    UnexpectedToken {
        line: usize,
        col: usize,
        msg: String,
        context: String,
    },

    /// The input holds no data blocks
    #[error("Empty input: no data blocks found")]
    EmptyInput,

    /// The document cannot be expressed as STAR/CIF text
    #[error("Cannot write document: {0}")]
    Unwritable(String),

    /// The target file exists and overwriting was not allowed
    #[error("File already exists: {}", .0.display())]
    FileExists(PathBuf),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a malformed-token error for an unterminated quote or text field.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use starcif::Error;
    ///
    /// let err = Error::malformed(3, 7, "unterminated quoted string", "_tag 'abc");
    /// assert!(err.to_string().contains("line 3"));
    /// ```
    pub fn malformed(line: usize, col: usize, msg: &str, context: &str) -> Self {
        Error::MalformedToken {
            line,
            col,
            msg: msg.to_string(),
            context: context.to_string(),
        }
    }

    /// Creates an unexpected-token error for a structural violation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use starcif::Error;
    ///
    /// let err = Error::unexpected(5, 1, "tag `_a` has no value", "_a");
    /// assert!(err.to_string().contains("has no value"));
    /// ```
    pub fn unexpected(line: usize, col: usize, msg: &str, context: &str) -> Self {
        Error::UnexpectedToken {
            line,
            col,
            msg: msg.to_string(),
            context: context.to_string(),
        }
    }

    /// Creates a writer error for content that has no valid text form.
    pub fn unwritable<T: fmt::Display>(msg: T) -> Self {
        Error::Unwritable(msg.to_string())
    }

    /// Creates a custom error with a display message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use starcif::Error;
    ///
    /// let err = Error::custom("something went wrong");
    /// assert!(err.to_string().contains("something went wrong"));
    /// ```
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for file reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns the `(line, column)` of a parse error, if it has one.
    #[must_use]
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            Error::MalformedToken { line, col, .. } | Error::UnexpectedToken { line, col, .. } => {
                Some((*line, *col))
            }
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
