//! Central error types for classcheck.
//!
//! Uses `thiserror` for ergonomic error definitions with automatic
//! `Display` and `From` implementations.
//!
//! The analysis core itself never fails: unrecognized constructs are
//! skipped and ambiguous resolutions bail out conservatively. Errors can
//! only come out of the tokenizer, which rejects input it cannot turn
//! into a well-linked token stream.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum ClasscheckError {
    /// A bracket has no partner, so `link()` lookups would be undefined.
    #[error("unmatched '{bracket}' at line {line}")]
    UnmatchedBracket { bracket: char, line: u32 },

    /// A string or character literal runs past the end of the file.
    #[error("unterminated literal starting at line {line}")]
    UnterminatedLiteral { line: u32 },
}

/// Convenience type alias for Results using ClasscheckError.
pub type Result<T> = std::result::Result<T, ClasscheckError>;
