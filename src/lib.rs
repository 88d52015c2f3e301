//! classcheck - class-oriented static analysis for C/C++.
//!
//! Given a tokenized translation unit, this library rebuilds a class
//! symbol model (namespaces, classes, structs, members, methods) and
//! runs a fixed suite of checks for object-oriented hazards:
//!
//! - Missing constructors and members a constructor leaves uninitialized
//! - Unused private member functions
//! - `memset`/`memcpy`/`memmove` applied to objects with `std::` members
//! - `operator=` that returns `void`, does not return `*this`, or lacks
//!   a self-assignment guard around reallocation
//! - Base classes without a virtual destructor
//! - `this - x` typos for `this->x`
//! - Member functions that could be declared `const`
//!
//! # Architecture
//!
//! The library is organized into a few layers:
//!
//! - **Token layer** ([`token`]): the token arena, cursor navigation,
//!   typed token patterns, and a small lexer that produces the arena
//!   from source text.
//! - **Symbol layer** ([`symboldb`]): scope records with member
//!   variables and member functions, recovered from the token stream
//!   by pattern matching, including out-of-line definition resolution.
//! - **Check layer** ([`checks`]): the analyses, registered in a static
//!   table and reporting through a [`diagnostics::ErrorLogger`] sink.
//!
//! Everything is single-threaded and synchronous; the analyses favor
//! missed findings over false alarms and bail out on anything they
//! cannot resolve.
//!
//! # Quick start
//!
//! ```
//! use classcheck::{check_source, Settings};
//!
//! let diagnostics = check_source(
//!     "class A { public: A ( ) { } int x ; } ;",
//!     &Settings::default(),
//! )?;
//! assert_eq!(diagnostics[0].id, "uninitVar");
//! # Ok::<(), classcheck::ClasscheckError>(())
//! ```

pub mod checks;
pub mod diagnostics;
pub mod error;
pub mod settings;
pub mod symboldb;
pub mod token;

pub use checks::{error_message_catalog, run_checks, CheckInfo, ClassAnalysis, CHECKS};
pub use diagnostics::{CollectingLogger, Diagnostic, ErrorLogger, Severity};
pub use error::{ClasscheckError, Result};
pub use settings::Settings;
pub use symboldb::SymbolDatabase;
pub use token::{tokenize, tokenize_files, TokenStream};

/// Tokenize one source file and run the whole check suite over it.
pub fn check_source(source: &str, settings: &Settings) -> Result<Vec<Diagnostic>> {
    let tokens = tokenize(source)?;
    let mut logger = CollectingLogger::default();
    run_checks(&tokens, settings, &mut logger);
    Ok(logger.diagnostics)
}

/// Tokenize a multi-file translation unit and run the whole check
/// suite; the first source is the primary file (index 0).
pub fn check_sources(sources: &[&str], settings: &Settings) -> Result<Vec<Diagnostic>> {
    let tokens = tokenize_files(sources)?;
    let mut logger = CollectingLogger::default();
    run_checks(&tokens, settings, &mut logger);
    Ok(logger.diagnostics)
}
