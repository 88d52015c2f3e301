//! Diagnostic reports and the sink they are delivered to.
//!
//! Every check reports through the [`ErrorLogger`] trait, so the host
//! decides what happens to a finding (print it, collect it, serialize
//! it). [`Diagnostic`] carries everything needed to render a report
//! without access to the token stream: the stable check id, a severity,
//! a fixed-template message, and the resolved file/line of the primary
//! token. The raw token ids are kept as well so a host that still holds
//! the stream can point back into the source.

use serde::{Deserialize, Serialize};

use crate::token::{Cursor, TokenId};

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Real bugs: memory-function misuse on objects, missing virtual
    /// destructors.
    Error,
    /// Stylistic findings and likely-but-unproven mistakes.
    Style,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Style => write!(f, "style"),
        }
    }
}

/// A single finding produced by a check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: Severity,
    /// Stable check identifier (e.g. `uninitVar`).
    pub id: String,
    /// Human-readable message.
    pub message: String,
    /// Tokens this diagnostic points at, primary first. Empty for
    /// template exemplars produced without a token stream.
    pub tokens: Vec<TokenId>,
    /// File of the primary token (0 when there is none).
    pub file_index: u32,
    /// Line of the primary token (0 when there is none).
    pub line: u32,
}

impl Diagnostic {
    /// Build a diagnostic anchored at one token. `tok` may be absent
    /// when producing message exemplars.
    pub fn at(
        tok: Option<Cursor<'_>>,
        severity: Severity,
        id: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            id: id.to_string(),
            message: message.into(),
            tokens: tok.iter().map(|c| c.id()).collect(),
            file_index: tok.map_or(0, |c| c.file_index()),
            line: tok.map_or(0, |c| c.line()),
        }
    }

    /// Build a diagnostic anchored at several tokens, primary first.
    pub fn at_tokens(
        toks: &[Cursor<'_>],
        severity: Severity,
        id: &str,
        message: impl Into<String>,
    ) -> Self {
        let mut diagnostic = Self::at(toks.first().copied(), severity, id, message);
        diagnostic.tokens = toks.iter().map(|c| c.id()).collect();
        diagnostic
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}:{}] ({}) {}: {}",
            self.file_index, self.line, self.severity, self.id, self.message
        )
    }
}

/// Sink for diagnostics. Implemented by the host.
pub trait ErrorLogger {
    /// Record one finding.
    fn report(&mut self, diagnostic: Diagnostic);
}

/// An [`ErrorLogger`] that collects findings in memory.
#[derive(Debug, Default)]
pub struct CollectingLogger {
    /// All findings, in report order.
    pub diagnostics: Vec<Diagnostic>,
}

impl ErrorLogger for CollectingLogger {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Error.to_string(), "error");
        assert_eq!(Severity::Style.to_string(), "style");
    }

    #[test]
    fn test_diagnostic_without_token() {
        let d = Diagnostic::at(None, Severity::Style, "noConstructor", "msg");
        assert!(d.tokens.is_empty());
        assert_eq!(d.line, 0);
        assert_eq!(d.id, "noConstructor");
    }
}
