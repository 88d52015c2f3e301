//! Typed token patterns.
//!
//! Checks recognize syntax by matching short token sequences. Instead of
//! parsing a pattern string on every call, the pattern language is a
//! small enum: one [`Pat`] per slot, matched in lockstep against the
//! stream. Alternation within a slot is [`Pat::AnyOf`]; a slot that may
//! be absent entirely is [`Pat::Opt`] / [`Pat::OptIdent`].
//!
//! Without variable ids from a full tokenizer, `%var%` and `%type%`
//! collapse to the same test; both variants are kept so call sites read
//! like the grammar they recognize.

use super::{Cursor, TokenId};

/// One slot of a token pattern.
#[derive(Debug, Clone)]
pub enum Pat {
    /// Exact token text.
    Lit(&'static str),
    /// Exact token text built at runtime (class and function names).
    Text(String),
    /// One of several exact texts.
    AnyOf(&'static [&'static str]),
    /// Optional exact text; the slot is skipped when it does not match.
    Opt(&'static str),
    /// Optional identifier.
    OptIdent,
    /// Any identifier (`%var%`).
    Ident,
    /// Any type name (`%type%`).
    TypeName,
    /// Any numeric literal (`%num%`).
    Num,
    /// Any single token (`%any%`).
    Any,
}

impl Pat {
    /// Runtime-text pattern slot.
    pub fn text(s: impl Into<String>) -> Pat {
        Pat::Text(s.into())
    }
}

/// Match `pats` in lockstep starting at `tok`.
///
/// A `None` start (or running off the stream before a required slot)
/// fails the match. Optional slots consume a token only when it fits.
pub fn matches(tok: Option<Cursor<'_>>, pats: &[Pat]) -> bool {
    let mut cur = tok;
    for pat in pats {
        match pat {
            Pat::Opt(lit) => {
                if let Some(c) = cur {
                    if c.text() == *lit {
                        cur = c.next();
                    }
                }
            }
            Pat::OptIdent => {
                if let Some(c) = cur {
                    if c.is_name() {
                        cur = c.next();
                    }
                }
            }
            _ => {
                let Some(c) = cur else { return false };
                let ok = match pat {
                    Pat::Lit(s) => c.text() == *s,
                    Pat::Text(s) => c.text() == s,
                    Pat::AnyOf(alts) => alts.contains(&c.text()),
                    Pat::Ident | Pat::TypeName => c.is_name(),
                    Pat::Num => c.is_number(),
                    Pat::Any => true,
                    Pat::Opt(_) | Pat::OptIdent => unreachable!(),
                };
                if !ok {
                    return false;
                }
                cur = c.next();
            }
        }
    }
    true
}

/// Forward search for the first token where `pats` matches.
///
/// The search includes `start` itself and stops (exclusive) at `end`.
pub fn find<'a>(
    start: Option<Cursor<'a>>,
    pats: &[Pat],
    end: Option<TokenId>,
) -> Option<Cursor<'a>> {
    let mut cur = start;
    while let Some(c) = cur {
        if let Some(e) = end {
            if c.id() == e {
                return None;
            }
        }
        if matches(Some(c), pats) {
            return Some(c);
        }
        cur = c.next();
    }
    None
}

// =============================================================================
// Tests
// =============================================================================
