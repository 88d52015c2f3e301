//! Token stream and navigation.
//!
//! The analysis works on a flat, already-tokenized translation unit.
//! Tokens live in an owned arena ([`TokenStream`]); navigation happens
//! through [`Cursor`], a cheap `Copy` handle that exposes the small
//! surface the checks rely on: the token text, neighbors, relative
//! strides, bracket partners, and a few classification queries.
//!
//! Bracket partners are recorded for `{}`, `()` and `[]` when the
//! stream is built; template angle brackets are not linked, and the
//! consumers count `<`/`>` depth explicitly where they need to.

pub mod lexer;
pub mod pattern;

pub use lexer::{tokenize, tokenize_files};

use serde::{Deserialize, Serialize};

/// Index of a token within its stream.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TokenId(pub u32);

/// One token record in the arena.
#[derive(Debug, Clone)]
pub(crate) struct TokenData {
    pub(crate) text: String,
    pub(crate) link: Option<u32>,
    pub(crate) file_index: u32,
    pub(crate) line: u32,
}

/// Owned sequence of tokens for one or more source files.
#[derive(Debug, Clone, Default)]
pub struct TokenStream {
    pub(crate) toks: Vec<TokenData>,
}

impl TokenStream {
    /// Cursor to the first token, if any.
    pub fn first(&self) -> Option<Cursor<'_>> {
        if self.toks.is_empty() {
            None
        } else {
            Some(Cursor { stream: self, idx: 0 })
        }
    }

    /// Cursor to a previously recorded token id.
    ///
    /// Ids are only valid for the stream that produced them.
    pub fn cursor(&self, id: TokenId) -> Cursor<'_> {
        debug_assert!((id.0 as usize) < self.toks.len());
        Cursor { stream: self, idx: id.0 }
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.toks.len()
    }

    /// True when the stream holds no tokens.
    pub fn is_empty(&self) -> bool {
        self.toks.is_empty()
    }

    /// Locate the implementation of `classname::funcname`.
    ///
    /// Inline definitions inside the class body are preferred; failing
    /// that, the stream is searched for a `classname :: funcname (`
    /// definition. Either way the candidate must have a `) const| {`
    /// body shape. Returns the function name token.
    pub fn find_class_function<'a>(
        &'a self,
        class_decl: Cursor<'a>,
        classname: &str,
        funcname: &str,
    ) -> Option<Cursor<'a>> {
        use self::pattern::Pat;

        // inline member function
        let mut tok = Some(class_decl);
        while let Some(c) = tok {
            if c.text() == "{" {
                break;
            }
            tok = c.next();
        }
        if let Some(body) = tok {
            let end = body.link();
            let mut depth = 0i32;
            let mut cur = Some(body);
            while let Some(c) = cur {
                if let Some(e) = end {
                    if c.idx == e.idx {
                        break;
                    }
                }
                if c.text() == "{" {
                    depth += 1;
                } else if c.text() == "}" {
                    depth -= 1;
                } else if depth == 1
                    && c.text() == funcname
                    && c.next().is_some_and(|n| n.text() == "(")
                {
                    if let Some(close) = c.next().and_then(|n| n.link()) {
                        if pattern::matches(
                            Some(close),
                            &[Pat::Lit(")"), Pat::Opt("const"), Pat::Lit("{")],
                        ) {
                            return Some(c);
                        }
                    }
                }
                cur = c.next();
            }
        }

        // out-of-line definition
        let pats = [
            Pat::text(classname),
            Pat::Lit("::"),
            Pat::text(funcname),
            Pat::Lit("("),
        ];
        let mut start = self.first();
        while let Some(hit) = pattern::find(start, &pats, None) {
            let name = hit.at(2)?;
            if let Some(close) = name.next().and_then(|n| n.link()) {
                if pattern::matches(
                    Some(close),
                    &[Pat::Lit(")"), Pat::Opt("const"), Pat::Lit("{")],
                ) {
                    return Some(name);
                }
            }
            start = hit.next();
        }
        None
    }
}

/// Lightweight handle to one token. Copyable; borrows the stream.
#[derive(Clone, Copy)]
pub struct Cursor<'a> {
    stream: &'a TokenStream,
    idx: u32,
}

impl PartialEq for Cursor<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.idx == other.idx
    }
}

impl Eq for Cursor<'_> {}

impl std::fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cursor({}, {:?})", self.idx, self.text())
    }
}

impl<'a> Cursor<'a> {
    fn data(self) -> &'a TokenData {
        &self.stream.toks[self.idx as usize]
    }

    /// Stable id of this token.
    pub fn id(self) -> TokenId {
        TokenId(self.idx)
    }

    /// Token text.
    pub fn text(self) -> &'a str {
        &self.data().text
    }

    /// Following token.
    pub fn next(self) -> Option<Cursor<'a>> {
        self.at(1)
    }

    /// Preceding token.
    pub fn prev(self) -> Option<Cursor<'a>> {
        self.at(-1)
    }

    /// Token `offset` positions away (negative looks backwards).
    pub fn at(self, offset: i32) -> Option<Cursor<'a>> {
        let idx = (self.idx as i64) + (offset as i64);
        if idx < 0 || idx as usize >= self.stream.toks.len() {
            None
        } else {
            Some(Cursor { stream: self.stream, idx: idx as u32 })
        }
    }

    /// Text of the token `offset` positions away, or `""` when there is
    /// no such token.
    pub fn text_at(self, offset: i32) -> &'a str {
        self.at(offset).map_or("", |c| c.text())
    }

    /// Bracket partner of a `{}`/`()`/`[]` token.
    pub fn link(self) -> Option<Cursor<'a>> {
        self.data()
            .link
            .map(|idx| Cursor { stream: self.stream, idx })
    }

    /// True for identifier-shaped tokens (including keywords).
    pub fn is_name(self) -> bool {
        let text = self.text();
        let mut chars = text.chars();
        match chars.next() {
            Some(c) if c.is_alphabetic() || c == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_alphanumeric() || c == '_')
    }

    /// True for numeric literals.
    pub fn is_number(self) -> bool {
        self.text().chars().next().is_some_and(|c| c.is_ascii_digit())
    }

    /// True for the built-in scalar type keywords.
    pub fn is_standard_type(self) -> bool {
        matches!(
            self.text(),
            "bool" | "char" | "short" | "int" | "long" | "float" | "double" | "size_t"
        )
    }

    /// Index of the source file this token came from.
    pub fn file_index(self) -> u32 {
        self.data().file_index
    }

    /// 1-based source line.
    pub fn line(self) -> u32 {
        self.data().line
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation() {
        let stream = tokenize("int x ;").unwrap();
        let first = stream.first().unwrap();
        assert_eq!(first.text(), "int");
        assert_eq!(first.text_at(1), "x");
        assert_eq!(first.text_at(2), ";");
        assert_eq!(first.text_at(3), "");
        assert_eq!(first.at(2).unwrap().prev().unwrap().text(), "x");
        assert!(first.prev().is_none());
    }

    #[test]
    fn test_classification() {
        let stream = tokenize("foo 12 int Widget").unwrap();
        let t = stream.first().unwrap();
        assert!(t.is_name());
        assert!(!t.is_number());
        assert!(t.at(1).unwrap().is_number());
        assert!(t.at(2).unwrap().is_standard_type());
        assert!(!t.at(3).unwrap().is_standard_type());
    }

    #[test]
    fn test_links() {
        let stream = tokenize("f ( a [ 0 ] ) { }").unwrap();
        let open = stream.first().unwrap().next().unwrap();
        assert_eq!(open.text(), "(");
        assert_eq!(open.link().unwrap().text(), ")");
        assert_eq!(open.link().unwrap().link().unwrap(), open);
        let brace = open.link().unwrap().next().unwrap();
        assert_eq!(brace.text(), "{");
        assert_eq!(brace.link().unwrap().text(), "}");
    }

    #[test]
    fn test_find_class_function_inline() {
        let stream = tokenize("class A { void f ( ) { } } ;").unwrap();
        let decl = stream.first().unwrap();
        let f = stream.find_class_function(decl, "A", "f").unwrap();
        assert_eq!(f.text(), "f");
        assert_eq!(f.text_at(-1), "void");
        assert_eq!(f.text_at(1), "(");
    }

    #[test]
    fn test_find_class_function_out_of_line() {
        let stream =
            tokenize("class A { void f ( ) ; } ; void A :: f ( ) { }").unwrap();
        let decl = stream.first().unwrap();
        let f = stream.find_class_function(decl, "A", "f").unwrap();
        assert_eq!(f.text(), "f");
        assert_eq!(f.text_at(-1), "::");
    }

    #[test]
    fn test_find_class_function_declaration_only() {
        let stream = tokenize("class A { void f ( ) ; } ;").unwrap();
        let decl = stream.first().unwrap();
        assert!(stream.find_class_function(decl, "A", "f").is_none());
    }
}
