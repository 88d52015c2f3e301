//! Minimal C/C++ lexer feeding the token arena.
//!
//! This is deliberately not a conforming preprocessor: comments and
//! preprocessor directives are dropped, literals become single tokens,
//! and the handful of multi-character operators the checks care about
//! are folded. Two representation choices matter downstream:
//!
//! - `public:` / `protected:` / `private:` / `__published:` are single
//!   tokens (the label colon is folded in, `::` is not), because the
//!   class analyses treat access labels as statement boundaries.
//! - `->` is emitted as `.`: member access through a pointer and member
//!   access on an object are the same statement shape to every check.
//! - `{}`, `()` and `[]` carry partner links; input where they do not
//!   balance is rejected here rather than left undefined for `link()`.

use crate::error::{ClasscheckError, Result};

use super::{TokenData, TokenStream};

const MERGED_LABELS: [&str; 4] = ["public", "protected", "private", "__published"];

const THREE_CHAR_OPS: [&str; 4] = ["<<=", ">>=", "->*", "..."];

const TWO_CHAR_OPS: [&str; 20] = [
    "::", "<<", ">>", "->", "==", "!=", "<=", ">=", "&&", "||", "++", "--", "+=",
    "-=", "*=", "/=", "%=", "&=", "|=", "^=",
];

/// Tokenize one source file (file index 0).
pub fn tokenize(source: &str) -> Result<TokenStream> {
    tokenize_files(&[source])
}

/// Tokenize a translation unit spread over several files; the position
/// in `sources` becomes each token's `file_index`.
pub fn tokenize_files(sources: &[&str]) -> Result<TokenStream> {
    let mut toks = Vec::new();
    for (file_index, source) in sources.iter().enumerate() {
        let start = toks.len();
        lex_file(source, file_index as u32, &mut toks)?;
        link_brackets(&mut toks, start)?;
    }
    Ok(TokenStream { toks })
}

fn lex_file(source: &str, file_index: u32, toks: &mut Vec<TokenData>) -> Result<()> {
    let bytes = source.as_bytes();
    let mut i = 0usize;
    let mut line = 1u32;

    let mut push = |text: String, line: u32| {
        toks.push(TokenData { text, link: None, file_index, line });
    };

    while i < bytes.len() {
        let c = bytes[i];

        if c == b'\n' {
            line += 1;
            i += 1;
            continue;
        }
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        // line comment
        if c == b'/' && bytes.get(i + 1) == Some(&b'/') {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }

        // block comment
        if c == b'/' && bytes.get(i + 1) == Some(&b'*') {
            i += 2;
            while i < bytes.len() {
                if bytes[i] == b'\n' {
                    line += 1;
                } else if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
                    i += 2;
                    break;
                }
                i += 1;
            }
            continue;
        }

        // preprocessor directive, honoring line continuations
        if c == b'#' {
            while i < bytes.len() && bytes[i] != b'\n' {
                if bytes[i] == b'\\' && bytes.get(i + 1) == Some(&b'\n') {
                    line += 1;
                    i += 2;
                    continue;
                }
                i += 1;
            }
            continue;
        }

        // string / character literal
        if c == b'"' || c == b'\'' {
            let quote = c;
            let start_line = line;
            let start = i;
            i += 1;
            loop {
                let Some(&b) = bytes.get(i) else {
                    return Err(ClasscheckError::UnterminatedLiteral { line: start_line });
                };
                if b == b'\\' {
                    i += 2;
                    continue;
                }
                if b == b'\n' {
                    return Err(ClasscheckError::UnterminatedLiteral { line: start_line });
                }
                i += 1;
                if b == quote {
                    break;
                }
            }
            push(source[start..i].to_string(), start_line);
            continue;
        }

        // identifier or keyword
        if c.is_ascii_alphabetic() || c == b'_' {
            let start = i;
            while i < bytes.len()
                && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_')
            {
                i += 1;
            }
            let word = &source[start..i];
            // access label: fold the colon in, but never split "::"
            if MERGED_LABELS.contains(&word)
                && bytes.get(i) == Some(&b':')
                && bytes.get(i + 1) != Some(&b':')
            {
                i += 1;
                push(format!("{word}:"), line);
            } else {
                push(word.to_string(), line);
            }
            continue;
        }

        // number
        if c.is_ascii_digit() {
            let start = i;
            while i < bytes.len()
                && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'.' || bytes[i] == b'_')
            {
                i += 1;
            }
            push(source[start..i].to_string(), line);
            continue;
        }

        // operators, longest first
        let rest = &source[i..];
        if let Some(op) = THREE_CHAR_OPS.iter().find(|op| rest.starts_with(**op)) {
            push(op.to_string(), line);
            i += 3;
            continue;
        }
        if let Some(op) = TWO_CHAR_OPS.iter().find(|op| rest.starts_with(**op)) {
            // member dereference reads the same as member access to the
            // class analyses, so fold it
            let text = if *op == "->" { "." } else { *op };
            push(text.to_string(), line);
            i += 2;
            continue;
        }

        push((c as char).to_string(), line);
        i += 1;
    }

    Ok(())
}

/// Record bracket partners for tokens `toks[start..]`.
fn link_brackets(toks: &mut [TokenData], start: usize) -> Result<()> {
    let mut stack: Vec<usize> = Vec::new();
    for idx in start..toks.len() {
        match toks[idx].text.as_str() {
            "(" | "{" | "[" => stack.push(idx),
            close @ (")" | "}" | "]") => {
                let expected = match close {
                    ")" => "(",
                    "}" => "{",
                    _ => "[",
                };
                let open = match stack.pop() {
                    Some(open) if toks[open].text == expected => open,
                    _ => {
                        return Err(ClasscheckError::UnmatchedBracket {
                            bracket: close.chars().next().unwrap(),
                            line: toks[idx].line,
                        })
                    }
                };
                toks[open].link = Some(idx as u32);
                toks[idx].link = Some(open as u32);
            }
            _ => {}
        }
    }
    if let Some(open) = stack.pop() {
        return Err(ClasscheckError::UnmatchedBracket {
            bracket: toks[open].text.chars().next().unwrap(),
            line: toks[open].line,
        });
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(stream: &TokenStream) -> Vec<String> {
        stream.toks.iter().map(|t| t.text.clone()).collect()
    }

    #[test]
    fn test_access_labels_are_merged() {
        let stream = tokenize("class A { public: int x ; } ;").unwrap();
        assert_eq!(
            texts(&stream),
            ["class", "A", "{", "public:", "int", "x", ";", "}", ";"]
        );
    }

    #[test]
    fn test_scope_resolution_is_not_merged() {
        let stream = tokenize("private :: x").unwrap();
        assert_eq!(texts(&stream), ["private", "::", "x"]);
    }

    #[test]
    fn test_base_list_keywords_stay_bare() {
        let stream = tokenize("class D : public B { } ;").unwrap();
        assert_eq!(texts(&stream), ["class", "D", ":", "public", "B", "{", "}", ";"]);
    }

    #[test]
    fn test_comments_and_preprocessor_are_dropped() {
        let stream = tokenize("#include <x>\nint a ; // c\n/* b\nc */ int b ;").unwrap();
        assert_eq!(texts(&stream), ["int", "a", ";", "int", "b", ";"]);
    }

    #[test]
    fn test_multichar_operators() {
        let stream = tokenize("a += b ; x <<= 2 ; s :: t").unwrap();
        assert_eq!(
            texts(&stream),
            ["a", "+=", "b", ";", "x", "<<=", "2", ";", "s", "::", "t"]
        );
    }

    #[test]
    fn test_arrow_reads_as_member_access() {
        let stream = tokenize("p -> q = 0 ;").unwrap();
        assert_eq!(texts(&stream), ["p", ".", "q", "=", "0", ";"]);
    }

    #[test]
    fn test_line_numbers() {
        let stream = tokenize("a\nb\n\nc").unwrap();
        let lines: Vec<u32> = stream.toks.iter().map(|t| t.line).collect();
        assert_eq!(lines, [1, 2, 4]);
    }

    #[test]
    fn test_file_indices() {
        let stream = tokenize_files(&["int a ;", "int b ;"]).unwrap();
        let first = stream.first().unwrap();
        assert_eq!(first.file_index(), 0);
        assert_eq!(first.at(3).unwrap().file_index(), 1);
    }

    #[test]
    fn test_unbalanced_brackets_rejected() {
        assert!(matches!(
            tokenize("void f ( { )"),
            Err(ClasscheckError::UnmatchedBracket { .. })
        ));
        assert!(matches!(
            tokenize("void f ( int x"),
            Err(ClasscheckError::UnmatchedBracket { bracket: '(', .. })
        ));
    }

    #[test]
    fn test_unterminated_string_rejected() {
        assert!(matches!(
            tokenize("char * s = \"abc"),
            Err(ClasscheckError::UnterminatedLiteral { .. })
        ));
    }

    #[test]
    fn test_string_escapes() {
        let stream = tokenize(r#"s = "a\"b" ;"#).unwrap();
        assert_eq!(texts(&stream), ["s", "=", r#""a\"b""#, ";"]);
    }
}
