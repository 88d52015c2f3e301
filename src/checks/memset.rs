//! Byte-level memory functions applied to objects.
//!
//! `memset`/`memcpy`/`memmove` over `sizeof(T)` is fine for plain data,
//! but wipes the internals of any `std::` member — strings, containers
//! — leaving the object corrupt or leaking. Each such call site is
//! traced to the declaration of `T`, whose direct members are
//! inspected.

use crate::diagnostics::{Diagnostic, ErrorLogger, Severity};
use crate::token::pattern::{self, Pat};
use crate::token::Cursor;

use super::ClassAnalysis;

pub(crate) fn no_memset(analysis: &ClassAnalysis<'_>, logger: &mut dyn ErrorLogger) {
    use Pat::{AnyOf, Ident, Lit, Num, TypeName};

    let tokens = analysis.tokens();

    let mut tok = tokens.first();
    while let Some(t) = tok {
        tok = t.next();

        if !pattern::matches(Some(t), &[AnyOf(&["memset", "memcpy", "memmove"])]) {
            continue;
        }

        // the target type is taken from the sizeof argument
        let type_name = if pattern::matches(
            Some(t),
            &[
                Lit("memset"), Lit("("), Ident, Lit(","), Num, Lit(","),
                Lit("sizeof"), Lit("("), TypeName, Lit(")"), Lit(")"),
            ],
        ) {
            t.text_at(8)
        } else if pattern::matches(
            Some(t),
            &[
                Lit("memset"), Lit("("), Lit("&"), Ident, Lit(","), Num, Lit(","),
                Lit("sizeof"), Lit("("), TypeName, Lit(")"), Lit(")"),
            ],
        ) {
            t.text_at(9)
        } else if pattern::matches(
            Some(t),
            &[
                Lit("memset"), Lit("("), Ident, Lit(","), Num, Lit(","),
                Lit("sizeof"), Lit("("), Lit("struct"), TypeName, Lit(")"), Lit(")"),
            ],
        ) {
            t.text_at(9)
        } else if pattern::matches(
            Some(t),
            &[
                Lit("memset"), Lit("("), Lit("&"), Ident, Lit(","), Num, Lit(","),
                Lit("sizeof"), Lit("("), Lit("struct"), TypeName, Lit(")"), Lit(")"),
            ],
        ) {
            t.text_at(10)
        } else if pattern::matches(
            Some(t),
            &[
                TypeName, Lit("("), Ident, Lit(","), Ident, Lit(","),
                Lit("sizeof"), Lit("("), TypeName, Lit(")"), Lit(")"),
            ],
        ) {
            t.text_at(8)
        } else {
            ""
        };

        if type_name.is_empty() {
            continue;
        }

        // find the type and look through its direct members
        let decl_pats = [AnyOf(&["struct", "class"]), Pat::text(type_name), Lit("{")];
        let mut cur = pattern::find(tokens.first(), &decl_pats, None);
        while let Some(start) = cur {
            if start.text() == "}" {
                break;
            }

            // member function: skip to the end of its body, which also
            // serves as the next statement boundary
            let mut c = start;
            if pattern::matches(Some(c), &[Lit(")"), Lit("{")]) {
                match c.next().and_then(|n| n.link()) {
                    Some(l) => c = l,
                    None => break,
                }
            }

            let mut next = c.next();

            if pattern::matches(Some(c), &[AnyOf(&[";", "{", "}"])])
                || c.text().contains(':')
            {
                if pattern::matches(
                    c.next(),
                    &[Lit("std"), Lit("::"), TypeName, Ident, Lit(";")],
                ) {
                    logger.report(memset_struct_error(Some(t), t.text(), c.text_at(3)));
                } else if pattern::matches(
                    c.next(),
                    &[Lit("std"), Lit("::"), TypeName, Lit("<")],
                ) {
                    let typestr = c.text_at(3).to_string();

                    // walk to the closing '>' to see whether the member
                    // is a pointer
                    let mut level = 0u32;
                    let mut walk = Some(c);
                    loop {
                        walk = walk.and_then(|w| w.next());
                        let Some(w) = walk else { break };
                        if w.text() == "<" {
                            level += 1;
                        } else if w.text() == ">" {
                            if level <= 1 {
                                break;
                            }
                            level -= 1;
                        } else if w.text() == "(" {
                            walk = w.link();
                            if walk.is_none() {
                                break;
                            }
                        }
                    }

                    let Some(w) = walk else { break };
                    if pattern::matches(Some(w), &[Lit(">"), Ident, Lit(";")]) {
                        logger.report(memset_struct_error(Some(t), t.text(), &typestr));
                    }
                    next = w.next();
                }
            }

            cur = next;
        }
    }
}

pub(crate) fn memset_class_error(tok: Option<Cursor<'_>>, memfunc: &str) -> Diagnostic {
    Diagnostic::at(
        tok,
        Severity::Error,
        "memsetClass",
        format!("Using '{memfunc}' on class"),
    )
}

pub(crate) fn memset_struct_error(
    tok: Option<Cursor<'_>>,
    memfunc: &str,
    classname: &str,
) -> Diagnostic {
    Diagnostic::at(
        tok,
        Severity::Error,
        "memsetStruct",
        format!("Using '{memfunc}' on struct that contains a 'std::{classname}'"),
    )
}
