//! Unused private member functions.
//!
//! Two passes per class: collect the private function declarations,
//! then scan every member function body (inline or out-of-line) in the
//! translation unit and cross off each name that is called. Classes
//! with friends or nested classes are skipped wholesale; only classes
//! declared in the primary source file are considered, since a header
//! may be included by callers we cannot see.

use crate::diagnostics::{Diagnostic, ErrorLogger, Severity};
use crate::token::pattern::{self, Pat};
use crate::token::Cursor;

use super::ClassAnalysis;

pub(crate) fn private_functions(analysis: &ClassAnalysis<'_>, logger: &mut dyn ErrorLogger) {
    use Pat::{AnyOf, Ident, Lit, Opt};

    if !analysis.settings().check_coding_style {
        return;
    }

    let tokens = analysis.tokens();
    let class_pats = [AnyOf(&["class", "struct"]), Ident, AnyOf(&["{", ":"])];

    let mut tok1_opt = pattern::find(tokens.first(), &class_pats, None);
    while let Some(tok1) = tok1_opt {
        tok1_opt = pattern::find(tok1.next(), &class_pats, None);

        // whole-class implementations may live elsewhere; only check
        // classes declared in the primary file
        if tok1.file_index() != 0 {
            continue;
        }

        let classname = tok1.text_at(1).to_string();
        let is_struct = tok1.text() == "struct";

        // collect the private function declarations
        let mut func_list: Vec<Cursor<'_>> = Vec::new();
        let mut in_private = !is_struct;
        let mut indent_level = 0u32;
        let mut tok = Some(tok1);
        while let Some(t) = tok {
            let mut next = t.next();

            if pattern::matches(Some(t), &[Lit("friend"), Ident]) {
                // friends can call anything
                func_list.clear();
                break;
            }

            if t.text() == "{" {
                indent_level += 1;
            } else if t.text() == "}" {
                if indent_level <= 1 {
                    break;
                }
                indent_level -= 1;
            } else if indent_level != 1 {
                tok = next;
                continue;
            } else if t.text() == "private:" {
                in_private = true;
            } else if t.text() == "public:" || t.text() == "protected:" {
                in_private = false;
            } else if in_private {
                if pattern::matches(Some(t), &[Lit("typedef"), Pat::TypeName, Lit("(")]) {
                    // typedef'd function pointer, not a function
                    next = t.at(2).and_then(|c| c.link()).and_then(|c| c.next());
                } else if pattern::matches(Some(t), &[AnyOf(&[":", ","]), Ident, Lit("(")]) {
                    next = t.at(2).and_then(|c| c.link()).and_then(|c| c.next());
                } else if pattern::matches(Some(t), &[Ident, Lit("(")])
                    && !pattern::matches(
                        t.next().and_then(|c| c.link()),
                        &[Lit(")"), Lit("(")],
                    )
                    && t.text() != classname
                {
                    func_list.push(t);
                }
            }

            // a nested class sees the private functions too; bail out
            if t.text() == "class" {
                func_list.clear();
                break;
            }

            tok = next;
        }

        // cross off every private function that is called somewhere
        let class_head = [Lit("class"), Pat::text(&classname), AnyOf(&["{", ":"])];
        let qualified_fn = [Pat::text(&classname), Lit("::"), Opt("~"), Ident, Lit("(")];
        let mut has_func_impl = false;
        let mut inclass = false;
        let mut indent_level = 0u32;
        let mut ftok = tokens.first();
        while let Some(f) = ftok {
            let mut next = f.next();

            if f.text() == "{" {
                indent_level += 1;
            } else if f.text() == "}" {
                if indent_level > 0 {
                    indent_level -= 1;
                }
                if indent_level == 0 {
                    inclass = false;
                }
            }

            if pattern::matches(Some(f), &class_head) {
                indent_level = 0;
                inclass = true;
            }

            // member function, declared inline or with a qualified name
            if (inclass
                && indent_level == 1
                && pattern::matches(Some(f), &[Ident, Lit("(")]))
                || pattern::matches(Some(f), &qualified_fn)
            {
                // go to the end of the argument list
                let mut g = Some(f);
                while let Some(c) = g {
                    if c.text() == ")" {
                        break;
                    }
                    g = c.next();
                }
                let Some(mut g) = g else { break };

                // names called from the initializer list count as used
                if pattern::matches(Some(g), &[Lit(")"), Lit(":"), Ident, Lit("(")]) {
                    while !pattern::matches(g.next(), &[AnyOf(&["{", "}", ";"])]) {
                        if pattern::matches(
                            Some(g),
                            &[AnyOf(&["::", ",", "("]), Ident, AnyOf(&[",", ")"])],
                        ) {
                            let used = g.text_at(1);
                            func_list.retain(|c| c.text() != used);
                        }
                        g = match g.next() {
                            Some(n) => n,
                            None => break,
                        };
                    }
                }

                if pattern::matches(Some(g), &[Lit(")"), Opt("const"), Lit("{")]) {
                    if g.file_index() == 0 {
                        has_func_impl = true;
                    }

                    // parse the body
                    let mut body_indent = 0i32;
                    let mut body = Some(g);
                    while let Some(b) = body {
                        if b.text() == "{" {
                            body_indent += 1;
                        } else if b.text() == "}" {
                            body_indent -= 1;
                            if body_indent < 1 {
                                break;
                            }
                        } else if pattern::matches(Some(b), &[Ident, Lit("(")]) {
                            let called = b.text();
                            func_list.retain(|c| c.text() != called);
                        }
                        body = b.next();
                    }
                }

                next = g.next();
            }

            ftok = next;
        }

        // report what is left, unless it is only ever referenced as a
        // function pointer
        while has_func_impl && !func_list.is_empty() {
            let front = func_list.remove(0);
            let pointer_ref = [
                AnyOf(&["return", "(", ")", ",", "="]),
                Pat::text(front.text()),
            ];
            if pattern::find(tokens.first(), &pointer_ref, None).is_none() {
                logger.report(unused_private_function_error(
                    Some(front),
                    &classname,
                    front.text(),
                ));
            }
        }
    }
}

pub(crate) fn unused_private_function_error(
    tok: Option<Cursor<'_>>,
    classname: &str,
    funcname: &str,
) -> Diagnostic {
    Diagnostic::at(
        tok,
        Severity::Style,
        "unusedPrivateFunction",
        format!("Unused private function '{classname}::{funcname}'"),
    )
}
