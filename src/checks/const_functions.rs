//! Member functions that could be declared `const`.
//!
//! A candidate is an ordinary member function with a body that neither
//! writes a member, streams from one, calls anything that might (only
//! `return`, `c_str` and `if` are trusted), nor deletes. Functions
//! returning a non-const pointer or reference, functions overriding a
//! virtual from a base class, and return types that look like unknown
//! macros (ALL_CAPS) are excluded up front.
//!
//! Base classes are resolved by simple name only; qualified base names
//! are not followed.

use crate::diagnostics::{Diagnostic, ErrorLogger, Severity};
use crate::symboldb::builder::{args_match, parse_base_list};
use crate::symboldb::{varlist, FuncType, Var};
use crate::token::pattern::{self, Pat};
use crate::token::{Cursor, TokenStream};

use super::ClassAnalysis;

pub(crate) fn check_const(analysis: &ClassAnalysis<'_>, logger: &mut dyn ErrorLogger) {
    use Pat::{AnyOf, Lit};

    if !analysis.settings().check_coding_style || analysis.settings().ifcfg {
        return;
    }

    let tokens = analysis.tokens();
    let db = analysis.database();

    for (id, scope) in db.scopes() {
        for func in &scope.functions {
            if func.kind != FuncType::Function
                || !func.has_body
                || func.is_friend
                || func.is_static
                || func.is_const
                || func.is_virtual
            {
                continue;
            }

            let def = tokens.cursor(func.token_def);
            let token = tokens.cursor(func.token);

            let function_name = if def.is_name() {
                def.text().to_string()
            } else {
                format!("operator{}", def.text())
            };

            // last token of the return type
            let mut previous = if def.is_name() { token.prev() } else { token.at(-2) };
            while previous.is_some_and(|p| p.text() == "::") {
                previous = previous.unwrap().at(-2);
            }
            let Some(previous) = previous else { continue };

            if pattern::matches(Some(previous), &[AnyOf(&["*", "&"])]) {
                // pointer or reference return: only const-qualified
                // ones can belong to a const function
                let mut temp = token.prev();
                while let Some(t) = temp {
                    let Some(p) = t.prev() else { break };
                    if pattern::matches(
                        Some(p),
                        &[AnyOf(&[";", "}", "{", "public:", "protected:", "private:"])],
                    ) {
                        break;
                    }
                    temp = Some(p);
                }
                if temp.map_or(true, |t| t.text() != "const") {
                    continue;
                }
            } else if pattern::matches(previous.prev(), &[AnyOf(&["*", "&"]), Lit(">")]) {
                // pointer or reference inside a template return type
                let mut temp = token.prev();
                let mut found_const = false;
                while let Some(t) = temp {
                    let Some(p) = t.prev() else { break };
                    if pattern::matches(
                        Some(p),
                        &[AnyOf(&[";", "}", "{", "public:", "protected:", "private:"])],
                    ) {
                        break;
                    }
                    temp = Some(p);
                    if p.text() == "const" {
                        found_const = true;
                        break;
                    }
                }
                if !found_const {
                    continue;
                }
            } else if previous.is_name() {
                // ALL_CAPS return types are unknown macros; stay quiet
                let all_upper = previous
                    .text()
                    .chars()
                    .all(|c| c == '_' || c.is_ascii_uppercase());
                if all_upper {
                    continue;
                }
            }

            let Some(param_end) = token.next().and_then(|c| c.link()) else {
                continue;
            };

            // overriding a virtual function must keep its signature
            if !scope.derived_from.is_empty()
                && is_virtual(tokens, &scope.derived_from, token)
            {
                continue;
            }

            if check_const_func(tokens, &scope.name, &scope.derived_from, &scope.vars, param_end)
            {
                let classname = db.qualified_name(id);
                if func.is_inline {
                    logger.report(check_const_error(Some(token), &classname, &function_name));
                } else {
                    logger.report(check_const_error2(token, def, &classname, &function_name));
                }
            }
        }
    }
}

/// Resolve `tok` as a member variable of `classname` or, recursively,
/// of its simple-named base classes. Mutable members do not count:
/// writing them is allowed in a const function.
fn is_member_var(
    tokens: &TokenStream,
    classname: &str,
    derived_from: &[String],
    vars: &[Var],
    mut tok: Cursor<'_>,
) -> bool {
    use Pat::{AnyOf, Ident, Lit};

    // back up to the start of the expression
    while let Some(prev) = tok.prev() {
        if pattern::matches(
            Some(prev),
            &[AnyOf(&[
                "}", "{", ";", "public:", "protected:", "private:", "return", ":", "?",
            ])],
        ) {
            break;
        }
        if pattern::matches(Some(prev), &[Lit("*"), Lit("this")]) {
            return true;
        }
        tok = prev;
    }

    if tok.text() == "this" {
        return true;
    }

    if pattern::matches(
        Some(tok),
        &[Lit("("), Lit("*"), Ident, Lit(")"), Lit("[")],
    ) {
        tok = match tok.at(2) {
            Some(t) => t,
            None => return false,
        };
    }

    // ignore the own-class qualifier
    if tok.text() == classname && tok.next().is_some_and(|n| n.text() == "::") {
        tok = match tok.at(2) {
            Some(t) => t,
            None => return false,
        };
    }

    for var in vars {
        if var.name == tok.text() {
            return !var.is_mutable;
        }
    }

    // not found here: try the base classes
    for base in derived_from {
        if base.contains("::") {
            // qualified base class names are not resolved
            continue;
        }
        let Some(class_tok) = pattern::find(
            tokens.first(),
            &[AnyOf(&["class", "struct"]), Pat::text(base), AnyOf(&["{", ":"])],
            None,
        ) else {
            continue;
        };
        let base_list = parse_base_list(class_tok);
        let base_vars = varlist::extract(class_tok);
        if is_member_var(tokens, class_tok.text_at(1), &base_list, &base_vars, tok) {
            return true;
        }
    }

    false
}

/// Walk a function body starting at the closing parenthesis of its
/// parameter list; true when nothing in it prevents a const qualifier.
fn check_const_func(
    tokens: &TokenStream,
    classname: &str,
    derived_from: &[String],
    vars: &[Var],
    param_end: Cursor<'_>,
) -> bool {
    use Pat::{Any, AnyOf, Ident, Lit};

    let mut indent = 0u32;
    let mut cur = Some(param_end);
    while let Some(t) = cur {
        if t.text() == "{" {
            indent += 1;
        } else if t.text() == "}" {
            if indent <= 1 {
                break;
            }
            indent -= 1;
        }
        // assignment: = += |= &= ..., but not comparisons or templates
        else if t.text() == "="
            || (t.text().find('=') == Some(1)
                && !t.text().contains(['<', '!', '>']))
        {
            let Some(prev) = t.prev() else { return false };
            if !prev.is_name() && !derived_from.is_empty() {
                // cannot tell what is being written to
                return false;
            }
            if is_member_var(tokens, classname, derived_from, vars, prev) {
                return false;
            }
        }
        // streaming into something
        else if t.text() == "<<"
            && t.prev().is_some_and(|p| {
                is_member_var(tokens, classname, derived_from, vars, p)
            })
        {
            return false;
        } else if pattern::matches(Some(t), &[AnyOf(&["++", "--"])]) {
            return false;
        }
        // function call: only return/c_str/if are known harmless
        else if (pattern::matches(Some(t), &[Ident, Lit("(")])
            && !pattern::matches(Some(t), &[AnyOf(&["return", "c_str", "if"])]))
            || pattern::matches(Some(t), &[Ident, Lit("<"), Any, Lit(">"), Lit("(")])
        {
            return false;
        } else if t.text() == "delete" {
            return false;
        }

        cur = t.next();
    }

    true
}

/// Is `function_token`'s function declared virtual in any base class
/// (recursively)? Only simple base class names are followed.
fn is_virtual(tokens: &TokenStream, derived_from: &[String], function_token: Cursor<'_>) -> bool {
    use Pat::AnyOf;

    for base in derived_from {
        if base.contains("::") {
            // qualified base class names are not resolved
            continue;
        }

        let Some(class_tok) = pattern::find(
            tokens.first(),
            &[AnyOf(&["class", "struct"]), Pat::text(base), AnyOf(&["{", ":"])],
            None,
        ) else {
            continue;
        };

        let base_list = parse_base_list(class_tok);

        // go to the class body
        let mut tok = Some(class_tok);
        while let Some(c) = tok {
            if c.text() == "{" {
                break;
            }
            tok = c.next();
        }

        let mut cur = tok.and_then(|c| c.next());
        while let Some(t) = cur {
            let mut next = t.next();

            if t.text() == "{" {
                next = t.link().and_then(|l| l.next());
            } else if t.text() == "}" {
                break;
            } else if pattern::matches(
                Some(t),
                &[AnyOf(&["public:", "protected:", "private:"])],
            ) {
                // access labels carry no information here
            } else if t.text() == "(" {
                next = t.link().and_then(|l| l.next());
            } else if t.text() == "virtual" {
                // go to the function name
                let mut v = t;
                while v.next().is_some_and(|n| n.text() != "(") {
                    v = match v.next() {
                        Some(n) => n,
                        None => break,
                    };
                }

                if v.text() == function_token.text() {
                    // return types must match, token by token
                    let mut temp1 = v.prev();
                    let mut temp2 = function_token.prev();
                    let mut return_match = true;
                    while let Some(t1) = temp1 {
                        if t1.text() == "virtual" {
                            break;
                        }
                        let Some(t2) = temp2 else {
                            return_match = false;
                            break;
                        };
                        if t1.text() != t2.text() {
                            return_match = false;
                            break;
                        }
                        temp1 = t1.prev();
                        temp2 = t2.prev();
                    }

                    if return_match
                        && args_match(v.at(2), function_token.at(2), "", 0)
                    {
                        return true;
                    }
                }
            }

            cur = next;
        }

        if !base_list.is_empty() && is_virtual(tokens, &base_list, function_token) {
            return true;
        }
    }

    false
}

pub(crate) fn check_const_error(
    tok: Option<Cursor<'_>>,
    classname: &str,
    funcname: &str,
) -> Diagnostic {
    Diagnostic::at(
        tok,
        Severity::Style,
        "functionConst",
        format!("The function '{classname}::{funcname}' can be const"),
    )
}

pub(crate) fn check_const_error2(
    tok1: Cursor<'_>,
    tok2: Cursor<'_>,
    classname: &str,
    funcname: &str,
) -> Diagnostic {
    Diagnostic::at_tokens(
        &[tok1, tok2],
        Severity::Style,
        "functionConst",
        format!("The function '{classname}::{funcname}' can be const"),
    )
}
