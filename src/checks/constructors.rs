//! Constructor checks: classes that need a constructor, and members a
//! constructor leaves uninitialized.
//!
//! The dataflow is a shallow walk over the function body with one
//! `init` bit per member. Whenever resolution gets uncertain — a call
//! that passes `this`, recursion, a member function whose body is not
//! in the translation unit, a base class that may do the work — every
//! member is marked initialized and the walk stops. False negatives are
//! fine; false positives are not.

use tracing::trace;

use crate::diagnostics::{Diagnostic, ErrorLogger, Severity};
use crate::symboldb::{AccessControl, FuncType, Var};
use crate::token::pattern::{self, Pat};
use crate::token::{Cursor, TokenStream};

use super::ClassAnalysis;

/// Set the init bit of `varname`.
fn init_var(vars: &mut [Var], varname: &str) {
    for var in vars.iter_mut() {
        if var.name == varname {
            var.init = true;
            return;
        }
    }
}

fn init_all(vars: &mut [Var]) {
    for var in vars.iter_mut() {
        var.init = true;
    }
}

/// Walk a constructor (or member function) body starting at its name
/// token `ftok` and set the init bit of every member observed to be
/// initialized. `class_def` is the class header token; `callstack`
/// holds the names of the functions already being analyzed so
/// recursion and overloads terminate.
pub(crate) fn initialize_var_list(
    tokens: &TokenStream,
    class_def: Cursor<'_>,
    ftok: Cursor<'_>,
    vars: &mut Vec<Var>,
    callstack: &mut Vec<String>,
) {
    use Pat::{Any, AnyOf, Ident, Lit};

    let classname = class_def.text_at(1).to_string();
    let mut assign = false;
    let mut indent = 0u32;

    let mut cur = Some(ftok);
    while let Some(mut f) = cur {
        if f.next().is_none() {
            break;
        }

        // initializer list between the ')' and the body:
        //   Kalle::Kalle() : member(value) { }
        if indent == 0 {
            if assign && pattern::matches(Some(f), &[Ident, Lit("(")]) {
                init_var(vars, f.text());

                // assignment inside the initializer: member(value = x)
                if pattern::matches(f.at(2), &[Ident, Lit("=")]) {
                    init_var(vars, f.text_at(2));
                }
            }
            assign |= f.text() == ":";
        }

        if f.text() == "{" {
            indent += 1;
            assign = false;
        } else if f.text() == "}" {
            if indent <= 1 {
                break;
            }
            indent -= 1;
        }

        if indent < 1 {
            cur = f.next();
            continue;
        }

        // stream read
        if pattern::matches(Some(f), &[Lit(">>"), Ident]) {
            init_var(vars, f.text_at(1));
        }

        // a new statement starts after one of these
        if !pattern::matches(Some(f), &[AnyOf(&["{", "}", ";", "(", ")", "="])]) {
            cur = f.next();
            continue;
        }

        if pattern::matches(Some(f), &[Lit("("), Lit("!")]) {
            f = match f.next() {
                Some(n) => n,
                None => break,
            };
        }

        // assigning the whole object initializes everything
        if pattern::matches(f.next(), &[Lit("*"), Lit("this"), Lit("=")]) {
            init_all(vars);
            break;
        }

        if pattern::matches(f.next(), &[Ident, Lit("."), Ident, Lit("(")]) {
            f = match f.at(2) {
                Some(n) => n,
                None => break,
            };
        }

        if !pattern::matches(f.next(), &[Ident])
            && !pattern::matches(f.next(), &[Lit("this"), Lit("."), Ident])
            && !pattern::matches(f.next(), &[Lit("*"), Ident, Lit("=")])
            && !pattern::matches(
                f.next(),
                &[Lit("("), Lit("*"), Lit("this"), Lit(")"), Lit("."), Ident],
            )
        {
            cur = f.next();
            continue;
        }

        // go to the first token of the statement
        f = match f.next() {
            Some(n) => n,
            None => break,
        };

        if pattern::matches(
            Some(f),
            &[Lit("("), Lit("*"), Lit("this"), Lit(")"), Lit(".")],
        ) {
            f = match f.at(5) {
                Some(n) => n,
                None => break,
            };
        }

        if pattern::matches(Some(f), &[Lit("this"), Lit(".")]) {
            f = match f.at(2) {
                Some(n) => n,
                None => break,
            };
        }

        if pattern::matches(Some(f), &[Ident, Lit("::")]) {
            f = match f.at(2) {
                Some(n) => n,
                None => break,
            };
        }

        // clearing the whole object
        if pattern::matches(Some(f), &[Lit("memset"), Lit("("), Lit("this"), Lit(",")]) {
            init_all(vars);
            return;
        }

        // clearing one member
        if pattern::matches(Some(f), &[Lit("memset"), Lit("("), Ident, Lit(",")]) {
            init_var(vars, f.text_at(2));
            cur = f.next().and_then(|c| c.link()).and_then(|c| c.next());
            continue;
        }

        // member function call?
        if pattern::matches(Some(f), &[Ident, Lit("(")]) && f.text() != "if" {
            // passing `this` hands the whole object away
            if let Some(close) = f.next().and_then(|c| c.link()) {
                let mut back = Some(close);
                while let Some(b) = back {
                    if b == f {
                        break;
                    }
                    if b.text() == "this" {
                        init_all(vars);
                        return;
                    }
                    back = b.prev();
                }
            }

            // recursion or an overload already being analyzed
            if callstack.iter().any(|name| name == f.text()) {
                init_all(vars);
                return;
            }

            if let Some(impl_tok) =
                tokens.find_class_function(class_def, &classname, f.text())
            {
                trace!(function = f.text(), "descending into member call");
                callstack.push(f.text().to_string());
                initialize_var_list(tokens, class_def, impl_tok, vars, callstack);
                callstack.pop();
            } else {
                // The callee has no body here. Find the class body and
                // look for the name among its declarations.
                let decl_pats = [
                    Pat::text(class_def.text()),
                    Pat::text(&classname),
                    AnyOf(&["{", ":"]),
                ];
                let mut tok = pattern::find(tokens.first(), &decl_pats, None);
                let mut derived = false;
                while let Some(c) = tok {
                    if c.text() == "{" {
                        break;
                    }
                    if c.text() == ":" {
                        derived = true;
                    }
                    tok = c.next();
                }

                let mut declared_here = false;
                let mut body = tok.and_then(|c| c.next());
                let reached_end = loop {
                    let Some(c) = body else { break false };
                    if c.text() == "{" {
                        match c.link() {
                            Some(l) => body = l.next(),
                            None => break false,
                        }
                        continue;
                    }
                    if c.text() == "}" {
                        break true;
                    }
                    if (c.text() == f.text()
                        && c.next().is_some_and(|n| n.text() == "("))
                        || c.text() == "friend"
                    {
                        declared_here = true;
                        break false;
                    }
                    body = c.next();
                };

                // declared but unresolvable, or base classes involved:
                // assume everything gets initialized
                if !reached_end || declared_here || derived {
                    init_all(vars);
                    break;
                }

                // external function: whatever is passed to it by name
                // counts as initialized
                let mut depth2 = 0u32;
                let mut arg = f.at(2);
                while let Some(a) = arg {
                    if a.text() == "(" {
                        depth2 += 1;
                    } else if a.text() == ")" {
                        if depth2 == 0 {
                            break;
                        }
                        depth2 -= 1;
                    }
                    if a.is_name() {
                        init_var(vars, a.text());
                    }
                    arg = a.next();
                }
                cur = f.next();
                continue;
            }
        }
        // assignments, including array items and struct members
        else if pattern::matches(Some(f), &[Ident, Lit("=")]) {
            init_var(vars, f.text());
        } else if pattern::matches(Some(f), &[Ident, Lit("["), Any, Lit("]"), Lit("=")]) {
            init_var(vars, f.text());
        } else if pattern::matches(
            Some(f),
            &[Ident, Lit("["), Any, Lit("]"), Lit("["), Any, Lit("]"), Lit("=")],
        ) {
            init_var(vars, f.text());
        } else if pattern::matches(Some(f), &[Lit("*"), Ident, Lit("=")]) {
            init_var(vars, f.text_at(1));
        } else if pattern::matches(Some(f), &[Ident, Lit("."), Any, Lit("=")]) {
            init_var(vars, f.text());
        }

        // clear() and Clear() count as initialization
        if pattern::matches(
            Some(f),
            &[Ident, Lit("."), AnyOf(&["clear", "Clear"]), Lit("(")],
        ) {
            init_var(vars, f.text());
        }

        cur = f.next();
    }
}

/// The constructors check.
pub(crate) fn constructors(analysis: &ClassAnalysis<'_>, logger: &mut dyn ErrorLogger) {
    if !analysis.settings().check_coding_style {
        return;
    }

    let tokens = analysis.tokens();
    let db = analysis.database();

    for (_, scope) in db.scopes() {
        let class_def = tokens.cursor(scope.class_def);

        // no constructor at all, but members that would need one
        if scope.num_constructors == 0 {
            if scope
                .vars
                .iter()
                .any(|v| v.is_private && !v.is_class && !v.is_static)
            {
                logger.report(no_constructor_error(
                    Some(class_def),
                    &scope.name,
                    class_def.text() == "struct",
                ));
            }
        }

        for func in &scope.functions {
            if !func.has_body
                || !matches!(
                    func.kind,
                    FuncType::Constructor | FuncType::CopyConstructor | FuncType::OperatorEqual
                )
            {
                continue;
            }

            // fresh init bits for this function
            let mut vars = scope.vars.clone();

            let mut callstack = Vec::new();
            initialize_var_list(
                tokens,
                class_def,
                tokens.cursor(func.token),
                &mut vars,
                &mut callstack,
            );

            for var in &vars {
                // class members initialize themselves in a plain constructor
                if var.is_class && func.kind == FuncType::Constructor {
                    continue;
                }

                if var.init || var.is_static {
                    continue;
                }

                if func.kind == FuncType::OperatorEqual {
                    let tok = tokens.cursor(func.token);
                    let oper_start = if tok.text() == "=" { tok.at(1) } else { tok.at(3) };

                    let mut class_name_used = false;
                    if let Some(start) = oper_start {
                        if let Some(end) = start.link() {
                            let mut c = Some(start);
                            while let Some(cc) = c {
                                if cc == end {
                                    break;
                                }
                                if cc.text() == scope.name {
                                    class_name_used = true;
                                    break;
                                }
                                c = cc.next();
                            }
                        }
                    }

                    if class_name_used {
                        logger.report(operator_eq_var_error(
                            Some(tokens.cursor(func.token)),
                            &scope.name,
                            &var.name,
                        ));
                    }
                } else if func.access != AccessControl::Private {
                    logger.report(uninit_var_error(
                        Some(tokens.cursor(func.token)),
                        &scope.name,
                        &var.name,
                    ));
                }
            }
        }
    }
}

pub(crate) fn no_constructor_error(
    tok: Option<Cursor<'_>>,
    classname: &str,
    is_struct: bool,
) -> Diagnostic {
    Diagnostic::at(
        tok,
        Severity::Style,
        "noConstructor",
        format!(
            "The {} '{classname}' has no constructor. Member variables not initialized.",
            if is_struct { "struct" } else { "class" }
        ),
    )
}

pub(crate) fn uninit_var_error(
    tok: Option<Cursor<'_>>,
    classname: &str,
    varname: &str,
) -> Diagnostic {
    Diagnostic::at(
        tok,
        Severity::Style,
        "uninitVar",
        format!("Member variable not initialized in the constructor '{classname}::{varname}'"),
    )
}

pub(crate) fn operator_eq_var_error(
    tok: Option<Cursor<'_>>,
    classname: &str,
    varname: &str,
) -> Diagnostic {
    Diagnostic::at(
        tok,
        Severity::Style,
        "operatorEqVarError",
        format!(
            "Member variable '{classname}::{varname}' is not assigned a value in '{classname}::operator='"
        ),
    )
}

// =============================================================================
// Tests
// =============================================================================
