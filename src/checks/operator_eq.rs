//! The `operator=` checks.
//!
//! Three independent analyses of assignment operators:
//!
//! - `operatorEq`: a non-private `operator=` declared to return `void`.
//! - `operatorEqRetRefThis`: an `operator=` whose body does not return
//!   a reference to `*this` on every path.
//! - `operatorEqToSelf`: an `operator=` that frees a member and
//!   reallocates it without guarding against self-assignment. Skipped
//!   for classes with multiple inheritance, where an object has more
//!   than one address and the guard cannot be expressed trivially.

use crate::diagnostics::{Diagnostic, ErrorLogger, Severity};
use crate::symboldb::{AccessControl, FuncType};
use crate::token::pattern::{self, Pat};
use crate::token::{Cursor, TokenStream};

use super::ClassAnalysis;

// =============================================================================
// operatorEq: "void operator=("
// =============================================================================

pub(crate) fn operator_eq(analysis: &ClassAnalysis<'_>, logger: &mut dyn ErrorLogger) {
    if !analysis.settings().check_coding_style {
        return;
    }

    let tokens = analysis.tokens();
    let db = analysis.database();

    for (_, scope) in db.scopes() {
        for func in &scope.functions {
            if func.kind == FuncType::OperatorEqual && func.access != AccessControl::Private {
                let tok = tokens.cursor(func.token);
                if tok.text_at(-2) == "void" {
                    logger.report(operator_eq_return_error(tok.at(-2)));
                }
            }
        }
    }
}

pub(crate) fn operator_eq_return_error(tok: Option<Cursor<'_>>) -> Diagnostic {
    Diagnostic::at(
        tok,
        Severity::Style,
        "operatorEq",
        "'operator=' should return something",
    )
}

// =============================================================================
// operatorEqRetRefThis: "C& operator=(..) { ... return *this; }"
// =============================================================================

pub(crate) fn operator_eq_ret_ref_this(
    analysis: &ClassAnalysis<'_>,
    logger: &mut dyn ErrorLogger,
) {
    use Pat::{AnyOf, Lit, Opt, TypeName};

    if !analysis.settings().check_coding_style {
        return;
    }

    let tokens = analysis.tokens();
    let db = analysis.database();

    for (_, scope) in db.scopes() {
        for func in &scope.functions {
            if func.kind != FuncType::OperatorEqual || !func.has_body {
                continue;
            }

            // only when the declared return type is `ClassName &`
            let def = tokens.cursor(func.token_def);
            if !pattern::matches(
                def.at(-4),
                &[
                    AnyOf(&[";", "}", "{", "public:", "protected:", "private:"]),
                    TypeName,
                    Lit("&"),
                ],
            ) || def.text_at(-3) != scope.name
            {
                continue;
            }

            let tok = tokens.cursor(func.token);
            let Some(close) = tok.next().and_then(|c| c.link()) else {
                continue;
            };
            let Some(last) = close.next().and_then(|c| c.link()) else {
                continue;
            };

            let mut found_return = false;
            let mut cur = close.at(2);
            while let Some(c) = cur {
                if c == last {
                    break;
                }
                if c.text() == "return" {
                    found_return = true;
                    let mut ret = c;

                    // tolerate a cast to the own class
                    if pattern::matches(
                        ret.next(),
                        &[Lit("("), Pat::text(&scope.name), Lit("&"), Lit(")")],
                    ) {
                        ret = match ret.at(4) {
                            Some(r) => r,
                            None => break,
                        };
                    }

                    let ok = pattern::matches(
                        ret.next(),
                        &[Opt("("), Lit("*"), Lit("this"), AnyOf(&[";", "="])],
                    ) || pattern::matches(
                        ret.next(),
                        &[Opt("("), Lit("*"), Lit("this"), Lit("+=")],
                    ) || pattern::matches(
                        ret.next(),
                        &[Lit("operator"), Lit("="), Lit("(")],
                    );
                    if !ok {
                        logger.report(operator_eq_ret_ref_this_error(Some(tok)));
                    }
                    cur = ret.next();
                    continue;
                }
                cur = c.next();
            }

            if !found_return {
                logger.report(operator_eq_ret_ref_this_error(Some(tok)));
            }
        }
    }
}

pub(crate) fn operator_eq_ret_ref_this_error(tok: Option<Cursor<'_>>) -> Diagnostic {
    Diagnostic::at(
        tok,
        Severity::Style,
        "operatorEqRetRefThis",
        "'operator=' should return reference to self",
    )
}

// =============================================================================
// operatorEqToSelf: "C& operator=(const C& rhs) { if (this == &rhs) .. }"
// =============================================================================
//
// For classes that allocate dynamic memory, self-assignment without a
// guard deallocates the memory it is about to copy from. Only the
// specific deallocate-then-reassign sequence is flagged; anything less
// certain stays quiet.

/// Compare `length` tokens starting at two positions.
fn name_match(tok1: Cursor<'_>, tok2: Cursor<'_>, length: i32) -> bool {
    for i in 0..length {
        let (Some(a), Some(b)) = (tok1.at(i), tok2.at(i)) else {
            return false;
        };
        if a.text() != b.text() {
            return false;
        }
    }
    true
}

/// Join `length` tokens starting at `name` with single spaces.
fn name_str(name: Cursor<'_>, length: i32) -> String {
    let mut s = String::new();
    for i in 0..length {
        if i != 0 {
            s.push(' ');
        }
        s.push_str(name.text_at(i));
    }
    s
}

/// Does the body deallocate a member and later reassign it?
fn has_deallocation(first: Cursor<'_>, last: Cursor<'_>) -> bool {
    use Pat::{AnyOf, Ident, Lit};

    let mut tok = Some(first);
    while let Some(t) = tok {
        if t == last {
            break;
        }

        if pattern::matches(
            Some(t),
            &[AnyOf(&["{", ";", ","]), Lit("free"), Lit("("), Ident],
        ) {
            let var = t.text_at(3);
            let mut cur = t.at(4);
            while let Some(c) = cur {
                if c == last {
                    break;
                }
                if pattern::matches(Some(c), &[Ident, Lit("=")]) && c.text() == var {
                    return true;
                }
                cur = c.next();
            }
        } else if pattern::matches(
            Some(t),
            &[AnyOf(&["{", ";", ","]), Lit("delete"), Lit("["), Lit("]"), Ident],
        ) {
            let var = t.text_at(4);
            let mut cur = t.at(5);
            while let Some(c) = cur {
                if c == last {
                    break;
                }
                if pattern::matches(
                    Some(c),
                    &[Ident, Lit("="), Lit("new"), Pat::TypeName, Lit("[")],
                ) && c.text() == var
                {
                    return true;
                }
                cur = c.next();
            }
        } else if pattern::matches(
            Some(t),
            &[AnyOf(&["{", ";", ","]), Lit("delete"), Ident],
        ) {
            let var = t.text_at(2);
            let mut cur = t.at(3);
            while let Some(c) = cur {
                if c == last {
                    break;
                }
                if pattern::matches(Some(c), &[Ident, Lit("="), Lit("new")])
                    && c.text() == var
                {
                    return true;
                }
                cur = c.next();
            }
        }

        tok = t.next();
    }

    false
}

/// Does the body guard against self-assignment with an
/// `if (this == &rhs)`-style test?
fn has_assign_self(first: Cursor<'_>, last: Cursor<'_>, rhs: Cursor<'_>) -> bool {
    use Pat::{AnyOf, Ident, Lit};

    let mut tok = Some(first);
    while let Some(t) = tok {
        if t == last {
            break;
        }

        if pattern::matches(Some(t), &[Lit("if"), Lit("(")]) {
            let start = t.at(2);
            let end = t.at(1).and_then(|c| c.link());
            if let (Some(start), Some(end)) = (start, end) {
                let mut c = Some(start);
                while let Some(cc) = c {
                    if cc == end {
                        break;
                    }
                    if pattern::matches(
                        Some(cc),
                        &[Lit("this"), AnyOf(&["==", "!="]), Lit("&"), Ident],
                    ) && cc.text_at(3) == rhs.text()
                    {
                        return true;
                    }
                    if pattern::matches(
                        Some(cc),
                        &[Lit("&"), Ident, AnyOf(&["==", "!="]), Lit("this")],
                    ) && cc.text_at(1) == rhs.text()
                    {
                        return true;
                    }
                    c = cc.next();
                }
            }
        }

        tok = t.next();
    }

    false
}

/// Commas in the class header's base list mean multiple inheritance.
fn has_multiple_inheritance_inline(tok: Option<Cursor<'_>>) -> bool {
    let mut cur = tok;
    while let Some(c) = cur {
        if c.text() == "{" {
            break;
        }
        if c.text() == "," {
            return true;
        }
        cur = c.next();
    }
    false
}

/// Resolve a possibly nested qualified name (`"A :: B"`) to its class
/// header and test it for multiple inheritance.
fn has_multiple_inheritance_global(tokens: &TokenStream, name: &str) -> bool {
    use Pat::AnyOf;

    let mut tok = tokens.first();
    let segments: Vec<&str> = name.split(" :: ").collect();
    for segment in segments {
        tok = pattern::find(
            tok,
            &[AnyOf(&["class", "struct"]), Pat::text(segment)],
            None,
        );
    }
    has_multiple_inheritance_inline(tok)
}

pub(crate) fn operator_eq_to_self(analysis: &ClassAnalysis<'_>, logger: &mut dyn ErrorLogger) {
    use Pat::{AnyOf, Ident, Lit, TypeName};

    if !analysis.settings().check_coding_style {
        return;
    }

    let tokens = analysis.tokens();

    let mut search = tokens.first();
    while let Some(tok) =
        pattern::find(search, &[Lit("operator"), Lit("="), Lit("(")], None)
    {
        search = tok.next();

        // out-of-line: Class :: operator = ( ... )
        if pattern::matches(tok.at(-2), &[TypeName, Lit("::")]) {
            let mut name_length = 1;
            let mut tok1 = tok.at(-2).unwrap();
            while pattern::matches(tok1.at(-2), &[TypeName, Lit("::")]) {
                tok1 = tok1.at(-2).unwrap();
                name_length += 2;
            }
            let class_name = tok1;
            let name_string = name_str(class_name, name_length);

            if has_multiple_inheritance_global(tokens, &name_string) {
                continue;
            }
            if !tok1.prev().is_some_and(|p| p.text() == "&") {
                continue;
            }

            // returned type must be the class itself
            let Some(ret) = tok1.at(-(1 + name_length)) else {
                continue;
            };
            if !name_match(class_name, ret, name_length) {
                continue;
            }

            // parameter must be a const reference to the class
            let mut sig: Vec<Pat> = vec![Lit("const")];
            sig.extend(name_string.split(' ').map(Pat::text));
            sig.push(Lit("&"));
            sig.push(Ident);
            sig.push(Lit(")"));
            if !pattern::matches(tok.at(3), &sig) {
                continue;
            }
            let Some(rhs) = tok.at(5 + name_length) else {
                continue;
            };
            if !tok.at(4).is_some_and(|c| name_match(class_name, c, name_length)) {
                continue;
            }

            if let Some(close) = tok.at(2).and_then(|c| c.link()) {
                if close.next().is_some_and(|n| n.text() == "{") {
                    let first = close.next().unwrap();
                    if let Some(last) = first.link() {
                        if !has_assign_self(first, last, rhs)
                            && has_deallocation(first, last)
                        {
                            logger.report(operator_eq_to_self_error(Some(tok)));
                        }
                    }
                }
            }
        }
        // inline: defined inside the class body
        else {
            if !tok.prev().is_some_and(|p| p.text() == "&") {
                continue;
            }

            // find the enclosing class header
            let mut tok1 = Some(tok);
            while let Some(c) = tok1 {
                if pattern::matches(Some(c), &[AnyOf(&["class", "struct"]), Ident]) {
                    break;
                }
                tok1 = c.prev();
            }
            let Some(class_tok) = tok1 else { continue };
            let class_name = class_tok.next().unwrap();

            if has_multiple_inheritance_inline(Some(class_tok)) {
                continue;
            }
            if tok.text_at(-2) != class_name.text() {
                continue;
            }
            if !pattern::matches(
                tok.at(3),
                &[Lit("const"), TypeName, Lit("&"), Ident, Lit(")")],
            ) {
                continue;
            }
            let Some(rhs) = tok.at(6) else { continue };
            if tok.text_at(4) != class_name.text() {
                continue;
            }

            if let Some(close) = tok.at(2).and_then(|c| c.link()) {
                if close.next().is_some_and(|n| n.text() == "{") {
                    let first = close.next().unwrap();
                    if let Some(last) = first.link() {
                        if !has_assign_self(first, last, rhs)
                            && has_deallocation(first, last)
                        {
                            logger.report(operator_eq_to_self_error(Some(tok)));
                        }
                    }
                }
            }
        }
    }
}

pub(crate) fn operator_eq_to_self_error(tok: Option<Cursor<'_>>) -> Diagnostic {
    Diagnostic::at(
        tok,
        Severity::Style,
        "operatorEqToSelf",
        "'operator=' should check for assignment to self",
    )
}
