//! Symbol database construction.
//!
//! One forward sweep over the token stream. Scope headers push onto the
//! nest chain; inside a class, member function declarations are
//! recognized, classified and — when the body is not inline — matched
//! to their out-of-line definitions by searching the enclosing scopes
//! with increasingly qualified name patterns.

use tracing::debug;

use crate::token::pattern::{self, Pat};
use crate::token::{Cursor, TokenStream};

use super::varlist;
use super::{AccessControl, Func, FuncType, Scope, ScopeId, SymbolDatabase};

/// Build the symbol database for a token stream.
pub fn build(tokens: &TokenStream) -> SymbolDatabase {
    use Pat::{Any, AnyOf, Ident, Lit, Opt, OptIdent};

    let mut db = SymbolDatabase::default();
    let mut current: Option<ScopeId> = None;

    let mut tok = tokens.first();
    while let Some(t) = tok {
        let mut next_tok = t.next();

        // scope opener
        if pattern::matches(
            Some(t),
            &[AnyOf(&["class", "struct", "namespace"]), Ident, AnyOf(&["{", ":"])],
        ) {
            let mut derived_from = Vec::new();

            // walk the header up to the body, collecting base classes
            let mut tok2 = t.at(2);
            while let Some(c) = tok2 {
                if c.text() == "{" {
                    break;
                }
                if pattern::matches(
                    Some(c),
                    &[AnyOf(&[":", ","]), AnyOf(&["public", "protected", "private"])],
                ) {
                    // jump to the base class name
                    let mut name_tok = c.at(2);
                    let mut name = String::new();
                    while pattern::matches(name_tok, &[Ident, Lit("::")]) {
                        let n = name_tok.unwrap();
                        name.push_str(n.text());
                        name.push_str(" :: ");
                        name_tok = n.at(2);
                    }
                    if let Some(n) = name_tok {
                        name.push_str(n.text());
                    }
                    derived_from.push(name);
                    tok2 = name_tok;
                    if tok2.is_none() {
                        break;
                    }
                }
                tok2 = tok2.and_then(|c2| c2.next());
            }

            let Some(start) = tok2 else { break };
            let Some(end) = start.link() else { break };

            let scope = Scope {
                is_namespace: t.text() == "namespace",
                name: t.text_at(1).to_string(),
                class_def: t.id(),
                class_start: start.id(),
                class_end: end.id(),
                num_constructors: 0,
                functions: Vec::new(),
                vars: varlist::extract(t),
                derived_from,
                nest: current,
                access: if t.text() == "struct" {
                    AccessControl::Public
                } else {
                    AccessControl::Private
                },
            };
            debug!(name = %scope.name, namespace = scope.is_namespace, "scope opened");
            current = Some(db.push(scope));
            next_tok = start.next();
        }
        // inside a class
        else if let Some(cur) = current {
            if !db.scope(cur).is_namespace {
                if t.id() == db.scope(cur).class_end {
                    current = db.scope(cur).nest;
                } else if t.text() == "private:" {
                    db.scope_mut(cur).access = AccessControl::Private;
                } else if t.text() == "protected:" {
                    db.scope_mut(cur).access = AccessControl::Protected;
                } else if t.text() == "public:" {
                    db.scope_mut(cur).access = AccessControl::Public;
                }
                // member function?
                else if (pattern::matches(Some(t), &[Ident, Lit("(")])
                    || pattern::matches(Some(t), &[Lit("operator"), Any, Lit("(")]))
                    && t.prev().is_some_and(|p| p.text() != "::")
                    && pattern::matches(
                        if t.text() == "operator" {
                            t.at(2).and_then(|c| c.link())
                        } else {
                            t.next().and_then(|c| c.link())
                        },
                        &[Lit(")"), Opt("const"), AnyOf(&[";", "{", "=", ":"])],
                    )
                {
                    let mut function = Func {
                        token_def: t.id(),
                        token: t.id(),
                        access: db.scope(cur).access,
                        has_body: false,
                        is_inline: false,
                        is_const: false,
                        is_virtual: false,
                        is_static: false,
                        is_friend: false,
                        is_operator: false,
                        kind: FuncType::Function,
                    };

                    let mut def = t;

                    // operator function
                    if def.text() == "operator" {
                        function.is_operator = true;
                        // the name is the operator symbol itself
                        def = match def.next() {
                            Some(d) => d,
                            None => break,
                        };
                        function.token_def = def.id();
                        if def.text() == "=" {
                            function.kind = FuncType::OperatorEqual;
                        }
                    }
                    // constructor or destructor
                    else if def.text() == db.scope(cur).name {
                        if def.prev().is_some_and(|p| p.text() == "~") {
                            function.kind = FuncType::Destructor;
                        } else if pattern::matches(
                            Some(def),
                            &[
                                Ident,
                                Lit("("),
                                Lit("const"),
                                Ident,
                                Lit("&"),
                                OptIdent,
                                Lit(")"),
                            ],
                        ) && def.text_at(3) == db.scope(cur).name
                        {
                            function.kind = FuncType::CopyConstructor;
                        } else {
                            function.kind = FuncType::Constructor;
                        }
                    }

                    // look back to the start of the statement for a
                    // virtual/static/friend qualifier; first hit wins
                    let mut tok1 = t;
                    while let Some(p) = tok1.prev() {
                        if pattern::matches(
                            Some(p),
                            &[AnyOf(&[";", "}", "{", "public:", "protected:", "private:"])],
                        ) {
                            break;
                        }
                        match p.text() {
                            "virtual" => {
                                function.is_virtual = true;
                                break;
                            }
                            "static" => {
                                function.is_static = true;
                                break;
                            }
                            "friend" => {
                                function.is_friend = true;
                                break;
                            }
                            _ => {}
                        }
                        tok1 = p;
                    }

                    if def
                        .next()
                        .and_then(|c| c.link())
                        .and_then(|c| c.next())
                        .is_some_and(|c| c.text() == "const")
                    {
                        function.is_const = true;
                    }

                    if matches!(
                        function.kind,
                        FuncType::Constructor | FuncType::CopyConstructor
                    ) {
                        db.scope_mut(cur).num_constructors += 1;
                    }

                    // end of the argument list
                    let close = def.next().and_then(|c| c.link());

                    // declaration only: find the out-of-line definition
                    if pattern::matches(close, &[Lit(")"), Opt("const"), Lit(";")])
                        || pattern::matches(
                            close,
                            &[Lit(")"), Opt("const"), Lit("="), Lit("0"), Lit(";")],
                        )
                    {
                        let func_args = def.at(2);
                        let class_pattern: Vec<Pat> = if function.is_operator {
                            vec![Lit("operator"), Pat::text(def.text()), Lit("(")]
                        } else {
                            vec![Pat::text(def.text()), Lit("(")]
                        };

                        let mut nest = Some(cur);
                        let mut depth = 0u32;
                        let mut class_path = String::new();

                        while !function.has_body && nest.is_some() {
                            let n = nest.unwrap();
                            class_path =
                                format!("{} :: {}", db.scope(n).name, class_path);
                            depth += 1;
                            nest = db.scope(n).nest;

                            let mut search: Vec<Pat> = class_path
                                .split_whitespace()
                                .map(Pat::text)
                                .collect();
                            search.extend(class_pattern.iter().cloned());

                            // start looking at the end of the class
                            let bound = nest.map(|outer| db.scope(outer).class_end);
                            let mut found =
                                Some(tokens.cursor(db.scope(cur).class_end));
                            loop {
                                found = pattern::find(found, &search, bound);
                                let Some(mut f) = found else { break };

                                // a further-qualified name is some other scope
                                if f.prev().is_some_and(|p| p.text() == "::") {
                                    break;
                                }

                                // go to the function name
                                while f.next().is_some_and(|n2| n2.text() != "(") {
                                    f = f.next().unwrap();
                                }

                                if pattern::matches(
                                    f.next().and_then(|c| c.link()),
                                    &[Lit(")"), Opt("const"), Lit("{")],
                                ) {
                                    if args_match(func_args, f.at(2), &class_path, depth)
                                    {
                                        function.token = f.id();
                                        function.has_body = true;
                                        break;
                                    }

                                    // skip the function body
                                    let mut skip = Some(f);
                                    while let Some(s) = skip {
                                        if s.text() == "{" {
                                            break;
                                        }
                                        skip = s.next();
                                    }
                                    found = skip.and_then(|s| s.link());
                                    if found.is_none() {
                                        break;
                                    }
                                } else {
                                    found = Some(f);
                                }
                            }
                        }

                        if function.has_body {
                            debug!(
                                name = %tokens.cursor(function.token_def).text(),
                                "matched out-of-line definition"
                            );
                        }
                        db.scope_mut(cur).functions.push(function);
                        next_tok = close.and_then(|c| c.at(2));
                    }
                    // inline function
                    else {
                        function.is_inline = true;
                        function.has_body = true;
                        db.scope_mut(cur).functions.push(function);

                        // skip over the body
                        let mut body = close.and_then(|c| c.next());
                        while let Some(b) = body {
                            if b.text() == "{" {
                                break;
                            }
                            body = b.next();
                        }
                        next_tok = body.and_then(|b| b.link()).and_then(|b| b.next());
                    }
                }
            }
        }

        tok = next_tok;
    }

    debug!(scopes = db.len(), "symbol database built");
    db
}

/// Compare the argument lists of a declaration (`first`) and a
/// candidate definition (`second`), both starting just past the opening
/// parenthesis.
///
/// Parameter names may differ or be omitted on either side, `= default`
/// values on the declaration are skipped, and a type qualified by the
/// class path on one side may appear bare on the other — tried at the
/// full nesting `depth`, then with the innermost path segment dropped.
pub(crate) fn args_match(
    first: Option<Cursor<'_>>,
    second: Option<Cursor<'_>>,
    path: &str,
    depth: u32,
) -> bool {
    use Pat::{AnyOf, Ident};

    let (Some(mut first), Some(mut second)) = (first, second) else {
        return false;
    };

    while first.text() == second.text() {
        // at the end of the argument lists
        if first.text() == ")" {
            return true;
        }

        // skip default value assignment
        if first.text_at(1) == "=" {
            first = match first.at(2) {
                Some(f) => f,
                None => return false,
            };
            continue;
        }

        // definition missing a parameter name
        if first.text_at(1) == "," && second.text_at(1) != "," {
            second = match second.next() {
                Some(s) => s,
                None => return false,
            };
        } else if first.text_at(1) == ")" && second.text_at(1) != ")" {
            second = match second.next() {
                Some(s) => s,
                None => return false,
            };
        }
        // declaration missing a parameter name
        else if second.text_at(1) == "," && first.text_at(1) != "," {
            first = match first.next() {
                Some(f) => f,
                None => return false,
            };
        } else if second.text_at(1) == ")" && first.text_at(1) != ")" {
            first = match first.next() {
                Some(f) => f,
                None => return false,
            };
        }
        // different number of arguments
        else if second.text() == ")" {
            break;
        }
        // parameter names differ
        else if pattern::matches(first.next(), &[Ident, AnyOf(&[",", ")", "="])])
            && pattern::matches(second.next(), &[Ident, AnyOf(&[",", ")"])])
            && first.text_at(1) != second.text_at(1)
        {
            first = first.next().unwrap();
            second = second.next().unwrap();
            if first.text_at(1) == "=" {
                first = match first.at(2) {
                    Some(f) => f,
                    None => return false,
                };
            }
        }
        // type qualified by the class path on the definition side
        else if depth > 0 && pattern::matches(first.next(), &[Ident]) {
            let bare = first.text_at(1);
            if pattern::matches(second.next(), &qualified(path, bare)) {
                second = match second.at(depth as i32 * 2) {
                    Some(s) => s,
                    None => return false,
                };
            } else if depth > 1 {
                let short = shorten_path(path);
                if pattern::matches(second.next(), &qualified(&short, bare)) {
                    second = match second.at((depth as i32 - 1) * 2) {
                        Some(s) => s,
                        None => return false,
                    };
                }
            }
        }

        first = match first.next() {
            Some(f) => f,
            None => return false,
        };
        second = match second.next() {
            Some(s) => s,
            None => return false,
        };
    }

    false
}

/// Token pattern for `path` (a `"A :: B :: "` prefix) followed by a
/// bare type name.
fn qualified(path: &str, name: &str) -> Vec<Pat> {
    let mut pats: Vec<Pat> = path.split_whitespace().map(Pat::text).collect();
    pats.push(Pat::text(name));
    pats
}

/// Drop the innermost segment of a `"A :: B :: "` class path, yielding
/// `"A :: "`.
fn shorten_path(path: &str) -> String {
    let mut s = path.to_string();
    s.truncate(s.len().saturating_sub(4));
    while let Some(c) = s.chars().last() {
        if c == ' ' {
            break;
        }
        s.pop();
    }
    s
}

/// Collect the base class name patterns from a class header, each
/// `" :: "`-joined, in declaration order.
pub(crate) fn parse_base_list(class_tok: Cursor<'_>) -> Vec<String> {
    use Pat::{AnyOf, Ident, Lit};

    let mut bases = Vec::new();
    let mut tok = Some(class_tok);
    while let Some(c) = tok {
        if c.text() == "{" {
            break;
        }
        if pattern::matches(
            Some(c),
            &[AnyOf(&[":", ","]), AnyOf(&["public", "protected", "private"])],
        ) {
            let mut name_tok = c.at(2);
            let mut name = String::new();
            while pattern::matches(name_tok, &[Ident, Lit("::")]) {
                let n = name_tok.unwrap();
                name.push_str(n.text());
                name.push_str(" :: ");
                name_tok = n.at(2);
            }
            if let Some(n) = name_tok {
                name.push_str(n.text());
            }
            bases.push(name);
        }
        tok = c.next();
    }
    bases
}

// =============================================================================
// Tests
// =============================================================================
