//! Base classes that are missing a virtual destructor.
//!
//! Reported only when it can bite: the derived class has a non-empty
//! destructor, the inheritance is public, and the base destructor is
//! declared in a public section (a protected or private destructor
//! already prevents deletion through a base pointer). Bases that have
//! base classes of their own are skipped, since one of those may
//! provide the virtual destructor.
//!
//! The whole check is inconclusive-only: it cannot see whether a
//! derived object is ever actually deleted through a base pointer.

use crate::diagnostics::{Diagnostic, ErrorLogger, Severity};
use crate::token::pattern::{self, Pat};
use crate::token::Cursor;

use super::ClassAnalysis;

pub(crate) fn virtual_destructor(analysis: &ClassAnalysis<'_>, logger: &mut dyn ErrorLogger) {
    use Pat::{Any, AnyOf, Ident, Lit};

    if !analysis.settings().inconclusive {
        return;
    }

    let tokens = analysis.tokens();
    let decl_pats = [Lit("class"), Ident, Lit(":"), Ident];

    let mut derived_opt = pattern::find(tokens.first(), &decl_pats, None);
    while let Some(derived_start) = derived_opt {
        // the derived class must have a non-empty destructor
        let dtor_pats = [
            Lit("~"),
            Pat::text(derived_start.text_at(1)),
            Lit("("),
            Lit(")"),
            Lit("{"),
        ];
        let Some(dtor) = pattern::find(tokens.first(), &dtor_pats, None) else {
            derived_opt = pattern::find(derived_start.next(), &decl_pats, None);
            continue;
        };
        if pattern::matches(
            Some(dtor),
            &[Lit("~"), Ident, Lit("("), Lit(")"), Lit("{"), Lit("}")],
        ) {
            derived_opt = pattern::find(derived_start.next(), &decl_pats, None);
            continue;
        }

        let derived_class = derived_start.next().unwrap();

        // iterate the base classes
        let mut base_iter = derived_start.at(3);
        while pattern::matches(base_iter, &[Ident]) {
            let mut d = base_iter.unwrap();
            let is_public = d.text() == "public";
            if pattern::matches(Some(d), &[AnyOf(&["public", "protected", "private"])]) {
                d = match d.next() {
                    Some(n) => n,
                    None => break,
                };
            }
            let base_name = d.text().to_string();

            // position on the next base for the following round
            let mut adv = Some(d);
            while let Some(c) = adv {
                if c.text() == "{" {
                    break;
                }
                if c.text() == "," {
                    adv = c.next();
                    break;
                }
                adv = c.next();
            }
            base_iter = adv;

            // non-public inheritance cannot be deleted through the base
            if !is_public {
                continue;
            }

            // find the base destructor declaration
            let base_dtor_pats = [Any, Lit("~"), Pat::text(&base_name), Lit("(")];
            let mut base = pattern::find(tokens.first(), &base_dtor_pats, None);
            while let Some(b) = base {
                if b.text() != "::" {
                    break;
                }
                base = pattern::find(b.next(), &base_dtor_pats, None);
            }
            let reverse_tok = base;

            // walk left through the declaration looking for `virtual`
            let mut decl = base;
            while let Some(c) = decl {
                if !c.is_name() || c.text() == "virtual" {
                    break;
                }
                decl = c.prev();
            }

            let class_decl_pats = [Lit("class"), Pat::text(&base_name), Lit("{")];
            match decl {
                // no destructor at all: report if the base class body is
                // in this translation unit
                None => {
                    if let Some(cls) = pattern::find(tokens.first(), &class_decl_pats, None)
                    {
                        logger.report(virtual_destructor_error(
                            Some(cls),
                            &base_name,
                            derived_class.text(),
                        ));
                    }
                    continue;
                }
                Some(c) if c.text() == "virtual" => continue,
                Some(found) => {
                    // a base with its own base list may inherit a virtual
                    // destructor; skip those
                    if pattern::find(tokens.first(), &class_decl_pats, None).is_none() {
                        continue;
                    }

                    // the destructor must be public to matter
                    let mut indent = 0i32;
                    let mut back = reverse_tok;
                    while let Some(c) = back {
                        if c.text() == "public:" {
                            logger.report(virtual_destructor_error(
                                Some(found),
                                &base_name,
                                derived_class.text(),
                            ));
                            break;
                        } else if c.text() == "protected:" || c.text() == "private:" {
                            break;
                        } else if c.text() == "{" {
                            indent += 1;
                            if indent >= 1 {
                                // start of the class with no access label
                                // seen: the destructor is not public
                                break;
                            }
                        } else if c.text() == "}" {
                            indent -= 1;
                        }
                        back = c.prev();
                    }
                }
            }
        }

        derived_opt = match base_iter {
            Some(c) => pattern::find(Some(c), &decl_pats, None),
            None => None,
        };
    }
}

pub(crate) fn virtual_destructor_error(
    tok: Option<Cursor<'_>>,
    base: &str,
    derived: &str,
) -> Diagnostic {
    Diagnostic::at(
        tok,
        Severity::Error,
        "virtualDestructor",
        format!(
            "Class {base} which is inherited by class {derived} does not have a virtual destructor"
        ),
    )
}
