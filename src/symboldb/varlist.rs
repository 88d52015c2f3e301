//! Member variable extraction from a class body.
//!
//! Walks the tokens of a `class`/`struct` body at brace depth one and
//! collects the data members it can classify, in declaration order.
//! Forms that do not fit any of the recognized declaration shapes
//! produce no entry; there is no error path.

use crate::token::pattern::{self, Pat};
use crate::token::Cursor;

use super::Var;

/// Extract the member variables of the class whose header starts at
/// `class_def` (the `class`/`struct` keyword token).
pub fn extract(class_def: Cursor<'_>) -> Vec<Var> {
    use Pat::{AnyOf, Ident, Lit, TypeName};

    let mut vars = Vec::new();
    let mut indent = 0u32;
    let is_struct = class_def.text() == "struct";
    let mut in_private = !is_struct;

    let mut tok = Some(class_def);
    while let Some(t) = tok {
        if t.next().is_none() {
            break;
        }

        if t.text() == "{" {
            indent += 1;
        } else if t.text() == "}" {
            if indent <= 1 {
                break;
            }
            indent -= 1;
        }

        if indent != 1 {
            tok = t.next();
            continue;
        }

        // Members of a __published section are initialized by the
        // runtime; skip ahead to the next access label.
        if t.text() == "__published:" {
            in_private = false;
            let mut cur = Some(t);
            let mut resume = None;
            while let Some(mut c) = cur {
                if c.text() == "{" {
                    if let Some(l) = c.link() {
                        c = l;
                    }
                }
                if pattern::matches(
                    c.next(),
                    &[AnyOf(&["private:", "protected:", "public:"])],
                ) {
                    resume = Some(c);
                    break;
                }
                cur = c.next();
            }
            match resume {
                Some(c) => {
                    tok = c.next();
                    continue;
                }
                None => break,
            }
        }

        // access labels are single tokens carrying their colon
        let is_label = !t.text().starts_with(':') && t.text().contains(':');
        if is_label {
            in_private = t.text() == "private:";
        }

        // only look at statement starts
        if !pattern::matches(Some(t), &[AnyOf(&[";", "{", "}"])]) && !is_label {
            tok = t.next();
            continue;
        }

        let mut next = match t.next() {
            Some(n) => n,
            None => break,
        };

        // a token still containing ':' here is a label of some kind,
        // not a declaration
        if next.text().contains(':') {
            tok = t.next();
            continue;
        }

        // Borland property, not a data member
        if next.text() == "__property" {
            tok = t.next();
            continue;
        }

        if next.text() == "const" {
            match next.next() {
                Some(n) => next = n,
                None => break,
            }
        }

        let is_static = next.text() == "static";
        if is_static {
            match next.next() {
                Some(n) => next = n,
                None => break,
            }
        }

        let is_mutable = next.text() == "mutable";
        if is_mutable {
            match next.next() {
                Some(n) => next = n,
                None => break,
            }
        }

        if next.text() == "const" {
            match next.next() {
                Some(n) => next = n,
                None => break,
            }
        }

        let mut is_class = false;
        let mut varname = "";

        // scalar or object: T v ;  (also bitfields, T v : n)
        if pattern::matches(Some(next), &[TypeName, Ident, AnyOf(&[";", ":"])]) {
            if !next.is_standard_type() {
                is_class = true;
            }
            varname = next.text_at(1);
        }
        // nested tag: struct|union T v ;
        else if pattern::matches(
            Some(next),
            &[AnyOf(&["struct", "union"]), TypeName, Ident, Lit(";")],
        ) {
            varname = next.text_at(2);
        }
        // pointers
        else if pattern::matches(Some(next), &[TypeName, Lit("*"), Ident, Lit(";")]) {
            varname = next.text_at(2);
        } else if pattern::matches(
            Some(next),
            &[TypeName, TypeName, Lit("*"), Ident, Lit(";")],
        ) {
            varname = next.text_at(3);
        } else if pattern::matches(
            Some(next),
            &[TypeName, Lit("::"), TypeName, Lit("*"), Ident, Lit(";")],
        ) {
            varname = next.text_at(4);
        }
        // array: T v [
        else if pattern::matches(Some(next), &[TypeName, Ident, Lit("[")])
            && next.text_at(1) != "operator"
        {
            if !next.is_standard_type() {
                is_class = true;
            }
            varname = next.text_at(1);
        }
        // pointer arrays
        else if pattern::matches(Some(next), &[TypeName, Lit("*"), Ident, Lit("[")]) {
            varname = next.text_at(2);
        } else if pattern::matches(
            Some(next),
            &[TypeName, Lit("::"), TypeName, Lit("*"), Ident, Lit("[")],
        ) {
            varname = next.text_at(4);
        }
        // qualified object: T :: T2 v ;
        else if pattern::matches(
            Some(next),
            &[TypeName, Lit("::"), TypeName, Ident, Lit(";")],
        ) {
            is_class = true;
            varname = next.text_at(3);
        }
        // template: T < ... > v ;  with optional qualification and *
        else if pattern::matches(Some(next), &[TypeName, Lit("::"), TypeName, Lit("<")])
            || pattern::matches(Some(next), &[TypeName, Lit("<")])
        {
            is_class = true;
            // find the matching ">"
            let mut level = 0i32;
            let mut cur = Some(next);
            while let Some(c) = cur {
                if c.text() == "<" {
                    level += 1;
                } else if c.text() == ">" {
                    level -= 1;
                    if level == 0 {
                        break;
                    }
                }
                cur = c.next();
            }
            if let Some(c) = cur {
                if pattern::matches(Some(c), &[Lit(">"), Ident, Lit(";")]) {
                    varname = c.text_at(1);
                } else if pattern::matches(Some(c), &[Lit(">"), Lit("*"), Ident, Lit(";")]) {
                    varname = c.text_at(2);
                }
            }
        }

        if !varname.is_empty() && varname != "operator" {
            vars.push(Var {
                name: varname.to_string(),
                init: false,
                is_private: in_private,
                is_mutable,
                is_static,
                is_class,
            });
        }

        tok = t.next();
    }

    vars
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;

    fn vars_of(code: &str) -> Vec<Var> {
        let stream = tokenize(code).unwrap();
        extract(stream.first().unwrap())
    }

    fn names(vars: &[Var]) -> Vec<&str> {
        vars.iter().map(|v| v.name.as_str()).collect()
    }

    #[test]
    fn test_scalar_members_in_order() {
        let vars = vars_of("class A { int x ; char y ; } ;");
        assert_eq!(names(&vars), ["x", "y"]);
        assert!(!vars[0].is_class);
        assert!(vars[0].is_private);
    }

    #[test]
    fn test_struct_members_are_public() {
        let vars = vars_of("struct S { int x ; } ;");
        assert!(!vars[0].is_private);
    }

    #[test]
    fn test_access_labels_flip_privacy() {
        let vars = vars_of("class A { public: int a ; private: int b ; protected: int c ; } ;");
        assert!(!vars[0].is_private);
        assert!(vars[1].is_private);
        assert!(!vars[2].is_private);
    }

    #[test]
    fn test_user_type_is_class() {
        let vars = vars_of("class A { Widget w ; } ;");
        assert!(vars[0].is_class);
    }

    #[test]
    fn test_pointers_are_not_class() {
        let vars = vars_of("class A { Widget * p ; unsigned int * q ; std :: string * r ; } ;");
        assert_eq!(names(&vars), ["p", "q", "r"]);
        assert!(vars.iter().all(|v| !v.is_class));
    }

    #[test]
    fn test_arrays() {
        let vars = vars_of("class A { int buf [ 10 ] ; Widget ws [ 2 ] ; char * names [ 4 ] ; } ;");
        assert_eq!(names(&vars), ["buf", "ws", "names"]);
        assert!(!vars[0].is_class);
        assert!(vars[1].is_class);
        assert!(!vars[2].is_class);
    }

    #[test]
    fn test_qualified_and_template_members() {
        let vars = vars_of(
            "class A { std :: string s ; std :: vector < int > v ; std :: map < int , int > * pm ; } ;",
        );
        assert_eq!(names(&vars), ["s", "v", "pm"]);
        assert!(vars.iter().all(|v| v.is_class));
    }

    #[test]
    fn test_static_mutable_const_qualifiers() {
        let vars = vars_of(
            "class A { static int count ; mutable int cache ; const int limit ; } ;",
        );
        assert_eq!(names(&vars), ["count", "cache", "limit"]);
        assert!(vars[0].is_static);
        assert!(vars[1].is_mutable);
        assert!(!vars[2].is_static);
    }

    #[test]
    fn test_bitfield() {
        let vars = vars_of("class A { int flags : 3 ; } ;");
        assert_eq!(names(&vars), ["flags"]);
    }

    #[test]
    fn test_published_section_is_skipped() {
        let vars = vars_of("class A { __published: int p ; private: int q ; } ;");
        assert_eq!(names(&vars), ["q"]);
    }

    #[test]
    fn test_methods_and_nested_bodies_yield_no_vars() {
        let vars = vars_of("class A { void f ( ) { int local ; } int x ; } ;");
        assert_eq!(names(&vars), ["x"]);
    }

    #[test]
    fn test_nested_class_members_excluded() {
        let vars = vars_of("class A { class B { int inner ; } ; int outer ; } ;");
        assert_eq!(names(&vars), ["outer"]);
    }
}
