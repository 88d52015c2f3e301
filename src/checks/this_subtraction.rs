//! `this - x`, which is almost always a mistyped `this->x`.

use crate::diagnostics::{Diagnostic, ErrorLogger, Severity};
use crate::token::pattern::{self, Pat};
use crate::token::Cursor;

use super::ClassAnalysis;

pub(crate) fn this_subtraction(analysis: &ClassAnalysis<'_>, logger: &mut dyn ErrorLogger) {
    use Pat::{Ident, Lit};

    if !analysis.settings().check_coding_style {
        return;
    }

    let mut tok = analysis.tokens().first();
    loop {
        let Some(t) = pattern::find(tok, &[Lit("this"), Lit("-"), Ident], None) else {
            break;
        };

        // `*this - x` is real pointer arithmetic
        if !t.prev().is_some_and(|p| p.text() == "*") {
            logger.report(this_subtraction_error(Some(t)));
        }

        tok = t.next();
    }
}

pub(crate) fn this_subtraction_error(tok: Option<Cursor<'_>>) -> Diagnostic {
    Diagnostic::at(
        tok,
        Severity::Style,
        "thisSubtraction",
        "Suspicious pointer subtraction",
    )
}
