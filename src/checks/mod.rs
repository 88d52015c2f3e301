//! The class check suite.
//!
//! Each check is an independent function over a shared, read-only
//! [`ClassAnalysis`] context; checks share no state with one another
//! and report through the [`ErrorLogger`] sink. The static [`CHECKS`]
//! registry drives [`run_checks`] and lets hosts enumerate the suite.
//!
//! The symbol database is built on first demand by whichever check
//! needs it and reused by the rest of the run.

pub mod constructors;
pub mod const_functions;
pub mod memset;
pub mod operator_eq;
pub mod private_functions;
pub mod this_subtraction;
pub mod virtual_destructor;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::diagnostics::{Diagnostic, ErrorLogger};
use crate::settings::Settings;
use crate::symboldb::{builder, SymbolDatabase};
use crate::token::TokenStream;

/// Shared context for one analysis run.
pub struct ClassAnalysis<'a> {
    tokens: &'a TokenStream,
    settings: &'a Settings,
    db: OnceCell<SymbolDatabase>,
}

impl<'a> ClassAnalysis<'a> {
    /// Create a context over a token stream.
    pub fn new(tokens: &'a TokenStream, settings: &'a Settings) -> Self {
        Self {
            tokens,
            settings,
            db: OnceCell::new(),
        }
    }

    /// The token stream under analysis.
    pub fn tokens(&self) -> &'a TokenStream {
        self.tokens
    }

    /// The active settings.
    pub fn settings(&self) -> &'a Settings {
        self.settings
    }

    /// The symbol database, built on first use.
    pub fn database(&self) -> &SymbolDatabase {
        self.db.get_or_init(|| builder::build(self.tokens))
    }
}

/// Signature shared by every check.
pub type CheckFn = fn(&ClassAnalysis<'_>, &mut dyn ErrorLogger);

/// Registry entry for one check.
pub struct CheckInfo {
    /// Stable check name.
    pub id: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Entry point.
    pub run: CheckFn,
}

/// All checks, in execution order. The memset check runs first: it is
/// the one check that must see the raw statement shapes before any of
/// the style analyses need the symbol database.
pub static CHECKS: &[CheckInfo] = &[
    CheckInfo {
        id: "noMemset",
        description: "warn if memset, memcpy etc are used on a class or struct",
        run: memset::no_memset,
    },
    CheckInfo {
        id: "constructors",
        description: "missing constructors and uninitialized member variables",
        run: constructors::constructors,
    },
    CheckInfo {
        id: "operatorEq",
        description: "'operator=' should return something",
        run: operator_eq::operator_eq,
    },
    CheckInfo {
        id: "privateFunctions",
        description: "unused private member functions",
        run: private_functions::private_functions,
    },
    CheckInfo {
        id: "operatorEqRetRefThis",
        description: "'operator=' should return reference to self",
        run: operator_eq::operator_eq_ret_ref_this,
    },
    CheckInfo {
        id: "thisSubtraction",
        description: "suspicious subtraction from 'this'",
        run: this_subtraction::this_subtraction,
    },
    CheckInfo {
        id: "operatorEqToSelf",
        description: "'operator=' should check for assignment to self",
        run: operator_eq::operator_eq_to_self,
    },
    CheckInfo {
        id: "virtualDestructor",
        description: "base classes need virtual destructors",
        run: virtual_destructor::virtual_destructor,
    },
    CheckInfo {
        id: "checkConst",
        description: "member functions that can be declared const",
        run: const_functions::check_const,
    },
];

/// Run the whole suite over a token stream.
pub fn run_checks(tokens: &TokenStream, settings: &Settings, logger: &mut dyn ErrorLogger) {
    let analysis = ClassAnalysis::new(tokens, settings);
    for check in CHECKS {
        debug!(check = check.id, "running");
        (check.run)(&analysis, logger);
    }
}

/// One exemplar diagnostic per message template the suite can produce.
///
/// Useful for hosts that list or document the possible findings; the
/// exemplars carry no tokens and placeholder names.
pub fn error_message_catalog() -> Vec<Diagnostic> {
    vec![
        constructors::no_constructor_error(None, "classname", false),
        constructors::uninit_var_error(None, "classname", "varname"),
        constructors::operator_eq_var_error(None, "classname", ""),
        private_functions::unused_private_function_error(None, "classname", "funcname"),
        memset::memset_class_error(None, "memfunc"),
        memset::memset_struct_error(None, "memfunc", "classname"),
        operator_eq::operator_eq_return_error(None),
        virtual_destructor::virtual_destructor_error(None, "Base", "Derived"),
        this_subtraction::this_subtraction_error(None),
        operator_eq::operator_eq_ret_ref_this_error(None),
        operator_eq::operator_eq_to_self_error(None),
        const_functions::check_const_error(None, "class", "function"),
    ]
}

// =============================================================================
// Tests
// =============================================================================
