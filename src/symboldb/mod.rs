//! Class symbol model recovered from the token stream.
//!
//! One [`Scope`] is recorded per `class`, `struct` or `namespace`
//! declaration, holding its member variables, its member functions and
//! a back-link to the enclosing scope. Scopes live in an arena in
//! source order; `nest` back-links are arena indices, so the enclosing
//! relation forms a forest without ownership cycles. A name index with
//! duplicate keys sits on top, because the same unqualified name can
//! occur in different enclosing scopes.
//!
//! The database is built once per analysis run and is read-only
//! afterwards; checks that need transient per-variable state clone the
//! variable list of the scope they are looking at.

pub mod builder;
pub mod varlist;

use rustc_hash::FxHashMap;

use crate::token::TokenId;

/// Member access level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessControl {
    Public,
    Protected,
    Private,
}

/// One data member of a class or struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Var {
    /// Variable name.
    pub name: String,
    /// Transient initialization bit, used by the constructor dataflow.
    pub init: bool,
    /// Declared in a private section.
    pub is_private: bool,
    /// Declared `mutable`.
    pub is_mutable: bool,
    /// Declared `static`.
    pub is_static: bool,
    /// The type is not a built-in scalar; such members are assumed to
    /// initialize themselves.
    pub is_class: bool,
}

/// Classification of a member function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuncType {
    Constructor,
    CopyConstructor,
    OperatorEqual,
    Destructor,
    Function,
}

/// One member function of a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Func {
    /// Name token at the declaration inside the class body.
    pub token_def: TokenId,
    /// Name token at the implementation. Equals `token_def` for inline
    /// functions and for declarations whose body was not found.
    pub token: TokenId,
    /// Access level at the declaration site.
    pub access: AccessControl,
    /// An implementation was found.
    pub has_body: bool,
    /// Defined inside the class body.
    pub is_inline: bool,
    /// Declared `const`.
    pub is_const: bool,
    /// Declared `virtual`.
    pub is_virtual: bool,
    /// Declared `static`.
    pub is_static: bool,
    /// Declared `friend`.
    pub is_friend: bool,
    /// An `operator` function.
    pub is_operator: bool,
    /// Constructor, destructor, `operator=`, or plain function.
    pub kind: FuncType,
}

/// Index of a scope in the database arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

/// One `class`, `struct` or `namespace` record.
#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    /// Declared with the `namespace` keyword.
    pub is_namespace: bool,
    /// Unqualified name.
    pub name: String,
    /// The `class`/`struct`/`namespace` keyword token.
    pub class_def: TokenId,
    /// The opening `{` of the body.
    pub class_start: TokenId,
    /// The closing `}` of the body.
    pub class_end: TokenId,
    /// Count of constructors and copy constructors.
    pub num_constructors: u32,
    /// Member functions in declaration order.
    pub functions: Vec<Func>,
    /// Member variables in declaration order.
    pub vars: Vec<Var>,
    /// Base class name patterns, each a `" :: "`-joined qualified name.
    pub derived_from: Vec<String>,
    /// Enclosing scope, if any.
    pub nest: Option<ScopeId>,
    /// Access level the parser ended on; starts public for structs,
    /// private for classes.
    pub access: AccessControl,
}

/// All scopes of a translation unit.
#[derive(Debug, Default)]
pub struct SymbolDatabase {
    scopes: Vec<Scope>,
    by_name: FxHashMap<String, Vec<ScopeId>>,
}

impl SymbolDatabase {
    /// Scopes in source order.
    pub fn scopes(&self) -> impl Iterator<Item = (ScopeId, &Scope)> {
        self.scopes
            .iter()
            .enumerate()
            .map(|(i, s)| (ScopeId(i as u32), s))
    }

    /// Look up a scope record.
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    /// All scopes sharing an unqualified name, in source order.
    pub fn with_name(&self, name: &str) -> &[ScopeId] {
        self.by_name.get(name).map_or(&[], |ids| ids.as_slice())
    }

    /// Number of recorded scopes.
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// True when no scopes were recorded.
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Name of a scope qualified by its enclosing scopes
    /// (`Outer::Inner`).
    pub fn qualified_name(&self, id: ScopeId) -> String {
        let mut name = self.scope(id).name.clone();
        let mut nest = self.scope(id).nest;
        while let Some(n) = nest {
            name = format!("{}::{}", self.scope(n).name, name);
            nest = self.scope(n).nest;
        }
        name
    }

    pub(crate) fn push(&mut self, scope: Scope) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.by_name.entry(scope.name.clone()).or_default().push(id);
        self.scopes.push(scope);
        id
    }

    pub(crate) fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0 as usize]
    }
}
