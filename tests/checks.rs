//! End-to-end scenarios for the class check suite.

use classcheck::{check_source, check_sources, Diagnostic, Settings, Severity};

fn check(code: &str) -> Vec<Diagnostic> {
    check_source(code, &Settings::default()).expect("code should tokenize")
}

fn check_inconclusive(code: &str) -> Vec<Diagnostic> {
    let settings = Settings {
        inconclusive: true,
        ..Settings::default()
    };
    check_source(code, &settings).expect("code should tokenize")
}

fn with_id<'a>(diagnostics: &'a [Diagnostic], id: &str) -> Vec<&'a Diagnostic> {
    diagnostics.iter().filter(|d| d.id == id).collect()
}

// ── constructors ────────────────────────────────────────────────────────

#[test]
fn test_no_constructor_with_private_member() {
    let diagnostics = check("class A { private: int x ; } ;");
    let found = with_id(&diagnostics, "noConstructor");
    assert_eq!(found.len(), 1, "should flag a class without constructor");
    assert!(found[0].message.contains("'A'"));
    assert_eq!(found[0].severity, Severity::Style);
}

#[test]
fn test_no_constructor_requires_plain_private_member() {
    // public, static and class-typed members do not need a constructor
    assert!(with_id(&check("class A { public: int x ; } ;"), "noConstructor").is_empty());
    assert!(with_id(
        &check("class A { private: static int x ; } ;"),
        "noConstructor"
    )
    .is_empty());
    assert!(with_id(
        &check("class A { private: std :: string s ; } ;"),
        "noConstructor"
    )
    .is_empty());
}

#[test]
fn test_constructor_silences_no_constructor() {
    let diagnostics = check("class A { private: int x ; public: A ( ) { x = 0 ; } } ;");
    assert!(with_id(&diagnostics, "noConstructor").is_empty());
    assert!(with_id(&diagnostics, "uninitVar").is_empty());
}

#[test]
fn test_uninitialized_member_in_constructor() {
    let diagnostics = check("class A { public: A ( ) { } int x ; } ;");
    let found = with_id(&diagnostics, "uninitVar");
    assert_eq!(found.len(), 1, "x is never initialized");
    assert!(found[0].message.contains("'A::x'"));
}

#[test]
fn test_uninitialized_members_reported_in_declaration_order() {
    let diagnostics = check("class A { public: A ( ) { } int x ; int y ; } ;");
    let found = with_id(&diagnostics, "uninitVar");
    assert_eq!(found.len(), 2);
    assert!(found[0].message.contains("'A::x'"));
    assert!(found[1].message.contains("'A::y'"));
}

#[test]
fn test_initializer_list_counts() {
    let diagnostics = check("class A { public: A ( ) : x ( 0 ) { } int x ; } ;");
    assert!(with_id(&diagnostics, "uninitVar").is_empty());
}

#[test]
fn test_out_of_line_constructor_initializer_list() {
    let diagnostics = check(
        "class A { public: A ( ) ; int x ; } ; A :: A ( ) : x ( 0 ) { }",
    );
    assert!(with_id(&diagnostics, "uninitVar").is_empty());
}

#[test]
fn test_copy_constructor_is_analyzed() {
    let diagnostics =
        check("class A { public: A ( const A & other ) { } int x ; } ;");
    assert_eq!(with_id(&diagnostics, "uninitVar").len(), 1);
}

#[test]
fn test_class_member_assumed_self_initializing() {
    let diagnostics = check("class A { public: A ( ) { } std :: string s ; } ;");
    assert!(with_id(&diagnostics, "uninitVar").is_empty());
}

#[test]
fn test_static_member_needs_no_initialization() {
    let diagnostics = check("class A { public: A ( ) { } static int count ; } ;");
    assert!(with_id(&diagnostics, "uninitVar").is_empty());
}

#[test]
fn test_private_constructor_not_reported() {
    let diagnostics = check("class A { A ( ) { } int x ; } ;");
    assert!(with_id(&diagnostics, "uninitVar").is_empty());
}

#[test]
fn test_memset_in_constructor_initializes_everything() {
    let diagnostics = check(
        "class A { public: A ( ) { memset ( this , 0 , sizeof ( A ) ) ; } int x ; } ;",
    );
    assert!(with_id(&diagnostics, "uninitVar").is_empty());
}

#[test]
fn test_member_function_call_is_followed() {
    let diagnostics = check(
        "class A { public: A ( ) { init ( ) ; } int x ; private: void init ( ) { x = 0 ; } } ;",
    );
    assert!(with_id(&diagnostics, "uninitVar").is_empty());
}

#[test]
fn test_unresolvable_member_call_bails_out() {
    // setup() is declared but its body is elsewhere; assume the best
    let diagnostics =
        check("class A { public: A ( ) { setup ( ) ; } int x ; void setup ( ) ; } ;");
    assert!(with_id(&diagnostics, "uninitVar").is_empty());
}

#[test]
fn test_operator_eq_leaving_member_unassigned() {
    let diagnostics =
        check("class A { int x ; public: void operator = ( const A & a ) { } } ;");
    let found = with_id(&diagnostics, "operatorEqVarError");
    assert_eq!(found.len(), 1);
    assert!(found[0].message.contains("'A::x'"));
}

// ── noMemset ────────────────────────────────────────────────────────────

#[test]
fn test_memset_on_struct_with_std_string() {
    let diagnostics = check(
        "struct S { std :: string s ; } ; \
         void f ( S * p ) { memset ( p , 0 , sizeof ( S ) ) ; }",
    );
    let found = with_id(&diagnostics, "memsetStruct");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].severity, Severity::Error);
    assert_eq!(
        found[0].message,
        "Using 'memset' on struct that contains a 'std::string'"
    );
}

#[test]
fn test_memset_on_address_of_object() {
    let diagnostics = check(
        "struct S { std :: string s ; } ; \
         void f ( ) { S s ; memset ( & s , 0 , sizeof ( S ) ) ; }",
    );
    assert_eq!(with_id(&diagnostics, "memsetStruct").len(), 1);
}

#[test]
fn test_memcpy_on_struct_with_container() {
    let diagnostics = check(
        "struct S { std :: vector < int > v ; } ; \
         void f ( S * p , S * q ) { memcpy ( p , q , sizeof ( S ) ) ; }",
    );
    let found = with_id(&diagnostics, "memsetStruct");
    assert_eq!(found.len(), 1);
    assert!(found[0].message.contains("'std::vector'"));
    assert!(found[0].message.contains("memcpy"));
}

#[test]
fn test_memset_member_after_method_body_still_seen() {
    let diagnostics = check(
        "struct S { void reset ( ) { } std :: string s ; } ; \
         void f ( S * p ) { memset ( p , 0 , sizeof ( S ) ) ; }",
    );
    assert_eq!(with_id(&diagnostics, "memsetStruct").len(), 1);
}

#[test]
fn test_memset_on_plain_struct_is_fine() {
    let diagnostics = check(
        "struct S { int a ; char b [ 4 ] ; } ; \
         void f ( S * p ) { memset ( p , 0 , sizeof ( S ) ) ; }",
    );
    assert!(with_id(&diagnostics, "memsetStruct").is_empty());
}

#[test]
fn test_memset_pointer_member_is_fine() {
    let diagnostics = check(
        "struct S { std :: vector < int > * v ; } ; \
         void f ( S * p ) { memset ( p , 0 , sizeof ( S ) ) ; }",
    );
    assert!(with_id(&diagnostics, "memsetStruct").is_empty());
}

// ── operatorEq ──────────────────────────────────────────────────────────

#[test]
fn test_operator_eq_returning_void() {
    let diagnostics = check("class A { public: void operator = ( const A & ) ; } ;");
    let found = with_id(&diagnostics, "operatorEq");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message, "'operator=' should return something");
}

#[test]
fn test_private_operator_eq_not_reported() {
    let diagnostics = check("class A { void operator = ( const A & ) ; } ;");
    assert!(with_id(&diagnostics, "operatorEq").is_empty());
}

#[test]
fn test_operator_eq_returning_reference_is_fine() {
    let diagnostics = check("class A { public: A & operator = ( const A & ) ; } ;");
    assert!(with_id(&diagnostics, "operatorEq").is_empty());
}

// ── operatorEqRetRefThis ────────────────────────────────────────────────

#[test]
fn test_operator_eq_returning_parameter() {
    let diagnostics = check(
        "class A { public: A & operator = ( const A & a ) { return a ; } } ;",
    );
    assert_eq!(with_id(&diagnostics, "operatorEqRetRefThis").len(), 1);
}

#[test]
fn test_operator_eq_without_return() {
    let diagnostics =
        check("class A { public: A & operator = ( const A & a ) { } } ;");
    assert_eq!(with_id(&diagnostics, "operatorEqRetRefThis").len(), 1);
}

#[test]
fn test_operator_eq_returning_this_is_fine() {
    let diagnostics = check(
        "class A { int x ; public: A & operator = ( const A & a ) { x = a . x ; return * this ; } } ;",
    );
    assert!(with_id(&diagnostics, "operatorEqRetRefThis").is_empty());
}

// ── operatorEqToSelf ────────────────────────────────────────────────────

#[test]
fn test_operator_eq_to_self_delete_then_new() {
    let diagnostics = check(
        "class A { int * p ; public: A & operator = ( const A & r ) { \
         delete p ; p = new int ; return * this ; } } ;",
    );
    let found = with_id(&diagnostics, "operatorEqToSelf");
    assert_eq!(found.len(), 1);
    assert_eq!(
        found[0].message,
        "'operator=' should check for assignment to self"
    );
}

#[test]
fn test_operator_eq_to_self_guard_accepted() {
    let diagnostics = check(
        "class A { int * p ; public: A & operator = ( const A & r ) { \
         if ( this != & r ) { delete p ; p = new int ; } return * this ; } } ;",
    );
    assert!(with_id(&diagnostics, "operatorEqToSelf").is_empty());
}

#[test]
fn test_operator_eq_to_self_out_of_line() {
    let diagnostics = check(
        "class A { int * p ; public: A & operator = ( const A & r ) ; } ; \
         A & A :: operator = ( const A & r ) { delete p ; p = new int ; return * this ; }",
    );
    assert_eq!(with_id(&diagnostics, "operatorEqToSelf").len(), 1);
}

#[test]
fn test_operator_eq_to_self_skips_multiple_inheritance() {
    let diagnostics = check(
        "class A : public B , public C { int * p ; public: A & operator = ( const A & r ) { \
         delete p ; p = new int ; return * this ; } } ;",
    );
    assert!(with_id(&diagnostics, "operatorEqToSelf").is_empty());
}

#[test]
fn test_operator_eq_without_deallocation_is_fine() {
    let diagnostics = check(
        "class A { int x ; public: A & operator = ( const A & r ) { \
         x = r . x ; return * this ; } } ;",
    );
    assert!(with_id(&diagnostics, "operatorEqToSelf").is_empty());
}

// ── virtualDestructor ───────────────────────────────────────────────────

#[test]
fn test_base_without_virtual_destructor() {
    let code = "class B { public: ~ B ( ) { } } ; \
                class D : public B { public: ~ D ( ) { int x = 1 ; } } ;";
    let found_diags = check_inconclusive(code);
    let found = with_id(&found_diags, "virtualDestructor");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].severity, Severity::Error);
    assert_eq!(
        found[0].message,
        "Class B which is inherited by class D does not have a virtual destructor"
    );
}

#[test]
fn test_virtual_destructor_check_is_inconclusive_only() {
    let code = "class B { public: ~ B ( ) { } } ; \
                class D : public B { public: ~ D ( ) { int x = 1 ; } } ;";
    assert!(with_id(&check(code), "virtualDestructor").is_empty());
}

#[test]
fn test_virtual_destructor_present() {
    let diagnostics = check_inconclusive(
        "class B { public: virtual ~ B ( ) { } } ; \
         class D : public B { public: ~ D ( ) { int x = 1 ; } } ;",
    );
    assert!(with_id(&diagnostics, "virtualDestructor").is_empty());
}

#[test]
fn test_protected_destructor_is_fine() {
    let diagnostics = check_inconclusive(
        "class B { protected: ~ B ( ) { } } ; \
         class D : public B { public: ~ D ( ) { int x = 1 ; } } ;",
    );
    assert!(with_id(&diagnostics, "virtualDestructor").is_empty());
}

#[test]
fn test_empty_derived_destructor_is_fine() {
    let diagnostics = check_inconclusive(
        "class B { public: ~ B ( ) { } } ; \
         class D : public B { public: ~ D ( ) { } } ;",
    );
    assert!(with_id(&diagnostics, "virtualDestructor").is_empty());
}

#[test]
fn test_private_inheritance_is_fine() {
    let diagnostics = check_inconclusive(
        "class B { public: ~ B ( ) { } } ; \
         class D : private B { public: ~ D ( ) { int x = 1 ; } } ;",
    );
    assert!(with_id(&diagnostics, "virtualDestructor").is_empty());
}

// ── thisSubtraction ─────────────────────────────────────────────────────

#[test]
fn test_this_minus_name() {
    let diagnostics = check("int f ( int offset ) { return this - offset ; }");
    assert_eq!(with_id(&diagnostics, "thisSubtraction").len(), 1);
}

#[test]
fn test_dereferenced_this_subtraction_is_fine() {
    let diagnostics = check("int f ( A other ) { return * this - other ; }");
    assert!(with_id(&diagnostics, "thisSubtraction").is_empty());
}

// ── checkConst ──────────────────────────────────────────────────────────

#[test]
fn test_getter_can_be_const() {
    let diagnostics = check("class A { int x ; public: int get ( ) { return x ; } } ;");
    let found = with_id(&diagnostics, "functionConst");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message, "The function 'A::get' can be const");
}

#[test]
fn test_setter_cannot_be_const() {
    let diagnostics =
        check("class A { int x ; public: void set ( int v ) { x = v ; } } ;");
    assert!(with_id(&diagnostics, "functionConst").is_empty());
}

#[test]
fn test_compound_assignment_blocks_const() {
    let diagnostics =
        check("class A { int x ; public: void bump ( int v ) { x += v ; } } ;");
    assert!(with_id(&diagnostics, "functionConst").is_empty());
}

#[test]
fn test_increment_blocks_const() {
    let diagnostics = check("class A { int x ; public: void bump ( ) { x ++ ; } } ;");
    assert!(with_id(&diagnostics, "functionConst").is_empty());
}

#[test]
fn test_mutable_member_does_not_block_const() {
    let diagnostics = check(
        "class A { mutable int cache ; public: int get ( ) { cache = 1 ; return cache ; } } ;",
    );
    assert_eq!(with_id(&diagnostics, "functionConst").len(), 1);
}

#[test]
fn test_function_call_blocks_const() {
    let diagnostics = check(
        "class A { int x ; public: int get ( ) { update ( ) ; return x ; } } ;",
    );
    assert!(with_id(&diagnostics, "functionConst").is_empty());
}

#[test]
fn test_already_const_not_reported() {
    let diagnostics =
        check("class A { int x ; public: int get ( ) const { return x ; } } ;");
    assert!(with_id(&diagnostics, "functionConst").is_empty());
}

#[test]
fn test_out_of_line_const_candidate_carries_both_tokens() {
    let diagnostics = check(
        "class A { int x ; public: int get ( ) ; } ; int A :: get ( ) { return x ; }",
    );
    let found = with_id(&diagnostics, "functionConst");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].tokens.len(), 2);
}

#[test]
fn test_virtual_override_not_reported() {
    let diagnostics = check(
        "class B { public: virtual int f ( ) ; } ; \
         class D : public B { int x ; public: int f ( ) { return x ; } } ;",
    );
    assert!(with_id(&diagnostics, "functionConst").is_empty());
}

#[test]
fn test_all_caps_return_type_skipped() {
    let diagnostics =
        check("class A { public: LPVOID handle ( ) { return 0 ; } } ;");
    assert!(with_id(&diagnostics, "functionConst").is_empty());
}

#[test]
fn test_base_class_member_write_blocks_const() {
    let diagnostics = check(
        "class B { public: int y ; } ; \
         class D : public B { public: void set ( int v ) { y = v ; } } ;",
    );
    assert!(with_id(&diagnostics, "functionConst").is_empty());
}

#[test]
fn test_ifcfg_disables_check_const() {
    let settings = Settings {
        ifcfg: true,
        ..Settings::default()
    };
    let diagnostics = check_source(
        "class A { int x ; public: int get ( ) { return x ; } } ;",
        &settings,
    )
    .unwrap();
    assert!(with_id(&diagnostics, "functionConst").is_empty());
    // the rest of the suite still runs
    assert_eq!(with_id(&diagnostics, "noConstructor").len(), 1);
}

// ── privateFunctions ────────────────────────────────────────────────────

#[test]
fn test_unused_private_function() {
    let diagnostics = check(
        "class A { void f ( ) ; public: A ( ) ; } ; \
         A :: A ( ) { } void A :: f ( ) { }",
    );
    let found = with_id(&diagnostics, "unusedPrivateFunction");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message, "Unused private function 'A::f'");
}

#[test]
fn test_called_private_function_not_reported() {
    let diagnostics = check(
        "class A { void f ( ) { } public: A ( ) { f ( ) ; } } ;",
    );
    assert!(with_id(&diagnostics, "unusedPrivateFunction").is_empty());
}

#[test]
fn test_initializer_list_call_counts_as_use() {
    let diagnostics = check(
        "class A { int defaultValue ( ) ; int x ; public: A ( ) ; } ; \
         A :: A ( ) : x ( defaultValue ( ) ) { } int A :: defaultValue ( ) { return 0 ; }",
    );
    assert!(with_id(&diagnostics, "unusedPrivateFunction").is_empty());
}

#[test]
fn test_friend_disables_private_function_check() {
    let diagnostics = check(
        "class A { friend class B ; void f ( ) { } public: A ( ) { } } ;",
    );
    assert!(with_id(&diagnostics, "unusedPrivateFunction").is_empty());
}

#[test]
fn test_nested_class_disables_private_function_check() {
    let diagnostics = check(
        "class A { void f ( ) { } class Inner { } ; public: A ( ) { } } ;",
    );
    assert!(with_id(&diagnostics, "unusedPrivateFunction").is_empty());
}

#[test]
fn test_class_in_secondary_file_skipped() {
    let settings = Settings::default();
    let diagnostics = check_sources(
        &["int main ( ) { return 0 ; }", "class A { void f ( ) ; } ;"],
        &settings,
    )
    .unwrap();
    assert!(with_id(&diagnostics, "unusedPrivateFunction").is_empty());
}

#[test]
fn test_function_pointer_reference_counts_as_use() {
    let diagnostics = check(
        "class A { void f ( ) ; public: A ( ) ; } ; \
         A :: A ( ) { callback = f ; } void A :: f ( ) { }",
    );
    assert!(with_id(&diagnostics, "unusedPrivateFunction").is_empty());
}

// ── suite behavior ──────────────────────────────────────────────────────

#[test]
fn test_style_checks_can_be_disabled() {
    let settings = Settings {
        check_coding_style: false,
        ..Settings::default()
    };

    let diagnostics = check_source(
        "class A { public: A ( ) { } int x ; } ;",
        &settings,
    )
    .unwrap();
    assert!(diagnostics.is_empty(), "style findings should be gated");

    // the memset check is not a style check
    let diagnostics = check_source(
        "struct S { std :: string s ; } ; \
         void f ( S * p ) { memset ( p , 0 , sizeof ( S ) ) ; }",
        &settings,
    )
    .unwrap();
    assert_eq!(with_id(&diagnostics, "memsetStruct").len(), 1);
}

#[test]
fn test_identical_runs_are_identical() {
    let code = "class B { public: ~ B ( ) { } } ; \
                class D : public B { int x ; int * p ; public: \
                ~ D ( ) { int y = 1 ; } D ( ) { } \
                int get ( ) { return x ; } \
                A & operator = ( const A & r ) { return * this ; } } ;";
    assert_eq!(check_inconclusive(code), check_inconclusive(code));
}

#[test]
fn test_diagnostics_serialize_round_trip() {
    let diagnostics = check("class A { public: A ( ) { } int x ; } ;");
    assert!(!diagnostics.is_empty());
    let json = serde_json::to_string(&diagnostics).unwrap();
    let back: Vec<Diagnostic> = serde_json::from_str(&json).unwrap();
    assert_eq!(diagnostics, back);
}

#[test]
fn test_diagnostics_carry_location() {
    let diagnostics = check("class A {\nprivate:\nint x ;\n} ;");
    let found = with_id(&diagnostics, "noConstructor");
    assert_eq!(found[0].line, 1);
    assert_eq!(found[0].file_index, 0);
    assert!(!found[0].tokens.is_empty());
}
