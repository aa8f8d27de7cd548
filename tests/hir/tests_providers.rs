//! Each declaration provider against the fixture type system.

use drlscope::TextSize;
use drlscope::hir::{
    ImplicitVariable, Origin, ResolveConfig, ResolveRequest, ScopeResolver, SearchScope,
    SourceLocation, Symbol, SymbolKind, TypeDescriptor, TypeLookup, TypeRef, TypeRegistry,
    probe_implicit_variables,
};
use drlscope::syntax::{Expr, PatternKind, RuleFile, RuleFileBuilder};

use crate::helpers::symbol_assertions::{action_start, get_symbol, names_from, statement_start};
use crate::helpers::type_fixtures::{
    HELPER, LEGACY_HELPER, RULE_CONTEXT, TYPES, snapshot, types_with,
};

fn resolve_at(file: RuleFile, position: TextSize) -> Vec<Symbol> {
    resolve_with(file, position, &TYPES)
}

fn resolve_with(file: RuleFile, position: TextSize, types: &TypeRegistry) -> Vec<Symbol> {
    let snapshot = snapshot(file);
    ScopeResolver::default()
        .collect(&snapshot, types, &ResolveRequest::at(position))
        .unwrap()
}

fn empty_rule(builder: RuleFileBuilder) -> RuleFile {
    builder
        .rule("R", |r| {
            r.then(|a| {
                a.expr(Expr::name("x"));
            });
        })
        .build()
}

// ============================================================================
// FILE DECLARATIONS
// ============================================================================

#[test]
fn test_declared_types_are_package_qualified() {
    let file = empty_rule(
        RuleFileBuilder::new()
            .package("org.example")
            .declare_class("Reading", &[("value", "int")])
            .declare_enum("Level"),
    );
    let position = action_start(&file, "R");

    let symbols = resolve_at(file, position);

    assert_eq!(names_from(&symbols, Origin::DeclaredType), vec!["Reading", "Level"]);
    let reading = get_symbol(&symbols, "Reading");
    assert_eq!(reading.kind, SymbolKind::Type);
    assert_eq!(reading.declared_type, Some(TypeRef::named("org.example.Reading")));
    assert!(matches!(reading.location, SourceLocation::Tree { .. }));
}

#[test]
fn test_functions_and_globals_visible_everywhere() {
    let file = empty_rule(
        RuleFileBuilder::new()
            .function(Some("int"), "twice", &[("int", "n")])
            .function(None, "log", &[])
            .global("java.util.List", "items"),
    );
    let outside_rules = file.globals[0].range.start();

    let symbols = resolve_at(file, outside_rules);

    assert_eq!(names_from(&symbols, Origin::Function), vec!["twice", "log"]);
    assert_eq!(get_symbol(&symbols, "twice").declared_type, Some(TypeRef::parse("int")));
    assert_eq!(get_symbol(&symbols, "log").declared_type, None);
    assert_eq!(names_from(&symbols, Origin::Global), vec!["items"]);
}

// ============================================================================
// IMPORTS
// ============================================================================

#[test]
fn test_static_wildcard_import_brings_only_static_members() {
    let file = empty_rule(RuleFileBuilder::new().import_static("org.example.Utils.*"));
    let position = action_start(&file, "R");

    let symbols = resolve_at(file, position);

    // both overloads of clamp collapse into one function symbol
    assert_eq!(names_from(&symbols, Origin::ImportedStatic), vec!["MAX", "clamp"]);
    assert_eq!(get_symbol(&symbols, "MAX").kind, SymbolKind::Variable);
    assert_eq!(
        get_symbol(&symbols, "MAX").location,
        SourceLocation::host("org.example.Utils", Some("MAX"))
    );
}

#[test]
fn test_static_member_import_and_duplicates() {
    let file = empty_rule(
        RuleFileBuilder::new()
            .import_static("org.example.Utils.MAX")
            .import_static("org.example.Utils.*")
            .import_static("org.example.Missing.*"),
    );
    let position = action_start(&file, "R");

    let symbols = resolve_at(file, position);

    assert_eq!(names_from(&symbols, Origin::ImportedStatic), vec!["MAX", "clamp"]);
}

#[test]
fn test_function_import_brings_every_overload() {
    let file = empty_rule(
        RuleFileBuilder::new()
            .import_function("org.example.Utils.clamp")
            .import_function("org.example.Utils.absent"),
    );
    let position = action_start(&file, "R");

    let symbols = resolve_at(file, position);
    let returns: Vec<_> = symbols
        .iter()
        .filter(|s| s.origin == Origin::ImportedFunction)
        .map(|s| s.declared_type.as_ref().map(ToString::to_string))
        .collect();

    assert_eq!(returns, vec![Some("int".to_string()), Some("long".to_string())]);
}

#[test]
fn test_class_import_uses_simple_name() {
    let file = empty_rule(
        RuleFileBuilder::new()
            .import_class("org.example.Person")
            .import_class("org.nowhere.Ghost"),
    );
    let position = action_start(&file, "R");

    let symbols = resolve_at(file, position);

    assert_eq!(names_from(&symbols, Origin::ImportedClass), vec!["Person"]);
    assert_eq!(
        get_symbol(&symbols, "Person").declared_type,
        Some(TypeRef::named("org.example.Person"))
    );
}

#[test]
fn test_package_imports_own_package_and_implicit_packages() {
    let file = empty_rule(
        RuleFileBuilder::new()
            .package("org.example.model")
            .import_package("org.example.model")
            .import_package("org.unknown"),
    );
    let position = action_start(&file, "R");

    let symbols = resolve_at(file, position);

    // the own package repeats the wildcard import and is contributed once
    assert_eq!(
        names_from(&symbols, Origin::ImportedPackage),
        vec!["org.example.model", "Order", "Item", "java.lang", "String"]
    );
    let order = get_symbol(&symbols, "Order");
    assert_eq!(order.container.as_deref(), Some("org.example.model"));
}

#[test]
fn test_project_scope_hides_library_types() {
    let file = empty_rule(RuleFileBuilder::new().package("org.example.model"));
    let position = action_start(&file, "R");
    let snapshot = snapshot(file);
    let config = ResolveConfig::default().with_search_scope(SearchScope::Project);
    let resolver = ScopeResolver::new(config);

    let symbols = resolver
        .collect(&snapshot, &*TYPES, &ResolveRequest::at(position))
        .unwrap();

    assert_eq!(
        names_from(&symbols, Origin::ImportedPackage),
        vec!["org.example.model", "Order", "Item"]
    );
    // implicit variables are always probed in the libraries
    assert!(!names_from(&symbols, Origin::ImplicitVariable).is_empty());
}

// ============================================================================
// IMPLICIT VARIABLES
// ============================================================================

#[test]
fn test_implicit_falls_back_to_lower_priority_candidate() {
    // The legacy helper is absent from the fixture; the current one is present.
    assert!(TYPES.find_type(LEGACY_HELPER, SearchScope::WithLibraries).is_none());

    let resolved = probe_implicit_variables(&*TYPES, &ResolveConfig::default());
    let drools = resolved.iter().find(|r| r.name == "drools").unwrap();

    assert_eq!(drools.descriptor.qualified_name, HELPER);
    assert!(drools.exposes_members);
}

#[test]
fn test_implicit_picks_highest_priority_candidate_present() {
    let types = types_with(vec![TypeDescriptor::new(LEGACY_HELPER).in_library()]);

    let resolved = probe_implicit_variables(&types, &ResolveConfig::default());
    let drools = resolved.iter().find(|r| r.name == "drools").unwrap();

    assert_eq!(drools.descriptor.qualified_name, LEGACY_HELPER);
}

#[test]
fn test_unresolvable_implicit_contributes_nothing() {
    let config = ResolveConfig::default().with_implicit_variables(vec![
        ImplicitVariable::new("ghost", &["org.nowhere.Ghost"]),
        ImplicitVariable::new("kcontext", &[RULE_CONTEXT]),
    ]);

    let resolved = probe_implicit_variables(&*TYPES, &config);

    let names: Vec<_> = resolved.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["kcontext"]);
}

#[test]
fn test_implicit_variables_only_in_action() {
    let file = RuleFileBuilder::new()
        .rule("R", |r| {
            r.when(|c| {
                c.bind("$f", "Fact");
            });
            r.then(|a| {
                a.expr(Expr::call(None, "update", vec![Expr::name("$f")]));
            });
        })
        .build();
    let in_condition = file.rules[0].condition.range.start();
    let in_action = statement_start(&file, "R", 0);

    let condition = resolve_at(file.clone(), in_condition);
    let action = resolve_at(file, in_action);

    assert!(names_from(&condition, Origin::ImplicitVariable).is_empty());
    assert_eq!(
        names_from(&action, Origin::ImplicitVariable),
        vec!["kcontext", "drools", "update", "insert"]
    );
    let drools = get_symbol(&action, "drools");
    assert_eq!(drools.declared_type, Some(TypeRef::named(HELPER)));
    assert_eq!(get_symbol(&action, "update").kind, SymbolKind::Function);
}

#[test]
fn test_shared_resolver_probes_each_type_lookup() {
    let file = empty_rule(RuleFileBuilder::new());
    let position = statement_start(&file, "R", 0);
    let snapshot = snapshot(file);
    let context_only = TypeRegistry::new().with(TypeDescriptor::new(RULE_CONTEXT).in_library());
    let helper_only = TypeRegistry::new().with(TypeDescriptor::new(HELPER).in_library());
    let resolver = ScopeResolver::default();
    let request = ResolveRequest::at(position);

    let with_context = resolver.collect(&snapshot, &context_only, &request).unwrap();
    let with_helper = resolver.collect(&snapshot, &helper_only, &request).unwrap();

    assert_eq!(
        get_symbol(&with_context, "drools").declared_type,
        Some(TypeRef::named(RULE_CONTEXT))
    );
    assert_eq!(
        get_symbol(&with_helper, "drools").declared_type,
        Some(TypeRef::named(HELPER))
    );
    assert_eq!(names_from(&with_helper, Origin::ImplicitVariable), vec!["drools"]);
}

// ============================================================================
// RULE UNITS
// ============================================================================

fn unit_file() -> RuleFile {
    RuleFileBuilder::new()
        .package("org.example")
        .unit("PersonUnit")
        .rule("R", |r| {
            r.when(|c| {
                c.path(Some("$city"), &["persons", "address", "city"]);
            });
            r.then(|a| {
                a.expr(Expr::call(None, "log", vec![Expr::name("$city")]));
            });
        })
        .build()
}

#[test]
fn test_unit_members_visible_inside_rules() {
    let file = unit_file();
    let position = statement_start(&file, "R", 0);

    let symbols = resolve_at(file, position);

    let functions: Vec<_> = symbols
        .iter()
        .filter(|s| s.origin == Origin::UnitMember && s.kind == SymbolKind::Function)
        .map(|s| s.name.as_str())
        .collect();
    let properties: Vec<_> = symbols
        .iter()
        .filter(|s| s.origin == Origin::UnitMember && s.kind == SymbolKind::Variable)
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(functions, vec!["getPersons", "getThreshold", "setThreshold", "log"]);
    assert_eq!(properties, vec!["persons", "threshold"]);
    assert_eq!(
        get_symbol(&symbols, "threshold").location,
        SourceLocation::host("org.example.PersonUnit", Some("getThreshold"))
    );
}

#[test]
fn test_unit_members_not_visible_outside_rules() {
    let file = unit_file();
    let outside = file.range.start();

    let symbols = resolve_at(file, outside);

    assert!(names_from(&symbols, Origin::UnitMember).is_empty());
}

/// Start of each segment of the first pattern of the first rule.
fn segment_starts(file: &RuleFile) -> Vec<TextSize> {
    match &file.rules[0].condition.patterns[0].kind {
        PatternKind::PathBind { segments, .. } => {
            segments.iter().map(|s| s.range.start()).collect()
        }
        other => panic!("expected path, got {:?}", other),
    }
}

#[test]
fn test_path_segments_resolve_through_container_types() {
    let file = unit_file();
    let segment_starts = segment_starts(&file);

    let segment = |index: usize| -> Symbol {
        let symbols = resolve_at(file.clone(), segment_starts[index]);
        let mut segments: Vec<_> = symbols
            .into_iter()
            .filter(|s| s.origin == Origin::PathSegmentProperty)
            .collect();
        assert_eq!(segments.len(), 1, "one segment symbol at index {}", index);
        segments.remove(0)
    };

    let persons = segment(0);
    assert_eq!(persons.name, "persons");
    // DataStore<Person> unwraps to its element
    assert_eq!(persons.declared_type, Some(TypeRef::named("Person")));
    assert_eq!(persons.container.as_deref(), Some("org.example.PersonUnit"));

    let address = segment(1);
    assert_eq!(address.declared_type, Some(TypeRef::named("org.example.Address")));
    assert_eq!(address.container.as_deref(), Some("org.example.Person"));

    let city = segment(2);
    assert_eq!(city.declared_type, Some(TypeRef::string()));
    assert_eq!(city.container.as_deref(), Some("org.example.Address"));
}

#[test]
fn test_unknown_path_segment_contributes_nothing() {
    let file = RuleFileBuilder::new()
        .package("org.example")
        .unit("PersonUnit")
        .rule("R", |r| {
            r.when(|c| {
                c.path(Some("$x"), &["nobody"]);
            });
        })
        .build();
    let position = segment_starts(&file)[0];

    let symbols = resolve_at(file, position);

    assert!(names_from(&symbols, Origin::PathSegmentProperty).is_empty());
    assert_eq!(names_from(&symbols, Origin::PathBind), vec!["$x"]);
}

// ============================================================================
// CAPABILITIES
// ============================================================================

#[test]
fn test_capabilities_differ_between_sections() {
    let file = unit_file();
    let in_condition = file.rules[0].condition.range.start();
    let in_action = statement_start(&file, "R", 0);
    let snapshot = snapshot(file);
    let resolver = ScopeResolver::default();

    let condition = resolver
        .capabilities(&snapshot, &*TYPES, &ResolveRequest::at(in_condition))
        .unwrap();
    let action = resolver
        .capabilities(&snapshot, &*TYPES, &ResolveRequest::at(in_action))
        .unwrap();

    assert_eq!(
        condition,
        vec![Origin::ImportedPackage, Origin::UnitMember, Origin::PathBind]
    );
    assert_eq!(
        action,
        vec![
            Origin::ImportedPackage,
            Origin::ImplicitVariable,
            Origin::UnitMember,
            Origin::PathBind
        ]
    );
}
