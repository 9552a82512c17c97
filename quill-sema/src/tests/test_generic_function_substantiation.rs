//! Generic function matching: placeholder mapping, type conditions and the
//! deep copy performed at substantiation time

use super::*;
use crate::ast::{Item, PrimitiveKind, Unit};
use crate::managers::{ArgType, MatchRequest};
use crate::qual_type::QualType;
use crate::SemanticAnalyzer;

fn max_unit() -> Unit {
    let mut unit = Unit::new("main");
    unit.add_item(Item::Function(function_decl(
        1,
        "max",
        vec![generic_param("T")],
        vec![param("a", named("T")), param("b", named("T"))],
        Some(named("T")),
    )));
    unit
}

#[test]
fn test_placeholders_substitute_from_arguments() {
    let mut analyzer = SemanticAnalyzer::new();
    analyzer.declare_units(&[max_unit()]).unwrap();
    let scope = analyzer.unit_scope("main").unwrap();
    let int_ty = QualType::primitive(&mut analyzer.registry, PrimitiveKind::Int);

    let args = [ArgType::new(int_ty), ArgType::new(int_ty)];
    let call = MatchRequest::new(scope, "max").with_args(&args);
    let id = analyzer.match_function(&call).unwrap().unwrap();

    assert_eq!(analyzer.mangled_name(&id), "_Q3maxIiEii");
    let manifestation = analyzer.manifestation(&id);
    assert!(manifestation.is_substantiation());
    assert!(manifestation.generic_origin.is_some());
    assert_eq!(manifestation.params[0].ty.handle(), int_ty.handle());
    assert_eq!(manifestation.params[1].ty.handle(), int_ty.handle());
    assert_eq!(
        manifestation.return_type.unwrap().handle(),
        int_ty.handle()
    );
}

#[test]
fn test_first_binding_wins_for_repeated_placeholder() {
    let mut analyzer = SemanticAnalyzer::new();
    analyzer.declare_units(&[max_unit()]).unwrap();
    let scope = analyzer.unit_scope("main").unwrap();
    let int_ty = QualType::primitive(&mut analyzer.registry, PrimitiveKind::Int);
    let double_ty = QualType::primitive(&mut analyzer.registry, PrimitiveKind::Double);

    // T binds to int at the first argument; double cannot rebind it
    let args = [ArgType::new(int_ty), ArgType::new(double_ty)];
    let call = MatchRequest::new(scope, "max").with_args(&args);
    assert_eq!(analyzer.match_function(&call).unwrap(), None);
}

#[test]
fn test_type_conditions_gate_acceptance() {
    let mut unit = Unit::new("main");
    let mut constrained = generic_param("T");
    constrained.conditions = vec![prim(PrimitiveKind::Int), prim(PrimitiveKind::Double)];
    unit.add_item(Item::Function(function_decl(
        1,
        "clamp",
        vec![constrained],
        vec![param("value", named("T"))],
        Some(named("T")),
    )));

    let mut analyzer = SemanticAnalyzer::new();
    analyzer.declare_units(&[unit]).unwrap();
    let scope = analyzer.unit_scope("main").unwrap();
    let double_ty = QualType::primitive(&mut analyzer.registry, PrimitiveKind::Double);
    let string_ty = QualType::primitive(&mut analyzer.registry, PrimitiveKind::String);

    let accepted = [ArgType::new(double_ty)];
    let call = MatchRequest::new(scope, "clamp").with_args(&accepted);
    assert!(analyzer.match_function(&call).unwrap().is_some());

    let rejected = [ArgType::new(string_ty)];
    let call = MatchRequest::new(scope, "clamp").with_args(&rejected);
    assert_eq!(analyzer.match_function(&call).unwrap(), None);
}

#[test]
fn test_template_hints_override_inference() {
    let mut analyzer = SemanticAnalyzer::new();
    analyzer.declare_units(&[max_unit()]).unwrap();
    let scope = analyzer.unit_scope("main").unwrap();
    let int_ty = QualType::primitive(&mut analyzer.registry, PrimitiveKind::Int);
    let double_ty = QualType::primitive(&mut analyzer.registry, PrimitiveKind::Double);

    // Hinting T=double makes int arguments fail to match
    let args = [ArgType::new(int_ty), ArgType::new(int_ty)];
    let hints = [double_ty];
    let call = MatchRequest::new(scope, "max")
        .with_args(&args)
        .with_template_hints(&hints);
    assert_eq!(analyzer.match_function(&call).unwrap(), None);

    let args = [ArgType::new(double_ty), ArgType::new(double_ty)];
    let call = MatchRequest::new(scope, "max")
        .with_args(&args)
        .with_template_hints(&hints);
    let id = analyzer.match_function(&call).unwrap().unwrap();
    assert_eq!(analyzer.mangled_name(&id), "_Q3maxIdEdd");
}

#[test]
fn test_substantiation_copies_function_body_scope() {
    let mut analyzer = SemanticAnalyzer::new();
    analyzer.declare_units(&[max_unit()]).unwrap();
    let scope = analyzer.unit_scope("main").unwrap();
    let int_ty = QualType::primitive(&mut analyzer.registry, PrimitiveKind::Int);

    let args = [ArgType::new(int_ty), ArgType::new(int_ty)];
    let call = MatchRequest::new(scope, "max").with_args(&args);
    let id = analyzer.match_function(&call).unwrap().unwrap();

    let body = analyzer.manifestation(&id).body_scope.unwrap();
    let copied = analyzer.scopes.scope(body);
    assert_eq!(copied.name, "_Q3maxIiEii");
    assert_eq!(copied.symbols.get("a").unwrap().ty().handle(), int_ty.handle());
    assert_eq!(copied.symbols.get("b").unwrap().ty().handle(), int_ty.handle());

    // The generic original's parameters keep their placeholders
    let original = analyzer.scopes.scope(scope).child("fn:max:1").unwrap();
    let original_a = analyzer.scopes.scope(original).symbols.get("a").unwrap().ty();
    assert!(analyzer.registry.has_placeholders(original_a.handle()));
}
