//! Function overload resolution: arity, optional-parameter expansion,
//! receivers, value categories and ambiguity reporting

use super::*;
use crate::ast::{Item, PrimitiveKind, TypeExpr, Unit};
use crate::error::SemaError;
use crate::managers::{ArgType, MatchRequest};
use crate::qual_type::QualType;
use crate::SemanticAnalyzer;

#[test]
fn test_overloads_resolve_by_arity_and_types() {
    let mut unit = Unit::new("main");
    unit.add_item(Item::Function(function_decl(
        1,
        "log",
        Vec::new(),
        vec![
            param("message", prim(PrimitiveKind::String)),
            optional_param("level", prim(PrimitiveKind::Int)),
        ],
        None,
    )));

    let mut analyzer = SemanticAnalyzer::new();
    analyzer.declare_units(&[unit]).unwrap();
    let scope = analyzer.unit_scope("main").unwrap();
    let string_ty = QualType::primitive(&mut analyzer.registry, PrimitiveKind::String);
    let int_ty = QualType::primitive(&mut analyzer.registry, PrimitiveKind::Int);

    let one = [ArgType::new(string_ty)];
    let short_call = MatchRequest::new(scope, "log").with_args(&one);
    let short_id = analyzer.match_function(&short_call).unwrap().unwrap();
    assert_eq!(analyzer.manifestation(&short_id).params.len(), 1);

    let two = [ArgType::new(string_ty), ArgType::new(int_ty)];
    let full_call = MatchRequest::new(scope, "log").with_args(&two);
    let full_id = analyzer.match_function(&full_call).unwrap().unwrap();
    assert_eq!(analyzer.manifestation(&full_id).params.len(), 2);
    assert_ne!(short_id, full_id);

    // No zero-arity overload exists
    let empty_call = MatchRequest::new(scope, "log");
    assert_eq!(analyzer.match_function(&empty_call).unwrap(), None);

    // Wrong argument type finds nothing
    let wrong = [ArgType::new(int_ty)];
    let wrong_call = MatchRequest::new(scope, "log").with_args(&wrong);
    assert_eq!(analyzer.match_function(&wrong_call).unwrap(), None);
}

#[test]
fn test_temporary_cannot_bind_to_mutable_reference() {
    let mut unit = Unit::new("main");
    unit.add_item(Item::Function(function_decl(
        1,
        "swap",
        Vec::new(),
        vec![param(
            "slot",
            TypeExpr::Reference(Box::new(prim(PrimitiveKind::Int))),
        )],
        None,
    )));

    let mut analyzer = SemanticAnalyzer::new();
    analyzer.declare_units(&[unit]).unwrap();
    let scope = analyzer.unit_scope("main").unwrap();
    let int_ty = QualType::primitive(&mut analyzer.registry, PrimitiveKind::Int);

    // An lvalue auto-references into the parameter
    let lvalue = [ArgType::new(int_ty)];
    let ok_call = MatchRequest::new(scope, "swap").with_args(&lvalue);
    assert!(analyzer.match_function(&ok_call).unwrap().is_some());

    // The rejection names the value-category conflict, not a plain non-match
    let temporary = [ArgType::temporary(int_ty)];
    let bad_call = MatchRequest::new(scope, "swap").with_args(&temporary);
    let error = analyzer.match_function(&bad_call).unwrap_err();
    assert!(matches!(error, SemaError::TemporaryToMutRef { .. }));
}

#[test]
fn test_uninferable_placeholder_is_reported() {
    let mut unit = Unit::new("main");
    // The return type is the only mention of T, so arguments can never pin it
    unit.add_item(Item::Function(function_decl(
        1,
        "fresh",
        vec![generic_param("T")],
        Vec::new(),
        Some(named("T")),
    )));

    let mut analyzer = SemanticAnalyzer::new();
    analyzer.declare_units(&[unit]).unwrap();
    let scope = analyzer.unit_scope("main").unwrap();
    let int_ty = QualType::primitive(&mut analyzer.registry, PrimitiveKind::Int);

    let bare_call = MatchRequest::new(scope, "fresh");
    let error = analyzer.match_function(&bare_call).unwrap_err();
    match error {
        SemaError::UnresolvedPlaceholder { name, .. } => assert_eq!(name, "T"),
        other => panic!("expected unresolved placeholder, got {other:?}"),
    }

    // An explicit hint resolves it
    let hints = [int_ty];
    let hinted_call = MatchRequest::new(scope, "fresh").with_template_hints(&hints);
    let id = analyzer.match_function(&hinted_call).unwrap().unwrap();
    assert_eq!(analyzer.mangled_name(&id), "_Q5freshIiEv");
}

#[test]
fn test_receiver_must_match_both_ways() {
    let mut unit = Unit::new("main");
    let mut method = function_decl(1, "get", Vec::new(), Vec::new(), Some(prim(PrimitiveKind::Int)));
    method.receiver = Some(prim(PrimitiveKind::Double));
    unit.add_item(Item::Function(method));

    let mut analyzer = SemanticAnalyzer::new();
    analyzer.declare_units(&[unit]).unwrap();
    let scope = analyzer.unit_scope("main").unwrap();
    let double_ty = QualType::primitive(&mut analyzer.registry, PrimitiveKind::Double);

    let with_receiver = MatchRequest::new(scope, "get").with_receiver(double_ty);
    let id = analyzer.match_function(&with_receiver).unwrap().unwrap();
    assert_eq!(analyzer.mangled_name(&id), "_QNd3getEv");

    // A method is not callable without its receiver
    let plain = MatchRequest::new(scope, "get");
    assert_eq!(analyzer.match_function(&plain).unwrap(), None);
}

#[test]
fn test_ambiguous_generic_candidates_are_reported() {
    let mut unit = Unit::new("main");
    unit.add_item(Item::Function(function_decl(
        1,
        "pick",
        vec![generic_param("T")],
        vec![param("a", named("T")), param("b", prim(PrimitiveKind::Int))],
        None,
    )));
    unit.add_item(Item::Function(function_decl(
        2,
        "pick",
        vec![generic_param("U")],
        vec![param("a", prim(PrimitiveKind::Int)), param("b", named("U"))],
        None,
    )));

    let mut analyzer = SemanticAnalyzer::new();
    analyzer.declare_units(&[unit]).unwrap();
    let scope = analyzer.unit_scope("main").unwrap();
    let int_ty = QualType::primitive(&mut analyzer.registry, PrimitiveKind::Int);

    let args = [ArgType::new(int_ty), ArgType::new(int_ty)];
    let call = MatchRequest::new(scope, "pick").with_args(&args);
    let error = analyzer.match_function(&call).unwrap_err();
    match error {
        SemaError::AmbiguousMatch { candidates, .. } => {
            assert_eq!(candidates.len(), 2);
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
}

#[test]
fn test_resolve_reports_not_found() {
    let mut analyzer = SemanticAnalyzer::new();
    analyzer.declare_units(&[Unit::new("main")]).unwrap();
    let scope = analyzer.unit_scope("main").unwrap();

    let request = MatchRequest::new(scope, "launch");
    let error = analyzer.resolve_function(&request).unwrap_err();
    match error {
        SemaError::NotFound { kind, name, .. } => {
            assert_eq!(kind, "function");
            assert_eq!(name, "launch");
        }
        other => panic!("expected not-found, got {other:?}"),
    }
}

#[test]
fn test_optional_param_order_is_enforced() {
    let mut unit = Unit::new("main");
    unit.add_item(Item::Function(function_decl(
        1,
        "bad",
        Vec::new(),
        vec![
            optional_param("first", prim(PrimitiveKind::Int)),
            param("second", prim(PrimitiveKind::Int)),
        ],
        None,
    )));

    let mut analyzer = SemanticAnalyzer::new();
    analyzer.declare_units(&[unit]).unwrap();
    assert!(analyzer
        .errors()
        .iter()
        .any(|e| matches!(e, SemaError::OptionalParamOrder { .. })));
}
