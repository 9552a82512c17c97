//! Error types for the Quill semantic core
//!
//! All user-facing diagnostics are miette diagnostics with source labels;
//! internal invariant violations are compiler defects and panic instead.

use crate::ast::Span;
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Semantic errors accumulated during declaration and resolution
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum SemaError {
    #[error("{kind} '{name}' not found")]
    #[diagnostic(
        code(quill::sema::not_found),
        help("Ensure '{name}' is declared and visible from this scope")
    )]
    NotFound {
        kind: &'static str,
        name: String,
        #[label("no matching {kind} for this call")]
        span: Option<SourceSpan>,
    },

    #[error("Ambiguous match for '{name}': {} candidates apply", candidates.len())]
    #[diagnostic(
        code(quill::sema::ambiguous_match),
        help("Add template arguments or casts to select exactly one candidate")
    )]
    AmbiguousMatch {
        name: String,
        /// Mangled signatures of every remaining candidate
        candidates: Vec<String>,
        #[label("more than one candidate matches")]
        span: Option<SourceSpan>,
    },

    #[error("Generic type '{name}' could not be inferred")]
    #[diagnostic(
        code(quill::sema::unresolved_placeholder),
        help("Provide an explicit template argument for '{name}'")
    )]
    UnresolvedPlaceholder {
        name: String,
        #[label("placeholder left unresolved")]
        span: Option<SourceSpan>,
    },

    #[error("Unknown type '{name}'")]
    #[diagnostic(
        code(quill::sema::unknown_type),
        help("Import the unit defining '{name}' or declare it first")
    )]
    UnknownType {
        name: String,
        #[label("type is not declared here")]
        span: Option<SourceSpan>,
    },

    #[error("Struct '{name}' has infinite size")]
    #[diagnostic(
        code(quill::sema::infinite_size),
        help("Break the by-value cycle with a pointer or array indirection")
    )]
    InfiniteSizeStruct {
        name: String,
        #[label("field recursion never reaches a fixed size")]
        span: Option<SourceSpan>,
    },

    #[error("Optional parameter '{name}' must trail all required parameters")]
    #[diagnostic(code(quill::sema::optional_param_order))]
    OptionalParamOrder {
        name: String,
        #[label("required parameter after an optional one")]
        span: Option<SourceSpan>,
    },

    #[error("Cannot bind a temporary value to a non-const reference")]
    #[diagnostic(
        code(quill::sema::temporary_to_mut_ref),
        help("Bind the value to a named variable first or take it by const reference")
    )]
    TemporaryToMutRef {
        #[label("temporary argument")]
        span: Option<SourceSpan>,
    },

    #[error("Duplicate declaration of '{name}' in the same scope")]
    #[diagnostic(code(quill::sema::duplicate_symbol))]
    DuplicateSymbol {
        name: String,
        #[label("already declared in this scope")]
        span: Option<SourceSpan>,
    },

    #[error("Type construction failed")]
    #[diagnostic(code(quill::sema::type_construction))]
    Construction(#[from] TypeConstructionError),

    #[error("Unit dependency resolution failed")]
    #[diagnostic(code(quill::sema::unit_graph))]
    UnitGraph(#[from] UnitGraphError),
}

/// Illegal type shapes, raised at the originating source location and never
/// silently coerced
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum TypeConstructionError {
    #[error("Cannot take a pointer to an unresolved type")]
    #[diagnostic(code(quill::sema::construction::pointer_to_unresolved))]
    PointerToUnresolved {
        #[label("type is not resolved yet")]
        span: Option<SourceSpan>,
    },

    #[error("Cannot declare a reference to a reference")]
    #[diagnostic(code(quill::sema::construction::reference_to_reference))]
    ReferenceToReference {
        #[label("already a reference")]
        span: Option<SourceSpan>,
    },

    #[error("Cannot declare an array of an unresolved type")]
    #[diagnostic(code(quill::sema::construction::array_of_unresolved))]
    ArrayOfUnresolved {
        #[label("element type is not resolved yet")]
        span: Option<SourceSpan>,
    },

    #[error("Type has no contained type")]
    #[diagnostic(
        code(quill::sema::construction::not_a_container),
        help("Only pointer, reference and array types wrap a contained type")
    )]
    NotAContainer {
        #[label("not a pointer, reference or array")]
        span: Option<SourceSpan>,
    },
}

/// Errors from compilation-unit dependency ordering
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum UnitGraphError {
    #[error("Circular import between units: {}", cycle.join(" -> "))]
    #[diagnostic(
        code(quill::sema::units::circular_import),
        help("Break the cycle by moving shared declarations into a separate unit")
    )]
    CircularImport { cycle: Vec<String> },

    #[error("Unit '{unit}' imports unknown unit '{import}'")]
    #[diagnostic(code(quill::sema::units::unresolved_import))]
    UnresolvedImport { unit: String, import: String },
}

/// Non-fatal findings surfaced alongside errors
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum SemaWarning {
    #[error("Declaration of '{name}' shadows a symbol from an enclosing scope")]
    #[diagnostic(code(quill::sema::warning::shadowed_symbol))]
    ShadowedSymbol {
        name: String,
        #[label("shadows an outer declaration")]
        span: Option<SourceSpan>,
    },

    #[error("Symbol '{name}' is never used")]
    #[diagnostic(code(quill::sema::warning::unused_symbol))]
    UnusedSymbol {
        name: String,
        #[label("declared here")]
        span: Option<SourceSpan>,
    },
}

/// Convert an ast span to a miette source span
pub fn to_source_span(span: Option<Span>) -> Option<SourceSpan> {
    span.map(|s| SourceSpan::new(s.start.into(), s.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_source_span() {
        let span = to_source_span(Some(Span::new(10, 25))).unwrap();
        assert_eq!(span.offset(), 10);
        assert_eq!(span.len(), 15);
        assert!(to_source_span(None).is_none());
    }

    #[test]
    fn test_ambiguity_error_reports_all_candidates() {
        let err = SemaError::AmbiguousMatch {
            name: "max".to_string(),
            candidates: vec!["_Q3maxii".to_string(), "_Q3maxll".to_string()],
            span: None,
        };
        let message = err.to_string();
        assert!(message.contains("2 candidates"));
    }
}
