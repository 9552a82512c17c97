//! Quill semantic analyzer
//!
//! Scope construction, generic entity registration and monomorphization for
//! the Quill surface language.
//!
//! ## Architecture
//!
//! Analysis is a declaration pass followed by on-demand resolution:
//!
//! - **Type Registry**: structural interning of base-first type chains into
//!   stable handles, so type identity is handle equality
//! - **Scope Tree**: arena-allocated scopes with symbol tables, capture
//!   recording and per-scope entity registries
//! - **Entity Managers**: overload and template resolution for functions,
//!   structs and interfaces, with cached match results
//! - **Substantiation**: generic manifestations are deep-copied with their
//!   body scopes and rewritten against a placeholder-to-concrete mapping
//! - **Name Mangling**: deterministic backend symbol names derived from the
//!   substituted signature
//!
//! Results carry [miette] diagnostics; internal invariant violations panic
//! with a `compiler bug:` message rather than surfacing as user errors.

pub mod ast;
pub mod decl_pass;
pub mod dump;
pub mod error;
pub mod managers;
pub mod mangling;
pub mod manifestation;
pub mod matcher;
pub mod qual_type;
pub mod scope;
pub mod types;
pub mod unit_graph;

// Re-export public API
pub use decl_pass::SemanticAnalyzer;
pub use dump::dump_scopes;
pub use error::{SemaError, SemaWarning, TypeConstructionError, UnitGraphError};
pub use managers::{ArgType, MatchCache, MatchRequest};
pub use manifestation::{
    EntityKind, Field, Manifestation, ManifestationId, ManifestationRegistry, ManifestationState,
    Param,
};
pub use matcher::{matches_type, substantiate, MatchPolicy, TypeMapping};
pub use qual_type::{QualType, Qualifiers};
pub use scope::{
    Capture, CaptureMode, GenericType, Scope, ScopeArena, ScopeId, ScopeKind, SymbolId,
    SymbolTable, SymbolTableEntry,
};
pub use types::{TypeChain, TypeElement, TypeHandle, TypeRegistry};
pub use unit_graph::UnitGraph;

#[cfg(test)]
mod tests;
