//! Interface manager: registration and template instantiation
//!
//! Interfaces match a template-type list only; their method signatures live
//! as function manifestations inside the interface's body scope and are
//! substituted along with it.

use super::{match_by_templates, MatchCache, MatchRequest};
use crate::error::{to_source_span, SemaError};
use crate::manifestation::{EntityKind, Manifestation, ManifestationId};
use crate::scope::{ScopeArena, ScopeId};
use crate::types::TypeRegistry;

/// Register an interface definition's base manifestation into a scope
pub fn insert_interface(
    scopes: &mut ScopeArena,
    registry: &mut TypeRegistry,
    scope: ScopeId,
    base: Manifestation,
) -> Result<(), SemaError> {
    debug_assert_eq!(base.kind, EntityKind::Interface);
    let signature = base.signature(registry);
    let decl = base.decl;
    let name = base.name.clone();
    let span = base.span;
    if !scopes
        .scope_mut(scope)
        .registry_mut(EntityKind::Interface)
        .insert(decl, signature, base)
    {
        return Err(SemaError::DuplicateSymbol {
            name,
            span: to_source_span(Some(span)),
        });
    }
    Ok(())
}

/// Resolve an interface instantiation request
pub fn match_interface(
    scopes: &mut ScopeArena,
    registry: &mut TypeRegistry,
    cache: &mut MatchCache,
    request: &MatchRequest<'_>,
) -> Result<Option<ManifestationId>, SemaError> {
    match_by_templates(scopes, registry, cache, EntityKind::Interface, request)
}
