//! Struct manager: registration, infinite-size checking and template
//! instantiation

use super::{match_by_templates, MatchCache, MatchRequest};
use crate::error::{to_source_span, SemaError};
use crate::manifestation::{EntityKind, Manifestation, ManifestationId};
use crate::scope::{ScopeArena, ScopeId};
use crate::types::{TypeElement, TypeRegistry};
use std::collections::HashSet;

/// Register a struct definition's base manifestation into a scope.
/// Self-referential fields are tolerated behind pointer or array
/// indirection; a by-value containment cycle is an infinite-size error.
pub fn insert_struct(
    scopes: &mut ScopeArena,
    registry: &mut TypeRegistry,
    scope: ScopeId,
    base: Manifestation,
) -> Result<(), SemaError> {
    debug_assert_eq!(base.kind, EntityKind::Struct);
    let signature = base.signature(registry);
    let decl = base.decl;
    let name = base.name.clone();
    let span = base.span;
    if !scopes
        .scope_mut(scope)
        .registry_mut(EntityKind::Struct)
        .insert(decl, signature, base)
    {
        return Err(SemaError::DuplicateSymbol {
            name,
            span: to_source_span(Some(span)),
        });
    }

    let mut visiting = HashSet::new();
    if has_by_value_cycle(scopes, registry, scope, decl, &mut visiting) {
        return Err(SemaError::InfiniteSizeStruct {
            name,
            span: to_source_span(Some(span)),
        });
    }
    Ok(())
}

/// Resolve a struct instantiation request; see
/// [`match_by_templates`](super::match_by_templates) for the shared path
pub fn match_struct(
    scopes: &mut ScopeArena,
    registry: &mut TypeRegistry,
    cache: &mut MatchCache,
    request: &MatchRequest<'_>,
) -> Result<Option<ManifestationId>, SemaError> {
    match_by_templates(scopes, registry, cache, EntityKind::Struct, request)
}

/// Follow only unwrapped (by-value) field containment; any pointer or array
/// wrapper breaks the chain
fn has_by_value_cycle(
    scopes: &ScopeArena,
    registry: &TypeRegistry,
    scope: ScopeId,
    decl: crate::ast::NodeId,
    visiting: &mut HashSet<crate::ast::NodeId>,
) -> bool {
    if !visiting.insert(decl) {
        return true;
    }
    if let Some(manifestation) = find_struct_base(scopes, scope, decl) {
        for field in &manifestation.fields {
            let chain = registry.chain(field.ty.handle());
            if chain.has_wrappers() {
                continue;
            }
            if let TypeElement::Struct {
                decl: field_decl, ..
            } = chain.base()
            {
                if has_by_value_cycle(scopes, registry, scope, *field_decl, visiting) {
                    return true;
                }
            }
        }
    }
    visiting.remove(&decl);
    false
}

/// Find a struct's base manifestation by declaration identity, searching the
/// scope chain upward
fn find_struct_base(
    scopes: &ScopeArena,
    from: ScopeId,
    decl: crate::ast::NodeId,
) -> Option<Manifestation> {
    let mut current = Some(from);
    while let Some(id) = current {
        let scope = scopes.scope(id);
        if let Some(group) = scope.registry(EntityKind::Struct).group(decl) {
            if let Some(base) = group.values().find(|m| !m.is_substantiation()) {
                return Some(base.clone());
            }
        }
        if scope.kind == crate::scope::ScopeKind::Unit {
            for &import in &scope.imports {
                if let Some(group) = scopes.scope(import).registry(EntityKind::Struct).group(decl) {
                    if let Some(base) = group.values().find(|m| !m.is_substantiation()) {
                        return Some(base.clone());
                    }
                }
            }
        }
        current = scope.parent;
    }
    None
}
