//! Function manager: overload registration and call resolution
//!
//! Functions additionally match an optional receiver type and an argument
//! list. Optional parameters are declaration-time overload sugar: they are
//! expanded into concrete overloads at registration, so no manifestation
//! ever carries a default.

use super::{
    collect_candidates, create_substantiation, seed_template_hints, Candidate, MatchCache,
    MatchRequest,
};
use crate::ast::Span;
use crate::error::{to_source_span, SemaError};
use crate::manifestation::{EntityKind, Manifestation, ManifestationId, ManifestationState};
use crate::matcher::{self, MatchPolicy, TypeMapping};
use crate::qual_type::QualType;
use crate::scope::{ScopeArena, ScopeId};
use crate::types::TypeRegistry;

/// Register a function definition's manifestation list into a scope.
/// `optional` marks which parameters carry defaults; they must trail the
/// required ones and produce one overload per prefix (none .. all).
pub fn insert_function(
    scopes: &mut ScopeArena,
    registry: &mut TypeRegistry,
    scope: ScopeId,
    base: Manifestation,
    optional: &[bool],
) -> Result<(), SemaError> {
    debug_assert_eq!(base.kind, EntityKind::Function);
    debug_assert_eq!(optional.len(), base.params.len());

    let required = optional.iter().take_while(|o| !**o).count();
    if let Some(stray) = optional
        .iter()
        .enumerate()
        .skip(required)
        .find(|(_, o)| !**o)
    {
        let param = &base.params[stray.0];
        return Err(SemaError::OptionalParamOrder {
            name: param.name.clone(),
            span: to_source_span(Some(param.span)),
        });
    }

    for arity in required..=base.params.len() {
        let mut overload = base.clone();
        overload.params.truncate(arity);
        let signature = overload.signature(registry);
        if !scopes
            .scope_mut(scope)
            .registry_mut(EntityKind::Function)
            .insert(base.decl, signature, overload)
        {
            return Err(SemaError::DuplicateSymbol {
                name: base.name.clone(),
                span: to_source_span(Some(base.span)),
            });
        }
    }
    Ok(())
}

/// Why a candidate was rejected. Shape mismatches are routine; the other two
/// mean the candidate would have matched and are surfaced as diagnostics when
/// nothing else matched either.
enum MatchFailure {
    Shape,
    TemporaryToMutRef,
    UnresolvedPlaceholder(String),
}

/// Resolve a call to the single best function manifestation, substantiating
/// a concrete version of a generic candidate on demand. When every candidate
/// is rejected, a shape-compatible near miss (temporary bound to a mutable
/// reference, or a placeholder no argument or hint covers) is reported as an
/// error instead of a silent non-match.
pub fn match_function(
    scopes: &mut ScopeArena,
    registry: &mut TypeRegistry,
    cache: &mut MatchCache,
    request: &MatchRequest<'_>,
) -> Result<Option<ManifestationId>, SemaError> {
    let key = MatchCache::key(EntityKind::Function, request);
    if let Some(memoized) = cache.get(key) {
        return Ok(memoized);
    }

    let candidates = collect_candidates(scopes, request.scope, EntityKind::Function, request.name);
    let mut matches: Vec<(Candidate, TypeMapping, bool)> = Vec::new();
    let mut near_miss: Option<MatchFailure> = None;

    for candidate in candidates {
        match match_one(registry, &candidate.manifestation, request) {
            Ok(mapping) => {
                let generic = candidate.manifestation.is_generic(registry);
                matches.push((candidate, mapping, generic));
            }
            Err(MatchFailure::Shape) => {}
            Err(failure) => {
                if near_miss.is_none() {
                    near_miss = Some(failure);
                }
            }
        }
    }

    match matches.len() {
        0 => match near_miss {
            Some(MatchFailure::TemporaryToMutRef) => Err(SemaError::TemporaryToMutRef {
                span: to_source_span(Some(request.span)),
            }),
            Some(MatchFailure::UnresolvedPlaceholder(name)) => {
                Err(SemaError::UnresolvedPlaceholder {
                    name,
                    span: to_source_span(Some(request.span)),
                })
            }
            _ => {
                cache.insert(key, None);
                Ok(None)
            }
        },
        1 => {
            let (candidate, mapping, generic) = matches.pop().expect("one match");
            let id = if generic {
                create_substantiation(scopes, registry, &candidate, &mapping)
            } else {
                ManifestationId {
                    scope: candidate.owner,
                    kind: EntityKind::Function,
                    group: candidate.group,
                    signature: candidate.signature,
                }
            };
            scopes.with_manifestation_mut(&id, |m| m.state = ManifestationState::Cached);
            cache.insert(key, Some(id.clone()));
            Ok(Some(id))
        }
        _ => Err(SemaError::AmbiguousMatch {
            name: request.name.to_string(),
            candidates: matches
                .iter()
                .map(|(candidate, mapping, _)| {
                    super::substituted_signature(registry, &candidate.manifestation, mapping)
                })
                .collect(),
            span: to_source_span(Some(request.span)),
        }),
    }
}

/// Match one candidate: name already agreed, now receiver, then each
/// argument in declaration order so earlier parameters can resolve
/// placeholders used by later ones
fn match_one(
    registry: &mut TypeRegistry,
    candidate: &Manifestation,
    request: &MatchRequest<'_>,
) -> Result<TypeMapping, MatchFailure> {
    let mut mapping = TypeMapping::new();
    if !seed_template_hints(registry, candidate, request.template_hints, &mut mapping) {
        return Err(MatchFailure::Shape);
    }

    let policy = MatchPolicy::default();
    let generics = &candidate.generic_params;

    match (candidate.receiver_type, request.receiver) {
        (None, None) => {}
        (Some(candidate_receiver), Some(requested_receiver)) => {
            if !matcher::matches_type(
                registry,
                candidate_receiver,
                requested_receiver,
                generics,
                &mut mapping,
                &policy,
            ) {
                return Err(MatchFailure::Shape);
            }
        }
        _ => return Err(MatchFailure::Shape),
    }

    if candidate.params.len() != request.args.len() {
        return Err(MatchFailure::Shape);
    }
    let mut temporary_conflict = false;
    for (param, arg) in candidate.params.iter().zip(request.args.iter()) {
        let (candidate_ty, requested_ty) =
            adjust_reference_shapes(registry, param.ty, arg.ty).ok_or(MatchFailure::Shape)?;
        if !matcher::matches_type(
            registry,
            candidate_ty,
            requested_ty,
            generics,
            &mut mapping,
            &policy,
        ) {
            return Err(MatchFailure::Shape);
        }
        // A temporary can never bind to a mutable reference. Shapes are
        // checked first so the conflict is only reported when everything
        // else would have matched.
        if param.ty.is_reference(registry) && !param.ty.is_const() && arg.is_temporary {
            temporary_conflict = true;
        }
    }
    if temporary_conflict {
        return Err(MatchFailure::TemporaryToMutRef);
    }

    if let Some(missing) = candidate
        .generic_params
        .iter()
        .find(|g| !mapping.contains(&g.name))
    {
        return Err(MatchFailure::UnresolvedPlaceholder(missing.name.clone()));
    }
    Ok(mapping)
}

/// Call-boundary auto ref/deref: a reference parameter binds a value
/// argument and a value parameter accepts a reference argument. Shape
/// adjustment only; qualifier policy stays with the matcher.
fn adjust_reference_shapes(
    registry: &mut TypeRegistry,
    param: QualType,
    arg: QualType,
) -> Option<(QualType, QualType)> {
    let param_is_ref = param.is_reference(registry);
    let arg_is_ref = arg.is_reference(registry);
    match (param_is_ref, arg_is_ref) {
        (true, false) => {
            let contained = param.contained(registry, Span::zero()).ok()?;
            Some((contained, arg))
        }
        (false, true) => {
            let contained = arg.contained(registry, Span::zero()).ok()?;
            Some((param, contained))
        }
        _ => Some((param, arg)),
    }
}
