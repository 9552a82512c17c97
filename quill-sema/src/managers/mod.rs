//! Entity managers: registration and resolution of function, struct and
//! interface manifestations
//!
//! All three managers share one shape: `insert` registers a generic
//! definition's manifestation list under its declaration-site identity, and
//! `match` finds the single best manifestation for a request, substantiating
//! a new concrete one on demand. Results are memoized per request key; a
//! cache hit never re-validates or re-substitutes.

pub mod function;
pub mod interface;
pub mod struct_def;

use crate::ast::Span;
use crate::error::SemaError;
use crate::manifestation::{
    EntityKind, Manifestation, ManifestationId, ManifestationState,
};
use crate::matcher::{self, TypeMapping};
use crate::qual_type::QualType;
use crate::scope::{GenericType, ScopeArena, ScopeId, ScopeKind};
use crate::types::{TypeElement, TypeRegistry};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

pub use function::{insert_function, match_function};
pub use interface::{insert_interface, match_interface};
pub use struct_def::{insert_struct, match_struct};

/// An argument's type together with its value category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArgType {
    pub ty: QualType,
    pub is_temporary: bool,
}

impl ArgType {
    pub fn new(ty: QualType) -> Self {
        Self {
            ty,
            is_temporary: false,
        }
    }

    pub fn temporary(ty: QualType) -> Self {
        Self {
            ty,
            is_temporary: true,
        }
    }
}

/// One resolution request against a scope
#[derive(Debug, Clone)]
pub struct MatchRequest<'a> {
    pub scope: ScopeId,
    pub name: &'a str,
    pub receiver: Option<QualType>,
    pub args: &'a [ArgType],
    pub template_hints: &'a [QualType],
    pub span: Span,
}

impl<'a> MatchRequest<'a> {
    pub fn new(scope: ScopeId, name: &'a str) -> Self {
        Self {
            scope,
            name,
            receiver: None,
            args: &[],
            template_hints: &[],
            span: Span::zero(),
        }
    }

    pub fn with_receiver(mut self, receiver: QualType) -> Self {
        self.receiver = Some(receiver);
        self
    }

    pub fn with_args(mut self, args: &'a [ArgType]) -> Self {
        self.args = args;
        self
    }

    pub fn with_template_hints(mut self, hints: &'a [QualType]) -> Self {
        self.template_hints = hints;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// Memoized match results, keyed by a hash of the full request. Keys contain
/// [`ScopeId`]s, so the cache lives exactly as long as the owning analyzer.
#[derive(Debug, Default)]
pub struct MatchCache {
    entries: HashMap<u64, Option<ManifestationId>>,
    hits: u64,
    misses: u64,
}

impl MatchCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(kind: EntityKind, request: &MatchRequest<'_>) -> u64 {
        let mut hasher = DefaultHasher::new();
        kind.hash(&mut hasher);
        request.scope.hash(&mut hasher);
        request.name.hash(&mut hasher);
        request.receiver.hash(&mut hasher);
        request.args.hash(&mut hasher);
        request.template_hints.hash(&mut hasher);
        hasher.finish()
    }

    pub fn get(&mut self, key: u64) -> Option<Option<ManifestationId>> {
        let hit = self.entries.get(&key).cloned();
        if hit.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        hit
    }

    pub fn insert(&mut self, key: u64, result: Option<ManifestationId>) {
        self.entries.insert(key, result);
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A name-matching candidate pulled out of a scope's registry
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub owner: ScopeId,
    pub group: crate::ast::NodeId,
    pub signature: String,
    pub manifestation: Manifestation,
}

/// Collect name-matching, non-substituted manifestations. The search starts
/// at the request scope and walks the parent chain (checking unit imports on
/// the way); the nearest scope with any candidate shadows the outer ones.
pub(crate) fn collect_candidates(
    scopes: &ScopeArena,
    from: ScopeId,
    kind: EntityKind,
    name: &str,
) -> Vec<Candidate> {
    let mut current = Some(from);
    while let Some(id) = current {
        let mut found = candidates_in_scope(scopes, id, kind, name);
        if scopes.scope(id).kind == ScopeKind::Unit {
            for &import in &scopes.scope(id).imports {
                found.extend(candidates_in_scope(scopes, import, kind, name));
            }
        }
        if !found.is_empty() {
            return found;
        }
        current = scopes.scope(id).parent;
    }
    Vec::new()
}

fn candidates_in_scope(
    scopes: &ScopeArena,
    scope: ScopeId,
    kind: EntityKind,
    name: &str,
) -> Vec<Candidate> {
    let mut out = Vec::new();
    for (group, manifestations) in scopes.scope(scope).registry(kind).groups() {
        for (signature, manifestation) in manifestations {
            if manifestation.name != name {
                continue;
            }
            // A substantiation next to its generic origin is reached through
            // the origin's signature reuse, never matched directly. One that
            // stands alone (re-keyed inside a copied body scope) is the only
            // version there and matches as-is.
            if let Some(origin) = &manifestation.generic_origin {
                if manifestations.contains_key(origin) {
                    continue;
                }
            }
            out.push(Candidate {
                owner: scope,
                group: *group,
                signature: signature.clone(),
                manifestation: manifestation.clone(),
            });
        }
    }
    out
}

/// Seed a mapping from explicit template hints, paired positionally with the
/// candidate's template slots. Returns false when the hints cannot apply.
pub(crate) fn seed_template_hints(
    registry: &TypeRegistry,
    candidate: &Manifestation,
    hints: &[QualType],
    mapping: &mut TypeMapping,
) -> bool {
    if hints.len() > candidate.template_types.len() {
        return false;
    }
    for (slot, hint) in candidate.template_types.iter().zip(hints.iter()) {
        let name = match registry.chain(slot.handle()).base() {
            TypeElement::Generic(name) => name.clone(),
            // A concrete slot only accepts a structurally equal hint
            _ => {
                if !slot.same_shape(hint) {
                    return false;
                }
                continue;
            }
        };
        if let Some(generic) = candidate.generic_params.iter().find(|g| g.name == name) {
            if !generic.accepts(*hint) {
                return false;
            }
        }
        if !mapping.insert_or_check(&name, *hint) {
            return false;
        }
    }
    true
}

/// Every declared placeholder must be covered by the seeded template mapping
pub(crate) fn all_placeholders_resolved(
    candidate: &Manifestation,
    mapping: &TypeMapping,
) -> bool {
    candidate
        .generic_params
        .iter()
        .all(|g| mapping.contains(&g.name))
}

/// Rewrite every signature-relevant type of a manifestation via the mapping
pub(crate) fn substitute_manifestation_types(
    registry: &mut TypeRegistry,
    manifestation: &mut Manifestation,
    mapping: &TypeMapping,
) {
    if let Some(receiver) = manifestation.receiver_type {
        manifestation.receiver_type = Some(matcher::substantiate(registry, receiver, mapping));
    }
    for param in &mut manifestation.params {
        param.ty = matcher::substantiate(registry, param.ty, mapping);
    }
    if let Some(return_type) = manifestation.return_type {
        manifestation.return_type = Some(matcher::substantiate(registry, return_type, mapping));
    }
    for template in &mut manifestation.template_types {
        *template = matcher::substantiate(registry, *template, mapping);
    }
    for field in &mut manifestation.fields {
        field.ty = matcher::substantiate(registry, field.ty, mapping);
    }
    for implemented in &mut manifestation.implements {
        *implemented = matcher::substantiate(registry, *implemented, mapping);
    }
}

/// Compute the signature a candidate would take under a mapping, without any
/// side effect on the registries
pub(crate) fn substituted_signature(
    registry: &mut TypeRegistry,
    candidate: &Manifestation,
    mapping: &TypeMapping,
) -> String {
    let mut preview = candidate.clone();
    substitute_manifestation_types(registry, &mut preview, mapping);
    preview.signature(registry)
}

/// Create (or reuse) the concrete manifestation for a generic candidate under
/// a fully resolving mapping: deep-copy the definition's body scope under the
/// substituted signature, bind every resolved placeholder as a concrete
/// generic type inside it, substitute all types through the copied subtree,
/// and link the result back to its generic origin.
pub(crate) fn create_substantiation(
    scopes: &mut ScopeArena,
    registry: &mut TypeRegistry,
    candidate: &Candidate,
    mapping: &TypeMapping,
) -> ManifestationId {
    let mut substituted = candidate.manifestation.clone();
    substitute_manifestation_types(registry, &mut substituted, mapping);
    substituted.generic_origin = Some(candidate.signature.clone());
    substituted.state = ManifestationState::Substantiated;
    let signature = substituted.signature(registry);

    let id = ManifestationId {
        scope: candidate.owner,
        kind: substituted.kind,
        group: candidate.group,
        signature: signature.clone(),
    };
    // Same substituted signature: reuse the existing manifestation
    if scopes
        .scope(candidate.owner)
        .registry(substituted.kind)
        .get(candidate.group, &signature)
        .is_some()
    {
        return id;
    }

    if let Some(body) = candidate.manifestation.body_scope {
        let parent = scopes
            .scope(body)
            .parent
            .expect("body scopes always have a parent");
        let body_name = scopes.scope(body).name.clone();
        let copy = scopes
            .copy_child(parent, &body_name, &signature)
            .unwrap_or_else(|_| {
                panic!("compiler bug: substituted body scope '{signature}' already exists")
            });
        for (name, ty) in mapping.iter() {
            scopes.bind_generic_type(copy, GenericType::bound_to(name.clone(), *ty));
        }
        substitute_subtree(scopes, registry, copy, mapping);
        substituted.body_scope = Some(copy);
    }

    let kind = substituted.kind;
    scopes
        .scope_mut(candidate.owner)
        .registry_mut(kind)
        .insert(candidate.group, signature, substituted);

    // The generic original has now produced at least one concrete version
    let origin = ManifestationId {
        scope: candidate.owner,
        kind,
        group: candidate.group,
        signature: candidate.signature.clone(),
    };
    scopes.with_manifestation_mut(&origin, |m| {
        if m.state == ManifestationState::Registered {
            m.state = ManifestationState::Matched;
        }
    });
    id
}

/// Shared resolution path for the template-list-only entities (structs and
/// interfaces): match the request's template hints against each candidate's
/// template slots and substantiate on demand
pub(crate) fn match_by_templates(
    scopes: &mut ScopeArena,
    registry: &mut TypeRegistry,
    cache: &mut MatchCache,
    kind: EntityKind,
    request: &MatchRequest<'_>,
) -> Result<Option<ManifestationId>, SemaError> {
    let key = MatchCache::key(kind, request);
    if let Some(memoized) = cache.get(key) {
        return Ok(memoized);
    }

    let candidates = collect_candidates(scopes, request.scope, kind, request.name);
    let mut matches: Vec<(Candidate, TypeMapping, bool)> = Vec::new();

    for candidate in candidates {
        let manifestation = &candidate.manifestation;
        if request.template_hints.len() != manifestation.template_types.len() {
            continue;
        }
        let mut mapping = TypeMapping::new();
        if !seed_template_hints(registry, manifestation, request.template_hints, &mut mapping) {
            continue;
        }
        if !all_placeholders_resolved(manifestation, &mapping) {
            continue;
        }
        let generic = manifestation.is_generic(registry);
        matches.push((candidate, mapping, generic));
    }

    match matches.len() {
        0 => {
            cache.insert(key, None);
            Ok(None)
        }
        1 => {
            let (candidate, mapping, generic) = matches.pop().expect("one match");
            let id = if generic {
                create_substantiation(scopes, registry, &candidate, &mapping)
            } else {
                ManifestationId {
                    scope: candidate.owner,
                    kind,
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
                    substituted_signature(registry, &candidate.manifestation, mapping)
                })
                .collect(),
            span: crate::error::to_source_span(Some(request.span)),
        }),
    }
}

/// Substitute symbol types and nested manifestation types through a freshly
/// copied scope subtree
fn substitute_subtree(
    scopes: &mut ScopeArena,
    registry: &mut TypeRegistry,
    root: ScopeId,
    mapping: &TypeMapping,
) {
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        stack.extend(scopes.scope(id).children().map(|(_, child)| *child));
        let mut symbol_types: Vec<(String, QualType)> = Vec::new();
        for entry in scopes.scope(id).symbols.entries() {
            symbol_types.push((entry.name.clone(), entry.ty()));
        }
        for (name, ty) in symbol_types {
            let substituted = matcher::substantiate(registry, ty, mapping);
            let symbol_id = crate::scope::SymbolId { scope: id, name };
            scopes.symbol_mut(&symbol_id).set_substituted_type(substituted);
        }
        for kind in [EntityKind::Function, EntityKind::Struct, EntityKind::Interface] {
            // Collect, substitute, write back: registries are name-addressed
            let mut updated: Vec<(crate::ast::NodeId, String, Manifestation)> = Vec::new();
            for (group, manifestations) in scopes.scope(id).registry(kind).groups() {
                for (signature, manifestation) in manifestations {
                    let mut m = manifestation.clone();
                    substitute_manifestation_types(registry, &mut m, mapping);
                    updated.push((*group, signature.clone(), m));
                }
            }
            for (group, signature, mut m) in updated {
                let new_signature = m.signature(registry);
                if new_signature == signature {
                    if let Some(slot) = scopes
                        .scope_mut(id)
                        .registry_mut(kind)
                        .get_mut(group, &signature)
                    {
                        *slot = m;
                    }
                    continue;
                }
                // Substitution changed the signature: re-key the entry so
                // resolution from the copied scope hands out the concrete
                // signature, never the placeholder one
                if !m.is_generic(registry) {
                    m.generic_origin = Some(signature.clone());
                    m.state = ManifestationState::Substantiated;
                }
                let entities = scopes.scope_mut(id).registry_mut(kind);
                entities.remove(group, &signature);
                entities.insert(group, new_signature, m);
            }
        }
    }
}
