//! Manifestations: generic or concrete versions of functions, structs and
//! interfaces
//!
//! Every entity registers a base manifestation per declaration site; distinct
//! substitutions add sibling manifestations under their fully-substituted
//! signature. Signatures are unique within one definition-site group.

use crate::ast::{NodeId, Span};
use crate::mangling;
use crate::qual_type::QualType;
use crate::scope::{GenericType, ScopeId};
use crate::types::TypeRegistry;
use indexmap::IndexMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Function,
    Struct,
    Interface,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Function => "function",
            EntityKind::Struct => "struct",
            EntityKind::Interface => "interface",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle of a registered entity version; `Cached` is terminal and reused
/// for the remainder of the compilation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestationState {
    Registered,
    Matched,
    Substantiated,
    Cached,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: QualType,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: QualType,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Manifestation {
    pub kind: EntityKind,
    pub name: String,
    /// Declaration-site identity; all versions of one definition share it
    pub decl: NodeId,
    pub span: Span,
    pub is_public: bool,
    /// Method receiver type, functions only
    pub receiver_type: Option<QualType>,
    /// Call parameters, functions only; optional parameters are already
    /// expanded away at registration
    pub params: Vec<Param>,
    pub return_type: Option<QualType>,
    /// Template parameter slots, placeholders in the base version
    pub template_types: Vec<QualType>,
    /// Generic parameter declarations with their conditions
    pub generic_params: Vec<GenericType>,
    /// Struct fields, in ordinal order
    pub fields: Vec<Field>,
    /// Implemented interface types, structs only
    pub implements: Vec<QualType>,
    pub body_scope: Option<ScopeId>,
    /// Signature of the generic version this one was substituted from
    pub generic_origin: Option<String>,
    pub state: ManifestationState,
}

impl Manifestation {
    /// Whether any signature-relevant type still carries a placeholder
    pub fn is_generic(&self, registry: &TypeRegistry) -> bool {
        let has = |qt: &QualType| registry.has_placeholders(qt.handle());
        self.receiver_type.as_ref().is_some_and(has)
            || self.params.iter().any(|p| has(&p.ty))
            || self.return_type.as_ref().is_some_and(has)
            || self.template_types.iter().any(has)
            || self.fields.iter().any(|f| has(&f.ty))
            || self.implements.iter().any(has)
    }

    pub fn is_substantiation(&self) -> bool {
        self.generic_origin.is_some()
    }

    /// Only fully substantiated manifestations reach the backend: no
    /// remaining generic parameters and no optional parameters (the latter
    /// are expanded into overloads at registration)
    pub fn is_fully_substantiated(&self, registry: &TypeRegistry) -> bool {
        !self.is_generic(registry)
    }

    /// Deterministic signature string keying this version within its group
    pub fn signature(&self, registry: &TypeRegistry) -> String {
        mangling::mangle_manifestation(registry, self)
    }
}

/// Stable address of a registered manifestation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ManifestationId {
    pub scope: ScopeId,
    pub kind: EntityKind,
    pub group: NodeId,
    pub signature: String,
}

/// Per-scope storage of manifestations, keyed first by definition-site
/// identity, then by fully-substituted signature
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManifestationRegistry {
    groups: IndexMap<NodeId, IndexMap<String, Manifestation>>,
}

impl ManifestationRegistry {
    /// Insert a manifestation under its signature. Returns false when the
    /// signature already exists in the group.
    pub fn insert(&mut self, group: NodeId, signature: String, manifestation: Manifestation) -> bool {
        let entry = self.groups.entry(group).or_default();
        if entry.contains_key(&signature) {
            return false;
        }
        entry.insert(signature, manifestation);
        true
    }

    pub fn get(&self, group: NodeId, signature: &str) -> Option<&Manifestation> {
        self.groups.get(&group)?.get(signature)
    }

    pub fn get_mut(&mut self, group: NodeId, signature: &str) -> Option<&mut Manifestation> {
        self.groups.get_mut(&group)?.get_mut(signature)
    }

    /// Remove a manifestation so it can be re-inserted under a new
    /// signature, preserving the order of the remaining group
    pub(crate) fn remove(&mut self, group: NodeId, signature: &str) -> Option<Manifestation> {
        self.groups.get_mut(&group)?.shift_remove(signature)
    }

    pub fn group(&self, group: NodeId) -> Option<&IndexMap<String, Manifestation>> {
        self.groups.get(&group)
    }

    pub fn groups(&self) -> impl Iterator<Item = (&NodeId, &IndexMap<String, Manifestation>)> {
        self.groups.iter()
    }

    pub fn manifestations(&self) -> impl Iterator<Item = &Manifestation> {
        self.groups.values().flat_map(|g| g.values())
    }

    pub fn manifestations_mut(&mut self) -> impl Iterator<Item = &mut Manifestation> {
        self.groups.values_mut().flat_map(|g| g.values_mut())
    }

    /// Find the base (non-substituted) manifestation registered under a name
    pub fn base_by_name(&self, name: &str) -> Option<&Manifestation> {
        self.manifestations()
            .find(|m| m.name == name && !m.is_substantiation())
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.values().map(|g| g.len()).sum()
    }
}
