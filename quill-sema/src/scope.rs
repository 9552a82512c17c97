//! Lexical scope tree and symbol tables
//!
//! Scopes live in an arena and are addressed by stable [`ScopeId`] indices;
//! parent/child edges and back-references (capture targets, generic origins)
//! are index relations, never owning pointers. Ids are unique for the
//! lifetime of one [`crate::SemanticAnalyzer`], which also bounds the
//! lifetime of every cache keyed by them.

use crate::ast::{NodeId, Span};
use crate::error::{to_source_span, SemaError, SemaWarning};
use crate::manifestation::{EntityKind, Manifestation, ManifestationRegistry, ManifestationState};
use crate::qual_type::QualType;
use crate::types::TypeRegistry;
use indexmap::IndexMap;
use std::collections::HashMap;

/// Index of a scope in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u32);

/// What lexical construct a scope belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Global,
    Unit,
    Import,
    FunctionBody,
    LambdaBody,
    StructBody,
    InterfaceBody,
    EnumBody,
    Loop,
    Branch,
}

impl ScopeKind {
    /// Scopes that may only reach enclosing variables through captures
    pub fn requires_capturing(&self) -> bool {
        matches!(self, ScopeKind::LambdaBody)
    }
}

/// Lifecycle of a declared symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Declared,
    Initialized,
}

/// Stable address of a symbol table entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolId {
    pub scope: ScopeId,
    pub name: String,
}

/// One named entry in a scope's symbol table
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolTableEntry {
    pub name: String,
    ty: QualType,
    pub decl: NodeId,
    pub span: Span,
    /// Scope-local declaration position, used for positional layout such as
    /// struct field order; never changes once assigned
    pub ordinal: usize,
    pub state: EntryState,
    pub used: bool,
}

impl SymbolTableEntry {
    pub fn ty(&self) -> QualType {
        self.ty
    }

    /// Refine an unresolved, type-inferred entry to its concrete type.
    /// Single assignment: refining an already-resolved entry is a compiler
    /// defect.
    pub fn refine_type(&mut self, ty: QualType, registry: &TypeRegistry) {
        if !self.ty.is_unresolved(registry) {
            panic!(
                "compiler bug: symbol '{}' was refined twice; types are single-assignment",
                self.name
            );
        }
        self.ty = ty;
    }

    /// Substitution during monomorphization rewrites the copied entry's type
    /// directly; the generic original keeps its own entry.
    pub(crate) fn set_substituted_type(&mut self, ty: QualType) {
        self.ty = ty;
    }

    pub fn mark_used(&mut self) {
        self.used = true;
    }

    /// A symbol holds a value from this point on. Parameters start
    /// initialized; locals transition on their first assignment.
    pub fn mark_initialized(&mut self) {
        self.state = EntryState::Initialized;
    }
}

/// How a capture binds its target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    ByValue,
    ByReference,
}

/// A scope-local alias to a variable declared in an enclosing scope;
/// aliases, never owns
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    pub name: String,
    pub target: SymbolId,
    pub mode: CaptureMode,
}

/// Name-keyed symbol storage of one scope
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    entries: IndexMap<String, SymbolTableEntry>,
    captures: IndexMap<String, Capture>,
}

impl SymbolTable {
    pub fn get(&self, name: &str) -> Option<&SymbolTableEntry> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut SymbolTableEntry> {
        self.entries.get_mut(name)
    }

    pub fn entries(&self) -> impl Iterator<Item = &SymbolTableEntry> {
        self.entries.values()
    }

    pub fn entries_mut(&mut self) -> impl Iterator<Item = &mut SymbolTableEntry> {
        self.entries.values_mut()
    }

    pub fn captures(&self) -> impl Iterator<Item = &Capture> {
        self.captures.values()
    }

    pub fn capture(&self, name: &str) -> Option<&Capture> {
        self.captures.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A named generic type parameter with its acceptance conditions
#[derive(Debug, Clone, PartialEq)]
pub struct GenericType {
    pub name: String,
    /// Acceptable concrete types; empty means unconstrained
    pub conditions: Vec<QualType>,
    /// Concrete binding inside a substantiated scope
    pub bound: Option<QualType>,
}

impl GenericType {
    pub fn new(name: impl Into<String>, conditions: Vec<QualType>) -> Self {
        Self {
            name: name.into(),
            conditions,
            bound: None,
        }
    }

    /// A placeholder bound to a concrete type during substantiation
    pub fn bound_to(name: impl Into<String>, ty: QualType) -> Self {
        Self {
            name: name.into(),
            conditions: vec![ty],
            bound: Some(ty),
        }
    }

    /// Whether `requested` satisfies the declared type conditions
    pub fn accepts(&self, requested: QualType) -> bool {
        self.conditions.is_empty() || self.conditions.iter().any(|c| c.same_shape(&requested))
    }
}

/// One node of the scope tree
#[derive(Debug, Clone)]
pub struct Scope {
    pub name: String,
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    pub span: Span,
    children: IndexMap<String, ScopeId>,
    pub symbols: SymbolTable,
    /// Generic type parameters bound in this scope
    pub generic_types: IndexMap<String, GenericType>,
    /// Unit scopes resolve names through their imports as well
    pub imports: Vec<ScopeId>,
    pub functions: ManifestationRegistry,
    pub structs: ManifestationRegistry,
    pub interfaces: ManifestationRegistry,
}

impl Scope {
    fn new(name: String, kind: ScopeKind, parent: Option<ScopeId>, span: Span) -> Self {
        Self {
            name,
            kind,
            parent,
            span,
            children: IndexMap::new(),
            symbols: SymbolTable::default(),
            generic_types: IndexMap::new(),
            imports: Vec::new(),
            functions: ManifestationRegistry::default(),
            structs: ManifestationRegistry::default(),
            interfaces: ManifestationRegistry::default(),
        }
    }

    pub fn children(&self) -> impl Iterator<Item = (&String, &ScopeId)> {
        self.children.iter()
    }

    pub fn child(&self, name: &str) -> Option<ScopeId> {
        self.children.get(name).copied()
    }

    pub fn registry(&self, kind: EntityKind) -> &ManifestationRegistry {
        match kind {
            EntityKind::Function => &self.functions,
            EntityKind::Struct => &self.structs,
            EntityKind::Interface => &self.interfaces,
        }
    }

    pub fn registry_mut(&mut self, kind: EntityKind) -> &mut ManifestationRegistry {
        match kind {
            EntityKind::Function => &mut self.functions,
            EntityKind::Struct => &mut self.structs,
            EntityKind::Interface => &mut self.interfaces,
        }
    }
}

/// Arena holding the whole scope tree of one compiler invocation
#[derive(Debug)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeArena {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(
                "root".to_string(),
                ScopeKind::Global,
                None,
                Span::zero(),
            )],
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Insert a uniquely named child scope
    pub fn create_child(
        &mut self,
        parent: ScopeId,
        name: &str,
        kind: ScopeKind,
        span: Span,
    ) -> Result<ScopeId, SemaError> {
        if self.scope(parent).children.contains_key(name) {
            return Err(SemaError::DuplicateSymbol {
                name: name.to_string(),
                span: to_source_span(Some(span)),
            });
        }
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes
            .push(Scope::new(name.to_string(), kind, Some(parent), span));
        self.scope_mut(parent).children.insert(name.to_string(), id);
        Ok(id)
    }

    /// Declare a symbol in a scope. Returns the new entry's address plus a
    /// shadowing warning when the name is already visible in an enclosing
    /// scope; redeclaring within the same scope is an error.
    pub fn declare_symbol(
        &mut self,
        scope: ScopeId,
        name: &str,
        ty: QualType,
        decl: NodeId,
        span: Span,
    ) -> Result<(SymbolId, Option<SemaWarning>), SemaError> {
        if self.scope(scope).symbols.entries.contains_key(name) {
            return Err(SemaError::DuplicateSymbol {
                name: name.to_string(),
                span: to_source_span(Some(span)),
            });
        }
        let warning = if self.visible_in_ancestors(scope, name) {
            Some(SemaWarning::ShadowedSymbol {
                name: name.to_string(),
                span: to_source_span(Some(span)),
            })
        } else {
            None
        };
        let table = &mut self.scope_mut(scope).symbols;
        let ordinal = table.entries.len();
        table.entries.insert(
            name.to_string(),
            SymbolTableEntry {
                name: name.to_string(),
                ty,
                decl,
                span,
                ordinal,
                state: EntryState::Declared,
                used: false,
            },
        );
        Ok((
            SymbolId {
                scope,
                name: name.to_string(),
            },
            warning,
        ))
    }

    fn visible_in_ancestors(&self, scope: ScopeId, name: &str) -> bool {
        let mut current = self.scope(scope).parent;
        while let Some(id) = current {
            if self.scope(id).symbols.entries.contains_key(name) {
                return true;
            }
            current = self.scope(id).parent;
        }
        false
    }

    pub fn symbol(&self, id: &SymbolId) -> &SymbolTableEntry {
        self.scope(id.scope)
            .symbols
            .get(&id.name)
            .unwrap_or_else(|| panic!("compiler bug: dangling symbol id '{}'", id.name))
    }

    pub fn symbol_mut(&mut self, id: &SymbolId) -> &mut SymbolTableEntry {
        let name = id.name.clone();
        self.scope_mut(id.scope)
            .symbols
            .get_mut(&name)
            .unwrap_or_else(|| panic!("compiler bug: dangling symbol id '{name}'"))
    }

    /// Find a symbol by searching this scope, then the parent chain, then the
    /// imports of any unit scope on the way; the found entry is marked used.
    /// When the search crosses a
    /// capture-required scope and the entry lives in an outer, non-import,
    /// non-global scope, a capture alias is recorded in every
    /// capture-required scope that was crossed.
    pub fn lookup_symbol(&mut self, from: ScopeId, name: &str) -> Option<SymbolId> {
        let mut capturing_scopes: Vec<ScopeId> = Vec::new();
        let mut current = Some(from);
        let mut via_import = false;
        let mut found: Option<ScopeId> = None;

        while let Some(id) = current {
            if self.scope(id).symbols.entries.contains_key(name) {
                found = Some(id);
                break;
            }
            if self.scope(id).kind == ScopeKind::Unit {
                let imports = self.scope(id).imports.clone();
                for import in imports {
                    if self.scope(import).symbols.entries.contains_key(name) {
                        found = Some(import);
                        via_import = true;
                        break;
                    }
                }
                if found.is_some() {
                    break;
                }
            }
            if self.scope(id).kind.requires_capturing() {
                capturing_scopes.push(id);
            }
            current = self.scope(id).parent;
        }

        let defining = found?;
        let defining_kind = self.scope(defining).kind;
        let capturable = !via_import
            && !matches!(
                defining_kind,
                ScopeKind::Global | ScopeKind::Unit | ScopeKind::Import
            );
        let target = SymbolId {
            scope: defining,
            name: name.to_string(),
        };
        self.symbol_mut(&target).mark_used();
        if capturable {
            for capturing in capturing_scopes {
                let captures = &mut self.scope_mut(capturing).symbols.captures;
                captures
                    .entry(name.to_string())
                    .or_insert_with(|| Capture {
                        name: name.to_string(),
                        target: target.clone(),
                        mode: CaptureMode::ByReference,
                    });
            }
        }
        Some(target)
    }

    /// Change how an existing capture binds its target. Lookup records every
    /// capture by reference; escape analysis downgrades the ones that outlive
    /// their frame to by-value.
    pub fn set_capture_mode(&mut self, scope: ScopeId, name: &str, mode: CaptureMode) {
        match self.scope_mut(scope).symbols.captures.get_mut(name) {
            Some(capture) => capture.mode = mode,
            None => panic!("compiler bug: capture mode set for unknown capture '{name}'"),
        }
    }

    pub fn bind_generic_type(&mut self, scope: ScopeId, generic: GenericType) {
        self.scope_mut(scope)
            .generic_types
            .insert(generic.name.clone(), generic);
    }

    /// Find a generic type parameter visible from a scope
    pub fn lookup_generic_type(&self, from: ScopeId, name: &str) -> Option<&GenericType> {
        let mut current = Some(from);
        while let Some(id) = current {
            if let Some(generic) = self.scope(id).generic_types.get(name) {
                return Some(generic);
            }
            current = self.scope(id).parent;
        }
        None
    }

    /// Deep-duplicate a child scope and its entire subtree under a new name,
    /// so a generic manifestation gets an independent body that can be
    /// substituted without disturbing the generic original. Internal
    /// references (capture targets, manifestation body scopes) are remapped
    /// into the copy.
    pub fn copy_child(
        &mut self,
        parent: ScopeId,
        child_name: &str,
        new_name: &str,
    ) -> Result<ScopeId, SemaError> {
        let source = self.scope(parent).child(child_name).unwrap_or_else(|| {
            panic!("compiler bug: copy of unknown child scope '{child_name}'")
        });
        if self.scope(parent).children.contains_key(new_name) {
            return Err(SemaError::DuplicateSymbol {
                name: new_name.to_string(),
                span: to_source_span(Some(self.scope(source).span)),
            });
        }
        let mut id_map: HashMap<ScopeId, ScopeId> = HashMap::new();
        let copy = self.copy_subtree(source, parent, new_name.to_string(), &mut id_map);
        self.scope_mut(parent)
            .children
            .insert(new_name.to_string(), copy);
        self.remap_copied_references(&id_map);
        Ok(copy)
    }

    fn copy_subtree(
        &mut self,
        source: ScopeId,
        new_parent: ScopeId,
        new_name: String,
        id_map: &mut HashMap<ScopeId, ScopeId>,
    ) -> ScopeId {
        let mut copied = self.scope(source).clone();
        copied.name = new_name;
        copied.parent = Some(new_parent);
        let original_children: Vec<(String, ScopeId)> = copied
            .children
            .iter()
            .map(|(n, id)| (n.clone(), *id))
            .collect();
        copied.children.clear();

        let new_id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(copied);
        id_map.insert(source, new_id);

        for (child_name, child_id) in original_children {
            let new_child = self.copy_subtree(child_id, new_id, child_name.clone(), id_map);
            self.scope_mut(new_id).children.insert(child_name, new_child);
        }
        new_id
    }

    fn remap_copied_references(&mut self, id_map: &HashMap<ScopeId, ScopeId>) {
        for &new_id in id_map.values() {
            let scope = self.scope_mut(new_id);
            for capture in scope.symbols.captures.values_mut() {
                if let Some(&mapped) = id_map.get(&capture.target.scope) {
                    capture.target.scope = mapped;
                }
            }
            for kind in [EntityKind::Function, EntityKind::Struct, EntityKind::Interface] {
                for manifestation in scope.registry_mut(kind).manifestations_mut() {
                    if let Some(body) = manifestation.body_scope {
                        if let Some(&mapped) = id_map.get(&body) {
                            manifestation.body_scope = Some(mapped);
                        }
                    }
                }
            }
        }
    }

    /// Non-fatal findings over the whole tree, in declaration order
    pub fn collect_unused_warnings(&self) -> Vec<SemaWarning> {
        let mut warnings = Vec::new();
        for scope in &self.scopes {
            for entry in scope.symbols.entries() {
                if !entry.used {
                    warnings.push(SemaWarning::UnusedSymbol {
                        name: entry.name.clone(),
                        span: to_source_span(Some(entry.span)),
                    });
                }
            }
        }
        warnings
    }

    /// Every cached manifestation is about to be addressed by the backend;
    /// one still carrying a placeholder is a compiler defect
    pub(crate) fn assert_cached_fully_substantiated(&self, registry: &TypeRegistry) {
        for scope in &self.scopes {
            for kind in [EntityKind::Function, EntityKind::Struct, EntityKind::Interface] {
                for manifestation in scope.registry(kind).manifestations() {
                    if manifestation.state == ManifestationState::Cached
                        && !manifestation.is_fully_substantiated(registry)
                    {
                        panic!(
                            "compiler bug: manifestation '{}' reached the backend gate with unresolved placeholders",
                            manifestation.signature(registry)
                        );
                    }
                }
            }
        }
    }

    /// Apply a closure to a registered manifestation
    pub(crate) fn with_manifestation_mut<R>(
        &mut self,
        id: &crate::manifestation::ManifestationId,
        f: impl FnOnce(&mut Manifestation) -> R,
    ) -> R {
        let scope = self.scope_mut(id.scope);
        let manifestation = scope
            .registry_mut(id.kind)
            .get_mut(id.group, &id.signature)
            .unwrap_or_else(|| {
                panic!(
                    "compiler bug: manifestation '{}' requested but never registered",
                    id.signature
                )
            });
        f(manifestation)
    }

    pub fn manifestation(&self, id: &crate::manifestation::ManifestationId) -> &Manifestation {
        self.scope(id.scope)
            .registry(id.kind)
            .get(id.group, &id.signature)
            .unwrap_or_else(|| {
                panic!(
                    "compiler bug: manifestation '{}' requested but never registered",
                    id.signature
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::PrimitiveKind;
    use crate::qual_type::QualType;

    fn int(registry: &mut TypeRegistry) -> QualType {
        QualType::primitive(registry, PrimitiveKind::Int)
    }

    #[test]
    fn test_child_names_are_unique() {
        let mut arena = ScopeArena::new();
        let root = arena.root();
        arena
            .create_child(root, "fn:main", ScopeKind::FunctionBody, Span::zero())
            .unwrap();
        assert!(arena
            .create_child(root, "fn:main", ScopeKind::FunctionBody, Span::zero())
            .is_err());
    }

    #[test]
    fn test_ordinals_increase_monotonically() {
        let mut registry = TypeRegistry::new();
        let mut arena = ScopeArena::new();
        let root = arena.root();
        let ty = int(&mut registry);
        for (i, name) in ["a", "b", "c"].iter().enumerate() {
            let (id, _) = arena
                .declare_symbol(root, name, ty, NodeId(i as u64), Span::zero())
                .unwrap();
            assert_eq!(arena.symbol(&id).ordinal, i);
        }
    }

    #[test]
    fn test_shadowing_warns_but_succeeds() {
        let mut registry = TypeRegistry::new();
        let mut arena = ScopeArena::new();
        let root = arena.root();
        let ty = int(&mut registry);
        let body = arena
            .create_child(root, "fn:f", ScopeKind::FunctionBody, Span::zero())
            .unwrap();
        arena
            .declare_symbol(root, "x", ty, NodeId(1), Span::zero())
            .unwrap();
        let (_, warning) = arena
            .declare_symbol(body, "x", ty, NodeId(2), Span::zero())
            .unwrap();
        assert!(matches!(
            warning,
            Some(SemaWarning::ShadowedSymbol { .. })
        ));
    }

    #[test]
    fn test_sibling_lambdas_get_independent_captures() {
        let mut registry = TypeRegistry::new();
        let mut arena = ScopeArena::new();
        let root = arena.root();
        let ty = int(&mut registry);
        let body = arena
            .create_child(root, "fn:f", ScopeKind::FunctionBody, Span::zero())
            .unwrap();
        let (outer_x, _) = arena
            .declare_symbol(body, "x", ty, NodeId(1), Span::zero())
            .unwrap();
        let lambda_a = arena
            .create_child(body, "lambda:0", ScopeKind::LambdaBody, Span::zero())
            .unwrap();
        let lambda_b = arena
            .create_child(body, "lambda:1", ScopeKind::LambdaBody, Span::zero())
            .unwrap();

        let found_a = arena.lookup_symbol(lambda_a, "x").unwrap();
        let found_b = arena.lookup_symbol(lambda_b, "x").unwrap();
        // Both captures alias the same outer entry
        assert_eq!(found_a, outer_x);
        assert_eq!(found_b, outer_x);

        let capture_a = arena.scope(lambda_a).symbols.capture("x").unwrap().clone();
        let capture_b = arena.scope(lambda_b).symbols.capture("x").unwrap().clone();
        assert_eq!(capture_a.target, outer_x);
        assert_eq!(capture_b.target, outer_x);
        // Independent capture records, not shared state
        assert!(arena.scope(lambda_a).symbols.capture("x").is_some());
        arena.scope_mut(lambda_b).symbols.captures.clear();
        assert!(arena.scope(lambda_a).symbols.capture("x").is_some());
    }

    #[test]
    fn test_global_lookup_records_no_capture() {
        let mut registry = TypeRegistry::new();
        let mut arena = ScopeArena::new();
        let root = arena.root();
        let ty = int(&mut registry);
        arena
            .declare_symbol(root, "g", ty, NodeId(1), Span::zero())
            .unwrap();
        let lambda = arena
            .create_child(root, "lambda:0", ScopeKind::LambdaBody, Span::zero())
            .unwrap();
        assert!(arena.lookup_symbol(lambda, "g").is_some());
        assert!(arena.scope(lambda).symbols.capture("g").is_none());
    }

    #[test]
    fn test_copy_child_duplicates_subtree_independently() {
        let mut registry = TypeRegistry::new();
        let mut arena = ScopeArena::new();
        let root = arena.root();
        let ty = int(&mut registry);
        let body = arena
            .create_child(root, "struct:Box", ScopeKind::StructBody, Span::zero())
            .unwrap();
        arena
            .declare_symbol(body, "value", ty, NodeId(1), Span::zero())
            .unwrap();
        let inner = arena
            .create_child(body, "fn:get", ScopeKind::FunctionBody, Span::zero())
            .unwrap();
        arena
            .declare_symbol(inner, "self", ty, NodeId(2), Span::zero())
            .unwrap();

        let copy = arena.copy_child(root, "struct:Box", "struct:Box.int").unwrap();
        assert_ne!(copy, body);
        let copied_inner = arena.scope(copy).child("fn:get").unwrap();
        assert_ne!(copied_inner, inner);
        assert_eq!(arena.scope(copied_inner).parent, Some(copy));

        // Mutating the copy leaves the original untouched
        let copied_value = SymbolId {
            scope: copy,
            name: "value".to_string(),
        };
        arena.symbol_mut(&copied_value).mark_used();
        let original_value = SymbolId {
            scope: body,
            name: "value".to_string(),
        };
        assert!(!arena.symbol(&original_value).used);
    }

    #[test]
    fn test_refine_type_resolves_inferred_symbols_once() {
        let mut registry = TypeRegistry::new();
        let mut arena = ScopeArena::new();
        let root = arena.root();
        let pending = QualType::new(registry.intern_base(crate::types::TypeElement::Unresolved));
        let (id, _) = arena
            .declare_symbol(root, "inferred", pending, NodeId(1), Span::zero())
            .unwrap();
        assert!(arena.symbol(&id).ty().is_unresolved(&registry));

        let ty = int(&mut registry);
        arena.symbol_mut(&id).refine_type(ty, &registry);
        assert_eq!(arena.symbol(&id).ty().handle(), ty.handle());
    }

    #[test]
    #[should_panic(expected = "single-assignment")]
    fn test_refining_twice_is_a_compiler_defect() {
        let mut registry = TypeRegistry::new();
        let mut arena = ScopeArena::new();
        let root = arena.root();
        let ty = int(&mut registry);
        let (id, _) = arena
            .declare_symbol(root, "x", ty, NodeId(1), Span::zero())
            .unwrap();
        arena.symbol_mut(&id).refine_type(ty, &registry);
    }

    #[test]
    fn test_lookup_through_unit_imports() {
        let mut registry = TypeRegistry::new();
        let mut arena = ScopeArena::new();
        let root = arena.root();
        let ty = int(&mut registry);
        let lib = arena
            .create_child(root, "unit:lib", ScopeKind::Unit, Span::zero())
            .unwrap();
        let app = arena
            .create_child(root, "unit:app", ScopeKind::Unit, Span::zero())
            .unwrap();
        arena
            .declare_symbol(lib, "shared", ty, NodeId(1), Span::zero())
            .unwrap();
        arena.scope_mut(app).imports.push(lib);

        let found = arena.lookup_symbol(app, "shared").unwrap();
        assert_eq!(found.scope, lib);
    }
}
