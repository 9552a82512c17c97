//! Declaration pass and analyzer entry point
//!
//! The pass walks every compilation unit in dependency order, builds the
//! scope tree and registers generic entities into their owning scopes. Once
//! every declaration is visible, repeated resolution calls go through the
//! entity managers. Non-fatal semantic errors accumulate; compilation must
//! not reach the backend when any were recorded.

use crate::ast::{
    FunctionDecl, GlobalDecl, InterfaceDecl, Item, NodeId, Span, StructDecl, TypeExpr, Unit,
};
use crate::error::{to_source_span, SemaError, SemaWarning};
use crate::managers::{self, MatchCache, MatchRequest};
use crate::manifestation::{
    EntityKind, Manifestation, ManifestationId, ManifestationState,
};
use crate::qual_type::QualType;
use crate::scope::{GenericType, ScopeArena, ScopeId, ScopeKind};
use crate::types::{TypeChain, TypeElement, TypeRegistry};
use crate::unit_graph::UnitGraph;
use indexmap::IndexMap;

/// Semantic analysis state for one whole-program compiler invocation
///
/// Owns the type intern table, the scope tree and every lookup cache, so
/// resetting between independent invocations is dropping the value and
/// constructing a fresh one.
#[derive(Debug)]
pub struct SemanticAnalyzer {
    pub registry: TypeRegistry,
    pub scopes: ScopeArena,
    pub cache: MatchCache,
    errors: Vec<SemaError>,
    warnings: Vec<SemaWarning>,
    unit_scopes: IndexMap<String, ScopeId>,
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self {
            registry: TypeRegistry::new(),
            scopes: ScopeArena::new(),
            cache: MatchCache::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            unit_scopes: IndexMap::new(),
        }
    }

    /// Declare all units in strict dependency order: a unit's imports are
    /// fully declared before the importer's own declarations are processed.
    /// Graph errors are fatal; per-item errors accumulate and analysis of
    /// unrelated declarations continues.
    pub fn declare_units(&mut self, units: &[Unit]) -> Result<(), SemaError> {
        let mut graph = UnitGraph::new();
        for unit in units {
            graph.add_unit(unit);
        }
        let known: Vec<&str> = units.iter().map(|u| u.name.as_str()).collect();
        let order = graph.compilation_order(&known)?;

        let by_name: IndexMap<&str, &Unit> =
            units.iter().map(|u| (u.name.as_str(), u)).collect();
        for name in &order {
            let unit = by_name[name.as_str()];
            self.declare_unit(unit)?;
        }
        Ok(())
    }

    fn declare_unit(&mut self, unit: &Unit) -> Result<(), SemaError> {
        let scope = self
            .scopes
            .create_child(self.scopes.root(), &unit.name, ScopeKind::Unit, unit.span)?;
        for import in &unit.imports {
            let import_scope = *self
                .unit_scopes
                .get(import)
                .expect("units are declared in dependency order");
            self.scopes.scope_mut(scope).imports.push(import_scope);
        }
        self.unit_scopes.insert(unit.name.clone(), scope);

        for item in &unit.items {
            let result = match item {
                Item::Function(decl) => self.declare_function(scope, decl),
                Item::Struct(decl) => self.declare_struct(scope, decl),
                Item::Interface(decl) => self.declare_interface(scope, decl),
                Item::Global(decl) => self.declare_global(scope, decl),
            };
            if let Err(error) = result {
                self.record_error(error);
            }
        }
        Ok(())
    }

    fn declare_function(&mut self, scope: ScopeId, decl: &FunctionDecl) -> Result<(), SemaError> {
        let body = self.scopes.create_child(
            scope,
            &format!("fn:{}:{}", decl.name, decl.id.0),
            ScopeKind::FunctionBody,
            decl.span,
        )?;
        let (generic_params, template_types) = self.bind_generic_params(body, decl.span, &decl.generic_params)?;

        let receiver_type = match &decl.receiver {
            Some(expr) => Some(self.resolve_type_expr(body, expr, decl.span)?),
            None => None,
        };
        let return_type = match &decl.return_type {
            Some(expr) => Some(self.resolve_type_expr(body, expr, decl.span)?),
            None => None,
        };

        let mut params = Vec::with_capacity(decl.params.len());
        let mut optional = Vec::with_capacity(decl.params.len());
        for param in &decl.params {
            let ty = self.resolve_type_expr(body, &param.ty, param.span)?;
            let (symbol, warning) =
                self.scopes
                    .declare_symbol(body, &param.name, ty, decl.id, param.span)?;
            if let Some(warning) = warning {
                self.record_warning(warning);
            }
            // Parameters hold a value from the call boundary on
            self.scopes.symbol_mut(&symbol).mark_initialized();
            params.push(crate::manifestation::Param {
                name: param.name.clone(),
                ty,
                span: param.span,
            });
            optional.push(param.optional);
        }

        let base = Manifestation {
            kind: EntityKind::Function,
            name: decl.name.clone(),
            decl: decl.id,
            span: decl.span,
            is_public: decl.is_public,
            receiver_type,
            params,
            return_type,
            template_types,
            generic_params,
            fields: Vec::new(),
            implements: Vec::new(),
            body_scope: Some(body),
            generic_origin: None,
            state: ManifestationState::Registered,
        };
        managers::insert_function(&mut self.scopes, &mut self.registry, scope, base, &optional)
    }

    fn declare_struct(&mut self, scope: ScopeId, decl: &StructDecl) -> Result<(), SemaError> {
        let body = self.scopes.create_child(
            scope,
            &format!("struct:{}", decl.name),
            ScopeKind::StructBody,
            decl.span,
        )?;
        let (generic_params, template_types) = self.bind_generic_params(body, decl.span, &decl.generic_params)?;

        let mut fields = Vec::with_capacity(decl.fields.len());
        for field in &decl.fields {
            let ty = self.resolve_type_expr(body, &field.ty, field.span)?;
            let (_, warning) =
                self.scopes
                    .declare_symbol(body, &field.name, ty, decl.id, field.span)?;
            if let Some(warning) = warning {
                self.record_warning(warning);
            }
            fields.push(crate::manifestation::Field {
                name: field.name.clone(),
                ty,
                span: field.span,
            });
        }

        let mut implements = Vec::with_capacity(decl.implements.len());
        for expr in &decl.implements {
            implements.push(self.resolve_type_expr(body, expr, decl.span)?);
        }

        let base = Manifestation {
            kind: EntityKind::Struct,
            name: decl.name.clone(),
            decl: decl.id,
            span: decl.span,
            is_public: decl.is_public,
            receiver_type: None,
            params: Vec::new(),
            return_type: None,
            template_types,
            generic_params,
            fields,
            implements,
            body_scope: Some(body),
            generic_origin: None,
            state: ManifestationState::Registered,
        };
        managers::insert_struct(&mut self.scopes, &mut self.registry, scope, base)
    }

    fn declare_interface(&mut self, scope: ScopeId, decl: &InterfaceDecl) -> Result<(), SemaError> {
        let body = self.scopes.create_child(
            scope,
            &format!("interface:{}", decl.name),
            ScopeKind::InterfaceBody,
            decl.span,
        )?;
        let (generic_params, template_types) = self.bind_generic_params(body, decl.span, &decl.generic_params)?;

        // Method signatures register as function manifestations inside the
        // interface body, so substantiating the interface substitutes them
        for method in &decl.methods {
            if let Err(error) = self.declare_function(body, method) {
                self.record_error(error);
            }
        }

        let base = Manifestation {
            kind: EntityKind::Interface,
            name: decl.name.clone(),
            decl: decl.id,
            span: decl.span,
            is_public: decl.is_public,
            receiver_type: None,
            params: Vec::new(),
            return_type: None,
            template_types,
            generic_params,
            fields: Vec::new(),
            implements: Vec::new(),
            body_scope: Some(body),
            generic_origin: None,
            state: ManifestationState::Registered,
        };
        managers::insert_interface(&mut self.scopes, &mut self.registry, scope, base)
    }

    fn declare_global(&mut self, scope: ScopeId, decl: &GlobalDecl) -> Result<(), SemaError> {
        let ty = self.resolve_type_expr(scope, &decl.ty, decl.span)?;
        let (_, warning) = self
            .scopes
            .declare_symbol(scope, &decl.name, ty, decl.id, decl.span)?;
        if let Some(warning) = warning {
            self.record_warning(warning);
        }
        Ok(())
    }

    /// Bind a declaration's generic parameters into its body scope and build
    /// the placeholder template slots
    fn bind_generic_params(
        &mut self,
        body: ScopeId,
        span: Span,
        decls: &[crate::ast::GenericParamDecl],
    ) -> Result<(Vec<GenericType>, Vec<QualType>), SemaError> {
        let mut generic_params = Vec::with_capacity(decls.len());
        let mut template_types = Vec::with_capacity(decls.len());
        for param in decls {
            let mut conditions = Vec::with_capacity(param.conditions.len());
            for condition in &param.conditions {
                conditions.push(self.resolve_type_expr(body, condition, span)?);
            }
            let generic = GenericType::new(param.name.clone(), conditions);
            self.scopes.bind_generic_type(body, generic.clone());
            generic_params.push(generic);
            template_types.push(QualType::new(
                self.registry
                    .intern_base(TypeElement::Generic(param.name.clone())),
            ));
        }
        Ok((generic_params, template_types))
    }

    /// Resolve a surface type expression against a scope
    pub fn resolve_type_expr(
        &mut self,
        scope: ScopeId,
        expr: &TypeExpr,
        span: Span,
    ) -> Result<QualType, SemaError> {
        match expr {
            TypeExpr::Primitive(kind) => Ok(QualType::primitive(&mut self.registry, *kind)),
            TypeExpr::Named {
                name,
                template_args,
            } => {
                if let Some(generic) = self.scopes.lookup_generic_type(scope, name) {
                    // Inside a substantiated scope the placeholder is bound
                    if let Some(bound) = generic.bound {
                        return Ok(bound);
                    }
                    return Ok(QualType::new(
                        self.registry
                            .intern_base(TypeElement::Generic(name.clone())),
                    ));
                }
                let mut args = Vec::with_capacity(template_args.len());
                for arg in template_args {
                    args.push(self.resolve_type_expr(scope, arg, span)?);
                }
                if let Some((kind, decl)) = self.find_entity_decl(scope, name) {
                    let element = match kind {
                        EntityKind::Struct => TypeElement::Struct {
                            name: name.clone(),
                            decl,
                            template_types: args,
                        },
                        EntityKind::Interface => TypeElement::Interface {
                            name: name.clone(),
                            decl,
                            template_types: args,
                        },
                        EntityKind::Function => unreachable!("functions are not named types"),
                    };
                    return Ok(QualType::new(self.registry.intern(TypeChain::new(element))));
                }
                Err(SemaError::UnknownType {
                    name: name.clone(),
                    span: to_source_span(Some(span)),
                })
            }
            TypeExpr::Pointer(inner) => {
                let contained = self.resolve_type_expr(scope, inner, span)?;
                Ok(contained.to_pointer(&mut self.registry, span)?)
            }
            TypeExpr::Reference(inner) => {
                let contained = self.resolve_type_expr(scope, inner, span)?;
                Ok(contained.to_reference(&mut self.registry, span)?)
            }
            TypeExpr::Array { element, size } => {
                let contained = self.resolve_type_expr(scope, element, span)?;
                Ok(contained.to_array(&mut self.registry, *size, span)?)
            }
            TypeExpr::Function {
                param_types,
                return_type,
            } => {
                let mut params = Vec::with_capacity(param_types.len());
                for param in param_types {
                    params.push(self.resolve_type_expr(scope, param, span)?);
                }
                let element = match return_type {
                    Some(ret) => TypeElement::Function {
                        param_types: params,
                        return_type: self.resolve_type_expr(scope, ret, span)?,
                    },
                    None => TypeElement::Procedure {
                        param_types: params,
                    },
                };
                Ok(QualType::new(self.registry.intern(TypeChain::new(element))))
            }
        }
    }

    /// Find a struct or interface declaration site by name, scope chain and
    /// unit imports included
    fn find_entity_decl(&self, from: ScopeId, name: &str) -> Option<(EntityKind, NodeId)> {
        let mut current = Some(from);
        while let Some(id) = current {
            let scope = self.scopes.scope(id);
            for kind in [EntityKind::Struct, EntityKind::Interface] {
                if let Some(base) = scope.registry(kind).base_by_name(name) {
                    return Some((kind, base.decl));
                }
            }
            if scope.kind == ScopeKind::Unit {
                for &import in &scope.imports {
                    for kind in [EntityKind::Struct, EntityKind::Interface] {
                        if let Some(base) =
                            self.scopes.scope(import).registry(kind).base_by_name(name)
                        {
                            return Some((kind, base.decl));
                        }
                    }
                }
            }
            current = scope.parent;
        }
        None
    }

    pub fn unit_scope(&self, name: &str) -> Option<ScopeId> {
        self.unit_scopes.get(name).copied()
    }

    /// Resolve a function call request
    pub fn match_function(
        &mut self,
        request: &MatchRequest<'_>,
    ) -> Result<Option<ManifestationId>, SemaError> {
        managers::match_function(&mut self.scopes, &mut self.registry, &mut self.cache, request)
    }

    /// Resolve a struct instantiation request
    pub fn match_struct(
        &mut self,
        request: &MatchRequest<'_>,
    ) -> Result<Option<ManifestationId>, SemaError> {
        managers::match_struct(&mut self.scopes, &mut self.registry, &mut self.cache, request)
    }

    /// Resolve an interface instantiation request
    pub fn match_interface(
        &mut self,
        request: &MatchRequest<'_>,
    ) -> Result<Option<ManifestationId>, SemaError> {
        managers::match_interface(&mut self.scopes, &mut self.registry, &mut self.cache, request)
    }

    /// Like [`Self::match_function`], but a missing match is an error. For
    /// call sites where the caller has no fallback.
    pub fn resolve_function(
        &mut self,
        request: &MatchRequest<'_>,
    ) -> Result<ManifestationId, SemaError> {
        self.match_function(request)?
            .ok_or_else(|| Self::not_found(EntityKind::Function, request))
    }

    pub fn resolve_struct(
        &mut self,
        request: &MatchRequest<'_>,
    ) -> Result<ManifestationId, SemaError> {
        self.match_struct(request)?
            .ok_or_else(|| Self::not_found(EntityKind::Struct, request))
    }

    pub fn resolve_interface(
        &mut self,
        request: &MatchRequest<'_>,
    ) -> Result<ManifestationId, SemaError> {
        self.match_interface(request)?
            .ok_or_else(|| Self::not_found(EntityKind::Interface, request))
    }

    fn not_found(kind: EntityKind, request: &MatchRequest<'_>) -> SemaError {
        SemaError::NotFound {
            kind: kind.as_str(),
            name: request.name.to_string(),
            span: to_source_span(Some(request.span)),
        }
    }

    pub fn manifestation(&self, id: &ManifestationId) -> &Manifestation {
        self.scopes.manifestation(id)
    }

    /// The backend-facing name of a resolved manifestation
    pub fn mangled_name<'a>(&self, id: &'a ManifestationId) -> &'a str {
        &id.signature
    }

    pub fn record_error(&mut self, error: SemaError) {
        self.errors.push(error);
    }

    pub fn record_warning(&mut self, warning: SemaWarning) {
        self.warnings.push(warning);
    }

    pub fn errors(&self) -> &[SemaError] {
        &self.errors
    }

    /// Recorded warnings plus unused-symbol findings over the final tree
    pub fn collect_warnings(&self) -> Vec<SemaWarning> {
        let mut warnings = self.warnings.clone();
        warnings.extend(self.scopes.collect_unused_warnings());
        warnings
    }

    /// Backend gate: succeeds only when no semantic error was recorded.
    /// Panics when a cached manifestation still carries a placeholder; that
    /// can never come from user input.
    pub fn finish(&self) -> Result<(), Vec<SemaError>> {
        if !self.errors.is_empty() {
            return Err(self.errors.clone());
        }
        self.scopes.assert_cached_fully_substantiated(&self.registry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{FieldDecl, GenericParamDecl, ParamDecl, PrimitiveKind};

    fn boxed_struct_unit() -> Unit {
        let mut unit = Unit::new("main");
        unit.add_item(Item::Struct(StructDecl {
            id: NodeId(1),
            name: "Box".to_string(),
            generic_params: vec![GenericParamDecl {
                name: "T".to_string(),
                conditions: Vec::new(),
                span: Span::zero(),
            }],
            fields: vec![FieldDecl {
                name: "value".to_string(),
                ty: TypeExpr::Named {
                    name: "T".to_string(),
                    template_args: Vec::new(),
                },
                span: Span::zero(),
            }],
            implements: Vec::new(),
            is_public: true,
            span: Span::zero(),
        }));
        unit
    }

    #[test]
    fn test_declaration_builds_scope_and_registry() {
        let mut analyzer = SemanticAnalyzer::new();
        analyzer.declare_units(&[boxed_struct_unit()]).unwrap();
        let unit = analyzer.unit_scope("main").unwrap();
        let body = analyzer.scopes.scope(unit).child("struct:Box").unwrap();
        assert_eq!(analyzer.scopes.scope(body).kind, ScopeKind::StructBody);
        assert!(analyzer
            .scopes
            .scope(unit)
            .registry(EntityKind::Struct)
            .base_by_name("Box")
            .is_some());
        assert!(analyzer.finish().is_ok());
    }

    #[test]
    fn test_unknown_type_is_accumulated_not_fatal() {
        let mut unit = Unit::new("main");
        unit.add_item(Item::Global(GlobalDecl {
            id: NodeId(1),
            name: "g".to_string(),
            ty: TypeExpr::Named {
                name: "Missing".to_string(),
                template_args: Vec::new(),
            },
            is_public: false,
            span: Span::zero(),
        }));
        unit.add_item(Item::Global(GlobalDecl {
            id: NodeId(2),
            name: "h".to_string(),
            ty: TypeExpr::Primitive(PrimitiveKind::Int),
            is_public: false,
            span: Span::zero(),
        }));

        let mut analyzer = SemanticAnalyzer::new();
        analyzer.declare_units(&[unit]).unwrap();
        // The bad global is reported, the good one still declared
        assert_eq!(analyzer.errors().len(), 1);
        assert!(matches!(
            analyzer.errors()[0],
            SemaError::UnknownType { .. }
        ));
        let scope = analyzer.unit_scope("main").unwrap();
        assert!(analyzer.scopes.scope(scope).symbols.get("h").is_some());
        assert!(analyzer.finish().is_err());
    }

    #[test]
    fn test_optional_params_expand_into_overloads() {
        let mut unit = Unit::new("main");
        unit.add_item(Item::Function(FunctionDecl {
            id: NodeId(1),
            name: "log".to_string(),
            receiver: None,
            generic_params: Vec::new(),
            params: vec![
                ParamDecl {
                    name: "message".to_string(),
                    ty: TypeExpr::Primitive(PrimitiveKind::String),
                    optional: false,
                    span: Span::zero(),
                },
                ParamDecl {
                    name: "level".to_string(),
                    ty: TypeExpr::Primitive(PrimitiveKind::Int),
                    optional: true,
                    span: Span::zero(),
                },
            ],
            return_type: None,
            is_public: false,
            span: Span::zero(),
        }));

        let mut analyzer = SemanticAnalyzer::new();
        analyzer.declare_units(&[unit]).unwrap();
        let scope = analyzer.unit_scope("main").unwrap();
        let registry = analyzer.scopes.scope(scope).registry(EntityKind::Function);
        assert_eq!(registry.len(), 2);
        let arities: Vec<usize> = registry.manifestations().map(|m| m.params.len()).collect();
        assert!(arities.contains(&1));
        assert!(arities.contains(&2));
    }
}
