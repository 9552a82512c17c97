//! JSON debug dumps of the scope tree
//!
//! Compiler-developer tooling: serializes the full scope hierarchy with
//! symbols, captures and registered manifestations so scope construction and
//! substantiation can be inspected after a run.

use crate::manifestation::EntityKind;
use crate::scope::{CaptureMode, EntryState, Scope, ScopeArena, ScopeId};
use crate::types::TypeRegistry;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ScopeDump {
    pub name: String,
    pub kind: String,
    pub symbols: Vec<SymbolDump>,
    pub captures: Vec<CaptureDump>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub generic_types: Vec<GenericTypeDump>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub manifestations: Vec<ManifestationDump>,
    pub children: Vec<ScopeDump>,
}

#[derive(Debug, Serialize)]
pub struct SymbolDump {
    pub name: String,
    pub r#type: String,
    pub ordinal: usize,
    pub state: String,
    pub used: bool,
}

#[derive(Debug, Serialize)]
pub struct CaptureDump {
    pub name: String,
    pub target_scope: String,
    pub target_symbol: String,
    pub mode: String,
}

#[derive(Debug, Serialize)]
pub struct GenericTypeDump {
    pub name: String,
    pub conditions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bound: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ManifestationDump {
    pub kind: String,
    pub name: String,
    pub signature: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generic_origin: Option<String>,
}

/// Serialize the whole scope tree, root downward
pub fn dump_scopes(scopes: &ScopeArena, registry: &TypeRegistry) -> String {
    let dump = dump_scope(scopes, registry, scopes.root());
    serde_json::to_string_pretty(&dump).expect("scope dump serialization cannot fail")
}

fn dump_scope(scopes: &ScopeArena, registry: &TypeRegistry, id: ScopeId) -> ScopeDump {
    let scope = scopes.scope(id);
    ScopeDump {
        name: scope.name.clone(),
        kind: format!("{:?}", scope.kind),
        symbols: dump_symbols(scope, registry),
        captures: dump_captures(scopes, scope),
        generic_types: dump_generics(scope, registry),
        manifestations: dump_manifestations(scope),
        children: scope
            .children()
            .map(|(_, &child)| dump_scope(scopes, registry, child))
            .collect(),
    }
}

fn dump_symbols(scope: &Scope, registry: &TypeRegistry) -> Vec<SymbolDump> {
    scope
        .symbols
        .entries()
        .map(|entry| SymbolDump {
            name: entry.name.clone(),
            r#type: registry.display(entry.ty()),
            ordinal: entry.ordinal,
            state: match entry.state {
                EntryState::Declared => "declared".to_string(),
                EntryState::Initialized => "initialized".to_string(),
            },
            used: entry.used,
        })
        .collect()
}

fn dump_captures(scopes: &ScopeArena, scope: &Scope) -> Vec<CaptureDump> {
    scope
        .symbols
        .captures()
        .map(|capture| CaptureDump {
            name: capture.name.clone(),
            target_scope: scopes.scope(capture.target.scope).name.clone(),
            target_symbol: capture.target.name.clone(),
            mode: match capture.mode {
                CaptureMode::ByValue => "by-value".to_string(),
                CaptureMode::ByReference => "by-reference".to_string(),
            },
        })
        .collect()
}

fn dump_generics(scope: &Scope, registry: &TypeRegistry) -> Vec<GenericTypeDump> {
    scope
        .generic_types
        .values()
        .map(|generic| GenericTypeDump {
            name: generic.name.clone(),
            conditions: generic
                .conditions
                .iter()
                .map(|&c| registry.display(c))
                .collect(),
            bound: generic.bound.map(|b| registry.display(b)),
        })
        .collect()
}

fn dump_manifestations(scope: &Scope) -> Vec<ManifestationDump> {
    let mut out = Vec::new();
    for kind in [EntityKind::Function, EntityKind::Struct, EntityKind::Interface] {
        for (signature, manifestation) in scope
            .registry(kind)
            .groups()
            .flat_map(|(_, group)| group.iter())
        {
            out.push(ManifestationDump {
                kind: kind.as_str().to_string(),
                name: manifestation.name.clone(),
                signature: signature.clone(),
                state: format!("{:?}", manifestation.state),
                generic_origin: manifestation.generic_origin.clone(),
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{NodeId, Span};
    use crate::qual_type::QualType;
    use crate::scope::ScopeKind;
    use crate::types::TypeElement;

    #[test]
    fn test_dump_contains_symbols_and_children() {
        let mut registry = TypeRegistry::new();
        let mut arena = ScopeArena::new();
        let root = arena.root();
        let ty = QualType::new(registry.intern_base(TypeElement::Primitive(
            crate::ast::PrimitiveKind::Int,
        )));
        let body = arena
            .create_child(root, "fn:main", ScopeKind::FunctionBody, Span::zero())
            .unwrap();
        arena
            .declare_symbol(body, "x", ty, NodeId(1), Span::zero())
            .unwrap();

        let json = dump_scopes(&arena, &registry);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["children"][0]["name"], "fn:main");
        assert_eq!(value["children"][0]["symbols"][0]["name"], "x");
        assert_eq!(value["children"][0]["symbols"][0]["type"], "int");
    }
}
