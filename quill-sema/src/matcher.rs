//! Type matcher: the single authority for deciding whether a requested type
//! can be produced from a candidate, possibly generic, type
//!
//! Matching recurses outer-wrapper-first and accumulates a placeholder
//! substitution as it goes; the first occurrence of a placeholder wins and
//! later occurrences must agree with it. Qualifiers are checked separately
//! from shape, with one-way const-reference narrowing.

use crate::qual_type::QualType;
use crate::scope::GenericType;
use crate::types::{TypeChain, TypeElement, TypeRegistry};
use indexmap::IndexMap;

/// Accumulated placeholder-name to concrete-type substitution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeMapping {
    entries: IndexMap<String, QualType>,
}

impl TypeMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// First occurrence wins; later occurrences must agree structurally.
    /// Returns false when the name is already mapped to a different shape.
    pub fn insert_or_check(&mut self, name: &str, ty: QualType) -> bool {
        match self.entries.get(name) {
            Some(existing) => existing.same_shape(&ty),
            None => {
                self.entries.insert(name.to_string(), ty);
                true
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<QualType> {
        self.entries.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &QualType)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Caller-selected matching knobs
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchPolicy {
    /// Treat arrays of any size as the same shape
    pub ignore_array_size: bool,
    /// Allow a const candidate reference to bind a non-const requested
    /// reference; used for return-type inference
    pub allow_constify: bool,
}

/// Can `requested` be produced from `candidate` under some extension of
/// `mapping`? `generics` carries the declared conditions of the candidate's
/// placeholders; undeclared placeholders are unconstrained.
pub fn matches_type(
    registry: &mut TypeRegistry,
    candidate: QualType,
    requested: QualType,
    generics: &[GenericType],
    mapping: &mut TypeMapping,
    policy: &MatchPolicy,
) -> bool {
    if !reference_qualifiers_compatible(registry, candidate, requested, policy) {
        return false;
    }
    let candidate_chain = registry.chain(candidate.handle()).clone();
    let requested_chain = registry.chain(requested.handle()).clone();
    match_chains(
        registry,
        candidate_chain.elements(),
        requested_chain.elements(),
        generics,
        mapping,
        policy,
    )
}

/// Const-reference narrowing: a const requested reference always binds a
/// non-const candidate reference; the reverse only under `allow_constify`.
fn reference_qualifiers_compatible(
    registry: &TypeRegistry,
    candidate: QualType,
    requested: QualType,
    policy: &MatchPolicy,
) -> bool {
    if !candidate.is_reference(registry) || !requested.is_reference(registry) {
        return true;
    }
    if candidate.is_const() && !requested.is_const() {
        return policy.allow_constify;
    }
    true
}

fn match_chains(
    registry: &mut TypeRegistry,
    candidate: &[TypeElement],
    requested: &[TypeElement],
    generics: &[GenericType],
    mapping: &mut TypeMapping,
    policy: &MatchPolicy,
) -> bool {
    // Only a bare placeholder remaining: everything still requested resolves
    // into it
    if let [TypeElement::Generic(name)] = candidate {
        let resolved = QualType::new(registry.intern(TypeChain::from_elements(requested.to_vec())));
        if let Some(generic) = generics.iter().find(|g| g.name == *name) {
            if !generic.accepts(resolved) {
                return false;
            }
        }
        return mapping.insert_or_check(name, resolved);
    }

    let (candidate_outer, candidate_rest) = match candidate.split_last() {
        Some(split) => split,
        None => return requested.is_empty(),
    };
    let (requested_outer, requested_rest) = match requested.split_last() {
        Some(split) => split,
        None => return false,
    };

    match (candidate_outer, requested_outer) {
        (TypeElement::Pointer, TypeElement::Pointer)
        | (TypeElement::Reference, TypeElement::Reference) => match_chains(
            registry,
            candidate_rest,
            requested_rest,
            generics,
            mapping,
            policy,
        ),
        (TypeElement::Array { size: cand_size }, TypeElement::Array { size: req_size }) => {
            if !policy.ignore_array_size && cand_size != req_size {
                return false;
            }
            match_chains(
                registry,
                candidate_rest,
                requested_rest,
                generics,
                mapping,
                policy,
            )
        }
        (TypeElement::Primitive(cand_kind), TypeElement::Primitive(req_kind)) => {
            cand_kind == req_kind
        }
        (
            TypeElement::Struct {
                decl: cand_decl,
                template_types: cand_templates,
                ..
            },
            TypeElement::Struct {
                decl: req_decl,
                template_types: req_templates,
                ..
            },
        )
        | (
            TypeElement::Interface {
                decl: cand_decl,
                template_types: cand_templates,
                ..
            },
            TypeElement::Interface {
                decl: req_decl,
                template_types: req_templates,
                ..
            },
        ) => {
            // Declaration identity, not name equality
            if cand_decl != req_decl || cand_templates.len() != req_templates.len() {
                return false;
            }
            let pairs: Vec<(QualType, QualType)> = cand_templates
                .iter()
                .copied()
                .zip(req_templates.iter().copied())
                .collect();
            pairs
                .into_iter()
                .all(|(cand, req)| matches_type(registry, cand, req, generics, mapping, policy))
        }
        (TypeElement::Enum { decl: cand_decl, .. }, TypeElement::Enum { decl: req_decl, .. }) => {
            cand_decl == req_decl
        }
        (
            TypeElement::Function {
                param_types: cand_params,
                return_type: cand_return,
            },
            TypeElement::Function {
                param_types: req_params,
                return_type: req_return,
            },
        ) => {
            if cand_params.len() != req_params.len() {
                return false;
            }
            let cand_return = *cand_return;
            let req_return = *req_return;
            let pairs: Vec<(QualType, QualType)> = cand_params
                .iter()
                .copied()
                .zip(req_params.iter().copied())
                .collect();
            pairs
                .into_iter()
                .all(|(cand, req)| matches_type(registry, cand, req, generics, mapping, policy))
                && matches_type(registry, cand_return, req_return, generics, mapping, policy)
        }
        (
            TypeElement::Procedure {
                param_types: cand_params,
            },
            TypeElement::Procedure {
                param_types: req_params,
            },
        ) => {
            if cand_params.len() != req_params.len() {
                return false;
            }
            let pairs: Vec<(QualType, QualType)> = cand_params
                .iter()
                .copied()
                .zip(req_params.iter().copied())
                .collect();
            pairs
                .into_iter()
                .all(|(cand, req)| matches_type(registry, cand, req, generics, mapping, policy))
        }
        _ => false,
    }
}

/// Rewrite every placeholder leaf of `ty` via `mapping`, preserving wrapper
/// order. Unmapped placeholders stay in place; on a fully concrete type this
/// is the identity transform.
pub fn substantiate(registry: &mut TypeRegistry, ty: QualType, mapping: &TypeMapping) -> QualType {
    let chain = registry.chain(ty.handle()).clone();
    let mut elements: Vec<TypeElement> = Vec::with_capacity(chain.len());
    for (index, elem) in chain.elements().iter().enumerate() {
        match elem {
            TypeElement::Generic(name) => {
                if let Some(resolved) = mapping.get(name) {
                    debug_assert_eq!(index, 0, "placeholders are base elements");
                    let resolved_chain = registry.chain(resolved.handle()).clone();
                    elements.extend(resolved_chain.elements().iter().cloned());
                } else {
                    elements.push(elem.clone());
                }
            }
            TypeElement::Struct {
                name,
                decl,
                template_types,
            } => {
                let template_types = template_types
                    .iter()
                    .map(|tt| substantiate(registry, *tt, mapping))
                    .collect();
                elements.push(TypeElement::Struct {
                    name: name.clone(),
                    decl: *decl,
                    template_types,
                });
            }
            TypeElement::Interface {
                name,
                decl,
                template_types,
            } => {
                let template_types = template_types
                    .iter()
                    .map(|tt| substantiate(registry, *tt, mapping))
                    .collect();
                elements.push(TypeElement::Interface {
                    name: name.clone(),
                    decl: *decl,
                    template_types,
                });
            }
            TypeElement::Function {
                param_types,
                return_type,
            } => {
                let param_types = param_types
                    .iter()
                    .map(|pt| substantiate(registry, *pt, mapping))
                    .collect();
                let return_type = substantiate(registry, *return_type, mapping);
                elements.push(TypeElement::Function {
                    param_types,
                    return_type,
                });
            }
            TypeElement::Procedure { param_types } => {
                let param_types = param_types
                    .iter()
                    .map(|pt| substantiate(registry, *pt, mapping))
                    .collect();
                elements.push(TypeElement::Procedure { param_types });
            }
            other => elements.push(other.clone()),
        }
    }
    let handle = registry.intern(TypeChain::from_elements(elements));
    QualType::with_qualifiers(handle, ty.qualifiers())
}
