//! Type representation and interning
//!
//! A type is an immutable chain of elements, base-first: the first element is
//! the underlying primitive/struct/interface/enum/placeholder/function shape
//! and pointer/reference/array wrappers are appended outward, so the last
//! element is the outermost shape. Structurally equal chains intern to the
//! same handle, making identity comparison equivalent to structural equality.

use crate::ast::{NodeId, PrimitiveKind};
use crate::qual_type::QualType;
use std::collections::HashMap;
use std::fmt;

/// Handle into the type intern arena; identity equality implies structural
/// equality of the referenced chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeHandle(pub u32);

/// One link of a type chain
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeElement {
    Primitive(PrimitiveKind),
    Struct {
        name: String,
        decl: NodeId,
        template_types: Vec<QualType>,
    },
    Interface {
        name: String,
        decl: NodeId,
        template_types: Vec<QualType>,
    },
    Enum {
        name: String,
        decl: NodeId,
    },
    /// Generic placeholder, resolved during matching
    Generic(String),
    Function {
        param_types: Vec<QualType>,
        return_type: QualType,
    },
    /// Callable without a return value
    Procedure {
        param_types: Vec<QualType>,
    },
    /// Pending type inference; refined at most once
    Unresolved,
    Pointer,
    Reference,
    Array {
        size: Option<u32>,
    },
}

impl TypeElement {
    /// Wrappers enclose exactly one contained type
    pub fn is_wrapper(&self) -> bool {
        matches!(
            self,
            TypeElement::Pointer | TypeElement::Reference | TypeElement::Array { .. }
        )
    }
}

/// Immutable base-first chain of type elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeChain {
    elements: Vec<TypeElement>,
}

impl TypeChain {
    pub fn new(base: TypeElement) -> Self {
        Self {
            elements: vec![base],
        }
    }

    pub fn from_elements(elements: Vec<TypeElement>) -> Self {
        debug_assert!(!elements.is_empty(), "a type chain has at least a base");
        Self { elements }
    }

    pub fn elements(&self) -> &[TypeElement] {
        &self.elements
    }

    pub fn base(&self) -> &TypeElement {
        &self.elements[0]
    }

    /// The outermost shape of the chain
    pub fn outer(&self) -> &TypeElement {
        self.elements.last().expect("chain is never empty")
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// New chain with one more wrapper outside
    pub fn wrapped(&self, wrapper: TypeElement) -> Self {
        debug_assert!(wrapper.is_wrapper());
        let mut elements = self.elements.clone();
        elements.push(wrapper);
        Self { elements }
    }

    /// New chain with the outermost wrapper removed; `None` when the chain is
    /// only a base element
    pub fn unwrapped(&self) -> Option<Self> {
        if self.elements.len() < 2 {
            return None;
        }
        Some(Self {
            elements: self.elements[..self.elements.len() - 1].to_vec(),
        })
    }

    pub fn has_wrappers(&self) -> bool {
        self.elements.len() > 1
    }
}

/// Interner for type chains
///
/// Owned by one [`crate::SemanticAnalyzer`]; handles are unique for the
/// lifetime of that analyzer and must not be mixed between invocations.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    arena: Vec<TypeChain>,
    interned: HashMap<TypeChain, TypeHandle>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deterministic, referentially transparent canonicalization: the same
    /// chain always yields the same handle
    pub fn intern(&mut self, chain: TypeChain) -> TypeHandle {
        if let Some(&handle) = self.interned.get(&chain) {
            return handle;
        }
        let handle = TypeHandle(self.arena.len() as u32);
        self.interned.insert(chain.clone(), handle);
        self.arena.push(chain);
        handle
    }

    pub fn chain(&self, handle: TypeHandle) -> &TypeChain {
        &self.arena[handle.0 as usize]
    }

    pub fn intern_base(&mut self, base: TypeElement) -> TypeHandle {
        self.intern(TypeChain::new(base))
    }

    pub fn primitive(&mut self, kind: PrimitiveKind) -> TypeHandle {
        self.intern_base(TypeElement::Primitive(kind))
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Whether any element of the chain (including nested template and
    /// callable types) is a generic placeholder
    pub fn has_placeholders(&self, handle: TypeHandle) -> bool {
        let chain = self.chain(handle);
        chain.elements().iter().any(|elem| match elem {
            TypeElement::Generic(_) => true,
            TypeElement::Struct { template_types, .. }
            | TypeElement::Interface { template_types, .. } => template_types
                .iter()
                .any(|tt| self.has_placeholders(tt.handle())),
            TypeElement::Function {
                param_types,
                return_type,
            } => {
                self.has_placeholders(return_type.handle())
                    || param_types
                        .iter()
                        .any(|pt| self.has_placeholders(pt.handle()))
            }
            TypeElement::Procedure { param_types } => param_types
                .iter()
                .any(|pt| self.has_placeholders(pt.handle())),
            _ => false,
        })
    }

    /// Collect every placeholder name reachable from the chain, in order of
    /// first occurrence
    pub fn collect_placeholders(&self, handle: TypeHandle, out: &mut Vec<String>) {
        let chain = self.chain(handle).clone();
        for elem in chain.elements() {
            match elem {
                TypeElement::Generic(name) => {
                    if !out.contains(name) {
                        out.push(name.clone());
                    }
                }
                TypeElement::Struct { template_types, .. }
                | TypeElement::Interface { template_types, .. } => {
                    for tt in template_types {
                        self.collect_placeholders(tt.handle(), out);
                    }
                }
                TypeElement::Function {
                    param_types,
                    return_type,
                } => {
                    for pt in param_types {
                        self.collect_placeholders(pt.handle(), out);
                    }
                    self.collect_placeholders(return_type.handle(), out);
                }
                TypeElement::Procedure { param_types } => {
                    for pt in param_types {
                        self.collect_placeholders(pt.handle(), out);
                    }
                }
                _ => {}
            }
        }
    }

    /// Human-readable rendering for diagnostics
    pub fn display(&self, ty: QualType) -> String {
        let mut out = String::new();
        self.write_chain(&mut out, ty.handle());
        if ty.qualifiers().is_const {
            format!("const {out}")
        } else {
            out
        }
    }

    fn write_chain(&self, out: &mut String, handle: TypeHandle) {
        use fmt::Write;
        let chain = self.chain(handle).clone();
        // Base first, wrappers appended as suffixes
        for elem in chain.elements() {
            match elem {
                TypeElement::Primitive(kind) => {
                    let _ = write!(out, "{kind}");
                }
                TypeElement::Struct {
                    name,
                    template_types,
                    ..
                }
                | TypeElement::Interface {
                    name,
                    template_types,
                    ..
                } => {
                    let _ = write!(out, "{name}");
                    if !template_types.is_empty() {
                        let args: Vec<String> =
                            template_types.iter().map(|tt| self.display(*tt)).collect();
                        let _ = write!(out, "<{}>", args.join(", "));
                    }
                }
                TypeElement::Enum { name, .. } => {
                    let _ = write!(out, "{name}");
                }
                TypeElement::Generic(name) => {
                    let _ = write!(out, "{name}");
                }
                TypeElement::Function {
                    param_types,
                    return_type,
                } => {
                    let params: Vec<String> =
                        param_types.iter().map(|pt| self.display(*pt)).collect();
                    let _ = write!(
                        out,
                        "f<{}>({})",
                        self.display(*return_type),
                        params.join(", ")
                    );
                }
                TypeElement::Procedure { param_types } => {
                    let params: Vec<String> =
                        param_types.iter().map(|pt| self.display(*pt)).collect();
                    let _ = write!(out, "p({})", params.join(", "));
                }
                TypeElement::Unresolved => {
                    let _ = write!(out, "<unresolved>");
                }
                TypeElement::Pointer => out.push('*'),
                TypeElement::Reference => out.push('&'),
                TypeElement::Array { size: Some(n) } => {
                    let _ = write!(out, "[{n}]");
                }
                TypeElement::Array { size: None } => out.push_str("[]"),
            }
        }
    }
}
