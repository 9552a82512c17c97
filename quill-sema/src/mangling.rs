//! Deterministic mangled names for backend addressing
//!
//! The mangled name is the sole contract the instruction-emission stage uses
//! to address a manifestation: `_Q` prefix, length-prefixed name fragments,
//! `N..E` nested-name markers, one letter per primitive kind, `P`/`R`/`A<n>_`
//! wrappers and `I..E` template lists. Names are byte-stable across repeated
//! compilations and independent of internal iteration order; qualifiers are
//! never encoded.

use crate::ast::PrimitiveKind;
use crate::manifestation::{EntityKind, Manifestation};
use crate::qual_type::QualType;
use crate::types::{TypeElement, TypeRegistry};
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt::Write;

lazy_static! {
    /// One letter per primitive kind
    static ref PRIMITIVE_LETTERS: HashMap<PrimitiveKind, char> = {
        let mut m = HashMap::new();
        m.insert(PrimitiveKind::Double, 'd');
        m.insert(PrimitiveKind::Int, 'i');
        m.insert(PrimitiveKind::Short, 's');
        m.insert(PrimitiveKind::Long, 'l');
        m.insert(PrimitiveKind::Byte, 'y');
        m.insert(PrimitiveKind::Char, 'c');
        m.insert(PrimitiveKind::String, 't');
        m.insert(PrimitiveKind::Bool, 'b');
        m
    };
}

/// Length-prefixed name, with `N..E` markers for dotted nested names
fn write_name(out: &mut String, name: &str) {
    if name.contains('.') {
        out.push('N');
        for fragment in name.split('.') {
            let _ = write!(out, "{}{}", fragment.len(), fragment);
        }
        out.push('E');
    } else {
        let _ = write!(out, "{}{}", name.len(), name);
    }
}

fn write_template_list(out: &mut String, registry: &TypeRegistry, template_types: &[QualType]) {
    if template_types.is_empty() {
        return;
    }
    out.push('I');
    for tt in template_types {
        write_type(out, registry, *tt);
    }
    out.push('E');
}

fn write_type(out: &mut String, registry: &TypeRegistry, ty: QualType) {
    let chain = registry.chain(ty.handle()).clone();
    // Wrappers outer-first, then the base shape
    for elem in chain.elements().iter().rev() {
        match elem {
            TypeElement::Pointer => out.push('P'),
            TypeElement::Reference => out.push('R'),
            TypeElement::Array { size: Some(n) } => {
                let _ = write!(out, "A{n}_");
            }
            TypeElement::Array { size: None } => out.push_str("A_"),
            TypeElement::Primitive(kind) => {
                out.push(PRIMITIVE_LETTERS[kind]);
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
                write_name(out, name);
                write_template_list(out, registry, template_types);
            }
            TypeElement::Enum { name, .. } => write_name(out, name),
            TypeElement::Generic(name) => {
                out.push('T');
                write_name(out, name);
            }
            TypeElement::Function {
                param_types,
                return_type,
            } => {
                out.push('F');
                write_type(out, registry, *return_type);
                for pt in param_types {
                    write_type(out, registry, *pt);
                }
                out.push('E');
            }
            TypeElement::Procedure { param_types } => {
                out.push('F');
                out.push('v');
                for pt in param_types {
                    write_type(out, registry, *pt);
                }
                out.push('E');
            }
            TypeElement::Unresolved => out.push('u'),
        }
    }
}

/// Mangle a single type, qualifiers excluded
pub fn mangle_type(registry: &TypeRegistry, ty: QualType) -> String {
    let mut out = String::new();
    write_type(&mut out, registry, ty);
    out
}

/// Mangled name of a manifestation: unique per (name, receiver type,
/// parameter types, resolved template arguments) tuple
pub fn mangle_manifestation(registry: &TypeRegistry, manifestation: &Manifestation) -> String {
    let mut out = String::from("_Q");
    match manifestation.kind {
        EntityKind::Function => {
            if let Some(receiver) = manifestation.receiver_type {
                out.push('N');
                write_type(&mut out, registry, receiver);
                write_name(&mut out, &manifestation.name);
                out.push('E');
            } else {
                write_name(&mut out, &manifestation.name);
            }
            write_template_list(&mut out, registry, &manifestation.template_types);
            if manifestation.params.is_empty() {
                out.push('v');
            } else {
                for param in &manifestation.params {
                    write_type(&mut out, registry, param.ty);
                }
            }
        }
        EntityKind::Struct | EntityKind::Interface => {
            write_name(&mut out, &manifestation.name);
            write_template_list(&mut out, registry, &manifestation.template_types);
        }
    }
    out
}
