//! Integration tests for the declaration pass, entity managers and
//! substantiation pipeline
//!
//! Each file drives the public [`SemanticAnalyzer`](crate::SemanticAnalyzer)
//! API end to end; unit tests for individual data structures live next to
//! their modules.

mod test_function_resolution;
mod test_generic_function_substantiation;

use crate::ast::{
    FieldDecl, FunctionDecl, GenericParamDecl, NodeId, ParamDecl, PrimitiveKind, Span, StructDecl,
    TypeExpr,
};

pub fn prim(kind: PrimitiveKind) -> TypeExpr {
    TypeExpr::Primitive(kind)
}

pub fn named(name: &str) -> TypeExpr {
    TypeExpr::Named {
        name: name.to_string(),
        template_args: Vec::new(),
    }
}

pub fn generic_param(name: &str) -> GenericParamDecl {
    GenericParamDecl {
        name: name.to_string(),
        conditions: Vec::new(),
        span: Span::zero(),
    }
}

pub fn field(name: &str, ty: TypeExpr) -> FieldDecl {
    FieldDecl {
        name: name.to_string(),
        ty,
        span: Span::zero(),
    }
}

pub fn param(name: &str, ty: TypeExpr) -> ParamDecl {
    ParamDecl {
        name: name.to_string(),
        ty,
        optional: false,
        span: Span::zero(),
    }
}

pub fn optional_param(name: &str, ty: TypeExpr) -> ParamDecl {
    ParamDecl {
        name: name.to_string(),
        ty,
        optional: true,
        span: Span::zero(),
    }
}

pub fn struct_decl(
    id: u64,
    name: &str,
    generic_params: Vec<GenericParamDecl>,
    fields: Vec<FieldDecl>,
) -> StructDecl {
    StructDecl {
        id: NodeId(id),
        name: name.to_string(),
        generic_params,
        fields,
        implements: Vec::new(),
        is_public: true,
        span: Span::zero(),
    }
}

pub fn function_decl(
    id: u64,
    name: &str,
    generic_params: Vec<GenericParamDecl>,
    params: Vec<ParamDecl>,
    return_type: Option<TypeExpr>,
) -> FunctionDecl {
    FunctionDecl {
        id: NodeId(id),
        name: name.to_string(),
        receiver: None,
        generic_params,
        params,
        return_type,
        is_public: true,
        span: Span::zero(),
    }
}
