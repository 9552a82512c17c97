//! Syntax-tree surface consumed by the semantic core
//!
//! Parsing happens upstream; the analyzer only ever sees these node types.
//! Every node carries a [`Span`] for diagnostics and a [`NodeId`] assigned by
//! the producer so declaration sites can be compared by identity rather than
//! by name.

use std::fmt;

/// Byte range in the originating source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-width span for synthesized nodes
    pub fn zero() -> Self {
        Self { start: 0, end: 0 }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Stable identity of a syntax-tree node, unique per compiler invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Primitive types of the Quill surface language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Double,
    Int,
    Short,
    Long,
    Byte,
    Char,
    String,
    Bool,
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveKind::Double => "double",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Char => "char",
            PrimitiveKind::String => "string",
            PrimitiveKind::Bool => "bool",
        };
        write!(f, "{name}")
    }
}

/// Surface syntax of a type annotation, resolved against a scope by the
/// declaration pass
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Primitive(PrimitiveKind),
    /// Named struct/interface/enum/generic-parameter reference with optional
    /// template arguments
    Named {
        name: String,
        template_args: Vec<TypeExpr>,
    },
    Pointer(Box<TypeExpr>),
    Reference(Box<TypeExpr>),
    Array {
        element: Box<TypeExpr>,
        size: Option<u32>,
    },
    Function {
        param_types: Vec<TypeExpr>,
        return_type: Option<Box<TypeExpr>>,
    },
}

/// A generic type parameter declaration: `T` or `T: int | long`
#[derive(Debug, Clone, PartialEq)]
pub struct GenericParamDecl {
    pub name: String,
    /// Acceptable concrete types; empty means unconstrained
    pub conditions: Vec<TypeExpr>,
    pub span: Span,
}

/// A function parameter declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub name: String,
    pub ty: TypeExpr,
    /// Optional parameters are declaration-time overload sugar; they must
    /// trail the required ones
    pub optional: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub id: NodeId,
    pub name: String,
    /// Receiver type for methods, `None` for free functions
    pub receiver: Option<TypeExpr>,
    pub generic_params: Vec<GenericParamDecl>,
    pub params: Vec<ParamDecl>,
    /// `None` means procedure (no return value)
    pub return_type: Option<TypeExpr>,
    pub is_public: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeExpr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub id: NodeId,
    pub name: String,
    pub generic_params: Vec<GenericParamDecl>,
    pub fields: Vec<FieldDecl>,
    pub implements: Vec<TypeExpr>,
    pub is_public: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    pub id: NodeId,
    pub name: String,
    pub generic_params: Vec<GenericParamDecl>,
    pub methods: Vec<FunctionDecl>,
    pub is_public: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlobalDecl {
    pub id: NodeId,
    pub name: String,
    pub ty: TypeExpr,
    pub is_public: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Function(FunctionDecl),
    Struct(StructDecl),
    Interface(InterfaceDecl),
    Global(GlobalDecl),
}

/// One compilation unit: a source file after parsing
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub name: String,
    /// Names of imported units; must be declared before this unit
    pub imports: Vec<String>,
    pub items: Vec<Item>,
    pub span: Span,
}

impl Unit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            imports: Vec::new(),
            items: Vec::new(),
            span: Span::zero(),
        }
    }

    pub fn add_import(&mut self, name: impl Into<String>) {
        self.imports.push(name.into());
    }

    pub fn add_item(&mut self, item: Item) {
        self.items.push(item);
    }
}
