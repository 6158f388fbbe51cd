//! Constant-expression syntax.
//!
//! Only the forms that can appear as attribute arguments or enum member
//! initializers are modelled; general expressions belong to the semantic
//! analyser.

use classbind_core::Span;

use crate::{QualifiedName, TypeExpr};

/// A literal token value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Char(u16),
    /// An unsuffixed integer literal. Its type is the first of
    /// `int`, `uint`, `long`, `ulong` that holds it.
    Int(u64),
    /// `L`-suffixed.
    Long(i64),
    /// `U`-suffixed.
    UInt(u64),
    /// `f`-suffixed.
    Float(f32),
    Double(f64),
    String(String),
}

/// A constant expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal, Span),
    /// A name that may refer to a constant field.
    Name(QualifiedName),
    /// `typeof(T)`
    Typeof(TypeExpr, Span),
    /// `-e`
    Negate(Box<Expr>, Span),
    /// `(T)e`
    Cast(TypeExpr, Box<Expr>, Span),
    /// `new T[] { a, b }`
    ArrayInit {
        element: TypeExpr,
        items: Vec<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn int(value: u64) -> Self {
        Expr::Literal(Literal::Int(value), Span::default())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::Literal(Literal::String(value.into()), Span::default())
    }

    pub fn bool(value: bool) -> Self {
        Expr::Literal(Literal::Bool(value), Span::default())
    }

    pub fn null() -> Self {
        Expr::Literal(Literal::Null, Span::default())
    }

    pub fn type_of(ty: TypeExpr) -> Self {
        let span = ty.span();
        Expr::Typeof(ty, span)
    }

    pub fn array(element: TypeExpr, items: Vec<Expr>) -> Self {
        let span = element.span();
        Expr::ArrayInit { element, items, span }
    }

    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(_, span)
            | Expr::Typeof(_, span)
            | Expr::Negate(_, span)
            | Expr::Cast(_, _, span)
            | Expr::ArrayInit { span, .. } => *span,
            Expr::Name(name) => name.span,
        }
    }
}
