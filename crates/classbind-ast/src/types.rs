//! Type expressions.

use std::fmt;

use classbind_core::{PrimitiveType, Span};

use crate::QualifiedName;

/// A type as written in source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// A (possibly dotted) class, interface or alias name.
    Named(QualifiedName),
    /// A keyword type such as `int` or `string`.
    ///
    /// `string` and `object` are keywords in source but name classes, so
    /// they are represented as [`TypeExpr::Named`] by the parser.
    Primitive(PrimitiveType, Span),
    /// `T[]`
    Array(Box<TypeExpr>, Span),
    /// `void`, valid only as a return type.
    Void(Span),
}

impl TypeExpr {
    /// A named type with an unknown location.
    pub fn named(path: &str) -> Self {
        TypeExpr::Named(QualifiedName::from(path))
    }

    pub fn primitive(p: PrimitiveType) -> Self {
        TypeExpr::Primitive(p, Span::default())
    }

    pub fn array(element: TypeExpr) -> Self {
        let span = element.span();
        TypeExpr::Array(Box::new(element), span)
    }

    pub fn void() -> Self {
        TypeExpr::Void(Span::default())
    }

    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Named(name) => name.span,
            TypeExpr::Primitive(_, span) | TypeExpr::Array(_, span) | TypeExpr::Void(span) => *span,
        }
    }

    pub fn as_named(&self) -> Option<&QualifiedName> {
        match self {
            TypeExpr::Named(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeExpr::Void(_))
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named(name) => write!(f, "{name}"),
            TypeExpr::Primitive(p, _) => f.write_str(p.keyword()),
            TypeExpr::Array(element, _) => write!(f, "{element}[]"),
            TypeExpr::Void(_) => f.write_str("void"),
        }
    }
}
