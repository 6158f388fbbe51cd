//! Attribute sections.

use classbind_core::Span;

use crate::{Expr, Ident, QualifiedName};

/// One `[target: A(...), B]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSection {
    /// Explicit target keyword (`assembly`, `return`, `param`, ...).
    pub target: Option<Ident>,
    pub attributes: Vec<AttributeUse>,
    pub span: Span,
}

impl AttributeSection {
    pub fn new(attributes: Vec<AttributeUse>) -> Self {
        Self {
            target: None,
            attributes,
            span: Span::default(),
        }
    }

    pub fn with_target(mut self, target: &str) -> Self {
        self.target = Some(Ident::new(target, self.span));
        self
    }
}

/// A single attribute application.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeUse {
    /// As written; the `Attribute` suffix may be omitted.
    pub name: QualifiedName,
    /// Positional constructor arguments.
    pub args: Vec<Expr>,
    pub span: Span,
}

impl AttributeUse {
    pub fn new(name: &str, args: Vec<Expr>) -> Self {
        Self {
            name: QualifiedName::from(name),
            args,
            span: Span::default(),
        }
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self.name = self.name.at(span);
        self
    }
}
