//! Identifiers, dotted names and declaration modifiers.

use std::fmt;

use bitflags::bitflags;
use classbind_core::{Span, Visibility};

/// An identifier with its source location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl From<&str> for Ident {
    fn from(name: &str) -> Self {
        Ident::new(name, Span::default())
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A dotted name such as `System.Collections.IList`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    /// Segments in source order. Never empty.
    pub segments: Vec<Ident>,
    pub span: Span,
}

impl QualifiedName {
    /// Parse a dotted path; every segment gets `span`.
    pub fn parse(path: &str, span: Span) -> Self {
        Self {
            segments: path.split('.').map(|s| Ident::new(s, span)).collect(),
            span,
        }
    }

    pub fn simple(ident: Ident) -> Self {
        let span = ident.span;
        Self {
            segments: vec![ident],
            span,
        }
    }

    pub fn is_simple(&self) -> bool {
        self.segments.len() == 1
    }

    /// The final segment.
    pub fn last(&self) -> &Ident {
        &self.segments[self.segments.len() - 1]
    }

    /// All segments except the last.
    pub fn qualifier(&self) -> &[Ident] {
        &self.segments[..self.segments.len() - 1]
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        for seg in &mut self.segments {
            seg.span = span;
        }
        self
    }
}

impl From<&str> for QualifiedName {
    fn from(path: &str) -> Self {
        QualifiedName::parse(path, Span::default())
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&seg.name)?;
        }
        Ok(())
    }
}

bitflags! {
    /// Modifier keywords as written on a declaration.
    ///
    /// These are syntax. The gatherer maps them onto class and member flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u32 {
        const PUBLIC    = 1 << 0;
        const PROTECTED = 1 << 1;
        const INTERNAL  = 1 << 2;
        const PRIVATE   = 1 << 3;
        const ABSTRACT  = 1 << 4;
        const SEALED    = 1 << 5;
        const STATIC    = 1 << 6;
        const VIRTUAL   = 1 << 7;
        const OVERRIDE  = 1 << 8;
        const NEW       = 1 << 9;
        const READONLY  = 1 << 10;
        const VOLATILE  = 1 << 11;
        const EXTERN    = 1 << 12;
        const CONST     = 1 << 13;
    }
}

impl Modifiers {
    pub const ACCESS: Modifiers = Modifiers::PUBLIC
        .union(Modifiers::PROTECTED)
        .union(Modifiers::INTERNAL)
        .union(Modifiers::PRIVATE);

    /// Declared visibility, or `default` when no access keyword is present.
    pub fn visibility(self, default: Visibility) -> Visibility {
        if self.contains(Modifiers::PUBLIC) {
            Visibility::Public
        } else if self.contains(Modifiers::PROTECTED | Modifiers::INTERNAL) {
            Visibility::ProtectedInternal
        } else if self.contains(Modifiers::PROTECTED) {
            Visibility::Protected
        } else if self.contains(Modifiers::INTERNAL) {
            Visibility::Internal
        } else if self.contains(Modifiers::PRIVATE) {
            Visibility::Private
        } else {
            default
        }
    }
}
