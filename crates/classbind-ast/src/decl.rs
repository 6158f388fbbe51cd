//! Declaration nodes.
//!
//! A class body is a closed union, [`ClassMemberDecl`], so every pass that
//! walks members matches it exhaustively.

use classbind_core::{ClassKind, Span};

use crate::{AttributeSection, Expr, Ident, Modifiers, QualifiedName, TypeExpr};

// ============================================================================
// Compilation Units and Namespaces
// ============================================================================

/// One parsed source file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompilationUnit {
    /// File name used to attribute diagnostics.
    pub file: String,
    /// File-level `using` directives.
    pub usings: Vec<UsingDecl>,
    /// `[assembly: ...]` and `[module: ...]` sections.
    pub attributes: Vec<AttributeSection>,
    pub items: Vec<Item>,
}

impl CompilationUnit {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            ..Default::default()
        }
    }

    pub fn with_using(mut self, using: UsingDecl) -> Self {
        self.usings.push(using);
        self
    }

    pub fn with_attributes(mut self, section: AttributeSection) -> Self {
        self.attributes.push(section);
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    /// Add a type in the global namespace.
    pub fn with_type(self, decl: TypeDecl) -> Self {
        self.with_item(Item::Type(decl))
    }
}

/// A namespace or type at file or namespace level.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Namespace(NamespaceDecl),
    Type(TypeDecl),
}

/// A `namespace A.B { ... }` block.
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceDecl {
    pub name: QualifiedName,
    /// `using` directives at the top of the block.
    pub usings: Vec<UsingDecl>,
    pub items: Vec<Item>,
    pub span: Span,
}

impl NamespaceDecl {
    pub fn new(path: &str) -> Self {
        Self {
            name: QualifiedName::from(path),
            usings: Vec::new(),
            items: Vec::new(),
            span: Span::default(),
        }
    }

    pub fn with_using(mut self, using: UsingDecl) -> Self {
        self.usings.push(using);
        self
    }

    pub fn with_type(mut self, decl: TypeDecl) -> Self {
        self.items.push(Item::Type(decl));
        self
    }

    pub fn with_namespace(mut self, ns: NamespaceDecl) -> Self {
        self.items.push(Item::Namespace(ns));
        self
    }
}

/// A `using` directive.
#[derive(Debug, Clone, PartialEq)]
pub enum UsingDecl {
    /// `using A.B;`
    Namespace { path: QualifiedName, span: Span },
    /// `using X = A.B.C;` aliasing a namespace or a type.
    Alias {
        alias: Ident,
        target: QualifiedName,
        span: Span,
    },
}

impl UsingDecl {
    pub fn namespace(path: &str) -> Self {
        UsingDecl::Namespace {
            path: QualifiedName::from(path),
            span: Span::default(),
        }
    }

    pub fn alias(alias: &str, target: &str) -> Self {
        UsingDecl::Alias {
            alias: Ident::from(alias),
            target: QualifiedName::from(target),
            span: Span::default(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            UsingDecl::Namespace { span, .. } | UsingDecl::Alias { span, .. } => *span,
        }
    }
}

// ============================================================================
// Type Declarations
// ============================================================================

/// A class, struct, interface, enum or delegate declaration.
///
/// Example:
/// ```text
/// [Serializable]
/// public sealed class Circle : Shape, IComparable {
///     private double radius;
///     public override double Area() { ... }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub name: Ident,
    pub kind: ClassKind,
    pub modifiers: Modifiers,
    /// Parent class and implemented interfaces, in source order.
    pub bases: Vec<TypeExpr>,
    pub members: Vec<ClassMemberDecl>,
    pub attributes: Vec<AttributeSection>,
    pub span: Span,
}

impl TypeDecl {
    pub fn new(name: &str, kind: ClassKind) -> Self {
        Self {
            name: Ident::from(name),
            kind,
            modifiers: Modifiers::empty(),
            bases: Vec::new(),
            members: Vec::new(),
            attributes: Vec::new(),
            span: Span::default(),
        }
    }

    pub fn class(name: &str) -> Self {
        Self::new(name, ClassKind::Class)
    }

    pub fn structure(name: &str) -> Self {
        Self::new(name, ClassKind::Struct)
    }

    pub fn interface(name: &str) -> Self {
        Self::new(name, ClassKind::Interface)
    }

    pub fn enumeration(name: &str) -> Self {
        Self::new(name, ClassKind::Enum)
    }

    /// A delegate type. Its signature is carried as a single
    /// [`ClassMemberDecl::Delegate`] member.
    pub fn delegate(name: &str, return_type: TypeExpr, params: Vec<ParamDecl>) -> Self {
        let mut decl = Self::new(name, ClassKind::Delegate);
        decl.members.push(ClassMemberDecl::Delegate(DelegateMemberDecl {
            return_type,
            params,
            span: Span::default(),
        }));
        decl
    }

    // === Builder Methods ===

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    pub fn with_base(mut self, base: TypeExpr) -> Self {
        self.bases.push(base);
        self
    }

    pub fn with_member(mut self, member: ClassMemberDecl) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_nested(self, nested: TypeDecl) -> Self {
        self.with_member(ClassMemberDecl::NestedType(nested))
    }

    pub fn with_attributes(mut self, section: AttributeSection) -> Self {
        self.attributes.push(section);
        self
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self.name.span = span;
        self
    }

    // === Query Methods ===

    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    /// Nested type declarations in source order.
    pub fn nested_types(&self) -> impl Iterator<Item = &TypeDecl> {
        self.members.iter().filter_map(|m| match m {
            ClassMemberDecl::NestedType(t) => Some(t),
            _ => None,
        })
    }
}

// ============================================================================
// Class Members
// ============================================================================

/// One declaration in a class body.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassMemberDecl {
    Field(FieldDecl),
    Method(MethodDecl),
    Property(PropertyDecl),
    Event(EventDecl),
    EnumMember(EnumMemberDecl),
    /// The signature of the enclosing delegate type.
    Delegate(DelegateMemberDecl),
    NestedType(TypeDecl),
}

impl ClassMemberDecl {
    pub fn span(&self) -> Span {
        match self {
            ClassMemberDecl::Field(d) => d.span,
            ClassMemberDecl::Method(d) => d.span,
            ClassMemberDecl::Property(d) => d.span,
            ClassMemberDecl::Event(d) => d.span,
            ClassMemberDecl::EnumMember(d) => d.span,
            ClassMemberDecl::Delegate(d) => d.span,
            ClassMemberDecl::NestedType(d) => d.span,
        }
    }
}

/// A field declaration, possibly with several declarators.
///
/// `volatile int a, b;` declares two fields.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub modifiers: Modifiers,
    pub ty: TypeExpr,
    pub names: Vec<Ident>,
    pub attributes: Vec<AttributeSection>,
    pub span: Span,
}

impl FieldDecl {
    pub fn new(name: &str, ty: TypeExpr) -> Self {
        Self {
            modifiers: Modifiers::empty(),
            ty,
            names: vec![Ident::from(name)],
            attributes: Vec::new(),
            span: Span::default(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.names.push(Ident::new(name, self.span));
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    pub fn with_attributes(mut self, section: AttributeSection) -> Self {
        self.attributes.push(section);
        self
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        for name in &mut self.names {
            name.span = span;
        }
        self
    }
}

/// A member name, optionally qualified by the interface it explicitly implements.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberName {
    /// `I` in `void I.M()`.
    pub interface: Option<TypeExpr>,
    pub ident: Ident,
}

impl MemberName {
    pub fn simple(name: &str) -> Self {
        Self {
            interface: None,
            ident: Ident::from(name),
        }
    }

    pub fn is_explicit(&self) -> bool {
        self.interface.is_some()
    }
}

/// What sort of method a [`MethodDecl`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MethodKind {
    #[default]
    Normal,
    /// Instance constructor, named `.ctor`.
    Constructor,
    /// Static constructor, named `.cctor`.
    StaticConstructor,
    /// User-defined operator; the name is the `op_` method name.
    Operator,
}

/// A method, constructor or operator declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub modifiers: Modifiers,
    pub kind: MethodKind,
    pub name: MemberName,
    pub return_type: TypeExpr,
    pub params: Vec<ParamDecl>,
    pub attributes: Vec<AttributeSection>,
    pub span: Span,
}

impl MethodDecl {
    pub fn new(name: &str, return_type: TypeExpr) -> Self {
        Self {
            modifiers: Modifiers::empty(),
            kind: MethodKind::Normal,
            name: MemberName::simple(name),
            return_type,
            params: Vec::new(),
            attributes: Vec::new(),
            span: Span::default(),
        }
    }

    pub fn constructor() -> Self {
        let mut decl = Self::new(".ctor", TypeExpr::void());
        decl.kind = MethodKind::Constructor;
        decl
    }

    pub fn static_constructor() -> Self {
        let mut decl = Self::new(".cctor", TypeExpr::void());
        decl.kind = MethodKind::StaticConstructor;
        decl.modifiers = Modifiers::STATIC;
        decl
    }

    /// A user-defined operator such as `op_Addition`.
    pub fn operator(name: &str, return_type: TypeExpr) -> Self {
        let mut decl = Self::new(name, return_type);
        decl.kind = MethodKind::Operator;
        decl.modifiers = Modifiers::PUBLIC | Modifiers::STATIC;
        decl
    }

    // === Builder Methods ===

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    pub fn with_param(mut self, param: ParamDecl) -> Self {
        self.params.push(param);
        self
    }

    /// Make this an explicit implementation of `interface`'s member.
    pub fn implementing(mut self, interface: TypeExpr) -> Self {
        self.name.interface = Some(interface);
        self
    }

    pub fn with_attributes(mut self, section: AttributeSection) -> Self {
        self.attributes.push(section);
        self
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self.name.ident.span = span;
        self
    }
}

/// How a formal parameter is passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamDeclModifier {
    #[default]
    None,
    Ref,
    Out,
    Params,
    /// The `__arglist` pseudo-parameter.
    Arglist,
}

/// A formal parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub name: Ident,
    pub ty: TypeExpr,
    pub modifier: ParamDeclModifier,
    pub attributes: Vec<AttributeSection>,
    pub span: Span,
}

impl ParamDecl {
    pub fn new(name: &str, ty: TypeExpr) -> Self {
        Self {
            name: Ident::from(name),
            ty,
            modifier: ParamDeclModifier::None,
            attributes: Vec::new(),
            span: Span::default(),
        }
    }

    /// The `__arglist` marker.
    pub fn arglist() -> Self {
        Self::new("__arglist", TypeExpr::void()).with_modifier(ParamDeclModifier::Arglist)
    }

    pub fn with_modifier(mut self, modifier: ParamDeclModifier) -> Self {
        self.modifier = modifier;
        self
    }

    pub fn with_attributes(mut self, section: AttributeSection) -> Self {
        self.attributes.push(section);
        self
    }
}

/// A `get`/`set`/`add`/`remove` accessor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AccessorDecl {
    pub attributes: Vec<AttributeSection>,
    pub span: Span,
}

/// A property or indexer.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    pub modifiers: Modifiers,
    pub name: MemberName,
    pub ty: TypeExpr,
    /// Indexer parameters; empty for an ordinary property.
    pub params: Vec<ParamDecl>,
    pub getter: Option<AccessorDecl>,
    pub setter: Option<AccessorDecl>,
    pub attributes: Vec<AttributeSection>,
    pub span: Span,
}

impl PropertyDecl {
    /// A property with both accessors.
    pub fn new(name: &str, ty: TypeExpr) -> Self {
        Self {
            modifiers: Modifiers::empty(),
            name: MemberName::simple(name),
            ty,
            params: Vec::new(),
            getter: Some(AccessorDecl::default()),
            setter: Some(AccessorDecl::default()),
            attributes: Vec::new(),
            span: Span::default(),
        }
    }

    /// An indexer, named `Item`.
    pub fn indexer(ty: TypeExpr, params: Vec<ParamDecl>) -> Self {
        let mut decl = Self::new("Item", ty);
        decl.params = params;
        decl
    }

    pub fn read_only(mut self) -> Self {
        self.setter = None;
        self
    }

    pub fn write_only(mut self) -> Self {
        self.getter = None;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    pub fn implementing(mut self, interface: TypeExpr) -> Self {
        self.name.interface = Some(interface);
        self
    }

    pub fn with_attributes(mut self, section: AttributeSection) -> Self {
        self.attributes.push(section);
        self
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self.name.ident.span = span;
        self
    }
}

/// An event. Without accessors it is field-like.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDecl {
    pub modifiers: Modifiers,
    pub name: MemberName,
    pub ty: TypeExpr,
    pub add: Option<AccessorDecl>,
    pub remove: Option<AccessorDecl>,
    pub attributes: Vec<AttributeSection>,
    pub span: Span,
}

impl EventDecl {
    /// A field-like event.
    pub fn new(name: &str, ty: TypeExpr) -> Self {
        Self {
            modifiers: Modifiers::empty(),
            name: MemberName::simple(name),
            ty,
            add: None,
            remove: None,
            attributes: Vec::new(),
            span: Span::default(),
        }
    }

    pub fn with_accessors(mut self) -> Self {
        self.add = Some(AccessorDecl::default());
        self.remove = Some(AccessorDecl::default());
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    pub fn implementing(mut self, interface: TypeExpr) -> Self {
        self.name.interface = Some(interface);
        self
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self.name.ident.span = span;
        self
    }

    pub fn with_attributes(mut self, section: AttributeSection) -> Self {
        self.attributes.push(section);
        self
    }

    /// Field-like events have no user accessors and get a backing field.
    pub fn is_field_like(&self) -> bool {
        self.add.is_none() && self.remove.is_none()
    }
}

/// One enumerator.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumMemberDecl {
    pub name: Ident,
    /// Explicit value; otherwise previous value plus one.
    pub value: Option<Expr>,
    pub attributes: Vec<AttributeSection>,
    pub span: Span,
}

impl EnumMemberDecl {
    pub fn new(name: &str) -> Self {
        Self {
            name: Ident::from(name),
            value: None,
            attributes: Vec::new(),
            span: Span::default(),
        }
    }

    pub fn with_value(mut self, value: Expr) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_attributes(mut self, section: AttributeSection) -> Self {
        self.attributes.push(section);
        self
    }

    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self.name.span = span;
        self
    }
}

/// The signature carried by a delegate type declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct DelegateMemberDecl {
    pub return_type: TypeExpr,
    pub params: Vec<ParamDecl>,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;
    use classbind_core::PrimitiveType;

    #[test]
    fn delegate_carries_signature_member() {
        let decl = TypeDecl::delegate(
            "Handler",
            TypeExpr::void(),
            vec![ParamDecl::new("x", TypeExpr::primitive(PrimitiveType::Int32))],
        );
        assert_eq!(decl.kind, ClassKind::Delegate);
        assert!(matches!(decl.members[0], ClassMemberDecl::Delegate(ref d) if d.params.len() == 1));
    }

    #[test]
    fn nested_types_iterates_only_types() {
        let decl = TypeDecl::class("Outer")
            .with_member(ClassMemberDecl::Field(FieldDecl::new("f", TypeExpr::named("Outer"))))
            .with_nested(TypeDecl::class("Inner"))
            .with_nested(TypeDecl::structure("Point"));
        let names: Vec<_> = decl.nested_types().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Inner", "Point"]);
    }

    #[test]
    fn field_declarators() {
        let field = FieldDecl::new("a", TypeExpr::primitive(PrimitiveType::Int32))
            .with_name("b")
            .with_modifiers(Modifiers::VOLATILE);
        assert_eq!(field.names.len(), 2);
        assert!(field.modifiers.contains(Modifiers::VOLATILE));
    }

    #[test]
    fn event_shapes() {
        let ev = EventDecl::new("Click", TypeExpr::named("Handler"));
        assert!(ev.is_field_like());
        assert!(!ev.with_accessors().is_field_like());
    }

    #[test]
    fn constructor_names() {
        assert_eq!(MethodDecl::constructor().name.ident.as_str(), ".ctor");
        let cctor = MethodDecl::static_constructor();
        assert_eq!(cctor.kind, MethodKind::StaticConstructor);
        assert!(cctor.modifiers.contains(Modifiers::STATIC));
    }
}
