//! Declaration syntax for the classbind engine.
//!
//! These records are what the parser hands to the type gatherer. They are
//! owned values rather than arena references: gathering reads them once and
//! keeps only the entities it builds.
//!
//! ## Modules
//!
//! - [`node`]: identifiers, dotted names and source modifiers
//! - [`types`]: type expressions
//! - [`expr`]: the constant-expression subset used by attributes and enums
//! - [`attribute`]: attribute sections
//! - [`decl`]: compilation units, namespaces, types and class members
//!
//! # Example
//!
//! ```
//! use classbind_ast::*;
//!
//! let unit = CompilationUnit::new("shapes.cs").with_item(Item::Namespace(
//!     NamespaceDecl::new("Shapes")
//!         .with_type(TypeDecl::class("Shape").with_modifiers(Modifiers::PUBLIC | Modifiers::ABSTRACT))
//!         .with_type(TypeDecl::class("Circle").with_base(TypeExpr::named("Shape"))),
//! ));
//! assert_eq!(unit.items.len(), 1);
//! ```

pub mod attribute;
pub mod decl;
pub mod expr;
pub mod node;
pub mod types;

pub use attribute::{AttributeSection, AttributeUse};
pub use decl::{
    AccessorDecl, ClassMemberDecl, CompilationUnit, DelegateMemberDecl, EnumMemberDecl, EventDecl,
    FieldDecl, Item, MemberName, MethodDecl, MethodKind, NamespaceDecl, ParamDecl, ParamDeclModifier,
    PropertyDecl, TypeDecl, UsingDecl,
};
pub use expr::{Expr, Literal};
pub use node::{Ident, Modifiers, QualifiedName};
pub use types::TypeExpr;
