//! Classbind
//!
//! Symbol resolution and overload binding for a class-based language front
//! end. This crate re-exports the workspace crates:
//!
//! - [`core`]: spans, ids, types, constants, entities and diagnostics
//! - [`ast`]: declaration syntax consumed by the passes
//! - [`registry`]: the scope tree and class graph
//! - [`compiler`]: passes, lookup, overload resolution and attribute binding
//!
//! ```
//! use classbind::prelude::*;
//!
//! let units = [CompilationUnit::new("a.cs").with_type(TypeDecl::class("Widget"))];
//! let mut ctx = CompilationContext::default();
//! let output = compile(&mut ctx, &units).unwrap();
//! assert_eq!(output.types.len(), 1);
//! assert!(!ctx.has_errors());
//! ```

pub use classbind_ast as ast;
pub use classbind_compiler as compiler;
pub use classbind_core as core;
pub use classbind_registry as registry;

pub use classbind_compiler::{CompilationOutput, build_members, compile, gather_types};

// Re-export main types
pub mod prelude {
    pub use classbind_ast::{
        AttributeSection, AttributeUse, ClassMemberDecl, CompilationUnit, Expr, Modifiers,
        QualifiedName, TypeDecl, TypeExpr,
    };
    pub use classbind_compiler::{
        CompilationContext, CompilerOptions, ResolutionContext, SemanticValue, WellKnown,
        compile,
    };
    pub use classbind_core::{
        ClassId, CompilationError, CompilationWarning, DataType, FatalError, MemberId, Span,
    };
    pub use classbind_registry::{ClassGraph, ScopeTree};
}
