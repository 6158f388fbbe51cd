//! Narrow interfaces to the parts of the compiler this engine does not own.
//!
//! The engine needs four things from outside: turning a type expression into
//! a [`DataType`], evaluating a constant expression, deciding whether an
//! argument list binds to a candidate, and recording metadata. Each is a trait
//! with a default implementation good enough to drive the engine on its own.
//!
//! ## Modules
//!
//! - [`resolver`]: [`ScopeTypeResolver`], type expressions through name lookup
//! - [`constants`]: [`LiteralEvaluator`], literal and `typeof` constants
//! - [`applicability`]: [`StandardApplicability`], implicit-conversion binding
//! - [`sink`]: [`MetadataLog`], an in-memory metadata recorder

pub mod applicability;
pub mod constants;
pub mod resolver;
pub mod sink;

pub use applicability::StandardApplicability;
pub use constants::LiteralEvaluator;
pub use resolver::ScopeTypeResolver;
pub use sink::{MetadataLog, MetadataRecord};

use classbind_ast::{Expr, TypeExpr};
use classbind_core::{
    AttachedAttribute, ClassEntry, ClassId, CompilationError, ConstValue, DataType, FatalError,
    MemberEntry,
};

use crate::context::{CompilationContext, ResolutionContext};

// ============================================================================
// Values exchanged with collaborators
// ============================================================================

/// One evaluated call argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    /// Static type of the argument expression.
    pub ty: DataType,
    /// Value, when the argument is a compile-time constant.
    pub constant: Option<ConstValue>,
}

impl Argument {
    pub fn new(ty: DataType) -> Self {
        Self { ty, constant: None }
    }

    pub fn constant(value: TypedConstant) -> Self {
        Self {
            ty: value.ty,
            constant: Some(value.value),
        }
    }
}

/// A constant together with its static type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedConstant {
    pub value: ConstValue,
    pub ty: DataType,
}

impl TypedConstant {
    pub fn new(value: ConstValue, ty: DataType) -> Self {
        Self { value, ty }
    }
}

/// How an argument list binds to a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplicableForm {
    /// Arguments match the parameters one to one.
    Normal,
    /// Trailing arguments are collected into a `params` array or `__arglist`.
    Expanded,
}

/// Outcome of comparing two applicable candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Better {
    First,
    Second,
    Neither,
}

// ============================================================================
// Traits
// ============================================================================

/// Resolves type expressions for base lists and member annotations.
pub trait TypeResolver {
    fn resolve_type(
        &self,
        ctx: &CompilationContext,
        res: &ResolutionContext,
        expr: &TypeExpr,
    ) -> Result<DataType, CompilationError>;
}

/// Evaluates constant expressions and converts constants between types.
pub trait ConstantEvaluator {
    fn evaluate(
        &self,
        ctx: &CompilationContext,
        res: &ResolutionContext,
        expr: &Expr,
    ) -> Result<TypedConstant, CompilationError>;

    /// Convert `value` to `target`, or `None` when no implicit conversion exists.
    fn coerce(
        &self,
        ctx: &CompilationContext,
        value: &TypedConstant,
        target: &DataType,
    ) -> Option<ConstValue>;
}

/// Decides whether arguments bind to a candidate, and which of two
/// applicable candidates is better.
pub trait Applicability {
    fn applicable_form(
        &self,
        ctx: &CompilationContext,
        args: &[Argument],
        candidate: &MemberEntry,
    ) -> Option<ApplicableForm>;

    fn better(
        &self,
        ctx: &CompilationContext,
        args: &[Argument],
        first: (&MemberEntry, ApplicableForm),
        second: (&MemberEntry, ApplicableForm),
    ) -> Better;
}

/// Receives the metadata records produced by gathering and attribute binding.
///
/// Every method may fail with [`FatalError`]; callers propagate it with `?`.
pub trait MetadataSink {
    /// A reference to a class from a referenced unit.
    fn import_class(&mut self, class: &ClassEntry) -> Result<(), FatalError>;

    /// A class defined by this compilation, once its parent is known.
    fn create_class(&mut self, class: &ClassEntry) -> Result<(), FatalError>;

    fn create_member(&mut self, member: &MemberEntry) -> Result<(), FatalError>;

    fn attach_interface(&mut self, class: &ClassEntry, interface: ClassId) -> Result<(), FatalError>;

    fn attach_attribute_blob(&mut self, attribute: &AttachedAttribute) -> Result<(), FatalError>;
}
