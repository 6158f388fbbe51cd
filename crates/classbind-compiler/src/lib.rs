//! Classbind Compiler
//!
//! Symbol resolution and binding for a class-based front end: builds the
//! class graph from declarations, answers name lookups against it, picks
//! overloads and binds attributes.
//!
//! ## Architecture
//!
//! - **Pass 1 (Declare)**: declare every namespace and type name
//! - **Pass 2 (Gather)**: resolve base types, bases before derived types
//! - **Pass 3 (Members)**: create members and check hiding and overriding
//! - **Pass 4 (Attributes)**: bind attribute sections to program items
//!
//! Lookup and overload resolution run on demand against the finished graph.
//!
//! ## Modules
//!
//! - [`attributes`]: attribute binding and the blob codec
//! - [`collaborators`]: type resolver, constant evaluator, applicability and metadata sink
//! - [`context`]: compilation context, options and resolution context
//! - [`conversion`]: implicit conversions used by applicability checks
//! - [`corlib`]: core library prelude
//! - [`lookup`]: member lookup, trimming and name resolution
//! - [`overload`]: method groups and overload resolution
//! - [`passes`]: declaration, gather and member passes

pub mod attributes;
pub mod collaborators;
pub mod context;
pub mod conversion;
pub mod corlib;
pub mod lookup;
pub mod overload;
pub mod passes;

pub use attributes::{AttributeOutput, AttributePass, AttributeSite, Declaration, apply_attributes};
pub use collaborators::{
    Applicability, ApplicableForm, Argument, Better, ConstantEvaluator, MetadataLog,
    MetadataRecord, MetadataSink, TypeResolver, TypedConstant,
};
pub use context::{CompilationContext, CompilerOptions, ResolutionContext, WellKnown};
pub use conversion::{Conversion, ConversionKind, find_implicit_conversion};
pub use corlib::CoreTypes;
pub use lookup::{
    LookupItem, LookupTarget, SemanticValue, resolve_constructor, resolve_indexers,
    resolve_member_name, resolve_simple_name, try_resolve_constructor, try_resolve_member_name,
    try_resolve_simple_name,
};
pub use overload::{MethodGroup, resolve_overload};
pub use passes::{
    DeclarationOutput, DeclarePass, DeclaredType, DeclaredUnit, GatherOutput, GatherPass,
    MemberOutput, MemberPass,
};

// Re-export the error types from core for convenience
pub use classbind_core::{CompilationError, CompilationWarning, FatalError};

use classbind_ast::CompilationUnit;
use tracing::info;

/// Declare every type of `units` and build the class graph. The returned
/// types are ordered so that no type precedes its bases.
pub fn gather_types<'ast>(
    ctx: &mut CompilationContext,
    units: &'ast [CompilationUnit],
) -> Result<(DeclarationOutput<'ast>, GatherOutput<'ast>), FatalError> {
    let declared = DeclarePass::new(ctx).run(units);
    let gathered = GatherPass::new(ctx, &declared.types).run()?;
    Ok((declared, gathered))
}

/// Create the members of gathered types.
pub fn build_members<'ast>(
    ctx: &mut CompilationContext,
    gathered: &GatherOutput<'ast>,
) -> Result<MemberOutput<'ast>, FatalError> {
    MemberPass::new(ctx, &gathered.types).run()
}

/// Summary of a full run.
#[derive(Debug)]
pub struct CompilationOutput<'ast> {
    pub core: CoreTypes,
    /// Gathered types, bases first.
    pub types: Vec<DeclaredType<'ast>>,
    pub members: usize,
    pub attributes: AttributeOutput,
}

/// Run every pass over `units`: install the core library, gather types,
/// build members and bind attributes.
///
/// Declaration errors are left in `ctx`'s diagnostics. Only a metadata
/// sink failure stops the run.
#[tracing::instrument(level = "debug", skip_all, fields(units = units.len()))]
pub fn compile<'ast>(
    ctx: &mut CompilationContext,
    units: &'ast [CompilationUnit],
) -> Result<CompilationOutput<'ast>, FatalError> {
    let core = corlib::install(ctx)?;
    let (declared, gathered) = gather_types(ctx, units)?;
    let members = build_members(ctx, &gathered)?;
    let attributes = AttributePass::new(ctx, &members.sites, &declared.units).run()?;

    info!(
        types = gathered.types.len(),
        members = members.members,
        attributes = attributes.attached,
        errors = ctx.diagnostics().error_count(),
        warnings = ctx.diagnostics().warning_count(),
        "compilation complete"
    );
    Ok(CompilationOutput {
        core,
        types: gathered.types,
        members: members.members,
        attributes,
    })
}
