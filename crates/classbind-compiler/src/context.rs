//! CompilationContext - owner of the scope tree, class graph and diagnostics.
//!
//! Every pass borrows the context mutably for its duration. The external
//! collaborators (type resolver, constant evaluator, applicability checker and
//! metadata sink) live here too, as boxed trait objects, so a pass can hand
//! `&CompilationContext` to a collaborator while holding its own borrow of a
//! sibling field.

use classbind_ast::{Expr, TypeExpr};
use classbind_core::{
    ClassId, CompilationError, CompilationWarning, DataType, Diagnostics, MemberEntry,
};
use classbind_registry::{BlockId, ClassGraph, NodeIndex, ScopeTree};

use crate::collaborators::{
    Applicability, ApplicableForm, Argument, Better, ConstantEvaluator, LiteralEvaluator,
    MetadataLog, MetadataSink, ScopeTypeResolver, StandardApplicability, TypeResolver,
    TypedConstant,
};

// ============================================================================
// Options
// ============================================================================

/// Core library types the engine needs by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnown {
    Object,
    ValueType,
    Enum,
    Delegate,
    MulticastDelegate,
    String,
    Type,
    Attribute,
    AttributeUsage,
    ParamArray,
}

impl WellKnown {
    pub const ALL: [WellKnown; 10] = [
        WellKnown::Object,
        WellKnown::ValueType,
        WellKnown::Enum,
        WellKnown::Delegate,
        WellKnown::MulticastDelegate,
        WellKnown::String,
        WellKnown::Type,
        WellKnown::Attribute,
        WellKnown::AttributeUsage,
        WellKnown::ParamArray,
    ];

    /// Conventional qualified name in the core library.
    pub fn default_name(self) -> &'static str {
        match self {
            WellKnown::Object => "System.Object",
            WellKnown::ValueType => "System.ValueType",
            WellKnown::Enum => "System.Enum",
            WellKnown::Delegate => "System.Delegate",
            WellKnown::MulticastDelegate => "System.MulticastDelegate",
            WellKnown::String => "System.String",
            WellKnown::Type => "System.Type",
            WellKnown::Attribute => "System.Attribute",
            WellKnown::AttributeUsage => "System.AttributeUsageAttribute",
            WellKnown::ParamArray => "System.ParamArrayAttribute",
        }
    }
}

/// Explicit configuration for one compilation.
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// Name of the assembly being built. Non-imported types belong to it.
    pub assembly_name: String,
    /// Appended to attribute names that do not already end with it.
    pub attribute_suffix: String,
    well_known: [String; 10],
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            assembly_name: "a.out".to_string(),
            attribute_suffix: "Attribute".to_string(),
            well_known: WellKnown::ALL.map(|k| k.default_name().to_string()),
        }
    }
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    // === Builder Methods ===

    pub fn with_assembly_name(mut self, name: impl Into<String>) -> Self {
        self.assembly_name = name.into();
        self
    }

    pub fn with_attribute_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.attribute_suffix = suffix.into();
        self
    }

    /// Override the qualified name used for a well-known type.
    pub fn with_well_known(mut self, kind: WellKnown, qualified_name: impl Into<String>) -> Self {
        self.well_known[kind as usize] = qualified_name.into();
        self
    }

    // === Query Methods ===

    pub fn well_known_name(&self, kind: WellKnown) -> &str {
        &self.well_known[kind as usize]
    }
}

// ============================================================================
// Resolution Context
// ============================================================================

/// The "current namespace / class / access scope" for a name lookup.
///
/// A plain value: recursive calls copy it, change it, and let the caller's
/// copy stand untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionContext {
    /// Directive block supplying `using` imports and aliases.
    pub block: Option<BlockId>,
    /// Innermost enclosing namespace.
    pub namespace: NodeIndex,
    /// Innermost enclosing class, searched before any namespace.
    pub class: Option<ClassId>,
    /// Class whose accessibility applies; `None` is outside any class.
    pub access_from: Option<ClassId>,
}

impl ResolutionContext {
    /// Resolution at the top of a namespace, with no `using` directives.
    pub fn at_namespace(namespace: NodeIndex) -> Self {
        Self {
            block: None,
            namespace,
            class: None,
            access_from: None,
        }
    }

    pub fn with_block(mut self, block: BlockId) -> Self {
        self.block = Some(block);
        self
    }

    /// Resolve from inside `class`'s body.
    pub fn within_class(mut self, class: ClassId) -> Self {
        self.class = Some(class);
        self.access_from = Some(class);
        self
    }
}

// ============================================================================
// Compilation Context
// ============================================================================

/// Everything one compilation owns.
pub struct CompilationContext {
    options: CompilerOptions,
    pub(crate) scopes: ScopeTree,
    pub(crate) graph: ClassGraph,
    pub(crate) diagnostics: Diagnostics,
    /// Set while the base-type graph is being built. Declared but unbuilt
    /// types then resolve as deferred references.
    pub(crate) gathering: bool,
    pub(crate) resolver: Box<dyn TypeResolver>,
    pub(crate) evaluator: Box<dyn ConstantEvaluator>,
    pub(crate) applicability: Box<dyn Applicability>,
    pub(crate) sink: Box<dyn MetadataSink>,
}

impl Default for CompilationContext {
    fn default() -> Self {
        Self::new(CompilerOptions::default())
    }
}

impl CompilationContext {
    /// Create a context with the default collaborators.
    pub fn new(options: CompilerOptions) -> Self {
        Self {
            options,
            scopes: ScopeTree::new(),
            graph: ClassGraph::new(),
            diagnostics: Diagnostics::new(),
            gathering: false,
            resolver: Box::new(ScopeTypeResolver),
            evaluator: Box::new(LiteralEvaluator),
            applicability: Box::new(StandardApplicability),
            sink: Box::new(MetadataLog::new()),
        }
    }

    // === Builder Methods ===

    pub fn with_type_resolver(mut self, resolver: impl TypeResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn with_constant_evaluator(mut self, evaluator: impl ConstantEvaluator + 'static) -> Self {
        self.evaluator = Box::new(evaluator);
        self
    }

    pub fn with_applicability(mut self, applicability: impl Applicability + 'static) -> Self {
        self.applicability = Box::new(applicability);
        self
    }

    pub fn with_metadata_sink(mut self, sink: impl MetadataSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    // === Accessors ===

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    pub fn scopes_mut(&mut self) -> &mut ScopeTree {
        &mut self.scopes
    }

    pub fn graph(&self) -> &ClassGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut ClassGraph {
        &mut self.graph
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Whether the base-type graph is currently being built.
    pub fn is_gathering(&self) -> bool {
        self.gathering
    }

    /// Resolution context at the global namespace.
    pub fn global_resolution(&self) -> ResolutionContext {
        ResolutionContext::at_namespace(self.scopes.root())
    }

    /// The class registered for a well-known type, if any.
    pub fn well_known(&self, kind: WellKnown) -> Option<ClassId> {
        self.graph.class_by_name(self.options.well_known_name(kind))
    }

    /// `DataType` of a well-known class, or [`DataType::Error`] when absent.
    pub fn well_known_type(&self, kind: WellKnown) -> DataType {
        match self.well_known(kind) {
            Some(id) => DataType::Class(self.graph.class(id).type_hash),
            None => DataType::Error,
        }
    }

    // === Diagnostics ===

    pub fn add_error(&mut self, error: CompilationError) {
        self.diagnostics.add_error(error);
    }

    pub fn add_warning(&mut self, warning: CompilationWarning) {
        self.diagnostics.add_warning(warning);
    }

    /// Attribute subsequent diagnostics to a source file.
    pub fn set_file(&mut self, file: Option<String>) {
        self.diagnostics.set_file(file);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    pub fn take_errors(&mut self) -> Vec<CompilationError> {
        self.diagnostics.take_errors()
    }

    // === Collaborators ===

    pub fn resolve_type(
        &self,
        res: &ResolutionContext,
        expr: &TypeExpr,
    ) -> Result<DataType, CompilationError> {
        self.resolver.resolve_type(self, res, expr)
    }

    pub fn evaluate_constant(
        &self,
        res: &ResolutionContext,
        expr: &Expr,
    ) -> Result<TypedConstant, CompilationError> {
        self.evaluator.evaluate(self, res, expr)
    }

    pub fn coerce_constant(
        &self,
        value: &TypedConstant,
        target: &DataType,
    ) -> Option<classbind_core::ConstValue> {
        self.evaluator.coerce(self, value, target)
    }

    pub fn applicable_form(&self, args: &[Argument], candidate: &MemberEntry) -> Option<ApplicableForm> {
        self.applicability.applicable_form(self, args, candidate)
    }

    pub fn better_candidate(
        &self,
        args: &[Argument],
        first: (&MemberEntry, ApplicableForm),
        second: (&MemberEntry, ApplicableForm),
    ) -> Better {
        self.applicability.better(self, args, first, second)
    }
}
