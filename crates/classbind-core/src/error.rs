//! Error types for type gathering, member lookup and attribute binding.
//!
//! ## Error Hierarchy
//!
//! ```text
//! CompilationError   - reported, non-fatal; processing continues
//! ├── declaration    - duplicates, recursive bases, missing override/new
//! ├── resolution     - not found, ambiguous, not a member, no applicable overload
//! └── attribute      - bad attribute class, target or argument
//! CompilationWarning - reported, never blocks compilation
//! FatalError         - metadata allocation failure; aborts the compilation
//! ```

use thiserror::Error;

use crate::Span;

/// Render candidate lines as `\n  candidate` for ambiguity messages.
fn candidate_lines(candidates: &[String]) -> String {
    candidates.iter().map(|c| format!("\n  {c}")).collect()
}

// ============================================================================
// Compilation Errors
// ============================================================================

/// Errors reported while gathering types, resolving names and binding attributes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilationError {
    // === Declaration ===
    /// A declared type collides with a type from a referenced unit.
    #[error("at {span}: `{name}' conflicts with imported type")]
    ImportedTypeConflict { name: String, span: Span },

    /// A declared type collides with an earlier declaration.
    #[error("at {span}: `{name}' is already declared (previous declaration at {previous})")]
    AlreadyDeclared {
        name: String,
        /// Where the first declaration was.
        previous: Span,
        span: Span,
    },

    /// A namespace segment collides with an existing type.
    #[error("at {span}: `{name}' is not a valid namespace")]
    InvalidNamespace { name: String, span: Span },

    /// A declared type collides with an existing namespace.
    #[error("at {span}: `{name}' cannot be declared as a type because it is already declared as namespace")]
    TypeIsNamespace { name: String, span: Span },

    /// A member has the same name as a nested type of its class.
    #[error("at {span}: member `{name}' conflicts with a type name in the same scope")]
    MemberConflictsWithType { name: String, span: Span },

    /// The base type graph contains a cycle through this type.
    #[error("at {span}: `{name}' is defined recursively")]
    RecursiveDefinition { name: String, span: Span },

    /// A base type expression does not name a class or interface.
    #[error("at {span}: invalid base type")]
    InvalidBaseType { span: Span },

    /// More than one non-interface base was listed.
    #[error("at {span}: `{name}': class inherits from two or more non-interface classes")]
    MultipleClassBases { name: String, span: Span },

    /// An interface listed a class as a base.
    #[error("at {span}: interface `{name}' inherits from non-interface class")]
    InterfaceInheritsClass { name: String, span: Span },

    /// The parent class is sealed.
    #[error("at {span}: inheriting from a sealed parent class `{parent}'")]
    SealedParent { parent: String, span: Span },

    /// A member clashes with another member of the same class.
    #[error("at {span}: declaration of `{name}' conflicts with an existing member")]
    MemberConflict { name: String, span: Span },

    /// A member hides an inherited member without `new`.
    #[error("at {span}: declaration of `{name}' hides an inherited member, and `new' was not present")]
    HidesInherited { name: String, span: Span },

    /// A member overrides an inherited virtual member without `override`.
    #[error("at {span}: declaration of `{name}' overrides an inherited member, and `override' was not present")]
    MissingOverride { name: String, span: Span },

    /// `override` was given but no inherited virtual member matches.
    #[error("at {span}: `{name}': no suitable member found to override")]
    NothingToOverride { name: String, span: Span },

    /// An explicit implementation qualifier is not an interface.
    #[error("at {span}: `{name}' is not an interface")]
    NotAnInterface { name: String, span: Span },

    /// Explicit interface implementations were used inside an interface.
    #[error("at {span}: cannot use explicit interface member implementations within interfaces")]
    ExplicitImplInInterface { span: Span },

    /// An explicit interface implementation carries a forbidden modifier.
    #[error("at {span}: explicit interface member implementation {reason}")]
    InvalidExplicitImpl { reason: String, span: Span },

    /// The named interface has no member with this name and signature.
    #[error("at {span}: specified member is not present in `{interface}'")]
    InterfaceMemberMissing { interface: String, span: Span },

    #[error("at {span}: `__arglist' must be the last formal parameter")]
    ArglistNotLast { span: Span },

    #[error("at {span}: `__arglist' cannot be used with indexers")]
    ArglistInIndexer { span: Span },

    #[error("at {span}: the identifier `value__' is reserved in enumerated types")]
    ReservedEnumMember { span: Span },

    /// An event's declared type is not a delegate.
    #[error("at {span}: `{name}' is not a delegate type")]
    NotADelegate { name: String, span: Span },

    #[error("at {span}: cannot declare an event called `value'")]
    EventNamedValue { span: Span },

    /// A name used as a type resolved to something else.
    #[error("at {span}: `{name}' is not a type")]
    NotAType { name: String, span: Span },

    // === Resolution ===
    /// A simple name matched nothing.
    #[error("at {span}: `{name}' is not declared in the current scope")]
    NotDeclared { name: String, span: Span },

    /// A name matched several unrelated candidates.
    #[error("at {span}: `{name}' is ambiguous; possibilities are:{}", candidate_lines(.candidates))]
    Ambiguous {
        name: String,
        /// One line per distinct candidate.
        candidates: Vec<String>,
        span: Span,
    },

    #[error("at {span}: `{name}' is not a member of the namespace `{namespace}'")]
    NotNamespaceMember {
        name: String,
        namespace: String,
        span: Span,
    },

    /// Static lookup through a type found nothing usable.
    #[error("at {span}: `{name}' is not a member of the type `{type_name}'")]
    NotTypeMember {
        name: String,
        type_name: String,
        span: Span,
    },

    /// Instance lookup through a value found nothing usable.
    #[error("at {span}: `{name}' is not an instance member of the type `{type_name}'")]
    NotInstanceMember {
        name: String,
        type_name: String,
        span: Span,
    },

    #[error("at {span}: invalid left operand to `.'")]
    InvalidLeftOperand { span: Span },

    /// No candidate in a method group accepts the arguments.
    #[error("at {span}: no accessible member `{name}' is applicable to the arguments ({args})")]
    NoApplicableMember {
        name: String,
        args: String,
        span: Span,
    },

    /// Several candidates accept the arguments and none is better.
    #[error("at {span}: call to `{name}' is ambiguous; candidates are:{}", candidate_lines(.candidates))]
    AmbiguousOverload {
        name: String,
        candidates: Vec<String>,
        span: Span,
    },

    // === Attributes ===
    #[error("at {span}: `{name}' is not an attribute class")]
    NotAnAttribute { name: String, span: Span },

    #[error("at {span}: cannot apply abstract attribute class `{name}'")]
    AbstractAttribute { name: String, span: Span },

    #[error("at {span}: `{target}' is not a recognized attribute target")]
    UnknownAttributeTarget { target: String, span: Span },

    #[error("at {span}: attribute target `{target}' is not valid for this declaration")]
    InvalidAttributeTarget { target: String, span: Span },

    /// The attribute's usage constraint excludes this declaration kind.
    #[error("at {span}: attribute `{name}' is not valid on this declaration type")]
    AttributeNotValidOn { name: String, span: Span },

    /// The usage meta-attribute was applied to a non-attribute class.
    #[error("at {span}: `{name}' may only be applied to attribute classes")]
    UsageOnNonAttribute { name: String, span: Span },

    #[error("at {span}: attribute class `{name}' definition is recursive")]
    RecursiveAttribute { name: String, span: Span },

    #[error("at {span}: attribute argument is not a constant")]
    NotConstant { span: Span },

    #[error("at {span}: attribute argument of type `{type_name}' cannot be serialized")]
    NotSerializable { type_name: String, span: Span },

    #[error("at {span}: cannot convert attribute argument from `{from}' to `{to}'")]
    CannotCoerce { from: String, to: String, span: Span },

    // === Other ===
    /// An internal invariant was violated.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl CompilationError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            CompilationError::ImportedTypeConflict { span, .. }
            | CompilationError::AlreadyDeclared { span, .. }
            | CompilationError::InvalidNamespace { span, .. }
            | CompilationError::TypeIsNamespace { span, .. }
            | CompilationError::MemberConflictsWithType { span, .. }
            | CompilationError::RecursiveDefinition { span, .. }
            | CompilationError::InvalidBaseType { span }
            | CompilationError::MultipleClassBases { span, .. }
            | CompilationError::InterfaceInheritsClass { span, .. }
            | CompilationError::SealedParent { span, .. }
            | CompilationError::MemberConflict { span, .. }
            | CompilationError::HidesInherited { span, .. }
            | CompilationError::MissingOverride { span, .. }
            | CompilationError::NothingToOverride { span, .. }
            | CompilationError::NotAnInterface { span, .. }
            | CompilationError::ExplicitImplInInterface { span }
            | CompilationError::InvalidExplicitImpl { span, .. }
            | CompilationError::InterfaceMemberMissing { span, .. }
            | CompilationError::ArglistNotLast { span }
            | CompilationError::ArglistInIndexer { span }
            | CompilationError::ReservedEnumMember { span }
            | CompilationError::NotADelegate { span, .. }
            | CompilationError::EventNamedValue { span }
            | CompilationError::NotAType { span, .. }
            | CompilationError::NotDeclared { span, .. }
            | CompilationError::Ambiguous { span, .. }
            | CompilationError::NotNamespaceMember { span, .. }
            | CompilationError::NotTypeMember { span, .. }
            | CompilationError::NotInstanceMember { span, .. }
            | CompilationError::InvalidLeftOperand { span }
            | CompilationError::NoApplicableMember { span, .. }
            | CompilationError::AmbiguousOverload { span, .. }
            | CompilationError::NotAnAttribute { span, .. }
            | CompilationError::AbstractAttribute { span, .. }
            | CompilationError::UnknownAttributeTarget { span, .. }
            | CompilationError::InvalidAttributeTarget { span, .. }
            | CompilationError::AttributeNotValidOn { span, .. }
            | CompilationError::UsageOnNonAttribute { span, .. }
            | CompilationError::RecursiveAttribute { span, .. }
            | CompilationError::NotConstant { span }
            | CompilationError::NotSerializable { span, .. }
            | CompilationError::CannotCoerce { span, .. } => *span,
            CompilationError::Internal { .. } => Span::default(),
        }
    }

    /// Whether this is a name-resolution error.
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            CompilationError::NotDeclared { .. }
                | CompilationError::Ambiguous { .. }
                | CompilationError::NotNamespaceMember { .. }
                | CompilationError::NotTypeMember { .. }
                | CompilationError::NotInstanceMember { .. }
                | CompilationError::InvalidLeftOperand { .. }
                | CompilationError::NoApplicableMember { .. }
                | CompilationError::AmbiguousOverload { .. }
        )
    }
}

// ============================================================================
// Warnings
// ============================================================================

/// Non-blocking diagnostics.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilationWarning {
    /// `new` was given but nothing is hidden.
    #[error("at {span}: declaration of `{name}' includes unnecessary `new' keyword")]
    UnnecessaryNew { name: String, span: Span },
}

impl CompilationWarning {
    pub fn span(&self) -> Span {
        match self {
            CompilationWarning::UnnecessaryNew { span, .. } => *span,
        }
    }
}

// ============================================================================
// Fatal Errors
// ============================================================================

/// Unrecoverable failures that abort the whole compilation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FatalError {
    /// The metadata sink could not allocate a record.
    #[error("out of memory while {context}")]
    OutOfMemory { context: String },
}
