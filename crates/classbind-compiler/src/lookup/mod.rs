//! Member lookup engine.
//!
//! A lookup runs in three steps:
//!
//! 1. [`find_members`] collects every accessible candidate with a given name,
//!    walking a class's parents and, for interfaces, its base interfaces.
//! 2. [`trim_member_list`] drops shadowed and duplicated candidates and
//!    collapses the rest into one semantic kind, or reports ambiguity.
//! 3. [`filter_static`] / [`filter_non_static`] keep only the members that can
//!    be reached through a type or through an instance.
//!
//! The public entry points in [`names`] combine those steps for bare names,
//! dotted member access, constructors and indexers.
//!
//! ## Modules
//!
//! - [`find`]: candidate collection
//! - [`trim`]: shadowing, de-duplication and result-kind selection
//! - [`filter`]: static / instance filtering
//! - [`names`]: name resolution entry points and ambiguity diagnostics

pub mod filter;
pub mod find;
pub mod names;
pub mod trim;

pub use filter::{filter_non_static, filter_static};
pub use find::{find_indexers, find_members};
pub use names::{
    describe_item, find_type_in_namespace, resolve_constructor, resolve_indexers,
    resolve_member_name, resolve_simple_name, try_resolve_constructor, try_resolve_member_name,
    try_resolve_qualified_name, try_resolve_simple_name,
};
pub use trim::{Trimmed, trim_member_list};

use classbind_core::{ClassId, DataType, MemberId};
use classbind_registry::NodeIndex;

use crate::overload::MethodGroup;

/// What one lookup candidate refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupTarget {
    Member(MemberId),
    Type(ClassId),
    /// A type that is declared but whose class is not built yet.
    DeferredType(ClassId),
    Namespace(NodeIndex),
}

/// One candidate in a member lookup result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LookupItem {
    pub target: LookupTarget,
    /// The class the candidate was found in; `None` for namespace-level items.
    pub owner: Option<ClassId>,
}

impl LookupItem {
    pub fn member(member: MemberId, owner: ClassId) -> Self {
        Self {
            target: LookupTarget::Member(member),
            owner: Some(owner),
        }
    }

    pub fn member_id(&self) -> Option<MemberId> {
        match self.target {
            LookupTarget::Member(id) => Some(id),
            _ => None,
        }
    }
}

/// The result of resolving a name.
///
/// `Void` is the "nothing usable" sentinel: a failed resolution has already
/// been reported, and callers keep going with it rather than cascading.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SemanticValue {
    #[default]
    Void,
    Namespace(NodeIndex),
    Type(ClassId),
    /// A type found before the class graph is complete.
    DeferredType(ClassId),
    Field(MemberId),
    Property(MemberId),
    Event(MemberId),
    MethodGroup(MethodGroup),
    IndexerGroup(Vec<MemberId>),
    /// An assignable value of the given type.
    LValue(DataType),
    /// A value of the given type.
    RValue(DataType),
}

impl SemanticValue {
    pub fn is_void(&self) -> bool {
        matches!(self, SemanticValue::Void)
    }

    /// The class named by a `Type` or `DeferredType` value.
    pub fn as_type(&self) -> Option<ClassId> {
        match self {
            SemanticValue::Type(id) | SemanticValue::DeferredType(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_method_group(&self) -> Option<&MethodGroup> {
        match self {
            SemanticValue::MethodGroup(group) => Some(group),
            _ => None,
        }
    }

    /// Short kind name for diagnostics and logging.
    pub fn kind_name(&self) -> &'static str {
        match self {
            SemanticValue::Void => "void",
            SemanticValue::Namespace(_) => "namespace",
            SemanticValue::Type(_) | SemanticValue::DeferredType(_) => "type",
            SemanticValue::Field(_) => "field",
            SemanticValue::Property(_) => "property",
            SemanticValue::Event(_) => "event",
            SemanticValue::MethodGroup(_) => "method group",
            SemanticValue::IndexerGroup(_) => "indexer group",
            SemanticValue::LValue(_) | SemanticValue::RValue(_) => "value",
        }
    }
}
