//! Core types shared by the classbind crates.
//!
//! This crate has no knowledge of syntax or lookup. It defines the entity
//! records the class graph stores, the value and type vocabulary members
//! are declared with, and the diagnostics every pass reports through.
//!
//! ## Modules
//!
//! - [`span`]: source locations
//! - [`ids`]: arena indices and attribute-able program items
//! - [`type_hash`]: stable identity hashes for types and members
//! - [`data_type`]: member and parameter types, signatures
//! - [`value`]: compile-time constants
//! - [`modifiers`]: visibility, class kinds and flag sets
//! - [`attr_target`]: attribute target kinds
//! - [`entries`]: class and member records
//! - [`error`]: error, warning and fatal error types
//! - [`diagnostics`]: error and warning collection

pub mod attr_target;
pub mod data_type;
pub mod diagnostics;
pub mod entries;
pub mod error;
pub mod ids;
pub mod modifiers;
pub mod span;
pub mod type_hash;
pub mod value;

pub use attr_target::AttributeTargets;
pub use data_type::{DataType, Param, ParamModifier, PrimitiveType, Signature};
pub use diagnostics::{Diagnostics, Located};
pub use entries::{
    AttachedAttribute, AttrMode, ClassEntry, MemberData, MemberEntry, MemberKind, ResolutionState,
};
pub use error::{CompilationError, CompilationWarning, FatalError};
pub use ids::{ClassId, MemberId, ProgramItem};
pub use modifiers::{ClassFlags, ClassKind, MemberFlags, Visibility};
pub use span::Span;
pub use type_hash::TypeHash;
pub use value::ConstValue;
