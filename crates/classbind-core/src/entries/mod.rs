//! Entity records owned by the class graph.
//!
//! - [`ClassEntry`]: a class, struct, interface, enum or delegate
//! - [`MemberEntry`]: a field, method, property or event
//! - [`AttachedAttribute`]: a serialized attribute bound to a program item

mod class;
mod member;

pub use class::{AttrMode, ClassEntry, ResolutionState};
pub use member::{MemberData, MemberEntry, MemberKind};

use crate::{ClassId, MemberId, ProgramItem};

/// An attribute blob attached to a program item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedAttribute {
    /// The item the attribute was applied to.
    pub target: ProgramItem,
    /// The resolved attribute class.
    pub attribute_class: ClassId,
    /// The constructor chosen by overload resolution.
    pub constructor: MemberId,
    /// Serialized constructor arguments.
    pub blob: Vec<u8>,
}
