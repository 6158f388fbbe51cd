//! Attribute binding.
//!
//! - [`targets`]: project a declaration through a section's target keyword
//! - [`binder`]: resolve attribute classes and constructors, coerce the
//!   arguments and attach the serialized result; the [`AttributePass`]
//!   drives it over every recorded site
//! - [`blob`]: the custom attribute blob codec

pub mod binder;
pub mod blob;
pub mod targets;

use classbind_ast::AttributeSection;
use classbind_core::{ClassId, MemberId};

use crate::context::ResolutionContext;

pub use binder::{AttributeOutput, AttributePass, Binding, apply_attributes, bind_attribute, resolve_attribute_class};
pub use targets::{TargetError, project};

/// The declaration an attribute section was written on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declaration {
    /// A compilation unit; sections target the assembly or module.
    Unit,
    /// A type. Delegates carry their `Invoke` method for `return:` sections.
    Type {
        class: ClassId,
        invoke: Option<MemberId>,
    },
    Method(MemberId),
    /// A field or enum member.
    Field(MemberId),
    Property(MemberId),
    /// An event and, when field-like, its backing field.
    Event {
        event: MemberId,
        backing: Option<MemberId>,
    },
    /// A synthesized accessor. `value` is the index of its `value`
    /// parameter, if it has one.
    Accessor {
        method: MemberId,
        value: Option<u16>,
    },
    /// A formal parameter; index 1 is the first parameter.
    Parameter { method: MemberId, index: u16 },
}

/// Attribute sections waiting to be bound, with the context their names
/// resolve in.
#[derive(Debug, Clone, Copy)]
pub struct AttributeSite<'ast> {
    pub sections: &'ast [AttributeSection],
    pub declaration: Declaration,
    pub res: ResolutionContext,
    pub file: &'ast str,
}
