//! Type gathering passes.
//!
//! - [`declare`]: Pass 1 - declare namespaces and type names into the scope tree
//! - [`gather`]: Pass 2 - resolve base types and build the class graph, bases first
//! - [`members`]: Pass 3 - create fields, methods, properties, events and enum members

pub mod declare;
pub mod gather;
pub mod members;

pub use declare::{DeclarationOutput, DeclarePass, DeclaredType, DeclaredUnit};
pub use gather::{GatherOutput, GatherPass};
pub use members::{MemberOutput, MemberPass};
