//! Arena indices for entities owned by the class graph.

use std::fmt;

/// Index of a [`ClassEntry`](crate::ClassEntry) in the class graph.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub u32);

/// Index of a [`MemberEntry`](crate::MemberEntry) in the class graph.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberId(pub u32);

impl ClassId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl MemberId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class#{}", self.0)
    }
}

impl fmt::Debug for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "member#{}", self.0)
    }
}

/// A metadata item that attributes can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramItem {
    /// The assembly being compiled.
    Assembly,
    /// The module being compiled.
    Module,
    /// A class, struct, interface, enum or delegate.
    Class(ClassId),
    /// A field, method, property or event.
    Member(MemberId),
    /// A method parameter. Index 0 is the return value pseudo-parameter.
    Parameter { method: MemberId, index: u16 },
}
