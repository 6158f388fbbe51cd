//! Visibility, kind and flag sets for classes and members.

use bitflags::bitflags;

/// Declared accessibility of a class or member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Private,
    Protected,
    Internal,
    ProtectedInternal,
    Public,
}

impl Visibility {
    pub fn keyword(self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Protected => "protected",
            Visibility::Internal => "internal",
            Visibility::ProtectedInternal => "protected internal",
            Visibility::Public => "public",
        }
    }
}

/// Syntactic category of a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClassKind {
    #[default]
    Class,
    Struct,
    Interface,
    Enum,
    Delegate,
}

impl ClassKind {
    pub fn is_value_type(self) -> bool {
        matches!(self, ClassKind::Struct | ClassKind::Enum)
    }
}

bitflags! {
    /// Class-level modifiers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ClassFlags: u32 {
        const ABSTRACT = 1 << 0;
        const SEALED   = 1 << 1;
        const STATIC   = 1 << 2;
        /// Loaded from a referenced unit rather than declared in source.
        const IMPORTED = 1 << 3;
    }
}

bitflags! {
    /// Member-level metadata flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MemberFlags: u32 {
        const STATIC        = 1 << 0;
        const VIRTUAL       = 1 << 1;
        /// Introduces a new vtable slot. A virtual method without it overrides.
        const NEW_SLOT      = 1 << 2;
        const ABSTRACT      = 1 << 3;
        const FINAL         = 1 << 4;
        const SPECIAL_NAME  = 1 << 5;
        const RT_SPECIAL_NAME = 1 << 6;
        /// Body supplied by the runtime (delegate support methods).
        const RUNTIME       = 1 << 7;
        /// Compile-time constant field.
        const LITERAL       = 1 << 8;
        const INIT_ONLY     = 1 << 9;
        const VOLATILE      = 1 << 10;
        /// Compiler-generated; never returned by name lookup.
        const SYNTHETIC     = 1 << 11;
        const VARARG        = 1 << 12;
    }
}

impl MemberFlags {
    /// Virtual but not introducing a slot, i.e. an override.
    #[inline]
    pub fn is_override(self) -> bool {
        self.contains(MemberFlags::VIRTUAL) && !self.contains(MemberFlags::NEW_SLOT)
    }
}
