//! Attribute target kinds.

use bitflags::bitflags;

bitflags! {
    /// Declaration kinds an attribute may be applied to.
    ///
    /// The bit values match `System.AttributeTargets`, so the valid-on mask
    /// read from an attribute-usage argument can be used directly.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AttributeTargets: u32 {
        const ASSEMBLY     = 0x0001;
        const MODULE       = 0x0002;
        const CLASS        = 0x0004;
        const STRUCT       = 0x0008;
        const ENUM         = 0x0010;
        const CONSTRUCTOR  = 0x0020;
        const METHOD       = 0x0040;
        const PROPERTY     = 0x0080;
        const FIELD        = 0x0100;
        const EVENT        = 0x0200;
        const INTERFACE    = 0x0400;
        const PARAMETER    = 0x0800;
        const DELEGATE     = 0x1000;
        const RETURN_VALUE = 0x2000;
    }
}

impl AttributeTargets {
    /// Every declaration kind.
    pub const ANY: AttributeTargets = AttributeTargets::all();

    /// Target kinds that represent a type declaration.
    pub const TYPES: AttributeTargets = AttributeTargets::CLASS
        .union(AttributeTargets::STRUCT)
        .union(AttributeTargets::ENUM)
        .union(AttributeTargets::INTERFACE)
        .union(AttributeTargets::DELEGATE);
}
