//! Member entity.

use crate::{ClassId, ConstValue, DataType, MemberFlags, MemberId, Param, Signature, Span, Visibility};

use super::AttachedAttribute;

/// The four member categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Method,
    Property,
    Event,
}

impl MemberKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MemberKind::Field => "field",
            MemberKind::Method => "method",
            MemberKind::Property => "property",
            MemberKind::Event => "event",
        }
    }
}

/// Kind-specific payload of a member.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberData {
    Field {
        ty: DataType,
        /// Value of a literal field (enum members).
        constant: Option<ConstValue>,
    },
    Method {
        signature: Signature,
        /// Interface method this explicitly implements.
        implements: Option<MemberId>,
    },
    Property {
        ty: DataType,
        /// Indexer parameters; empty for an ordinary property.
        params: Vec<Param>,
        getter: Option<MemberId>,
        setter: Option<MemberId>,
    },
    Event {
        ty: DataType,
        add: Option<MemberId>,
        remove: Option<MemberId>,
    },
}

/// A field, method, property or event.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberEntry {
    /// Arena index, assigned by the class graph.
    pub id: MemberId,
    /// Member name. Explicit interface implementations use `Interface.Name`.
    pub name: String,
    pub owner: ClassId,
    pub visibility: Visibility,
    pub flags: MemberFlags,
    pub data: MemberData,
    /// Attributes applied to the member or its parameters.
    pub attributes: Vec<AttachedAttribute>,
    pub span: Span,
}

impl MemberEntry {
    fn new(name: impl Into<String>, owner: ClassId, data: MemberData) -> Self {
        Self {
            id: MemberId(0),
            name: name.into(),
            owner,
            visibility: Visibility::Private,
            flags: MemberFlags::empty(),
            data,
            attributes: Vec::new(),
            span: Span::default(),
        }
    }

    /// Create a field.
    pub fn field(name: impl Into<String>, owner: ClassId, ty: DataType) -> Self {
        Self::new(name, owner, MemberData::Field { ty, constant: None })
    }

    /// Create a method.
    pub fn method(name: impl Into<String>, owner: ClassId, signature: Signature) -> Self {
        Self::new(
            name,
            owner,
            MemberData::Method {
                signature,
                implements: None,
            },
        )
    }

    /// Create a property; accessors are linked afterwards.
    pub fn property(name: impl Into<String>, owner: ClassId, ty: DataType, params: Vec<Param>) -> Self {
        Self::new(
            name,
            owner,
            MemberData::Property {
                ty,
                params,
                getter: None,
                setter: None,
            },
        )
    }

    /// Create an event; accessors are linked afterwards.
    pub fn event(name: impl Into<String>, owner: ClassId, ty: DataType) -> Self {
        Self::new(
            name,
            owner,
            MemberData::Event {
                ty,
                add: None,
                remove: None,
            },
        )
    }

    // === Builder Methods ===

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_flags(mut self, flags: MemberFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Make a field a literal constant.
    pub fn with_constant(mut self, value: ConstValue) -> Self {
        if let MemberData::Field { constant, .. } = &mut self.data {
            *constant = Some(value);
        }
        self.flags |= MemberFlags::LITERAL | MemberFlags::STATIC;
        self
    }

    // === Query Methods ===

    pub fn kind(&self) -> MemberKind {
        match self.data {
            MemberData::Field { .. } => MemberKind::Field,
            MemberData::Method { .. } => MemberKind::Method,
            MemberData::Property { .. } => MemberKind::Property,
            MemberData::Event { .. } => MemberKind::Event,
        }
    }

    pub fn is_method(&self) -> bool {
        self.kind() == MemberKind::Method
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(MemberFlags::STATIC)
    }

    pub fn is_virtual(&self) -> bool {
        self.flags.contains(MemberFlags::VIRTUAL)
    }

    pub fn is_new_slot(&self) -> bool {
        self.flags.contains(MemberFlags::NEW_SLOT)
    }

    pub fn is_synthetic(&self) -> bool {
        self.flags.contains(MemberFlags::SYNTHETIC)
    }

    pub fn is_constructor(&self) -> bool {
        self.is_method() && self.name == ".ctor"
    }

    pub fn is_static_constructor(&self) -> bool {
        self.is_method() && self.name == ".cctor"
    }

    /// Special-name method whose name starts with `op_`.
    pub fn is_operator(&self) -> bool {
        self.is_method() && self.flags.contains(MemberFlags::SPECIAL_NAME) && self.name.starts_with("op_")
    }

    /// Property that takes parameters.
    pub fn is_indexer(&self) -> bool {
        matches!(&self.data, MemberData::Property { params, .. } if !params.is_empty())
    }

    /// Parameters that take part in signature identity.
    ///
    /// Fields and events have none.
    pub fn params(&self) -> &[Param] {
        match &self.data {
            MemberData::Method { signature, .. } => &signature.params,
            MemberData::Property { params, .. } => params,
            MemberData::Field { .. } | MemberData::Event { .. } => &[],
        }
    }

    /// Declared type: field/property/event type or method return type.
    pub fn data_type(&self) -> &DataType {
        match &self.data {
            MemberData::Field { ty, .. } => ty,
            MemberData::Method { signature, .. } => &signature.return_type,
            MemberData::Property { ty, .. } => ty,
            MemberData::Event { ty, .. } => ty,
        }
    }

    pub fn signature(&self) -> Option<&Signature> {
        match &self.data {
            MemberData::Method { signature, .. } => Some(signature),
            _ => None,
        }
    }

    /// Whether parameter types match another member's exactly.
    pub fn params_identical(&self, other: &MemberEntry) -> bool {
        let (a, b) = (self.params(), other.params());
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.ty == y.ty)
    }

    /// Getter then setter, or add then remove.
    pub fn accessors(&self) -> [Option<MemberId>; 2] {
        match &self.data {
            MemberData::Property { getter, setter, .. } => [*getter, *setter],
            MemberData::Event { add, remove, .. } => [*add, *remove],
            _ => [None, None],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PrimitiveType;

    fn int() -> DataType {
        DataType::Primitive(PrimitiveType::Int32)
    }

    #[test]
    fn kinds() {
        let owner = ClassId(0);
        assert_eq!(MemberEntry::field("f", owner, int()).kind(), MemberKind::Field);
        assert_eq!(MemberEntry::method("m", owner, Signature::void()).kind(), MemberKind::Method);
        assert_eq!(MemberEntry::property("p", owner, int(), vec![]).kind(), MemberKind::Property);
        assert_eq!(MemberEntry::event("e", owner, int()).kind(), MemberKind::Event);
    }

    #[test]
    fn constructor_names() {
        let ctor = MemberEntry::method(".ctor", ClassId(0), Signature::void());
        assert!(ctor.is_constructor());
        assert!(!ctor.is_static_constructor());
        let cctor = MemberEntry::method(".cctor", ClassId(0), Signature::void());
        assert!(cctor.is_static_constructor());
    }

    #[test]
    fn operators_need_special_name() {
        let plain = MemberEntry::method("op_Addition", ClassId(0), Signature::void());
        assert!(!plain.is_operator());
        let op = plain.with_flags(MemberFlags::SPECIAL_NAME | MemberFlags::STATIC);
        assert!(op.is_operator());
    }

    #[test]
    fn indexers_have_params() {
        let owner = ClassId(0);
        assert!(!MemberEntry::property("Count", owner, int(), vec![]).is_indexer());
        assert!(MemberEntry::property("Item", owner, int(), vec![Param::new("i", int())]).is_indexer());
    }

    #[test]
    fn literal_fields_are_static() {
        let f = MemberEntry::field("Red", ClassId(0), int()).with_constant(ConstValue::Int32(0));
        assert!(f.is_static());
        assert!(f.flags.contains(MemberFlags::LITERAL));
    }

    #[test]
    fn params_identity_ignores_kind() {
        let owner = ClassId(0);
        let m = MemberEntry::method("M", owner, Signature::new(int(), vec![Param::new("a", int())]));
        let p = MemberEntry::property("M", owner, int(), vec![Param::new("b", int())]);
        assert!(m.params_identical(&p));
        let f = MemberEntry::field("M", owner, int());
        assert!(!m.params_identical(&f));
    }
}
