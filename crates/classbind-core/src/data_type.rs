//! Declared types of members, parameters and constant values.
//!
//! A [`DataType`] names classes by [`TypeHash`], so a type annotation can be
//! formed and compared without access to the class graph. Two signatures are
//! identical exactly when their parameter `DataType`s are equal.

use crate::TypeHash;

/// Built-in value types with a dedicated keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Bool,
    Char,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    NativeInt,
    NativeUInt,
}

impl PrimitiveType {
    /// The source keyword for this type.
    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveType::Bool => "bool",
            PrimitiveType::Char => "char",
            PrimitiveType::Int8 => "sbyte",
            PrimitiveType::UInt8 => "byte",
            PrimitiveType::Int16 => "short",
            PrimitiveType::UInt16 => "ushort",
            PrimitiveType::Int32 => "int",
            PrimitiveType::UInt32 => "uint",
            PrimitiveType::Int64 => "long",
            PrimitiveType::UInt64 => "ulong",
            PrimitiveType::Float32 => "float",
            PrimitiveType::Float64 => "double",
            PrimitiveType::NativeInt => "native int",
            PrimitiveType::NativeUInt => "native uint",
        }
    }

    /// Look a primitive up by its source keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "bool" => PrimitiveType::Bool,
            "char" => PrimitiveType::Char,
            "sbyte" => PrimitiveType::Int8,
            "byte" => PrimitiveType::UInt8,
            "short" => PrimitiveType::Int16,
            "ushort" => PrimitiveType::UInt16,
            "int" => PrimitiveType::Int32,
            "uint" => PrimitiveType::UInt32,
            "long" => PrimitiveType::Int64,
            "ulong" => PrimitiveType::UInt64,
            "float" => PrimitiveType::Float32,
            "double" => PrimitiveType::Float64,
            _ => return None,
        })
    }

    pub fn is_integral(self) -> bool {
        !matches!(
            self,
            PrimitiveType::Bool | PrimitiveType::Float32 | PrimitiveType::Float64
        )
    }

    pub fn is_floating(self) -> bool {
        matches!(self, PrimitiveType::Float32 | PrimitiveType::Float64)
    }

    /// Inclusive value range of an integral type, `None` otherwise.
    pub fn integral_range(self) -> Option<(i128, i128)> {
        Some(match self {
            PrimitiveType::Char => (0, u16::MAX as i128),
            PrimitiveType::Int8 => (i8::MIN as i128, i8::MAX as i128),
            PrimitiveType::UInt8 => (0, u8::MAX as i128),
            PrimitiveType::Int16 => (i16::MIN as i128, i16::MAX as i128),
            PrimitiveType::UInt16 => (0, u16::MAX as i128),
            PrimitiveType::Int32 | PrimitiveType::NativeInt => (i32::MIN as i128, i32::MAX as i128),
            PrimitiveType::UInt32 | PrimitiveType::NativeUInt => (0, u32::MAX as i128),
            PrimitiveType::Int64 => (i64::MIN as i128, i64::MAX as i128),
            PrimitiveType::UInt64 => (0, u64::MAX as i128),
            _ => return None,
        })
    }

    /// Hash identity of this primitive.
    pub fn type_hash(self) -> TypeHash {
        TypeHash::from_name(self.keyword())
    }
}

/// The declared type of a member, parameter or value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    /// No value (method return type only).
    Void,
    /// A keyword value type.
    Primitive(PrimitiveType),
    /// A class, struct, interface, enum or delegate, by qualified-name hash.
    Class(TypeHash),
    /// A single-dimension zero-based array.
    Array(Box<DataType>),
    /// A managed by-reference type (`ref`/`out` parameters).
    ByRef(Box<DataType>),
    /// The type of the `null` literal.
    Null,
    /// Placeholder for a type that failed to resolve.
    Error,
}

impl DataType {
    pub fn class(hash: TypeHash) -> Self {
        DataType::Class(hash)
    }

    pub fn array_of(element: DataType) -> Self {
        DataType::Array(Box::new(element))
    }

    pub fn by_ref(inner: DataType) -> Self {
        DataType::ByRef(Box::new(inner))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, DataType::Void)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, DataType::Error)
    }

    pub fn is_by_ref(&self) -> bool {
        matches!(self, DataType::ByRef(_))
    }

    /// The class hash, if this is a named class type.
    pub fn class_hash(&self) -> Option<TypeHash> {
        match self {
            DataType::Class(hash) => Some(*hash),
            _ => None,
        }
    }

    /// The element type, if this is an array.
    pub fn element(&self) -> Option<&DataType> {
        match self {
            DataType::Array(element) => Some(element),
            _ => None,
        }
    }

    /// Strip a by-reference wrapper.
    pub fn dereferenced(&self) -> &DataType {
        match self {
            DataType::ByRef(inner) => inner,
            other => other,
        }
    }

    /// Structural hash identity.
    pub fn type_hash(&self) -> TypeHash {
        match self {
            DataType::Void => TypeHash::from_name("void"),
            DataType::Primitive(p) => p.type_hash(),
            DataType::Class(hash) => *hash,
            DataType::Array(element) => TypeHash::array_of(element.type_hash()),
            DataType::ByRef(inner) => TypeHash::by_ref(inner.type_hash()),
            DataType::Null => TypeHash::from_name("null"),
            DataType::Error => TypeHash::EMPTY,
        }
    }
}

impl From<PrimitiveType> for DataType {
    fn from(p: PrimitiveType) -> Self {
        DataType::Primitive(p)
    }
}

/// How an argument is passed to a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParamModifier {
    #[default]
    None,
    Ref,
    Out,
    /// Trailing parameter array.
    Params,
}

/// A formal parameter of a method, property or event accessor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Param {
    pub name: String,
    /// Declared type; `ref`/`out` parameters are stored as [`DataType::ByRef`].
    pub ty: DataType,
    pub modifier: ParamModifier,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: DataType) -> Self {
        Self {
            name: name.into(),
            ty,
            modifier: ParamModifier::None,
        }
    }

    pub fn with_modifier(mut self, modifier: ParamModifier) -> Self {
        self.modifier = modifier;
        self
    }
}

/// Return type plus ordered parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub return_type: DataType,
    pub params: Vec<Param>,
    /// Declared with a trailing `__arglist`.
    pub vararg: bool,
}

impl Signature {
    pub fn new(return_type: DataType, params: Vec<Param>) -> Self {
        Self {
            return_type,
            params,
            vararg: false,
        }
    }

    /// A `void` signature with no parameters.
    pub fn void() -> Self {
        Self::new(DataType::Void, Vec::new())
    }

    /// Parameter types in order.
    pub fn param_types(&self) -> impl Iterator<Item = &DataType> {
        self.params.iter().map(|p| &p.ty)
    }

    /// Whether both signatures take identical parameter types.
    ///
    /// Return types are not compared.
    pub fn params_identical(&self, other: &Signature) -> bool {
        self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(&other.params)
                .all(|(a, b)| a.ty == b.ty)
    }

    /// Hash of the parameter type list.
    pub fn params_hash(&self) -> TypeHash {
        let hashes: Vec<TypeHash> = self.param_types().map(DataType::type_hash).collect();
        TypeHash::from_params(&hashes)
    }

    /// Whether the last parameter is a `params` array.
    pub fn has_param_array(&self) -> bool {
        self.params
            .last()
            .is_some_and(|p| p.modifier == ParamModifier::Params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int() -> DataType {
        DataType::Primitive(PrimitiveType::Int32)
    }

    #[test]
    fn keyword_round_trip() {
        for p in [
            PrimitiveType::Bool,
            PrimitiveType::Int32,
            PrimitiveType::UInt64,
            PrimitiveType::Float64,
        ] {
            assert_eq!(PrimitiveType::from_keyword(p.keyword()), Some(p));
        }
        assert_eq!(PrimitiveType::from_keyword("string"), None);
    }

    #[test]
    fn ref_and_out_are_identical_signatures() {
        let a = Signature::new(
            DataType::Void,
            vec![Param::new("x", DataType::by_ref(int())).with_modifier(ParamModifier::Ref)],
        );
        let b = Signature::new(
            DataType::Void,
            vec![Param::new("y", DataType::by_ref(int())).with_modifier(ParamModifier::Out)],
        );
        assert!(a.params_identical(&b));
    }

    #[test]
    fn by_value_differs_from_by_ref() {
        let a = Signature::new(DataType::Void, vec![Param::new("x", int())]);
        let b = Signature::new(DataType::Void, vec![Param::new("x", DataType::by_ref(int()))]);
        assert!(!a.params_identical(&b));
        assert_ne!(a.params_hash(), b.params_hash());
    }

    #[test]
    fn return_type_is_not_part_of_identity() {
        let a = Signature::new(int(), vec![]);
        let b = Signature::void();
        assert!(a.params_identical(&b));
    }

    #[test]
    fn integral_ranges() {
        assert_eq!(PrimitiveType::Int8.integral_range(), Some((-128, 127)));
        assert_eq!(PrimitiveType::Float32.integral_range(), None);
        assert!(PrimitiveType::Char.is_integral());
        assert!(!PrimitiveType::Bool.is_integral());
    }

    #[test]
    fn param_array_detection() {
        let sig = Signature::new(
            DataType::Void,
            vec![
                Param::new("a", int()),
                Param::new("rest", DataType::array_of(int())).with_modifier(ParamModifier::Params),
            ],
        );
        assert!(sig.has_param_array());
        assert!(!Signature::void().has_param_array());
    }
}
