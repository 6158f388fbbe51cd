//! Compile-time constant values.

use std::fmt;

use ordered_float::OrderedFloat;

/// A constant produced by the constant evaluator.
///
/// Floats use [`OrderedFloat`] so values can be compared and hashed, which the
/// attribute codec relies on when checking that a blob reads back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConstValue {
    /// The `null` literal.
    Null,
    Bool(bool),
    Char(u16),
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float32(OrderedFloat<f32>),
    Float64(OrderedFloat<f64>),
    String(String),
    /// A `typeof(T)` operand, by fully qualified type name.
    Type(String),
    /// Elements of a single-dimension array.
    Array(Vec<ConstValue>),
}

impl ConstValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ConstValue::Null)
    }

    /// The value as a wide integer, for any integral variant.
    pub fn as_integer(&self) -> Option<i128> {
        Some(match *self {
            ConstValue::Char(v) => v as i128,
            ConstValue::Int8(v) => v as i128,
            ConstValue::UInt8(v) => v as i128,
            ConstValue::Int16(v) => v as i128,
            ConstValue::UInt16(v) => v as i128,
            ConstValue::Int32(v) => v as i128,
            ConstValue::UInt32(v) => v as i128,
            ConstValue::Int64(v) => v as i128,
            ConstValue::UInt64(v) => v as i128,
            _ => return None,
        })
    }

    /// The value as a double, for any numeric variant.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConstValue::Float32(v) => Some(v.0 as f64),
            ConstValue::Float64(v) => Some(v.0),
            other => other.as_integer().map(|i| i as f64),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Null => write!(f, "null"),
            ConstValue::Bool(v) => write!(f, "{v}"),
            ConstValue::Char(v) => match char::from_u32(*v as u32) {
                Some(c) => write!(f, "'{c}'"),
                None => write!(f, "'\\u{v:04x}'"),
            },
            ConstValue::Int8(v) => write!(f, "{v}"),
            ConstValue::UInt8(v) => write!(f, "{v}"),
            ConstValue::Int16(v) => write!(f, "{v}"),
            ConstValue::UInt16(v) => write!(f, "{v}"),
            ConstValue::Int32(v) => write!(f, "{v}"),
            ConstValue::UInt32(v) => write!(f, "{v}"),
            ConstValue::Int64(v) => write!(f, "{v}"),
            ConstValue::UInt64(v) => write!(f, "{v}"),
            ConstValue::Float32(v) => write!(f, "{}", v.0),
            ConstValue::Float64(v) => write!(f, "{}", v.0),
            ConstValue::String(s) => write!(f, "{s:?}"),
            ConstValue::Type(name) => write!(f, "typeof({name})"),
            ConstValue::Array(items) => {
                write!(f, "{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_views() {
        assert_eq!(ConstValue::Int32(-5).as_integer(), Some(-5));
        assert_eq!(ConstValue::UInt64(u64::MAX).as_integer(), Some(u64::MAX as i128));
        assert_eq!(ConstValue::Bool(true).as_integer(), None);
        assert_eq!(ConstValue::Int16(3).as_f64(), Some(3.0));
    }

    #[test]
    fn nan_compares_equal_to_itself() {
        let a = ConstValue::Float64(OrderedFloat(f64::NAN));
        assert_eq!(a.clone(), a);
    }

    #[test]
    fn display_forms() {
        let arr = ConstValue::Array(vec![ConstValue::Int32(1), ConstValue::String("x".into())]);
        assert_eq!(arr.to_string(), "{1, \"x\"}");
        assert_eq!(ConstValue::Type("System.Int32".into()).to_string(), "typeof(System.Int32)");
        assert_eq!(ConstValue::Char('a' as u16).to_string(), "'a'");
    }
}
