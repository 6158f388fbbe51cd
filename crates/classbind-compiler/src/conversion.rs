//! Implicit conversions between argument and parameter types.
//!
//! Overload resolution and attribute argument coercion both ask the same
//! question: can a value of type `S` be passed where `T` is expected, and how
//! good a match is that? A [`Conversion`] answers with a kind and a cost.
//!
//! ## Conversion Priority
//!
//! Conversions are checked in this order:
//! 1. Identity (exact match)
//! 2. `null` to a reference type
//! 3. Numeric widening, then integer to floating point
//! 4. Constant narrowing (an in-range integer constant, or `0` to an enum)
//! 5. Reference conversions (derived to base, class to interface, arrays)
//! 6. Boxing (value type to `object`, `System.ValueType` or an interface)

use classbind_core::{ClassKind, ConstValue, DataType, PrimitiveType};

use crate::collaborators::Argument;
use crate::context::{CompilationContext, WellKnown};

/// An implicit conversion with its cost for overload ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
    pub kind: ConversionKind,
    /// Lower is better.
    pub cost: u32,
}

/// The kind of conversion performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionKind {
    /// No conversion needed.
    Identity,
    /// The `null` literal to a class, array or string.
    NullLiteral,
    /// A primitive to a wider primitive of the same family.
    NumericWidening,
    /// An integral primitive to `float` or `double`.
    IntToFloat,
    /// An integer constant that fits the smaller target type.
    ConstantNarrowing,
    /// The constant `0` to an enum type.
    ZeroToEnum,
    /// A class to one of its bases or implemented interfaces.
    ReferenceToBase,
    /// An array of references to an array of a base type.
    ArrayCovariance,
    /// A value type to `object`, `System.ValueType` or an interface.
    Boxing,
}

impl Conversion {
    // Lower cost = better match. Ordering mirrors the priority list above.
    pub const COST_IDENTITY: u32 = 0;
    pub const COST_NULL: u32 = 1;
    pub const COST_WIDENING: u32 = 4;
    pub const COST_CONSTANT_NARROWING: u32 = 5;
    pub const COST_INT_TO_FLOAT: u32 = 8;
    pub const COST_REFERENCE: u32 = 10;
    pub const COST_BOXING: u32 = 12;

    fn new(kind: ConversionKind, cost: u32) -> Self {
        Self { kind, cost }
    }

    pub fn identity() -> Self {
        Self::new(ConversionKind::Identity, Self::COST_IDENTITY)
    }

    pub fn is_exact(&self) -> bool {
        self.kind == ConversionKind::Identity
    }
}

/// Find an implicit conversion for an argument, using its constant value
/// when it has one.
pub fn find_implicit_conversion(
    ctx: &CompilationContext,
    arg: &Argument,
    target: &DataType,
) -> Option<Conversion> {
    if let Some(conv) = find_type_conversion(ctx, &arg.ty, target) {
        return Some(conv);
    }
    let value = arg.constant.as_ref()?;
    find_constant_conversion(ctx, value, target)
}

/// Find an implicit conversion between two types, ignoring values.
pub fn find_type_conversion(
    ctx: &CompilationContext,
    source: &DataType,
    target: &DataType,
) -> Option<Conversion> {
    if source == target || source.is_error() || target.is_error() {
        return Some(Conversion::identity());
    }

    match (source, target) {
        // By-reference arguments must match exactly.
        (DataType::ByRef(_), _) | (_, DataType::ByRef(_)) => None,
        (DataType::Null, _) => is_reference_type(ctx, target)
            .then(|| Conversion::new(ConversionKind::NullLiteral, Conversion::COST_NULL)),
        (DataType::Primitive(from), DataType::Primitive(to)) => {
            find_primitive_conversion(*from, *to)
        }
        (DataType::Primitive(_), DataType::Class(_)) => boxing_target(ctx, target)
            .then(|| Conversion::new(ConversionKind::Boxing, Conversion::COST_BOXING)),
        (DataType::Class(_), DataType::Class(_)) => find_class_conversion(ctx, source, target),
        (DataType::Array(from), DataType::Array(to)) => {
            let covariant = is_reference_type(ctx, from)
                && find_type_conversion(ctx, from, to)
                    .is_some_and(|c| matches!(c.kind, ConversionKind::ReferenceToBase | ConversionKind::ArrayCovariance));
            covariant.then(|| Conversion::new(ConversionKind::ArrayCovariance, Conversion::COST_REFERENCE))
        }
        (DataType::Array(_), DataType::Class(_)) => (ctx.graph.class_of(target)
            == ctx.well_known(WellKnown::Object))
        .then(|| Conversion::new(ConversionKind::ReferenceToBase, Conversion::COST_REFERENCE)),
        _ => None,
    }
}

/// Implicit numeric conversions between keyword types.
pub fn find_primitive_conversion(from: PrimitiveType, to: PrimitiveType) -> Option<Conversion> {
    use PrimitiveType::*;

    if from == to {
        return Some(Conversion::identity());
    }
    if from == Bool || to == Bool || to == Char {
        return None;
    }
    if to.is_floating() {
        return match from {
            Float32 if to == Float64 => Some(Conversion::new(
                ConversionKind::NumericWidening,
                Conversion::COST_WIDENING,
            )),
            Float32 | Float64 => None,
            _ => Some(Conversion::new(
                ConversionKind::IntToFloat,
                Conversion::COST_INT_TO_FLOAT,
            )),
        };
    }

    let widens = match from {
        Int8 => matches!(to, Int16 | Int32 | Int64 | NativeInt),
        UInt8 => matches!(
            to,
            Int16 | UInt16 | Int32 | UInt32 | Int64 | UInt64 | NativeInt | NativeUInt
        ),
        Int16 => matches!(to, Int32 | Int64 | NativeInt),
        UInt16 | Char => matches!(to, Int32 | UInt32 | Int64 | UInt64 | NativeInt | NativeUInt)
            || (from == Char && to == UInt16),
        Int32 => matches!(to, Int64 | NativeInt),
        UInt32 => matches!(to, Int64 | UInt64 | NativeUInt),
        _ => false,
    };
    widens.then(|| Conversion::new(ConversionKind::NumericWidening, Conversion::COST_WIDENING))
}

/// Conversions that depend on a constant's value.
fn find_constant_conversion(
    ctx: &CompilationContext,
    value: &ConstValue,
    target: &DataType,
) -> Option<Conversion> {
    let n = value.as_integer()?;
    if matches!(value, ConstValue::Char(_)) {
        return None;
    }
    match target {
        DataType::Primitive(p) if p.is_integral() && *p != PrimitiveType::Char => {
            let (lo, hi) = p.integral_range()?;
            (lo..=hi).contains(&n).then(|| {
                Conversion::new(
                    ConversionKind::ConstantNarrowing,
                    Conversion::COST_CONSTANT_NARROWING,
                )
            })
        }
        DataType::Class(_) if n == 0 => ctx
            .graph
            .class_of(target)
            .is_some_and(|id| ctx.graph.class(id).kind == ClassKind::Enum)
            .then(|| Conversion::new(ConversionKind::ZeroToEnum, Conversion::COST_CONSTANT_NARROWING)),
        _ => None,
    }
}

fn find_class_conversion(
    ctx: &CompilationContext,
    source: &DataType,
    target: &DataType,
) -> Option<Conversion> {
    let from = ctx.graph.class_of(source)?;
    let to = ctx.graph.class_of(target)?;
    if !ctx.graph.is_base_type_for(to, from) {
        return None;
    }
    if ctx.graph.class(from).is_value_type() {
        Some(Conversion::new(ConversionKind::Boxing, Conversion::COST_BOXING))
    } else {
        Some(Conversion::new(ConversionKind::ReferenceToBase, Conversion::COST_REFERENCE))
    }
}

/// Whether a primitive can be boxed to `target`.
fn boxing_target(ctx: &CompilationContext, target: &DataType) -> bool {
    let target = ctx.graph.class_of(target);
    target.is_some()
        && (target == ctx.well_known(WellKnown::Object)
            || target == ctx.well_known(WellKnown::ValueType))
}

/// Whether `null` converts to `ty`.
pub fn is_reference_type(ctx: &CompilationContext, ty: &DataType) -> bool {
    match ty {
        DataType::Array(_) | DataType::Null => true,
        DataType::Class(_) => match ctx.graph.class_of(ty) {
            Some(id) => !ctx.graph.class(id).is_value_type(),
            None => true,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corlib;
    use classbind_core::{ClassEntry, TypeHash};

    fn make_test_context() -> CompilationContext {
        let mut ctx = CompilationContext::default();
        corlib::install(&mut ctx).unwrap();
        ctx
    }

    fn prim(p: PrimitiveType) -> DataType {
        DataType::Primitive(p)
    }

    #[test]
    fn numeric_widening() {
        use PrimitiveType::*;
        assert!(find_primitive_conversion(Int32, Int64).is_some());
        assert!(find_primitive_conversion(UInt8, UInt32).is_some());
        assert!(find_primitive_conversion(Char, UInt16).is_some());
        assert!(find_primitive_conversion(Int64, Int32).is_none());
        assert!(find_primitive_conversion(Int32, UInt32).is_none());
        assert!(find_primitive_conversion(Int32, Char).is_none());
        assert!(find_primitive_conversion(Bool, Int32).is_none());
    }

    #[test]
    fn int_to_float_costs_more_than_widening() {
        use PrimitiveType::*;
        let widen = find_primitive_conversion(Int32, Int64).unwrap();
        let to_float = find_primitive_conversion(Int32, Float64).unwrap();
        assert!(widen.cost < to_float.cost);
        assert!(find_primitive_conversion(Float64, Float32).is_none());
    }

    #[test]
    fn constant_narrowing_checks_range() {
        let ctx = make_test_context();
        let small = Argument {
            ty: prim(PrimitiveType::Int32),
            constant: Some(ConstValue::Int32(200)),
        };
        let byte = prim(PrimitiveType::UInt8);
        let sbyte = prim(PrimitiveType::Int8);
        assert_eq!(
            find_implicit_conversion(&ctx, &small, &byte).map(|c| c.kind),
            Some(ConversionKind::ConstantNarrowing)
        );
        assert!(find_implicit_conversion(&ctx, &small, &sbyte).is_none());
        assert!(find_type_conversion(&ctx, &small.ty, &byte).is_none());
    }

    #[test]
    fn null_converts_to_references_only() {
        let ctx = make_test_context();
        let string = ctx.well_known_type(WellKnown::String);
        assert!(find_type_conversion(&ctx, &DataType::Null, &string).is_some());
        assert!(find_type_conversion(&ctx, &DataType::Null, &prim(PrimitiveType::Int32)).is_none());
    }

    #[test]
    fn class_to_base_and_boxing() {
        let mut ctx = make_test_context();
        let object = ctx.well_known(WellKnown::Object).unwrap();
        let value_type = ctx.well_known(WellKnown::ValueType).unwrap();
        let base = ctx
            .graph
            .add_class(ClassEntry::new("Base", "", ClassKind::Class).with_parent(object));
        let derived = ctx
            .graph
            .add_class(ClassEntry::new("Derived", "", ClassKind::Class).with_parent(base));
        let point = ctx
            .graph
            .add_class(ClassEntry::new("Point", "", ClassKind::Struct).with_parent(value_type));

        let ty = |id| DataType::Class(ctx.graph.class(id).type_hash);
        assert_eq!(
            find_type_conversion(&ctx, &ty(derived), &ty(base)).map(|c| c.kind),
            Some(ConversionKind::ReferenceToBase)
        );
        assert!(find_type_conversion(&ctx, &ty(base), &ty(derived)).is_none());
        assert_eq!(
            find_type_conversion(&ctx, &ty(point), &ty(object)).map(|c| c.kind),
            Some(ConversionKind::Boxing)
        );
        assert_eq!(
            find_type_conversion(&ctx, &prim(PrimitiveType::Int32), &ty(object)).map(|c| c.kind),
            Some(ConversionKind::Boxing)
        );
    }

    #[test]
    fn by_ref_requires_identity() {
        let ctx = make_test_context();
        let int_ref = DataType::by_ref(prim(PrimitiveType::Int32));
        let long_ref = DataType::by_ref(prim(PrimitiveType::Int64));
        assert!(find_type_conversion(&ctx, &int_ref, &int_ref).is_some());
        assert!(find_type_conversion(&ctx, &int_ref, &long_ref).is_none());
        assert!(find_type_conversion(&ctx, &prim(PrimitiveType::Int32), &int_ref).is_none());
    }

    #[test]
    fn unknown_classes_are_references() {
        let ctx = make_test_context();
        let unknown = DataType::Class(TypeHash::from_name("Nowhere.Thing"));
        assert!(is_reference_type(&ctx, &unknown));
    }
}
