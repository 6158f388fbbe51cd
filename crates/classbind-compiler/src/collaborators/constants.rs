//! Constant expressions: literals, `typeof`, negation, casts, array
//! initializers and references to literal fields.

use classbind_ast::{Expr, Literal};
use classbind_core::{
    ClassId, ClassKind, CompilationError, ConstValue, DataType, MemberData, PrimitiveType, Span,
};
use ordered_float::OrderedFloat;

use super::{Argument, ConstantEvaluator, TypedConstant};
use crate::context::{CompilationContext, ResolutionContext, WellKnown};
use crate::conversion::{find_implicit_conversion, is_reference_type};
use crate::lookup::{SemanticValue, try_resolve_qualified_name};

/// Evaluates the constant-expression subset attribute arguments and enum
/// initializers are written in.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralEvaluator;

impl ConstantEvaluator for LiteralEvaluator {
    fn evaluate(
        &self,
        ctx: &CompilationContext,
        res: &ResolutionContext,
        expr: &Expr,
    ) -> Result<TypedConstant, CompilationError> {
        match expr {
            Expr::Literal(literal, _) => Ok(literal_constant(ctx, literal)),

            Expr::Name(name) => {
                let value = try_resolve_qualified_name(ctx, res, name)?;
                let SemanticValue::Field(field) = value else {
                    return Err(CompilationError::NotConstant { span: name.span });
                };
                match &ctx.graph.member(field).data {
                    MemberData::Field {
                        ty,
                        constant: Some(constant),
                    } => Ok(TypedConstant::new(constant.clone(), ty.clone())),
                    _ => Err(CompilationError::NotConstant { span: name.span }),
                }
            }

            Expr::Typeof(ty, _) => {
                let ty = ctx.resolve_type(res, ty)?;
                Ok(TypedConstant::new(
                    ConstValue::Type(serialized_type_name(ctx, &ty)),
                    ctx.well_known_type(WellKnown::Type),
                ))
            }

            Expr::Negate(inner, span) => {
                let value = self.evaluate(ctx, res, inner)?;
                negate(value, *span)
            }

            Expr::Cast(target, inner, span) => {
                let target = ctx.resolve_type(res, target)?;
                let value = self.evaluate(ctx, res, inner)?;
                if let Some(converted) = self.coerce(ctx, &value, &target) {
                    return Ok(TypedConstant::new(converted, target));
                }
                explicit_conversion(ctx, &value.value, &target)
                    .map(|converted| TypedConstant::new(converted, target.clone()))
                    .ok_or_else(|| CompilationError::CannotCoerce {
                        from: ctx.graph.type_name(&value.ty),
                        to: ctx.graph.type_name(&target),
                        span: *span,
                    })
            }

            Expr::ArrayInit {
                element,
                items,
                span,
            } => {
                let element = ctx.resolve_type(res, element)?;
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    let value = self.evaluate(ctx, res, item)?;
                    let converted = self.coerce(ctx, &value, &element).ok_or_else(|| {
                        CompilationError::CannotCoerce {
                            from: ctx.graph.type_name(&value.ty),
                            to: ctx.graph.type_name(&element),
                            span: *span,
                        }
                    })?;
                    values.push(converted);
                }
                Ok(TypedConstant::new(
                    ConstValue::Array(values),
                    DataType::array_of(element),
                ))
            }
        }
    }

    fn coerce(
        &self,
        ctx: &CompilationContext,
        value: &TypedConstant,
        target: &DataType,
    ) -> Option<ConstValue> {
        if value.ty == *target || target.is_error() {
            return Some(value.value.clone());
        }
        if value.value.is_null() {
            return is_reference_type(ctx, target).then_some(ConstValue::Null);
        }

        match target {
            DataType::Primitive(p) => {
                find_implicit_conversion(ctx, &Argument::constant(value.clone()), target)?;
                make_primitive(*p, &value.value)
            }
            DataType::Array(element) => {
                let ConstValue::Array(items) = &value.value else {
                    return None;
                };
                let source = value.ty.element()?;
                items
                    .iter()
                    .map(|item| {
                        self.coerce(ctx, &TypedConstant::new(item.clone(), source.clone()), element)
                    })
                    .collect::<Option<Vec<_>>>()
                    .map(ConstValue::Array)
            }
            DataType::Class(_) => {
                // Zero converts to any enum; everything else keeps its value
                // under a reference or boxing conversion.
                find_implicit_conversion(ctx, &Argument::constant(value.clone()), target)?;
                if enum_class(ctx, target).is_some() && value.value.as_integer() == Some(0) {
                    return Some(ConstValue::Int32(0));
                }
                Some(value.value.clone())
            }
            _ => None,
        }
    }
}

fn literal_constant(ctx: &CompilationContext, literal: &Literal) -> TypedConstant {
    let prim = |p| DataType::Primitive(p);
    match literal {
        Literal::Null => TypedConstant::new(ConstValue::Null, DataType::Null),
        Literal::Bool(v) => TypedConstant::new(ConstValue::Bool(*v), prim(PrimitiveType::Bool)),
        Literal::Char(v) => TypedConstant::new(ConstValue::Char(*v), prim(PrimitiveType::Char)),
        Literal::Int(v) => {
            let v = *v;
            if let Ok(n) = i32::try_from(v) {
                TypedConstant::new(ConstValue::Int32(n), prim(PrimitiveType::Int32))
            } else if let Ok(n) = u32::try_from(v) {
                TypedConstant::new(ConstValue::UInt32(n), prim(PrimitiveType::UInt32))
            } else if let Ok(n) = i64::try_from(v) {
                TypedConstant::new(ConstValue::Int64(n), prim(PrimitiveType::Int64))
            } else {
                TypedConstant::new(ConstValue::UInt64(v), prim(PrimitiveType::UInt64))
            }
        }
        Literal::Long(v) => TypedConstant::new(ConstValue::Int64(*v), prim(PrimitiveType::Int64)),
        Literal::UInt(v) => match u32::try_from(*v) {
            Ok(n) => TypedConstant::new(ConstValue::UInt32(n), prim(PrimitiveType::UInt32)),
            Err(_) => TypedConstant::new(ConstValue::UInt64(*v), prim(PrimitiveType::UInt64)),
        },
        Literal::Float(v) => {
            TypedConstant::new(ConstValue::Float32(OrderedFloat(*v)), prim(PrimitiveType::Float32))
        }
        Literal::Double(v) => {
            TypedConstant::new(ConstValue::Float64(OrderedFloat(*v)), prim(PrimitiveType::Float64))
        }
        Literal::String(s) => TypedConstant::new(
            ConstValue::String(s.clone()),
            ctx.well_known_type(WellKnown::String),
        ),
    }
}

/// Unary minus. Integers promote to `int`, or `long` when `int` is too small.
fn negate(value: TypedConstant, span: Span) -> Result<TypedConstant, CompilationError> {
    let prim = |p| DataType::Primitive(p);
    match value.value {
        ConstValue::Float32(v) => Ok(TypedConstant::new(
            ConstValue::Float32(OrderedFloat(-v.0)),
            prim(PrimitiveType::Float32),
        )),
        ConstValue::Float64(v) => Ok(TypedConstant::new(
            ConstValue::Float64(OrderedFloat(-v.0)),
            prim(PrimitiveType::Float64),
        )),
        ref other => {
            let n = other
                .as_integer()
                .ok_or(CompilationError::NotConstant { span })?;
            let negated = -n;
            if let Ok(v) = i32::try_from(negated) {
                Ok(TypedConstant::new(ConstValue::Int32(v), prim(PrimitiveType::Int32)))
            } else if let Ok(v) = i64::try_from(negated) {
                Ok(TypedConstant::new(ConstValue::Int64(v), prim(PrimitiveType::Int64)))
            } else {
                Err(CompilationError::NotConstant { span })
            }
        }
    }
}

/// Build a constant of primitive type `p` from a value known to fit.
fn make_primitive(p: PrimitiveType, value: &ConstValue) -> Option<ConstValue> {
    if let (PrimitiveType::Bool, ConstValue::Bool(v)) = (p, value) {
        return Some(ConstValue::Bool(*v));
    }
    if p.is_floating() {
        let v = value.as_f64()?;
        return Some(match p {
            PrimitiveType::Float32 => ConstValue::Float32(OrderedFloat(v as f32)),
            _ => ConstValue::Float64(OrderedFloat(v)),
        });
    }
    let n = value.as_integer()?;
    Some(match p {
        PrimitiveType::Char => ConstValue::Char(u16::try_from(n).ok()?),
        PrimitiveType::Int8 => ConstValue::Int8(i8::try_from(n).ok()?),
        PrimitiveType::UInt8 => ConstValue::UInt8(u8::try_from(n).ok()?),
        PrimitiveType::Int16 => ConstValue::Int16(i16::try_from(n).ok()?),
        PrimitiveType::UInt16 => ConstValue::UInt16(u16::try_from(n).ok()?),
        PrimitiveType::Int32 => ConstValue::Int32(i32::try_from(n).ok()?),
        PrimitiveType::UInt32 => ConstValue::UInt32(u32::try_from(n).ok()?),
        PrimitiveType::Int64 => ConstValue::Int64(i64::try_from(n).ok()?),
        PrimitiveType::UInt64 => ConstValue::UInt64(u64::try_from(n).ok()?),
        _ => return None,
    })
}

/// A cast that is allowed to truncate: numeric to numeric, integer to enum.
fn explicit_conversion(ctx: &CompilationContext, value: &ConstValue, target: &DataType) -> Option<ConstValue> {
    let integer = value
        .as_integer()
        .or_else(|| value.as_f64().map(|f| f.trunc() as i128));
    match target {
        DataType::Primitive(p) if p.is_floating() => make_primitive(*p, value),
        DataType::Primitive(p) => {
            let n = integer?;
            Some(match p {
                PrimitiveType::Char => ConstValue::Char(n as u16),
                PrimitiveType::Int8 => ConstValue::Int8(n as i8),
                PrimitiveType::UInt8 => ConstValue::UInt8(n as u8),
                PrimitiveType::Int16 => ConstValue::Int16(n as i16),
                PrimitiveType::UInt16 => ConstValue::UInt16(n as u16),
                PrimitiveType::Int32 => ConstValue::Int32(n as i32),
                PrimitiveType::UInt32 => ConstValue::UInt32(n as u32),
                PrimitiveType::Int64 => ConstValue::Int64(n as i64),
                PrimitiveType::UInt64 => ConstValue::UInt64(n as u64),
                _ => return None,
            })
        }
        DataType::Class(_) if enum_class(ctx, target).is_some() => {
            value.as_integer().map(|n| ConstValue::Int32(n as i32))
        }
        _ => None,
    }
}

fn enum_class(ctx: &CompilationContext, ty: &DataType) -> Option<ClassId> {
    ctx.graph
        .class_of(ty)
        .filter(|&id| ctx.graph.class(id).kind == ClassKind::Enum)
}

/// Name of a type as written into a `typeof` argument: namespace-qualified,
/// with `+` between a nested type and its outer type.
pub(crate) fn serialized_type_name(ctx: &CompilationContext, ty: &DataType) -> String {
    match ty {
        DataType::Void => "System.Void".to_string(),
        DataType::Primitive(p) => format!("System.{}", runtime_name(*p)),
        DataType::Array(element) => format!("{}[]", serialized_type_name(ctx, element)),
        DataType::ByRef(inner) => format!("{}&", serialized_type_name(ctx, inner)),
        DataType::Class(_) => match ctx.graph.class_of(ty) {
            Some(id) => class_type_name(ctx, id),
            None => ctx.graph.type_name(ty),
        },
        DataType::Null | DataType::Error => ctx.graph.type_name(ty),
    }
}

fn class_type_name(ctx: &CompilationContext, class: ClassId) -> String {
    let entry = ctx.graph.class(class);
    match entry.nesting_parent {
        Some(outer) => format!("{}+{}", class_type_name(ctx, outer), entry.name),
        None => entry.qualified_name.clone(),
    }
}

fn runtime_name(p: PrimitiveType) -> &'static str {
    match p {
        PrimitiveType::Bool => "Boolean",
        PrimitiveType::Char => "Char",
        PrimitiveType::Int8 => "SByte",
        PrimitiveType::UInt8 => "Byte",
        PrimitiveType::Int16 => "Int16",
        PrimitiveType::UInt16 => "UInt16",
        PrimitiveType::Int32 => "Int32",
        PrimitiveType::UInt32 => "UInt32",
        PrimitiveType::Int64 => "Int64",
        PrimitiveType::UInt64 => "UInt64",
        PrimitiveType::Float32 => "Single",
        PrimitiveType::Float64 => "Double",
        PrimitiveType::NativeInt => "IntPtr",
        PrimitiveType::NativeUInt => "UIntPtr",
    }
}
