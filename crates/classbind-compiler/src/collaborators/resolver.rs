//! Type expressions resolved through the scope tree.

use classbind_ast::TypeExpr;
use classbind_core::{CompilationError, DataType};

use super::TypeResolver;
use crate::context::{CompilationContext, ResolutionContext, WellKnown};
use crate::lookup::{SemanticValue, try_resolve_qualified_name};

/// Resolves named types with ordinary name lookup: the first segment as a
/// simple name, the rest as member access.
///
/// While gathering, a declared type that has not been built yet resolves to
/// a deferred reference, which is still a usable `DataType`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeTypeResolver;

impl TypeResolver for ScopeTypeResolver {
    fn resolve_type(
        &self,
        ctx: &CompilationContext,
        res: &ResolutionContext,
        expr: &TypeExpr,
    ) -> Result<DataType, CompilationError> {
        match expr {
            TypeExpr::Void(_) => Ok(DataType::Void),
            TypeExpr::Primitive(p, _) => Ok(DataType::Primitive(*p)),
            TypeExpr::Array(element, _) => Ok(DataType::array_of(self.resolve_type(ctx, res, element)?)),
            TypeExpr::Named(name) => {
                if name.is_simple() {
                    let keyword = match name.last().as_str() {
                        "string" => Some(WellKnown::String),
                        "object" => Some(WellKnown::Object),
                        _ => None,
                    };
                    if let Some(kind) = keyword {
                        return Ok(ctx.well_known_type(kind));
                    }
                }

                let value = try_resolve_qualified_name(ctx, res, name)?;
                match value {
                    SemanticValue::Type(class) | SemanticValue::DeferredType(class) => {
                        Ok(DataType::Class(ctx.graph.class(class).type_hash))
                    }
                    _ => Err(CompilationError::NotAType {
                        name: name.to_string(),
                        span: name.span,
                    }),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corlib;
    use classbind_ast::QualifiedName;
    use classbind_core::{PrimitiveType, Span};

    #[test]
    fn keywords_and_arrays() {
        let mut ctx = CompilationContext::default();
        corlib::install(&mut ctx).unwrap();
        let res = ctx.global_resolution();
        let string = ctx.resolve_type(&res, &TypeExpr::named("string")).unwrap();
        assert_eq!(string, ctx.well_known_type(WellKnown::String));
        let ints = ctx
            .resolve_type(&res, &TypeExpr::array(TypeExpr::primitive(PrimitiveType::Int32)))
            .unwrap();
        assert_eq!(ints, DataType::array_of(DataType::Primitive(PrimitiveType::Int32)));
    }

    #[test]
    fn qualified_names_walk_namespaces() {
        let mut ctx = CompilationContext::default();
        corlib::install(&mut ctx).unwrap();
        let res = ctx.global_resolution();
        let ty = ctx.resolve_type(&res, &TypeExpr::named("System.Attribute")).unwrap();
        assert_eq!(ty, ctx.well_known_type(WellKnown::Attribute));
    }

    #[test]
    fn namespaces_are_not_types() {
        let mut ctx = CompilationContext::default();
        corlib::install(&mut ctx).unwrap();
        let res = ctx.global_resolution();
        let expr = TypeExpr::Named(QualifiedName::parse("System", Span::new(2, 4, 6)));
        assert_eq!(
            ctx.resolve_type(&res, &expr),
            Err(CompilationError::NotAType {
                name: "System".to_string(),
                span: Span::new(2, 4, 6),
            })
        );
    }

    #[test]
    fn unknown_names_are_not_declared() {
        let ctx = CompilationContext::default();
        let res = ctx.global_resolution();
        assert!(matches!(
            ctx.resolve_type(&res, &TypeExpr::named("Missing")),
            Err(CompilationError::NotDeclared { .. })
        ));
    }
}
