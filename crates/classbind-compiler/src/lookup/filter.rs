//! Static / instance filtering of a trimmed lookup result.

use super::SemanticValue;
use crate::context::CompilationContext;

/// Keep what can be reached through a type name: nested types and static
/// members. Anything else degrades to `Void`.
pub fn filter_static(ctx: &CompilationContext, value: SemanticValue) -> SemanticValue {
    filter(ctx, value, true)
}

/// Keep what can be reached through an instance: non-static members only.
pub fn filter_non_static(ctx: &CompilationContext, value: SemanticValue) -> SemanticValue {
    filter(ctx, value, false)
}

fn filter(ctx: &CompilationContext, value: SemanticValue, want_static: bool) -> SemanticValue {
    match value {
        SemanticValue::Type(_) | SemanticValue::DeferredType(_) if want_static => value,
        SemanticValue::Type(_) | SemanticValue::DeferredType(_) => SemanticValue::Void,

        SemanticValue::Field(id) | SemanticValue::Property(id) | SemanticValue::Event(id) => {
            let is_field = matches!(value, SemanticValue::Field(_));
            // Properties and events without an accessor cannot be used either way.
            if !is_field && ctx.graph.underlying_method(id).is_none() {
                return SemanticValue::Void;
            }
            if ctx.graph.is_static_member(id) == want_static {
                value
            } else {
                SemanticValue::Void
            }
        }

        SemanticValue::MethodGroup(mut group) => {
            let mut i = 0;
            while let Some(method) = group.get(i) {
                if ctx.graph.member(method).is_static() == want_static {
                    i += 1;
                } else {
                    group.remove(i);
                }
            }
            if group.is_empty() {
                SemanticValue::Void
            } else {
                SemanticValue::MethodGroup(group)
            }
        }

        SemanticValue::IndexerGroup(mut indexers) => {
            indexers.retain(|&id| ctx.graph.is_static_member(id) == want_static);
            if indexers.is_empty() {
                SemanticValue::Void
            } else {
                SemanticValue::IndexerGroup(indexers)
            }
        }

        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overload::MethodGroup;
    use classbind_core::{
        ClassEntry, ClassId, ClassKind, DataType, MemberData, MemberEntry, MemberFlags,
        PrimitiveType, Signature,
    };

    fn int() -> DataType {
        DataType::Primitive(PrimitiveType::Int32)
    }

    fn make_test_context() -> (CompilationContext, ClassId) {
        let mut ctx = CompilationContext::default();
        let class = ctx.graph.add_class(ClassEntry::new("C", "", ClassKind::Class));
        (ctx, class)
    }

    #[test]
    fn method_group_split_by_staticness() {
        let (mut ctx, c) = make_test_context();
        let s = ctx.graph.add_member(
            MemberEntry::method("M", c, Signature::void()).with_flags(MemberFlags::STATIC),
        );
        let i = ctx.graph.add_member(MemberEntry::method("M", c, Signature::new(int(), vec![])));
        let mut group = MethodGroup::new();
        group.push(s, c);
        group.push(i, c);

        let statics = filter_static(&ctx, SemanticValue::MethodGroup(group.clone()));
        assert_eq!(statics, SemanticValue::MethodGroup(MethodGroup::from_method(s, c)));
        let instance = filter_non_static(&ctx, SemanticValue::MethodGroup(group));
        assert_eq!(instance, SemanticValue::MethodGroup(MethodGroup::from_method(i, c)));
    }

    #[test]
    fn emptied_group_is_void() {
        let (mut ctx, c) = make_test_context();
        let i = ctx.graph.add_member(MemberEntry::method("M", c, Signature::void()));
        let value = SemanticValue::MethodGroup(MethodGroup::from_method(i, c));
        assert_eq!(filter_static(&ctx, value), SemanticValue::Void);
    }

    #[test]
    fn types_only_through_type_names() {
        let (ctx, c) = make_test_context();
        assert_eq!(filter_static(&ctx, SemanticValue::Type(c)), SemanticValue::Type(c));
        assert_eq!(filter_non_static(&ctx, SemanticValue::Type(c)), SemanticValue::Void);
    }

    #[test]
    fn fields_by_flag() {
        let (mut ctx, c) = make_test_context();
        let f = ctx.graph.add_member(MemberEntry::field("f", c, int()));
        assert_eq!(filter_static(&ctx, SemanticValue::Field(f)), SemanticValue::Void);
        assert_eq!(filter_non_static(&ctx, SemanticValue::Field(f)), SemanticValue::Field(f));
    }

    #[test]
    fn property_judged_by_accessor() {
        let (mut ctx, c) = make_test_context();
        let getter = ctx.graph.add_member(
            MemberEntry::method("get_P", c, Signature::new(int(), vec![]))
                .with_flags(MemberFlags::STATIC | MemberFlags::SPECIAL_NAME),
        );
        let p = ctx.graph.add_member(MemberEntry::property("P", c, int(), vec![]));
        assert_eq!(filter_static(&ctx, SemanticValue::Property(p)), SemanticValue::Void);

        if let MemberData::Property { getter: g, .. } = &mut ctx.graph.member_mut(p).data {
            *g = Some(getter);
        }
        assert_eq!(filter_static(&ctx, SemanticValue::Property(p)), SemanticValue::Property(p));
        assert_eq!(filter_non_static(&ctx, SemanticValue::Property(p)), SemanticValue::Void);
    }
}
