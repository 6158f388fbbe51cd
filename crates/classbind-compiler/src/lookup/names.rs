//! Name resolution entry points.
//!
//! Each operation comes in two forms. The `try_` form returns the diagnostic
//! as an `Err` and leaves the context untouched, which is what collaborators
//! holding `&CompilationContext` need. The plain form reports the diagnostic
//! and hands back the `Void` sentinel (or `None`) so the caller can carry on.

use classbind_ast::QualifiedName;
use classbind_core::{ClassId, CompilationError, DataType, MemberId, Span};
use classbind_registry::{AliasTarget, NodeIndex, ScopeEntry};
use tracing::{debug, trace};

use super::find::type_target;
use super::{
    LookupItem, LookupTarget, SemanticValue, Trimmed, filter_non_static, filter_static,
    find_indexers, find_members, trim_member_list,
};
use crate::collaborators::Argument;
use crate::context::{CompilationContext, ResolutionContext};
use crate::overload::{MethodGroup, resolve_overload};

// ============================================================================
// Simple Names
// ============================================================================

/// Resolve a bare identifier.
///
/// The enclosing class and each of its nesting parents are searched first,
/// parents included. Then namespaces are walked outward. At each level a
/// type or namespace declared directly in it wins. Otherwise the `using`
/// directives written for that level apply: an alias is taken as is, and
/// the imported namespaces are searched together, so two imports supplying
/// different types with the name is an ambiguity.
pub fn try_resolve_simple_name(
    ctx: &CompilationContext,
    res: &ResolutionContext,
    name: &str,
    span: Span,
) -> Result<SemanticValue, CompilationError> {
    let mut class = res.class;
    while let Some(current) = class {
        let mut items = Vec::new();
        find_members(ctx, current, name, res.access_from, &mut items, true);
        match trim_member_list(ctx, &mut items, false) {
            Trimmed::Value(SemanticValue::Void) => {}
            Trimmed::Value(value) => return Ok(value),
            Trimmed::Ambiguous(items) => return Err(ambiguous(ctx, name, &items, span)),
        }
        class = ctx.graph.class(current).nesting_parent;
    }

    let mut namespace = Some(res.namespace);
    let mut block = res.block;
    while let Some(level) = namespace {
        if let Some(item) = find_type_in_namespace(ctx, level, name, res.access_from) {
            trace!(name, namespace = %ctx.scopes.namespace_path(level), "found in namespace");
            return Ok(item_value(item));
        }

        let directives = block
            .and_then(|b| ctx.scopes.block(b))
            .filter(|b| b.namespace == level);
        if let Some(directives) = directives {
            if let Some(target) = directives.alias(name) {
                return Ok(match target {
                    AliasTarget::Namespace(ns) => SemanticValue::Namespace(ns),
                    AliasTarget::Type(class) => item_value(LookupItem {
                        target: type_target(ctx, class),
                        owner: None,
                    }),
                });
            }

            let mut found: Vec<LookupItem> = Vec::new();
            for &imported in directives.usings() {
                let Some(item) = find_type_in_namespace(ctx, imported, name, res.access_from) else {
                    continue;
                };
                // `using` imports types, not nested namespaces.
                if matches!(item.target, LookupTarget::Namespace(_)) || found.contains(&item) {
                    continue;
                }
                found.push(item);
            }
            match found.as_slice() {
                [] => {}
                [item] => return Ok(item_value(*item)),
                _ => return Err(ambiguous(ctx, name, &found, span)),
            }
            block = directives.enclosing;
        }

        namespace = ctx.scopes.find_parent(level);
    }

    Err(CompilationError::NotDeclared {
        name: name.to_string(),
        span,
    })
}

pub fn resolve_simple_name(
    ctx: &mut CompilationContext,
    res: &ResolutionContext,
    name: &str,
    span: Span,
) -> SemanticValue {
    let result = try_resolve_simple_name(ctx, res, name, span);
    report(ctx, result)
}

/// A type or namespace declared directly in `namespace`.
pub fn find_type_in_namespace(
    ctx: &CompilationContext,
    namespace: NodeIndex,
    name: &str,
    access_from: Option<ClassId>,
) -> Option<LookupItem> {
    match ctx.scopes.lookup(namespace, name)? {
        ScopeEntry::Namespace(ns) => Some(LookupItem {
            target: LookupTarget::Namespace(ns),
            owner: None,
        }),
        ScopeEntry::Type { class, .. } => {
            ctx.graph
                .class_accessible(class, access_from)
                .then(|| LookupItem {
                    target: type_target(ctx, class),
                    owner: None,
                })
        }
    }
}

// ============================================================================
// Member Access
// ============================================================================

/// Resolve `base.name`.
///
/// Through a namespace the name must be a type or namespace in it. Through a
/// type only static members and nested types qualify, and through a value
/// only instance members.
pub fn try_resolve_member_name(
    ctx: &CompilationContext,
    res: &ResolutionContext,
    base: &SemanticValue,
    name: &str,
    span: Span,
) -> Result<SemanticValue, CompilationError> {
    match base {
        SemanticValue::Namespace(ns) => find_type_in_namespace(ctx, *ns, name, res.access_from)
            .map(item_value)
            .ok_or_else(|| CompilationError::NotNamespaceMember {
                name: name.to_string(),
                namespace: ctx.scopes.namespace_path(*ns),
                span,
            }),

        SemanticValue::Type(class) | SemanticValue::DeferredType(class) => {
            let value = lookup_in_class(ctx, res, *class, name, span)?;
            match filter_static(ctx, value) {
                SemanticValue::Void => Err(CompilationError::NotTypeMember {
                    name: name.to_string(),
                    type_name: ctx.graph.qualified_name(*class).to_string(),
                    span,
                }),
                value => Ok(value),
            }
        }

        SemanticValue::LValue(ty) | SemanticValue::RValue(ty) => {
            let not_member = || CompilationError::NotInstanceMember {
                name: name.to_string(),
                type_name: ctx.graph.type_name(ty),
                span,
            };
            let class = instance_class(ctx, ty).ok_or_else(not_member)?;
            let value = lookup_in_class(ctx, res, class, name, span)?;
            match filter_non_static(ctx, value) {
                SemanticValue::Void => Err(not_member()),
                value => Ok(value),
            }
        }

        _ => Err(CompilationError::InvalidLeftOperand { span }),
    }
}

pub fn resolve_member_name(
    ctx: &mut CompilationContext,
    res: &ResolutionContext,
    base: &SemanticValue,
    name: &str,
    span: Span,
) -> SemanticValue {
    let result = try_resolve_member_name(ctx, res, base, name, span);
    report(ctx, result)
}

/// Resolve a dotted name: the first segment as a simple name, each later
/// segment as member access on the value so far.
pub fn try_resolve_qualified_name(
    ctx: &CompilationContext,
    res: &ResolutionContext,
    name: &QualifiedName,
) -> Result<SemanticValue, CompilationError> {
    let mut segments = name.segments.iter();
    let Some(first) = segments.next() else {
        return Err(CompilationError::NotDeclared {
            name: String::new(),
            span: name.span,
        });
    };
    let mut value = try_resolve_simple_name(ctx, res, first.as_str(), first.span)?;
    for segment in segments {
        value = try_resolve_member_name(ctx, res, &value, segment.as_str(), segment.span)?;
    }
    Ok(value)
}

fn lookup_in_class(
    ctx: &CompilationContext,
    res: &ResolutionContext,
    class: ClassId,
    name: &str,
    span: Span,
) -> Result<SemanticValue, CompilationError> {
    let mut items = Vec::new();
    find_members(ctx, class, name, res.access_from, &mut items, true);
    match trim_member_list(ctx, &mut items, false) {
        Trimmed::Value(value) => Ok(value),
        Trimmed::Ambiguous(items) => Err(ambiguous(ctx, name, &items, span)),
    }
}

/// The class whose instance members a value of type `ty` exposes.
fn instance_class(ctx: &CompilationContext, ty: &DataType) -> Option<ClassId> {
    ctx.graph.class_of(ty.dereferenced())
}

// ============================================================================
// Constructors and Indexers
// ============================================================================

/// Pick the instance constructor of `class` that best accepts `args`.
///
/// Only constructors declared by `class` itself are candidates.
pub fn try_resolve_constructor(
    ctx: &CompilationContext,
    res: &ResolutionContext,
    class: ClassId,
    args: &[Argument],
    span: Span,
) -> Result<MemberId, CompilationError> {
    let mut items = Vec::new();
    find_members(ctx, class, ".ctor", res.access_from, &mut items, false);
    let name = ctx.graph.qualified_name(class);
    let group = match trim_member_list(ctx, &mut items, false) {
        Trimmed::Value(value) => match filter_non_static(ctx, value) {
            SemanticValue::MethodGroup(group) => group,
            _ => MethodGroup::new(),
        },
        Trimmed::Ambiguous(items) => return Err(ambiguous(ctx, name, &items, span)),
    };
    resolve_overload(ctx, group, args, name, span)
}

pub fn resolve_constructor(
    ctx: &mut CompilationContext,
    res: &ResolutionContext,
    class: ClassId,
    args: &[Argument],
    span: Span,
) -> Option<MemberId> {
    match try_resolve_constructor(ctx, res, class, args, span) {
        Ok(ctor) => Some(ctor),
        Err(error) => {
            debug!(%error, "constructor resolution failed");
            ctx.add_error(error);
            None
        }
    }
}

/// The indexers reachable on `class`, as an `IndexerGroup`, or `Void`.
pub fn resolve_indexers(
    ctx: &CompilationContext,
    res: &ResolutionContext,
    class: ClassId,
) -> SemanticValue {
    let mut items = Vec::new();
    find_indexers(ctx, class, res.access_from, &mut items);
    match trim_member_list(ctx, &mut items, true) {
        Trimmed::Value(SemanticValue::IndexerGroup(group)) if !group.is_empty() => {
            SemanticValue::IndexerGroup(group)
        }
        _ => SemanticValue::Void,
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// One-line description of a lookup candidate, as listed in ambiguity errors.
pub fn describe_item(ctx: &CompilationContext, item: &LookupItem) -> String {
    match item.target {
        LookupTarget::Type(class) | LookupTarget::DeferredType(class) => {
            format!("type {}", ctx.graph.qualified_name(class))
        }
        LookupTarget::Namespace(ns) => format!("namespace {}", ctx.scopes.namespace_path(ns)),
        LookupTarget::Member(id) => {
            let member = ctx.graph.member(id);
            let owner = item.owner.unwrap_or(member.owner);
            let ty = ctx.graph.type_name(member.data_type());
            let qualified = format!("{}.{}", ctx.graph.qualified_name(owner), member.name);
            if member.is_method() {
                let params = member
                    .params()
                    .iter()
                    .map(|p| ctx.graph.type_name(&p.ty))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("method {ty} {qualified}({params})")
            } else {
                format!("{} {ty} {qualified}", member.kind().as_str())
            }
        }
    }
}

fn ambiguous(ctx: &CompilationContext, name: &str, items: &[LookupItem], span: Span) -> CompilationError {
    let mut candidates: Vec<String> = Vec::new();
    for item in items {
        let line = describe_item(ctx, item);
        if !candidates.contains(&line) {
            candidates.push(line);
        }
    }
    CompilationError::Ambiguous {
        name: name.to_string(),
        candidates,
        span,
    }
}

fn item_value(item: LookupItem) -> SemanticValue {
    match item.target {
        LookupTarget::Type(class) => SemanticValue::Type(class),
        LookupTarget::DeferredType(class) => SemanticValue::DeferredType(class),
        LookupTarget::Namespace(ns) => SemanticValue::Namespace(ns),
        LookupTarget::Member(_) => SemanticValue::Void,
    }
}

fn report(ctx: &mut CompilationContext, result: Result<SemanticValue, CompilationError>) -> SemanticValue {
    match result {
        Ok(value) => value,
        Err(error) => {
            debug!(%error, "name resolution failed");
            ctx.add_error(error);
            SemanticValue::Void
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classbind_core::{
        ClassEntry, ClassKind, MemberEntry, MemberFlags, PrimitiveType, ResolutionState,
        Signature, Visibility,
    };

    fn int() -> DataType {
        DataType::Primitive(PrimitiveType::Int32)
    }

    /// Declare a resolved public class in the namespace at `path`.
    fn make_test_class(ctx: &mut CompilationContext, path: &str, name: &str) -> ClassId {
        let root = ctx.scopes.root();
        let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
        let ns = ctx.scopes.declare_namespace(root, &segments).unwrap();
        let id = ClassId(ctx.graph.class_count() as u32);
        ctx.scopes
            .declare_type(ns, name, id, Span::default(), false)
            .unwrap();
        let mut entry = ClassEntry::new(name, path, ClassKind::Class);
        entry.state = ResolutionState::Resolved;
        ctx.graph.add_class(entry)
    }

    fn namespace(ctx: &CompilationContext, path: &str) -> NodeIndex {
        ctx.scopes.find_namespace(path).unwrap()
    }

    #[test]
    fn enclosing_namespace_wins_over_using() {
        let mut ctx = CompilationContext::default();
        let inner = make_test_class(&mut ctx, "App", "Widget");
        make_test_class(&mut ctx, "Lib", "Widget");
        let app = namespace(&ctx, "App");
        let lib = namespace(&ctx, "Lib");
        let block = ctx.scopes.open_block(app, None);
        ctx.scopes.add_using(block, lib);

        let res = ResolutionContext::at_namespace(app).with_block(block);
        assert_eq!(
            try_resolve_simple_name(&ctx, &res, "Widget", Span::default()),
            Ok(SemanticValue::Type(inner))
        );
    }

    #[test]
    fn two_imports_are_ambiguous() {
        let mut ctx = CompilationContext::default();
        make_test_class(&mut ctx, "A", "Thing");
        make_test_class(&mut ctx, "B", "Thing");
        let root = ctx.scopes.root();
        let block = ctx.scopes.open_block(root, None);
        let (a, b) = (namespace(&ctx, "A"), namespace(&ctx, "B"));
        ctx.scopes.add_using(block, a);
        ctx.scopes.add_using(block, b);

        let res = ResolutionContext::at_namespace(root).with_block(block);
        let err = try_resolve_simple_name(&ctx, &res, "Thing", Span::default()).unwrap_err();
        assert_eq!(
            err,
            CompilationError::Ambiguous {
                name: "Thing".to_string(),
                candidates: vec!["type A.Thing".to_string(), "type B.Thing".to_string()],
                span: Span::default(),
            }
        );
    }

    #[test]
    fn using_does_not_import_namespaces() {
        let mut ctx = CompilationContext::default();
        make_test_class(&mut ctx, "Outer.Inner", "T");
        let root = ctx.scopes.root();
        let block = ctx.scopes.open_block(root, None);
        let outer = namespace(&ctx, "Outer");
        ctx.scopes.add_using(block, outer);

        let res = ResolutionContext::at_namespace(root).with_block(block);
        assert!(matches!(
            try_resolve_simple_name(&ctx, &res, "Inner", Span::default()),
            Err(CompilationError::NotDeclared { .. })
        ));
    }

    #[test]
    fn alias_resolves_directly() {
        let mut ctx = CompilationContext::default();
        let target = make_test_class(&mut ctx, "Deep.Down", "Target");
        let root = ctx.scopes.root();
        let block = ctx.scopes.open_block(root, None);
        ctx.scopes.add_alias(block, "T", AliasTarget::Type(target));

        let res = ResolutionContext::at_namespace(root).with_block(block);
        assert_eq!(
            try_resolve_simple_name(&ctx, &res, "T", Span::default()),
            Ok(SemanticValue::Type(target))
        );
    }

    #[test]
    fn class_members_before_namespaces() {
        let mut ctx = CompilationContext::default();
        let c = make_test_class(&mut ctx, "", "C");
        make_test_class(&mut ctx, "", "Value");
        let field = ctx.graph.add_member(MemberEntry::field("Value", c, int()));

        let res = ctx.global_resolution().within_class(c);
        assert_eq!(
            try_resolve_simple_name(&ctx, &res, "Value", Span::default()),
            Ok(SemanticValue::Field(field))
        );
    }

    #[test]
    fn namespace_member_access() {
        let mut ctx = CompilationContext::default();
        let widget = make_test_class(&mut ctx, "App.Ui", "Widget");
        let res = ctx.global_resolution();
        let app = try_resolve_simple_name(&ctx, &res, "App", Span::default()).unwrap();
        let ui = try_resolve_member_name(&ctx, &res, &app, "Ui", Span::default()).unwrap();
        assert_eq!(
            try_resolve_member_name(&ctx, &res, &ui, "Widget", Span::default()),
            Ok(SemanticValue::Type(widget))
        );
        assert!(matches!(
            try_resolve_member_name(&ctx, &res, &ui, "Missing", Span::default()),
            Err(CompilationError::NotNamespaceMember { namespace, .. }) if namespace == "App.Ui"
        ));
    }

    #[test]
    fn static_and_instance_access() {
        let mut ctx = CompilationContext::default();
        let c = make_test_class(&mut ctx, "", "C");
        let count = ctx.graph.add_member(
            MemberEntry::field("Count", c, int())
                .with_visibility(Visibility::Public)
                .with_flags(MemberFlags::STATIC),
        );
        let res = ctx.global_resolution();
        let ty = SemanticValue::Type(c);
        assert_eq!(
            try_resolve_member_name(&ctx, &res, &ty, "Count", Span::default()),
            Ok(SemanticValue::Field(count))
        );

        let value = SemanticValue::RValue(DataType::Class(ctx.graph.class(c).type_hash));
        assert!(matches!(
            try_resolve_member_name(&ctx, &res, &value, "Count", Span::default()),
            Err(CompilationError::NotInstanceMember { .. })
        ));
        assert_eq!(
            try_resolve_member_name(&ctx, &res, &SemanticValue::Void, "Count", Span::default()),
            Err(CompilationError::InvalidLeftOperand { span: Span::default() })
        );
    }

    #[test]
    fn reporting_form_records_error() {
        let mut ctx = CompilationContext::default();
        let res = ctx.global_resolution();
        let value = resolve_simple_name(&mut ctx, &res, "Nowhere", Span::new(4, 2, 7));
        assert!(value.is_void());
        assert_eq!(ctx.diagnostics().error_count(), 1);
    }

    #[test]
    fn constructor_needs_matching_arity() {
        let mut ctx = CompilationContext::default();
        let c = make_test_class(&mut ctx, "", "C");
        let ctor = ctx.graph.add_member(
            MemberEntry::method(
                ".ctor",
                c,
                Signature::new(DataType::Void, vec![classbind_core::Param::new("x", int())]),
            )
            .with_visibility(Visibility::Public)
            .with_flags(MemberFlags::SPECIAL_NAME | MemberFlags::RT_SPECIAL_NAME),
        );
        let res = ctx.global_resolution();
        let args = [Argument::new(int())];
        assert_eq!(try_resolve_constructor(&ctx, &res, c, &args, Span::default()), Ok(ctor));
        assert!(matches!(
            try_resolve_constructor(&ctx, &res, c, &[], Span::default()),
            Err(CompilationError::NoApplicableMember { .. })
        ));
    }

    #[test]
    fn describe_member_items() {
        let mut ctx = CompilationContext::default();
        let c = make_test_class(&mut ctx, "N", "C");
        let f = ctx.graph.add_member(MemberEntry::field("f", c, int()));
        let m = ctx.graph.add_member(MemberEntry::method(
            "M",
            c,
            Signature::new(DataType::Void, vec![classbind_core::Param::new("a", int())]),
        ));
        assert_eq!(describe_item(&ctx, &LookupItem::member(f, c)), "field int N.C.f");
        assert_eq!(describe_item(&ctx, &LookupItem::member(m, c)), "method void N.C.M(int)");
    }
}
