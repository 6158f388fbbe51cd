//! Core library prelude.
//!
//! Registers the handful of referenced-unit types the engine relies on
//! (root object, value type and enum bases, delegates, string, `Type` and the
//! attribute classes) as imported classes. Names come from
//! [`CompilerOptions`](crate::context::CompilerOptions), so a context
//! configured for a different core library installs that library's names.

use classbind_core::{
    AttributeTargets, ClassEntry, ClassFlags, ClassId, ClassKind, DataType, FatalError,
    MemberEntry, MemberFlags, MemberId, Param, PrimitiveType, Signature, Span, Visibility,
};
use tracing::{debug, error};

use crate::context::{CompilationContext, WellKnown};

/// Ids of the installed core types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreTypes {
    pub object: ClassId,
    pub value_type: ClassId,
    pub enum_type: ClassId,
    pub delegate: ClassId,
    pub multicast_delegate: ClassId,
    pub string: ClassId,
    pub type_class: ClassId,
    pub attribute: ClassId,
    pub attribute_usage: ClassId,
    pub param_array: ClassId,
    /// `AttributeUsageAttribute(int validOn)`.
    pub attribute_usage_ctor: MemberId,
}

/// Install the core types into `ctx`. Installing twice reuses the classes
/// already present.
#[tracing::instrument(level = "debug", skip(ctx))]
pub fn install(ctx: &mut CompilationContext) -> Result<CoreTypes, FatalError> {
    let object = import(ctx, WellKnown::Object, ClassKind::Class, None, ClassFlags::empty())?;
    let value_type = import(ctx, WellKnown::ValueType, ClassKind::Class, Some(object), ClassFlags::ABSTRACT)?;
    let enum_type = import(ctx, WellKnown::Enum, ClassKind::Class, Some(value_type), ClassFlags::ABSTRACT)?;
    let delegate = import(ctx, WellKnown::Delegate, ClassKind::Class, Some(object), ClassFlags::ABSTRACT)?;
    let multicast_delegate = import(
        ctx,
        WellKnown::MulticastDelegate,
        ClassKind::Class,
        Some(delegate),
        ClassFlags::ABSTRACT,
    )?;
    let string = import(ctx, WellKnown::String, ClassKind::Class, Some(object), ClassFlags::SEALED)?;
    let type_class = import(ctx, WellKnown::Type, ClassKind::Class, Some(object), ClassFlags::ABSTRACT)?;
    let attribute = import(ctx, WellKnown::Attribute, ClassKind::Class, Some(object), ClassFlags::ABSTRACT)?;
    let attribute_usage = import(
        ctx,
        WellKnown::AttributeUsage,
        ClassKind::Class,
        Some(attribute),
        ClassFlags::SEALED,
    )?;
    let param_array = import(
        ctx,
        WellKnown::ParamArray,
        ClassKind::Class,
        Some(attribute),
        ClassFlags::SEALED,
    )?;

    constructor(ctx, object, Visibility::Public, Vec::new());
    constructor(ctx, attribute, Visibility::Protected, Vec::new());
    constructor(ctx, param_array, Visibility::Public, Vec::new());
    let attribute_usage_ctor = constructor(
        ctx,
        attribute_usage,
        Visibility::Public,
        vec![Param::new("validOn", DataType::Primitive(PrimitiveType::Int32))],
    );

    ctx.graph.class_mut(attribute_usage).attribute_usage = Some(AttributeTargets::CLASS);
    ctx.graph.class_mut(param_array).attribute_usage = Some(AttributeTargets::PARAMETER);

    Ok(CoreTypes {
        object,
        value_type,
        enum_type,
        delegate,
        multicast_delegate,
        string,
        type_class,
        attribute,
        attribute_usage,
        param_array,
        attribute_usage_ctor,
    })
}

fn import(
    ctx: &mut CompilationContext,
    kind: WellKnown,
    class_kind: ClassKind,
    parent: Option<ClassId>,
    flags: ClassFlags,
) -> Result<ClassId, FatalError> {
    if let Some(existing) = ctx.well_known(kind) {
        return Ok(existing);
    }

    let qualified_name = ctx.options().well_known_name(kind).to_string();
    let (namespace, name) = qualified_name
        .rsplit_once('.')
        .unwrap_or(("", qualified_name.as_str()));

    let mut entry = ClassEntry::new(name, namespace, class_kind)
        .imported()
        .with_flags(flags);
    if let Some(parent) = parent {
        entry = entry.with_parent(parent);
    }
    let id = ctx.graph.add_class(entry);

    let root = ctx.scopes.root();
    let segments: Vec<&str> = namespace.split('.').filter(|s| !s.is_empty()).collect();
    let declared = ctx
        .scopes
        .declare_namespace(root, &segments)
        .and_then(|scope| ctx.scopes.declare_type(scope, name, id, Span::default(), true));
    if let Err(err) = declared {
        error!(%qualified_name, ?err, "core type is not reachable by name");
    }

    ctx.sink.import_class(ctx.graph.class(id))?;
    debug!(%qualified_name, ?id, "imported core type");
    Ok(id)
}

fn constructor(
    ctx: &mut CompilationContext,
    owner: ClassId,
    visibility: Visibility,
    params: Vec<Param>,
) -> MemberId {
    if let Some(existing) = ctx
        .graph
        .members_of(owner)
        .find(|m| m.is_constructor() && m.params().len() == params.len())
    {
        return existing.id;
    }
    ctx.graph.add_member(
        MemberEntry::method(".ctor", owner, Signature::new(DataType::Void, params))
            .with_visibility(visibility)
            .with_flags(MemberFlags::SPECIAL_NAME | MemberFlags::RT_SPECIAL_NAME),
    )
}
