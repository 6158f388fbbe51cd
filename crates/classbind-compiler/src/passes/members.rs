//! Member Pass (Pass 3) - create the members of every gathered type.
//!
//! Types are visited in gather order, so a base class always has its
//! members before a derived class checks against them. Each declaration is
//! turned into one or more [`MemberEntry`] records:
//!
//! - fields, one per declarator
//! - methods, constructors and operators
//! - properties and indexers with their `get_`/`set_` accessors
//! - events with their `add_`/`remove_` accessors and, for field-like
//!   events, a hidden backing field
//! - enum members as literal static fields
//! - the runtime constructor and `Invoke` method of a delegate
//!
//! Before a member is registered it is checked against what the class and
//! its parents already declare: duplicates, hiding without `new`, overriding
//! without `override`, and `override` with nothing to override. A failed
//! check is reported and, except for duplicates, the member is still
//! created so later phases see it.
//!
//! Attribute sections are not bound here. Every declaration that carries
//! sections is recorded as an [`AttributeSite`] for the attribute binder.

use classbind_ast::{
    AttributeSection, ClassMemberDecl, DelegateMemberDecl, EnumMemberDecl, EventDecl, Expr,
    FieldDecl, MemberName, MethodDecl, MethodKind, Modifiers, ParamDecl, ParamDeclModifier,
    PropertyDecl, TypeDecl, TypeExpr,
};
use classbind_core::{
    AttachedAttribute, ClassId, ClassKind, CompilationError, CompilationWarning, ConstValue,
    DataType, FatalError, MemberData, MemberEntry, MemberFlags, MemberId, Param, ParamModifier,
    PrimitiveType, ProgramItem, Signature, Span, Visibility,
};
use tracing::{debug, trace};

use super::DeclaredType;
use crate::attributes::{AttributeSite, Declaration, blob};
use crate::context::{CompilationContext, ResolutionContext, WellKnown};

/// Output of the member pass.
#[derive(Debug, Default)]
pub struct MemberOutput<'ast> {
    /// Number of members registered.
    pub members: usize,
    /// Declarations carrying attribute sections, in declaration order with
    /// each type after its members.
    pub sites: Vec<AttributeSite<'ast>>,
}

/// Whether a method was written by the user or synthesized for a property
/// or event. Hiding is reported once, on the property or event itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Declared,
    Accessor,
}

/// What an existing member does to a new one with the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Clash {
    None,
    Local(MemberId),
    Inherited(MemberId),
}

/// How a declaration relates to an interface named in its member name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Implementing {
    Implicit,
    Explicit(ClassId),
    /// Already reported; the declaration is dropped.
    Invalid,
}

/// Pass 3: create members.
pub struct MemberPass<'a, 'ast> {
    ctx: &'a mut CompilationContext,
    types: &'a [DeclaredType<'ast>],
    members: usize,
    sites: Vec<AttributeSite<'ast>>,
}

impl<'a, 'ast> MemberPass<'a, 'ast> {
    pub fn new(ctx: &'a mut CompilationContext, types: &'a [DeclaredType<'ast>]) -> Self {
        Self {
            ctx,
            types,
            members: 0,
            sites: Vec::new(),
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(types = self.types.len()))]
    pub fn run(mut self) -> Result<MemberOutput<'ast>, FatalError> {
        #[cfg(feature = "profiling")]
        profiling::scope!("build_members");

        let types = self.types;
        for item in types {
            self.create_members(item)?;
        }

        debug!(members = self.members, sites = self.sites.len(), "member pass complete");
        Ok(MemberOutput {
            members: self.members,
            sites: self.sites,
        })
    }

    fn create_members(&mut self, item: &DeclaredType<'ast>) -> Result<(), FatalError> {
        let decl: &'ast TypeDecl = item.decl;
        let res = item.body();
        self.ctx.set_file(Some(item.file.to_string()));

        if decl.kind == ClassKind::Enum {
            self.create_enum_value_field(item)?;
        }

        let mut next_value: i128 = 0;
        let mut invoke = None;
        for member in &decl.members {
            match member {
                ClassMemberDecl::Field(field) => self.create_field(item, &res, field)?,
                ClassMemberDecl::Method(method) => self.create_method(item, &res, method)?,
                ClassMemberDecl::Property(property) => self.create_property(item, &res, property)?,
                ClassMemberDecl::Event(event) => self.create_event(item, &res, event)?,
                ClassMemberDecl::EnumMember(constant) => {
                    self.create_enum_member(item, &res, constant, &mut next_value)?
                }
                ClassMemberDecl::Delegate(delegate) => {
                    invoke = self.create_delegate_members(item, &res, delegate)?;
                }
                // Nested types are entries of their own.
                ClassMemberDecl::NestedType(_) => {}
            }
        }

        // Attributes on a type resolve in the scope around it.
        self.site(
            &decl.attributes,
            Declaration::Type {
                class: item.class,
                invoke,
            },
            item.outer,
            item.file,
        );
        Ok(())
    }

    // ========================================================================
    // Fields and Enum Members
    // ========================================================================

    fn create_field(
        &mut self,
        item: &DeclaredType<'ast>,
        res: &ResolutionContext,
        decl: &'ast FieldDecl,
    ) -> Result<(), FatalError> {
        let ty = self.resolve(res, &decl.ty);
        let mut flags = MemberFlags::empty();
        if decl.modifiers.contains(Modifiers::STATIC) {
            flags |= MemberFlags::STATIC;
        }
        if decl.modifiers.contains(Modifiers::READONLY) {
            flags |= MemberFlags::INIT_ONLY;
        }
        if decl.modifiers.contains(Modifiers::VOLATILE) {
            flags |= MemberFlags::VOLATILE;
        }
        if decl.modifiers.contains(Modifiers::CONST) {
            flags |= MemberFlags::LITERAL | MemberFlags::STATIC;
        }
        let visibility = decl.modifiers.visibility(Visibility::Private);

        for name in &decl.names {
            let entry = MemberEntry::field(name.as_str(), item.class, ty.clone())
                .with_visibility(visibility)
                .with_flags(flags)
                .with_span(name.span);
            if !self.check_declared(item, &entry, decl.modifiers, true) {
                continue;
            }
            if let Some(id) = self.register(item, entry)? {
                self.site(&decl.attributes, Declaration::Field(id), *res, item.file);
            }
        }
        Ok(())
    }

    /// The instance field holding an enum's underlying value.
    fn create_enum_value_field(&mut self, item: &DeclaredType<'ast>) -> Result<(), FatalError> {
        let entry = MemberEntry::field("value__", item.class, DataType::Primitive(PrimitiveType::Int32))
            .with_visibility(Visibility::Public)
            .with_flags(MemberFlags::SPECIAL_NAME | MemberFlags::RT_SPECIAL_NAME | MemberFlags::SYNTHETIC)
            .with_span(item.decl.name.span);
        self.register(item, entry)?;
        Ok(())
    }

    fn create_enum_member(
        &mut self,
        item: &DeclaredType<'ast>,
        res: &ResolutionContext,
        decl: &'ast EnumMemberDecl,
        next_value: &mut i128,
    ) -> Result<(), FatalError> {
        if decl.name.as_str() == "value__" {
            self.report(CompilationError::ReservedEnumMember { span: decl.span });
            return Ok(());
        }

        let enum_ty = DataType::Class(self.ctx.graph.class(item.class).type_hash);
        let value = match &decl.value {
            Some(expr) => self.enum_value(res, expr, &enum_ty).unwrap_or(*next_value),
            None => *next_value,
        };
        *next_value = value + 1;

        let value = match i32::try_from(value) {
            Ok(value) => value,
            Err(_) => {
                self.report(CompilationError::CannotCoerce {
                    from: value.to_string(),
                    to: "int".to_string(),
                    span: decl.span,
                });
                return Ok(());
            }
        };

        let entry = MemberEntry::field(decl.name.as_str(), item.class, enum_ty)
            .with_visibility(Visibility::Public)
            .with_constant(ConstValue::Int32(value))
            .with_span(decl.span);
        if !self.check_declared(item, &entry, Modifiers::empty(), true) {
            return Ok(());
        }
        if let Some(id) = self.register(item, entry)? {
            self.site(&decl.attributes, Declaration::Field(id), *res, item.file);
        }
        Ok(())
    }

    /// Evaluate an explicit enum member value. Earlier members of the same
    /// enum are accepted as they are; anything else must convert to `int`.
    fn enum_value(&mut self, res: &ResolutionContext, expr: &Expr, enum_ty: &DataType) -> Option<i128> {
        let constant = match self.ctx.evaluate_constant(res, expr) {
            Ok(constant) => constant,
            Err(error) => {
                self.report(error);
                return None;
            }
        };
        if constant.ty == *enum_ty {
            return constant.value.as_integer();
        }

        let int = DataType::Primitive(PrimitiveType::Int32);
        match self.ctx.coerce_constant(&constant, &int) {
            Some(value) => value.as_integer(),
            None => {
                let from = self.ctx.graph.type_name(&constant.ty);
                self.report(CompilationError::CannotCoerce {
                    from,
                    to: "int".to_string(),
                    span: expr.span(),
                });
                None
            }
        }
    }

    // ========================================================================
    // Methods
    // ========================================================================

    fn create_method(
        &mut self,
        item: &DeclaredType<'ast>,
        res: &ResolutionContext,
        decl: &'ast MethodDecl,
    ) -> Result<(), FatalError> {
        let name = match decl.kind {
            MethodKind::Constructor => ".ctor",
            MethodKind::StaticConstructor => ".cctor",
            MethodKind::Normal | MethodKind::Operator => decl.name.ident.as_str(),
        };
        let return_type = self.resolve(res, &decl.return_type);
        let (params, vararg) = self.build_params(res, &decl.params, false);
        let mut signature = Signature::new(return_type, params);
        signature.vararg = vararg;

        let mut flags = method_flags(decl.modifiers);
        match decl.kind {
            MethodKind::Constructor | MethodKind::StaticConstructor => {
                flags |= MemberFlags::SPECIAL_NAME | MemberFlags::RT_SPECIAL_NAME;
            }
            MethodKind::Operator => flags |= MemberFlags::SPECIAL_NAME,
            MethodKind::Normal => {}
        }
        if vararg {
            flags |= MemberFlags::VARARG;
        }

        let mut entry = MemberEntry::method(name, item.class, signature)
            .with_visibility(decl.modifiers.visibility(Visibility::Private))
            .with_flags(flags)
            .with_span(decl.span);

        let explicit = match self.implementing(item, res, &decl.name, decl.modifiers, decl.span) {
            Implementing::Invalid => return Ok(()),
            Implementing::Implicit => false,
            Implementing::Explicit(interface) => {
                let Some(target) = self.interface_member(interface, &entry) else {
                    self.report_missing(interface, decl.span);
                    return Ok(());
                };
                self.make_explicit(&mut entry, interface, Some(target));
                true
            }
        };

        let Some(id) = self.finish_method(item, entry, decl.modifiers, Role::Declared, explicit)? else {
            return Ok(());
        };
        self.site(&decl.attributes, Declaration::Method(id), *res, item.file);
        self.param_sites(&decl.params, id, *res, item.file);
        self.param_array(id)
    }

    /// Interface adjustments, modifier checks and registration shared by
    /// declared methods and accessors.
    fn finish_method(
        &mut self,
        item: &DeclaredType<'ast>,
        mut entry: MemberEntry,
        modifiers: Modifiers,
        role: Role,
        explicit: bool,
    ) -> Result<Option<MemberId>, FatalError> {
        let class = item.class;
        if self.ctx.graph.class(class).is_interface() {
            entry.visibility = Visibility::Public;
            entry.flags |= MemberFlags::ABSTRACT | MemberFlags::VIRTUAL | MemberFlags::NEW_SLOT;
        } else if !explicit
            && entry.visibility == Visibility::Public
            && !entry.is_static()
            && !entry.is_virtual()
            && self.satisfies_interface(class, &entry)
        {
            trace!(name = %entry.name, "implicitly implements an interface method");
            entry.flags |= MemberFlags::VIRTUAL | MemberFlags::NEW_SLOT | MemberFlags::FINAL;
        }

        if !self.check_method(item, &mut entry, modifiers, role, explicit) {
            return Ok(None);
        }
        self.register(item, entry)
    }

    /// Parameters as declared. A trailing `__arglist` is not a parameter; it
    /// sets the returned vararg flag.
    fn build_params(
        &mut self,
        res: &ResolutionContext,
        decls: &[ParamDecl],
        indexer: bool,
    ) -> (Vec<Param>, bool) {
        let mut params = Vec::with_capacity(decls.len());
        let mut vararg = false;
        for (i, decl) in decls.iter().enumerate() {
            let modifier = match decl.modifier {
                ParamDeclModifier::Arglist => {
                    if indexer {
                        self.report(CompilationError::ArglistInIndexer { span: decl.span });
                    } else if i + 1 != decls.len() {
                        self.report(CompilationError::ArglistNotLast { span: decl.span });
                    } else {
                        vararg = true;
                    }
                    continue;
                }
                ParamDeclModifier::None => ParamModifier::None,
                ParamDeclModifier::Ref => ParamModifier::Ref,
                ParamDeclModifier::Out => ParamModifier::Out,
                ParamDeclModifier::Params => ParamModifier::Params,
            };
            let ty = self.resolve(res, &decl.ty);
            let ty = match modifier {
                ParamModifier::Ref | ParamModifier::Out => DataType::by_ref(ty),
                ParamModifier::None | ParamModifier::Params => ty,
            };
            params.push(Param::new(decl.name.as_str(), ty).with_modifier(modifier));
        }
        (params, vararg)
    }

    /// Attach the param-array attribute to a trailing `params` parameter.
    fn param_array(&mut self, method: MemberId) -> Result<(), FatalError> {
        let Some(signature) = self.ctx.graph.member(method).signature() else {
            return Ok(());
        };
        if !signature.has_param_array() {
            return Ok(());
        }
        let index = signature.params.len() as u16;

        let Some(class) = self.ctx.well_known(WellKnown::ParamArray) else {
            return Ok(());
        };
        let Some(constructor) = self
            .ctx
            .graph
            .members_of(class)
            .find(|m| m.is_constructor() && m.params().is_empty())
            .map(|m| m.id)
        else {
            return Ok(());
        };

        let attribute = AttachedAttribute {
            target: ProgramItem::Parameter { method, index },
            attribute_class: class,
            constructor,
            blob: blob::empty(),
        };
        self.ctx.sink.attach_attribute_blob(&attribute)?;
        self.ctx.graph.attach_attribute(attribute);
        Ok(())
    }

    // ========================================================================
    // Properties and Events
    // ========================================================================

    fn create_property(
        &mut self,
        item: &DeclaredType<'ast>,
        res: &ResolutionContext,
        decl: &'ast PropertyDecl,
    ) -> Result<(), FatalError> {
        let ty = self.resolve(res, &decl.ty);
        let (params, _) = self.build_params(res, &decl.params, !decl.params.is_empty());
        let name = decl.name.ident.as_str();

        let mut property = MemberEntry::property(name, item.class, ty.clone(), params.clone())
            .with_visibility(decl.modifiers.visibility(Visibility::Private))
            .with_span(decl.span);
        if self.ctx.graph.class(item.class).is_interface() {
            property.visibility = Visibility::Public;
        }

        let mut explicit = None;
        match self.implementing(item, res, &decl.name, decl.modifiers, decl.span) {
            Implementing::Invalid => return Ok(()),
            Implementing::Implicit => {}
            Implementing::Explicit(interface) => {
                let Some(target) = self.interface_member(interface, &property) else {
                    self.report_missing(interface, decl.span);
                    return Ok(());
                };
                property.name = format!("{}.{}", self.ctx.graph.qualified_name(interface), name);
                property.visibility = Visibility::Private;
                explicit = Some((interface, self.ctx.graph.member(target).accessors()));
            }
        }
        if !self.check_declared(item, &property, decl.modifiers, explicit.is_none()) {
            return Ok(());
        }

        let getter = match &decl.getter {
            Some(accessor) => self.create_accessor(
                item,
                format!("get_{name}"),
                Signature::new(ty.clone(), params.clone()),
                decl.modifiers,
                accessor.span,
                explicit.map(|(interface, targets)| (interface, targets[0])),
            )?,
            None => None,
        };
        let setter = match &decl.setter {
            Some(accessor) => {
                let mut setter_params = params.clone();
                setter_params.push(Param::new("value", ty.clone()));
                self.create_accessor(
                    item,
                    format!("set_{name}"),
                    Signature::new(DataType::Void, setter_params),
                    decl.modifiers,
                    accessor.span,
                    explicit.map(|(interface, targets)| (interface, targets[1])),
                )?
            }
            None => None,
        };

        if let MemberData::Property {
            getter: g,
            setter: s,
            ..
        } = &mut property.data
        {
            *g = getter;
            *s = setter;
        }
        let Some(id) = self.register(item, property)? else {
            return Ok(());
        };

        self.site(&decl.attributes, Declaration::Property(id), *res, item.file);
        if let (Some(method), Some(accessor)) = (getter, &decl.getter) {
            self.site(&accessor.attributes, Declaration::Accessor { method, value: None }, *res, item.file);
        }
        if let (Some(method), Some(accessor)) = (setter, &decl.setter) {
            let value = Some(params.len() as u16 + 1);
            self.site(&accessor.attributes, Declaration::Accessor { method, value }, *res, item.file);
        }
        if let Some(method) = getter.or(setter) {
            self.param_sites(&decl.params, method, *res, item.file);
        }
        Ok(())
    }

    fn create_event(
        &mut self,
        item: &DeclaredType<'ast>,
        res: &ResolutionContext,
        decl: &'ast EventDecl,
    ) -> Result<(), FatalError> {
        let name = decl.name.ident.as_str();
        if name == "value" {
            self.report(CompilationError::EventNamedValue { span: decl.span });
            return Ok(());
        }

        let ty = self.resolve(res, &decl.ty);
        let is_delegate = self
            .ctx
            .graph
            .class_of(&ty)
            .is_some_and(|c| self.ctx.graph.class(c).is_delegate());
        if !ty.is_error() && !is_delegate {
            let type_name = self.ctx.graph.type_name(&ty);
            self.report(CompilationError::NotADelegate {
                name: type_name,
                span: decl.ty.span(),
            });
        }

        let in_interface = self.ctx.graph.class(item.class).is_interface();
        let mut event = MemberEntry::event(name, item.class, ty.clone())
            .with_visibility(decl.modifiers.visibility(Visibility::Private))
            .with_span(decl.span);
        if in_interface {
            event.visibility = Visibility::Public;
        }

        let mut explicit = None;
        match self.implementing(item, res, &decl.name, decl.modifiers, decl.span) {
            Implementing::Invalid => return Ok(()),
            Implementing::Implicit => {}
            Implementing::Explicit(interface) => {
                let Some(target) = self.interface_member(interface, &event) else {
                    self.report_missing(interface, decl.span);
                    return Ok(());
                };
                event.name = format!("{}.{}", self.ctx.graph.qualified_name(interface), name);
                event.visibility = Visibility::Private;
                explicit = Some((interface, self.ctx.graph.member(target).accessors()));
            }
        }
        if !self.check_declared(item, &event, decl.modifiers, explicit.is_none()) {
            return Ok(());
        }

        let handler = || Signature::new(DataType::Void, vec![Param::new("value", ty.clone())]);
        let add_span = decl.add.as_ref().map_or(decl.span, |a| a.span);
        let remove_span = decl.remove.as_ref().map_or(decl.span, |a| a.span);
        let add = self.create_accessor(
            item,
            format!("add_{name}"),
            handler(),
            decl.modifiers,
            add_span,
            explicit.map(|(interface, targets)| (interface, targets[0])),
        )?;
        let remove = self.create_accessor(
            item,
            format!("remove_{name}"),
            handler(),
            decl.modifiers,
            remove_span,
            explicit.map(|(interface, targets)| (interface, targets[1])),
        )?;

        if let MemberData::Event {
            add: a, remove: r, ..
        } = &mut event.data
        {
            *a = add;
            *r = remove;
        }
        let Some(id) = self.register(item, event)? else {
            return Ok(());
        };

        let mut backing = None;
        if decl.is_field_like() && !in_interface && explicit.is_none() {
            let mut flags = MemberFlags::SYNTHETIC;
            if decl.modifiers.contains(Modifiers::STATIC) {
                flags |= MemberFlags::STATIC;
            }
            let field = MemberEntry::field(name, item.class, ty.clone())
                .with_flags(flags)
                .with_span(decl.span);
            backing = self.register(item, field)?;
        }

        self.site(&decl.attributes, Declaration::Event { event: id, backing }, *res, item.file);
        for (method, accessor) in [(add, &decl.add), (remove, &decl.remove)] {
            if let (Some(method), Some(accessor)) = (method, accessor) {
                let declaration = Declaration::Accessor { method, value: Some(1) };
                self.site(&accessor.attributes, declaration, *res, item.file);
            }
        }
        Ok(())
    }

    /// A `get_`/`set_`/`add_`/`remove_` method. Accessors take the flags of
    /// the property or event they belong to.
    fn create_accessor(
        &mut self,
        item: &DeclaredType<'ast>,
        name: String,
        signature: Signature,
        modifiers: Modifiers,
        span: Span,
        explicit: Option<(ClassId, Option<MemberId>)>,
    ) -> Result<Option<MemberId>, FatalError> {
        let mut entry = MemberEntry::method(name, item.class, signature)
            .with_visibility(modifiers.visibility(Visibility::Private))
            .with_flags(method_flags(modifiers) | MemberFlags::SPECIAL_NAME)
            .with_span(span);
        if let Some((interface, target)) = explicit {
            self.make_explicit(&mut entry, interface, target);
        }
        self.finish_method(item, entry, modifiers, Role::Accessor, explicit.is_some())
    }

    // ========================================================================
    // Delegates
    // ========================================================================

    /// The runtime-provided constructor and `Invoke` method. Returns the
    /// `Invoke` method, which carries the delegate's return value.
    fn create_delegate_members(
        &mut self,
        item: &DeclaredType<'ast>,
        res: &ResolutionContext,
        decl: &'ast DelegateMemberDecl,
    ) -> Result<Option<MemberId>, FatalError> {
        let runtime = MemberFlags::RUNTIME;
        let ctor_params = vec![
            Param::new("object", self.ctx.well_known_type(WellKnown::Object)),
            Param::new("method", DataType::Primitive(PrimitiveType::NativeInt)),
        ];
        let ctor = MemberEntry::method(".ctor", item.class, Signature::new(DataType::Void, ctor_params))
            .with_visibility(Visibility::Public)
            .with_flags(runtime | MemberFlags::SPECIAL_NAME | MemberFlags::RT_SPECIAL_NAME)
            .with_span(decl.span);
        self.register(item, ctor)?;

        let return_type = self.resolve(res, &decl.return_type);
        let (params, vararg) = self.build_params(res, &decl.params, false);
        let mut signature = Signature::new(return_type, params);
        signature.vararg = vararg;
        let invoke = MemberEntry::method("Invoke", item.class, signature)
            .with_visibility(Visibility::Public)
            .with_flags(runtime | MemberFlags::VIRTUAL | MemberFlags::NEW_SLOT)
            .with_span(decl.span);
        let Some(id) = self.register(item, invoke)? else {
            return Ok(None);
        };

        self.param_sites(&decl.params, id, *res, item.file);
        self.param_array(id)?;
        Ok(Some(id))
    }

    // ========================================================================
    // Interfaces
    // ========================================================================

    /// Classify a member name, validating an explicit interface qualifier.
    fn implementing(
        &mut self,
        item: &DeclaredType<'ast>,
        res: &ResolutionContext,
        name: &MemberName,
        modifiers: Modifiers,
        span: Span,
    ) -> Implementing {
        let Some(expr) = &name.interface else {
            return Implementing::Implicit;
        };
        if self.ctx.graph.class(item.class).is_interface() {
            self.report(CompilationError::ExplicitImplInInterface { span });
            return Implementing::Invalid;
        }
        if let Some(reason) = explicit_modifier_error(modifiers) {
            self.report(CompilationError::InvalidExplicitImpl {
                reason: reason.to_string(),
                span,
            });
        }

        let ty = self.resolve(res, expr);
        if ty.is_error() {
            return Implementing::Invalid;
        }
        let interface = self
            .ctx
            .graph
            .class_of(&ty)
            .filter(|&c| self.ctx.graph.class(c).is_interface());
        let Some(interface) = interface else {
            self.report(CompilationError::NotAnInterface {
                name: expr.to_string(),
                span: expr.span(),
            });
            return Implementing::Invalid;
        };
        if !self.ctx.graph.implements(item.class, interface) {
            let reason = format!(
                "names `{}', which the containing type does not implement",
                self.ctx.graph.qualified_name(interface)
            );
            self.report(CompilationError::InvalidExplicitImpl { reason, span });
            return Implementing::Invalid;
        }
        Implementing::Explicit(interface)
    }

    /// Rename `entry` to `Interface.Name` and give it the private sealed
    /// virtual shape of an explicit implementation.
    fn make_explicit(&self, entry: &mut MemberEntry, interface: ClassId, target: Option<MemberId>) {
        entry.name = format!("{}.{}", self.ctx.graph.qualified_name(interface), entry.name);
        entry.visibility = Visibility::Private;
        entry.flags |= MemberFlags::VIRTUAL | MemberFlags::NEW_SLOT | MemberFlags::FINAL;
        if let MemberData::Method { implements, .. } = &mut entry.data {
            *implements = target;
        }
    }

    /// The member of `interface` (or an interface it extends) that `probe`
    /// implements.
    fn interface_member(&self, interface: ClassId, probe: &MemberEntry) -> Option<MemberId> {
        let graph = &self.ctx.graph;
        self.interface_closure(vec![interface])
            .into_iter()
            .flat_map(|i| graph.members_of(i))
            .find(|m| {
                m.kind() == probe.kind()
                    && m.name == probe.name
                    && collides(m, probe)
                    && (!m.is_method() || m.data_type() == probe.data_type())
            })
            .map(|m| m.id)
    }

    /// Whether a public method matches a method of any interface the class
    /// implements.
    fn satisfies_interface(&self, class: ClassId, entry: &MemberEntry) -> bool {
        let graph = &self.ctx.graph;
        let direct = graph
            .ancestors(class)
            .flat_map(|c| graph.class(c).interfaces.iter().copied())
            .collect();
        self.interface_closure(direct)
            .into_iter()
            .flat_map(|i| graph.members_of(i))
            .any(|m| {
                m.is_method()
                    && m.name == entry.name
                    && collides(m, entry)
                    && m.data_type() == entry.data_type()
            })
    }

    /// `roots` and every interface they extend, each once.
    fn interface_closure(&self, roots: Vec<ClassId>) -> Vec<ClassId> {
        let mut seen: Vec<ClassId> = Vec::new();
        let mut pending = roots;
        while let Some(interface) = pending.pop() {
            if seen.contains(&interface) {
                continue;
            }
            seen.push(interface);
            pending.extend(self.ctx.graph.class(interface).interfaces.iter().copied());
        }
        seen
    }

    fn report_missing(&mut self, interface: ClassId, span: Span) {
        let interface = self.ctx.graph.qualified_name(interface).to_string();
        self.report(CompilationError::InterfaceMemberMissing { interface, span });
    }

    // ========================================================================
    // Declaration Checks
    // ========================================================================

    /// The nearest member `entry` collides with, in the class itself or,
    /// when `inherited` is set, in an accessible member of a parent.
    fn find_clash(&self, class: ClassId, entry: &MemberEntry, inherited: bool) -> Clash {
        let graph = &self.ctx.graph;
        let clashes = |m: &MemberEntry| !m.is_synthetic() && m.name == entry.name && collides(m, entry);

        if let Some(m) = graph.members_of(class).find(|m| clashes(m)) {
            return Clash::Local(m.id);
        }
        if !inherited {
            return Clash::None;
        }
        for ancestor in graph.ancestors(class).skip(1) {
            let found = graph
                .members_of(ancestor)
                .find(|m| clashes(m) && graph.member_accessible(m.id, Some(class)));
            if let Some(m) = found {
                return Clash::Inherited(m.id);
            }
        }
        Clash::None
    }

    /// Check a method or accessor. Returns false when it must not be
    /// registered. `override` with nothing to override is kept as a new slot.
    fn check_method(
        &mut self,
        item: &DeclaredType<'ast>,
        entry: &mut MemberEntry,
        modifiers: Modifiers,
        role: Role,
        explicit: bool,
    ) -> bool {
        let exempt = explicit || entry.is_constructor() || entry.is_static_constructor();
        let name = entry.name.clone();
        let span = entry.span;

        match self.find_clash(item.class, entry, !exempt) {
            Clash::Local(_) => {
                self.report(CompilationError::MemberConflict { name, span });
                return false;
            }
            Clash::Inherited(base) => {
                let base = self.ctx.graph.member(base);
                let virtual_base = base.is_method() && base.is_virtual();
                let overridable = virtual_base && !base.flags.contains(MemberFlags::FINAL);

                if modifiers.contains(Modifiers::OVERRIDE) {
                    if !overridable {
                        self.report(CompilationError::NothingToOverride { name, span });
                        entry.flags |= MemberFlags::NEW_SLOT;
                    }
                } else if modifiers.contains(Modifiers::NEW) {
                    // Explicitly hidden.
                } else if virtual_base {
                    self.report(CompilationError::MissingOverride { name, span });
                } else if role == Role::Declared {
                    self.report(CompilationError::HidesInherited { name, span });
                }
            }
            Clash::None => {
                if modifiers.contains(Modifiers::OVERRIDE) {
                    self.report(CompilationError::NothingToOverride { name, span });
                    entry.flags |= MemberFlags::NEW_SLOT;
                } else if modifiers.contains(Modifiers::NEW) && role == Role::Declared && !exempt {
                    self.warn(CompilationWarning::UnnecessaryNew { name, span });
                }
            }
        }
        true
    }

    /// Check a field, property, event or enum member. Returns false for a
    /// duplicate.
    ///
    /// A property or event hiding a virtual one of the same kind is left to
    /// its accessors, which report the missing `override`.
    fn check_declared(
        &mut self,
        item: &DeclaredType<'ast>,
        entry: &MemberEntry,
        modifiers: Modifiers,
        inherited: bool,
    ) -> bool {
        let name = entry.name.clone();
        let span = entry.span;

        match self.find_clash(item.class, entry, inherited) {
            Clash::Local(_) => {
                self.report(CompilationError::MemberConflict { name, span });
                return false;
            }
            Clash::Inherited(base) => {
                let graph = &self.ctx.graph;
                let covered = graph.member(base).kind() == entry.kind()
                    && graph.underlying_method(base).is_some_and(MemberEntry::is_virtual);
                if !modifiers.intersects(Modifiers::OVERRIDE | Modifiers::NEW) && !covered {
                    self.report(CompilationError::HidesInherited { name, span });
                }
            }
            Clash::None => {
                if modifiers.contains(Modifiers::NEW) {
                    self.warn(CompilationWarning::UnnecessaryNew { name, span });
                }
            }
        }
        true
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Record a checked member in the class scope, the class graph and the
    /// metadata sink.
    fn register(&mut self, item: &DeclaredType<'ast>, entry: MemberEntry) -> Result<Option<MemberId>, FatalError> {
        if let Err(error) = self.ctx.scopes.declare_member(item.scope, &entry.name, entry.kind()) {
            self.report(error.at(entry.span));
            return Ok(None);
        }

        let id = self.ctx.graph.add_member(entry);
        let member = self.ctx.graph.member(id);
        trace!(
            owner = %self.ctx.graph.qualified_name(member.owner),
            name = %member.name,
            kind = member.kind().as_str(),
            flags = ?member.flags,
            "created member"
        );
        self.ctx.sink.create_member(member)?;
        self.members += 1;
        Ok(Some(id))
    }

    fn resolve(&mut self, res: &ResolutionContext, expr: &TypeExpr) -> DataType {
        match self.ctx.resolve_type(res, expr) {
            Ok(ty) => ty,
            Err(error) => {
                self.report(error);
                DataType::Error
            }
        }
    }

    fn site(
        &mut self,
        sections: &'ast [AttributeSection],
        declaration: Declaration,
        res: ResolutionContext,
        file: &'ast str,
    ) {
        if !sections.is_empty() {
            self.sites.push(AttributeSite {
                sections,
                declaration,
                res,
                file,
            });
        }
    }

    /// Sites for attributes written on parameters. Positions skip
    /// `__arglist`; position 0 is the return value.
    fn param_sites(
        &mut self,
        decls: &'ast [ParamDecl],
        method: MemberId,
        res: ResolutionContext,
        file: &'ast str,
    ) {
        let mut index = 0u16;
        for decl in decls {
            if decl.modifier == ParamDeclModifier::Arglist {
                continue;
            }
            index += 1;
            self.site(&decl.attributes, Declaration::Parameter { method, index }, res, file);
        }
    }

    fn report(&mut self, error: CompilationError) {
        debug!(%error, "member error");
        self.ctx.add_error(error);
    }

    fn warn(&mut self, warning: CompilationWarning) {
        debug!(%warning, "member warning");
        self.ctx.add_warning(warning);
    }
}

/// Member flags for the modifiers written on a method or accessor.
fn method_flags(modifiers: Modifiers) -> MemberFlags {
    let mut flags = MemberFlags::empty();
    if modifiers.contains(Modifiers::STATIC) {
        flags |= MemberFlags::STATIC;
    }
    if modifiers.contains(Modifiers::ABSTRACT) {
        flags |= MemberFlags::ABSTRACT | MemberFlags::VIRTUAL | MemberFlags::NEW_SLOT;
    }
    if modifiers.contains(Modifiers::VIRTUAL) {
        flags |= MemberFlags::VIRTUAL | MemberFlags::NEW_SLOT;
    }
    if modifiers.contains(Modifiers::OVERRIDE) {
        flags |= MemberFlags::VIRTUAL;
        flags.remove(MemberFlags::NEW_SLOT);
        if modifiers.contains(Modifiers::SEALED) {
            flags |= MemberFlags::FINAL;
        }
    }
    flags
}

/// Why the modifiers written on an explicit implementation are not allowed.
fn explicit_modifier_error(modifiers: Modifiers) -> Option<&'static str> {
    if modifiers.contains(Modifiers::STATIC) {
        Some("cannot be static")
    } else if modifiers.contains(Modifiers::ABSTRACT) {
        Some("cannot be abstract")
    } else if modifiers.contains(Modifiers::OVERRIDE) {
        Some("cannot be an override")
    } else if modifiers.contains(Modifiers::VIRTUAL) {
        Some("cannot be virtual")
    } else if modifiers.contains(Modifiers::NEW) {
        Some("cannot hide an inherited member")
    } else if modifiers.intersects(Modifiers::PUBLIC | Modifiers::PROTECTED | Modifiers::INTERNAL) {
        Some("must be private")
    } else {
        None
    }
}

/// Whether two same-named members occupy the same slot. Methods collide
/// when their signatures are identical; indexers when their parameters are.
/// Any other pair of same-named members collides.
fn collides(existing: &MemberEntry, new: &MemberEntry) -> bool {
    match (existing.signature(), new.signature()) {
        (Some(a), Some(b)) => {
            a.params_identical(b)
                && a.vararg == b.vararg
                && (!(existing.is_operator() && new.is_operator()) || a.return_type == b.return_type)
        }
        (None, None) if existing.is_indexer() && new.is_indexer() => existing.params_identical(new),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{MetadataLog, MetadataRecord};
    use crate::corlib;
    use crate::passes::{DeclarePass, GatherPass};
    use classbind_ast::{AccessorDecl, AttributeUse, CompilationUnit, QualifiedName};

    fn make_test_context() -> CompilationContext {
        let mut ctx = CompilationContext::default();
        corlib::install(&mut ctx).unwrap();
        ctx
    }

    fn int() -> TypeExpr {
        TypeExpr::primitive(PrimitiveType::Int32)
    }

    fn method(name: &str) -> MethodDecl {
        MethodDecl::new(name, TypeExpr::void())
    }

    /// Run the three passes over `types`; returns the number of members made.
    fn build(ctx: &mut CompilationContext, types: Vec<TypeDecl>) -> usize {
        let mut unit = CompilationUnit::new("test.cs");
        for decl in types {
            unit = unit.with_type(decl);
        }
        let units = [unit];
        let declared = DeclarePass::new(ctx).run(&units);
        let gathered = GatherPass::new(ctx, &declared.types).run().unwrap();
        MemberPass::new(ctx, &gathered.types).run().unwrap().members
    }

    fn member<'c>(ctx: &'c CompilationContext, class: &str, name: &str) -> &'c MemberEntry {
        let class = ctx.graph.class_by_name(class).unwrap();
        ctx.graph.members_of(class).find(|m| m.name == name).unwrap()
    }

    fn has_member(ctx: &CompilationContext, class: &str, name: &str) -> bool {
        let class = ctx.graph.class_by_name(class).unwrap();
        ctx.graph.members_of(class).any(|m| m.name == name)
    }

    #[test]
    fn field_declarators_and_flags() {
        let mut ctx = make_test_context();
        let fields = FieldDecl::new("a", int())
            .with_name("b")
            .with_modifiers(Modifiers::PUBLIC | Modifiers::VOLATILE);
        let readonly = FieldDecl::new("r", int()).with_modifiers(Modifiers::READONLY);
        let made = build(
            &mut ctx,
            vec![
                TypeDecl::class("C")
                    .with_member(ClassMemberDecl::Field(fields))
                    .with_member(ClassMemberDecl::Field(readonly)),
            ],
        );
        assert_eq!(made, 3);
        let b = member(&ctx, "C", "b");
        assert_eq!(b.visibility, Visibility::Public);
        assert!(b.flags.contains(MemberFlags::VOLATILE));
        let r = member(&ctx, "C", "r");
        assert_eq!(r.visibility, Visibility::Private);
        assert!(r.flags.contains(MemberFlags::INIT_ONLY));
        assert!(!ctx.has_errors());
    }

    #[test]
    fn duplicate_members_conflict() {
        let mut ctx = make_test_context();
        build(
            &mut ctx,
            vec![
                TypeDecl::class("C")
                    .with_member(ClassMemberDecl::Field(FieldDecl::new("x", int())))
                    .with_member(ClassMemberDecl::Method(method("x"))),
            ],
        );
        assert!(matches!(
            ctx.take_errors().as_slice(),
            [CompilationError::MemberConflict { name, .. }] if name == "x"
        ));
        assert_eq!(ctx.graph.class(ctx.graph.class_by_name("C").unwrap()).members.len(), 1);
    }

    #[test]
    fn overloads_differ_by_reference() {
        let mut ctx = make_test_context();
        let by_value = method("M").with_param(ParamDecl::new("a", int()));
        let by_ref = method("M").with_param(ParamDecl::new("a", int()).with_modifier(ParamDeclModifier::Ref));
        let made = build(
            &mut ctx,
            vec![
                TypeDecl::class("C")
                    .with_member(ClassMemberDecl::Method(by_value))
                    .with_member(ClassMemberDecl::Method(by_ref)),
            ],
        );
        assert_eq!(made, 2);
        assert!(!ctx.has_errors());
    }

    #[test]
    fn hiding_needs_new() {
        let mut ctx = make_test_context();
        let public_x = || FieldDecl::new("x", int()).with_modifiers(Modifiers::PUBLIC);
        build(
            &mut ctx,
            vec![
                TypeDecl::class("A").with_member(ClassMemberDecl::Field(public_x())),
                TypeDecl::class("B")
                    .with_base(TypeExpr::named("A"))
                    .with_member(ClassMemberDecl::Field(public_x())),
                TypeDecl::class("C")
                    .with_base(TypeExpr::named("A"))
                    .with_member(ClassMemberDecl::Field(public_x().with_modifiers(Modifiers::NEW))),
                TypeDecl::class("D")
                    .with_member(ClassMemberDecl::Field(public_x().with_modifiers(Modifiers::NEW))),
            ],
        );
        assert!(matches!(
            ctx.take_errors().as_slice(),
            [CompilationError::HidesInherited { name, .. }] if name == "x"
        ));
        assert_eq!(ctx.diagnostics().warning_count(), 1);
        assert!(has_member(&ctx, "B", "x"));
    }

    #[test]
    fn private_base_members_are_not_hidden() {
        let mut ctx = make_test_context();
        build(
            &mut ctx,
            vec![
                TypeDecl::class("A").with_member(ClassMemberDecl::Field(FieldDecl::new("x", int()))),
                TypeDecl::class("B")
                    .with_base(TypeExpr::named("A"))
                    .with_member(ClassMemberDecl::Field(FieldDecl::new("x", int()))),
            ],
        );
        assert!(!ctx.has_errors());
    }

    #[test]
    fn override_rules() {
        let mut ctx = make_test_context();
        let public = Modifiers::PUBLIC;
        build(
            &mut ctx,
            vec![
                TypeDecl::class("A")
                    .with_member(ClassMemberDecl::Method(method("M").with_modifiers(public | Modifiers::VIRTUAL))),
                TypeDecl::class("B")
                    .with_base(TypeExpr::named("A"))
                    .with_member(ClassMemberDecl::Method(method("M").with_modifiers(public | Modifiers::OVERRIDE))),
                TypeDecl::class("C")
                    .with_base(TypeExpr::named("A"))
                    .with_member(ClassMemberDecl::Method(method("M").with_modifiers(public))),
                TypeDecl::class("D")
                    .with_base(TypeExpr::named("A"))
                    .with_member(ClassMemberDecl::Method(method("N").with_modifiers(public | Modifiers::OVERRIDE))),
            ],
        );

        let a = member(&ctx, "A", "M");
        assert!(a.is_virtual() && a.is_new_slot());
        let b = member(&ctx, "B", "M");
        assert!(b.flags.is_override());

        let errors = ctx.take_errors();
        assert_eq!(errors.len(), 2);
        assert!(matches!(&errors[0], CompilationError::MissingOverride { name, .. } if name == "M"));
        assert!(matches!(&errors[1], CompilationError::NothingToOverride { name, .. } if name == "N"));
        assert!(member(&ctx, "D", "N").is_new_slot());
    }

    #[test]
    fn constructors_do_not_hide() {
        let mut ctx = make_test_context();
        build(
            &mut ctx,
            vec![
                TypeDecl::class("A")
                    .with_member(ClassMemberDecl::Method(MethodDecl::constructor().with_modifiers(Modifiers::PUBLIC))),
                TypeDecl::class("B")
                    .with_base(TypeExpr::named("A"))
                    .with_member(ClassMemberDecl::Method(MethodDecl::constructor().with_modifiers(Modifiers::PUBLIC))),
            ],
        );
        assert!(!ctx.has_errors());
        let ctor = member(&ctx, "B", ".ctor");
        assert!(ctor.is_constructor());
        assert!(ctor.flags.contains(MemberFlags::RT_SPECIAL_NAME));
    }

    #[test]
    fn explicit_interface_implementation() {
        let mut ctx = make_test_context();
        build(
            &mut ctx,
            vec![
                TypeDecl::interface("I").with_member(ClassMemberDecl::Method(method("M"))),
                TypeDecl::class("C")
                    .with_base(TypeExpr::named("I"))
                    .with_member(ClassMemberDecl::Method(method("M").implementing(TypeExpr::named("I")))),
            ],
        );
        assert!(!ctx.has_errors());

        let target = member(&ctx, "I", "M");
        assert_eq!(target.visibility, Visibility::Public);
        assert!(target.flags.contains(MemberFlags::ABSTRACT));
        let target = target.id;

        let implementation = member(&ctx, "C", "I.M");
        assert_eq!(implementation.visibility, Visibility::Private);
        assert!(implementation.flags.contains(MemberFlags::FINAL | MemberFlags::VIRTUAL));
        assert!(matches!(
            implementation.data,
            MemberData::Method { implements: Some(id), .. } if id == target
        ));
    }

    #[test]
    fn explicit_implementation_errors() {
        let mut ctx = make_test_context();
        build(
            &mut ctx,
            vec![
                TypeDecl::interface("I").with_member(ClassMemberDecl::Method(method("M"))),
                TypeDecl::interface("J")
                    .with_member(ClassMemberDecl::Method(method("M").implementing(TypeExpr::named("I")))),
                TypeDecl::class("K"),
                TypeDecl::class("C")
                    .with_base(TypeExpr::named("I"))
                    .with_member(ClassMemberDecl::Method(method("M").implementing(TypeExpr::named("K"))))
                    .with_member(ClassMemberDecl::Method(method("Missing").implementing(TypeExpr::named("I")))),
            ],
        );
        let errors = ctx.take_errors();
        assert!(matches!(errors[0], CompilationError::ExplicitImplInInterface { .. }));
        assert!(matches!(&errors[1], CompilationError::NotAnInterface { name, .. } if name == "K"));
        assert!(matches!(&errors[2], CompilationError::InterfaceMemberMissing { interface, .. } if interface == "I"));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn public_methods_implicitly_implement() {
        let mut ctx = make_test_context();
        build(
            &mut ctx,
            vec![
                TypeDecl::interface("I").with_member(ClassMemberDecl::Method(method("M"))),
                TypeDecl::class("C")
                    .with_base(TypeExpr::named("I"))
                    .with_member(ClassMemberDecl::Method(method("M").with_modifiers(Modifiers::PUBLIC))),
            ],
        );
        let m = member(&ctx, "C", "M");
        assert!(m.flags.contains(MemberFlags::VIRTUAL | MemberFlags::NEW_SLOT | MemberFlags::FINAL));
    }

    #[test]
    fn property_accessors() {
        let mut ctx = make_test_context();
        let property = PropertyDecl::new("P", int()).with_modifiers(Modifiers::PUBLIC);
        let made = build(
            &mut ctx,
            vec![TypeDecl::class("C").with_member(ClassMemberDecl::Property(property))],
        );
        assert_eq!(made, 3);

        let getter = member(&ctx, "C", "get_P");
        assert_eq!(getter.data_type(), &DataType::Primitive(PrimitiveType::Int32));
        assert!(getter.flags.contains(MemberFlags::SPECIAL_NAME));
        let setter = member(&ctx, "C", "set_P");
        assert_eq!(setter.params()[0].name, "value");
        assert!(setter.data_type().is_void());

        let p = member(&ctx, "C", "P");
        assert_eq!(p.accessors(), [Some(getter.id), Some(setter.id)]);
        assert_eq!(p.visibility, Visibility::Public);
    }

    #[test]
    fn indexer_setter_takes_index_then_value() {
        let mut ctx = make_test_context();
        let indexer = PropertyDecl::indexer(TypeExpr::named("string"), vec![ParamDecl::new("i", int())]);
        build(&mut ctx, vec![TypeDecl::class("C").with_member(ClassMemberDecl::Property(indexer))]);
        let names: Vec<_> = member(&ctx, "C", "set_Item").params().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["i", "value"]);
        assert!(member(&ctx, "C", "Item").is_indexer());
    }

    #[test]
    fn arglist_placement() {
        let mut ctx = make_test_context();
        let last = method("Last")
            .with_param(ParamDecl::new("a", int()))
            .with_param(ParamDecl::arglist());
        let first = method("First")
            .with_param(ParamDecl::arglist())
            .with_param(ParamDecl::new("a", int()));
        let indexer = PropertyDecl::indexer(int(), vec![ParamDecl::new("i", int()), ParamDecl::arglist()]);
        build(
            &mut ctx,
            vec![
                TypeDecl::class("C")
                    .with_member(ClassMemberDecl::Method(last))
                    .with_member(ClassMemberDecl::Method(first))
                    .with_member(ClassMemberDecl::Property(indexer)),
            ],
        );

        let last = member(&ctx, "C", "Last");
        assert!(last.flags.contains(MemberFlags::VARARG));
        assert_eq!(last.params().len(), 1);
        let errors = ctx.take_errors();
        assert!(matches!(errors[0], CompilationError::ArglistNotLast { .. }));
        assert!(matches!(errors[1], CompilationError::ArglistInIndexer { .. }));
    }

    #[test]
    fn params_arrays_get_the_attribute() {
        let mut ctx = make_test_context();
        let m = method("M")
            .with_param(ParamDecl::new("format", TypeExpr::named("string")))
            .with_param(ParamDecl::new("args", TypeExpr::array(int())).with_modifier(ParamDeclModifier::Params));
        build(&mut ctx, vec![TypeDecl::class("C").with_member(ClassMemberDecl::Method(m))]);

        let m = member(&ctx, "C", "M");
        assert!(m.signature().unwrap().has_param_array());
        let attribute = &m.attributes[0];
        assert_eq!(attribute.target, ProgramItem::Parameter { method: m.id, index: 2 });
        assert_eq!(Some(attribute.attribute_class), ctx.well_known(WellKnown::ParamArray));
        assert_eq!(attribute.blob, blob::empty());
    }

    #[test]
    fn field_like_events() {
        let mut ctx = make_test_context();
        let event = EventDecl::new("Click", TypeExpr::named("Handler")).with_modifiers(Modifiers::PUBLIC);
        build(
            &mut ctx,
            vec![
                TypeDecl::delegate("Handler", TypeExpr::void(), Vec::new()),
                TypeDecl::class("C").with_member(ClassMemberDecl::Event(event)),
            ],
        );
        assert!(!ctx.has_errors());

        let add = member(&ctx, "C", "add_Click");
        assert_eq!(add.params()[0].name, "value");
        assert!(has_member(&ctx, "C", "remove_Click"));

        let c = ctx.graph.class_by_name("C").unwrap();
        let backing = ctx
            .graph
            .members_of(c)
            .find(|m| m.name == "Click" && m.is_synthetic())
            .unwrap();
        assert_eq!(backing.visibility, Visibility::Private);
    }

    #[test]
    fn event_errors() {
        let mut ctx = make_test_context();
        build(
            &mut ctx,
            vec![
                TypeDecl::class("C")
                    .with_member(ClassMemberDecl::Event(EventDecl::new("E", int())))
                    .with_member(ClassMemberDecl::Event(EventDecl::new("value", int()).with_accessors())),
            ],
        );
        let errors = ctx.take_errors();
        assert!(matches!(&errors[0], CompilationError::NotADelegate { name, .. } if name == "int"));
        assert!(matches!(errors[1], CompilationError::EventNamedValue { .. }));
        assert!(has_member(&ctx, "C", "E"));
        assert!(!has_member(&ctx, "C", "add_value"));
    }

    #[test]
    fn enum_member_values() {
        let mut ctx = make_test_context();
        let e = TypeDecl::enumeration("E")
            .with_member(ClassMemberDecl::EnumMember(EnumMemberDecl::new("A")))
            .with_member(ClassMemberDecl::EnumMember(EnumMemberDecl::new("B").with_value(Expr::int(5))))
            .with_member(ClassMemberDecl::EnumMember(EnumMemberDecl::new("C")))
            .with_member(ClassMemberDecl::EnumMember(
                EnumMemberDecl::new("D").with_value(Expr::Name(QualifiedName::from("A"))),
            ))
            .with_member(ClassMemberDecl::EnumMember(EnumMemberDecl::new("value__")));
        build(&mut ctx, vec![e]);

        let value = |name| match &member(&ctx, "E", name).data {
            MemberData::Field { constant, .. } => constant.clone(),
            _ => None,
        };
        assert_eq!(value("A"), Some(ConstValue::Int32(0)));
        assert_eq!(value("B"), Some(ConstValue::Int32(5)));
        assert_eq!(value("C"), Some(ConstValue::Int32(6)));
        assert_eq!(value("D"), Some(ConstValue::Int32(0)));

        let backing = member(&ctx, "E", "value__");
        assert!(backing.is_synthetic() && !backing.is_static());
        assert!(member(&ctx, "E", "B").flags.contains(MemberFlags::LITERAL | MemberFlags::STATIC));
        assert!(matches!(
            ctx.take_errors().as_slice(),
            [CompilationError::ReservedEnumMember { .. }]
        ));
    }

    #[test]
    fn delegate_runtime_members() {
        let mut ctx = make_test_context();
        let made = build(
            &mut ctx,
            vec![TypeDecl::delegate("D", int(), vec![ParamDecl::new("x", TypeExpr::named("string"))])],
        );
        assert_eq!(made, 2);

        let ctor = member(&ctx, "D", ".ctor");
        assert!(ctor.flags.contains(MemberFlags::RUNTIME));
        assert_eq!(ctor.params()[1].ty, DataType::Primitive(PrimitiveType::NativeInt));
        let invoke = member(&ctx, "D", "Invoke");
        assert!(invoke.is_virtual());
        assert_eq!(invoke.data_type(), &DataType::Primitive(PrimitiveType::Int32));
        assert_eq!(invoke.params()[0].ty, ctx.well_known_type(WellKnown::String));
    }

    #[test]
    fn sites_record_attributed_declarations() {
        let mut ctx = make_test_context();
        let section = || AttributeSection::new(vec![AttributeUse::new("Obsolete", Vec::new())]);
        let mut property = PropertyDecl::new("P", int());
        property.setter = Some(AccessorDecl {
            attributes: vec![section().with_target("param")],
            span: Span::default(),
        });
        let units = [CompilationUnit::new("a.cs").with_type(
            TypeDecl::class("C")
                .with_attributes(section())
                .with_member(ClassMemberDecl::Method(
                    method("M").with_param(ParamDecl::new("a", int()).with_attributes(section())),
                ))
                .with_member(ClassMemberDecl::Property(property)),
        )];
        let declared = DeclarePass::new(&mut ctx).run(&units);
        let gathered = GatherPass::new(&mut ctx, &declared.types).run().unwrap();
        let output = MemberPass::new(&mut ctx, &gathered.types).run().unwrap();

        let m = member(&ctx, "C", "M").id;
        let setter = member(&ctx, "C", "set_P").id;
        let c = ctx.graph.class_by_name("C").unwrap();
        let declarations: Vec<_> = output.sites.iter().map(|s| s.declaration).collect();
        assert_eq!(
            declarations,
            vec![
                Declaration::Parameter { method: m, index: 1 },
                Declaration::Accessor { method: setter, value: Some(1) },
                Declaration::Type { class: c, invoke: None },
            ]
        );
    }

    #[test]
    fn members_reach_the_sink() {
        let log = MetadataLog::new();
        let mut ctx = CompilationContext::default().with_metadata_sink(log.clone());
        corlib::install(&mut ctx).unwrap();
        build(
            &mut ctx,
            vec![TypeDecl::class("C").with_member(ClassMemberDecl::Field(FieldDecl::new("f", int())))],
        );
        let c = ctx.graph.class_by_name("C").unwrap();
        assert!(log.records().contains(&MetadataRecord::Member {
            owner: c,
            name: "f".to_string(),
            kind: classbind_core::MemberKind::Field,
        }));
    }

    #[test]
    fn sink_failure_aborts() {
        let mut ctx = CompilationContext::default();
        let units = [CompilationUnit::new("a.cs")
            .with_type(TypeDecl::class("C").with_member(ClassMemberDecl::Field(FieldDecl::new("f", int()))))];
        let declared = DeclarePass::new(&mut ctx).run(&units);
        let gathered = GatherPass::new(&mut ctx, &declared.types).run().unwrap();
        let mut ctx = ctx.with_metadata_sink(MetadataLog::new().fail_after(0));
        let result = MemberPass::new(&mut ctx, &gathered.types).run();
        assert!(matches!(result, Err(FatalError::OutOfMemory { .. })));
    }
}
