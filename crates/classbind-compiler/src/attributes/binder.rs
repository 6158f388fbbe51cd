//! Attribute Pass (Pass 4) - bind attribute sections to program items.
//!
//! Binding one attribute use takes these steps:
//!
//! 1. Resolve the name, trying it with the attribute suffix appended first.
//!    The class must derive from the attribute base and not be abstract.
//! 2. Check the usage constraint. The usage meta-attribute itself is only
//!    checked for being applied to an attribute class; every other attribute
//!    is checked against the valid-on flags of its nearest constrained
//!    ancestor.
//! 3. Evaluate the arguments as constants and resolve the constructor among
//!    the class's own instance constructors.
//! 4. Coerce each argument to its parameter type, packing trailing
//!    arguments into the `params` array when the constructor was chosen in
//!    expanded form.
//! 5. Serialize into a blob and attach it to the target item.
//!
//! A failure in steps 1 to 5 is reported and skips that attribute only.
//!
//! Class-level sections are bound parents first, and an attribute class is
//! bound before anything using it, so its usage constraint is known when
//! it is checked. Within one site the usage meta-attribute is bound before
//! the other attributes, which lets an attribute class carry itself. A class
//! whose parent or interface is re-entered while its sections are being
//! bound makes the attribute "defined recursively". An attribute class used
//! while its own sections are still being bound is checked against the
//! usage known so far.

use classbind_ast::{AttributeUse, QualifiedName};
use classbind_core::{
    AttachedAttribute, AttributeTargets, AttrMode, ClassId, ClassKind, CompilationError,
    ConstValue, DataType, FatalError, PrimitiveType, ProgramItem, Span,
};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use super::blob::{self, ElementType, Shape};
use super::targets::{self, TargetError};
use super::{AttributeSite, Declaration};
use crate::collaborators::{ApplicableForm, Argument, TypedConstant};
use crate::context::{CompilationContext, ResolutionContext, WellKnown};
use crate::lookup::{try_resolve_constructor, try_resolve_qualified_name};
use crate::passes::DeclaredUnit;

// ============================================================================
// Binding one attribute
// ============================================================================

/// A bound attribute, ready to attach.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub attached: AttachedAttribute,
    /// Valid-on flags recorded by the usage meta-attribute, with the
    /// attribute class they constrain.
    pub usage: Option<(ClassId, AttributeTargets)>,
}

/// Resolve the class an attribute use names.
pub fn resolve_attribute_class(
    ctx: &CompilationContext,
    res: &ResolutionContext,
    name: &QualifiedName,
) -> Result<ClassId, CompilationError> {
    let suffix = ctx.options().attribute_suffix.as_str();
    let written = name.segments.last().map_or("", |s| s.as_str());

    let class = if written.ends_with(suffix) {
        resolve_type_name(ctx, res, name)?
    } else {
        let mut suffixed = name.clone();
        if let Some(last) = suffixed.segments.last_mut() {
            last.name.push_str(suffix);
        }
        match resolve_type_name(ctx, res, &suffixed) {
            Ok(class) => class,
            Err(_) => resolve_type_name(ctx, res, name)?,
        }
    };

    let entry = ctx.graph.class(class);
    let is_attribute = ctx
        .well_known(WellKnown::Attribute)
        .is_some_and(|base| ctx.graph.inherits_from(class, base));
    if !is_attribute {
        return Err(CompilationError::NotAnAttribute {
            name: entry.qualified_name.clone(),
            span: name.span,
        });
    }
    if entry.is_abstract() {
        return Err(CompilationError::AbstractAttribute {
            name: entry.qualified_name.clone(),
            span: name.span,
        });
    }
    Ok(class)
}

fn resolve_type_name(
    ctx: &CompilationContext,
    res: &ResolutionContext,
    name: &QualifiedName,
) -> Result<ClassId, CompilationError> {
    try_resolve_qualified_name(ctx, res, name)?
        .as_type()
        .ok_or_else(|| CompilationError::NotAnAttribute {
            name: name.to_string(),
            span: name.span,
        })
}

/// Bind `attribute`, an application of `class`, to `target`. `kind` is the
/// target kind the usage constraint is checked against.
pub fn bind_attribute(
    ctx: &CompilationContext,
    res: &ResolutionContext,
    attribute: &AttributeUse,
    class: ClassId,
    target: ProgramItem,
    kind: AttributeTargets,
) -> Result<Binding, CompilationError> {
    let graph = &ctx.graph;
    let span = attribute.span;
    let name = || graph.qualified_name(class).to_string();

    let is_usage = ctx.well_known(WellKnown::AttributeUsage) == Some(class);
    let usage_target = if is_usage {
        let constrained = match target {
            ProgramItem::Class(c) => ctx
                .well_known(WellKnown::Attribute)
                .filter(|&base| graph.inherits_from(c, base))
                .map(|_| c),
            _ => None,
        };
        match constrained {
            Some(c) => Some(c),
            None => return Err(CompilationError::UsageOnNonAttribute { name: name(), span }),
        }
    } else {
        let valid_on = graph
            .ancestors(class)
            .find_map(|c| graph.class(c).attribute_usage)
            .unwrap_or(AttributeTargets::ANY);
        if !valid_on.intersects(kind) {
            return Err(CompilationError::AttributeNotValidOn { name: name(), span });
        }
        None
    };

    let values = attribute
        .args
        .iter()
        .map(|arg| ctx.evaluate_constant(res, arg))
        .collect::<Result<Vec<_>, _>>()?;
    let args: Vec<Argument> = values.iter().cloned().map(Argument::constant).collect();

    let constructor = try_resolve_constructor(ctx, res, class, &args, span)?;
    let entry = graph.member(constructor);
    let params = entry.params();
    let expanded = ctx.applicable_form(&args, entry) == Some(ApplicableForm::Expanded);
    trace!(attribute = %name(), ?constructor, expanded, "attribute constructor");

    let mut encoded = Vec::with_capacity(params.len());
    let fixed = if expanded { params.len().saturating_sub(1) } else { params.len() };
    for (param, value) in params.iter().zip(&values).take(fixed) {
        let coerced = coerce(ctx, value, &param.ty, span)?;
        encoded.push((shape_of(ctx, &param.ty, span)?, coerced));
    }
    if expanded {
        let Some(array) = params.last().filter(|_| entry.signature().is_some_and(|s| s.has_param_array()))
        else {
            // A vararg constructor: the extra arguments have no declared type.
            return Err(CompilationError::NotSerializable {
                type_name: "__arglist".to_string(),
                span,
            });
        };
        let element = array.ty.element().cloned().unwrap_or(DataType::Error);
        let items = values[fixed..]
            .iter()
            .map(|value| coerce(ctx, value, &element, span))
            .collect::<Result<Vec<_>, _>>()?;
        encoded.push((shape_of(ctx, &array.ty, span)?, ConstValue::Array(items)));
    }

    let blob = blob::encode(&encoded).map_err(|error| {
        debug!(%error, "attribute blob rejected");
        CompilationError::NotSerializable {
            type_name: name(),
            span,
        }
    })?;

    let usage = usage_target.map(|c| {
        let flags = encoded
            .first()
            .and_then(|(_, value)| value.as_integer())
            .map_or(AttributeTargets::ANY, |bits| AttributeTargets::from_bits_truncate(bits as u32));
        (c, flags)
    });

    Ok(Binding {
        attached: AttachedAttribute {
            target,
            attribute_class: class,
            constructor,
            blob,
        },
        usage,
    })
}

fn coerce(
    ctx: &CompilationContext,
    value: &TypedConstant,
    target: &DataType,
    span: Span,
) -> Result<ConstValue, CompilationError> {
    ctx.coerce_constant(value, target)
        .ok_or_else(|| CompilationError::CannotCoerce {
            from: ctx.graph.type_name(&value.ty),
            to: ctx.graph.type_name(target),
            span,
        })
}

/// How a parameter of type `ty` is written into the blob.
fn shape_of(
    ctx: &CompilationContext,
    ty: &DataType,
    span: Span,
) -> Result<Shape, CompilationError> {
    let shape = match ty {
        DataType::Array(_) => ty.element().and_then(|e| element_type(ctx, e)).map(Shape::Array),
        _ => element_type(ctx, ty).map(Shape::Scalar),
    };
    shape.ok_or_else(|| CompilationError::NotSerializable {
        type_name: ctx.graph.type_name(ty),
        span,
    })
}

fn element_type(ctx: &CompilationContext, ty: &DataType) -> Option<ElementType> {
    match ty {
        DataType::Primitive(p) => match p {
            PrimitiveType::Bool => Some(ElementType::Boolean),
            PrimitiveType::Char => Some(ElementType::Char),
            PrimitiveType::Int8 => Some(ElementType::I1),
            PrimitiveType::UInt8 => Some(ElementType::U1),
            PrimitiveType::Int16 => Some(ElementType::I2),
            PrimitiveType::UInt16 => Some(ElementType::U2),
            PrimitiveType::Int32 => Some(ElementType::I4),
            PrimitiveType::UInt32 => Some(ElementType::U4),
            PrimitiveType::Int64 => Some(ElementType::I8),
            PrimitiveType::UInt64 => Some(ElementType::U8),
            PrimitiveType::Float32 => Some(ElementType::R4),
            PrimitiveType::Float64 => Some(ElementType::R8),
            PrimitiveType::NativeInt | PrimitiveType::NativeUInt => None,
        },
        DataType::Class(_) => {
            let class = ctx.graph.class_of(ty)?;
            if ctx.well_known(WellKnown::String) == Some(class) {
                Some(ElementType::String)
            } else if ctx.well_known(WellKnown::Type) == Some(class) {
                Some(ElementType::Type)
            } else if ctx.graph.class(class).kind == ClassKind::Enum {
                Some(ElementType::I4)
            } else {
                None
            }
        }
        _ => None,
    }
}

// ============================================================================
// Attribute Pass
// ============================================================================

/// Output of the attribute pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AttributeOutput {
    /// Attributes attached.
    pub attached: usize,
    /// Attribute uses reported and skipped.
    pub rejected: usize,
}

/// Pass 4: bind attribute sections.
pub struct AttributePass<'a, 'ast> {
    ctx: &'a mut CompilationContext,
    sites: &'a [AttributeSite<'ast>],
    units: &'a [DeclaredUnit<'ast>],
    /// Index of each type's own site.
    type_sites: FxHashMap<ClassId, usize>,
    output: AttributeOutput,
}

impl<'a, 'ast> AttributePass<'a, 'ast> {
    pub fn new(
        ctx: &'a mut CompilationContext,
        sites: &'a [AttributeSite<'ast>],
        units: &'a [DeclaredUnit<'ast>],
    ) -> Self {
        let type_sites = sites
            .iter()
            .enumerate()
            .filter_map(|(i, site)| match site.declaration {
                Declaration::Type { class, .. } => Some((class, i)),
                _ => None,
            })
            .collect();
        Self {
            ctx,
            sites,
            units,
            type_sites,
            output: AttributeOutput::default(),
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(sites = self.sites.len()))]
    pub fn run(mut self) -> Result<AttributeOutput, FatalError> {
        #[cfg(feature = "profiling")]
        profiling::scope!("bind_attributes");

        let sites = self.sites;
        for site in sites {
            if let Declaration::Type { class, .. } = site.declaration {
                self.visit_class(class)?;
            }
        }
        for site in sites {
            if !matches!(site.declaration, Declaration::Type { .. }) {
                self.apply(site)?;
            }
        }

        let units = self.units;
        for unit in units {
            let site = AttributeSite {
                sections: &unit.unit.attributes,
                declaration: Declaration::Unit,
                res: unit.res,
                file: &unit.unit.file,
            };
            if !site.sections.is_empty() {
                self.apply(&site)?;
            }
        }

        debug!(
            attached = self.output.attached,
            rejected = self.output.rejected,
            "attribute pass complete"
        );
        Ok(self.output)
    }

    /// Bind `class`'s own sections after those of its parent and
    /// interfaces. Returns `false` if the class is already being bound.
    fn visit_class(&mut self, class: ClassId) -> Result<bool, FatalError> {
        match self.ctx.graph.class(class).attr_mode {
            AttrMode::Done => return Ok(true),
            AttrMode::Processing => return Ok(false),
            AttrMode::NotVisited => {}
        }
        self.ctx.graph.class_mut(class).attr_mode = AttrMode::Processing;

        let entry = self.ctx.graph.class(class);
        let bases: Vec<ClassId> = entry.parent.into_iter().chain(entry.interfaces.iter().copied()).collect();
        for base in bases {
            if !self.visit_class(base)? {
                self.report_recursive(base);
            }
        }

        let sites = self.sites;
        if let Some(&i) = self.type_sites.get(&class) {
            self.apply(&sites[i])?;
        }

        self.ctx.graph.class_mut(class).attr_mode = AttrMode::Done;
        Ok(true)
    }

    fn apply(&mut self, site: &AttributeSite<'_>) -> Result<(), FatalError> {
        self.ctx.set_file(Some(site.file.to_string()));
        let mut pending = Vec::new();
        for section in site.sections {
            let keyword = section.target.as_ref().map(|t| t.as_str());
            let (item, kind) = match targets::project(&self.ctx.graph, site.declaration, keyword) {
                Ok(projected) => projected,
                Err(error) => {
                    let target = keyword.unwrap_or_default().to_string();
                    let span = section.target.as_ref().map_or(section.span, |t| t.span);
                    self.output.rejected += section.attributes.len();
                    self.report(match error {
                        TargetError::Unknown => CompilationError::UnknownAttributeTarget { target, span },
                        TargetError::Invalid => CompilationError::InvalidAttributeTarget { target, span },
                    });
                    continue;
                }
            };
            for attribute in &section.attributes {
                match resolve_attribute_class(self.ctx, &site.res, &attribute.name) {
                    Ok(class) => pending.push((attribute, class, item, kind)),
                    Err(error) => self.reject(error),
                }
            }
        }

        // Usage constraints first, so later uses on the same site see them.
        let usage = self.ctx.well_known(WellKnown::AttributeUsage);
        pending.sort_by_key(|&(_, class, ..)| Some(class) != usage);
        for (attribute, class, item, kind) in pending {
            self.apply_one(site, attribute, class, item, kind)?;
        }
        Ok(())
    }

    fn apply_one(
        &mut self,
        site: &AttributeSite<'_>,
        attribute: &AttributeUse,
        class: ClassId,
        item: ProgramItem,
        kind: AttributeTargets,
    ) -> Result<(), FatalError> {
        if !self.visit_class(class)? {
            trace!(
                class = %self.ctx.graph.qualified_name(class),
                "attribute class still being bound, using the usage known so far"
            );
        }
        // Binding the attribute class may have moved to another file.
        self.ctx.set_file(Some(site.file.to_string()));

        match bind_attribute(self.ctx, &site.res, attribute, class, item, kind) {
            Ok(binding) => self.commit(binding),
            Err(error) => {
                self.reject(error);
                Ok(())
            }
        }
    }

    fn commit(&mut self, binding: Binding) -> Result<(), FatalError> {
        self.ctx.sink.attach_attribute_blob(&binding.attached)?;
        if let Some((class, valid_on)) = binding.usage {
            trace!(class = %self.ctx.graph.qualified_name(class), ?valid_on, "attribute usage recorded");
            self.ctx.graph.class_mut(class).attribute_usage = Some(valid_on);
        }
        trace!(
            target = ?binding.attached.target,
            attribute = %self.ctx.graph.qualified_name(binding.attached.attribute_class),
            bytes = binding.attached.blob.len(),
            "attribute attached"
        );
        self.ctx.graph.attach_attribute(binding.attached);
        self.output.attached += 1;
        Ok(())
    }

    /// Report `class` as re-entered through the parent or interface chain
    /// of a class whose sections it is needed for.
    fn report_recursive(&mut self, class: ClassId) {
        let sites = self.sites;
        if let Some(&i) = self.type_sites.get(&class) {
            self.ctx.set_file(Some(sites[i].file.to_string()));
        }
        let entry = self.ctx.graph.class(class);
        let error = CompilationError::RecursiveAttribute {
            name: entry.qualified_name.clone(),
            span: entry.span,
        };
        self.report(error);
    }

    fn reject(&mut self, error: CompilationError) {
        self.output.rejected += 1;
        self.report(error);
    }

    fn report(&mut self, error: CompilationError) {
        debug!(%error, "attribute error");
        self.ctx.add_error(error);
    }
}

/// Bind the sections of a single site. Attribute classes used by it are
/// bound first, as in a full [`AttributePass`].
pub fn apply_attributes(
    ctx: &mut CompilationContext,
    site: &AttributeSite<'_>,
) -> Result<AttributeOutput, FatalError> {
    AttributePass::new(ctx, std::slice::from_ref(site), &[]).run()
}
