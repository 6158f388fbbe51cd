//! Gather Pass (Pass 2) - build the base-type graph.
//!
//! Each declared type resolves its base list, recursing into a local base
//! first when that base is still unbuilt. A type therefore always lands in
//! the output after every base it kept. Re-entering a type that is still
//! being built means the base graph is cyclic: the re-entry is reported and
//! the offending edge dropped, so the finished graph is acyclic.
//!
//! While this pass runs, names of declared-but-unbuilt types resolve as
//! deferred references.

use classbind_ast::TypeExpr;
use classbind_core::{ClassId, ClassKind, CompilationError, FatalError, ResolutionState};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use super::DeclaredType;
use crate::context::{CompilationContext, WellKnown};

/// Output of the gather pass.
#[derive(Debug, Default)]
pub struct GatherOutput<'ast> {
    /// Declared types reordered so that bases come before derived types.
    pub types: Vec<DeclaredType<'ast>>,
}

/// Pass 2: resolve base types and create classes.
pub struct GatherPass<'a, 'ast> {
    ctx: &'a mut CompilationContext,
    declared: &'a [DeclaredType<'ast>],
    index: FxHashMap<ClassId, usize>,
    output: Vec<DeclaredType<'ast>>,
}

impl<'a, 'ast> GatherPass<'a, 'ast> {
    pub fn new(ctx: &'a mut CompilationContext, declared: &'a [DeclaredType<'ast>]) -> Self {
        let index = declared
            .iter()
            .enumerate()
            .map(|(i, t)| (t.class, i))
            .collect();
        Self {
            ctx,
            declared,
            index,
            output: Vec::with_capacity(declared.len()),
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(types = self.declared.len()))]
    pub fn run(mut self) -> Result<GatherOutput<'ast>, FatalError> {
        #[cfg(feature = "profiling")]
        profiling::scope!("gather_types");

        self.ctx.gathering = true;
        let result = (0..self.declared.len()).try_for_each(|i| self.create_type(i));
        self.ctx.gathering = false;
        result?;

        debug!(types = self.output.len(), "gather pass complete");
        Ok(GatherOutput { types: self.output })
    }

    /// Build the class for `declared[i]`, bases first.
    fn create_type(&mut self, i: usize) -> Result<(), FatalError> {
        let item = self.declared[i];
        let class = item.class;
        self.ctx.set_file(Some(item.file.to_string()));

        match self.ctx.graph.class(class).state {
            ResolutionState::Resolved => return Ok(()),
            ResolutionState::InProgress => {
                let name = self.ctx.graph.qualified_name(class).to_string();
                self.report(CompilationError::RecursiveDefinition {
                    name,
                    span: item.decl.name.span,
                });
                return Ok(());
            }
            ResolutionState::Unresolved => {}
        }
        self.ctx.graph.class_mut(class).state = ResolutionState::InProgress;

        let is_interface = item.decl.kind == ClassKind::Interface;
        let mut parent: Option<ClassId> = None;
        let mut interfaces: Vec<ClassId> = Vec::new();

        for base_expr in &item.decl.bases {
            let Some(base) = self.resolve_base(&item, base_expr)? else {
                continue;
            };
            self.ctx.set_file(Some(item.file.to_string()));

            let base_entry = self.ctx.graph.class(base);
            if base_entry.state == ResolutionState::InProgress {
                // The cycle was reported on re-entry; leave this edge out.
                continue;
            }
            if base_entry.is_interface() {
                if !interfaces.contains(&base) {
                    interfaces.push(base);
                }
            } else if is_interface {
                let name = self.ctx.graph.qualified_name(class).to_string();
                self.report(CompilationError::InterfaceInheritsClass {
                    name,
                    span: base_expr.span(),
                });
            } else if parent.is_some() {
                let name = self.ctx.graph.qualified_name(class).to_string();
                self.report(CompilationError::MultipleClassBases {
                    name,
                    span: base_expr.span(),
                });
            } else {
                parent = Some(base);
            }
        }

        if parent.is_none() && !is_interface {
            parent = self.default_parent(class, item.decl.kind);
        }
        if let Some(p) = parent {
            if self.ctx.graph.class(p).is_sealed() {
                let parent_name = self.ctx.graph.qualified_name(p).to_string();
                self.report(CompilationError::SealedParent {
                    parent: parent_name,
                    span: item.decl.name.span,
                });
            }
        }

        let entry = self.ctx.graph.class_mut(class);
        entry.parent = parent;
        entry.interfaces = interfaces;
        entry.state = ResolutionState::Resolved;
        trace!(
            name = %entry.qualified_name,
            parent = ?entry.parent,
            interfaces = entry.interfaces.len(),
            "created type"
        );

        let entry = self.ctx.graph.class(class);
        self.ctx.sink.create_class(entry)?;
        for &interface in &entry.interfaces {
            self.ctx.sink.attach_interface(entry, interface)?;
        }
        self.output.push(item);

        let nested = self.ctx.graph.class(class).nested.clone();
        for nested in nested {
            if let Some(&n) = self.index.get(&nested) {
                self.create_type(n)?;
            }
        }
        Ok(())
    }

    /// Resolve one base expression to a class, building it first if it is a
    /// local type that has not been built yet.
    fn resolve_base(&mut self, item: &DeclaredType<'ast>, expr: &TypeExpr) -> Result<Option<ClassId>, FatalError> {
        let ty = match self.ctx.resolve_type(&item.outer, expr) {
            Ok(ty) => ty,
            Err(error) => {
                self.report(error);
                return Ok(None);
            }
        };
        let Some(base) = self.ctx.graph.class_of(&ty) else {
            self.report(CompilationError::InvalidBaseType { span: expr.span() });
            return Ok(None);
        };

        if self.ctx.graph.class(base).state != ResolutionState::Resolved {
            if let Some(&n) = self.index.get(&base) {
                self.create_type(n)?;
            }
        }
        Ok(Some(base))
    }

    /// Parent used when the base list names no class.
    fn default_parent(&self, class: ClassId, kind: ClassKind) -> Option<ClassId> {
        let object = self.ctx.well_known(WellKnown::Object);
        if object == Some(class) {
            return None;
        }
        let specific = match kind {
            ClassKind::Struct => self.ctx.well_known(WellKnown::ValueType),
            ClassKind::Enum => self.ctx.well_known(WellKnown::Enum),
            ClassKind::Delegate => self.ctx.well_known(WellKnown::MulticastDelegate),
            ClassKind::Class | ClassKind::Interface => None,
        };
        specific.or(object)
    }

    fn report(&mut self, error: CompilationError) {
        debug!(%error, "gather error");
        self.ctx.add_error(error);
    }
}
