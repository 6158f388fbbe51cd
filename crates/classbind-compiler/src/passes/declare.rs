//! Declaration Pass (Pass 1) - declare every type name into the scope tree.
//!
//! Nothing is resolved here. Every namespace block opens a directive block,
//! every type (nested types included) gets its own scope and an unresolved
//! [`ClassEntry`], and `using` directives are queued. The queued directives
//! are bound once every unit has been declared, so a `using` may name a
//! namespace that only a later file introduces.
//!
//! A name collision is reported and the colliding type is skipped together
//! with its nested types. Its siblings are still declared.

use classbind_ast::{CompilationUnit, Item, Modifiers, NamespaceDecl, QualifiedName, TypeDecl, UsingDecl};
use classbind_core::{ClassEntry, ClassFlags, ClassId, ClassKind, CompilationError, Span, Visibility};
use classbind_registry::{AliasTarget, BlockId, NodeIndex};
use tracing::{debug, trace};

use crate::context::{CompilationContext, ResolutionContext};
use crate::lookup::{SemanticValue, try_resolve_qualified_name};

/// A type that made it into the scope tree.
#[derive(Debug, Clone, Copy)]
pub struct DeclaredType<'ast> {
    pub decl: &'ast TypeDecl,
    pub class: ClassId,
    /// The type's own scope.
    pub scope: NodeIndex,
    /// Context the declaration appears in. Base types resolve here.
    pub outer: ResolutionContext,
    pub file: &'ast str,
}

impl DeclaredType<'_> {
    /// Context for the type's body.
    pub fn body(&self) -> ResolutionContext {
        self.outer.within_class(self.class)
    }
}

/// A compilation unit with its file-level directive block.
#[derive(Debug, Clone, Copy)]
pub struct DeclaredUnit<'ast> {
    pub unit: &'ast CompilationUnit,
    pub res: ResolutionContext,
}

/// Output of the declaration pass.
#[derive(Debug, Default)]
pub struct DeclarationOutput<'ast> {
    /// Declared types, outer types before the types nested in them.
    pub types: Vec<DeclaredType<'ast>>,
    pub units: Vec<DeclaredUnit<'ast>>,
}

struct PendingUsing<'ast> {
    block: BlockId,
    using: &'ast UsingDecl,
    file: &'ast str,
}

/// Pass 1: declare namespaces and types.
pub struct DeclarePass<'a, 'ast> {
    ctx: &'a mut CompilationContext,
    file: &'ast str,
    types: Vec<DeclaredType<'ast>>,
    pending_usings: Vec<PendingUsing<'ast>>,
}

impl<'a, 'ast> DeclarePass<'a, 'ast> {
    pub fn new(ctx: &'a mut CompilationContext) -> Self {
        Self {
            ctx,
            file: "",
            types: Vec::new(),
            pending_usings: Vec::new(),
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(units = units.len()))]
    pub fn run(mut self, units: &'ast [CompilationUnit]) -> DeclarationOutput<'ast> {
        let mut declared_units = Vec::with_capacity(units.len());

        for unit in units {
            self.file = &unit.file;
            self.ctx.set_file(Some(unit.file.clone()));

            let root = self.ctx.scopes.root();
            let block = self.ctx.scopes.open_block(root, None);
            self.queue_usings(block, &unit.usings);

            let res = ResolutionContext::at_namespace(root).with_block(block);
            for item in &unit.items {
                self.visit_item(item, res);
            }
            declared_units.push(DeclaredUnit { unit, res });
        }

        self.bind_usings();
        debug!(types = self.types.len(), "declaration pass complete");

        DeclarationOutput {
            types: self.types,
            units: declared_units,
        }
    }

    fn visit_item(&mut self, item: &'ast Item, res: ResolutionContext) {
        match item {
            Item::Namespace(ns) => self.visit_namespace(ns, res),
            Item::Type(decl) => self.declare_type(decl, res, None),
        }
    }

    // ==========================================================================
    // Namespaces
    // ==========================================================================

    /// `namespace A.B { }` is `namespace A { namespace B { } }`: one scope
    /// and one directive block per segment, with the written directives on
    /// the innermost block.
    fn visit_namespace(&mut self, ns: &'ast NamespaceDecl, res: ResolutionContext) {
        let mut namespace = res.namespace;
        let mut block = res.block;

        for segment in &ns.name.segments {
            match self.ctx.scopes.declare_namespace(namespace, &[segment.as_str()]) {
                Ok(node) => namespace = node,
                Err(err) => {
                    self.report(err.at(segment.span));
                    return;
                }
            }
            block = Some(self.ctx.scopes.open_block(namespace, block));
        }
        trace!(namespace = %ns.name, "entered namespace");

        if let Some(block) = block {
            self.queue_usings(block, &ns.usings);
        }

        let inner = ResolutionContext {
            block,
            namespace,
            class: None,
            access_from: None,
        };
        for item in &ns.items {
            self.visit_item(item, inner);
        }
    }

    // ==========================================================================
    // Types
    // ==========================================================================

    fn declare_type(&mut self, decl: &'ast TypeDecl, res: ResolutionContext, outer: Option<ClassId>) {
        let parent_scope = match outer {
            Some(outer) => self.ctx.scopes.class_scope(outer),
            None => Some(res.namespace),
        };
        let Some(parent_scope) = parent_scope else {
            return;
        };

        let default_visibility = if outer.is_some() {
            Visibility::Private
        } else {
            Visibility::Internal
        };
        let namespace = self.ctx.scopes.namespace_path(res.namespace);
        let mut entry = ClassEntry::new(decl.name.as_str(), namespace, decl.kind)
            .with_visibility(decl.modifiers.visibility(default_visibility))
            .with_flags(class_flags(decl))
            .with_span(decl.span);
        if let Some(outer) = outer {
            let outer_name = self.ctx.graph.qualified_name(outer).to_string();
            entry = entry.nested_in(outer, &outer_name);
        }

        // The class graph numbers classes in insertion order.
        let id = ClassId(self.ctx.graph.class_count() as u32);
        let scope = match self
            .ctx
            .scopes
            .declare_type(parent_scope, decl.name.as_str(), id, decl.name.span, false)
        {
            Ok(scope) => scope,
            Err(err) => {
                self.report(err.at(decl.name.span));
                return;
            }
        };
        let class = self.ctx.graph.add_class(entry);
        trace!(name = %self.ctx.graph.qualified_name(class), ?class, "declared type");

        self.types.push(DeclaredType {
            decl,
            class,
            scope,
            outer: res,
            file: self.file,
        });

        let body = res.within_class(class);
        for nested in decl.nested_types() {
            self.declare_type(nested, body, Some(class));
        }
    }

    // ==========================================================================
    // Using Directives
    // ==========================================================================

    fn queue_usings(&mut self, block: BlockId, usings: &'ast [UsingDecl]) {
        for using in usings {
            self.pending_usings.push(PendingUsing {
                block,
                using,
                file: self.file,
            });
        }
    }

    fn bind_usings(&mut self) {
        for pending in std::mem::take(&mut self.pending_usings) {
            self.ctx.set_file(Some(pending.file.to_string()));
            match pending.using {
                UsingDecl::Namespace { path, span } => {
                    match self.ctx.scopes.find_namespace(&path.to_string()) {
                        Some(ns) => self.ctx.scopes.add_using(pending.block, ns),
                        None => self.report(CompilationError::NotDeclared {
                            name: path.to_string(),
                            span: *span,
                        }),
                    }
                }
                UsingDecl::Alias {
                    alias,
                    target,
                    span,
                } => {
                    let Some(resolved) = self.alias_target(pending.block, target) else {
                        continue;
                    };
                    if !self.ctx.scopes.add_alias(pending.block, alias.as_str(), resolved) {
                        self.report(CompilationError::AlreadyDeclared {
                            name: alias.name.clone(),
                            previous: Span::default(),
                            span: *span,
                        });
                    }
                }
            }
        }
    }

    /// An alias target resolves without the directives of its own block.
    fn alias_target(&mut self, block: BlockId, target: &QualifiedName) -> Option<AliasTarget> {
        if let Some(ns) = self.ctx.scopes.find_namespace(&target.to_string()) {
            return Some(AliasTarget::Namespace(ns));
        }

        let directives = self.ctx.scopes.block(block)?;
        let res = ResolutionContext {
            block: directives.enclosing,
            namespace: directives.namespace,
            class: None,
            access_from: None,
        };
        match try_resolve_qualified_name(self.ctx, &res, target) {
            Ok(SemanticValue::Namespace(ns)) => Some(AliasTarget::Namespace(ns)),
            Ok(SemanticValue::Type(class) | SemanticValue::DeferredType(class)) => {
                Some(AliasTarget::Type(class))
            }
            Ok(_) => {
                self.report(CompilationError::NotAType {
                    name: target.to_string(),
                    span: target.span,
                });
                None
            }
            Err(err) => {
                self.report(err);
                None
            }
        }
    }

    fn report(&mut self, error: CompilationError) {
        debug!(%error, "declaration error");
        self.ctx.add_error(error);
    }
}

/// Class flags implied by the declaration's kind and modifiers.
fn class_flags(decl: &TypeDecl) -> ClassFlags {
    let mut flags = ClassFlags::empty();
    if decl.modifiers.contains(Modifiers::ABSTRACT) || decl.kind == ClassKind::Interface {
        flags |= ClassFlags::ABSTRACT;
    }
    if decl.modifiers.contains(Modifiers::SEALED)
        || matches!(decl.kind, ClassKind::Struct | ClassKind::Enum | ClassKind::Delegate)
    {
        flags |= ClassFlags::SEALED;
    }
    if decl.modifiers.contains(Modifiers::STATIC) {
        flags |= ClassFlags::STATIC | ClassFlags::ABSTRACT | ClassFlags::SEALED;
    }
    flags
}
