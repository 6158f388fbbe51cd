//! Scope Tree - hierarchical name table for namespaces and types.
//!
//! Uses `petgraph::DiGraph` with:
//! - Nodes: [`ScopeData`] (a namespace, or the scope of one class)
//! - Edges: `Contains(name)` from a scope to each child namespace or type
//!
//! Namespaces and types share one name table per scope, so a type cannot
//! reuse a namespace's name and vice versa. Class scopes also remember the
//! names of their members so a member cannot reuse a nested type's name.
//!
//! `using` directives are not edges: they are lexical and belong to one file.
//! They live in [`DirectiveBlock`]s, one per namespace block per file, linked
//! outward to the enclosing block.

use classbind_core::{ClassId, CompilationError, MemberKind, Span};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::trace;

// ============================================================================
// Errors
// ============================================================================

/// A declaration rejected by the scope tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("`{name}' is not a valid namespace")]
    InvalidNamespace { name: String },

    #[error("`{name}' cannot be declared as a type because it is already declared as namespace")]
    TypeIsNamespace { name: String },

    #[error("`{name}' conflicts with imported type")]
    ImportedTypeConflict { name: String },

    #[error("`{name}' is already declared")]
    AlreadyDeclared { name: String, previous: Span },

    #[error("member `{name}' conflicts with a type name in the same scope")]
    MemberConflictsWithType { name: String },
}

impl ScopeError {
    /// Attach a location, producing a reportable error.
    pub fn at(self, span: Span) -> CompilationError {
        match self {
            ScopeError::InvalidNamespace { name } => CompilationError::InvalidNamespace { name, span },
            ScopeError::TypeIsNamespace { name } => CompilationError::TypeIsNamespace { name, span },
            ScopeError::ImportedTypeConflict { name } => {
                CompilationError::ImportedTypeConflict { name, span }
            }
            ScopeError::AlreadyDeclared { name, previous } => CompilationError::AlreadyDeclared {
                name,
                previous,
                span,
            },
            ScopeError::MemberConflictsWithType { name } => {
                CompilationError::MemberConflictsWithType { name, span }
            }
        }
    }
}

// ============================================================================
// Graph Data
// ============================================================================

/// What a scope node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Namespace,
    Class(ClassId),
}

/// Data stored in each scope node.
#[derive(Debug)]
pub struct ScopeData {
    pub kind: ScopeKind,
    /// Where the type was declared; unknown for namespaces and imports.
    pub span: Span,
    /// Registered from a referenced unit.
    pub imported: bool,
    /// Member names declared directly in a class scope.
    members: FxHashMap<String, MemberKind>,
}

impl ScopeData {
    fn namespace() -> Self {
        Self {
            kind: ScopeKind::Namespace,
            span: Span::default(),
            imported: false,
            members: FxHashMap::default(),
        }
    }

    fn class(class: ClassId, span: Span, imported: bool) -> Self {
        Self {
            kind: ScopeKind::Class(class),
            span,
            imported,
            members: FxHashMap::default(),
        }
    }

    pub fn is_namespace(&self) -> bool {
        self.kind == ScopeKind::Namespace
    }

    pub fn class_id(&self) -> Option<ClassId> {
        match self.kind {
            ScopeKind::Class(id) => Some(id),
            ScopeKind::Namespace => None,
        }
    }

    /// Kind of the first member declared with `name`.
    pub fn member(&self, name: &str) -> Option<MemberKind> {
        self.members.get(name).copied()
    }
}

/// Edge types in the scope graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeEdge {
    /// Parent scope contains a child namespace or type with this simple name.
    Contains(String),
}

/// A child found by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeEntry {
    Namespace(NodeIndex),
    Type { class: ClassId, scope: NodeIndex },
}

// ============================================================================
// Directive Blocks
// ============================================================================

/// Index of a [`DirectiveBlock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub u32);

/// What a `using X = ...;` alias names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasTarget {
    Namespace(NodeIndex),
    Type(ClassId),
}

/// The `using` directives in effect for one namespace block of one file.
#[derive(Debug, Clone)]
pub struct DirectiveBlock {
    /// Namespace the block declares into.
    pub namespace: NodeIndex,
    /// The block this one is lexically nested in.
    pub enclosing: Option<BlockId>,
    usings: Vec<NodeIndex>,
    aliases: Vec<(String, AliasTarget)>,
}

impl DirectiveBlock {
    /// Imported namespaces in directive order.
    pub fn usings(&self) -> &[NodeIndex] {
        &self.usings
    }

    pub fn alias(&self, name: &str) -> Option<AliasTarget> {
        self.aliases
            .iter()
            .find(|(alias, _)| alias == name)
            .map(|(_, target)| *target)
    }
}

// ============================================================================
// Scope Tree
// ============================================================================

/// Hierarchical name table: namespace → class → nested class.
pub struct ScopeTree {
    graph: DiGraph<ScopeData, ScopeEdge>,
    root: NodeIndex,
    /// Reverse index: class → its scope node.
    class_scopes: FxHashMap<ClassId, NodeIndex>,
    blocks: Vec<DirectiveBlock>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    /// Create a tree with just the global namespace.
    pub fn new() -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(ScopeData::namespace());
        Self {
            graph,
            root,
            class_scopes: FxHashMap::default(),
            blocks: Vec::new(),
        }
    }

    /// The global namespace.
    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn scope(&self, node: NodeIndex) -> Option<&ScopeData> {
        self.graph.node_weight(node)
    }

    pub fn is_namespace(&self, node: NodeIndex) -> bool {
        self.scope(node).is_some_and(ScopeData::is_namespace)
    }

    /// Find a child scope by simple name.
    pub fn find_child(&self, parent: NodeIndex, name: &str) -> Option<NodeIndex> {
        self.graph.edges(parent).find_map(|edge| match edge.weight() {
            ScopeEdge::Contains(child) if child == name => Some(edge.target()),
            _ => None,
        })
    }

    /// Find a child and classify it.
    pub fn lookup(&self, parent: NodeIndex, name: &str) -> Option<ScopeEntry> {
        let child = self.find_child(parent, name)?;
        Some(match self.graph[child].kind {
            ScopeKind::Namespace => ScopeEntry::Namespace(child),
            ScopeKind::Class(class) => ScopeEntry::Type { class, scope: child },
        })
    }

    /// Find the containing scope of a node.
    pub fn find_parent(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .edges_directed(node, Direction::Incoming)
            .next()
            .map(|edge| edge.source())
    }

    /// The simple name of a scope; `None` for the root.
    pub fn scope_name(&self, node: NodeIndex) -> Option<&str> {
        self.graph
            .edges_directed(node, Direction::Incoming)
            .next()
            .map(|edge| match edge.weight() {
                ScopeEdge::Contains(name) => name.as_str(),
            })
    }

    /// Dotted path from the root to a scope; empty for the root.
    pub fn namespace_path(&self, node: NodeIndex) -> String {
        let mut path = Vec::new();
        let mut current = node;
        while let Some(parent) = self.find_parent(current) {
            if let Some(name) = self.scope_name(current) {
                path.push(name);
            }
            current = parent;
        }
        path.reverse();
        path.join(".")
    }

    /// Look up an existing namespace by dotted path. The empty path is the root.
    pub fn find_namespace(&self, path: &str) -> Option<NodeIndex> {
        if path.is_empty() {
            return Some(self.root);
        }
        let mut current = self.root;
        for segment in path.split('.') {
            current = self.find_child(current, segment)?;
            if !self.is_namespace(current) {
                return None;
            }
        }
        Some(current)
    }

    // ========================================================================
    // Declaration
    // ========================================================================

    /// Declare (or reopen) a namespace path below `parent`.
    ///
    /// Fails if any segment already names a type.
    pub fn declare_namespace<S: AsRef<str>>(
        &mut self,
        parent: NodeIndex,
        path: &[S],
    ) -> Result<NodeIndex, ScopeError> {
        let mut current = parent;
        for segment in path {
            let segment = segment.as_ref();
            current = match self.find_child(current, segment) {
                Some(child) if self.is_namespace(child) => child,
                Some(_) => {
                    return Err(ScopeError::InvalidNamespace {
                        name: segment.to_string(),
                    });
                }
                None => {
                    let child = self.graph.add_node(ScopeData::namespace());
                    self.graph
                        .add_edge(current, child, ScopeEdge::Contains(segment.to_string()));
                    child
                }
            };
        }
        Ok(current)
    }

    /// Declare a type in `parent` (a namespace or an enclosing class) and
    /// return the type's own scope.
    pub fn declare_type(
        &mut self,
        parent: NodeIndex,
        name: &str,
        class: ClassId,
        span: Span,
        imported: bool,
    ) -> Result<NodeIndex, ScopeError> {
        if let Some(existing) = self.find_child(parent, name) {
            let data = &self.graph[existing];
            let name = self.qualify(parent, name);
            return Err(match data.kind {
                ScopeKind::Namespace => ScopeError::TypeIsNamespace { name },
                ScopeKind::Class(_) if data.imported => ScopeError::ImportedTypeConflict { name },
                ScopeKind::Class(_) => ScopeError::AlreadyDeclared {
                    name,
                    previous: data.span,
                },
            });
        }

        let child = self.graph.add_node(ScopeData::class(class, span, imported));
        self.graph
            .add_edge(parent, child, ScopeEdge::Contains(name.to_string()));
        self.class_scopes.insert(class, child);
        trace!(name, ?class, "declared type");
        Ok(child)
    }

    /// Record a member name in a class scope.
    ///
    /// Overloads are fine; only a clash with a nested type is rejected.
    pub fn declare_member(
        &mut self,
        scope: NodeIndex,
        name: &str,
        kind: MemberKind,
    ) -> Result<(), ScopeError> {
        if self
            .find_child(scope, name)
            .is_some_and(|child| !self.is_namespace(child))
        {
            return Err(ScopeError::MemberConflictsWithType {
                name: name.to_string(),
            });
        }
        if let Some(data) = self.graph.node_weight_mut(scope) {
            data.members.entry(name.to_string()).or_insert(kind);
        }
        Ok(())
    }

    /// The scope node created for a class.
    pub fn class_scope(&self, class: ClassId) -> Option<NodeIndex> {
        self.class_scopes.get(&class).copied()
    }

    fn qualify(&self, parent: NodeIndex, name: &str) -> String {
        let prefix = self.namespace_path(parent);
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        }
    }

    // ========================================================================
    // Directive Blocks
    // ========================================================================

    /// Open a directive block for `namespace`, nested in `enclosing`.
    pub fn open_block(&mut self, namespace: NodeIndex, enclosing: Option<BlockId>) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(DirectiveBlock {
            namespace,
            enclosing,
            usings: Vec::new(),
            aliases: Vec::new(),
        });
        id
    }

    pub fn block(&self, id: BlockId) -> Option<&DirectiveBlock> {
        self.blocks.get(id.0 as usize)
    }

    /// Add a `using` namespace import. Repeats are ignored.
    pub fn add_using(&mut self, block: BlockId, namespace: NodeIndex) {
        if let Some(b) = self.blocks.get_mut(block.0 as usize) {
            if !b.usings.contains(&namespace) {
                b.usings.push(namespace);
            }
        }
    }

    /// Add a `using X = ...;` alias. Returns `false` if the alias already exists.
    pub fn add_alias(&mut self, block: BlockId, name: &str, target: AliasTarget) -> bool {
        match self.blocks.get_mut(block.0 as usize) {
            Some(b) if b.alias(name).is_none() => {
                b.aliases.push((name.to_string(), target));
                true
            }
            _ => false,
        }
    }

    /// Walk from a block outward through its enclosing blocks.
    pub fn blocks_outward(&self, start: BlockId) -> impl Iterator<Item = &DirectiveBlock> {
        std::iter::successors(self.block(start), move |b| {
            b.enclosing.and_then(|id| self.block(id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_tree() -> (ScopeTree, NodeIndex) {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let ns = tree.declare_namespace(root, &["Game", "Entities"]).unwrap();
        (tree, ns)
    }

    #[test]
    fn declare_namespace_reuses_existing_segments() {
        let (mut tree, ns) = make_test_tree();
        let root = tree.root();
        let again = tree.declare_namespace(root, &["Game", "Entities"]).unwrap();
        assert_eq!(ns, again);
        assert_eq!(tree.namespace_path(ns), "Game.Entities");
        assert_eq!(tree.find_namespace("Game.Entities"), Some(ns));
        assert_eq!(tree.find_namespace(""), Some(root));
        assert_eq!(tree.find_namespace("Game.Missing"), None);
    }

    #[test]
    fn declare_type_in_namespace() {
        let (mut tree, ns) = make_test_tree();
        let scope = tree
            .declare_type(ns, "Player", ClassId(0), Span::new(3, 1, 6), false)
            .unwrap();
        assert_eq!(tree.class_scope(ClassId(0)), Some(scope));
        assert_eq!(tree.find_parent(scope), Some(ns));
        assert_eq!(
            tree.lookup(ns, "Player"),
            Some(ScopeEntry::Type {
                class: ClassId(0),
                scope
            })
        );
        assert_eq!(tree.namespace_path(scope), "Game.Entities.Player");
    }

    #[test]
    fn duplicate_type_reports_previous_location() {
        let (mut tree, ns) = make_test_tree();
        tree.declare_type(ns, "Player", ClassId(0), Span::new(3, 1, 6), false)
            .unwrap();
        let err = tree
            .declare_type(ns, "Player", ClassId(1), Span::new(9, 1, 6), false)
            .unwrap_err();
        assert_eq!(
            err,
            ScopeError::AlreadyDeclared {
                name: "Game.Entities.Player".to_string(),
                previous: Span::new(3, 1, 6),
            }
        );
    }

    #[test]
    fn type_conflicting_with_import() {
        let mut tree = ScopeTree::new();
        let system = tree.declare_namespace(tree.root(), &["System"]).unwrap();
        tree.declare_type(system, "Object", ClassId(0), Span::default(), true)
            .unwrap();
        let err = tree
            .declare_type(system, "Object", ClassId(1), Span::new(1, 1, 1), false)
            .unwrap_err();
        assert!(matches!(err, ScopeError::ImportedTypeConflict { .. }));
        assert_eq!(
            err.at(Span::new(1, 1, 1)).to_string(),
            "at 1:1: `System.Object' conflicts with imported type"
        );
    }

    #[test]
    fn type_and_namespace_names_conflict() {
        let (mut tree, _) = make_test_tree();
        let root = tree.root();
        let err = tree
            .declare_type(root, "Game", ClassId(0), Span::default(), false)
            .unwrap_err();
        assert!(matches!(err, ScopeError::TypeIsNamespace { .. }));

        tree.declare_type(root, "Util", ClassId(1), Span::default(), false)
            .unwrap();
        let err = tree.declare_namespace(root, &["Util", "Inner"]).unwrap_err();
        assert_eq!(
            err,
            ScopeError::InvalidNamespace {
                name: "Util".to_string()
            }
        );
    }

    #[test]
    fn member_conflicts_with_nested_type() {
        let (mut tree, ns) = make_test_tree();
        let outer = tree
            .declare_type(ns, "Outer", ClassId(0), Span::default(), false)
            .unwrap();
        tree.declare_type(outer, "Inner", ClassId(1), Span::default(), false)
            .unwrap();

        assert!(tree.declare_member(outer, "Run", MemberKind::Method).is_ok());
        assert!(tree.declare_member(outer, "Run", MemberKind::Method).is_ok());
        assert_eq!(tree.scope(outer).unwrap().member("Run"), Some(MemberKind::Method));
        assert!(matches!(
            tree.declare_member(outer, "Inner", MemberKind::Field),
            Err(ScopeError::MemberConflictsWithType { .. })
        ));
    }

    #[test]
    fn directive_blocks_walk_outward() {
        let (mut tree, ns) = make_test_tree();
        let root = tree.root();
        let file = tree.open_block(root, None);
        let inner = tree.open_block(ns, Some(file));
        tree.add_using(file, ns);
        tree.add_using(file, ns);
        assert!(tree.add_alias(inner, "E", AliasTarget::Namespace(ns)));
        assert!(!tree.add_alias(inner, "E", AliasTarget::Type(ClassId(0))));

        let namespaces: Vec<_> = tree.blocks_outward(inner).map(|b| b.namespace).collect();
        assert_eq!(namespaces, [ns, root]);
        assert_eq!(tree.block(file).unwrap().usings(), &[ns]);
        assert_eq!(
            tree.block(inner).unwrap().alias("E"),
            Some(AliasTarget::Namespace(ns))
        );
    }
}
