//! Name tables and the class graph.
//!
//! ## Modules
//!
//! - [`scope_tree`]: hierarchical namespace/class scopes with declaration-time
//!   conflict detection, plus per-file `using` directive blocks
//! - [`class_graph`]: arena owning every class and member entity, with
//!   inheritance and accessibility queries

pub mod class_graph;
pub mod scope_tree;

pub use class_graph::ClassGraph;
pub use scope_tree::{
    AliasTarget, BlockId, DirectiveBlock, ScopeData, ScopeEdge, ScopeEntry, ScopeError, ScopeKind,
    ScopeTree,
};

pub use petgraph::graph::NodeIndex;
