//! Class entity.

use crate::{AttributeTargets, ClassFlags, ClassId, ClassKind, MemberId, Span, TypeHash, Visibility};

use super::AttachedAttribute;

/// Progress of building a class's inheritance edges.
///
/// `InProgress` only exists while the gatherer is resolving the class's
/// bases; re-entering a class in that state means the base graph is cyclic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResolutionState {
    #[default]
    Unresolved,
    InProgress,
    Resolved,
}

/// Progress of applying a class's attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AttrMode {
    #[default]
    NotVisited,
    Processing,
    Done,
}

/// A class, struct, interface, enum or delegate.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassEntry {
    /// Arena index, assigned by the class graph.
    pub id: ClassId,
    /// Unqualified name.
    pub name: String,
    /// Dotted namespace (empty for the global namespace).
    pub namespace: String,
    /// Namespace, nesting parents and name joined with `.`.
    pub qualified_name: String,
    /// Identity hash of `qualified_name`.
    pub type_hash: TypeHash,
    pub kind: ClassKind,
    pub visibility: Visibility,
    pub flags: ClassFlags,

    // === Inheritance ===
    /// Class this one is nested inside.
    pub nesting_parent: Option<ClassId>,
    /// Single non-interface base. `None` for interfaces and the root object type.
    pub parent: Option<ClassId>,
    /// Directly implemented (or, for interfaces, extended) interfaces.
    pub interfaces: Vec<ClassId>,

    // === Contents ===
    /// Nested classes in declaration order.
    pub nested: Vec<ClassId>,
    /// Members in declaration order.
    pub members: Vec<MemberId>,
    /// Attributes applied to the class itself.
    pub attributes: Vec<AttachedAttribute>,

    // === Bookkeeping ===
    pub state: ResolutionState,
    pub attr_mode: AttrMode,
    /// Valid-on mask for attribute classes that carry a usage constraint.
    pub attribute_usage: Option<AttributeTargets>,
    /// Where the class was declared (unknown for imported classes).
    pub span: Span,
}

impl ClassEntry {
    /// Create an unresolved class entry.
    pub fn new(name: impl Into<String>, namespace: impl Into<String>, kind: ClassKind) -> Self {
        let name = name.into();
        let namespace = namespace.into();
        let qualified_name = if namespace.is_empty() {
            name.clone()
        } else {
            format!("{namespace}.{name}")
        };
        let type_hash = TypeHash::from_name(&qualified_name);
        Self {
            id: ClassId(0),
            name,
            namespace,
            qualified_name,
            type_hash,
            kind,
            visibility: Visibility::Public,
            flags: ClassFlags::empty(),
            nesting_parent: None,
            parent: None,
            interfaces: Vec::new(),
            nested: Vec::new(),
            members: Vec::new(),
            attributes: Vec::new(),
            state: ResolutionState::Unresolved,
            attr_mode: AttrMode::NotVisited,
            attribute_usage: None,
            span: Span::default(),
        }
    }

    // === Builder Methods ===

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_flags(mut self, flags: ClassFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Set the nesting parent and its qualified name prefix.
    pub fn nested_in(mut self, outer: ClassId, outer_qualified_name: &str) -> Self {
        self.nesting_parent = Some(outer);
        self.qualified_name = format!("{outer_qualified_name}.{}", self.name);
        self.type_hash = TypeHash::from_name(&self.qualified_name);
        self
    }

    pub fn with_parent(mut self, parent: ClassId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_interface(mut self, interface: ClassId) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Mark as loaded from a referenced unit. Imported classes are born resolved.
    pub fn imported(mut self) -> Self {
        self.flags |= ClassFlags::IMPORTED;
        self.state = ResolutionState::Resolved;
        self
    }

    pub fn as_sealed(mut self) -> Self {
        self.flags |= ClassFlags::SEALED;
        self
    }

    pub fn as_abstract(mut self) -> Self {
        self.flags |= ClassFlags::ABSTRACT;
        self
    }

    // === Query Methods ===

    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    pub fn is_delegate(&self) -> bool {
        self.kind == ClassKind::Delegate
    }

    pub fn is_value_type(&self) -> bool {
        self.kind.is_value_type()
    }

    pub fn is_sealed(&self) -> bool {
        self.flags.contains(ClassFlags::SEALED)
    }

    pub fn is_abstract(&self) -> bool {
        self.flags.contains(ClassFlags::ABSTRACT)
    }

    pub fn is_imported(&self) -> bool {
        self.flags.contains(ClassFlags::IMPORTED)
    }

    pub fn is_resolved(&self) -> bool {
        self.state == ResolutionState::Resolved
    }

    /// Attribute target kind for this class.
    pub fn attribute_target(&self) -> AttributeTargets {
        match self.kind {
            ClassKind::Enum => AttributeTargets::ENUM,
            ClassKind::Struct => AttributeTargets::STRUCT,
            ClassKind::Delegate => AttributeTargets::DELEGATE,
            ClassKind::Interface => AttributeTargets::INTERFACE,
            ClassKind::Class => AttributeTargets::CLASS,
        }
    }
}
