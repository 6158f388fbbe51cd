//! ClassGraph - arena of class and member entities.
//!
//! Every [`ClassEntry`] and [`MemberEntry`] created during gathering lives
//! here for the whole compilation. Entities refer to each other by
//! [`ClassId`]/[`MemberId`], so lookups hand out plain indices and the graph
//! can be mutated between passes without invalidating anything.

use rustc_hash::FxHashMap;
use tracing::trace;

use classbind_core::{
    AttachedAttribute, ClassEntry, ClassId, DataType, MemberData, MemberEntry, MemberId,
    ProgramItem, TypeHash, Visibility,
};

/// Storage for all classes and members, plus inheritance queries.
#[derive(Debug, Default)]
pub struct ClassGraph {
    classes: Vec<ClassEntry>,
    members: Vec<MemberEntry>,
    /// Qualified-name hash → class.
    by_hash: FxHashMap<TypeHash, ClassId>,
    assembly_attributes: Vec<AttachedAttribute>,
    module_attributes: Vec<AttachedAttribute>,
}

impl ClassGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Add a class, assigning its id. A nested class is linked into its
    /// nesting parent's `nested` list.
    pub fn add_class(&mut self, mut entry: ClassEntry) -> ClassId {
        let id = ClassId(self.classes.len() as u32);
        entry.id = id;
        self.by_hash.insert(entry.type_hash, id);
        if let Some(outer) = entry.nesting_parent {
            if let Some(outer) = self.classes.get_mut(outer.index()) {
                outer.nested.push(id);
            }
        }
        trace!(name = %entry.qualified_name, ?id, "added class");
        self.classes.push(entry);
        id
    }

    /// Add a member, assigning its id and appending it to its owner.
    pub fn add_member(&mut self, mut entry: MemberEntry) -> MemberId {
        let id = MemberId(self.members.len() as u32);
        entry.id = id;
        if let Some(owner) = self.classes.get_mut(entry.owner.index()) {
            owner.members.push(id);
        }
        self.members.push(entry);
        id
    }

    /// Attach a bound attribute to its target item.
    pub fn attach_attribute(&mut self, attribute: AttachedAttribute) {
        match attribute.target {
            ProgramItem::Assembly => self.assembly_attributes.push(attribute),
            ProgramItem::Module => self.module_attributes.push(attribute),
            ProgramItem::Class(id) => {
                if let Some(class) = self.classes.get_mut(id.index()) {
                    class.attributes.push(attribute);
                }
            }
            ProgramItem::Member(id) | ProgramItem::Parameter { method: id, .. } => {
                if let Some(member) = self.members.get_mut(id.index()) {
                    member.attributes.push(attribute);
                }
            }
        }
    }

    // ==========================================================================
    // Accessors
    // ==========================================================================

    /// Get a class. Ids are only minted by this graph, so indexing is total.
    pub fn class(&self, id: ClassId) -> &ClassEntry {
        &self.classes[id.index()]
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut ClassEntry {
        &mut self.classes[id.index()]
    }

    pub fn get_class(&self, id: ClassId) -> Option<&ClassEntry> {
        self.classes.get(id.index())
    }

    pub fn member(&self, id: MemberId) -> &MemberEntry {
        &self.members[id.index()]
    }

    pub fn member_mut(&mut self, id: MemberId) -> &mut MemberEntry {
        &mut self.members[id.index()]
    }

    pub fn class_by_hash(&self, hash: TypeHash) -> Option<ClassId> {
        self.by_hash.get(&hash).copied()
    }

    /// Look a class up by dotted qualified name.
    pub fn class_by_name(&self, qualified_name: &str) -> Option<ClassId> {
        self.class_by_hash(TypeHash::from_name(qualified_name))
    }

    /// The class a `DataType::Class` refers to.
    pub fn class_of(&self, ty: &DataType) -> Option<ClassId> {
        ty.class_hash().and_then(|h| self.class_by_hash(h))
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassEntry> {
        self.classes.iter()
    }

    pub fn members(&self) -> impl Iterator<Item = &MemberEntry> {
        self.members.iter()
    }

    /// Members declared directly in a class, in declaration order.
    pub fn members_of(&self, class: ClassId) -> impl Iterator<Item = &MemberEntry> {
        self.class(class).members.iter().map(|&m| self.member(m))
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn assembly_attributes(&self) -> &[AttachedAttribute] {
        &self.assembly_attributes
    }

    pub fn module_attributes(&self) -> &[AttachedAttribute] {
        &self.module_attributes
    }

    pub fn qualified_name(&self, class: ClassId) -> &str {
        &self.class(class).qualified_name
    }

    /// Render a type for diagnostics.
    pub fn type_name(&self, ty: &DataType) -> String {
        match ty {
            DataType::Void => "void".to_string(),
            DataType::Primitive(p) => p.keyword().to_string(),
            DataType::Class(hash) => match self.class_by_hash(*hash) {
                Some(id) => self.qualified_name(id).to_string(),
                None => format!("{hash:?}"),
            },
            DataType::Array(element) => format!("{}[]", self.type_name(element)),
            DataType::ByRef(inner) => format!("{} &", self.type_name(inner)),
            DataType::Null => "null".to_string(),
            DataType::Error => "<error>".to_string(),
        }
    }

    // ==========================================================================
    // Member Queries
    // ==========================================================================

    /// The method that carries a member's static/virtual flags: the method
    /// itself, a property's getter (else setter), or an event's add (else
    /// remove) accessor. Fields have none.
    pub fn underlying_method(&self, member: MemberId) -> Option<&MemberEntry> {
        let entry = self.member(member);
        match &entry.data {
            MemberData::Method { .. } => Some(entry),
            MemberData::Property { getter, setter, .. } => getter.or(*setter).map(|m| self.member(m)),
            MemberData::Event { add, remove, .. } => add.or(*remove).map(|m| self.member(m)),
            MemberData::Field { .. } => None,
        }
    }

    /// Whether a member is static, judged through its underlying method for
    /// properties and events.
    pub fn is_static_member(&self, member: MemberId) -> bool {
        let entry = self.member(member);
        match entry.data {
            MemberData::Field { .. } | MemberData::Method { .. } => entry.is_static(),
            _ => self.underlying_method(member).is_some_and(MemberEntry::is_static),
        }
    }

    /// Whether a member overrides an inherited virtual slot.
    pub fn is_override(&self, member: MemberId) -> bool {
        self.underlying_method(member)
            .is_some_and(|m| m.flags.is_override())
    }

    /// Identical parameter lists (by-reference flags included); operators
    /// must also agree on their return type.
    pub fn signature_identical(&self, a: MemberId, b: MemberId) -> bool {
        let (a, b) = (self.member(a), self.member(b));
        if !a.params_identical(b) {
            return false;
        }
        if a.is_operator() && b.is_operator() {
            return a.data_type() == b.data_type();
        }
        true
    }

    // ==========================================================================
    // Inheritance Queries
    // ==========================================================================

    /// Parent chain starting at (and including) `class`.
    pub fn ancestors(&self, class: ClassId) -> impl Iterator<Item = ClassId> + '_ {
        std::iter::successors(Some(class), move |&c| self.class(c).parent)
    }

    /// Whether `ancestor` is `class` or appears in its parent chain.
    pub fn inherits_from(&self, class: ClassId, ancestor: ClassId) -> bool {
        self.ancestors(class).any(|c| c == ancestor)
    }

    /// Whether `class` or any of its parents implements `interface`,
    /// directly or through interface inheritance.
    pub fn implements(&self, class: ClassId, interface: ClassId) -> bool {
        self.ancestors(class)
            .any(|c| self.interface_reaches(c, interface, 0))
    }

    fn interface_reaches(&self, class: ClassId, target: ClassId, depth: usize) -> bool {
        // Gathering breaks cycles, but tolerate malformed imports.
        if depth > self.classes.len() {
            return false;
        }
        self.class(class)
            .interfaces
            .iter()
            .any(|&i| i == target || self.interface_reaches(i, target, depth + 1))
    }

    /// Whether `base` is a proper ancestor of `derived`, by inheritance or
    /// by interface implementation.
    pub fn is_base_type_for(&self, base: ClassId, derived: ClassId) -> bool {
        base != derived && (self.inherits_from(derived, base) || self.implements(derived, base))
    }

    /// Whether `class` is nested, at any depth, inside `outer`.
    pub fn is_nested_in(&self, class: ClassId, outer: ClassId) -> bool {
        std::iter::successors(self.class(class).nesting_parent, |&c| {
            self.class(c).nesting_parent
        })
        .any(|c| c == outer)
    }

    // ==========================================================================
    // Accessibility
    // ==========================================================================

    /// Whether an item with `visibility` declared in `owner` can be reached
    /// from code in `from` (`None` means from outside any class).
    pub fn is_accessible(&self, visibility: Visibility, owner: ClassId, from: Option<ClassId>) -> bool {
        let internal = || !self.class(owner).is_imported();
        let within = |target: ClassId| {
            from.is_some_and(|f| f == target || self.is_nested_in(f, target))
        };
        let derived = || {
            from.is_some_and(|f| {
                std::iter::successors(Some(f), |&c| self.class(c).nesting_parent)
                    .any(|c| self.inherits_from(c, owner))
            })
        };
        match visibility {
            Visibility::Public => true,
            Visibility::Private => within(owner),
            Visibility::Protected => derived(),
            Visibility::Internal => internal(),
            Visibility::ProtectedInternal => internal() || derived(),
        }
    }

    pub fn member_accessible(&self, member: MemberId, from: Option<ClassId>) -> bool {
        let entry = self.member(member);
        self.is_accessible(entry.visibility, entry.owner, from)
    }

    /// Top-level types are visible unless they are non-public imports; nested
    /// types are checked against their nesting parent.
    pub fn class_accessible(&self, class: ClassId, from: Option<ClassId>) -> bool {
        let entry = self.class(class);
        match entry.nesting_parent {
            Some(outer) => {
                self.is_accessible(entry.visibility, outer, from) && self.class_accessible(outer, from)
            }
            None => entry.visibility == Visibility::Public || !entry.is_imported(),
        }
    }
}
