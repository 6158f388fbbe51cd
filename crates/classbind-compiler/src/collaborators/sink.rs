//! In-memory metadata recorder.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use classbind_core::{
    AttachedAttribute, ClassEntry, ClassId, FatalError, MemberEntry, MemberKind,
};
use tracing::error;

use super::MetadataSink;

/// One record written to a [`MetadataLog`].
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataRecord {
    ImportClass {
        qualified_name: String,
    },
    Class {
        id: ClassId,
        qualified_name: String,
        parent: Option<ClassId>,
    },
    Member {
        owner: ClassId,
        name: String,
        kind: MemberKind,
    },
    Interface {
        class: ClassId,
        interface: ClassId,
    },
    AttributeBlob(AttachedAttribute),
}

/// Records metadata in order. Clones share the same log, so a test can keep
/// a handle after giving the sink to a context.
#[derive(Debug, Clone, Default)]
pub struct MetadataLog {
    records: Rc<RefCell<Vec<MetadataRecord>>>,
    /// Remaining records before allocation "fails"; `None` is unlimited.
    budget: Rc<Cell<Option<usize>>>,
}

impl MetadataLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with [`FatalError::OutOfMemory`] once `records` have been written.
    pub fn fail_after(self, records: usize) -> Self {
        self.budget.set(Some(records));
        self
    }

    pub fn records(&self) -> Vec<MetadataRecord> {
        self.records.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    /// Attribute blobs recorded so far.
    pub fn attribute_blobs(&self) -> Vec<AttachedAttribute> {
        self.records
            .borrow()
            .iter()
            .filter_map(|r| match r {
                MetadataRecord::AttributeBlob(a) => Some(a.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, context: &str, record: MetadataRecord) -> Result<(), FatalError> {
        match self.budget.get() {
            Some(0) => {
                error!(context, "metadata allocation failed");
                return Err(FatalError::OutOfMemory {
                    context: context.to_string(),
                });
            }
            Some(n) => self.budget.set(Some(n - 1)),
            None => {}
        }
        self.records.borrow_mut().push(record);
        Ok(())
    }
}

impl MetadataSink for MetadataLog {
    fn import_class(&mut self, class: &ClassEntry) -> Result<(), FatalError> {
        self.push(
            "importing a class",
            MetadataRecord::ImportClass {
                qualified_name: class.qualified_name.clone(),
            },
        )
    }

    fn create_class(&mut self, class: &ClassEntry) -> Result<(), FatalError> {
        self.push(
            "creating a class",
            MetadataRecord::Class {
                id: class.id,
                qualified_name: class.qualified_name.clone(),
                parent: class.parent,
            },
        )
    }

    fn create_member(&mut self, member: &MemberEntry) -> Result<(), FatalError> {
        self.push(
            "creating a member",
            MetadataRecord::Member {
                owner: member.owner,
                name: member.name.clone(),
                kind: member.kind(),
            },
        )
    }

    fn attach_interface(&mut self, class: &ClassEntry, interface: ClassId) -> Result<(), FatalError> {
        self.push(
            "adding an interface",
            MetadataRecord::Interface {
                class: class.id,
                interface,
            },
        )
    }

    fn attach_attribute_blob(&mut self, attribute: &AttachedAttribute) -> Result<(), FatalError> {
        self.push(
            "attaching an attribute",
            MetadataRecord::AttributeBlob(attribute.clone()),
        )
    }
}
