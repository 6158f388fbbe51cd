//! Method groups.

use classbind_core::{ClassId, MemberId};

use crate::collaborators::ApplicableForm;

/// One candidate in a [`MethodGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupMember {
    pub method: MemberId,
    /// Class the candidate was found through.
    pub owner: ClassId,
    /// How the current argument list binds, once overload resolution has
    /// checked this candidate.
    pub form: Option<ApplicableForm>,
}

/// An ordered set of overload candidates sharing a name.
///
/// A group is built by one lookup and consumed by one overload resolution.
/// Removal keeps the relative order of the remaining candidates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MethodGroup {
    members: Vec<GroupMember>,
}

impl MethodGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Package a single known method as a group.
    pub fn from_method(method: MemberId, owner: ClassId) -> Self {
        let mut group = Self::new();
        group.push(method, owner);
        group
    }

    pub fn push(&mut self, method: MemberId, owner: ClassId) {
        self.members.push(GroupMember {
            method,
            owner,
            form: None,
        });
    }

    /// The `n`-th candidate's method.
    pub fn get(&self, n: usize) -> Option<MemberId> {
        self.members.get(n).map(|m| m.method)
    }

    pub fn member(&self, n: usize) -> Option<&GroupMember> {
        self.members.get(n)
    }

    /// Shift-remove the `n`-th candidate.
    pub fn remove(&mut self, n: usize) -> Option<GroupMember> {
        (n < self.members.len()).then(|| self.members.remove(n))
    }

    pub fn set_form(&mut self, n: usize, form: ApplicableForm) {
        if let Some(member) = self.members.get_mut(n) {
            member.form = Some(form);
        }
    }

    pub fn form(&self, n: usize) -> Option<ApplicableForm> {
        self.members.get(n).and_then(|m| m.form)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GroupMember> {
        self.members.iter()
    }
}
