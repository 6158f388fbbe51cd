//! Candidate collection.

use classbind_core::{ClassId, MemberEntry, MemberId};
use tracing::trace;

use super::{LookupItem, LookupTarget};
use crate::context::CompilationContext;

/// Collect every accessible member or nested type called `name`, starting at
/// `start` and, when `look_in_parents` is set, continuing up its parents.
///
/// Overrides are not candidates of their own: the virtual member that
/// introduced the slot is the candidate, reported under the most derived
/// override seen on the way up. Indexers and compiler-generated members are
/// never returned.
///
/// Interfaces are searched through every interface they extend, so the same
/// member may be reported more than once; [`trim_member_list`] removes those.
/// A class's implemented interfaces are only searched when its own parent
/// chain has no candidate at all.
///
/// [`trim_member_list`]: super::trim_member_list
pub fn find_members(
    ctx: &CompilationContext,
    start: ClassId,
    name: &str,
    access_from: Option<ClassId>,
    results: &mut Vec<LookupItem>,
    look_in_parents: bool,
) {
    let before = results.len();
    let accept = |m: &MemberEntry| m.name == name && !m.is_indexer();
    scan_chain(ctx, start, name, access_from, results, look_in_parents, &accept);

    if look_in_parents && results.len() == before && !ctx.graph.class(start).is_interface() {
        let mut seen: Vec<ClassId> = Vec::new();
        for class in ctx.graph.ancestors(start) {
            for &interface in &ctx.graph.class(class).interfaces {
                if !seen.contains(&interface) {
                    seen.push(interface);
                    scan_chain(ctx, interface, name, access_from, results, true, &accept);
                }
            }
        }
    }

    trace!(
        class = %ctx.graph.qualified_name(start),
        name,
        found = results.len() - before,
        "find_members"
    );
}

/// Collect the indexers visible from `start`: parameterized properties that
/// have an accessor and are not static.
pub fn find_indexers(
    ctx: &CompilationContext,
    start: ClassId,
    access_from: Option<ClassId>,
    results: &mut Vec<LookupItem>,
) {
    let accept = |m: &MemberEntry| {
        m.is_indexer()
            && ctx.graph.underlying_method(m.id).is_some()
            && !ctx.graph.is_static_member(m.id)
    };
    scan_chain(ctx, start, "", access_from, results, true, &accept);
}

/// Scan `start` and (optionally) its parents; interfaces recurse into the
/// interfaces they extend.
fn scan_chain(
    ctx: &CompilationContext,
    start: ClassId,
    name: &str,
    access_from: Option<ClassId>,
    results: &mut Vec<LookupItem>,
    look_in_parents: bool,
    accept: &dyn Fn(&MemberEntry) -> bool,
) {
    // Overrides seen so far, waiting for the member that introduced their slot.
    let mut pending: Vec<MemberId> = Vec::new();
    let mut current = Some(start);

    while let Some(class) = current {
        for member in ctx.graph.members_of(class) {
            if !accept(member) || member.is_synthetic() {
                continue;
            }
            if !ctx.graph.member_accessible(member.id, access_from) {
                continue;
            }
            if ctx.graph.is_override(member.id) {
                pending.push(member.id);
                continue;
            }
            let slot = pending
                .iter()
                .position(|&o| same_slot(ctx, o, member.id))
                .map(|i| pending.remove(i));
            results.push(match slot {
                Some(over) => LookupItem::member(over, ctx.graph.member(over).owner),
                None => LookupItem::member(member.id, class),
            });
        }

        if !name.is_empty() {
            for &nested in &ctx.graph.class(class).nested {
                if ctx.graph.class(nested).name == name
                    && ctx.graph.class_accessible(nested, access_from)
                {
                    results.push(LookupItem {
                        target: type_target(ctx, nested),
                        owner: Some(class),
                    });
                }
            }
        }

        let entry = ctx.graph.class(class);
        if entry.is_interface() {
            for &base in &entry.interfaces {
                scan_chain(ctx, base, name, access_from, results, look_in_parents, accept);
            }
        }

        if !look_in_parents {
            break;
        }
        current = entry.parent;
    }
}

/// Whether an override fills the slot introduced by `introducer`.
fn same_slot(ctx: &CompilationContext, over: MemberId, introducer: MemberId) -> bool {
    let (a, b) = (ctx.graph.member(over), ctx.graph.member(introducer));
    a.kind() == b.kind() && a.name == b.name && ctx.graph.signature_identical(over, introducer)
}

/// A type reference, deferred while the class graph is still being built.
pub(crate) fn type_target(ctx: &CompilationContext, class: ClassId) -> LookupTarget {
    if ctx.gathering || !ctx.graph.class(class).is_resolved() {
        LookupTarget::DeferredType(class)
    } else {
        LookupTarget::Type(class)
    }
}
