//! Shadowing, de-duplication and result-kind selection.

use classbind_core::{ClassId, MemberKind};
use tracing::trace;

use super::{LookupItem, LookupTarget, SemanticValue};
use crate::context::CompilationContext;
use crate::overload::MethodGroup;

/// Outcome of trimming a candidate list.
#[derive(Debug, Clone, PartialEq)]
pub enum Trimmed {
    /// One semantic kind; `Void` when nothing was found.
    Value(SemanticValue),
    /// Several unrelated candidates, each listed once.
    Ambiguous(Vec<LookupItem>),
}

/// Collapse the candidates from [`find_members`](super::find_members) or
/// [`find_indexers`](super::find_indexers) into a single result.
///
/// When the first candidate is a method (or in indexer mode), methods form a
/// group: non-methods survive only if declared in the first method's class,
/// an inherited member whose signature is redeclared further down is dropped,
/// and a member reached twice through different interfaces is kept once.
/// Otherwise the nearest declaring class wins and everything further up is
/// shadowed.
pub fn trim_member_list(
    ctx: &CompilationContext,
    items: &mut Vec<LookupItem>,
    indexer_mode: bool,
) -> Trimmed {
    let Some(first) = items.first().copied() else {
        return Trimmed::Value(SemanticValue::Void);
    };

    if indexer_mode || is_method(ctx, &first) {
        if !indexer_mode {
            items.retain(|item| is_method(ctx, item) || item.owner == first.owner);
        }
        remove_hidden(ctx, items);
        trace!(remaining = items.len(), indexer_mode, "trimmed method candidates");

        if indexer_mode {
            let members = items.iter().filter_map(LookupItem::member_id).collect();
            return Trimmed::Value(SemanticValue::IndexerGroup(members));
        }
        if items.iter().all(|item| is_method(ctx, item)) && owners_related(ctx, items) {
            let mut group = MethodGroup::new();
            for item in items.iter() {
                if let (Some(method), Some(owner)) = (item.member_id(), item.owner) {
                    group.push(method, owner);
                }
            }
            return Trimmed::Value(SemanticValue::MethodGroup(group));
        }
        return Trimmed::Ambiguous(items.clone());
    }

    items.retain(|item| item.owner == first.owner);
    trace!(remaining = items.len(), "trimmed to nearest owner");
    if items.len() > 1 {
        return Trimmed::Ambiguous(items.clone());
    }

    Trimmed::Value(match first.target {
        LookupTarget::Type(class) => SemanticValue::Type(class),
        LookupTarget::DeferredType(class) => SemanticValue::DeferredType(class),
        LookupTarget::Namespace(ns) => SemanticValue::Namespace(ns),
        LookupTarget::Member(member) => match ctx.graph.member(member).kind() {
            MemberKind::Field => SemanticValue::Field(member),
            MemberKind::Property => SemanticValue::Property(member),
            MemberKind::Event => SemanticValue::Event(member),
            MemberKind::Method => SemanticValue::Void,
        },
    })
}

fn is_method(ctx: &CompilationContext, item: &LookupItem) -> bool {
    item.member_id()
        .is_some_and(|m| ctx.graph.member(m).is_method())
}

/// Drop candidates redeclared with an identical signature in a derived type,
/// and repeated sightings of the same member.
fn remove_hidden(ctx: &CompilationContext, items: &mut Vec<LookupItem>) {
    let mut i = 0;
    'outer: while i < items.len() {
        let mut j = i + 1;
        while j < items.len() {
            let (a, b) = (items[i], items[j]);
            let (Some(ma), Some(mb)) = (a.member_id(), b.member_id()) else {
                j += 1;
                continue;
            };
            if ma == mb {
                items.remove(j);
                continue;
            }
            if let (Some(oa), Some(ob)) = (a.owner, b.owner) {
                if ctx.graph.signature_identical(ma, mb) {
                    if ctx.graph.is_base_type_for(ob, oa) {
                        items.remove(j);
                        continue;
                    }
                    if ctx.graph.is_base_type_for(oa, ob) {
                        items.remove(i);
                        continue 'outer;
                    }
                }
            }
            j += 1;
        }
        i += 1;
    }
}

/// Every pair of distinct owners is related by inheritance or
/// interface implementation.
fn owners_related(ctx: &CompilationContext, items: &[LookupItem]) -> bool {
    let mut owners: Vec<ClassId> = Vec::new();
    for owner in items.iter().filter_map(|i| i.owner) {
        if !owners.contains(&owner) {
            owners.push(owner);
        }
    }
    owners.iter().enumerate().all(|(i, &a)| {
        owners[i + 1..]
            .iter()
            .all(|&b| ctx.graph.is_base_type_for(a, b) || ctx.graph.is_base_type_for(b, a))
    })
}
