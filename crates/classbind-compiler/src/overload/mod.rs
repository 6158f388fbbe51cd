//! Overload resolution over method groups.
//!
//! Candidates are first tagged with how the argument list binds to them (or
//! dropped when it does not bind). The survivors then play a knockout round
//! under the applicability collaborator's "better candidate" relation, and
//! the winner must beat every other survivor.
//!
//! ## Modules
//!
//! - [`group`]: the [`MethodGroup`] value

pub mod group;

pub use group::{GroupMember, MethodGroup};

use classbind_core::{CompilationError, MemberId, Span};
use tracing::{debug, trace};

use crate::collaborators::{Argument, Better};
use crate::context::CompilationContext;

/// Pick the single best candidate of `group` for `args`.
///
/// `name` is the method name used in diagnostics.
pub fn resolve_overload(
    ctx: &CompilationContext,
    mut group: MethodGroup,
    args: &[Argument],
    name: &str,
    span: Span,
) -> Result<MemberId, CompilationError> {
    #[cfg(feature = "profiling")]
    profiling::scope!("resolve_overload");

    let mut i = 0;
    while let Some(method) = group.get(i) {
        match ctx.applicable_form(args, ctx.graph.member(method)) {
            Some(form) => {
                group.set_form(i, form);
                i += 1;
            }
            None => {
                group.remove(i);
            }
        }
    }
    trace!(name, applicable = group.len(), "tagged applicable candidates");

    if group.is_empty() {
        let args = args
            .iter()
            .map(|a| ctx.graph.type_name(&a.ty))
            .collect::<Vec<_>>()
            .join(", ");
        debug!(name, %args, "no applicable candidate");
        return Err(CompilationError::NoApplicableMember {
            name: name.to_string(),
            args,
            span,
        });
    }

    let candidate = |n: usize| {
        group
            .member(n)
            .and_then(|m| m.form.map(|form| (ctx.graph.member(m.method), form)))
    };

    let mut best = 0;
    for n in 1..group.len() {
        if let (Some(current), Some(challenger)) = (candidate(best), candidate(n)) {
            if ctx.better_candidate(args, challenger, current) == Better::First {
                best = n;
            }
        }
    }

    let unbeaten = (0..group.len()).filter(|&n| n != best).all(|n| {
        match (candidate(best), candidate(n)) {
            (Some(winner), Some(other)) => ctx.better_candidate(args, winner, other) == Better::First,
            _ => false,
        }
    });

    match group.get(best) {
        Some(method) if unbeaten => {
            trace!(name, ?method, "overload chosen");
            Ok(method)
        }
        _ => {
            let candidates = group
                .iter()
                .map(|m| describe_method(ctx, m.method))
                .collect();
            debug!(name, "ambiguous overload");
            Err(CompilationError::AmbiguousOverload {
                name: name.to_string(),
                candidates,
                span,
            })
        }
    }
}

/// `R Owner.Name(T1, T2)`.
pub(crate) fn describe_method(ctx: &CompilationContext, method: MemberId) -> String {
    let entry = ctx.graph.member(method);
    let params = entry
        .params()
        .iter()
        .map(|p| ctx.graph.type_name(&p.ty))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{} {}.{}({})",
        ctx.graph.type_name(entry.data_type()),
        ctx.graph.qualified_name(entry.owner),
        entry.name,
        params
    )
}
