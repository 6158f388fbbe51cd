//! Argument binding through implicit conversions.

use classbind_core::{DataType, MemberEntry, ParamModifier};

use super::{Applicability, ApplicableForm, Argument, Better};
use crate::context::CompilationContext;
use crate::conversion::{find_implicit_conversion, find_type_conversion};

/// Binds arguments by implicit conversion and ranks candidates by the
/// specificity of their parameter types.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardApplicability;

impl Applicability for StandardApplicability {
    fn applicable_form(
        &self,
        ctx: &CompilationContext,
        args: &[Argument],
        candidate: &MemberEntry,
    ) -> Option<ApplicableForm> {
        let params = candidate.params();
        let converts = |arg: &Argument, ty: &DataType| find_implicit_conversion(ctx, arg, ty).is_some();

        if args.len() == params.len() && args.iter().zip(params).all(|(a, p)| converts(a, &p.ty)) {
            return Some(ApplicableForm::Normal);
        }

        // `params T[]`: fixed parameters, then any number of `T`.
        if let Some(last) = params.last().filter(|p| p.modifier == ParamModifier::Params) {
            let fixed = params.len() - 1;
            if let Some(element) = last.ty.element() {
                if args.len() >= fixed
                    && args[..fixed].iter().zip(params).all(|(a, p)| converts(a, &p.ty))
                    && args[fixed..].iter().all(|a| converts(a, element))
                {
                    return Some(ApplicableForm::Expanded);
                }
            }
        }

        // `__arglist`: fixed parameters, then anything.
        let vararg = candidate.signature().is_some_and(|s| s.vararg);
        if vararg
            && args.len() >= params.len()
            && args.iter().zip(params).all(|(a, p)| converts(a, &p.ty))
        {
            return Some(ApplicableForm::Expanded);
        }

        None
    }

    fn better(
        &self,
        ctx: &CompilationContext,
        args: &[Argument],
        first: (&MemberEntry, ApplicableForm),
        second: (&MemberEntry, ApplicableForm),
    ) -> Better {
        let mut first_wins = false;
        let mut second_wins = false;

        for (i, arg) in args.iter().enumerate() {
            let (Some(t1), Some(t2)) = (
                param_type_at(first.0, first.1, i),
                param_type_at(second.0, second.1, i),
            ) else {
                continue;
            };
            match compare_conversions(ctx, arg, t1, t2) {
                Better::First => first_wins = true,
                Better::Second => second_wins = true,
                Better::Neither => {}
            }
        }

        match (first_wins, second_wins) {
            (true, false) => Better::First,
            (false, true) => Better::Second,
            (false, false) => match (first.1, second.1) {
                (ApplicableForm::Normal, ApplicableForm::Expanded) => Better::First,
                (ApplicableForm::Expanded, ApplicableForm::Normal) => Better::Second,
                _ => Better::Neither,
            },
            (true, true) => Better::Neither,
        }
    }
}

/// The type argument `index` is converted to under `form`.
fn param_type_at(member: &MemberEntry, form: ApplicableForm, index: usize) -> Option<&DataType> {
    let params = member.params();
    match form {
        ApplicableForm::Normal => params.get(index).map(|p| &p.ty),
        ApplicableForm::Expanded => {
            let last = params.last()?;
            if last.modifier == ParamModifier::Params && index + 1 >= params.len() {
                last.ty.element()
            } else {
                params.get(index).map(|p| &p.ty)
            }
        }
    }
}

/// Which parameter type is the better target for one argument.
fn compare_conversions(ctx: &CompilationContext, arg: &Argument, t1: &DataType, t2: &DataType) -> Better {
    if t1 == t2 {
        return Better::Neither;
    }
    if arg.ty == *t1 {
        return Better::First;
    }
    if arg.ty == *t2 {
        return Better::Second;
    }

    let one_to_two = find_type_conversion(ctx, t1, t2).is_some();
    let two_to_one = find_type_conversion(ctx, t2, t1).is_some();
    match (one_to_two, two_to_one) {
        (true, false) => return Better::First,
        (false, true) => return Better::Second,
        _ => {}
    }

    let cost = |t| find_implicit_conversion(ctx, arg, t).map(|c| c.cost);
    match (cost(t1), cost(t2)) {
        (Some(a), Some(b)) if a < b => Better::First,
        (Some(a), Some(b)) if b < a => Better::Second,
        _ => Better::Neither,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classbind_core::{ClassId, Param, PrimitiveType, Signature};

    fn prim(p: PrimitiveType) -> DataType {
        DataType::Primitive(p)
    }

    fn make_test_method(params: Vec<Param>) -> MemberEntry {
        MemberEntry::method("M", ClassId(0), Signature::new(DataType::Void, params))
    }

    fn int_arg() -> Argument {
        Argument::new(prim(PrimitiveType::Int32))
    }

    #[test]
    fn exact_arity_is_normal_form() {
        let ctx = CompilationContext::default();
        let m = make_test_method(vec![Param::new("a", prim(PrimitiveType::Int64))]);
        assert_eq!(
            StandardApplicability.applicable_form(&ctx, &[int_arg()], &m),
            Some(ApplicableForm::Normal)
        );
        assert_eq!(StandardApplicability.applicable_form(&ctx, &[], &m), None);
    }

    #[test]
    fn params_array_expands() {
        let ctx = CompilationContext::default();
        let m = make_test_method(vec![
            Param::new("first", prim(PrimitiveType::Int32)),
            Param::new("rest", DataType::array_of(prim(PrimitiveType::Int32)))
                .with_modifier(ParamModifier::Params),
        ]);
        let app = StandardApplicability;
        assert_eq!(app.applicable_form(&ctx, &[int_arg()], &m), Some(ApplicableForm::Expanded));
        assert_eq!(
            app.applicable_form(&ctx, &[int_arg(), int_arg(), int_arg()], &m),
            Some(ApplicableForm::Expanded)
        );
        let array_arg = Argument::new(DataType::array_of(prim(PrimitiveType::Int32)));
        assert_eq!(
            app.applicable_form(&ctx, &[int_arg(), array_arg], &m),
            Some(ApplicableForm::Normal)
        );
    }

    #[test]
    fn vararg_accepts_extra_arguments() {
        let ctx = CompilationContext::default();
        let mut sig = Signature::new(DataType::Void, vec![Param::new("fmt", prim(PrimitiveType::Int32))]);
        sig.vararg = true;
        let m = MemberEntry::method("Printf", ClassId(0), sig);
        let extra = Argument::new(prim(PrimitiveType::Float64));
        assert_eq!(
            StandardApplicability.applicable_form(&ctx, &[int_arg(), extra], &m),
            Some(ApplicableForm::Expanded)
        );
    }

    #[test]
    fn exact_parameter_is_better() {
        let ctx = CompilationContext::default();
        let as_int = make_test_method(vec![Param::new("a", prim(PrimitiveType::Int32))]);
        let as_long = make_test_method(vec![Param::new("a", prim(PrimitiveType::Int64))]);
        let app = StandardApplicability;
        assert_eq!(
            app.better(
                &ctx,
                &[int_arg()],
                (&as_long, ApplicableForm::Normal),
                (&as_int, ApplicableForm::Normal)
            ),
            Better::Second
        );
    }

    #[test]
    fn more_specific_parameter_is_better() {
        let ctx = CompilationContext::default();
        let short_arg = Argument::new(prim(PrimitiveType::Int16));
        let as_int = make_test_method(vec![Param::new("a", prim(PrimitiveType::Int32))]);
        let as_long = make_test_method(vec![Param::new("a", prim(PrimitiveType::Int64))]);
        assert_eq!(
            StandardApplicability.better(
                &ctx,
                &[short_arg],
                (&as_int, ApplicableForm::Normal),
                (&as_long, ApplicableForm::Normal)
            ),
            Better::First
        );
    }

    #[test]
    fn normal_form_beats_expanded_on_tie() {
        let ctx = CompilationContext::default();
        let plain = make_test_method(vec![Param::new("a", prim(PrimitiveType::Int32))]);
        let spread = make_test_method(vec![
            Param::new("a", DataType::array_of(prim(PrimitiveType::Int32))).with_modifier(ParamModifier::Params),
        ]);
        assert_eq!(
            StandardApplicability.better(
                &ctx,
                &[int_arg()],
                (&spread, ApplicableForm::Expanded),
                (&plain, ApplicableForm::Normal)
            ),
            Better::Second
        );
    }
}
