//! Performance benchmarks for type gathering and member lookup.
//!
//! - Gathering: long inheritance chains declared derived-first
//! - Lookup: overloaded names found through deep hierarchies, raw and trimmed
//! - Resolution: simple-name lookup from inside the most-derived class

use classbind::ast::{ClassMemberDecl, CompilationUnit, MethodDecl, Modifiers, ParamDecl, TypeDecl, TypeExpr};
use classbind::compiler::lookup::{find_members, trim_member_list};
use classbind::compiler::{CompilationContext, compile, try_resolve_simple_name};
use classbind::core::{PrimitiveType, Span};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

/// `depth` classes, each deriving from the previous one and adding an
/// overload of `M`. Declared most-derived first.
fn make_chain(depth: usize) -> CompilationUnit {
    let mut unit = CompilationUnit::new("chain.cs");
    for i in (0..depth).rev() {
        let mut method = MethodDecl::new("M", TypeExpr::void()).with_modifiers(Modifiers::PUBLIC);
        for p in 0..=i % 4 {
            method = method.with_param(ParamDecl::new(&format!("p{p}"), TypeExpr::primitive(PrimitiveType::Int32)));
        }
        let mut decl = TypeDecl::class(&format!("C{i}")).with_member(ClassMemberDecl::Method(method));
        if i > 0 {
            decl = decl.with_base(TypeExpr::named(&format!("C{}", i - 1)));
        }
        unit = unit.with_type(decl);
    }
    unit
}

fn compiled(depth: usize) -> (CompilationContext, Vec<CompilationUnit>) {
    let units = vec![make_chain(depth)];
    let mut ctx = CompilationContext::default();
    if let Err(err) = compile(&mut ctx, &units) {
        panic!("benchmark input failed to compile: {err}");
    }
    (ctx, units)
}

fn gather_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("gather/chain");
    for depth in [10, 100, 500] {
        let units = vec![make_chain(depth)];
        group.bench_with_input(BenchmarkId::from_parameter(depth), &units, |b, units| {
            b.iter(|| {
                let mut ctx = CompilationContext::default();
                let output = compile(&mut ctx, black_box(units));
                black_box(output.map(|o| o.types.len()).ok())
            });
        });
    }
    group.finish();
}

fn lookup_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup/deep_hierarchy");
    for depth in [10, 100, 500] {
        let (ctx, _units) = compiled(depth);
        let Some(leaf) = ctx.graph().class_by_name(&format!("C{}", depth - 1)) else {
            panic!("leaf class missing");
        };

        group.bench_with_input(BenchmarkId::new("find_members", depth), &leaf, |b, &leaf| {
            let mut items = Vec::new();
            b.iter(|| {
                items.clear();
                find_members(&ctx, leaf, black_box("M"), Some(leaf), &mut items, true);
                black_box(items.len())
            });
        });

        group.bench_with_input(BenchmarkId::new("find_and_trim", depth), &leaf, |b, &leaf| {
            b.iter(|| {
                let mut items = Vec::new();
                find_members(&ctx, leaf, black_box("M"), Some(leaf), &mut items, true);
                black_box(trim_member_list(&ctx, &mut items, false))
            });
        });

        let res = ctx.global_resolution().within_class(leaf);
        group.bench_with_input(BenchmarkId::new("simple_name", depth), &res, |b, res| {
            b.iter(|| black_box(try_resolve_simple_name(&ctx, res, black_box("M"), Span::default()).is_ok()));
        });
    }
    group.finish();
}

criterion_group!(benches, gather_benchmarks, lookup_benchmarks);
criterion_main!(benches);
