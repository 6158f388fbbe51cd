//! End-to-end behaviour of gathering, lookup, overload resolution and
//! attribute binding.

use classbind::ast::{
    AttributeSection, AttributeUse, ClassMemberDecl, CompilationUnit, EventDecl, Expr, FieldDecl,
    MethodDecl, Modifiers, ParamDecl, PropertyDecl, TypeDecl, TypeExpr,
};
use classbind::compiler::attributes::blob::{self, ElementType, Shape};
use classbind::compiler::{
    Argument, CompilationContext, MetadataLog, SemanticValue, TypedConstant, compile,
    resolve_indexers, try_resolve_constructor, try_resolve_simple_name,
};
use classbind::core::{ClassId, CompilationError, ConstValue, DataType, PrimitiveType, Span};
use std::collections::HashMap;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn int() -> TypeExpr {
    TypeExpr::primitive(PrimitiveType::Int32)
}

fn public_method(name: &str) -> MethodDecl {
    MethodDecl::new(name, TypeExpr::void()).with_modifiers(Modifiers::PUBLIC)
}

fn class_id(ctx: &CompilationContext, name: &str) -> ClassId {
    ctx.graph().class_by_name(name).unwrap()
}

/// Resolve `name` as written inside the body of `class`.
fn lookup(ctx: &CompilationContext, class: &str, name: &str) -> Result<SemanticValue, CompilationError> {
    let res = ctx.global_resolution().within_class(class_id(ctx, class));
    try_resolve_simple_name(ctx, &res, name, Span::default())
}

fn compile_unit(ctx: &mut CompilationContext, unit: CompilationUnit) {
    init_tracing();
    let units = [unit];
    compile(ctx, &units).unwrap();
}

// ============================================================================
// Gathering
// ============================================================================

#[test]
fn bases_always_precede_derived_types() {
    init_tracing();
    // T{i} derives from some T{j} with j < i; declared in reverse order.
    let mut unit = CompilationUnit::new("chain.cs");
    for i in (0..40usize).rev() {
        let mut decl = TypeDecl::class(&format!("T{i}"));
        if i > 0 {
            decl = decl.with_base(TypeExpr::named(&format!("T{}", (i * 7 + 3) % i)));
        }
        unit = unit.with_type(decl);
    }
    let units = [unit];
    let mut ctx = CompilationContext::default();
    let output = compile(&mut ctx, &units).unwrap();
    assert!(!ctx.has_errors());
    assert_eq!(output.types.len(), 40);

    let order: HashMap<&str, usize> = output
        .types
        .iter()
        .enumerate()
        .map(|(i, t)| (t.decl.name.as_str(), i))
        .collect();
    for item in &output.types {
        let Some(parent) = ctx.graph().class(item.class).parent else {
            continue;
        };
        let parent = ctx.graph().class(parent);
        if parent.is_imported() {
            continue;
        }
        assert!(
            order[parent.name.as_str()] < order[item.decl.name.as_str()],
            "{} gathered before its base {}",
            item.decl.name,
            parent.name
        );
    }
}

#[test]
fn cycles_are_reported_once_and_terminate() {
    init_tracing();
    let units = [CompilationUnit::new("cycle.cs")
        .with_type(TypeDecl::class("A").with_base(TypeExpr::named("B")))
        .with_type(TypeDecl::class("B").with_base(TypeExpr::named("C")))
        .with_type(TypeDecl::class("C").with_base(TypeExpr::named("A")))
        .with_type(TypeDecl::class("D").with_base(TypeExpr::named("A")))];
    let mut ctx = CompilationContext::default();
    let output = compile(&mut ctx, &units).unwrap();

    assert_eq!(output.types.len(), 4);
    assert_eq!(
        ctx.diagnostics()
            .count_errors(|e| matches!(e, CompilationError::RecursiveDefinition { .. })),
        1
    );
}

// ============================================================================
// Lookup
// ============================================================================

#[test]
fn override_is_found_once_under_the_derived_class() {
    let mut ctx = CompilationContext::default();
    compile_unit(
        &mut ctx,
        CompilationUnit::new("a.cs")
            .with_type(
                TypeDecl::class("A")
                    .with_member(ClassMemberDecl::Method(public_method("M").with_modifiers(Modifiers::VIRTUAL))),
            )
            .with_type(
                TypeDecl::class("B")
                    .with_base(TypeExpr::named("A"))
                    .with_member(ClassMemberDecl::Method(public_method("M").with_modifiers(Modifiers::OVERRIDE))),
            ),
    );
    assert!(!ctx.has_errors());

    let value = lookup(&ctx, "B", "M").unwrap();
    let group = value.as_method_group().unwrap();
    assert_eq!(group.len(), 1);
    assert_eq!(group.member(0).unwrap().owner, class_id(&ctx, "B"));
}

#[test]
fn redeclared_signature_keeps_the_most_derived() {
    let mut ctx = CompilationContext::default();
    compile_unit(
        &mut ctx,
        CompilationUnit::new("a.cs")
            .with_type(
                TypeDecl::class("A")
                    .with_member(ClassMemberDecl::Method(public_method("M").with_param(ParamDecl::new("x", int()))))
                    .with_member(ClassMemberDecl::Method(public_method("M"))),
            )
            .with_type(
                TypeDecl::class("B").with_base(TypeExpr::named("A")).with_member(ClassMemberDecl::Method(
                    public_method("M")
                        .with_modifiers(Modifiers::NEW)
                        .with_param(ParamDecl::new("x", int())),
                )),
            ),
    );
    assert!(!ctx.has_errors());

    let value = lookup(&ctx, "B", "M").unwrap();
    let group = value.as_method_group().unwrap();
    let b = class_id(&ctx, "B");
    let a = class_id(&ctx, "A");
    let owners: Vec<ClassId> = group.iter().map(|m| ctx.graph().member(m.method).owner).collect();
    assert_eq!(owners, vec![b, a]);
    assert!(ctx.graph().member(group.get(1).unwrap()).params().is_empty());
}

#[test]
fn unique_names_resolve_to_their_kind() {
    let mut ctx = CompilationContext::default();
    compile_unit(
        &mut ctx,
        CompilationUnit::new("a.cs")
            .with_type(TypeDecl::delegate("Handler", TypeExpr::void(), Vec::new()))
            .with_type(
                TypeDecl::class("C")
                    .with_member(ClassMemberDecl::Field(FieldDecl::new("count", int())))
                    .with_member(ClassMemberDecl::Property(PropertyDecl::new("Size", int())))
                    .with_member(ClassMemberDecl::Event(EventDecl::new("Changed", TypeExpr::named("Handler"))))
                    .with_member(ClassMemberDecl::Method(public_method("Run")))
                    .with_nested(TypeDecl::class("Inner")),
            ),
    );
    assert!(!ctx.has_errors());

    assert!(matches!(lookup(&ctx, "C", "count"), Ok(SemanticValue::Field(_))));
    assert!(matches!(lookup(&ctx, "C", "Size"), Ok(SemanticValue::Property(_))));
    assert!(matches!(lookup(&ctx, "C", "Changed"), Ok(SemanticValue::Event(_))));
    assert!(matches!(lookup(&ctx, "C", "Run"), Ok(SemanticValue::MethodGroup(_))));
    assert!(matches!(lookup(&ctx, "C", "Inner"), Ok(SemanticValue::Type(_))));
}

#[test]
fn unrelated_interfaces_are_ambiguous() {
    let mut ctx = CompilationContext::default();
    compile_unit(
        &mut ctx,
        CompilationUnit::new("a.cs")
            .with_type(TypeDecl::interface("I1").with_member(ClassMemberDecl::Method(MethodDecl::new("M", TypeExpr::void()))))
            .with_type(TypeDecl::interface("I2").with_member(ClassMemberDecl::Method(MethodDecl::new("M", TypeExpr::void()))))
            .with_type(
                TypeDecl::class("C")
                    .with_base(TypeExpr::named("I1"))
                    .with_base(TypeExpr::named("I2")),
            ),
    );
    assert!(!ctx.has_errors());

    match lookup(&ctx, "C", "M") {
        Err(CompilationError::Ambiguous { candidates, .. }) => {
            assert_eq!(candidates, vec!["method void I1.M()", "method void I2.M()"]);
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
}

#[test]
fn diamond_interfaces_report_the_member_once() {
    let mut ctx = CompilationContext::default();
    compile_unit(
        &mut ctx,
        CompilationUnit::new("a.cs")
            .with_type(TypeDecl::interface("IBase").with_member(ClassMemberDecl::Method(MethodDecl::new("M", TypeExpr::void()))))
            .with_type(TypeDecl::interface("ILeft").with_base(TypeExpr::named("IBase")))
            .with_type(TypeDecl::interface("IRight").with_base(TypeExpr::named("IBase")))
            .with_type(
                TypeDecl::interface("IBoth")
                    .with_base(TypeExpr::named("ILeft"))
                    .with_base(TypeExpr::named("IRight")),
            ),
    );
    assert!(!ctx.has_errors());

    let value = lookup(&ctx, "IBoth", "M").unwrap();
    assert_eq!(value.as_method_group().unwrap().len(), 1);
}

#[test]
fn indexers_are_looked_up_separately() {
    let mut ctx = CompilationContext::default();
    compile_unit(
        &mut ctx,
        CompilationUnit::new("a.cs").with_type(
            TypeDecl::class("List").with_member(ClassMemberDecl::Property(
                PropertyDecl::indexer(int(), vec![ParamDecl::new("i", int())]).with_modifiers(Modifiers::PUBLIC),
            )),
        ),
    );
    assert!(!ctx.has_errors());

    let list = class_id(&ctx, "List");
    let res = ctx.global_resolution();
    match resolve_indexers(&ctx, &res, list) {
        SemanticValue::IndexerGroup(members) => assert_eq!(members.len(), 1),
        other => panic!("expected indexers, got {other:?}"),
    }
}

// ============================================================================
// Overload resolution
// ============================================================================

#[test]
fn constructor_overloads_pick_the_most_specific() {
    let mut ctx = CompilationContext::default();
    let ctor = |ty: TypeExpr| {
        ClassMemberDecl::Method(
            MethodDecl::constructor()
                .with_modifiers(Modifiers::PUBLIC)
                .with_param(ParamDecl::new("v", ty)),
        )
    };
    compile_unit(
        &mut ctx,
        CompilationUnit::new("a.cs").with_type(
            TypeDecl::class("Box")
                .with_member(ctor(TypeExpr::primitive(PrimitiveType::Int64)))
                .with_member(ctor(int())),
        ),
    );

    let class = class_id(&ctx, "Box");
    let res = ctx.global_resolution();
    let arg = Argument::constant(TypedConstant::new(
        ConstValue::Int32(5),
        DataType::Primitive(PrimitiveType::Int32),
    ));
    let chosen = try_resolve_constructor(&ctx, &res, class, &[arg], Span::default()).unwrap();
    assert_eq!(
        ctx.graph().member(chosen).params()[0].ty,
        DataType::Primitive(PrimitiveType::Int32)
    );

    let none = try_resolve_constructor(&ctx, &res, class, &[], Span::default());
    assert!(matches!(none, Err(CompilationError::NoApplicableMember { .. })));
}

// ============================================================================
// Attributes
// ============================================================================

fn attribute_unit(args: Vec<Expr>) -> CompilationUnit {
    CompilationUnit::new("attr.cs")
        .with_type(
            TypeDecl::class("FooAttribute")
                .with_base(TypeExpr::named("System.Attribute"))
                .with_member(ClassMemberDecl::Method(
                    MethodDecl::constructor()
                        .with_modifiers(Modifiers::PUBLIC)
                        .with_param(ParamDecl::new("a", int()))
                        .with_param(ParamDecl::new("b", TypeExpr::named("string"))),
                )),
        )
        .with_type(
            TypeDecl::class("Target")
                .with_attributes(AttributeSection::new(vec![AttributeUse::new("Foo", args)])),
        )
}

#[test]
fn attribute_arguments_round_trip_through_the_blob() {
    let log = MetadataLog::new();
    let mut ctx = CompilationContext::default().with_metadata_sink(log.clone());
    compile_unit(&mut ctx, attribute_unit(vec![Expr::int(1), Expr::string("x")]));
    assert!(!ctx.has_errors());

    let blobs = log.attribute_blobs();
    assert_eq!(blobs.len(), 1);
    assert_eq!(blobs[0].attribute_class, class_id(&ctx, "FooAttribute"));
    assert_eq!(
        blob::decode(&blobs[0].blob).unwrap(),
        vec![ConstValue::Int32(1), ConstValue::String("x".into())]
    );
    assert_eq!(ctx.graph().class(class_id(&ctx, "Target")).attributes.len(), 1);
}

#[test]
fn attribute_without_matching_constructor_attaches_nothing() {
    let log = MetadataLog::new();
    let mut ctx = CompilationContext::default().with_metadata_sink(log.clone());
    compile_unit(&mut ctx, attribute_unit(vec![Expr::int(1)]));

    assert!(log.attribute_blobs().is_empty());
    assert!(ctx.graph().class(class_id(&ctx, "Target")).attributes.is_empty());
    assert_eq!(
        ctx.diagnostics()
            .count_errors(|e| matches!(e, CompilationError::NoApplicableMember { .. })),
        1
    );
}

#[test]
fn codec_boundary_values() {
    let args = vec![
        (Shape::Scalar(ElementType::I4), ConstValue::Int32(0)),
        (Shape::Scalar(ElementType::I4), ConstValue::Int32(i32::MAX)),
        (Shape::Scalar(ElementType::I4), ConstValue::Int32(i32::MIN)),
        (Shape::Scalar(ElementType::String), ConstValue::String(String::new())),
        (Shape::Array(ElementType::I4), ConstValue::Array(Vec::new())),
        (
            Shape::Array(ElementType::I4),
            ConstValue::Array(vec![ConstValue::Int32(i32::MIN), ConstValue::Int32(i32::MAX)]),
        ),
    ];
    let encoded = blob::encode(&args).unwrap();
    let decoded = blob::decode(&encoded).unwrap();
    let values: Vec<ConstValue> = args.into_iter().map(|(_, v)| v).collect();
    assert_eq!(decoded, values);
}
