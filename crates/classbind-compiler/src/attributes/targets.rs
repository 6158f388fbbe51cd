//! Attribute section target keywords.
//!
//! A section written on a declaration applies to that declaration unless it
//! names a target keyword. The keyword projects the declaration onto a
//! related program item: `return` on a method is its return value, `param`
//! on a setter is its `value` parameter, `field` on a field-like event is
//! its backing field.

use classbind_core::{AttributeTargets, ProgramItem};
use classbind_registry::ClassGraph;

use super::Declaration;

/// The recognized target keywords.
pub const KEYWORDS: [&str; 9] = [
    "assembly", "module", "type", "method", "field", "property", "event", "param", "return",
];

/// Why a target keyword could not be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetError {
    /// Not one of [`KEYWORDS`].
    Unknown,
    /// A known keyword with no meaning on this declaration.
    Invalid,
}

/// Project `declaration` through an optional target keyword. Returns the
/// item to attach to and the target kind attributes are checked against.
pub fn project(
    graph: &ClassGraph,
    declaration: Declaration,
    keyword: Option<&str>,
) -> Result<(ProgramItem, AttributeTargets), TargetError> {
    if let Some(keyword) = keyword {
        if !KEYWORDS.contains(&keyword) {
            return Err(TargetError::Unknown);
        }
    }

    let return_value = |method| (ProgramItem::Parameter { method, index: 0 }, AttributeTargets::RETURN_VALUE);

    match (declaration, keyword) {
        (Declaration::Unit, None | Some("assembly")) => Ok((ProgramItem::Assembly, AttributeTargets::ASSEMBLY)),
        (Declaration::Unit, Some("module")) => Ok((ProgramItem::Module, AttributeTargets::MODULE)),

        (Declaration::Type { class, .. }, None | Some("type")) => {
            Ok((ProgramItem::Class(class), graph.class(class).attribute_target()))
        }
        (Declaration::Type { invoke: Some(invoke), .. }, Some("return")) => Ok(return_value(invoke)),

        (Declaration::Method(method), None | Some("method")) => {
            let entry = graph.member(method);
            let kind = if entry.is_constructor() || entry.is_static_constructor() {
                AttributeTargets::CONSTRUCTOR
            } else {
                AttributeTargets::METHOD
            };
            Ok((ProgramItem::Member(method), kind))
        }
        (Declaration::Method(method), Some("return")) => Ok(return_value(method)),

        (Declaration::Field(field), None | Some("field")) => Ok((ProgramItem::Member(field), AttributeTargets::FIELD)),

        (Declaration::Property(property), None | Some("property")) => {
            Ok((ProgramItem::Member(property), AttributeTargets::PROPERTY))
        }

        (Declaration::Event { event, .. }, None | Some("event")) => Ok((ProgramItem::Member(event), AttributeTargets::EVENT)),
        (Declaration::Event { backing: Some(field), .. }, Some("field")) => {
            Ok((ProgramItem::Member(field), AttributeTargets::FIELD))
        }

        (Declaration::Accessor { method, .. }, None | Some("method")) => {
            Ok((ProgramItem::Member(method), AttributeTargets::METHOD))
        }
        (Declaration::Accessor { method, .. }, Some("return")) => Ok(return_value(method)),
        (Declaration::Accessor { method, value: Some(index) }, Some("param")) => {
            Ok((ProgramItem::Parameter { method, index }, AttributeTargets::PARAMETER))
        }

        (Declaration::Parameter { method, index }, None | Some("param")) => {
            Ok((ProgramItem::Parameter { method, index }, AttributeTargets::PARAMETER))
        }

        _ => Err(TargetError::Invalid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classbind_core::{ClassEntry, ClassKind, MemberEntry, MemberId, Signature};

    fn make_test_graph() -> (ClassGraph, MemberId, MemberId) {
        let mut graph = ClassGraph::new();
        let class = graph.add_class(ClassEntry::new("C", "", ClassKind::Struct));
        let method = graph.add_member(MemberEntry::method("M", class, Signature::void()));
        let ctor = graph.add_member(MemberEntry::method(".ctor", class, Signature::void()));
        (graph, method, ctor)
    }

    #[test]
    fn unknown_and_inapplicable_keywords() {
        let (graph, method, _) = make_test_graph();
        assert_eq!(
            project(&graph, Declaration::Method(method), Some("banana")),
            Err(TargetError::Unknown)
        );
        assert_eq!(
            project(&graph, Declaration::Method(method), Some("field")),
            Err(TargetError::Invalid)
        );
        assert_eq!(project(&graph, Declaration::Unit, Some("type")), Err(TargetError::Invalid));
    }

    #[test]
    fn return_projects_to_parameter_zero() {
        let (graph, method, _) = make_test_graph();
        assert_eq!(
            project(&graph, Declaration::Method(method), Some("return")),
            Ok((ProgramItem::Parameter { method, index: 0 }, AttributeTargets::RETURN_VALUE))
        );
    }

    #[test]
    fn setter_param_projects_to_value() {
        let (graph, method, _) = make_test_graph();
        let setter = Declaration::Accessor { method, value: Some(2) };
        assert_eq!(
            project(&graph, setter, Some("param")),
            Ok((ProgramItem::Parameter { method, index: 2 }, AttributeTargets::PARAMETER))
        );
        let getter = Declaration::Accessor { method, value: None };
        assert_eq!(project(&graph, getter, Some("param")), Err(TargetError::Invalid));
    }

    #[test]
    fn declaration_kinds() {
        let (graph, method, ctor) = make_test_graph();
        let class = graph.member(method).owner;
        assert_eq!(
            project(&graph, Declaration::Method(ctor), None).map(|(_, k)| k),
            Ok(AttributeTargets::CONSTRUCTOR)
        );
        assert_eq!(
            project(&graph, Declaration::Type { class, invoke: None }, None),
            Ok((ProgramItem::Class(class), AttributeTargets::STRUCT))
        );
        assert_eq!(
            project(&graph, Declaration::Unit, Some("module")),
            Ok((ProgramItem::Module, AttributeTargets::MODULE))
        );
        let field_like = Declaration::Event { event: method, backing: Some(ctor) };
        assert_eq!(
            project(&graph, field_like, Some("field")).map(|(item, _)| item),
            Ok(ProgramItem::Member(ctor))
        );
    }
}
