use crate::{
    expr::{Expression, ExpressionBuilder},
    finder::{Error, SerializerFinder, SerializerMap},
    host::{ClassMember, ClassType, Constructor, ConstructorParameter, EnumType, HostType},
    map,
    options::FinderOptions,
    serializers::{ConvertingSerializer, DocumentSerializer, Serializer},
};
use linked_hash_map::LinkedHashMap;
use std::sync::Arc;

pub(super) fn find(
    root: &Expression,
    seeds: Vec<(Expression, Serializer)>,
) -> Result<SerializerMap, Error> {
    find_with_options(root, seeds, FinderOptions::default())
}

pub(super) fn find_with_options(
    root: &Expression,
    seeds: Vec<(Expression, Serializer)>,
    options: FinderOptions,
) -> Result<SerializerMap, Error> {
    let mut map = SerializerMap::new();
    for (expression, serializer) in &seeds {
        map.add(expression, serializer.clone())
            .expect("seed serializer must be addable");
    }
    SerializerFinder::new(&options).find_serializers(root, map)
}

/// Run inference and assert the expected node→serializer entries. The
/// case closure builds the tree and returns
/// `(root, seeds, expected_entries)`; seed and expectation nodes are
/// clones, which share identity with the nodes in the tree.
macro_rules! test_deduce {
    ($func_name:ident, $case:expr $(,)?) => {
        #[test]
        fn $func_name() {
            let mut b = ExpressionBuilder::new();
            let (root, seeds, expected) = ($case)(&mut b);
            let map = find(&root, seeds).expect("inference must succeed");
            for (expression, serializer) in &expected {
                assert_eq!(
                    map.known_serializer(expression.id),
                    Some(serializer),
                    "serializer for `{}`",
                    expression
                );
            }
        }
    };
}

/// Run inference and assert the expected failure.
macro_rules! test_deduce_error {
    ($func_name:ident, $case:expr $(,)?) => {
        #[test]
        fn $func_name() {
            let mut b = ExpressionBuilder::new();
            let (root, seeds, expected) = ($case)(&mut b);
            let error = find(&root, seeds).expect_err("inference must fail");
            assert_eq!(error, expected);
        }
    };
}

mod convert;
mod member_access;
mod method_call;

// ----- shared fixtures -----

pub(super) fn person_class() -> Arc<ClassType> {
    Arc::new(ClassType {
        name: "Person".to_string(),
        base: None,
        members: vec![
            ClassMember {
                name: "Id".to_string(),
                ty: HostType::ObjectId,
            },
            ClassMember {
                name: "Name".to_string(),
                ty: HostType::String,
            },
            ClassMember {
                name: "Age".to_string(),
                ty: HostType::Int32,
            },
        ],
        constructors: vec![Constructor {
            parameters: vec![
                ConstructorParameter {
                    name: "name".to_string(),
                    ty: HostType::String,
                },
                ConstructorParameter {
                    name: "age".to_string(),
                    ty: HostType::Int32,
                },
            ],
        }],
    })
}

pub(super) fn person_type() -> HostType {
    HostType::Class(person_class())
}

pub(super) fn person_document_serializer() -> Serializer {
    let members: LinkedHashMap<String, Serializer> = map! {
        "Id".to_string() => Serializer::ObjectId,
        "Name".to_string() => Serializer::String,
        "Age".to_string() => Serializer::Int32,
    };
    Serializer::Document(DocumentSerializer {
        class: person_class(),
        members,
    })
}

pub(super) fn color_enum() -> Arc<EnumType> {
    Arc::new(EnumType {
        name: "Color".to_string(),
        underlying: HostType::Int32,
    })
}

/// A serializer with value type int32 that is distinguishable from the
/// registry default, for asserting that sibling propagation wins over
/// generic defaults.
pub(super) fn int32_persisted_enum_serializer() -> Serializer {
    Serializer::EnumIntegralConverting(ConvertingSerializer {
        value_type: HostType::Int32,
        inner: Box::new(Serializer::Enum(crate::serializers::EnumSerializer {
            enum_type: color_enum(),
        })),
    })
}
