use super::*;
use crate::serializers::{CastingSerializer, EnumSerializer};

test_deduce!(
    identity_conversion_reuses_the_operand_serializer,
    |b: &mut ExpressionBuilder| {
        let operand = b.parameter("x", HostType::Int32);
        let root = b.convert(operand.clone(), HostType::Int32);
        (
            root.clone(),
            vec![(operand, int32_persisted_enum_serializer())],
            vec![(root, int32_persisted_enum_serializer())],
        )
    },
);

test_deduce!(
    conversion_to_the_dynamic_value_type,
    |b: &mut ExpressionBuilder| {
        let operand = b.parameter("x", HostType::Int32);
        let root = b.convert(operand.clone(), HostType::Dynamic);
        (
            root.clone(),
            vec![(operand, Serializer::Int32)],
            vec![(root, Serializer::Dynamic)],
        )
    },
);

test_deduce!(
    nullable_source_unwraps_first,
    |b: &mut ExpressionBuilder| {
        let operand = b.parameter("x", HostType::nullable(HostType::Int32));
        let root = b.convert(operand.clone(), HostType::Int32);
        (
            root.clone(),
            vec![(operand, Serializer::nullable(int32_persisted_enum_serializer()))],
            vec![(root, int32_persisted_enum_serializer())],
        )
    },
);

test_deduce!(
    nullable_target_rewraps_the_resolved_conversion,
    |b: &mut ExpressionBuilder| {
        let operand = b.parameter("x", HostType::Int32);
        let root = b.convert(operand.clone(), HostType::nullable(HostType::Int32));
        (
            root.clone(),
            vec![(operand, int32_persisted_enum_serializer())],
            vec![(root, Serializer::nullable(int32_persisted_enum_serializer()))],
        )
    },
);

test_deduce!(
    nullable_to_nullable_unwraps_both_sides,
    |b: &mut ExpressionBuilder| {
        let operand = b.parameter("x", HostType::nullable(HostType::Int32));
        let root = b.convert(operand.clone(), HostType::nullable(HostType::Int64));
        (
            root.clone(),
            vec![(operand, Serializer::nullable(Serializer::Int32))],
            vec![(
                root,
                Serializer::nullable(Serializer::NumericConverting(ConvertingSerializer {
                    value_type: HostType::Int64,
                    inner: Box::new(Serializer::Int32),
                })),
            )],
        )
    },
);

test_deduce!(
    string_extraction_from_the_dynamic_value_type,
    |b: &mut ExpressionBuilder| {
        let operand = b.parameter("v", HostType::Dynamic);
        let root = b.convert(operand.clone(), HostType::String);
        (
            root.clone(),
            vec![(operand, Serializer::Dynamic)],
            vec![(root, Serializer::String)],
        )
    },
);

test_deduce_error!(
    non_string_extraction_from_the_dynamic_value_type_fails,
    |b: &mut ExpressionBuilder| {
        let operand = b.parameter("v", HostType::Dynamic);
        let root = b.convert(operand.clone(), HostType::Int32);
        (
            root.clone(),
            vec![(operand, Serializer::Dynamic)],
            Error::NotSupported {
                expression: root.to_string(),
                reason:
                    "only string extraction is supported when converting from the dynamic value type"
                        .to_string(),
            },
        )
    },
);

test_deduce!(
    enum_to_integral_wraps_the_persisted_representation,
    |b: &mut ExpressionBuilder| {
        let enum_type = HostType::Enum(color_enum());
        let operand = b.parameter("c", enum_type);
        let root = b.convert(operand.clone(), HostType::Int32);
        let enum_serializer = Serializer::Enum(EnumSerializer {
            enum_type: color_enum(),
        });
        (
            root.clone(),
            vec![(operand, enum_serializer.clone())],
            vec![(
                root,
                Serializer::EnumIntegralConverting(ConvertingSerializer {
                    value_type: HostType::Int32,
                    inner: Box::new(enum_serializer),
                }),
            )],
        )
    },
);

test_deduce!(
    integral_to_enum_wraps_the_persisted_representation,
    |b: &mut ExpressionBuilder| {
        let enum_type = HostType::Enum(color_enum());
        let operand = b.parameter("n", HostType::Int32);
        let root = b.convert(operand.clone(), enum_type.clone());
        (
            root.clone(),
            vec![(operand, Serializer::Int32)],
            vec![(
                root,
                Serializer::EnumIntegralConverting(ConvertingSerializer {
                    value_type: enum_type,
                    inner: Box::new(Serializer::Int32),
                }),
            )],
        )
    },
);

test_deduce!(
    enum_through_dynamic_double_convert_substitutes_the_inner_operand,
    |b: &mut ExpressionBuilder| {
        let source_enum = color_enum();
        let target_enum = Arc::new(EnumType {
            name: "Shade".to_string(),
            underlying: HostType::Int32,
        });
        let operand = b.parameter("c", HostType::Enum(Arc::clone(&source_enum)));
        let boxed = b.convert(operand.clone(), HostType::Dynamic);
        let root = b.convert(boxed.clone(), HostType::Enum(Arc::clone(&target_enum)));
        let source_serializer = Serializer::Enum(EnumSerializer {
            enum_type: source_enum,
        });
        (
            root.clone(),
            vec![(operand, source_serializer.clone())],
            vec![
                (boxed, Serializer::Dynamic),
                (
                    root,
                    Serializer::EnumIntegralConverting(ConvertingSerializer {
                        value_type: HostType::Enum(target_enum),
                        inner: Box::new(source_serializer),
                    }),
                ),
            ],
        )
    },
);

test_deduce!(
    conversion_to_a_supertype_wraps_for_downcasting,
    |b: &mut ExpressionBuilder| {
        let base = Arc::new(ClassType {
            name: "Entity".to_string(),
            base: None,
            members: vec![ClassMember {
                name: "Id".to_string(),
                ty: HostType::ObjectId,
            }],
            constructors: vec![],
        });
        let derived = Arc::new(ClassType {
            name: "Widget".to_string(),
            base: Some(Arc::clone(&base)),
            members: vec![],
            constructors: vec![],
        });
        let operand = b.parameter("w", HostType::Class(Arc::clone(&derived)));
        let root = b.convert(operand.clone(), HostType::Class(Arc::clone(&base)));
        let derived_document =
            Serializer::Document(crate::finder::new_expression::auto_map_class(&derived));
        (
            root.clone(),
            vec![(operand, derived_document.clone())],
            vec![(
                root,
                Serializer::Downcasting(CastingSerializer {
                    value_type: HostType::Class(base),
                    inner: Box::new(derived_document),
                }),
            )],
        )
    },
);

test_deduce!(
    numeric_widening_wraps_the_operand,
    |b: &mut ExpressionBuilder| {
        let operand = b.parameter("n", HostType::Int32);
        let root = b.convert(operand.clone(), HostType::Int64);
        (
            root.clone(),
            vec![(operand, int32_persisted_enum_serializer())],
            vec![(
                root,
                Serializer::NumericConverting(ConvertingSerializer {
                    value_type: HostType::Int64,
                    inner: Box::new(int32_persisted_enum_serializer()),
                }),
            )],
        )
    },
);

#[test]
fn an_unknowable_operand_makes_the_conversion_unknowable() {
    let mut b = ExpressionBuilder::new();
    let operand = b.parameter("x", HostType::Int32);
    let root = b.convert(operand.clone(), HostType::Int64);
    let map = find(
        &root,
        vec![(operand, Serializer::unknowable(&HostType::Int32))],
    )
    .unwrap();
    assert_eq!(
        map.known_serializer(root.id),
        Some(&Serializer::unknowable(&HostType::Int64))
    );
}
