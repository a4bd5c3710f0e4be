use super::*;
use crate::serializers::{DictionarySerializer, GroupingSerializer, TupleSerializer};

test_deduce!(
    dynamic_typed_accessors_use_the_fixed_table,
    |b: &mut ExpressionBuilder| {
        let value = b.parameter("v", HostType::Dynamic);
        let root = b.member(value.clone(), "AsInt32", HostType::Int32);
        (
            root.clone(),
            vec![(value, Serializer::Dynamic)],
            vec![(root, Serializer::Int32)],
        )
    },
);

test_deduce!(
    date_components_resolve_to_int32,
    |b: &mut ExpressionBuilder| {
        let date = b.parameter("d", HostType::DateTime);
        let root = b.member(date.clone(), "Month", HostType::Int32);
        (
            root.clone(),
            vec![(date, Serializer::DateTime)],
            vec![(root, Serializer::Int32)],
        )
    },
);

test_deduce!(
    static_now_resolves_to_date_time,
    |b: &mut ExpressionBuilder| {
        let root = b.static_member(HostType::DateTime, "Now", HostType::DateTime);
        (root.clone(), vec![], vec![(root, Serializer::DateTime)])
    },
);

test_deduce!(
    collection_count_is_integer_regardless_of_the_collection_serializer,
    |b: &mut ExpressionBuilder| {
        let values = b.parameter("xs", HostType::list(HostType::Int32));
        let root = b.member(values.clone(), "Count", HostType::Int32);
        (
            root.clone(),
            // even a client-side-only collection has an integer count
            vec![(
                values,
                Serializer::unknowable(&HostType::list(HostType::Int32)),
            )],
            vec![(root, Serializer::Int32)],
        )
    },
);

test_deduce!(
    string_length_is_integer,
    |b: &mut ExpressionBuilder| {
        let s = b.parameter("s", HostType::String);
        let root = b.member(s.clone(), "Length", HostType::Int32);
        (
            root.clone(),
            vec![(s, Serializer::String)],
            vec![(root, Serializer::Int32)],
        )
    },
);

test_deduce!(
    dictionary_keys_and_values_derive_from_the_dictionary_serializer,
    |b: &mut ExpressionBuilder| {
        let dictionary_type = HostType::dictionary(HostType::String, person_type());
        let dictionary = b.parameter("d", dictionary_type.clone());
        let keys = b.member(
            dictionary.clone(),
            "Keys",
            HostType::list(HostType::String),
        );
        let values = b.member(dictionary.clone(), "Values", HostType::list(person_type()));
        let root = b.call(
            None,
            "Create",
            vec![keys.clone(), values.clone()],
            HostType::Tuple(vec![
                HostType::list(HostType::String),
                HostType::list(person_type()),
            ]),
        );
        let dictionary_serializer = Serializer::Dictionary(DictionarySerializer {
            dictionary_type,
            key: Box::new(Serializer::String),
            value: Box::new(person_document_serializer()),
        });
        (
            root,
            vec![(dictionary, dictionary_serializer)],
            vec![
                (
                    keys,
                    Serializer::sequence(&HostType::list(HostType::String), Serializer::String),
                ),
                (
                    values,
                    Serializer::sequence(
                        &HostType::list(person_type()),
                        person_document_serializer(),
                    ),
                ),
            ],
        )
    },
);

test_deduce!(
    nullable_value_unwraps_the_receiver_serializer,
    |b: &mut ExpressionBuilder| {
        let nullable = b.parameter("x", HostType::nullable(HostType::Int32));
        let root = b.member(nullable.clone(), "Value", HostType::Int32);
        (
            root.clone(),
            vec![(
                nullable,
                Serializer::nullable(int32_persisted_enum_serializer()),
            )],
            vec![(root, int32_persisted_enum_serializer())],
        )
    },
);

test_deduce!(
    nullable_has_value_is_boolean,
    |b: &mut ExpressionBuilder| {
        let nullable = b.parameter("x", HostType::nullable(HostType::Int32));
        let root = b.member(nullable.clone(), "HasValue", HostType::Bool);
        (
            root.clone(),
            vec![(nullable, Serializer::nullable(Serializer::Int32))],
            vec![(root, Serializer::Boolean)],
        )
    },
);

test_deduce!(
    tuple_items_are_positional,
    |b: &mut ExpressionBuilder| {
        let tuple_type = HostType::Tuple(vec![HostType::String, HostType::Int32]);
        let tuple = b.parameter("t", tuple_type.clone());
        let root = b.member(tuple.clone(), "Item2", HostType::Int32);
        (
            root.clone(),
            vec![(
                tuple,
                Serializer::Tuple(TupleSerializer {
                    tuple_type,
                    items: vec![Serializer::String, int32_persisted_enum_serializer()],
                }),
            )],
            vec![(root, int32_persisted_enum_serializer())],
        )
    },
);

test_deduce!(
    grouping_key_comes_from_the_grouping_serializer,
    |b: &mut ExpressionBuilder| {
        let grouping_type = HostType::grouping(HostType::String, person_type());
        let grouping = b.parameter("g", grouping_type.clone());
        let root = b.member(grouping.clone(), "Key", HostType::String);
        (
            root.clone(),
            vec![(
                grouping,
                Serializer::Grouping(GroupingSerializer {
                    grouping_type,
                    key: Box::new(Serializer::String),
                    element: Box::new(person_document_serializer()),
                }),
            )],
            vec![(root, Serializer::String)],
        )
    },
);

test_deduce!(
    document_members_resolve_through_the_member_map,
    |b: &mut ExpressionBuilder| {
        let person = b.parameter("p", person_type());
        let root = b.member(person.clone(), "Name", HostType::String);
        (
            root.clone(),
            vec![(person, person_document_serializer())],
            vec![(root, Serializer::String)],
        )
    },
);

test_deduce!(
    members_of_an_unknowable_receiver_are_unknowable,
    |b: &mut ExpressionBuilder| {
        let person = b.parameter("p", person_type());
        let root = b.member(person.clone(), "Name", HostType::String);
        (
            root.clone(),
            vec![(person, Serializer::unknowable(&person_type()))],
            vec![(root, Serializer::unknowable(&HostType::String))],
        )
    },
);

test_deduce_error!(
    missing_member_is_a_hard_failure,
    |b: &mut ExpressionBuilder| {
        let person = b.parameter("p", person_type());
        let root = b.member(person.clone(), "Totale", HostType::Int32);
        (
            root,
            vec![(person, person_document_serializer())],
            Error::MemberNotFound {
                type_name: "Person".to_string(),
                member: "Totale".to_string(),
            },
        )
    },
);

test_deduce_error!(
    unknown_dynamic_accessor_is_a_hard_failure,
    |b: &mut ExpressionBuilder| {
        let value = b.parameter("v", HostType::Dynamic);
        let root = b.member(value.clone(), "AsFrobnication", HostType::Int32);
        (
            root,
            vec![(value, Serializer::Dynamic)],
            Error::MemberNotFound {
                type_name: "BsonValue".to_string(),
                member: "AsFrobnication".to_string(),
            },
        )
    },
);

test_deduce_error!(
    member_access_without_document_capability_is_a_hard_failure,
    |b: &mut ExpressionBuilder| {
        let person = b.parameter("p", person_type());
        let root = b.member(person.clone(), "Name", HostType::String);
        // a dynamic serializer coerced onto a class-typed node has no
        // per-member serialization info
        (
            root.clone(),
            vec![(person, Serializer::Dynamic)],
            Error::NotADocumentSerializer {
                expression: root.to_string(),
                serializer: "Upcasting".to_string(),
            },
        )
    },
);
