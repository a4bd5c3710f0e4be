use super::*;
use crate::{
    options::LegacyPredicateFormsOption,
    serializers::{GroupingSerializer, TimeSpanUnits, TupleSerializer},
};

fn people_list_type() -> HostType {
    HostType::list(person_type())
}

fn people_seed(b: &mut ExpressionBuilder) -> (Expression, (Expression, Serializer)) {
    let people = b.parameter("people", people_list_type());
    let serializer = Serializer::sequence(&people_list_type(), person_document_serializer());
    (people.clone(), (people, serializer))
}

test_deduce!(
    select_propagates_items_down_and_the_result_up,
    |b: &mut ExpressionBuilder| {
        let (people, seed) = people_seed(b);
        let x = b.parameter("x", person_type());
        let body = b.member(x.clone(), "Name", HostType::String);
        let selector = b.lambda(vec![x.clone()], body.clone());
        let root = b.call(
            None,
            "Select",
            vec![people, selector],
            HostType::list(HostType::String),
        );
        (
            root.clone(),
            vec![seed],
            vec![
                (x, person_document_serializer()),
                (body.clone(), Serializer::String),
                (
                    root,
                    Serializer::sequence(&HostType::list(HostType::String), Serializer::String),
                ),
            ],
        )
    },
);

test_deduce!(
    where_preserves_the_collection_serializer,
    |b: &mut ExpressionBuilder| {
        let (people, seed) = people_seed(b);
        let x = b.parameter("x", person_type());
        let age = b.member(x.clone(), "Age", HostType::Int32);
        let limit = b.constant(21, HostType::Int32);
        let body = b.binary(crate::expr::BinaryOperator::Gte, age, limit, HostType::Bool);
        let predicate = b.lambda(vec![x.clone()], body);
        let root = b.call(None, "Where", vec![people, predicate], people_list_type());
        (
            root.clone(),
            vec![seed],
            vec![
                (x, person_document_serializer()),
                (
                    root,
                    Serializer::sequence(&people_list_type(), person_document_serializer()),
                ),
            ],
        )
    },
);

test_deduce!(
    order_by_then_by_assigns_both_key_selector_lambdas,
    |b: &mut ExpressionBuilder| {
        let (people, seed) = people_seed(b);
        let x1 = b.parameter("x", person_type());
        let key1 = b.member(x1.clone(), "Age", HostType::Int32);
        let selector1 = b.lambda(vec![x1.clone()], key1.clone());
        let ordered = b.call(
            None,
            "OrderBy",
            vec![people, selector1],
            people_list_type(),
        );
        let x2 = b.parameter("x", person_type());
        let key2 = b.member(x2.clone(), "Age", HostType::Int32);
        let selector2 = b.lambda(vec![x2.clone()], key2.clone());
        let root = b.call(
            None,
            "ThenBy",
            vec![ordered, selector2],
            people_list_type(),
        );
        (
            root.clone(),
            vec![seed],
            // both key selectors resolve independently; a duplicate
            // sort key is the renderer's concern, not inference's
            vec![
                (x1, person_document_serializer()),
                (key1, Serializer::Int32),
                (x2, person_document_serializer()),
                (key2, Serializer::Int32),
                (
                    root,
                    Serializer::sequence(&people_list_type(), person_document_serializer()),
                ),
            ],
        )
    },
);

test_deduce!(
    first_returns_one_source_item,
    |b: &mut ExpressionBuilder| {
        let (people, seed) = people_seed(b);
        let root = b.call(None, "First", vec![people], person_type());
        (
            root.clone(),
            vec![seed],
            vec![(root, person_document_serializer())],
        )
    },
);

test_deduce!(
    min_with_selector_mirrors_the_selector_body,
    |b: &mut ExpressionBuilder| {
        let (people, seed) = people_seed(b);
        let x = b.parameter("x", person_type());
        let body = b.member(x.clone(), "Age", HostType::Int32);
        let selector = b.lambda(vec![x], body.clone());
        let root = b.call(None, "Min", vec![people, selector], HostType::Int32);
        (
            root.clone(),
            vec![seed],
            vec![(root, Serializer::Int32)],
        )
    },
);

test_deduce!(
    count_is_numeric_and_sum_follows_the_node_type,
    |b: &mut ExpressionBuilder| {
        let (people, seed) = people_seed(b);
        let x = b.parameter("x", person_type());
        let body = b.member(x.clone(), "Age", HostType::Int32);
        let selector = b.lambda(vec![x], body);
        let sum = b.call(
            None,
            "Sum",
            vec![people.clone(), selector],
            HostType::Int32,
        );
        let count = b.call(None, "LongCount", vec![people], HostType::Int64);
        let root = b.call(
            None,
            "Create",
            vec![sum.clone(), count.clone()],
            HostType::Tuple(vec![HostType::Int32, HostType::Int64]),
        );
        (
            root,
            vec![seed],
            vec![(sum, Serializer::Int32), (count, Serializer::Int64)],
        )
    },
);

test_deduce!(
    any_with_predicate_is_boolean,
    |b: &mut ExpressionBuilder| {
        let (people, seed) = people_seed(b);
        let x = b.parameter("x", person_type());
        let name = b.member(x.clone(), "Name", HostType::String);
        let body = b.call(Some(name), "IsNullOrEmpty", vec![], HostType::Bool);
        let predicate = b.lambda(vec![x.clone()], body);
        let root = b.call(None, "Any", vec![people, predicate], HostType::Bool);
        (
            root.clone(),
            vec![seed],
            vec![(root, Serializer::Boolean), (x, person_document_serializer())],
        )
    },
);

test_deduce!(
    contains_propagates_the_item_serializer,
    |b: &mut ExpressionBuilder| {
        let values = b.parameter("xs", HostType::list(HostType::Int32));
        let item = b.parameter("x", HostType::Int32);
        let root = b.call(
            None,
            "Contains",
            vec![values.clone(), item.clone()],
            HostType::Bool,
        );
        (
            root.clone(),
            vec![(
                values,
                Serializer::sequence(
                    &HostType::list(HostType::Int32),
                    int32_persisted_enum_serializer(),
                ),
            )],
            vec![
                (item, int32_persisted_enum_serializer()),
                (root, Serializer::Boolean),
            ],
        )
    },
);

test_deduce!(
    contains_key_propagates_the_key_serializer,
    |b: &mut ExpressionBuilder| {
        let dictionary_type = HostType::dictionary(HostType::String, HostType::Int32);
        let dictionary = b.parameter("d", dictionary_type.clone());
        let key = b.parameter("k", HostType::String);
        let root = b.call(
            Some(dictionary.clone()),
            "ContainsKey",
            vec![key.clone()],
            HostType::Bool,
        );
        (
            root.clone(),
            vec![(
                dictionary,
                Serializer::Dictionary(crate::serializers::DictionarySerializer {
                    dictionary_type,
                    key: Box::new(Serializer::String),
                    value: Box::new(Serializer::Int32),
                }),
            )],
            vec![(key, Serializer::String), (root, Serializer::Boolean)],
        )
    },
);

test_deduce!(
    group_by_synthesizes_a_grouping_sequence,
    |b: &mut ExpressionBuilder| {
        let (people, seed) = people_seed(b);
        let x = b.parameter("x", person_type());
        let key = b.member(x.clone(), "Name", HostType::String);
        let key_selector = b.lambda(vec![x], key);
        let grouping_type = HostType::grouping(HostType::String, person_type());
        let root = b.call(
            None,
            "GroupBy",
            vec![people, key_selector],
            HostType::list(grouping_type.clone()),
        );
        let grouping = Serializer::Grouping(GroupingSerializer {
            grouping_type: grouping_type.clone(),
            key: Box::new(Serializer::String),
            element: Box::new(person_document_serializer()),
        });
        (
            root.clone(),
            vec![seed],
            vec![(
                root,
                Serializer::sequence(&HostType::list(grouping_type), grouping),
            )],
        )
    },
);

test_deduce!(
    zip_wires_both_sources_into_the_result_selector,
    |b: &mut ExpressionBuilder| {
        let firsts = b.parameter("xs", HostType::list(HostType::Int32));
        let seconds = b.parameter("ys", HostType::list(HostType::String));
        let x = b.parameter("x", HostType::Int32);
        let y = b.parameter("y", HostType::String);
        let pair_type = HostType::Tuple(vec![HostType::Int32, HostType::String]);
        let body = b.call(
            None,
            "Create",
            vec![x.clone(), y.clone()],
            pair_type.clone(),
        );
        let result_selector = b.lambda(vec![x.clone(), y.clone()], body);
        let root = b.call(
            None,
            "Zip",
            vec![firsts.clone(), seconds.clone(), result_selector],
            HostType::list(pair_type.clone()),
        );
        (
            root.clone(),
            vec![
                (
                    firsts,
                    Serializer::sequence(&HostType::list(HostType::Int32), Serializer::Int32),
                ),
                (
                    seconds,
                    Serializer::sequence(&HostType::list(HostType::String), Serializer::String),
                ),
            ],
            vec![
                (x, Serializer::Int32),
                (y, Serializer::String),
                (
                    root,
                    Serializer::sequence(
                        &HostType::list(pair_type.clone()),
                        Serializer::Tuple(TupleSerializer {
                            tuple_type: pair_type,
                            items: vec![Serializer::Int32, Serializer::String],
                        }),
                    ),
                ),
            ],
        )
    },
);

test_deduce!(
    aggregate_with_seed_ties_the_accumulator_to_the_func_body,
    |b: &mut ExpressionBuilder| {
        let values = b.parameter("xs", HostType::list(HostType::Int32));
        let seed_value = b.constant(0, HostType::Int32);
        let accumulator = b.parameter("acc", HostType::Int32);
        let item = b.parameter("x", HostType::Int32);
        let body = b.binary(
            crate::expr::BinaryOperator::Add,
            accumulator.clone(),
            item.clone(),
            HostType::Int32,
        );
        let func = b.lambda(vec![accumulator.clone(), item.clone()], body);
        let root = b.call(
            None,
            "Aggregate",
            vec![values.clone(), seed_value.clone(), func],
            HostType::Int32,
        );
        (
            root.clone(),
            vec![(
                values,
                Serializer::sequence(
                    &HostType::list(HostType::Int32),
                    int32_persisted_enum_serializer(),
                ),
            )],
            vec![
                (item, int32_persisted_enum_serializer()),
                (root, int32_persisted_enum_serializer()),
            ],
        )
    },
);

test_deduce!(
    trig_functions_return_double,
    |b: &mut ExpressionBuilder| {
        let x = b.parameter("x", HostType::Double);
        let root = b.call(None, "Atan", vec![x.clone()], HostType::Double);
        (
            root.clone(),
            vec![(x, Serializer::Double)],
            vec![(root, Serializer::Double)],
        )
    },
);

test_deduce!(
    date_add_returns_date_time,
    |b: &mut ExpressionBuilder| {
        let date = b.parameter("d", HostType::DateTime);
        let days = b.constant(7, HostType::Double);
        let root = b.call(Some(date.clone()), "AddDays", vec![days], HostType::DateTime);
        (
            root.clone(),
            vec![(date, Serializer::DateTime)],
            vec![(root, Serializer::DateTime)],
        )
    },
);

test_deduce!(
    subtract_result_depends_on_the_overload,
    |b: &mut ExpressionBuilder| {
        let d1 = b.parameter("d1", HostType::DateTime);
        let d2 = b.parameter("d2", HostType::DateTime);
        let as_span = b.call(
            Some(d1.clone()),
            "Subtract",
            vec![d2.clone()],
            HostType::TimeSpan,
        );
        let d3 = b.parameter("d3", HostType::DateTime);
        let d4 = b.parameter("d4", HostType::DateTime);
        let as_ticks = b.call(
            Some(d3.clone()),
            "Subtract",
            vec![d4.clone()],
            HostType::Int64,
        );
        let root = b.call(
            None,
            "Create",
            vec![as_span.clone(), as_ticks.clone()],
            HostType::Tuple(vec![HostType::TimeSpan, HostType::Int64]),
        );
        (
            root,
            vec![
                (d1, Serializer::DateTime),
                (d2, Serializer::DateTime),
                (d3, Serializer::DateTime),
                (d4, Serializer::DateTime),
            ],
            vec![
                (
                    as_span,
                    Serializer::TimeSpan(TimeSpanUnits::Milliseconds),
                ),
                (as_ticks, Serializer::Int64),
            ],
        )
    },
);

test_deduce!(
    parse_follows_the_declaring_type,
    |b: &mut ExpressionBuilder| {
        let text = b.parameter("s", HostType::String);
        let root = b.call(None, "Parse", vec![text.clone()], HostType::DateTime);
        (
            root.clone(),
            vec![(text, Serializer::String)],
            vec![(root, Serializer::DateTime)],
        )
    },
);

test_deduce!(
    tuple_create_synthesizes_from_known_arguments,
    |b: &mut ExpressionBuilder| {
        let first = b.parameter("a", HostType::String);
        let second = b.parameter("n", HostType::Int32);
        let tuple_type = HostType::Tuple(vec![HostType::String, HostType::Int32]);
        let root = b.call(
            None,
            "Create",
            vec![first.clone(), second.clone()],
            tuple_type.clone(),
        );
        (
            root.clone(),
            vec![
                (first, Serializer::String),
                (second, int32_persisted_enum_serializer()),
            ],
            vec![(
                root,
                Serializer::Tuple(TupleSerializer {
                    tuple_type,
                    items: vec![Serializer::String, int32_persisted_enum_serializer()],
                }),
            )],
        )
    },
);

test_deduce!(
    tuple_create_binds_a_known_result_to_unknown_arguments,
    |b: &mut ExpressionBuilder| {
        let first = b.parameter("a", HostType::String);
        let second = b.parameter("n", HostType::Int32);
        let tuple_type = HostType::Tuple(vec![HostType::String, HostType::Int32]);
        let root = b.call(
            None,
            "Create",
            vec![first.clone(), second.clone()],
            tuple_type.clone(),
        );
        (
            root.clone(),
            vec![(
                root.clone(),
                Serializer::Tuple(TupleSerializer {
                    tuple_type,
                    items: vec![Serializer::String, int32_persisted_enum_serializer()],
                }),
            )],
            vec![
                (first, Serializer::String),
                (second, int32_persisted_enum_serializer()),
            ],
        )
    },
);

test_deduce!(
    pipeline_convert_follows_the_declared_target_type,
    |b: &mut ExpressionBuilder| {
        let value = b.parameter("v", HostType::String);
        let root = b.call(None, "Convert", vec![value.clone()], HostType::Int64);
        (
            root.clone(),
            vec![(value, Serializer::String)],
            vec![(root, Serializer::Int64)],
        )
    },
);

test_deduce!(
    field_reads_the_member_serializer_from_the_container,
    |b: &mut ExpressionBuilder| {
        let person = b.parameter("p", person_type());
        let name = b.constant("Name", HostType::String);
        let root = b.call(
            None,
            "Field",
            vec![person.clone(), name],
            HostType::String,
        );
        (
            root.clone(),
            vec![(person, person_document_serializer())],
            vec![(root, Serializer::String)],
        )
    },
);

test_deduce!(
    append_stage_marks_the_stage_definition_ignored,
    |b: &mut ExpressionBuilder| {
        let (people, seed) = people_seed(b);
        let stage = b.constant(
            bson::bson!({ "$limit": 10i32 }),
            HostType::Dynamic,
        );
        let root = b.call(
            None,
            "AppendStage",
            vec![people, stage.clone()],
            people_list_type(),
        );
        (
            root.clone(),
            vec![seed],
            vec![
                (stage, Serializer::IgnoreSubtree),
                (
                    root,
                    Serializer::sequence(&people_list_type(), person_document_serializer()),
                ),
            ],
        )
    },
);

test_deduce!(
    top_n_yields_an_array_of_the_selector_result,
    |b: &mut ExpressionBuilder| {
        let grouping_type = HostType::grouping(HostType::String, person_type());
        let group = b.parameter("g", grouping_type.clone());
        let sort_by = b.constant(bson::bson!({ "Age": -1i32 }), HostType::Dynamic);
        let x = b.parameter("x", person_type());
        let body = b.member(x.clone(), "Name", HostType::String);
        let selector = b.lambda(vec![x], body);
        let n = b.constant(3, HostType::Int32);
        let root = b.call(
            None,
            "TopN",
            vec![group.clone(), sort_by.clone(), selector, n],
            HostType::array(HostType::String),
        );
        (
            root.clone(),
            vec![(
                group,
                Serializer::Grouping(GroupingSerializer {
                    grouping_type,
                    key: Box::new(Serializer::String),
                    element: Box::new(person_document_serializer()),
                }),
            )],
            vec![
                (sort_by, Serializer::IgnoreSubtree),
                (
                    root,
                    Serializer::sequence(&HostType::array(HostType::String), Serializer::String),
                ),
            ],
        )
    },
);

test_deduce!(
    lookup_builds_the_lookup_result_shape,
    |b: &mut ExpressionBuilder| {
        let (people, seed) = people_seed(b);
        let orders = Arc::new(ClassType {
            name: "Order".to_string(),
            base: None,
            members: vec![ClassMember {
                name: "Total".to_string(),
                ty: HostType::Int32,
            }],
            constructors: vec![],
        });
        let order_type = HostType::Class(Arc::clone(&orders));
        let order_document =
            Serializer::Document(crate::finder::new_expression::auto_map_class(&orders));

        let dp = b.parameter("p", person_type());
        let documents_body = b.parameter("orders", HostType::list(order_type.clone()));
        let documents = b.lambda(vec![dp], documents_body.clone());

        let lp = b.parameter("p", person_type());
        let local_body = b.member(lp.clone(), "Name", HostType::String);
        let local_field = b.lambda(vec![lp], local_body);

        let fp = b.parameter("o", order_type.clone());
        let foreign_body = b.member(fp.clone(), "Total", HostType::Int32);
        let foreign_field = b.lambda(vec![fp.clone()], foreign_body);

        let result_type = HostType::lookup_result(person_type(), order_type.clone());
        let root = b.call(
            None,
            "Lookup",
            vec![people, documents, local_field, foreign_field],
            HostType::list(result_type.clone()),
        );
        let expected = Serializer::LookupResult(crate::serializers::LookupResultSerializer {
            result_type: result_type.clone(),
            local: Box::new(person_document_serializer()),
            results: Box::new(Serializer::sequence(
                &HostType::array(order_type.clone()),
                order_document.clone(),
            )),
        });
        (
            root.clone(),
            vec![
                seed,
                (
                    documents_body,
                    Serializer::sequence(&HostType::list(order_type), order_document.clone()),
                ),
            ],
            vec![
                (fp, order_document),
                (
                    root,
                    Serializer::sequence(&HostType::list(result_type), expected),
                ),
            ],
        )
    },
);

#[test]
fn inject_is_boolean_when_legacy_forms_are_enabled() {
    let mut b = ExpressionBuilder::new();
    let filter = b.constant(bson::bson!({ "Age": 21i32 }), HostType::Dynamic);
    let root = b.call(None, "Inject", vec![filter.clone()], HostType::Bool);
    let map = find_with_options(
        &root,
        vec![],
        FinderOptions::new(LegacyPredicateFormsOption::Enabled),
    )
    .unwrap();
    assert_eq!(map.known_serializer(root.id), Some(&Serializer::Boolean));
    assert_eq!(
        map.known_serializer(filter.id),
        Some(&Serializer::IgnoreSubtree)
    );
}

#[test]
fn inject_is_unknowable_when_legacy_forms_are_disabled() {
    let mut b = ExpressionBuilder::new();
    let filter = b.constant(bson::bson!({ "Age": 21i32 }), HostType::Dynamic);
    let root = b.call(None, "Inject", vec![filter], HostType::Bool);
    let map = find(&root, vec![]).unwrap();
    assert_eq!(
        map.known_serializer(root.id),
        Some(&Serializer::unknowable(&HostType::Bool))
    );
}

test_deduce_error!(
    an_unrecognized_method_fails_immediately,
    |b: &mut ExpressionBuilder| {
        let x = b.parameter("x", HostType::Int32);
        let root = b.call(Some(x.clone()), "Frobnicate", vec![], HostType::Int32);
        (
            root.clone(),
            vec![(x, Serializer::Int32)],
            Error::NotSupported {
                expression: root.to_string(),
                reason: "the method Frobnicate has no serializer deduction rule".to_string(),
            },
        )
    },
);

#[test]
fn a_recognized_method_with_an_unmatched_shape_is_unknowable() {
    let mut b = ExpressionBuilder::new();
    let x = b.parameter("x", HostType::Int32);
    // Select with no selector argument matches no overload
    let root = b.call(None, "Select", vec![x.clone()], HostType::Int32);
    let map = find(&root, vec![(x, Serializer::Int32)]).unwrap();
    assert_eq!(
        map.known_serializer(root.id),
        Some(&Serializer::unknowable(&HostType::Int32))
    );
}
