use crate::{
    expr::{Expression, MethodCall},
    finder::{visitor::InferenceVisitor, Error, Result},
    host::HostType,
    options::LegacyPredicateFormsOption,
    serializers::{
        standard_serializer, GroupingSerializer, KeyValuePairSerializer, LookupResultSerializer,
        Serializer, TimeSpanUnits, TupleSerializer,
    },
};

// Method calls are dispatched by name, then disambiguated by receiver
// and argument shape. Every recognized name has its own deduction
// routine; a recognized name whose shape matches no overload falls
// through to the unknowable sentinel, while an unrecognized name is a
// hard translation failure so nothing is silently assumed translatable.

impl InferenceVisitor<'_> {
    pub(super) fn deduce_method_call(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match call.method.as_str() {
            "Abs" => self.deduce_abs(node, call),
            "Acos" | "Acosh" | "Asin" | "Asinh" | "Atan" | "Atan2" | "Atanh" | "Cos" | "Cosh"
            | "DegreesToRadians" | "Exp" | "Ln" | "Log" | "Log10" | "Pow"
            | "RadiansToDegrees" | "Sin" | "Sinh" | "Sqrt" | "Tan" | "Tanh" => {
                self.deduce_math_returning_double(node, call)
            }
            "Ceiling" | "Floor" | "Round" => self.deduce_ceiling_or_floor(node, call),
            "Truncate" => self.deduce_truncate(node, call),
            "Add" | "AddDays" | "AddHours" | "AddMilliseconds" | "AddMinutes" | "AddMonths"
            | "AddQuarters" | "AddSeconds" | "AddTicks" | "AddWeeks" | "AddYears" => {
                self.deduce_date_add(node, call)
            }
            "Week" => self.deduce_week(node, call),
            "Subtract" => self.deduce_subtract(node, call),
            "Parse" => self.deduce_parse(node, call),
            "Select" => self.deduce_select(node, call),
            "SelectMany" => self.deduce_select_many(node, call),
            "Where" | "SkipWhile" | "TakeWhile" => self.deduce_filtering(node, call),
            "OrderBy" | "OrderByDescending" | "ThenBy" | "ThenByDescending" => {
                self.deduce_order_by(node, call)
            }
            "Skip" | "Take" => self.deduce_skip_or_take(node, call),
            "Distinct" | "Reverse" | "AsQueryable" | "AsEnumerable" | "ToArray" | "ToList" => {
                self.deduce_same_items(node, call)
            }
            "Concat" => self.deduce_concat(node, call),
            "Union" | "Except" | "Intersect" => self.deduce_set_operation(node, call),
            "Append" | "Prepend" => self.deduce_append_or_prepend(node, call),
            "DefaultIfEmpty" => self.deduce_default_if_empty(node, call),
            "Range" => self.deduce_range(node, call),
            "Repeat" => self.deduce_repeat(node, call),
            "OfType" => self.deduce_of_type(node, call),
            "ElementAt" | "ElementAtOrDefault" => self.deduce_element_at(node, call),
            "First" | "FirstOrDefault" | "Last" | "LastOrDefault" | "Single"
            | "SingleOrDefault" => self.deduce_first_or_last(node, call),
            "Min" | "Max" => self.deduce_min_or_max(node, call),
            "Sum" | "Average" | "StandardDeviationPopulation" | "StandardDeviationSample" => {
                self.deduce_aggregation(node, call)
            }
            "Count" | "LongCount" => self.deduce_count(node, call),
            "Any" => self.deduce_any(node, call),
            "All" => self.deduce_all(node, call),
            "Aggregate" => self.deduce_fold(node, call),
            "GroupBy" => self.deduce_group_by(node, call),
            "Join" => self.deduce_join(node, call),
            "GroupJoin" => self.deduce_group_join(node, call),
            "Zip" => self.deduce_zip(node, call),
            "SequenceEqual" => self.deduce_sequence_equal(node, call),
            "SetEquals" | "IsSubsetOf" => self.deduce_set_comparison(node, call),
            "Contains" => self.deduce_contains(node, call),
            "ContainsKey" => self.deduce_contains_key(node, call),
            "ContainsValue" => self.deduce_contains_value(node, call),
            "Substring" | "SubstrBytes" => self.deduce_substring(node, call),
            "Split" => self.deduce_split(node, call),
            "Trim" | "TrimStart" | "TrimEnd" | "ToLower" | "ToLowerInvariant" | "ToUpper"
            | "ToUpperInvariant" => self.deduce_string_transform(node, call),
            "ToString" => self.deduce_to_string(node, call),
            "Compare" | "CompareTo" => self.deduce_compare(node, call),
            "IndexOf" | "IndexOfBytes" | "StrLenBytes" => self.deduce_string_int(node, call),
            "StartsWith" | "EndsWith" | "IsNullOrEmpty" | "IsNullOrWhiteSpace" | "IsMatch" => {
                self.deduce_string_predicate(node, call)
            }
            "Equals" => self.deduce_equals(node, call),
            "Create" => self.deduce_create(node, call),
            "Field" => self.deduce_field(node, call),
            "Constant" => self.deduce_pipeline_constant(node, call),
            "Convert" => self.deduce_pipeline_convert(node, call),
            "Exists" | "IsMissing" | "IsNullOrMissing" => self.deduce_field_predicate(node, call),
            "As" => self.deduce_as(node, call),
            "Documents" => self.deduce_documents(node, call),
            "Lookup" => self.deduce_lookup(node, call),
            "AppendStage" => self.deduce_append_stage(node, call),
            "SetWindowFields" => self.deduce_set_window_fields(node, call),
            "Top" | "Bottom" => self.deduce_pick(node, call),
            "TopN" | "BottomN" => self.deduce_pick_n_sorted(node, call),
            "FirstN" | "LastN" | "MaxN" | "MinN" => self.deduce_pick_n(node, call),
            "AllElements" | "AllMatchingElements" => self.deduce_all_elements(node, call),
            "FirstMatchingElement" => self.deduce_first_matching_element(node, call),
            "Inject" => self.deduce_inject(node, call),
            "StringIn" => self.deduce_string_in(node, call),
            "get_Item" => self.deduce_get_item(node, call),
            _ => Err(Error::NotSupported {
                expression: node.to_string(),
                reason: format!("the method {} has no serializer deduction rule", call.method),
            }),
        }
    }

    /// A recognized method name whose receiver/argument shape matches
    /// no known overload: evaluated client-side, never guessed.
    fn deduce_unknown_overload(&mut self, node: &Expression) -> Result<()> {
        self.deduce_unknowable(node)
    }

    fn deduce_returns_numeric(&mut self, node: &Expression) -> Result<()> {
        if node.ty.is_numeric_or_nullable_numeric() {
            if let Some(default) = standard_serializer(&node.ty) {
                self.deduce_fixed(node, default)?;
            }
        }
        Ok(())
    }

    fn deduce_returns_one_source_item(
        &mut self,
        node: &Expression,
        source: &Expression,
    ) -> Result<()> {
        if self.is_not_known(node) {
            if let Some(source_serializer) = self.known(source) {
                if source_serializer.is_unknowable() {
                    return self.deduce_unknowable(node);
                }
                let item = source_serializer.item_serializer().cloned();
                self.deduce_serializer(node, item)?;
            }
        }
        Ok(())
    }

    // ----- math -----

    fn deduce_abs(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match call.arguments.as_slice() {
            [value] if call.object.is_none() && value.ty.is_numeric() => {
                self.deduce_serializers(node, value)
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_math_returning_double(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        if call.object.is_none() && node.ty == HostType::Double {
            self.deduce_fixed(node, Serializer::Double)
        } else {
            self.deduce_unknown_overload(node)
        }
    }

    fn deduce_ceiling_or_floor(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        if call.object.is_none() && node.ty.is_numeric() {
            self.deduce_returns_numeric(node)
        } else {
            self.deduce_unknown_overload(node)
        }
    }

    fn deduce_truncate(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        let receiver_is_date = call
            .object
            .as_ref()
            .map(|o| o.ty == HostType::DateTime)
            .unwrap_or(false);
        if receiver_is_date || node.ty == HostType::DateTime {
            self.deduce_fixed(node, Serializer::DateTime)
        } else if node.ty.is_numeric() {
            self.deduce_returns_numeric(node)
        } else {
            self.deduce_unknown_overload(node)
        }
    }

    // ----- date/time -----

    fn deduce_date_add(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        let receiver_is_date = call
            .object
            .as_ref()
            .map(|o| o.ty == HostType::DateTime)
            .unwrap_or(false);
        if receiver_is_date && node.ty == HostType::DateTime {
            self.deduce_fixed(node, Serializer::DateTime)
        } else {
            self.deduce_unknown_overload(node)
        }
    }

    fn deduce_week(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        let date_shaped = call
            .object
            .as_ref()
            .map(|o| o.ty == HostType::DateTime)
            .unwrap_or(false)
            || call
                .arguments
                .first()
                .map(|a| a.ty == HostType::DateTime)
                .unwrap_or(false);
        if date_shaped {
            self.deduce_fixed(node, Serializer::Int32)
        } else {
            self.deduce_unknown_overload(node)
        }
    }

    /// Subtraction of date-times yields a date-time, an int64 tick
    /// count, or a millisecond time-span depending on the overload.
    fn deduce_subtract(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        let receiver_is_date = call
            .object
            .as_ref()
            .map(|o| o.ty == HostType::DateTime)
            .unwrap_or(false);
        if !receiver_is_date {
            return self.deduce_unknown_overload(node);
        }
        match &node.ty {
            HostType::DateTime => self.deduce_fixed(node, Serializer::DateTime),
            HostType::Int64 => self.deduce_fixed(node, Serializer::Int64),
            HostType::TimeSpan => {
                self.deduce_fixed(node, Serializer::TimeSpan(TimeSpanUnits::Milliseconds))
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_parse(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        let string_shaped = call.object.is_none()
            && matches!(call.arguments.as_slice(), [value] if value.ty == HostType::String);
        if !string_shaped {
            return self.deduce_unknown_overload(node);
        }
        let serializer = match node.ty {
            HostType::DateTime => Serializer::DateTime,
            HostType::Decimal => Serializer::Decimal,
            HostType::Double => Serializer::Double,
            HostType::Int32 => Serializer::Int32,
            HostType::Int64 => Serializer::Int64,
            _ => Serializer::unknowable(&node.ty),
        };
        self.deduce_fixed(node, serializer)
    }

    // ----- sequence operators -----

    fn deduce_select(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match call.arguments.as_slice() {
            [source, selector] if call.object.is_none() => {
                let selector = self.lambda_of(selector)?;
                match selector.parameters.as_slice() {
                    [parameter] => {
                        self.deduce_item_and_collection_serializers(parameter, source)?;
                        self.deduce_collection_and_item_serializers(node, &selector.body)
                    }
                    _ => self.deduce_unknown_overload(node),
                }
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_select_many(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        if call.object.is_some() {
            return self.deduce_unknown_overload(node);
        }
        match call.arguments.as_slice() {
            [source, selector] => {
                let selector = self.lambda_of(selector)?;
                match selector.parameters.as_slice() {
                    [parameter] => {
                        self.deduce_item_and_collection_serializers(parameter, source)?;
                        self.deduce_collection_and_collection_serializers(node, &selector.body)
                    }
                    _ => self.deduce_unknown_overload(node),
                }
            }
            [source, collection_selector, result_selector] => {
                let collection_selector = self.lambda_of(collection_selector)?;
                let result_selector = self.lambda_of(result_selector)?;
                match (
                    collection_selector.parameters.as_slice(),
                    result_selector.parameters.as_slice(),
                ) {
                    ([collection_parameter], [source_parameter, item_parameter]) => {
                        self.deduce_item_and_collection_serializers(collection_parameter, source)?;
                        self.deduce_item_and_collection_serializers(source_parameter, source)?;
                        self.deduce_item_and_collection_serializers(
                            item_parameter,
                            &collection_selector.body,
                        )?;
                        self.deduce_collection_and_item_serializers(node, &result_selector.body)
                    }
                    _ => self.deduce_unknown_overload(node),
                }
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_filtering(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match call.arguments.as_slice() {
            [source, predicate] if call.object.is_none() => {
                let predicate = self.lambda_of(predicate)?;
                match predicate.parameters.as_slice() {
                    [parameter] => {
                        self.deduce_item_and_collection_serializers(parameter, source)?;
                        self.deduce_collection_and_collection_serializers(node, source)
                    }
                    _ => self.deduce_unknown_overload(node),
                }
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_order_by(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match call.arguments.as_slice() {
            [source, key_selector] if call.object.is_none() => {
                let key_selector = self.lambda_of(key_selector)?;
                match key_selector.parameters.as_slice() {
                    [parameter] => {
                        self.deduce_item_and_collection_serializers(parameter, source)?;
                        self.deduce_collection_and_collection_serializers(node, source)
                    }
                    _ => self.deduce_unknown_overload(node),
                }
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_skip_or_take(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match call.arguments.as_slice() {
            [source, _count] if call.object.is_none() => {
                self.deduce_collection_and_collection_serializers(node, source)
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_same_items(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match call.arguments.as_slice() {
            [source] if call.object.is_none() => {
                self.deduce_collection_and_collection_serializers(node, source)
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_concat(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        if node.ty == HostType::String {
            return self.deduce_fixed(node, Serializer::String);
        }
        self.deduce_set_operation(node, call)
    }

    fn deduce_set_operation(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match call.arguments.as_slice() {
            [first, second] if call.object.is_none() => {
                self.deduce_collection_and_collection_serializers(node, first)?;
                self.deduce_collection_and_collection_serializers(node, second)?;
                self.deduce_collection_and_collection_serializers(first, second)
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_append_or_prepend(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match call.arguments.as_slice() {
            [source, element] if call.object.is_none() => {
                self.deduce_item_and_collection_serializers(element, source)?;
                self.deduce_collection_and_collection_serializers(node, source)
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_default_if_empty(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        if call.object.is_some() {
            return self.deduce_unknown_overload(node);
        }
        match call.arguments.as_slice() {
            [source] => self.deduce_collection_and_collection_serializers(node, source),
            [source, default_value] => {
                self.deduce_item_and_collection_serializers(default_value, source)?;
                self.deduce_collection_and_collection_serializers(node, source)
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_range(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match call.arguments.as_slice() {
            [start, _count] if call.object.is_none() => {
                self.deduce_collection_and_item_serializers(node, start)
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_repeat(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match call.arguments.as_slice() {
            [element, _count] if call.object.is_none() => {
                self.deduce_collection_and_item_serializers(node, element)
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_of_type(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match call.arguments.as_slice() {
            [source] if call.object.is_none() => {
                if node.ty.item_type() == source.ty.item_type() {
                    return self.deduce_collection_and_collection_serializers(node, source);
                }
                if let Some(HostType::Class(class)) = node.ty.item_type() {
                    let item = Serializer::Document(super::new_expression::auto_map_class(class));
                    return self.deduce_fixed(node, Serializer::sequence(&node.ty, item));
                }
                Ok(())
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_element_at(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match call.arguments.as_slice() {
            [source, _index] if call.object.is_none() => {
                self.deduce_returns_one_source_item(node, source)
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_first_or_last(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        if call.object.is_some() {
            return self.deduce_unknown_overload(node);
        }
        match call.arguments.as_slice() {
            [source] => self.deduce_returns_one_source_item(node, source),
            [source, predicate] => {
                let predicate = self.lambda_of(predicate)?;
                match predicate.parameters.as_slice() {
                    [parameter] => {
                        self.deduce_item_and_collection_serializers(parameter, source)?;
                        self.deduce_returns_one_source_item(node, source)
                    }
                    _ => self.deduce_unknown_overload(node),
                }
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_min_or_max(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        if call.object.is_some() {
            return self.deduce_unknown_overload(node);
        }
        match call.arguments.as_slice() {
            [source] => self.deduce_returns_one_source_item(node, source),
            [source, selector] => {
                let selector = self.lambda_of(selector)?;
                match selector.parameters.as_slice() {
                    [parameter] => {
                        self.deduce_item_and_collection_serializers(parameter, source)?;
                        self.deduce_serializers(node, &selector.body)
                    }
                    _ => self.deduce_unknown_overload(node),
                }
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_aggregation(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        if call.object.is_some() {
            return self.deduce_unknown_overload(node);
        }
        match call.arguments.as_slice() {
            [_source] => self.deduce_returns_numeric(node),
            [source, selector] => {
                let selector = self.lambda_of(selector)?;
                match selector.parameters.as_slice() {
                    [parameter] => {
                        self.deduce_item_and_collection_serializers(parameter, source)?;
                        self.deduce_returns_numeric(node)
                    }
                    _ => self.deduce_unknown_overload(node),
                }
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_count(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        if call.object.is_some() {
            return self.deduce_unknown_overload(node);
        }
        match call.arguments.as_slice() {
            [_source] => self.deduce_returns_numeric(node),
            [source, predicate] => {
                let predicate = self.lambda_of(predicate)?;
                match predicate.parameters.as_slice() {
                    [parameter] => {
                        self.deduce_item_and_collection_serializers(parameter, source)?;
                        self.deduce_returns_numeric(node)
                    }
                    _ => self.deduce_unknown_overload(node),
                }
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_any(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        if call.object.is_some() {
            return self.deduce_unknown_overload(node);
        }
        match call.arguments.as_slice() {
            [_source] => self.deduce_fixed(node, Serializer::Boolean),
            [source, predicate] => {
                let predicate = self.lambda_of(predicate)?;
                match predicate.parameters.as_slice() {
                    [parameter] => {
                        self.deduce_item_and_collection_serializers(parameter, source)?;
                        self.deduce_fixed(node, Serializer::Boolean)
                    }
                    _ => self.deduce_unknown_overload(node),
                }
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_all(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match call.arguments.as_slice() {
            [source, predicate] if call.object.is_none() => {
                let predicate = self.lambda_of(predicate)?;
                match predicate.parameters.as_slice() {
                    [parameter] => {
                        self.deduce_item_and_collection_serializers(parameter, source)?;
                        self.deduce_fixed(node, Serializer::Boolean)
                    }
                    _ => self.deduce_unknown_overload(node),
                }
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_fold(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        if call.object.is_some() {
            return self.deduce_unknown_overload(node);
        }
        match call.arguments.as_slice() {
            [source, func] => {
                let func = self.lambda_of(func)?;
                match func.parameters.as_slice() {
                    [accumulator, item] => {
                        self.deduce_item_and_collection_serializers(accumulator, source)?;
                        self.deduce_item_and_collection_serializers(item, source)?;
                        self.deduce_item_and_collection_serializers(&func.body, source)?;
                        self.deduce_serializers(node, &func.body)
                    }
                    _ => self.deduce_unknown_overload(node),
                }
            }
            [source, seed, func] => {
                let func = self.lambda_of(func)?;
                match func.parameters.as_slice() {
                    [accumulator, item] => {
                        self.deduce_serializers(seed, &func.body)?;
                        self.deduce_serializers(accumulator, &func.body)?;
                        self.deduce_item_and_collection_serializers(item, source)?;
                        self.deduce_serializers(node, &func.body)
                    }
                    _ => self.deduce_unknown_overload(node),
                }
            }
            [source, seed, func, result_selector] => {
                let func = self.lambda_of(func)?;
                let result_selector = self.lambda_of(result_selector)?;
                match (
                    func.parameters.as_slice(),
                    result_selector.parameters.as_slice(),
                ) {
                    ([accumulator, item], [result_accumulator]) => {
                        self.deduce_serializers(seed, &func.body)?;
                        self.deduce_serializers(accumulator, &func.body)?;
                        self.deduce_item_and_collection_serializers(item, source)?;
                        self.deduce_serializers(result_accumulator, &func.body)?;
                        self.deduce_serializers(node, &result_selector.body)
                    }
                    _ => self.deduce_unknown_overload(node),
                }
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_group_by(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        if call.object.is_some() {
            return self.deduce_unknown_overload(node);
        }
        match call.arguments.as_slice() {
            [source, key_selector] => {
                let key_selector = self.lambda_of(key_selector)?;
                let [key_parameter] = key_selector.parameters.as_slice() else {
                    return self.deduce_unknown_overload(node);
                };
                self.deduce_item_and_collection_serializers(key_parameter, source)?;
                self.deduce_grouping_result(node, &key_selector.body, source)
            }
            [source, key_selector, second] => {
                let key_selector = self.lambda_of(key_selector)?;
                let [key_parameter] = key_selector.parameters.as_slice() else {
                    return self.deduce_unknown_overload(node);
                };
                self.deduce_item_and_collection_serializers(key_parameter, source)?;
                let second_lambda = self.lambda_of(second)?;
                match second_lambda.parameters.as_slice() {
                    // element selector
                    [element_parameter] => {
                        self.deduce_item_and_collection_serializers(element_parameter, source)?;
                        if self.is_not_known(node) {
                            if let (Some(key), Some(element)) = (
                                self.known(&key_selector.body),
                                self.known(&second_lambda.body),
                            ) {
                                self.add_grouping_sequence(node, key, element)?;
                            }
                        }
                        Ok(())
                    }
                    // result selector over (key, elements)
                    [result_key_parameter, result_elements_parameter] => {
                        self.deduce_serializers(result_key_parameter, &key_selector.body)?;
                        self.deduce_collection_and_collection_serializers(
                            result_elements_parameter,
                            source,
                        )?;
                        self.deduce_collection_and_item_serializers(node, &second_lambda.body)
                    }
                    _ => self.deduce_unknown_overload(node),
                }
            }
            [source, key_selector, element_selector, result_selector] => {
                let key_selector = self.lambda_of(key_selector)?;
                let element_selector = self.lambda_of(element_selector)?;
                let result_selector = self.lambda_of(result_selector)?;
                match (
                    key_selector.parameters.as_slice(),
                    element_selector.parameters.as_slice(),
                    result_selector.parameters.as_slice(),
                ) {
                    ([key_parameter], [element_parameter], [result_key_parameter, result_elements_parameter]) =>
                    {
                        self.deduce_item_and_collection_serializers(key_parameter, source)?;
                        self.deduce_item_and_collection_serializers(element_parameter, source)?;
                        self.deduce_serializers(result_key_parameter, &key_selector.body)?;
                        self.deduce_collection_and_item_serializers(
                            result_elements_parameter,
                            &element_selector.body,
                        )?;
                        self.deduce_collection_and_item_serializers(node, &result_selector.body)
                    }
                    _ => self.deduce_unknown_overload(node),
                }
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_grouping_result(
        &mut self,
        node: &Expression,
        key_body: &Expression,
        source: &Expression,
    ) -> Result<()> {
        if self.is_not_known(node) {
            if let (Some(key), Some(element)) =
                (self.known(key_body), self.item_serializer_known(source))
            {
                self.add_grouping_sequence(node, key, element)?;
            }
        }
        Ok(())
    }

    fn add_grouping_sequence(
        &mut self,
        node: &Expression,
        key: Serializer,
        element: Serializer,
    ) -> Result<()> {
        let Some(grouping_type) = node.ty.item_type().cloned() else {
            return Ok(());
        };
        let grouping = Serializer::Grouping(GroupingSerializer {
            grouping_type,
            key: Box::new(key),
            element: Box::new(element),
        });
        self.add_known(node, Serializer::sequence(&node.ty, grouping))
    }

    fn deduce_join(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        if call.object.is_some() {
            return self.deduce_unknown_overload(node);
        }
        match call.arguments.as_slice() {
            [outer, inner, outer_key_selector, inner_key_selector, result_selector] => {
                let outer_key_selector = self.lambda_of(outer_key_selector)?;
                let inner_key_selector = self.lambda_of(inner_key_selector)?;
                let result_selector = self.lambda_of(result_selector)?;
                match (
                    outer_key_selector.parameters.as_slice(),
                    inner_key_selector.parameters.as_slice(),
                    result_selector.parameters.as_slice(),
                ) {
                    ([outer_key_parameter], [inner_key_parameter], [result_outer_parameter, result_inner_parameter]) =>
                    {
                        self.deduce_item_and_collection_serializers(outer_key_parameter, outer)?;
                        self.deduce_item_and_collection_serializers(inner_key_parameter, inner)?;
                        self.deduce_item_and_collection_serializers(result_outer_parameter, outer)?;
                        self.deduce_item_and_collection_serializers(result_inner_parameter, inner)?;
                        self.deduce_serializers(
                            &outer_key_selector.body,
                            &inner_key_selector.body,
                        )?;
                        self.deduce_collection_and_item_serializers(node, &result_selector.body)
                    }
                    _ => self.deduce_unknown_overload(node),
                }
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_group_join(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        if call.object.is_some() {
            return self.deduce_unknown_overload(node);
        }
        match call.arguments.as_slice() {
            [outer, inner, outer_key_selector, inner_key_selector, result_selector] => {
                let outer_key_selector = self.lambda_of(outer_key_selector)?;
                let inner_key_selector = self.lambda_of(inner_key_selector)?;
                let result_selector = self.lambda_of(result_selector)?;
                match (
                    outer_key_selector.parameters.as_slice(),
                    inner_key_selector.parameters.as_slice(),
                    result_selector.parameters.as_slice(),
                ) {
                    ([outer_key_parameter], [inner_key_parameter], [result_outer_parameter, result_inner_items_parameter]) =>
                    {
                        self.deduce_item_and_collection_serializers(outer_key_parameter, outer)?;
                        self.deduce_item_and_collection_serializers(inner_key_parameter, inner)?;
                        self.deduce_item_and_collection_serializers(result_outer_parameter, outer)?;
                        self.deduce_collection_and_collection_serializers(
                            result_inner_items_parameter,
                            inner,
                        )?;
                        self.deduce_serializers(
                            &outer_key_selector.body,
                            &inner_key_selector.body,
                        )?;
                        self.deduce_collection_and_item_serializers(node, &result_selector.body)
                    }
                    _ => self.deduce_unknown_overload(node),
                }
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_zip(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        if call.object.is_some() {
            return self.deduce_unknown_overload(node);
        }
        match call.arguments.as_slice() {
            [first, second, result_selector] => {
                let result_selector = self.lambda_of(result_selector)?;
                match result_selector.parameters.as_slice() {
                    [first_parameter, second_parameter] => {
                        self.deduce_item_and_collection_serializers(first_parameter, first)?;
                        self.deduce_item_and_collection_serializers(second_parameter, second)?;
                        self.deduce_collection_and_item_serializers(node, &result_selector.body)
                    }
                    _ => self.deduce_unknown_overload(node),
                }
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_sequence_equal(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match call.arguments.as_slice() {
            [first, second] if call.object.is_none() => {
                self.deduce_collection_and_collection_serializers(first, second)?;
                self.deduce_fixed(node, Serializer::Boolean)
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_set_comparison(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match (&call.object, call.arguments.as_slice()) {
            (Some(object), [other]) if object.ty.item_type() == other.ty.item_type() => {
                self.deduce_collection_and_collection_serializers(object, other)?;
                self.deduce_fixed(node, Serializer::Boolean)
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_contains(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        // string containment
        if let Some(object) = &call.object {
            if object.ty == HostType::String {
                return self.deduce_fixed(node, Serializer::Boolean);
            }
        }
        // collection containment: static (collection, item) or
        // instance collection.Contains(item)
        let collection_and_item = match (&call.object, call.arguments.as_slice()) {
            (Some(object), [item]) => Some((object.as_ref(), item)),
            (None, [collection, item]) => Some((collection, item)),
            _ => None,
        };
        match collection_and_item {
            Some((collection, item)) if collection.ty.item_type() == Some(&item.ty) => {
                self.deduce_item_and_collection_serializers(item, collection)?;
                self.deduce_fixed(node, Serializer::Boolean)
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_contains_key(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match (&call.object, call.arguments.as_slice()) {
            (Some(dictionary), [key]) if matches!(dictionary.ty, HostType::Dictionary(..)) => {
                if self.is_not_known(key) {
                    if let Some(dictionary_serializer) = self.known(dictionary) {
                        let key_serializer = dictionary_serializer.key_serializer().cloned();
                        self.deduce_serializer(key, key_serializer)?;
                    }
                }
                self.deduce_fixed(node, Serializer::Boolean)
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_contains_value(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match (&call.object, call.arguments.as_slice()) {
            (Some(dictionary), [value]) if matches!(dictionary.ty, HostType::Dictionary(..)) => {
                if self.is_not_known(value) {
                    if let Some(dictionary_serializer) = self.known(dictionary) {
                        let value_serializer =
                            dictionary_serializer.dictionary_value_serializer().cloned();
                        self.deduce_serializer(value, value_serializer)?;
                    }
                }
                self.deduce_fixed(node, Serializer::Boolean)
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    // ----- strings -----

    fn deduce_substring(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match &call.object {
            Some(object) if object.ty == HostType::String => {
                self.deduce_fixed(node, Serializer::String)
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_split(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        let string_receiver = call
            .object
            .as_ref()
            .map(|o| o.ty == HostType::String)
            .unwrap_or(false);
        if string_receiver && node.ty.item_type() == Some(&HostType::String) {
            self.deduce_fixed(node, Serializer::sequence(&node.ty, Serializer::String))
        } else {
            self.deduce_unknown_overload(node)
        }
    }

    fn deduce_string_transform(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match &call.object {
            Some(object) if object.ty == HostType::String && node.ty == HostType::String => {
                self.deduce_fixed(node, Serializer::String)
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_to_string(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        if call.object.is_some() && node.ty == HostType::String {
            self.deduce_fixed(node, Serializer::String)
        } else {
            self.deduce_unknown_overload(node)
        }
    }

    fn deduce_compare(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        if node.ty == HostType::Int32 {
            match (&call.object, call.arguments.as_slice()) {
                (Some(object), [other]) => self.deduce_serializers(object, other)?,
                (None, [first, second]) => self.deduce_serializers(first, second)?,
                _ => return self.deduce_unknown_overload(node),
            }
            self.deduce_fixed(node, Serializer::Int32)
        } else {
            self.deduce_unknown_overload(node)
        }
    }

    fn deduce_string_int(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        let string_shaped = call
            .object
            .as_ref()
            .map(|o| o.ty == HostType::String)
            .unwrap_or(false)
            || call
                .arguments
                .first()
                .map(|a| a.ty == HostType::String)
                .unwrap_or(false);
        if string_shaped && node.ty == HostType::Int32 {
            self.deduce_fixed(node, Serializer::Int32)
        } else {
            self.deduce_unknown_overload(node)
        }
    }

    fn deduce_string_predicate(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        let string_shaped = call
            .object
            .as_ref()
            .map(|o| o.ty == HostType::String)
            .unwrap_or(false)
            || call
                .arguments
                .first()
                .map(|a| a.ty == HostType::String)
                .unwrap_or(false);
        if string_shaped && node.ty == HostType::Bool {
            self.deduce_fixed(node, Serializer::Boolean)
        } else {
            self.deduce_unknown_overload(node)
        }
    }

    fn deduce_equals(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        if node.ty != HostType::Bool {
            return self.deduce_unknown_overload(node);
        }
        match (&call.object, call.arguments.as_slice()) {
            (Some(object), [other]) => {
                self.deduce_serializers(object, other)?;
                self.deduce_fixed(node, Serializer::Boolean)
            }
            (None, [first, second]) => {
                self.deduce_serializers(first, second)?;
                self.deduce_fixed(node, Serializer::Boolean)
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    // ----- tuple and pair construction helpers -----

    fn deduce_create(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        if call.object.is_some() {
            return self.deduce_unknown_overload(node);
        }
        match &node.ty {
            HostType::Tuple(_) => self.deduce_tuple_create(node, &call.arguments),
            HostType::KeyValuePair(..) => match call.arguments.as_slice() {
                [key, value] => self.deduce_key_value_pair(node, key, value),
                _ => self.deduce_unknown_overload(node),
            },
            _ => self.deduce_unknown_overload(node),
        }
    }

    pub(super) fn deduce_tuple_create(
        &mut self,
        node: &Expression,
        arguments: &[Expression],
    ) -> Result<()> {
        // down: an already-known tuple serializer binds its positional
        // items to the argument expressions
        if let Some(node_serializer) = self.known(node) {
            for (i, argument) in arguments.iter().enumerate() {
                if self.is_not_known(argument) {
                    let mut item = node_serializer.tuple_item_serializer(i + 1).cloned();
                    if i == 7 {
                        // the eighth position nests the Rest tuple
                        item = item.and_then(|rest| rest.tuple_item_serializer(1).cloned());
                    }
                    self.deduce_serializer(argument, item)?;
                }
            }
            return Ok(());
        }
        // up: all argument serializers known, synthesize the tuple
        let argument_serializers = arguments
            .iter()
            .map(|a| self.known(a))
            .collect::<Option<Vec<_>>>();
        if let Some(mut items) = argument_serializers {
            if items.iter().any(Serializer::is_sentinel) {
                return Ok(());
            }
            if items.len() == 8 {
                let rest_type = match &node.ty {
                    HostType::Tuple(element_types) => element_types.get(7).cloned(),
                    _ => None,
                };
                if let Some(rest_type @ HostType::Tuple(_)) = rest_type {
                    let rest = items.pop().unwrap_or(Serializer::Dynamic);
                    items.push(Serializer::Tuple(TupleSerializer {
                        tuple_type: rest_type,
                        items: vec![rest],
                    }));
                }
            }
            self.add_known(
                node,
                Serializer::Tuple(TupleSerializer {
                    tuple_type: node.ty.clone(),
                    items,
                }),
            )?;
        }
        Ok(())
    }

    pub(super) fn deduce_key_value_pair(
        &mut self,
        node: &Expression,
        key: &Expression,
        value: &Expression,
    ) -> Result<()> {
        if let Some(node_serializer) = self.known(node) {
            let key_serializer = node_serializer.key_serializer().cloned();
            self.deduce_serializer(key, key_serializer)?;
            let value_serializer = node_serializer.dictionary_value_serializer().cloned();
            return self.deduce_serializer(value, value_serializer);
        }
        if let (Some(key_serializer), Some(value_serializer)) = (self.known(key), self.known(value))
        {
            if key_serializer.is_sentinel() || value_serializer.is_sentinel() {
                return Ok(());
            }
            self.add_known(
                node,
                Serializer::KeyValuePair(KeyValuePairSerializer {
                    pair_type: node.ty.clone(),
                    key: Box::new(key_serializer),
                    value: Box::new(value_serializer),
                }),
            )?;
        }
        Ok(())
    }

    // ----- pipeline helpers -----

    fn deduce_field(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match call.arguments.as_slice() {
            [container, field_name] if call.object.is_none() => {
                let field_name = field_name
                    .as_constant()
                    .and_then(|value| value.as_str())
                    .ok_or_else(|| Error::ExpectedConstant {
                        expression: node.to_string(),
                    })?;
                if self.is_not_known(node) {
                    if let Some(container_serializer) = self.known(container) {
                        if container_serializer.is_unknowable() {
                            return self.deduce_unknowable(node);
                        }
                        match container_serializer.member_serializer(field_name) {
                            Some(member_serializer) => {
                                let member_serializer = member_serializer.clone();
                                self.add_known(node, member_serializer)?;
                            }
                            None if container_serializer.as_document().is_some() => {
                                return Err(Error::MemberNotFound {
                                    type_name: container.ty.to_string(),
                                    member: field_name.to_string(),
                                });
                            }
                            None => {
                                return Err(Error::NotADocumentSerializer {
                                    expression: node.to_string(),
                                    serializer: container_serializer.kind_name().to_string(),
                                });
                            }
                        }
                    }
                }
                Ok(())
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    /// Forces the constant-rendering helper's value to the registry
    /// default immediately; this is an explicit request, not the
    /// delayed constant fallback.
    fn deduce_pipeline_constant(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match call.arguments.as_slice() {
            [value] | [value, _] if call.object.is_none() && value.ty == node.ty => {
                let serializer = standard_serializer(&node.ty);
                self.deduce_serializer(value, serializer.clone())?;
                self.deduce_serializer(node, serializer)
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    /// The server-side conversion helper: the result is always of the
    /// call's declared target type, independent of the input value.
    fn deduce_pipeline_convert(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match call.arguments.as_slice() {
            [_value] | [_value, _] if call.object.is_none() => {
                if let Some(serializer) = standard_serializer(&node.ty) {
                    return self.deduce_fixed(node, serializer);
                }
                if let HostType::Class(class) = &node.ty {
                    let document = Serializer::Document(super::new_expression::auto_map_class(class));
                    return self.deduce_fixed(node, document);
                }
                self.deduce_unknowable(node)
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_field_predicate(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        let unary_shaped = match (&call.object, call.arguments.as_slice()) {
            (Some(_), []) | (None, [_]) => true,
            _ => false,
        };
        if unary_shaped && node.ty == HostType::Bool {
            self.deduce_fixed(node, Serializer::Boolean)
        } else {
            self.deduce_unknown_overload(node)
        }
    }

    fn deduce_as(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match call.arguments.as_slice() {
            [_source] if call.object.is_none() => {
                if let Some(serializer) = standard_serializer(&node.ty) {
                    return self.deduce_fixed(node, serializer);
                }
                if let HostType::Class(class) = &node.ty {
                    let document = Serializer::Document(super::new_expression::auto_map_class(class));
                    return self.deduce_fixed(node, document);
                }
                self.deduce_unknowable(node)
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_documents(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        if call.object.is_some() {
            return self.deduce_unknown_overload(node);
        }
        match call.arguments.as_slice() {
            [documents] | [_, documents] => {
                self.deduce_collection_and_collection_serializers(node, documents)
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_lookup(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        if call.object.is_some() {
            return self.deduce_unknown_overload(node);
        }
        match call.arguments.as_slice() {
            // documents + local field + foreign field
            [source, documents, local_field, foreign_field] => {
                let documents = self.lambda_of(documents)?;
                let local_field = self.lambda_of(local_field)?;
                let foreign_field = self.lambda_of(foreign_field)?;
                match (
                    documents.parameters.as_slice(),
                    local_field.parameters.as_slice(),
                    foreign_field.parameters.as_slice(),
                ) {
                    ([documents_parameter], [local_parameter], [foreign_parameter]) => {
                        self.deduce_item_and_collection_serializers(documents_parameter, source)?;
                        self.deduce_item_and_collection_serializers(local_parameter, source)?;
                        self.deduce_item_and_collection_serializers(
                            foreign_parameter,
                            &documents.body,
                        )?;
                        self.deduce_lookup_result(node, source, &documents.body)
                    }
                    _ => self.deduce_unknown_overload(node),
                }
            }
            // documents + pipeline over (local, foreign queryable)
            [source, documents, pipeline] => {
                let documents = self.lambda_of(documents)?;
                let pipeline = self.lambda_of(pipeline)?;
                match (
                    documents.parameters.as_slice(),
                    pipeline.parameters.as_slice(),
                ) {
                    ([documents_parameter], [local_parameter, foreign_queryable_parameter]) => {
                        self.deduce_item_and_collection_serializers(documents_parameter, source)?;
                        self.deduce_item_and_collection_serializers(local_parameter, source)?;
                        self.deduce_collection_and_collection_serializers(
                            foreign_queryable_parameter,
                            &documents.body,
                        )?;
                        self.deduce_lookup_result(node, source, &pipeline.body)
                    }
                    _ => self.deduce_unknown_overload(node),
                }
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_lookup_result(
        &mut self,
        node: &Expression,
        source: &Expression,
        foreign_collection: &Expression,
    ) -> Result<()> {
        if self.is_not_known(node) {
            if let (Some(local_item), Some(foreign_item)) = (
                self.item_serializer_known(source),
                self.item_serializer_known(foreign_collection),
            ) {
                let Some(result_type) = node.ty.item_type().cloned() else {
                    return Ok(());
                };
                let HostType::LookupResult(_, foreign_type) = &result_type else {
                    return Ok(());
                };
                let results_type = HostType::array((**foreign_type).clone());
                let lookup_result = Serializer::LookupResult(LookupResultSerializer {
                    result_type,
                    local: Box::new(local_item),
                    results: Box::new(Serializer::sequence(&results_type, foreign_item)),
                });
                self.add_known(node, Serializer::sequence(&node.ty, lookup_result))?;
            }
        }
        Ok(())
    }

    fn deduce_append_stage(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match call.arguments.as_slice() {
            [source, stage] if call.object.is_none() => {
                if stage.as_constant().is_none() {
                    return Err(Error::NotSupported {
                        expression: node.to_string(),
                        reason: "the stage argument must be a constant".to_string(),
                    });
                }
                // the stage definition is an embedded literal, not
                // translatable query logic
                self.deduce_ignore_subtree(stage)?;
                self.deduce_collection_and_collection_serializers(node, source)
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_set_window_fields(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        if call.object.is_some() {
            return self.deduce_unknown_overload(node);
        }
        match call.arguments.as_slice() {
            [source, partition_by, output] => {
                let partition_by = self.lambda_of(partition_by)?;
                let output = self.lambda_of(output)?;
                match (
                    partition_by.parameters.as_slice(),
                    output.parameters.as_slice(),
                ) {
                    ([partition_parameter], [output_parameter]) => {
                        self.deduce_item_and_collection_serializers(partition_parameter, source)?;
                        self.deduce_item_and_collection_serializers(output_parameter, source)?;
                        self.deduce_collection_and_item_serializers(node, &output.body)
                    }
                    _ => self.deduce_unknown_overload(node),
                }
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_pick(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match call.arguments.as_slice() {
            [source, sort_by, selector] if call.object.is_none() => {
                self.deduce_sort_definition(sort_by)?;
                let selector = self.lambda_of(selector)?;
                match selector.parameters.as_slice() {
                    [parameter] => {
                        self.deduce_item_and_collection_serializers(parameter, source)?;
                        self.deduce_serializers(node, &selector.body)
                    }
                    _ => self.deduce_unknown_overload(node),
                }
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_pick_n_sorted(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match call.arguments.as_slice() {
            [source, sort_by, selector, _n] if call.object.is_none() => {
                self.deduce_sort_definition(sort_by)?;
                let selector = self.lambda_of(selector)?;
                match selector.parameters.as_slice() {
                    [parameter] => {
                        self.deduce_item_and_collection_serializers(parameter, source)?;
                        self.deduce_collection_and_item_serializers(node, &selector.body)
                    }
                    _ => self.deduce_unknown_overload(node),
                }
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_pick_n(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match call.arguments.as_slice() {
            [source, selector, _n] if call.object.is_none() => {
                let selector = self.lambda_of(selector)?;
                match selector.parameters.as_slice() {
                    [parameter] => {
                        self.deduce_item_and_collection_serializers(parameter, source)?;
                        self.deduce_collection_and_item_serializers(node, &selector.body)
                    }
                    _ => self.deduce_unknown_overload(node),
                }
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    /// Sort definitions are embedded literals with server-defined
    /// rendering; their subtrees are never inferred.
    fn deduce_sort_definition(&mut self, sort_by: &Expression) -> Result<()> {
        if sort_by.as_constant().is_some() {
            self.deduce_ignore_subtree(sort_by)?;
        }
        Ok(())
    }

    fn deduce_all_elements(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match call.arguments.as_slice() {
            [source] if call.object.is_none() => {
                self.deduce_collection_and_collection_serializers(node, source)
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_first_matching_element(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match call.arguments.as_slice() {
            [source] if call.object.is_none() => self.deduce_returns_one_source_item(node, source),
            _ => self.deduce_unknown_overload(node),
        }
    }

    // ----- legacy client predicates -----

    fn deduce_inject(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        if self.options.legacy_predicate_forms != LegacyPredicateFormsOption::Enabled {
            return self.deduce_unknown_overload(node);
        }
        match call.arguments.as_slice() {
            [filter] if call.object.is_none() && node.ty == HostType::Bool => {
                if filter.as_constant().is_some() {
                    self.deduce_ignore_subtree(filter)?;
                }
                self.deduce_fixed(node, Serializer::Boolean)
            }
            _ => self.deduce_unknown_overload(node),
        }
    }

    fn deduce_string_in(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        if self.options.legacy_predicate_forms != LegacyPredicateFormsOption::Enabled {
            return self.deduce_unknown_overload(node);
        }
        if node.ty == HostType::Bool {
            self.deduce_fixed(node, Serializer::Boolean)
        } else {
            self.deduce_unknown_overload(node)
        }
    }

    fn deduce_get_item(&mut self, node: &Expression, call: &MethodCall) -> Result<()> {
        match (&call.object, call.arguments.as_slice()) {
            (Some(object), arguments) if !arguments.is_empty() => {
                self.deduce_indexer(node, object, arguments)
            }
            _ => self.deduce_unknown_overload(node),
        }
    }
}
