use crate::{
    expr::{
        Binary, BinaryOperator, Conditional, Convert, Expression, ExpressionKind, Index, Lambda,
        MemberAccess, NewArray, Unary, UnaryOperator,
    },
    finder::{new_expression, Error, Result, SerializerMap},
    host::HostType,
    options::FinderOptions,
    serializers::{
        standard_serializer, CastingSerializer, ConvertingSerializer, Serializer,
    },
    set,
};
use itertools::Itertools;
use lazy_static::lazy_static;
use std::collections::BTreeSet;

lazy_static! {
    // Date/time component properties; all resolve to int32.
    static ref DATE_COMPONENT_MEMBERS: BTreeSet<&'static str> = set! {
        "Day",
        "DayOfWeek",
        "DayOfYear",
        "Hour",
        "Millisecond",
        "Minute",
        "Month",
        "Second",
        "Year",
    };
}

/// The rule engine: one traversal, re-run every pass by the driver.
/// For composite nodes the local rules run before descending and again
/// after, because serializer information can flow in either direction
/// between parent and child.
pub(super) struct InferenceVisitor<'a> {
    map: &'a mut SerializerMap,
    pub(super) options: &'a FinderOptions,
    pub(super) use_default_serializers_for_constants: bool,
}

impl<'a> InferenceVisitor<'a> {
    pub(super) fn new(map: &'a mut SerializerMap, options: &'a FinderOptions) -> Self {
        Self {
            map,
            options,
            use_default_serializers_for_constants: false,
        }
    }

    pub(super) fn entry_count(&self) -> usize {
        self.map.len()
    }

    pub(super) fn visit(&mut self, node: &Expression) -> Result<()> {
        // a sentinel-mapped node is never descended into; for
        // ignore-subtree this protects embedded literal definitions
        // from being misread as translatable query logic
        if let Some(serializer) = self.map.known_serializer(node.id) {
            if serializer.is_sentinel() {
                return Ok(());
            }
        }
        match &node.kind {
            ExpressionKind::Constant(_) => self.deduce_constant(node),
            ExpressionKind::Parameter(_) => Ok(()),
            ExpressionKind::Binary(binary) => {
                self.deduce_binary(node, binary)?;
                self.visit(&binary.left)?;
                self.visit(&binary.right)?;
                self.deduce_binary(node, binary)
            }
            ExpressionKind::Unary(unary) => {
                self.visit(&unary.operand)?;
                self.deduce_unary(node, unary)
            }
            ExpressionKind::Convert(convert) => {
                self.visit(&convert.operand)?;
                self.deduce_convert(node, convert)
            }
            ExpressionKind::MemberAccess(member) => {
                if let Some(object) = &member.object {
                    self.visit(object)?;
                }
                self.deduce_member_access(node, member)
            }
            ExpressionKind::MethodCall(call) => {
                self.deduce_method_call(node, call)?;
                if let Some(serializer) = self.map.known_serializer(node.id) {
                    if serializer.is_unknowable() {
                        return Ok(()); // don't visit the node any further
                    }
                }
                if let Some(object) = &call.object {
                    self.visit(object)?;
                }
                for argument in &call.arguments {
                    self.visit(argument)?;
                }
                self.deduce_method_call(node, call)
            }
            ExpressionKind::Lambda(lambda) => self.visit(&lambda.body),
            ExpressionKind::Quote(inner) => self.visit(inner),
            ExpressionKind::Conditional(conditional) => {
                self.deduce_conditional(node, conditional)?;
                self.visit(&conditional.test)?;
                self.visit(&conditional.if_true)?;
                self.visit(&conditional.if_false)?;
                self.deduce_conditional(node, conditional)
            }
            ExpressionKind::New(new) => {
                self.deduce_new(node, new)?;
                for child in node.children() {
                    self.visit(child)?;
                }
                self.deduce_new(node, new)
            }
            ExpressionKind::NewArray(new_array) => {
                self.deduce_new_array(node, new_array)?;
                for child in node.children() {
                    self.visit(child)?;
                }
                self.deduce_new_array(node, new_array)
            }
            ExpressionKind::Index(index) => {
                self.visit(&index.object)?;
                for argument in &index.arguments {
                    self.visit(argument)?;
                }
                self.deduce_index(node, index)
            }
        }
    }

    // ----- membership -----

    pub(super) fn known(&self, e: &Expression) -> Option<Serializer> {
        self.map.known_serializer(e.id).cloned()
    }

    pub(super) fn is_known(&self, e: &Expression) -> bool {
        self.map.is_known(e.id)
    }

    pub(super) fn is_not_known(&self, e: &Expression) -> bool {
        self.map.is_not_known(e.id)
    }

    pub(super) fn add_known(&mut self, e: &Expression, serializer: Serializer) -> Result<()> {
        self.map.add(e, serializer)
    }

    // ----- the shared deduction vocabulary -----

    /// Symmetric propagation: when one of two same-typed expressions
    /// has a serializer and the other does not, the known one wins.
    pub(super) fn deduce_serializers(&mut self, a: &Expression, b: &Expression) -> Result<()> {
        if a.ty != b.ty {
            return Ok(());
        }
        match (self.known(a), self.known(b)) {
            (Some(sa), None) if !sa.is_ignore_subtree() => self.add_known(b, sa),
            (None, Some(sb)) if !sb.is_ignore_subtree() => self.add_known(a, sb),
            _ => Ok(()),
        }
    }

    /// Assign a serializer if one was produced and the node is still
    /// unresolved.
    pub(super) fn deduce_serializer(
        &mut self,
        e: &Expression,
        serializer: Option<Serializer>,
    ) -> Result<()> {
        match serializer {
            Some(serializer) if self.is_not_known(e) => self.add_known(e, serializer),
            _ => Ok(()),
        }
    }

    /// Assign a fixed serializer if the node is still unresolved.
    pub(super) fn deduce_fixed(&mut self, e: &Expression, serializer: Serializer) -> Result<()> {
        if self.is_not_known(e) {
            self.add_known(e, serializer)?;
        }
        Ok(())
    }

    pub(super) fn deduce_unknowable(&mut self, e: &Expression) -> Result<()> {
        if self.is_not_known(e) {
            self.add_known(e, Serializer::unknowable(&e.ty))?;
        }
        Ok(())
    }

    pub(super) fn deduce_ignore_subtree(&mut self, e: &Expression) -> Result<()> {
        if self.is_not_known(e) {
            self.add_known(e, Serializer::IgnoreSubtree)?;
        }
        Ok(())
    }

    /// Propagate between a collection expression and an expression of
    /// its item type, in both directions: the collection's item
    /// serializer down to the item, or a sequence serializer rebuilt
    /// around the known item serializer up to the collection.
    pub(super) fn deduce_item_and_collection_serializers(
        &mut self,
        item: &Expression,
        collection: &Expression,
    ) -> Result<()> {
        let item_types_agree = collection.ty.item_type() == Some(&item.ty);
        if self.is_not_known(item) {
            if let Some(collection_serializer) = self.known(collection) {
                if collection_serializer.is_unknowable() {
                    self.add_known(item, Serializer::unknowable(&item.ty))?;
                } else if item_types_agree {
                    if let Some(item_serializer) = collection_serializer.item_serializer() {
                        let item_serializer = item_serializer.clone();
                        self.add_known(item, item_serializer)?;
                    }
                }
            }
        }
        if self.is_not_known(collection) {
            if let Some(item_serializer) = self.known(item) {
                if item_serializer.is_unknowable() {
                    self.add_known(collection, Serializer::unknowable(&collection.ty))?;
                } else if item_types_agree && !item_serializer.is_ignore_subtree() {
                    self.add_known(
                        collection,
                        Serializer::sequence(&collection.ty, item_serializer),
                    )?;
                }
            }
        }
        Ok(())
    }

    pub(super) fn deduce_collection_and_item_serializers(
        &mut self,
        collection: &Expression,
        item: &Expression,
    ) -> Result<()> {
        self.deduce_item_and_collection_serializers(item, collection)
    }

    /// Propagate between two collection expressions holding the same
    /// item type: the known side's item serializer is rebuilt into a
    /// sequence serializer for the unknown side's own collection type.
    pub(super) fn deduce_collection_and_collection_serializers(
        &mut self,
        a: &Expression,
        b: &Expression,
    ) -> Result<()> {
        if a.ty == b.ty {
            return self.deduce_serializers(a, b);
        }
        if a.ty.item_type() != b.ty.item_type() || a.ty.item_type().is_none() {
            return Ok(());
        }
        if self.is_not_known(a) {
            if let Some(sb) = self.known(b) {
                if sb.is_unknowable() {
                    self.add_known(a, Serializer::unknowable(&a.ty))?;
                } else if let Some(item) = sb.item_serializer() {
                    let item = item.clone();
                    self.add_known(a, Serializer::sequence(&a.ty, item))?;
                }
            }
        }
        if self.is_not_known(b) {
            if let Some(sa) = self.known(a) {
                if sa.is_unknowable() {
                    self.add_known(b, Serializer::unknowable(&b.ty))?;
                } else if let Some(item) = sa.item_serializer() {
                    let item = item.clone();
                    self.add_known(b, Serializer::sequence(&b.ty, item))?;
                }
            }
        }
        Ok(())
    }

    /// The item serializer of a collection expression, when the
    /// collection's serializer is already known and sequence-shaped.
    pub(super) fn item_serializer_known(&self, collection: &Expression) -> Option<Serializer> {
        self.known(collection)
            .and_then(|s| s.item_serializer().cloned())
    }

    pub(super) fn lambda_of<'e>(&self, e: &'e Expression) -> Result<&'e Lambda> {
        e.as_lambda().ok_or_else(|| Error::ExpectedLambda {
            expression: e.to_string(),
        })
    }

    // ----- per-node-kind rules -----

    /// Constants are resolved from sibling propagation when possible;
    /// registry defaults are deliberately delayed until the driver
    /// unlocks them after a no-progress pass.
    fn deduce_constant(&mut self, node: &Expression) -> Result<()> {
        if self.use_default_serializers_for_constants && self.is_not_known(node) {
            if let Some(default) = standard_serializer(&node.ty) {
                self.add_known(node, default)?;
            }
        }
        Ok(())
    }

    fn deduce_binary(&mut self, node: &Expression, binary: &Binary) -> Result<()> {
        use BinaryOperator::*;
        let (left, right) = (&binary.left, &binary.right);
        match binary.op {
            ArrayIndex => {
                if self.is_not_known(node) {
                    if let Some(array_serializer) = self.known(left) {
                        if array_serializer.is_unknowable() {
                            return self.deduce_unknowable(node);
                        }
                        let index = right
                            .as_constant()
                            .and_then(|value| value.as_i32())
                            .and_then(|i| usize::try_from(i).ok());
                        let item_serializer = match index {
                            Some(i) => array_serializer.positional_item_serializer(i).cloned(),
                            None => array_serializer.item_serializer().cloned(),
                        };
                        self.deduce_serializer(node, item_serializer)?;
                    }
                }
                Ok(())
            }
            Coalesce => {
                // branches that can't share one serializer execute
                // client-side instead of being translated
                if self.is_not_known(node) {
                    if let Some(left_serializer) = self.known(left) {
                        if left_serializer.value_type() == Some(node.ty.clone()) {
                            self.add_known(node, left_serializer)?;
                        } else if let Some(inner) = left_serializer.nullable_inner() {
                            if inner.value_type() == Some(node.ty.clone()) {
                                let inner = inner.clone();
                                self.add_known(node, inner)?;
                            } else {
                                self.deduce_unknowable(node)?;
                            }
                        } else {
                            self.deduce_unknowable(node)?;
                        }
                    }
                }
                Ok(())
            }
            Eq | Ne | Lt | Lte | Gt | Gte | And | Or => {
                self.deduce_serializers(left, right)?;
                if node.ty == HostType::Bool {
                    self.deduce_fixed(node, Serializer::Boolean)?;
                }
                Ok(())
            }
            Add | Subtract | Multiply | Divide | Modulo => {
                self.deduce_serializers(left, right)?;
                self.deduce_serializers(node, left)?;
                self.deduce_serializers(node, right)?;
                // registry defaults only after propagation had its chance
                if self.is_not_known(node) {
                    let default = standard_serializer(&node.ty);
                    self.deduce_serializer(node, default)?;
                }
                Ok(())
            }
        }
    }

    fn deduce_unary(&mut self, node: &Expression, unary: &Unary) -> Result<()> {
        match unary.op {
            // negation mirrors its operand
            UnaryOperator::Negate => self.deduce_serializers(node, &unary.operand),
            UnaryOperator::Not => {
                self.deduce_serializers(node, &unary.operand)?;
                if node.ty == HostType::Bool {
                    self.deduce_fixed(node, Serializer::Boolean)?;
                }
                Ok(())
            }
        }
    }

    fn deduce_conditional(&mut self, node: &Expression, conditional: &Conditional) -> Result<()> {
        if conditional.test.ty == HostType::Bool {
            self.deduce_fixed(&conditional.test, Serializer::Boolean)?;
        }
        self.deduce_serializers(node, &conditional.if_true)?;
        self.deduce_serializers(node, &conditional.if_false)?;
        self.deduce_serializers(&conditional.if_true, &conditional.if_false)
    }

    fn deduce_convert(&mut self, node: &Expression, convert: &Convert) -> Result<()> {
        if self.is_known(node) {
            return Ok(());
        }
        let operand = &convert.operand;
        // (object)someEnum followed by (TargetEnum)that: the inner
        // operand is substituted so the enum rules see enum-to-enum
        let (source_ty, operand_serializer) = match (&node.ty, &operand.kind) {
            (HostType::Enum(_), ExpressionKind::Convert(inner))
                if operand.ty == HostType::Dynamic
                    && matches!(inner.operand.ty, HostType::Enum(_)) =>
            {
                (inner.operand.ty.clone(), self.known(&inner.operand))
            }
            _ => (operand.ty.clone(), self.known(operand)),
        };
        if let Some(serializer) = &operand_serializer {
            if serializer.is_unknowable() {
                return self.deduce_unknowable(node);
            }
        }
        let resolved = resolve_convert(node, &source_ty, &node.ty, operand_serializer.as_ref())?;
        self.deduce_serializer(node, resolved)
    }

    fn deduce_member_access(&mut self, node: &Expression, member: &MemberAccess) -> Result<()> {
        let name = member.member.as_str();
        let object = member.object.as_deref();
        match &member.declaring {
            HostType::Dynamic => match dynamic_accessor_serializer(name) {
                Some(serializer) => self.deduce_fixed(node, serializer),
                None => Err(Error::MemberNotFound {
                    type_name: member.declaring.to_string(),
                    member: name.to_string(),
                }),
            },
            HostType::DateTime => {
                if DATE_COMPONENT_MEMBERS.contains(name) {
                    return self.deduce_fixed(node, Serializer::Int32);
                }
                match name {
                    "Date" | "Now" | "Today" | "UtcNow" => {
                        self.deduce_fixed(node, Serializer::DateTime)
                    }
                    "Ticks" => self.deduce_fixed(node, Serializer::Int64),
                    _ => Err(Error::MemberNotFound {
                        type_name: member.declaring.to_string(),
                        member: name.to_string(),
                    }),
                }
            }
            HostType::String if name == "Length" => self.deduce_fixed(node, Serializer::Int32),
            HostType::Nullable(_) => match name {
                "HasValue" => self.deduce_fixed(node, Serializer::Boolean),
                "Value" => {
                    if let Some(object_serializer) = object.and_then(|o| self.known(o)) {
                        if object_serializer.is_unknowable() {
                            return self.deduce_unknowable(node);
                        }
                        let inner = object_serializer.nullable_inner().cloned();
                        return self.deduce_serializer(node, inner);
                    }
                    Ok(())
                }
                _ => Err(Error::MemberNotFound {
                    type_name: member.declaring.to_string(),
                    member: name.to_string(),
                }),
            },
            HostType::Dictionary(..) => match name {
                "Count" => self.deduce_fixed(node, Serializer::Int32),
                "Keys" => {
                    if let Some(object_serializer) = object.and_then(|o| self.known(o)) {
                        if object_serializer.is_unknowable() {
                            return self.deduce_unknowable(node);
                        }
                        if let Some(key) = object_serializer.key_serializer() {
                            let sequence = Serializer::sequence(&node.ty, key.clone());
                            return self.deduce_fixed(node, sequence);
                        }
                    }
                    Ok(())
                }
                "Values" => {
                    if let Some(object_serializer) = object.and_then(|o| self.known(o)) {
                        if object_serializer.is_unknowable() {
                            return self.deduce_unknowable(node);
                        }
                        if let Some(value) = object_serializer.dictionary_value_serializer() {
                            let sequence = Serializer::sequence(&node.ty, value.clone());
                            return self.deduce_fixed(node, sequence);
                        }
                    }
                    Ok(())
                }
                _ => Err(Error::MemberNotFound {
                    type_name: member.declaring.to_string(),
                    member: name.to_string(),
                }),
            },
            HostType::Tuple(_) => {
                let position = match name {
                    "Item1" => Some(1),
                    "Item2" => Some(2),
                    "Item3" => Some(3),
                    "Item4" => Some(4),
                    "Item5" => Some(5),
                    "Item6" => Some(6),
                    "Item7" => Some(7),
                    "Rest" => Some(8),
                    _ => None,
                };
                let position = position.ok_or_else(|| Error::MemberNotFound {
                    type_name: member.declaring.to_string(),
                    member: name.to_string(),
                })?;
                if let Some(object_serializer) = object.and_then(|o| self.known(o)) {
                    if object_serializer.is_unknowable() {
                        return self.deduce_unknowable(node);
                    }
                    let item = object_serializer.tuple_item_serializer(position).cloned();
                    return self.deduce_serializer(node, item);
                }
                Ok(())
            }
            HostType::KeyValuePair(..) => {
                let accessor: fn(&Serializer) -> Option<&Serializer> = match name {
                    "Key" => Serializer::key_serializer,
                    "Value" => Serializer::dictionary_value_serializer,
                    _ => {
                        return Err(Error::MemberNotFound {
                            type_name: member.declaring.to_string(),
                            member: name.to_string(),
                        })
                    }
                };
                if let Some(object_serializer) = object.and_then(|o| self.known(o)) {
                    if object_serializer.is_unknowable() {
                        return self.deduce_unknowable(node);
                    }
                    let part = accessor(&object_serializer).cloned();
                    return self.deduce_serializer(node, part);
                }
                Ok(())
            }
            HostType::Grouping(..) => match name {
                "Key" => {
                    if let Some(object_serializer) = object.and_then(|o| self.known(o)) {
                        if object_serializer.is_unknowable() {
                            return self.deduce_unknowable(node);
                        }
                        let key = object_serializer.key_serializer().cloned();
                        return self.deduce_serializer(node, key);
                    }
                    Ok(())
                }
                "Count" => self.deduce_fixed(node, Serializer::Int32),
                _ => Err(Error::MemberNotFound {
                    type_name: member.declaring.to_string(),
                    member: name.to_string(),
                }),
            },
            HostType::LookupResult(..) => {
                if let Some(object_serializer) = object.and_then(|o| self.known(o)) {
                    if object_serializer.is_unknowable() {
                        return self.deduce_unknowable(node);
                    }
                    if let Serializer::LookupResult(lookup) = &object_serializer {
                        let part = match name {
                            "Local" => Some((*lookup.local).clone()),
                            "Results" => Some((*lookup.results).clone()),
                            _ => {
                                return Err(Error::MemberNotFound {
                                    type_name: member.declaring.to_string(),
                                    member: name.to_string(),
                                })
                            }
                        };
                        return self.deduce_serializer(node, part);
                    }
                }
                Ok(())
            }
            sequence if sequence.item_type().is_some() => match name {
                // collection sizes are integers no matter how the
                // collection itself serializes
                "Count" | "Length" => self.deduce_fixed(node, Serializer::Int32),
                _ => Err(Error::MemberNotFound {
                    type_name: member.declaring.to_string(),
                    member: name.to_string(),
                }),
            },
            HostType::Class(class) => {
                let object = match object {
                    Some(object) => object,
                    None => {
                        return Err(Error::NotSupported {
                            expression: node.to_string(),
                            reason: "static members of user types are not supported".to_string(),
                        })
                    }
                };
                match self.known(object) {
                    // containing serializer not derived yet; retry on a
                    // later pass
                    None => Ok(()),
                    Some(object_serializer) if object_serializer.is_unknowable() => {
                        self.deduce_unknowable(node)
                    }
                    Some(object_serializer) => {
                        match object_serializer.member_serializer(name) {
                            Some(member_serializer) => {
                                let member_serializer = member_serializer.clone();
                                self.deduce_fixed(node, member_serializer)
                            }
                            None if object_serializer.as_document().is_some() => {
                                Err(Error::MemberNotFound {
                                    type_name: class.name.clone(),
                                    member: name.to_string(),
                                })
                            }
                            None => Err(Error::NotADocumentSerializer {
                                expression: node.to_string(),
                                serializer: object_serializer.kind_name().to_string(),
                            }),
                        }
                    }
                }
            }
            _ => Err(Error::MemberNotFound {
                type_name: member.declaring.to_string(),
                member: name.to_string(),
            }),
        }
    }

    fn deduce_index(&mut self, node: &Expression, index: &Index) -> Result<()> {
        self.deduce_indexer(node, &index.object, &index.arguments)
    }

    /// Three disjoint indexer shapes; anything else is unknowable, the
    /// same safety net as unrecognized methods.
    pub(super) fn deduce_indexer(
        &mut self,
        node: &Expression,
        object: &Expression,
        arguments: &[Expression],
    ) -> Result<()> {
        if self.is_known(node) {
            return Ok(());
        }
        match (&object.ty, arguments) {
            (HostType::Dynamic, [argument])
                if argument.ty == HostType::Int32 || argument.ty == HostType::String =>
            {
                self.add_known(node, Serializer::Dynamic)
            }
            (HostType::Dictionary(key_ty, _), [argument]) if argument.ty == **key_ty => {
                if let Some(object_serializer) = self.known(object) {
                    if object_serializer.is_unknowable() {
                        return self.deduce_unknowable(node);
                    }
                    let value = object_serializer.dictionary_value_serializer().cloned();
                    return self.deduce_serializer(node, value);
                }
                Ok(())
            }
            (collection, [argument])
                if collection.item_type().is_some() && argument.ty == HostType::Int32 =>
            {
                if let Some(object_serializer) = self.known(object) {
                    if object_serializer.is_unknowable() {
                        return self.deduce_unknowable(node);
                    }
                    let item = object_serializer.item_serializer().cloned();
                    return self.deduce_serializer(node, item);
                }
                Ok(())
            }
            _ => self.deduce_unknowable(node),
        }
    }

    fn deduce_new_array(&mut self, node: &Expression, new_array: &NewArray) -> Result<()> {
        let items = match new_array {
            NewArray::Bounds(_) => {
                // no element expressions to infer an item serializer from
                return Err(Error::BoundedArrayNotSupported(node.to_string()));
            }
            NewArray::Items(items) => items,
        };
        if let Some(array_serializer) = self.known(node) {
            if array_serializer.is_sentinel() {
                return Ok(());
            }
            for (i, item) in items.iter().enumerate() {
                if self.is_not_known(item) {
                    if let Some(item_serializer) =
                        array_serializer.positional_item_serializer(i).cloned()
                    {
                        self.add_known(item, item_serializer)?;
                    }
                }
            }
            return Ok(());
        }
        let item_serializers = items
            .iter()
            .map(|item| self.known(item))
            .collect::<Option<Vec<_>>>();
        if let Some(item_serializers) = item_serializers {
            if item_serializers.iter().any(Serializer::is_unknowable) {
                return self.deduce_unknowable(node);
            }
            if item_serializers.iter().any(Serializer::is_ignore_subtree) {
                return Ok(());
            }
            if item_serializers.is_empty() {
                let default = node.ty.item_type().and_then(standard_serializer);
                if let Some(item) = default {
                    self.add_known(node, Serializer::sequence(&node.ty, item))?;
                }
            } else if item_serializers.iter().all_equal() {
                let item = item_serializers.into_iter().next().unwrap_or(Serializer::Dynamic);
                self.add_known(node, Serializer::sequence(&node.ty, item))?;
            } else {
                self.add_known(
                    node,
                    Serializer::PolymorphicArray(crate::serializers::PolymorphicArraySerializer {
                        collection_type: node.ty.clone(),
                        items: item_serializers,
                    }),
                )?;
            }
        }
        Ok(())
    }
}

/// Conversions dispatch on a priority-ordered set of cases; later
/// cases assume earlier ones have been ruled out. `Ok(None)` means the
/// conversion cannot be resolved yet (or at all) without being a
/// recognized failure; the node is left unresolved rather than
/// guessed.
fn resolve_convert(
    node: &Expression,
    source: &HostType,
    target: &HostType,
    operand_serializer: Option<&Serializer>,
) -> Result<Option<Serializer>> {
    // (1) identical source and target: reuse
    if source == target {
        return Ok(operand_serializer
            .filter(|s| !s.is_ignore_subtree())
            .cloned());
    }
    // (2) converting to the universal dynamic value type
    if *target == HostType::Dynamic {
        return Ok(Some(Serializer::Dynamic));
    }
    // (3) nullable source unwraps first: a nullable-to-nullable
    // conversion needs both sides unwrapped
    if let Some(source_inner) = source.nullable_inner() {
        let inner_serializer = operand_serializer.and_then(|s| s.nullable_inner());
        let target_inner = target.nullable_inner().unwrap_or(target);
        let resolved = resolve_convert(node, source_inner, target_inner, inner_serializer)?;
        return Ok(if target.is_nullable() {
            resolved.map(Serializer::nullable)
        } else {
            resolved
        });
    }
    // (4) nullable target: resolve the non-nullable conversion, re-wrap
    if let Some(target_inner) = target.nullable_inner() {
        let resolved = resolve_convert(node, source, target_inner, operand_serializer)?;
        return Ok(resolved.map(Serializer::nullable));
    }
    // (5) from the dynamic value type only string extraction works
    if *source == HostType::Dynamic {
        if *target == HostType::String {
            return Ok(Some(Serializer::String));
        }
        return Err(Error::NotSupported {
            expression: node.to_string(),
            reason: "only string extraction is supported when converting from the dynamic value type"
                .to_string(),
        });
    }
    // (6) enum conversions: the wire must store the persisted
    // representation, the opposite of the in-memory direction
    let enum_conversion = matches!(
        (source, target),
        (HostType::Enum(_), t) if t.is_integral()
    ) || matches!(
        (source, target),
        (s, HostType::Enum(_)) if s.is_integral()
    ) || matches!((source, target), (HostType::Enum(_), HostType::Enum(_)));
    if enum_conversion {
        let inner = operand_serializer
            .cloned()
            .or_else(|| standard_serializer(source));
        return Ok(inner.map(|inner| {
            Serializer::EnumIntegralConverting(ConvertingSerializer {
                value_type: target.clone(),
                inner: Box::new(inner),
            })
        }));
    }
    // (7) converting to a supertype
    if target.is_supertype_of(source) {
        return Ok(operand_serializer.map(|s| {
            Serializer::Downcasting(CastingSerializer {
                value_type: target.clone(),
                inner: Box::new(s.clone()),
            })
        }));
    }
    // (8) converting to a subtype: a serializer for the derived type
    if source.is_supertype_of(target) {
        if let HostType::Class(class) = target {
            return Ok(Some(Serializer::Document(new_expression::auto_map_class(
                class,
            ))));
        }
        return Ok(None);
    }
    // (9) numeric/char widening
    if source.widens_to(target) {
        return Ok(operand_serializer.map(|s| {
            Serializer::NumericConverting(ConvertingSerializer {
                value_type: target.clone(),
                inner: Box::new(s.clone()),
            })
        }));
    }
    Ok(None)
}

fn dynamic_accessor_serializer(member: &str) -> Option<Serializer> {
    match member {
        "AsBoolean" => Some(Serializer::Boolean),
        "AsString" => Some(Serializer::String),
        "AsInt32" => Some(Serializer::Int32),
        "AsInt64" => Some(Serializer::Int64),
        "AsDouble" => Some(Serializer::Double),
        "AsDecimal" => Some(Serializer::Decimal),
        "AsDateTime" => Some(Serializer::DateTime),
        "AsBinary" => Some(Serializer::Binary),
        "AsObjectId" => Some(Serializer::ObjectId),
        "AsArray" => Some(Serializer::sequence(
            &HostType::array(HostType::Dynamic),
            Serializer::Dynamic,
        )),
        "AsDocument" => Some(Serializer::Dynamic),
        _ => None,
    }
}
