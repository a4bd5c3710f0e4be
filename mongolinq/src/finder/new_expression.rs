use crate::{
    expr::{Expression, New},
    finder::{visitor::InferenceVisitor, Error, Result},
    host::{ClassType, HostType},
    serializers::{
        standard_serializer, DictionarySerializer, DocumentSerializer, KeyValuePairSerializer,
        Serializer,
    },
};
use linked_hash_map::LinkedHashMap;
use std::{collections::BTreeSet, sync::Arc};

// Object-construction inference. With the constructed type's serializer
// already known (propagated from a parent), constructor parameters and
// member initializers bind downward to the argument expressions; with
// it unknown, a serializer is synthesized upward: bespoke rules for the
// built-in container constructors, and a dynamically built class map
// for user types.

impl InferenceVisitor<'_> {
    pub(super) fn deduce_new(&mut self, node: &Expression, new: &New) -> Result<()> {
        match &node.ty {
            HostType::Dictionary(..) => self.deduce_new_dictionary(node, new),
            HostType::List(_) | HostType::Set(_) => self.deduce_new_collection(node, new),
            HostType::KeyValuePair(..) => match new.arguments.as_slice() {
                [key, value] => self.deduce_key_value_pair(node, key, value),
                _ => self.deduce_unknowable(node),
            },
            HostType::Tuple(_) => self.deduce_tuple_create(node, &new.arguments),
            HostType::Class(class) => {
                let class = Arc::clone(class);
                self.deduce_new_class(node, new, &class)
            }
            HostType::DateTime => self.deduce_fixed(node, Serializer::DateTime),
            _ => self.deduce_unknowable(node),
        }
    }

    /// Dictionary construction, either empty or from a sequence of
    /// key-value pairs.
    fn deduce_new_dictionary(&mut self, node: &Expression, new: &New) -> Result<()> {
        match new.arguments.as_slice() {
            [] => {
                if self.is_not_known(node) {
                    if let HostType::Dictionary(key_type, value_type) = &node.ty {
                        if let (Some(key), Some(value)) = (
                            standard_serializer(key_type),
                            standard_serializer(value_type),
                        ) {
                            self.add_known(
                                node,
                                Serializer::Dictionary(DictionarySerializer {
                                    dictionary_type: node.ty.clone(),
                                    key: Box::new(key),
                                    value: Box::new(value),
                                }),
                            )?;
                        }
                    }
                }
                Ok(())
            }
            [pairs]
                if matches!(
                    pairs.ty.item_type(),
                    Some(HostType::KeyValuePair(..))
                ) =>
            {
                if self.is_not_known(node) {
                    if let Some(pair_serializer) = self.item_serializer_known(pairs) {
                        if let (Some(key), Some(value)) = (
                            pair_serializer.key_serializer(),
                            pair_serializer.dictionary_value_serializer(),
                        ) {
                            let dictionary = Serializer::Dictionary(DictionarySerializer {
                                dictionary_type: node.ty.clone(),
                                key: Box::new(key.clone()),
                                value: Box::new(value.clone()),
                            });
                            self.add_known(node, dictionary)?;
                        }
                    }
                } else if self.is_not_known(pairs) {
                    if let Some(node_serializer) = self.known(node) {
                        if let (Some(key), Some(value), Some(pair_type)) = (
                            node_serializer.key_serializer(),
                            node_serializer.dictionary_value_serializer(),
                            pairs.ty.item_type(),
                        ) {
                            let pair = Serializer::KeyValuePair(KeyValuePairSerializer {
                                pair_type: pair_type.clone(),
                                key: Box::new(key.clone()),
                                value: Box::new(value.clone()),
                            });
                            self.add_known(pairs, Serializer::sequence(&pairs.ty, pair))?;
                        }
                    }
                }
                Ok(())
            }
            _ => self.deduce_unknowable(node),
        }
    }

    /// List or set construction, either empty or copying a collection
    /// of the same item type.
    fn deduce_new_collection(&mut self, node: &Expression, new: &New) -> Result<()> {
        match new.arguments.as_slice() {
            [] => {
                if self.is_not_known(node) {
                    if let Some(item) = node.ty.item_type().and_then(standard_serializer) {
                        self.add_known(node, Serializer::sequence(&node.ty, item))?;
                    }
                }
                Ok(())
            }
            [collection] if collection.ty.item_type() == node.ty.item_type() => {
                self.deduce_collection_and_collection_serializers(node, collection)
            }
            _ => self.deduce_unknowable(node),
        }
    }

    fn deduce_new_class(
        &mut self,
        node: &Expression,
        new: &New,
        class: &Arc<ClassType>,
    ) -> Result<()> {
        if new.parameter_names.len() != new.arguments.len() {
            return Err(Error::ConstructorParameterCountMismatch {
                type_name: class.name.clone(),
                parameters: new.parameter_names.len(),
                matched: new.arguments.len(),
            });
        }
        if let Some(node_serializer) = self.known(node) {
            if node_serializer.is_sentinel() {
                return Ok(());
            }
            return self.bind_constructor(node, new, class, &node_serializer);
        }
        self.synthesize_class_serializer(node, new, class)
    }

    /// The constructed type's serializer is known: bind each
    /// constructor parameter and member-initializer to its member and
    /// propagate the member serializer down to the expression.
    fn bind_constructor(
        &mut self,
        node: &Expression,
        new: &New,
        class: &Arc<ClassType>,
        node_serializer: &Serializer,
    ) -> Result<()> {
        for (parameter_name, argument) in new.parameter_names.iter().zip(&new.arguments) {
            let member = class.find_member_ignore_case(parameter_name).ok_or_else(|| {
                Error::ConstructorParameterNotMatched {
                    type_name: class.name.clone(),
                    parameter: parameter_name.clone(),
                }
            })?;
            if self.is_not_known(argument) {
                match node_serializer.member_serializer(&member.name) {
                    Some(member_serializer) if member.ty == argument.ty => {
                        let member_serializer = member_serializer.clone();
                        self.add_known(argument, member_serializer)?;
                    }
                    Some(_) => {}
                    None if node_serializer.as_document().is_some() => {
                        return Err(Error::MemberNotFound {
                            type_name: class.name.clone(),
                            member: member.name.clone(),
                        });
                    }
                    None => {
                        return Err(Error::NotADocumentSerializer {
                            expression: node.to_string(),
                            serializer: node_serializer.kind_name().to_string(),
                        });
                    }
                }
            }
        }
        for init in &new.member_inits {
            let member = class.find_member(&init.member).ok_or_else(|| {
                Error::MemberNotFound {
                    type_name: class.name.clone(),
                    member: init.member.clone(),
                }
            })?;
            if self.is_not_known(&init.value) {
                // a strictly more derived assigned expression
                // serializes as its own type, not the declared one
                if init.value.ty != member.ty && member.ty.is_supertype_of(&init.value.ty) {
                    if let HostType::Class(derived) = &init.value.ty {
                        let document = Serializer::Document(auto_map_class(derived));
                        self.add_known(&init.value, document)?;
                        continue;
                    }
                }
                match node_serializer.member_serializer(&member.name) {
                    Some(member_serializer) if member.ty == init.value.ty => {
                        let member_serializer = member_serializer.clone();
                        self.add_known(&init.value, member_serializer)?;
                    }
                    Some(_) => {}
                    None if node_serializer.as_document().is_some() => {
                        return Err(Error::MemberNotFound {
                            type_name: class.name.clone(),
                            member: member.name.clone(),
                        });
                    }
                    None => {
                        return Err(Error::NotADocumentSerializer {
                            expression: node.to_string(),
                            serializer: node_serializer.kind_name().to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// The constructed type's serializer is not known: once every
    /// constructor argument and member-initializer value has resolved,
    /// build a class map over the type and its base chain, bind the
    /// matched members to the argument serializers, and freeze the
    /// result into a document serializer.
    fn synthesize_class_serializer(
        &mut self,
        node: &Expression,
        new: &New,
        class: &Arc<ClassType>,
    ) -> Result<()> {
        let mut bound: LinkedHashMap<String, Serializer> = LinkedHashMap::new();
        for (parameter_name, argument) in new.parameter_names.iter().zip(&new.arguments) {
            let member = class.find_member_ignore_case(parameter_name).ok_or_else(|| {
                Error::ConstructorParameterNotMatched {
                    type_name: class.name.clone(),
                    parameter: parameter_name.clone(),
                }
            })?;
            match self.known(argument) {
                Some(serializer) if serializer.is_sentinel() => {
                    // a client-side-only argument poisons the whole
                    // construction
                    return self.deduce_unknowable(node);
                }
                Some(serializer) => {
                    bound.insert(member.name, serializer);
                }
                None => return Ok(()), // retry once the argument resolves
            }
        }
        for init in &new.member_inits {
            let member = class.find_member(&init.member).ok_or_else(|| {
                Error::MemberNotFound {
                    type_name: class.name.clone(),
                    member: init.member.clone(),
                }
            })?;
            match self.known(&init.value) {
                Some(serializer) if serializer.is_sentinel() => {
                    return self.deduce_unknowable(node);
                }
                Some(serializer) => {
                    bound.insert(member.name, serializer);
                }
                None => return Ok(()),
            }
        }
        let mut members = LinkedHashMap::new();
        let mut visiting = BTreeSet::new();
        visiting.insert(class.name.clone());
        for member in class.all_members() {
            let serializer = bound
                .remove(&member.name)
                .unwrap_or_else(|| auto_member_serializer(&member.ty, &mut visiting));
            members.insert(member.name, serializer);
        }
        self.add_known(
            node,
            Serializer::Document(DocumentSerializer {
                class: Arc::clone(class),
                members,
            }),
        )
    }
}

/// Auto-map a class (and its base chain) into a document serializer
/// using registry defaults, recursing through structured member types.
pub(super) fn auto_map_class(class: &Arc<ClassType>) -> DocumentSerializer {
    let mut visiting = BTreeSet::new();
    auto_map_class_guarded(class, &mut visiting)
}

fn auto_map_class_guarded(
    class: &Arc<ClassType>,
    visiting: &mut BTreeSet<String>,
) -> DocumentSerializer {
    visiting.insert(class.name.clone());
    let mut members = LinkedHashMap::new();
    for member in class.all_members() {
        members.insert(
            member.name.clone(),
            auto_member_serializer(&member.ty, visiting),
        );
    }
    visiting.remove(&class.name);
    DocumentSerializer {
        class: Arc::clone(class),
        members,
    }
}

fn auto_member_serializer(ty: &HostType, visiting: &mut BTreeSet<String>) -> Serializer {
    if let Some(serializer) = standard_serializer(ty) {
        return serializer;
    }
    match ty {
        // the cycle guard stops recursive class shapes from mapping
        // forever; a member already being mapped becomes unknowable
        HostType::Class(class) if !visiting.contains(&class.name) => {
            Serializer::Document(auto_map_class_guarded(class, visiting))
        }
        HostType::Array(item) | HostType::List(item) | HostType::Set(item) => {
            Serializer::sequence(ty, auto_member_serializer(item, visiting))
        }
        HostType::Dictionary(key, value) => Serializer::Dictionary(DictionarySerializer {
            dictionary_type: ty.clone(),
            key: Box::new(auto_member_serializer(key, visiting)),
            value: Box::new(auto_member_serializer(value, visiting)),
        }),
        HostType::KeyValuePair(key, value) => Serializer::KeyValuePair(KeyValuePairSerializer {
            pair_type: ty.clone(),
            key: Box::new(auto_member_serializer(key, visiting)),
            value: Box::new(auto_member_serializer(value, visiting)),
        }),
        HostType::Nullable(inner) => Serializer::nullable(auto_member_serializer(inner, visiting)),
        _ => Serializer::unknowable(ty),
    }
}
