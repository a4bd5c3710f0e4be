use crate::host::{ClassType, EnumType, HostType};
use linked_hash_map::LinkedHashMap;
use std::{fmt, sync::Arc};

/// A codec capability over exactly one host value type. Modeled as a
/// closed set of tagged variants with capability queries; variants
/// expose only the operations meaningful for them.
#[derive(Debug, Clone, PartialEq)]
pub enum Serializer {
    Boolean,
    Char,
    String,
    Int16,
    Int32,
    Int64,
    Single,
    Double,
    Decimal,
    /// Date-times are persisted in UTC.
    DateTime,
    TimeSpan(TimeSpanUnits),
    Binary,
    ObjectId,
    /// The universal dynamic wire-value codec.
    Dynamic,
    Enum(EnumSerializer),
    Nullable(Box<Serializer>),
    Array(ArraySerializer),
    PolymorphicArray(PolymorphicArraySerializer),
    Dictionary(DictionarySerializer),
    KeyValuePair(KeyValuePairSerializer),
    Tuple(TupleSerializer),
    Grouping(GroupingSerializer),
    LookupResult(LookupResultSerializer),
    Document(DocumentSerializer),
    /// Serializes a `value_type`-typed node through a serializer for a
    /// subtype of it, downcasting on write.
    Downcasting(CastingSerializer),
    /// Serializes a `value_type`-typed node through a serializer for a
    /// supertype of it, upcasting on write.
    Upcasting(CastingSerializer),
    /// Bridges an enum-typed node and an underlying-integral serializer
    /// (or the reverse); the wire stores the persisted representation,
    /// which is the opposite of the in-memory conversion direction.
    EnumIntegralConverting(ConvertingSerializer),
    /// Bridges a widening numeric/char conversion.
    NumericConverting(ConvertingSerializer),
    /// Sentinel: the node's runtime value can never be faithfully
    /// serialized; it is evaluated client-side.
    Unknowable(HostType),
    /// Sentinel: the node's descendants must not be visited at all
    /// (an embedded literal definition, not translatable query logic).
    IgnoreSubtree,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSpanUnits {
    Milliseconds,
    Ticks,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumSerializer {
    pub enum_type: Arc<EnumType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArraySerializer {
    pub collection_type: HostType,
    pub item: Box<Serializer>,
}

/// A heterogeneous array: one item serializer per position.
#[derive(Debug, Clone, PartialEq)]
pub struct PolymorphicArraySerializer {
    pub collection_type: HostType,
    pub items: Vec<Serializer>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DictionarySerializer {
    pub dictionary_type: HostType,
    pub key: Box<Serializer>,
    pub value: Box<Serializer>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyValuePairSerializer {
    pub pair_type: HostType,
    pub key: Box<Serializer>,
    pub value: Box<Serializer>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TupleSerializer {
    pub tuple_type: HostType,
    pub items: Vec<Serializer>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupingSerializer {
    pub grouping_type: HostType,
    pub key: Box<Serializer>,
    pub element: Box<Serializer>,
}

/// The result shape of a lookup: the local document plus the array of
/// matched foreign documents.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupResultSerializer {
    pub result_type: HostType,
    pub local: Box<Serializer>,
    pub results: Box<Serializer>,
}

/// Maps named members to sub-serializers. `members` covers the whole
/// base chain, most derived declaration winning, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSerializer {
    pub class: Arc<ClassType>,
    pub members: LinkedHashMap<String, Serializer>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CastingSerializer {
    pub value_type: HostType,
    pub inner: Box<Serializer>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertingSerializer {
    pub value_type: HostType,
    pub inner: Box<Serializer>,
}

impl Serializer {
    /// Build a homogeneous sequence serializer for a collection-typed
    /// node around a known item serializer.
    pub fn sequence(collection_type: &HostType, item: Serializer) -> Serializer {
        Serializer::Array(ArraySerializer {
            collection_type: collection_type.clone(),
            item: Box::new(item),
        })
    }

    pub fn nullable(inner: Serializer) -> Serializer {
        Serializer::Nullable(Box::new(inner))
    }

    pub fn unknowable(value_type: &HostType) -> Serializer {
        Serializer::Unknowable(value_type.clone())
    }

    /// The host value type this serializer can convert. `None` for the
    /// ignore-subtree sentinel, which does not serialize anything.
    pub fn value_type(&self) -> Option<HostType> {
        match self {
            Serializer::Boolean => Some(HostType::Bool),
            Serializer::Char => Some(HostType::Char),
            Serializer::String => Some(HostType::String),
            Serializer::Int16 => Some(HostType::Int16),
            Serializer::Int32 => Some(HostType::Int32),
            Serializer::Int64 => Some(HostType::Int64),
            Serializer::Single => Some(HostType::Single),
            Serializer::Double => Some(HostType::Double),
            Serializer::Decimal => Some(HostType::Decimal),
            Serializer::DateTime => Some(HostType::DateTime),
            Serializer::TimeSpan(_) => Some(HostType::TimeSpan),
            Serializer::Binary => Some(HostType::Binary),
            Serializer::ObjectId => Some(HostType::ObjectId),
            Serializer::Dynamic => Some(HostType::Dynamic),
            Serializer::Enum(e) => Some(HostType::Enum(Arc::clone(&e.enum_type))),
            Serializer::Nullable(inner) => inner.value_type().map(HostType::nullable),
            Serializer::Array(a) => Some(a.collection_type.clone()),
            Serializer::PolymorphicArray(a) => Some(a.collection_type.clone()),
            Serializer::Dictionary(d) => Some(d.dictionary_type.clone()),
            Serializer::KeyValuePair(p) => Some(p.pair_type.clone()),
            Serializer::Tuple(t) => Some(t.tuple_type.clone()),
            Serializer::Grouping(g) => Some(g.grouping_type.clone()),
            Serializer::LookupResult(l) => Some(l.result_type.clone()),
            Serializer::Document(d) => Some(HostType::Class(Arc::clone(&d.class))),
            Serializer::Downcasting(c)
            | Serializer::Upcasting(c) => Some(c.value_type.clone()),
            Serializer::EnumIntegralConverting(c)
            | Serializer::NumericConverting(c) => Some(c.value_type.clone()),
            Serializer::Unknowable(ty) => Some(ty.clone()),
            Serializer::IgnoreSubtree => None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(
            self,
            Serializer::Unknowable(_) | Serializer::IgnoreSubtree
        )
    }

    pub fn is_unknowable(&self) -> bool {
        matches!(self, Serializer::Unknowable(_))
    }

    pub fn is_ignore_subtree(&self) -> bool {
        matches!(self, Serializer::IgnoreSubtree)
    }

    /// The item serializer of a homogeneous sequence. Casting wrappers
    /// are transparent.
    pub fn item_serializer(&self) -> Option<&Serializer> {
        match self {
            Serializer::Array(a) => Some(&a.item),
            Serializer::Grouping(g) => Some(&g.element),
            Serializer::Downcasting(c) | Serializer::Upcasting(c) => c.inner.item_serializer(),
            _ => None,
        }
    }

    /// The item serializer at `index`, for serializers with positional
    /// items; homogeneous arrays answer their one item serializer for
    /// every position.
    pub fn positional_item_serializer(&self, index: usize) -> Option<&Serializer> {
        match self {
            Serializer::Array(a) => Some(&a.item),
            Serializer::PolymorphicArray(a) => a.items.get(index),
            _ => None,
        }
    }

    /// Tuple item serializer, 1-based like the host members Item1..ItemN.
    pub fn tuple_item_serializer(&self, position: usize) -> Option<&Serializer> {
        match self {
            Serializer::Tuple(t) if position >= 1 => t.items.get(position - 1),
            _ => None,
        }
    }

    pub fn key_serializer(&self) -> Option<&Serializer> {
        match self {
            Serializer::Dictionary(d) => Some(&d.key),
            Serializer::KeyValuePair(p) => Some(&p.key),
            Serializer::Grouping(g) => Some(&g.key),
            _ => None,
        }
    }

    pub fn dictionary_value_serializer(&self) -> Option<&Serializer> {
        match self {
            Serializer::Dictionary(d) => Some(&d.value),
            Serializer::KeyValuePair(p) => Some(&p.value),
            _ => None,
        }
    }

    pub fn nullable_inner(&self) -> Option<&Serializer> {
        match self {
            Serializer::Nullable(inner) => Some(inner),
            _ => None,
        }
    }

    /// Per-member serialization info: the document-serializer
    /// capability. Casting wrappers are transparent.
    pub fn member_serializer(&self, name: &str) -> Option<&Serializer> {
        match self {
            Serializer::Document(d) => d.members.get(name),
            Serializer::Downcasting(c) | Serializer::Upcasting(c) => c.inner.member_serializer(name),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&DocumentSerializer> {
        match self {
            Serializer::Document(d) => Some(d),
            Serializer::Downcasting(c) | Serializer::Upcasting(c) => c.inner.as_document(),
            _ => None,
        }
    }

    /// A short name for error messages ("two serializers for one node").
    pub fn kind_name(&self) -> &'static str {
        match self {
            Serializer::Boolean => "Boolean",
            Serializer::Char => "Char",
            Serializer::String => "String",
            Serializer::Int16 => "Int16",
            Serializer::Int32 => "Int32",
            Serializer::Int64 => "Int64",
            Serializer::Single => "Single",
            Serializer::Double => "Double",
            Serializer::Decimal => "Decimal",
            Serializer::DateTime => "DateTime",
            Serializer::TimeSpan(_) => "TimeSpan",
            Serializer::Binary => "Binary",
            Serializer::ObjectId => "ObjectId",
            Serializer::Dynamic => "Dynamic",
            Serializer::Enum(_) => "Enum",
            Serializer::Nullable(_) => "Nullable",
            Serializer::Array(_) => "Array",
            Serializer::PolymorphicArray(_) => "PolymorphicArray",
            Serializer::Dictionary(_) => "Dictionary",
            Serializer::KeyValuePair(_) => "KeyValuePair",
            Serializer::Tuple(_) => "Tuple",
            Serializer::Grouping(_) => "Grouping",
            Serializer::LookupResult(_) => "LookupResult",
            Serializer::Document(_) => "Document",
            Serializer::Downcasting(_) => "Downcasting",
            Serializer::Upcasting(_) => "Upcasting",
            Serializer::EnumIntegralConverting(_) => "EnumIntegralConverting",
            Serializer::NumericConverting(_) => "NumericConverting",
            Serializer::Unknowable(_) => "Unknowable",
            Serializer::IgnoreSubtree => "IgnoreSubtree",
        }
    }
}

impl fmt::Display for Serializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value_type() {
            Some(ty) => write!(f, "{}<{}>", self.kind_name(), ty),
            None => write!(f, "{}", self.kind_name()),
        }
    }
}
