use crate::{
    host::HostType,
    serializers::{EnumSerializer, Serializer, TimeSpanUnits},
};
use std::sync::Arc;

/// The standard registry: the default serializer for a type, when one
/// exists. A pure, deterministic function of the type. Answers only
/// for the fixed family it knows (scalars, the dynamic value type,
/// enums, and nullables of those); structural types get `None` and the
/// caller must derive a serializer or leave the node unresolved.
pub fn standard_serializer(ty: &HostType) -> Option<Serializer> {
    match ty {
        HostType::Bool => Some(Serializer::Boolean),
        HostType::Char => Some(Serializer::Char),
        HostType::String => Some(Serializer::String),
        HostType::Int16 => Some(Serializer::Int16),
        HostType::Int32 => Some(Serializer::Int32),
        HostType::Int64 => Some(Serializer::Int64),
        HostType::Single => Some(Serializer::Single),
        HostType::Double => Some(Serializer::Double),
        HostType::Decimal => Some(Serializer::Decimal),
        HostType::DateTime => Some(Serializer::DateTime),
        HostType::TimeSpan => Some(Serializer::TimeSpan(TimeSpanUnits::Milliseconds)),
        HostType::Binary => Some(Serializer::Binary),
        HostType::ObjectId => Some(Serializer::ObjectId),
        HostType::Dynamic => Some(Serializer::Dynamic),
        HostType::Enum(e) => Some(Serializer::Enum(EnumSerializer {
            enum_type: Arc::clone(e),
        })),
        HostType::Nullable(inner) => standard_serializer(inner).map(Serializer::nullable),
        _ => None,
    }
}
