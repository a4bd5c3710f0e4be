use crate::{
    expr::{Expression, NodeId},
    finder::{Error, Result},
    host::HostType,
    serializers::{ConvertingSerializer, CastingSerializer, Serializer},
};
use mongolinq_datastructures::unique_id_map::UniqueIdMap;

/// The node→serializer association table for one translation run.
/// Entries are added monotonically, never removed or replaced; a node
/// has at most one serializer, and a second different one is a hard
/// error. Created empty per translation and discarded afterwards.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SerializerMap {
    entries: UniqueIdMap<NodeId, Serializer>,
}

impl SerializerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `serializer` with `node`. If the serializer's value
    /// type does not exactly match the node's static type, one of the
    /// special-case coercions is applied: the nullable-enum dual
    /// coercion, downcast wrapping, or upcast wrapping. No applicable
    /// coercion is a configuration error; an existing different entry
    /// is an ambiguous-inference error. Re-adding an equal serializer
    /// is a no-op.
    pub fn add(&mut self, node: &Expression, serializer: Serializer) -> Result<()> {
        let serializer = Self::coerce(node, serializer)?;
        match self.entries.get(node.id) {
            Some(existing) if *existing == serializer => Ok(()),
            Some(existing) => Err(Error::AmbiguousSerializer {
                expression: node.to_string(),
                existing: existing.kind_name().to_string(),
                new: serializer.kind_name().to_string(),
            }),
            None => {
                // insert cannot fail: absence was just checked
                self.entries
                    .insert(node.id, serializer)
                    .map_err(|e| Error::AmbiguousSerializer {
                        expression: node.to_string(),
                        existing: e.0,
                        new: "duplicate".to_string(),
                    })
            }
        }
    }

    fn coerce(node: &Expression, serializer: Serializer) -> Result<Serializer> {
        let value_type = match serializer.value_type() {
            // sentinels are not codecs and are never type-checked
            None => return Ok(serializer),
            Some(value_type) => value_type,
        };
        if serializer.is_sentinel() || value_type == node.ty {
            return Ok(serializer);
        }
        if Self::is_nullable_enum_integral_pair(&node.ty, &value_type) {
            return Ok(Serializer::EnumIntegralConverting(ConvertingSerializer {
                value_type: node.ty.clone(),
                inner: Box::new(serializer),
            }));
        }
        if node.ty.is_supertype_of(&value_type) {
            return Ok(Serializer::Downcasting(CastingSerializer {
                value_type: node.ty.clone(),
                inner: Box::new(serializer),
            }));
        }
        if value_type.is_supertype_of(&node.ty) {
            return Ok(Serializer::Upcasting(CastingSerializer {
                value_type: node.ty.clone(),
                inner: Box::new(serializer),
            }));
        }
        Err(Error::MismatchedSerializer {
            expression: node.to_string(),
            node_type: node.ty.to_string(),
            serializer_type: value_type.to_string(),
        })
    }

    /// One side `Nullable<Enum>`, the other `Nullable<UnderlyingIntegral>`.
    fn is_nullable_enum_integral_pair(a: &HostType, b: &HostType) -> bool {
        match (a.nullable_inner(), b.nullable_inner()) {
            (Some(HostType::Enum(e)), Some(integral))
            | (Some(integral), Some(HostType::Enum(e))) => e.underlying == *integral,
            _ => false,
        }
    }

    /// Membership including the sentinel variants: sentinels count as
    /// known for progress-tracking purposes.
    pub fn is_known(&self, id: NodeId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn is_not_known(&self, id: NodeId) -> bool {
        !self.is_known(id)
    }

    pub fn known_serializer(&self, id: NodeId) -> Option<&Serializer> {
        self.entries.get(id)
    }

    /// The resolved serializer for a consumer that needs an actual
    /// codec; absence and sentinels are both failures.
    pub fn get_required(&self, node: &Expression) -> Result<&Serializer> {
        match self.entries.get(node.id) {
            None => Err(Error::UnableToDetermineSerializer(node.to_string())),
            Some(serializer) if serializer.is_sentinel() => {
                Err(Error::SentinelSerializerRequired {
                    expression: node.to_string(),
                    serializer: serializer.kind_name().to_string(),
                })
            }
            Some(serializer) => Ok(serializer),
        }
    }

    /// Known with an actual codec: `is_known` minus the sentinels.
    pub fn has_result(&self, id: NodeId) -> bool {
        matches!(self.entries.get(id), Some(serializer) if !serializer.is_sentinel())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &Serializer)> {
        self.entries.iter()
    }
}
