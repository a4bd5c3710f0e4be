use crate::{expr::Expression, options::FinderOptions};

mod errors;
pub use errors::Error;
mod method_call;
mod missing;
mod new_expression;
mod serializer_map;
pub use serializer_map::SerializerMap;
mod visitor;
use visitor::InferenceVisitor;

#[cfg(test)]
mod test;

pub(crate) type Result<T> = std::result::Result<T, Error>;

/// The fixed-point driver: re-runs the inference visitor over the
/// whole tree until a pass adds no new node→serializer associations,
/// then checks completeness.
///
/// "No progress" has two stages. The visitor first runs without the
/// constant-default fallback so that precise sibling-propagated
/// serializers win over generic registry defaults; only when a pass
/// adds nothing is the fallback unlocked, and only when a pass with
/// the fallback unlocked also adds nothing does the loop end. The
/// fixed point can converge with gaps remaining, so a final
/// missing-serializer sweep gates success.
pub struct SerializerFinder<'a> {
    options: &'a FinderOptions,
}

impl<'a> SerializerFinder<'a> {
    pub fn new(options: &'a FinderOptions) -> Self {
        Self { options }
    }

    pub fn find_serializers(
        &self,
        root: &Expression,
        mut map: SerializerMap,
    ) -> Result<SerializerMap> {
        {
            let mut visitor = InferenceVisitor::new(&mut map, self.options);
            loop {
                let entries_before_pass = visitor.entry_count();
                visitor.visit(root)?;
                if visitor.entry_count() == entries_before_pass {
                    if visitor.use_default_serializers_for_constants {
                        break;
                    }
                    visitor.use_default_serializers_for_constants = true;
                }
            }
        }

        if let Some(unresolved) = missing::find_first_missing(root, &map) {
            return Err(Error::UnableToDetermineSerializer(unresolved.to_string()));
        }
        Ok(map)
    }
}
