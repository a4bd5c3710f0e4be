pub mod expr;
pub mod finder;
pub mod host;
pub mod options;
pub mod result;
pub mod serializers;
pub mod usererror;
mod util;

use crate::{
    expr::Expression,
    finder::{SerializerFinder, SerializerMap},
    options::FinderOptions,
    result::Result,
};

/// Runs serializer inference over a query expression tree.
///
/// `seeded` must already associate the query's root/source collection
/// document type with its serializer; inference propagates from there.
/// On success every reachable, non-ignored node has a serializer in
/// the returned map, which is handed to the downstream pipeline
/// renderer. On failure the error names the offending sub-expression
/// in source-like text.
pub fn find_serializers(
    root: &Expression,
    seeded: SerializerMap,
    options: FinderOptions,
) -> Result<SerializerMap> {
    let finder = SerializerFinder::new(&options);
    let map = finder.find_serializers(root, seeded)?;
    Ok(map)
}
