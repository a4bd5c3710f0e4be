use crate::{expr::Expression, finder::serializer_map::SerializerMap};

/// Find the first reachable node with no map entry, in a fixed
/// traversal order: children before the node itself, subtrees rooted
/// at sentinel-marked nodes skipped entirely. Returns the first gap
/// only; that node becomes the subject of the failure message. Used
/// both as the driver's final completeness gate and standalone for
/// diagnostics.
pub fn find_first_missing<'a>(
    node: &'a Expression,
    map: &SerializerMap,
) -> Option<&'a Expression> {
    if let Some(serializer) = map.known_serializer(node.id) {
        if serializer.is_sentinel() {
            return None;
        }
    }
    for child in node.children() {
        if let Some(found) = find_first_missing(child, map) {
            return Some(found);
        }
    }
    // lambdas and quotes are structural wrappers; only their
    // descendants carry serialized values
    if node.has_serializable_value() && map.is_not_known(node.id) {
        return Some(node);
    }
    None
}
