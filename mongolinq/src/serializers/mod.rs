mod definitions;
pub use definitions::*;
mod registry;
pub use registry::standard_serializer;
