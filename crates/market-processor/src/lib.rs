mod decode;
mod normalizer;

pub use decode::{RawOrderEvent, SchemaVariant};
pub use normalizer::{hex_lower, normalize, normalize_log};
