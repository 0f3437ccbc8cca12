//! Streaming access to GeoJSON feature collections.
//!
//! [`FeatureReader`] pulls one feature at a time out of a collection and
//! [`FeatureCollectionWriter`] pushes one feature at a time into a new one, so
//! a read-transform-write pass never holds more than a single feature.

mod numeric;
mod reader;
mod writer;

pub use numeric::{normalize_feature, normalize_numbers, normalize_value};
pub use reader::{FeatureReader, count_features};
pub use writer::{FeatureCollectionWriter, write_collection};
