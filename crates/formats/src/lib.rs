pub mod config;
pub mod error;
pub mod geojson;
pub mod ingest;
pub mod kind;
pub mod pcd;
pub mod point_set;
pub mod upload;
pub mod validate;
pub mod xyz;

pub use config::*;
pub use error::*;
pub use geojson::{Feature, FeatureCollection, GeoPoint, Geometry, GeometryKind};
pub use ingest::*;
pub use kind::*;
pub use point_set::*;
pub use upload::*;
