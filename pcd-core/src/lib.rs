pub mod config;
pub mod error;
pub mod pointcloud;
pub mod scene;

pub use config::ViewerConfig;
pub use error::SceneError;
pub use pointcloud::{
    labeled::{LabeledPointSets, PointSetRole},
    point::{is_known_intensity, BoundingVolume, Point4D, PointSet, UNKNOWN_INTENSITY},
};
pub use scene::{
    CameraPlacement, MetadataValue, Placement, RenderRecord, ScaleFigurePlacement, SceneMetadata,
    ScenePayload, SceneType,
};
