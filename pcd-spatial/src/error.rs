use pcd_core::SceneError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpatialError {
    #[error("cannot build a spatial index over an empty point set")]
    EmptyIndex,

    #[error("kd-tree rejected the input: {0}")]
    KdTree(String),

    #[error("need at least {required} points, got {len}")]
    TooFewPoints { len: usize, required: usize },

    #[error("degenerate geometry: {0}")]
    Degenerate(&'static str),

    #[error("non-finite value in {0}")]
    NonFinite(&'static str),
}

impl From<kdtree::ErrorKind> for SpatialError {
    fn from(kind: kdtree::ErrorKind) -> Self {
        SpatialError::KdTree(format!("{:?}", kind))
    }
}

impl From<SpatialError> for SceneError {
    fn from(err: SpatialError) -> Self {
        match err {
            SpatialError::EmptyIndex | SpatialError::KdTree(_) => {
                SceneError::SpatialIndex(err.to_string())
            }
            SpatialError::TooFewPoints { .. } => SceneError::insufficient("spatial", err.to_string()),
            SpatialError::Degenerate(_) => SceneError::degenerate("spatial", err.to_string()),
            SpatialError::NonFinite(_) => SceneError::computation("spatial", err.to_string()),
        }
    }
}
