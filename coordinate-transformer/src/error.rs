use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("scene center must be finite, got {0:?}")]
    NonFiniteCenter([f64; 3]),
}

impl From<TransformError> for pcd_core::SceneError {
    fn from(err: TransformError) -> Self {
        pcd_core::SceneError::InvalidInput(err.to_string())
    }
}
