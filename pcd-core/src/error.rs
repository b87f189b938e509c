use thiserror::Error;

/// Failure kinds raised while assembling a scene.
///
/// Only [`SceneError::InvalidInput`] is a caller contract violation; every
/// other kind is recovered from by the assembler with a degraded result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("insufficient data for {component}: {detail}")]
    InsufficientData {
        component: &'static str,
        detail: String,
    },

    #[error("spatial index failure: {0}")]
    SpatialIndex(String),

    #[error("numeric degeneracy in {component}: {detail}")]
    NumericDegeneracy {
        component: &'static str,
        detail: String,
    },

    #[error("computation failed in {component}: {detail}")]
    Computation {
        component: &'static str,
        detail: String,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl SceneError {
    pub fn insufficient(component: &'static str, detail: impl Into<String>) -> Self {
        Self::InsufficientData {
            component,
            detail: detail.into(),
        }
    }

    pub fn degenerate(component: &'static str, detail: impl Into<String>) -> Self {
        Self::NumericDegeneracy {
            component,
            detail: detail.into(),
        }
    }

    pub fn computation(component: &'static str, detail: impl Into<String>) -> Self {
        Self::Computation {
            component,
            detail: detail.into(),
        }
    }

    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}
