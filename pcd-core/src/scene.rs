use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{error::SceneError, pointcloud::labeled::PointSetRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum SceneType {
    Boulder,
    Cliff,
}

impl FromStr for SceneType {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "boulder" => Ok(SceneType::Boulder),
            "cliff" => Ok(SceneType::Cliff),
            other => Err(SceneError::InvalidInput(format!(
                "scene type must be 'boulder' or 'cliff', got '{other}'"
            ))),
        }
    }
}

impl TryFrom<String> for SceneType {
    type Error = SceneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for SceneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneType::Boulder => f.write_str("Boulder"),
            SceneType::Cliff => f.write_str("Cliff"),
        }
    }
}

/// Any JSON value, passed through to the payload untouched.
pub type MetadataValue = serde_json::Value;

/// Read-only description of the scene supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneMetadata {
    #[serde(rename = "type")]
    pub scene_type: SceneType,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, MetadataValue>,
}

impl SceneMetadata {
    pub fn new(scene_type: SceneType) -> Self {
        Self {
            scene_type,
            attributes: BTreeMap::new(),
        }
    }

    pub fn is_cliff(&self) -> bool {
        self.scene_type == SceneType::Cliff
    }
}

/// One colored point layer in viewer coordinates.
///
/// `positions` holds `[x, y, z]` triples and `colors` holds `[r, g, b, a]`
/// quadruples, both flattened, one entry per point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderRecord {
    pub name: PointSetRole,
    pub positions: Vec<f64>,
    pub colors: Vec<f32>,
}

impl RenderRecord {
    pub fn point_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn alphas(&self) -> impl Iterator<Item = f32> + '_ {
        self.colors.chunks_exact(4).map(|rgba| rgba[3])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraPlacement {
    pub position: [f64; 3],
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleFigurePlacement {
    #[serde(rename = "base")]
    pub base_position: [f64; 3],
    pub height: f64,
}

/// Outcome of an optional placement computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Placement<T> {
    NotRequested,
    Placed(T),
    Unavailable { reason: String },
}

impl<T> Placement<T> {
    pub fn placed(&self) -> Option<&T> {
        match self {
            Placement::Placed(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_placed(&self) -> bool {
        matches!(self, Placement::Placed(_))
    }

    pub fn unavailable(error: &SceneError) -> Self {
        Placement::Unavailable {
            reason: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenePayload {
    pub metadata: SceneMetadata,
    pub records: Vec<RenderRecord>,
    pub camera: Placement<CameraPlacement>,
    pub scale_figure: Placement<ScaleFigurePlacement>,
}

impl ScenePayload {
    pub fn record(&self, role: PointSetRole) -> Option<&RenderRecord> {
        self.records.iter().find(|record| record.name == role)
    }
}
