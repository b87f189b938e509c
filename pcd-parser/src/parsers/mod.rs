pub mod scene_dir;

use pcd_core::{LabeledPointSets, SceneMetadata};

use crate::error::ParseError;

/// One scene as loaded from disk, ready to be assembled.
#[derive(Debug, Clone)]
pub struct SceneBundle {
    pub id: String,
    pub sets: LabeledPointSets,
    pub metadata: SceneMetadata,
    pub center: [f64; 3],
}

pub trait Parser {
    fn parse(&self) -> Result<SceneBundle, ParseError>;
}
