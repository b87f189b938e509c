use pcd_core::{LabeledPointSets, SceneError, SceneMetadata, ScenePayload};
use rayon::prelude::*;

use crate::assembler::SceneAssembler;

/// Everything needed to assemble one scene.
#[derive(Debug, Clone)]
pub struct SceneInput {
    pub id: String,
    pub sets: LabeledPointSets,
    pub center: [f64; 3],
    pub metadata: SceneMetadata,
    pub include_scale_figure: bool,
}

#[derive(Debug)]
pub struct SceneOutput {
    pub id: String,
    pub result: Result<ScenePayload, SceneError>,
}

pub trait Runner {
    fn execute(&self, scenes: Vec<SceneInput>) -> Vec<SceneOutput>;
}

/// Assembles independent scenes in parallel. Output order follows input
/// order, and a failed scene never affects its siblings.
pub struct BatchRunner {
    assembler: SceneAssembler,
}

impl BatchRunner {
    pub fn new(assembler: SceneAssembler) -> Self {
        Self { assembler }
    }
}

impl Runner for BatchRunner {
    fn execute(&self, scenes: Vec<SceneInput>) -> Vec<SceneOutput> {
        log::info!("assembling {} scenes", scenes.len());
        scenes
            .into_par_iter()
            .map(|scene| {
                let result = self.assembler.assemble(
                    &scene.sets,
                    scene.center,
                    &scene.metadata,
                    scene.include_scale_figure,
                );
                if let Err(e) = &result {
                    log::error!("scene {} failed: {}", scene.id, e);
                }
                SceneOutput {
                    id: scene.id,
                    result,
                }
            })
            .collect()
    }
}
