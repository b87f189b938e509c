use coordinate_transformer::ViewerTransformer;
use pcd_core::{
    LabeledPointSets, Placement, PointSet, PointSetRole, RenderRecord, SceneError, SceneMetadata,
    ScenePayload, ViewerConfig,
};
use pcd_spatial::LocalEigenProvider;

use crate::{
    alpha::AlphaCompositor, camera::cliff_camera, densify::densify_ground,
    scale_figure::place_scale_figure,
};

/// Turns the labeled point sets of one scene into view-ready render records
/// and placements.
pub struct SceneAssembler {
    config: ViewerConfig,
    eigen: Option<Box<dyn LocalEigenProvider>>,
}

impl SceneAssembler {
    pub fn new(config: ViewerConfig, eigen: Option<Box<dyn LocalEigenProvider>>) -> Self {
        Self { config, eigen }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Only a caller contract violation is returned as an error: a
    /// non-finite center or a point with non-finite coordinates. Everything
    /// else degrades to neutral alphas or an unavailable placement.
    pub fn assemble(
        &self,
        sets: &LabeledPointSets,
        center: [f64; 3],
        metadata: &SceneMetadata,
        include_scale_figure: bool,
    ) -> Result<ScenePayload, SceneError> {
        validate(sets)?;
        let transformer = ViewerTransformer::new(center)?;

        let densified = densify_ground(
            &sets.ground_context,
            &sets.foliage_context,
            &self.config.densify,
        );

        let compositor = AlphaCompositor::new(&self.config, self.eigen.as_deref());
        let foliage_alphas =
            compositor.foliage_alphas(&densified.raw, &sets.primary(), &densified.ground);

        let mut records = Vec::with_capacity(PointSetRole::ALL.len());
        for role in PointSetRole::ALL {
            let set = match role {
                PointSetRole::GroundContext => &densified.ground,
                PointSetRole::FoliageContext => &densified.raw,
                _ => sets.get(role),
            };
            if set.is_empty() {
                continue;
            }
            let alphas = (role == PointSetRole::FoliageContext).then_some(foliage_alphas.as_slice());
            records.push(self.render_record(role, set, alphas, &transformer));
        }

        let camera = if metadata.is_cliff() {
            let ground = sets.combined_ground();
            settle(
                "camera",
                cliff_camera(&sets.sides, &ground, &self.config.camera, &transformer),
            )?
        } else {
            Placement::NotRequested
        };

        let scale_figure = if include_scale_figure {
            settle(
                "scale figure",
                place_scale_figure(
                    sets,
                    metadata.scene_type,
                    &transformer,
                    &self.config.scale_figure,
                ),
            )?
        } else {
            Placement::NotRequested
        };

        log::info!(
            "assembled {} scene: {} records, {} points",
            metadata.scene_type,
            records.len(),
            records.iter().map(RenderRecord::point_count).sum::<usize>()
        );
        Ok(ScenePayload {
            metadata: metadata.clone(),
            records,
            camera,
            scale_figure,
        })
    }

    fn render_record(
        &self,
        role: PointSetRole,
        set: &PointSet,
        alphas: Option<&[f64]>,
        transformer: &ViewerTransformer,
    ) -> RenderRecord {
        let alphas = alphas.filter(|alphas| {
            let aligned = alphas.len() == set.len();
            if !aligned {
                log::warn!(
                    "alpha/point mismatch for '{}': {} vs {}, using 1.0",
                    role,
                    alphas.len(),
                    set.len()
                );
            }
            aligned
        });

        let [r, g, b] = self.config.colors.for_role(role);
        let mut colors = Vec::with_capacity(set.len() * 4);
        for i in 0..set.len() {
            let a = alphas.map_or(1.0, |alphas| alphas[i] as f32);
            colors.extend_from_slice(&[r, g, b, a]);
        }

        RenderRecord {
            name: role,
            positions: transformer.transform_points(set),
            colors,
        }
    }
}

fn validate(sets: &LabeledPointSets) -> Result<(), SceneError> {
    for (role, set) in sets.iter() {
        if let Some(i) = set.iter().position(|p| !p.is_finite()) {
            return Err(SceneError::InvalidInput(format!(
                "{} point {} has non-finite coordinates",
                role, i
            )));
        }
    }
    Ok(())
}

/// Contract violations propagate; any other failure becomes `Unavailable`.
fn settle<T>(what: &str, result: Result<T, SceneError>) -> Result<Placement<T>, SceneError> {
    match result {
        Ok(value) => Ok(Placement::Placed(value)),
        Err(e) if e.is_contract_violation() => Err(e),
        Err(e) => {
            log::warn!("{} unavailable: {}", what, e);
            Ok(Placement::unavailable(&e))
        }
    }
}
