//! Ground-anchored placement of a human-height reference figure.
//!
//! Cliff scenes try a projection placement at the foot of the face and fall
//! back to a fixed step away from the nearest base point. Boulder scenes
//! stand the figure just north of the boulder, where the default camera
//! looks from.

use coordinate_transformer::ViewerTransformer;
use pcd_core::{
    config::ScaleFigureParams, LabeledPointSets, Point4D, PointSet, ScaleFigurePlacement,
    SceneError, SceneType,
};
use pcd_spatial::KdIndex;

const MIN_LINE_LENGTH: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FigureStrategy {
    Projection,
    Fallback,
    Boulder,
}

/// A figure base in native coordinates, with the strategy that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct FigurePlan {
    pub native_base: [f64; 3],
    pub strategy: FigureStrategy,
}

/// Combined ground split at the cliff's vertical midpoint.
struct GroundSplit {
    below: PointSet,
    above: PointSet,
}

impl GroundSplit {
    fn new(ground: &PointSet, mid_z: f64) -> Self {
        let (below, above): (Vec<Point4D>, Vec<Point4D>) =
            ground.iter().partition(|p| p.z < mid_z);
        Self {
            below: PointSet::new(below),
            above: PointSet::new(above),
        }
    }

    fn centroids(&self) -> Option<([f64; 2], [f64; 2])> {
        Some((self.below.centroid_xy()?, self.above.centroid_xy()?))
    }
}

/// Nearest ground point to `xy`, horizontally.
fn nearest_ground(ground: &PointSet, xy: [f64; 2]) -> Result<Point4D, SceneError> {
    let index = KdIndex::build(&ground.xy_coords())?;
    let nearest = index.nearest_one(&xy)?;
    Ok(ground.points[nearest.index])
}

fn sub(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [a[0] - b[0], a[1] - b[1]]
}

fn dot(a: [f64; 2], b: [f64; 2]) -> f64 {
    a[0] * b[0] + a[1] * b[1]
}

fn norm(a: [f64; 2]) -> f64 {
    dot(a, a).sqrt()
}

fn projection_placement(sides: &PointSet, split: &GroundSplit) -> Result<FigurePlan, SceneError> {
    let (low, high) = split.centroids().ok_or_else(|| {
        SceneError::insufficient(
            "scale figure",
            format!(
                "{} ground points below and {} above the cliff midpoint",
                split.below.len(),
                split.above.len()
            ),
        )
    })?;

    let line = sub(high, low);
    let line_sq = dot(line, line);
    if line_sq.sqrt() < MIN_LINE_LENGTH {
        return Err(SceneError::degenerate(
            "scale figure",
            "low and high ground centroids coincide",
        ));
    }

    // the projected point closest to `low` has the smallest |t|
    let t = sides
        .iter()
        .map(|p| dot(sub(p.xy(), low), line) / line_sq)
        .min_by(|a, b| a.abs().total_cmp(&b.abs()))
        .ok_or_else(|| SceneError::insufficient("scale figure", "no sides points"))?;
    let closest = [low[0] + t * line[0], low[1] + t * line[1]];
    let target = [(low[0] + closest[0]) / 2.0, (low[1] + closest[1]) / 2.0];

    let ground_point = nearest_ground(&split.below, target)?;
    Ok(FigurePlan {
        native_base: [target[0], target[1], ground_point.z],
        strategy: FigureStrategy::Projection,
    })
}

fn fallback_placement(
    sides: &PointSet,
    ground: &PointSet,
    split: &GroundSplit,
    center: [f64; 3],
    params: &ScaleFigureParams,
) -> Result<FigurePlan, SceneError> {
    let targets = if split.below.is_empty() {
        ground
    } else {
        &split.below
    };
    if targets.is_empty() {
        return Err(SceneError::insufficient(
            "scale figure",
            "no ground points for fallback placement",
        ));
    }

    let sides_centroid = sides
        .centroid_xy()
        .ok_or_else(|| SceneError::insufficient("scale figure", "no sides points"))?;
    let anchor = nearest_ground(targets, sides_centroid)?;

    let away = split
        .centroids()
        .map(|(low, high)| sub(low, high))
        .filter(|v| norm(*v) >= MIN_LINE_LENGTH)
        .unwrap_or_else(|| sub(anchor.xy(), [center[0], center[1]]));
    let length = norm(away) + 1e-6;
    let target = [
        anchor.x + away[0] / length * params.fallback_offset,
        anchor.y + away[1] / length * params.fallback_offset,
    ];

    let ground_point = nearest_ground(targets, target)?;
    Ok(FigurePlan {
        native_base: [target[0], target[1], ground_point.z],
        strategy: FigureStrategy::Fallback,
    })
}

/// Figure base at the foot of a cliff.
pub fn plan_cliff_figure(
    sides: &PointSet,
    ground: &PointSet,
    center: [f64; 3],
    params: &ScaleFigureParams,
) -> Result<FigurePlan, SceneError> {
    let bounds = sides
        .bounding_volume()
        .ok_or_else(|| SceneError::insufficient("scale figure", "cliff has no sides points"))?;
    if ground.is_empty() {
        return Err(SceneError::insufficient(
            "scale figure",
            "no ground points around the cliff",
        ));
    }

    let split = GroundSplit::new(ground, bounds.mid_z());
    match projection_placement(sides, &split) {
        Ok(plan) => {
            log::info!("using projection-based scale figure placement");
            Ok(plan)
        }
        Err(e) => {
            log::warn!("projection placement failed ({}), using fallback", e);
            fallback_placement(sides, ground, &split, center, params)
        }
    }
}

/// Figure base just beyond the northern edge of a boulder.
pub fn plan_boulder_figure(
    top: &PointSet,
    sides: &PointSet,
    ground: &PointSet,
    params: &ScaleFigureParams,
) -> Result<FigurePlan, SceneError> {
    let footprint = if params.include_sides_in_boulder_centroid {
        PointSet::concat([top, sides])
    } else {
        top.clone()
    };
    let centroid = footprint
        .centroid_xy()
        .ok_or_else(|| SceneError::insufficient("scale figure", "boulder has no top points"))?;
    let max_y = top
        .iter()
        .map(|p| p.y)
        .max_by(f64::total_cmp)
        .ok_or_else(|| SceneError::insufficient("scale figure", "boulder has no top points"))?;
    if ground.is_empty() {
        return Err(SceneError::insufficient(
            "scale figure",
            "no ground points around the boulder",
        ));
    }

    let candidate = [centroid[0], max_y + params.boulder_offset];
    let ground_point = nearest_ground(ground, candidate)?;
    log::debug!(
        "boulder figure at {:?}, ground point {:?}",
        candidate,
        ground_point
    );
    Ok(FigurePlan {
        native_base: [candidate[0], candidate[1], ground_point.z],
        strategy: FigureStrategy::Boulder,
    })
}

/// Places the figure for `scene_type` and maps its base into the viewer
/// frame. Ground is the labeled ground plus the undensified ground context.
pub fn place_scale_figure(
    sets: &LabeledPointSets,
    scene_type: SceneType,
    transformer: &ViewerTransformer,
    params: &ScaleFigureParams,
) -> Result<ScaleFigurePlacement, SceneError> {
    let ground = sets.combined_ground();
    let plan = match scene_type {
        SceneType::Cliff => plan_cliff_figure(&sets.sides, &ground, transformer.center(), params)?,
        SceneType::Boulder => plan_boulder_figure(&sets.top, &sets.sides, &ground, params)?,
    };
    Ok(ScaleFigurePlacement {
        base_position: transformer.forward(plan.native_base),
        height: params.height,
    })
}
