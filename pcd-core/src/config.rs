//! Tuning constants for scene assembly.
//!
//! Every section deserializes with defaults, so a partial JSON document only
//! overrides the values it names.

use serde::{Deserialize, Serialize};

use crate::pointcloud::labeled::PointSetRole;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensifyParams {
    /// Horizontal search radius around each raw point.
    pub radius: f64,
    /// Minimum number of ground neighbors inside `radius`.
    pub min_neighbors: usize,
    /// Maximum `|z - mean neighbor z|` for a point to be promoted.
    pub max_ground_hag: f64,
}

impl Default for DensifyParams {
    fn default() -> Self {
        Self {
            radius: 2.0,
            min_neighbors: 3,
            max_ground_hag: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HagParams {
    /// Ground neighbors averaged per point. Zero disables the estimate.
    pub k_neighbors: usize,
}

impl Default for HagParams {
    fn default() -> Self {
        Self { k_neighbors: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistanceAlphaParams {
    pub max_distance: f64,
    pub min_opacity: f64,
    pub max_opacity: f64,
    /// Opacity used for every point when there are no primary points.
    pub no_primary_opacity: f64,
}

impl Default for DistanceAlphaParams {
    fn default() -> Self {
        Self {
            max_distance: 5.0,
            min_opacity: 0.4,
            max_opacity: 1.0,
            no_primary_opacity: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HagAlphaParams {
    pub max_height: f64,
    pub min_opacity: f64,
    pub max_opacity: f64,
}

impl Default for HagAlphaParams {
    fn default() -> Self {
        Self {
            max_height: 4.0,
            min_opacity: 0.4,
            max_opacity: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanarityAlphaParams {
    pub min_planarity: f64,
    pub default_max_planarity: f64,
    /// The primary set's mean planarity must exceed `min_planarity` by this
    /// much before it replaces `default_max_planarity`.
    pub dynamic_margin: f64,
    /// Neighborhood size for the local eigenvalues. Sets with this many
    /// points or fewer skip the channel.
    pub neighborhood: usize,
    pub min_opacity: f64,
    pub max_opacity: f64,
}

impl Default for PlanarityAlphaParams {
    fn default() -> Self {
        Self {
            min_planarity: 0.1,
            default_max_planarity: 0.6,
            dynamic_margin: 0.05,
            neighborhood: 16,
            min_opacity: 0.4,
            max_opacity: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntensityAlphaParams {
    pub default_max_intensity: f64,
    /// Percentile of the primary intensities used as the dynamic ceiling.
    pub percentile: f64,
    pub min_opacity: f64,
    pub max_opacity: f64,
}

impl Default for IntensityAlphaParams {
    fn default() -> Self {
        Self {
            default_max_intensity: 65535.0,
            percentile: 95.0,
            min_opacity: 0.4,
            max_opacity: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraParams {
    pub fov_degrees: f64,
    pub padding: f64,
    pub min_distance: f64,
    /// Camera height above the cliff's mean elevation, as a fraction of its
    /// vertical extent.
    pub elevation_factor: f64,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            padding: 1.5,
            min_distance: 15.0,
            elevation_factor: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleFigureParams {
    pub height: f64,
    /// Step away from the cliff base used by the fallback placement.
    pub fallback_offset: f64,
    /// Distance beyond the northern edge of a boulder.
    pub boulder_offset: f64,
    /// Whether `sides` joins `top` when computing a boulder's centroid.
    pub include_sides_in_boulder_centroid: bool,
}

impl Default for ScaleFigureParams {
    fn default() -> Self {
        Self {
            height: 1.7018,
            fallback_offset: 1.0,
            boulder_offset: 1.5,
            include_sides_in_boulder_centroid: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleColors {
    pub top: [f32; 3],
    pub sides: [f32; 3],
    pub ground: [f32; 3],
    pub ground_context: [f32; 3],
    pub foliage_context: [f32; 3],
}

impl RoleColors {
    pub fn for_role(&self, role: PointSetRole) -> [f32; 3] {
        match role {
            PointSetRole::Top => self.top,
            PointSetRole::Sides => self.sides,
            PointSetRole::Ground => self.ground,
            PointSetRole::GroundContext => self.ground_context,
            PointSetRole::FoliageContext => self.foliage_context,
        }
    }
}

impl Default for RoleColors {
    fn default() -> Self {
        Self {
            top: [1.0, 0.0, 0.0],
            sides: [0.95, 0.25, 0.25],
            ground: [0.05, 0.05, 0.95],
            ground_context: [0.1, 0.3, 0.8],
            foliage_context: [1.0, 1.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub densify: DensifyParams,
    pub hag: HagParams,
    pub distance_alpha: DistanceAlphaParams,
    pub hag_alpha: HagAlphaParams,
    pub planarity_alpha: PlanarityAlphaParams,
    pub intensity_alpha: IntensityAlphaParams,
    /// Exponent applied to the product of the four channels.
    pub alpha_exponent: f64,
    pub camera: CameraParams,
    pub scale_figure: ScaleFigureParams,
    pub colors: RoleColors,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            densify: DensifyParams::default(),
            hag: HagParams::default(),
            distance_alpha: DistanceAlphaParams::default(),
            hag_alpha: HagAlphaParams::default(),
            planarity_alpha: PlanarityAlphaParams::default(),
            intensity_alpha: IntensityAlphaParams::default(),
            alpha_exponent: 0.1,
            camera: CameraParams::default(),
            scale_figure: ScaleFigureParams::default(),
            colors: RoleColors::default(),
        }
    }
}
