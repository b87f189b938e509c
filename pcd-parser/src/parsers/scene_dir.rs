//! A scene directory holds one CSV per point-set role (`top.csv`,
//! `sides.csv`, `ground.csv`, `ground_context.csv`, `foliage_context.csv`)
//! and a `metadata.json` with at least a `type` field. Missing role files
//! are empty sets. An optional `center: [x, y, z]` in the metadata fixes the
//! scene center; otherwise the centroid of the primary points is used, then
//! the centroid of every point.

use std::path::{Path, PathBuf};

use pcd_core::{LabeledPointSets, PointSet, PointSetRole, SceneMetadata};
use rayon::prelude::*;

use super::{Parser, SceneBundle};
use crate::{
    error::ParseError,
    reader::{csv::CsvPointReader, read_point_set},
};

pub const METADATA_FILE: &str = "metadata.json";

pub struct SceneDirParser {
    pub dir: PathBuf,
}

impl SceneDirParser {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn role_path(&self, role: PointSetRole) -> PathBuf {
        self.dir.join(format!("{}.csv", role.as_str()))
    }

    fn read_role(&self, role: PointSetRole) -> Result<PointSet, ParseError> {
        let path = self.role_path(role);
        if !path.is_file() {
            log::debug!("{} not found, using an empty set", path.display());
            return Ok(PointSet::default());
        }
        let mut reader = CsvPointReader::open(&path)?;
        let points = read_point_set(&mut reader)?;
        log::debug!("read {} points from {}", points.len(), path.display());
        Ok(points)
    }
}

impl Parser for SceneDirParser {
    fn parse(&self) -> Result<SceneBundle, ParseError> {
        let (metadata, explicit_center) = read_metadata(&self.dir.join(METADATA_FILE))?;

        let loaded = PointSetRole::ALL
            .par_iter()
            .map(|role| Ok((*role, self.read_role(*role)?)))
            .collect::<Result<Vec<_>, ParseError>>()?;
        let mut sets = LabeledPointSets::default();
        for (role, points) in loaded {
            *sets.get_mut(role) = points;
        }

        let center = resolve_center(&sets, explicit_center).ok_or_else(|| {
            ParseError::EmptyScene {
                path: self.dir.clone(),
            }
        })?;

        let id = self
            .dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.dir.display().to_string());
        log::info!(
            "loaded scene {} ({}, {} points)",
            id,
            metadata.scene_type,
            sets.total_points()
        );

        Ok(SceneBundle {
            id,
            sets,
            metadata,
            center,
        })
    }
}

fn read_metadata(path: &Path) -> Result<(SceneMetadata, Option<[f64; 3]>), ParseError> {
    let text = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let metadata_error = |source| ParseError::Metadata {
        path: path.to_path_buf(),
        source,
    };

    let mut value: serde_json::Value = serde_json::from_str(&text).map_err(metadata_error)?;
    let center = match value.as_object_mut().and_then(|object| object.remove("center")) {
        Some(center) => Some(serde_json::from_value(center).map_err(metadata_error)?),
        None => None,
    };
    let metadata = serde_json::from_value(value).map_err(metadata_error)?;
    Ok((metadata, center))
}

/// Explicit center, else the primary centroid, else the centroid of all
/// points.
pub fn resolve_center(sets: &LabeledPointSets, explicit: Option<[f64; 3]>) -> Option<[f64; 3]> {
    explicit
        .or_else(|| sets.primary().centroid())
        .or_else(|| PointSet::concat(sets.iter().map(|(_, set)| set)).centroid())
}
