use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{error::SceneError, pointcloud::point::PointSet};

/// The five semantic roles a point set can play in a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointSetRole {
    Top,
    Sides,
    Ground,
    GroundContext,
    FoliageContext,
}

impl PointSetRole {
    /// Render order of the roles.
    pub const ALL: [PointSetRole; 5] = [
        PointSetRole::Top,
        PointSetRole::Sides,
        PointSetRole::Ground,
        PointSetRole::GroundContext,
        PointSetRole::FoliageContext,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PointSetRole::Top => "top",
            PointSetRole::Sides => "sides",
            PointSetRole::Ground => "ground",
            PointSetRole::GroundContext => "ground_context",
            PointSetRole::FoliageContext => "foliage_context",
        }
    }
}

impl fmt::Display for PointSetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PointSetRole {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PointSetRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| SceneError::InvalidInput(format!("unknown point set role '{s}'")))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabeledPointSets {
    #[serde(default)]
    pub top: PointSet,
    #[serde(default)]
    pub sides: PointSet,
    #[serde(default)]
    pub ground: PointSet,
    #[serde(default)]
    pub ground_context: PointSet,
    #[serde(default)]
    pub foliage_context: PointSet,
}

impl LabeledPointSets {
    pub fn get(&self, role: PointSetRole) -> &PointSet {
        match role {
            PointSetRole::Top => &self.top,
            PointSetRole::Sides => &self.sides,
            PointSetRole::Ground => &self.ground,
            PointSetRole::GroundContext => &self.ground_context,
            PointSetRole::FoliageContext => &self.foliage_context,
        }
    }

    pub fn get_mut(&mut self, role: PointSetRole) -> &mut PointSet {
        match role {
            PointSetRole::Top => &mut self.top,
            PointSetRole::Sides => &mut self.sides,
            PointSetRole::Ground => &mut self.ground,
            PointSetRole::GroundContext => &mut self.ground_context,
            PointSetRole::FoliageContext => &mut self.foliage_context,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (PointSetRole, &PointSet)> {
        PointSetRole::ALL.into_iter().map(|role| (role, self.get(role)))
    }

    pub fn total_points(&self) -> usize {
        self.iter().map(|(_, set)| set.len()).sum()
    }

    /// `top` followed by `sides`.
    pub fn primary(&self) -> PointSet {
        PointSet::concat([&self.top, &self.sides])
    }

    /// Labeled `ground` followed by `ground_context`.
    pub fn combined_ground(&self) -> PointSet {
        PointSet::concat([&self.ground, &self.ground_context])
    }

    /// Copy of the sets with every context point that duplicates a labeled
    /// point (exact XYZ) removed.
    pub fn dedupe_context(&self) -> LabeledPointSets {
        let labeled = [&self.top, &self.sides, &self.ground];
        LabeledPointSets {
            top: self.top.clone(),
            sides: self.sides.clone(),
            ground: self.ground.clone(),
            ground_context: self.ground_context.without_points_in(labeled),
            foliage_context: self
                .foliage_context
                .without_points_in(labeled.into_iter().chain([&self.ground_context])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointcloud::point::Point4D;

    #[test]
    fn role_names_round_trip() {
        for role in PointSetRole::ALL {
            assert_eq!(role.as_str().parse::<PointSetRole>().unwrap(), role);
        }
        assert!("roof".parse::<PointSetRole>().is_err());
    }

    #[test]
    fn primary_concatenates_top_then_sides() {
        let sets = LabeledPointSets {
            top: vec![Point4D::new(0.0, 0.0, 5.0, 10.0)].into(),
            sides: vec![
                Point4D::new(1.0, 0.0, 2.0, 20.0),
                Point4D::new(2.0, 0.0, 1.0, 30.0),
            ]
            .into(),
            ..Default::default()
        };
        let primary = sets.primary();
        assert_eq!(primary.len(), 3);
        assert_eq!(primary.intensities(), vec![10.0, 20.0, 30.0]);
        assert_eq!(sets.total_points(), 3);
    }

    #[test]
    fn dedupe_context_removes_labeled_duplicates() {
        let shared = Point4D::new(1.0, 1.0, 0.0, 5.0);
        let sets = LabeledPointSets {
            ground: vec![shared].into(),
            ground_context: vec![shared, Point4D::new(2.0, 2.0, 0.0, 5.0)].into(),
            foliage_context: vec![
                Point4D::new(2.0, 2.0, 0.0, 9.0),
                Point4D::new(3.0, 3.0, 4.0, 9.0),
            ]
            .into(),
            ..Default::default()
        };
        let deduped = sets.dedupe_context();
        assert_eq!(deduped.ground.len(), 1);
        assert_eq!(deduped.ground_context.len(), 1);
        assert_eq!(deduped.foliage_context.len(), 1);
        assert_eq!(deduped.foliage_context.points[0].xyz(), [3.0, 3.0, 4.0]);
        // the input is left untouched
        assert_eq!(sets.ground_context.len(), 2);
    }
}
