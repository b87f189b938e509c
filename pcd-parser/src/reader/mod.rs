pub mod csv;

use pcd_core::{Point4D, PointSet};

use crate::error::ParseError;

pub trait PointReader {
    fn next_point(&mut self) -> Result<Option<Point4D>, ParseError>;
}

/// Drains `reader` into a point set.
pub fn read_point_set(reader: &mut dyn PointReader) -> Result<PointSet, ParseError> {
    let mut points = Vec::new();
    while let Some(point) = reader.next_point()? {
        points.push(point);
    }
    Ok(PointSet::new(points))
}
