use std::{fs::File, path::{Path, PathBuf}};

use csv::{ReaderBuilder, StringRecord};
use pcd_core::{Point4D, UNKNOWN_INTENSITY};

use super::PointReader;
use crate::error::ParseError;

/// Column positions of the recognized attributes.
#[derive(Debug, Clone, PartialEq)]
struct FieldMapping {
    x: usize,
    y: usize,
    z: usize,
    intensity: Option<usize>,
}

impl FieldMapping {
    /// `x, y, z[, intensity]` in that order.
    fn positional(width: usize) -> Self {
        Self {
            x: 0,
            y: 1,
            z: 2,
            intensity: (width > 3).then_some(3),
        }
    }

    fn from_headers(headers: &StringRecord, path: &Path) -> Result<Self, ParseError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().to_lowercase().replace(['_', '-'], "") == name)
        };
        let required = |column: &'static str| {
            find(column).ok_or_else(|| ParseError::MissingColumn {
                path: path.to_path_buf(),
                column,
            })
        };

        Ok(Self {
            x: required("x")?,
            y: required("y")?,
            z: required("z")?,
            intensity: find("intensity"),
        })
    }
}

fn is_numeric_row(record: &StringRecord) -> bool {
    !record.is_empty() && record.iter().all(|field| field.trim().parse::<f64>().is_ok())
}

/// Reads `x, y, z[, intensity]` points from one CSV file.
///
/// A header row is optional: when the first row is entirely numeric the
/// columns are taken positionally. A missing or empty intensity becomes
/// [`UNKNOWN_INTENSITY`].
pub struct CsvPointReader {
    path: PathBuf,
    reader: csv::Reader<File>,
    field_mapping: FieldMapping,
    pending: Option<StringRecord>,
}

impl CsvPointReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref().to_path_buf();
        let csv_error = |source| ParseError::Csv {
            path: path.clone(),
            source,
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_path(&path)
            .map_err(csv_error)?;

        let mut first = StringRecord::new();
        let has_rows = reader.read_record(&mut first).map_err(csv_error)?;

        let (field_mapping, pending) = if !has_rows {
            (FieldMapping::positional(3), None)
        } else if is_numeric_row(&first) {
            (FieldMapping::positional(first.len()), Some(first))
        } else {
            (FieldMapping::from_headers(&first, &path)?, None)
        };
        log::debug!("{}: column mapping {:?}", path.display(), field_mapping);

        Ok(Self {
            path,
            reader,
            field_mapping,
            pending,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse_point(&self, record: &StringRecord) -> Result<Point4D, ParseError> {
        let line = record.position().map_or(0, |p| p.line());
        let number = |index: Option<usize>, column: &'static str| -> Result<Option<f64>, ParseError> {
            match index.and_then(|i| record.get(i)).map(str::trim) {
                None | Some("") => Ok(None),
                Some(value) => value.parse().map(Some).map_err(|_| ParseError::InvalidNumber {
                    path: self.path.clone(),
                    line,
                    column,
                    value: value.to_string(),
                }),
            }
        };
        let required = |index: usize, column: &'static str| {
            number(Some(index), column)?.ok_or_else(|| ParseError::InvalidNumber {
                path: self.path.clone(),
                line,
                column,
                value: String::new(),
            })
        };

        let mapping = &self.field_mapping;
        Ok(Point4D::new(
            required(mapping.x, "x")?,
            required(mapping.y, "y")?,
            required(mapping.z, "z")?,
            number(mapping.intensity, "intensity")?.unwrap_or(UNKNOWN_INTENSITY),
        ))
    }
}

impl PointReader for CsvPointReader {
    fn next_point(&mut self) -> Result<Option<Point4D>, ParseError> {
        if let Some(record) = self.pending.take() {
            return self.parse_point(&record).map(Some);
        }

        let mut record = StringRecord::new();
        match self.reader.read_record(&mut record) {
            Ok(true) => self.parse_point(&record).map(Some),
            Ok(false) => Ok(None),
            Err(source) => Err(ParseError::Csv {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
