mod error;
pub mod parsers;
pub mod reader;

pub use error::ParseError;
pub use parsers::{scene_dir::SceneDirParser, Parser, SceneBundle};
pub use reader::{csv::CsvPointReader, read_point_set, PointReader};
