pub mod alpha;
pub mod assembler;
pub mod builder;
pub mod camera;
pub mod densify;
pub mod hag;
pub mod runner;
pub mod scale_figure;
mod stats;

pub use assembler::SceneAssembler;
pub use builder::SceneAssemblerBuilder;
pub use runner::{BatchRunner, Runner, SceneInput, SceneOutput};
