mod error;
mod transformer;

pub use error::TransformError;
pub use transformer::ViewerTransformer;
