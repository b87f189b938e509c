pub mod eigen;
pub mod error;
pub mod index;
pub mod pca;

pub use eigen::{planarity, planarity_scores, CovarianceEigen, LocalEigenProvider};
pub use error::SpatialError;
pub use index::{KdIndex, Neighbor};
pub use pca::{principal_axes_2d, PrincipalAxes2};
