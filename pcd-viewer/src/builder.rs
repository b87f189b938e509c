use pcd_core::ViewerConfig;
use pcd_spatial::{CovarianceEigen, LocalEigenProvider};

use crate::assembler::SceneAssembler;

/// Configures a [`SceneAssembler`]. Planarity uses [`CovarianceEigen`]
/// unless another provider is given or the channel is disabled.
pub struct SceneAssemblerBuilder {
    config: ViewerConfig,
    eigen: Option<Box<dyn LocalEigenProvider>>,
}

impl Default for SceneAssemblerBuilder {
    fn default() -> Self {
        Self {
            config: ViewerConfig::default(),
            eigen: Some(Box::new(CovarianceEigen)),
        }
    }
}

impl SceneAssemblerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: ViewerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn eigen_provider(mut self, provider: impl LocalEigenProvider + 'static) -> Self {
        self.eigen = Some(Box::new(provider));
        self
    }

    pub fn without_planarity(mut self) -> Self {
        self.eigen = None;
        self
    }

    pub fn build(self) -> SceneAssembler {
        SceneAssembler::new(self.config, self.eigen)
    }
}
