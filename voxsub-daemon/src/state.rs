use std::path::PathBuf;
use std::sync::Arc;
use voxsub_core::{CommandRunner, Pipeline, ServiceConfig, Synthesizer};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(
        config: ServiceConfig,
        synthesizer: Arc<dyn Synthesizer>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            pipeline: Arc::new(Pipeline::new(config, synthesizer, runner)),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        self.pipeline.config()
    }

    pub fn upload_root(&self) -> PathBuf {
        self.config().storage.upload_root.clone()
    }

    pub fn output_root(&self) -> PathBuf {
        self.config().storage.output_root.clone()
    }
}
