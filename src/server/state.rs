use std::sync::Arc;
use tokio::sync::Mutex;

use crate::artifacts::ArtifactStore;
use crate::pipeline::Pipeline;

pub struct AppState {
    pipeline: Arc<Pipeline>,
    // Every run writes the same two artifact files, so runs must not overlap.
    // The guard moves into the blocking task and outlives a dropped request.
    run_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self {
            pipeline,
            run_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn pipeline(&self) -> Arc<Pipeline> {
        self.pipeline.clone()
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        self.pipeline.artifacts()
    }

    pub fn run_lock(&self) -> Arc<Mutex<()>> {
        self.run_lock.clone()
    }
}
