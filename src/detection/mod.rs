//! Object labeling of the acquired cutout.
//!
//! The detector reads the raw artifact from disk and writes an annotated
//! copy next to it. `OnnxDetector` is the production implementation.

pub mod annotate;
pub mod boxes;
pub mod letterbox;
pub mod onnx;
pub mod text_render;

use std::path::{Path, PathBuf};
use tracing::info;

use crate::artifacts::ArtifactStore;
use crate::error::PipelineResult;

pub use boxes::Detection;
pub use onnx::OnnxDetector;

pub trait ObjectDetector: Send + Sync {
    /// Detect objects in the image at `input`, draw them onto a copy and
    /// write it to `output`. Returns the path of the annotated image.
    fn annotate(&self, input: &Path, output: &Path) -> PipelineResult<PathBuf>;
}

/// Label the raw artifact and return the annotated artifact's path.
pub fn label_image(
    detector: &dyn ObjectDetector,
    store: &ArtifactStore,
) -> PipelineResult<PathBuf> {
    let input = store.raw_path();
    let output = store.annotated_path();
    let annotated = detector.annotate(&input, &output)?;
    info!("Annotated image written to {}", annotated.display());
    Ok(annotated)
}
