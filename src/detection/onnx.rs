//! YOLO-style detector running on ONNX Runtime.

use anyhow::Context;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

use super::annotate::draw_detections;
use super::boxes::{decode_predictions, non_max_suppression, Detection, OutputLayout};
use super::letterbox::{letterbox, to_tensor};
use super::ObjectDetector;
use crate::artifacts::write_png;
use crate::config::DetectionConfig;
use crate::error::{PipelineError, PipelineResult};

/// Pretrained detector loaded once at startup and reused for every run.
pub struct OnnxDetector {
    session: Mutex<Session>,
    input_name: String,
    input_size: u32,
    confidence_threshold: f32,
    iou_threshold: f32,
    output_layout: OutputLayout,
    class_names: Vec<String>,
}

impl std::fmt::Debug for OnnxDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxDetector")
            .field("input_name", &self.input_name)
            .field("input_size", &self.input_size)
            .field("confidence_threshold", &self.confidence_threshold)
            .field("iou_threshold", &self.iou_threshold)
            .field("output_layout", &self.output_layout)
            .field("classes", &self.class_names.len())
            .finish_non_exhaustive()
    }
}

impl OnnxDetector {
    pub fn new(config: &DetectionConfig) -> anyhow::Result<Self> {
        let model_path = &config.model_path;
        if !model_path.exists() {
            anyhow::bail!("Detection model not found: {}", model_path.display());
        }

        info!("Loading detection model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .with_context(|| {
                format!("Failed to load detection model from {}", model_path.display())
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());
        debug!("Detection model input: {}", input_name);

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            input_size: config.input_size,
            confidence_threshold: config.confidence_threshold,
            iou_threshold: config.iou_threshold,
            output_layout: config.output_layout,
            class_names: config.class_names.clone(),
        })
    }

    /// Run the model over an RGB raster, returning boxes in its pixel space.
    pub fn detect(&self, image: &image::RgbImage) -> PipelineResult<Vec<Detection>> {
        let (canvas, geometry) = letterbox(image, self.input_size);
        let tensor = to_tensor(&canvas);

        let mut session = self
            .session
            .lock()
            .map_err(|_| PipelineError::Detection("model session poisoned".to_string()))?;

        let input_value = Value::from_array(tensor).map_err(|e| {
            PipelineError::Detection(format!("failed to create input tensor: {}", e))
        })?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .map_err(|e| PipelineError::Detection(format!("inference failed: {}", e)))?;

        let output = outputs[0].try_extract_array::<f32>().map_err(|e| {
            PipelineError::Detection(format!("failed to read output tensor: {}", e))
        })?;
        debug!("Detection output shape: {:?}", output.shape());

        let candidates = decode_predictions(
            output.view(),
            self.output_layout,
            self.confidence_threshold,
            &geometry,
            image.width(),
            image.height(),
        )
        .map_err(PipelineError::Detection)?;

        Ok(non_max_suppression(candidates, self.iou_threshold))
    }
}

impl ObjectDetector for OnnxDetector {
    fn annotate(&self, input: &Path, output: &Path) -> PipelineResult<PathBuf> {
        let mut image = image::open(input)
            .map_err(|e| {
                PipelineError::Detection(format!("failed to load {}: {}", input.display(), e))
            })?
            .to_rgb8();

        let detections = self.detect(&image)?;
        info!("Detected {} objects", detections.len());

        draw_detections(&mut image, &detections, &self.class_names);
        write_png(&image, output)?;

        Ok(output.to_path_buf())
    }
}
