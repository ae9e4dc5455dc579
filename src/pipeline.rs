//! The coordinate-to-description pipeline.
//!
//! Stages run strictly in order: acquire the cutout, look up catalog
//! objects, label the image, describe it. Any stage failure aborts the run.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use crate::artifacts::ArtifactStore;
use crate::catalog::{lookup_objects, CatalogService, SimbadTap};
use crate::config::Config;
use crate::coordinates::{parse_coordinates, Coordinates};
use crate::description::{describe_image, ChatService, OpenAiChat};
use crate::detection::{label_image, ObjectDetector, OnnxDetector};
use crate::error::PipelineResult;
use crate::imaging::{acquire_image, ImagingService, SkyServerImaging};

/// Output of one successful run, handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct DescriptionResult {
    pub coordinates: Coordinates,
    pub annotated_image: PathBuf,
    pub description: String,
    /// Expanded catalog objects, e.g. `NGC 7317 Galaxy`
    pub objects: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// The four remote collaborators plus the artifact locations they share.
///
/// Built once at startup and reused read-only for every request.
pub struct Pipeline {
    imaging: Box<dyn ImagingService>,
    catalog: Box<dyn CatalogService>,
    detector: Box<dyn ObjectDetector>,
    chat: Box<dyn ChatService>,
    artifacts: ArtifactStore,
}

impl Pipeline {
    pub fn new(
        imaging: Box<dyn ImagingService>,
        catalog: Box<dyn CatalogService>,
        detector: Box<dyn ObjectDetector>,
        chat: Box<dyn ChatService>,
        artifacts: ArtifactStore,
    ) -> Self {
        Self {
            imaging,
            catalog,
            detector,
            chat,
            artifacts,
        }
    }

    /// Wire up the production collaborators from configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let imaging = SkyServerImaging::new(&config.imaging).context("Failed to set up imaging")?;
        let catalog = SimbadTap::new(&config.catalog).context("Failed to set up catalog")?;
        let detector = OnnxDetector::new(&config.detection).context("Failed to set up detector")?;
        let chat = OpenAiChat::new(&config.chat).context("Failed to set up chat client")?;

        Ok(Self::new(
            Box::new(imaging),
            Box::new(catalog),
            Box::new(detector),
            Box::new(chat),
            ArtifactStore::new(&config.artifacts),
        ))
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    /// Validate raw user input, then run the pipeline.
    ///
    /// Nothing downstream is contacted when validation fails.
    pub fn process_input(&self, ra: &str, dec: &str) -> PipelineResult<DescriptionResult> {
        let coords = parse_coordinates(ra, dec)?;
        self.process_coordinates(coords)
    }

    pub fn process_coordinates(&self, coords: Coordinates) -> PipelineResult<DescriptionResult> {
        info!("Processing {}", coords);

        acquire_image(self.imaging.as_ref(), coords, &self.artifacts)?;

        let objects: Vec<String> = lookup_objects(self.catalog.as_ref(), coords)?
            .iter()
            .map(|object| object.expanded())
            .collect();

        let annotated_image = label_image(self.detector.as_ref(), &self.artifacts)?;

        let description = describe_image(self.chat.as_ref(), &objects, &annotated_image)?;

        Ok(DescriptionResult {
            coordinates: coords,
            annotated_image,
            description,
            objects,
            generated_at: Utc::now(),
        })
    }
}
