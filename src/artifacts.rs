use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::config::ArtifactConfig;
use crate::error::PipelineResult;

/// Which of the two per-run images to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Raw,
    Annotated,
}

impl ArtifactKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "raw" => Some(ArtifactKind::Raw),
            "annotated" => Some(ArtifactKind::Annotated),
            _ => None,
        }
    }
}

/// The fixed on-disk locations shared by the acquisition, labeling and
/// description stages. Every run overwrites both files.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    raw_name: String,
    annotated_name: String,
}

impl ArtifactStore {
    pub fn new(config: &ArtifactConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            raw_name: config.raw_name.clone(),
            annotated_name: config.annotated_name.clone(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, kind: ArtifactKind) -> PathBuf {
        match kind {
            ArtifactKind::Raw => self.dir.join(&self.raw_name),
            ArtifactKind::Annotated => self.dir.join(&self.annotated_name),
        }
    }

    pub fn raw_path(&self) -> PathBuf {
        self.path(ArtifactKind::Raw)
    }

    pub fn annotated_path(&self) -> PathBuf {
        self.path(ArtifactKind::Annotated)
    }

    pub fn ensure_dir(&self) -> PipelineResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    pub fn exists(&self, kind: ArtifactKind) -> bool {
        self.path(kind).exists()
    }

    /// Seconds since the artifact was last written.
    pub fn age_secs(&self, kind: ArtifactKind) -> PipelineResult<u64> {
        let modified = std::fs::metadata(self.path(kind))?.modified()?;
        Ok(SystemTime::now()
            .duration_since(modified)
            .map(|d| d.as_secs())
            .unwrap_or(0))
    }
}

/// Write an RGB raster as PNG, replacing whatever was at `path`.
pub fn write_png(image: &RgbImage, path: &Path) -> PipelineResult<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);

    // Cutouts are large and rewritten every run, favour speed over size
    let encoder = PngEncoder::new_with_quality(writer, CompressionType::Fast, FilterType::Adaptive);
    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    Ok(())
}
