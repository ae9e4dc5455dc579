//! In-process stand-ins for the remote collaborators.

use image::{DynamicImage, GrayImage, Luma};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use crate::artifacts::{write_png, ArtifactStore};
use crate::catalog::{CatalogRow, CatalogService};
use crate::config::ArtifactConfig;
use crate::coordinates::Coordinates;
use crate::description::ChatService;
use crate::detection::ObjectDetector;
use crate::error::{PipelineError, PipelineResult};
use crate::imaging::{CutoutParams, CutoutPayload, ImagingService};
use crate::pipeline::Pipeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Imaging,
    Catalog,
    Detection,
    Chat,
}

type CallLog = Arc<Mutex<Vec<Stage>>>;

/// Counts runs between the imaging call and the chat call.
#[derive(Default)]
struct RunTracker {
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl RunTracker {
    fn start(&self) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn finish(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

struct FakeImaging {
    calls: CallLog,
    runs: Arc<RunTracker>,
    empty: bool,
}

impl ImagingService for FakeImaging {
    fn fetch_cutout(
        &self,
        _coords: Coordinates,
        _params: &CutoutParams,
    ) -> PipelineResult<Option<CutoutPayload>> {
        self.calls.lock().unwrap().push(Stage::Imaging);
        self.runs.start();
        if self.empty {
            self.runs.finish();
            return Ok(None);
        }
        let gray = GrayImage::from_pixel(16, 16, Luma([40]));
        Ok(Some(CutoutPayload::Raster(DynamicImage::ImageLuma8(gray))))
    }
}

struct FakeCatalog {
    calls: CallLog,
    rows: Option<Vec<CatalogRow>>,
}

impl CatalogService for FakeCatalog {
    fn query_region(
        &self,
        _coords: Coordinates,
        _radius_deg: f64,
    ) -> PipelineResult<Vec<CatalogRow>> {
        self.calls.lock().unwrap().push(Stage::Catalog);
        self.rows
            .clone()
            .ok_or_else(|| PipelineError::Catalog("service unavailable".to_string()))
    }
}

struct FakeDetector {
    calls: CallLog,
    busy: Arc<AtomicBool>,
    delay: Option<Duration>,
    fail: bool,
}

impl ObjectDetector for FakeDetector {
    fn annotate(&self, input: &Path, output: &Path) -> PipelineResult<PathBuf> {
        self.calls.lock().unwrap().push(Stage::Detection);
        if self.fail {
            return Err(PipelineError::Detection("model crashed".to_string()));
        }

        self.busy.store(true, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        let image = image::open(input)
            .map_err(|e| PipelineError::Detection(e.to_string()))?
            .to_rgb8();
        let written = write_png(&image, output);
        self.busy.store(false, Ordering::SeqCst);

        written?;
        Ok(output.to_path_buf())
    }
}

struct FakeChat {
    calls: CallLog,
    runs: Arc<RunTracker>,
    last_prompt: Arc<Mutex<Option<String>>>,
    fail: bool,
}

impl ChatService for FakeChat {
    fn complete(&self, prompt: &str, image_data_url: &str) -> PipelineResult<String> {
        self.calls.lock().unwrap().push(Stage::Chat);
        assert!(image_data_url.starts_with("data:image/png;base64,"));
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        self.runs.finish();
        if self.fail {
            return Err(PipelineError::Description("rate limited".to_string()));
        }
        Ok("Five galaxies, one of them a foreground interloper.".to_string())
    }
}

/// A configurable set of fakes sharing one call log and a temp artifact dir.
pub struct FakeWorld {
    dir: TempDir,
    calls: CallLog,
    runs: Arc<RunTracker>,
    detector_busy: Arc<AtomicBool>,
    last_prompt: Arc<Mutex<Option<String>>>,
    empty_imaging: bool,
    catalog_rows: Option<Vec<CatalogRow>>,
    detector_delay: Option<Duration>,
    failing_detector: bool,
    failing_chat: bool,
}

impl Default for FakeWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeWorld {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("temp dir"),
            calls: Arc::new(Mutex::new(Vec::new())),
            runs: Arc::new(RunTracker::default()),
            detector_busy: Arc::new(AtomicBool::new(false)),
            last_prompt: Arc::new(Mutex::new(None)),
            empty_imaging: false,
            catalog_rows: Some(vec![CatalogRow::new("NGC 7317", "G")]),
            detector_delay: None,
            failing_detector: false,
            failing_chat: false,
        }
    }

    pub fn with_empty_imaging(mut self) -> Self {
        self.empty_imaging = true;
        self
    }

    pub fn with_catalog(mut self, rows: Vec<CatalogRow>) -> Self {
        self.catalog_rows = Some(rows);
        self
    }

    pub fn with_failing_catalog(mut self) -> Self {
        self.catalog_rows = None;
        self
    }

    /// Detector that holds the run for `delay` before writing its output.
    pub fn with_slow_detector(mut self, delay: Duration) -> Self {
        self.detector_delay = Some(delay);
        self
    }

    pub fn with_failing_detector(mut self) -> Self {
        self.failing_detector = true;
        self
    }

    pub fn with_failing_chat(mut self) -> Self {
        self.failing_chat = true;
        self
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(
            Box::new(FakeImaging {
                calls: self.calls.clone(),
                runs: self.runs.clone(),
                empty: self.empty_imaging,
            }),
            Box::new(FakeCatalog {
                calls: self.calls.clone(),
                rows: self.catalog_rows.clone(),
            }),
            Box::new(FakeDetector {
                calls: self.calls.clone(),
                busy: self.detector_busy.clone(),
                delay: self.detector_delay,
                fail: self.failing_detector,
            }),
            Box::new(FakeChat {
                calls: self.calls.clone(),
                runs: self.runs.clone(),
                last_prompt: self.last_prompt.clone(),
                fail: self.failing_chat,
            }),
            ArtifactStore::new(&ArtifactConfig {
                dir: self.dir.path().join("artifacts"),
                ..Default::default()
            }),
        )
    }

    pub fn calls(&self) -> Vec<Stage> {
        self.calls.lock().unwrap().clone()
    }

    /// Most runs that were ever between imaging and chat at the same time.
    pub fn peak_concurrent_runs(&self) -> usize {
        self.runs.peak.load(Ordering::SeqCst)
    }

    pub fn detector_busy(&self) -> bool {
        self.detector_busy.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}
