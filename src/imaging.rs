//! Survey cutout acquisition.
//!
//! The imaging service hands back either a decoded raster (grayscale or RGB)
//! or an encoded blob. Both are normalized to one RGB raster and written to
//! the raw artifact path, because the labeler works on files.

use anyhow::Context;
use image::{DynamicImage, RgbImage};
use std::time::Duration;
use tracing::{debug, info};

use crate::artifacts::{write_png, ArtifactStore};
use crate::config::ImagingConfig;
use crate::coordinates::Coordinates;
use crate::error::{PipelineError, PipelineResult};

/// Fixed cutout geometry requested for every run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutoutParams {
    pub width: u32,
    pub height: u32,
    /// Arcseconds per pixel
    pub scale: f64,
    pub data_release: &'static str,
}

pub const CUTOUT: CutoutParams = CutoutParams {
    width: 2000,
    height: 2000,
    scale: 0.3,
    data_release: "DR18",
};

/// What an imaging service may return for a cutout request.
#[derive(Debug, Clone)]
pub enum CutoutPayload {
    /// Already decoded; may be single-channel
    Raster(DynamicImage),
    /// Encoded image bytes (JPEG, PNG, ...)
    Encoded(Vec<u8>),
}

pub trait ImagingService: Send + Sync {
    /// `Ok(None)` means the service answered but had nothing to return.
    fn fetch_cutout(
        &self,
        coords: Coordinates,
        params: &CutoutParams,
    ) -> PipelineResult<Option<CutoutPayload>>;
}

/// Convert any payload into a 3-channel raster.
pub fn normalize_payload(payload: CutoutPayload) -> PipelineResult<RgbImage> {
    let image = match payload {
        CutoutPayload::Raster(image) => image,
        CutoutPayload::Encoded(bytes) => {
            if bytes.is_empty() {
                return Err(PipelineError::Acquisition("empty image data".to_string()));
            }
            image::load_from_memory(&bytes)
                .map_err(|e| PipelineError::Acquisition(format!("undecodable image: {}", e)))?
        }
    };

    if image.width() == 0 || image.height() == 0 {
        return Err(PipelineError::Acquisition("image has no pixels".to_string()));
    }

    Ok(image.to_rgb8())
}

/// Fetch the cutout for `coords`, normalize it and persist it as the raw artifact.
pub fn acquire_image(
    service: &dyn ImagingService,
    coords: Coordinates,
    store: &ArtifactStore,
) -> PipelineResult<RgbImage> {
    let payload = service
        .fetch_cutout(coords, &CUTOUT)?
        .ok_or_else(|| PipelineError::Acquisition("imaging service returned nothing".to_string()))?;

    let image = normalize_payload(payload)?;

    store.ensure_dir()?;
    let raw_path = store.raw_path();
    write_png(&image, &raw_path)?;

    info!(
        "Saved {}x{} cutout to {}",
        image.width(),
        image.height(),
        raw_path.display()
    );

    Ok(image)
}

/// SDSS SkyServer JPEG cutout service.
#[derive(Debug)]
pub struct SkyServerImaging {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl SkyServerImaging {
    pub fn new(config: &ImagingConfig) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn cutout_url(&self, params: &CutoutParams) -> String {
        format!(
            "{}/{}/SkyServerWS/ImgCutout/getjpeg",
            self.base_url, params.data_release
        )
    }
}

impl ImagingService for SkyServerImaging {
    fn fetch_cutout(
        &self,
        coords: Coordinates,
        params: &CutoutParams,
    ) -> PipelineResult<Option<CutoutPayload>> {
        let url = self.cutout_url(params);
        info!("Requesting {} cutout at {}", params.data_release, coords);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("ra", coords.ra.to_string()),
                ("dec", coords.dec.to_string()),
                ("scale", params.scale.to_string()),
                ("width", params.width.to_string()),
                ("height", params.height.to_string()),
            ])
            .send()
            .map_err(|e| PipelineError::Acquisition(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PipelineError::Acquisition(format!(
                "cutout service returned {} for {}",
                response.status(),
                url
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| PipelineError::Acquisition(e.to_string()))?;
        debug!("Cutout response: {} bytes", bytes.len());

        if bytes.is_empty() {
            return Ok(None);
        }

        Ok(Some(CutoutPayload::Encoded(bytes.to_vec())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArtifactConfig;
    use image::{GrayImage, Luma, Rgb};
    use std::io::Cursor;

    struct Canned(Option<CutoutPayload>);

    impl ImagingService for Canned {
        fn fetch_cutout(
            &self,
            _coords: Coordinates,
            _params: &CutoutParams,
        ) -> PipelineResult<Option<CutoutPayload>> {
            Ok(self.0.clone())
        }
    }

    fn encoded_png(image: DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_grayscale_raster_becomes_rgb() {
        let gray = GrayImage::from_pixel(3, 2, Luma([77]));
        let rgb = normalize_payload(CutoutPayload::Raster(DynamicImage::ImageLuma8(gray))).unwrap();
        assert_eq!(rgb.dimensions(), (3, 2));
        assert_eq!(rgb.get_pixel(2, 1), &Rgb([77, 77, 77]));
    }

    #[test]
    fn test_rgb_raster_unchanged() {
        let src = RgbImage::from_pixel(2, 2, Rgb([1, 2, 3]));
        let payload = CutoutPayload::Raster(DynamicImage::ImageRgb8(src.clone()));
        let rgb = normalize_payload(payload).unwrap();
        assert_eq!(rgb, src);
    }

    #[test]
    fn test_rgba_raster_drops_alpha() {
        let src = image::RgbaImage::from_pixel(2, 2, image::Rgba([9, 8, 7, 10]));
        let rgb = normalize_payload(CutoutPayload::Raster(DynamicImage::ImageRgba8(src))).unwrap();
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([9, 8, 7]));
    }

    #[test]
    fn test_encoded_bytes_decoded() {
        let gray = GrayImage::from_pixel(5, 4, Luma([200]));
        let bytes = encoded_png(DynamicImage::ImageLuma8(gray));
        let rgb = normalize_payload(CutoutPayload::Encoded(bytes)).unwrap();
        assert_eq!(rgb.dimensions(), (5, 4));
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([200, 200, 200]));
    }

    #[test]
    fn test_bad_payloads_fail_acquisition() {
        let empty = normalize_payload(CutoutPayload::Encoded(Vec::new())).unwrap_err();
        assert!(matches!(empty, PipelineError::Acquisition(_)));

        let garbage =
            normalize_payload(CutoutPayload::Encoded(b"not an image".to_vec())).unwrap_err();
        assert!(matches!(garbage, PipelineError::Acquisition(_)));

        let zero =
            normalize_payload(CutoutPayload::Raster(DynamicImage::new_rgb8(0, 0))).unwrap_err();
        assert!(matches!(zero, PipelineError::Acquisition(_)));
    }

    #[test]
    fn test_acquire_writes_raw_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(&ArtifactConfig {
            dir: dir.path().join("out"),
            ..Default::default()
        });
        let gray = GrayImage::from_pixel(8, 8, Luma([10]));
        let service = Canned(Some(CutoutPayload::Raster(DynamicImage::ImageLuma8(gray))));

        let image = acquire_image(&service, Coordinates::new(1.0, 2.0), &store).unwrap();
        assert_eq!(image.dimensions(), (8, 8));

        let saved = image::open(store.raw_path()).unwrap();
        assert_eq!(saved.color(), image::ColorType::Rgb8);
    }

    #[test]
    fn test_acquire_nothing_fails_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(&ArtifactConfig {
            dir: dir.path().to_path_buf(),
            ..Default::default()
        });

        let err = acquire_image(&Canned(None), Coordinates::new(1.0, 2.0), &store).unwrap_err();
        assert!(err.to_string().starts_with("failed to fetch image"));
        assert!(!store.raw_path().exists());
    }

    #[test]
    fn test_cutout_url() {
        let imaging = SkyServerImaging::new(&ImagingConfig {
            base_url: "https://skyserver.sdss.org/".to_string(),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(
            imaging.cutout_url(&CUTOUT),
            "https://skyserver.sdss.org/DR18/SkyServerWS/ImgCutout/getjpeg"
        );
    }

    #[test]
    #[ignore] // Requires network
    fn test_fetch_stephans_quintet() {
        let imaging = SkyServerImaging::new(&ImagingConfig::default()).unwrap();
        let payload = imaging
            .fetch_cutout(Coordinates::new(338.9896, 33.96), &CUTOUT)
            .unwrap()
            .expect("cutout");
        let rgb = normalize_payload(payload).unwrap();
        assert_eq!(rgb.dimensions(), (CUTOUT.width, CUTOUT.height));
    }
}
