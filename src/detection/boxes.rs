use ndarray::{ArrayViewD, IxDyn};
use serde::{Deserialize, Serialize};

use super::letterbox::Letterbox;

/// One detected object in source image pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub confidence: f32,
    pub class_id: usize,
}

impl Detection {
    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Intersection over union with another box
    pub fn iou(&self, other: &Detection) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);

        let intersection = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            0.0
        } else {
            intersection / union
        }
    }
}

/// Axis order of the detection head output.
///
/// The shape alone cannot tell the two apart (`[1, 6, 8]` is valid either
/// way), so the layout comes from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputLayout {
    /// `[1, 4 + classes, anchors]`, the usual YOLO export
    #[default]
    ChannelsFirst,
    /// `[1, anchors, 4 + classes]`
    AnchorsFirst,
}

/// Decode a YOLO head output into boxes above `confidence_threshold`.
///
/// Each anchor is `cx, cy, w, h` in model input pixels followed by
/// per-class scores. Boxes are clipped to the source image.
pub fn decode_predictions(
    output: ArrayViewD<f32>,
    layout: OutputLayout,
    confidence_threshold: f32,
    geometry: &Letterbox,
    source_width: u32,
    source_height: u32,
) -> Result<Vec<Detection>, String> {
    let shape = output.shape();
    if shape.len() != 3 || shape[0] != 1 {
        return Err(format!("unexpected output shape {:?}", shape));
    }

    let channels_first = layout == OutputLayout::ChannelsFirst;
    let (attributes, anchors) = if channels_first {
        (shape[1], shape[2])
    } else {
        (shape[2], shape[1])
    };
    if attributes < 5 {
        return Err(format!("output has no class scores: {:?}", shape));
    }

    let value = |attr: usize, anchor: usize| {
        if channels_first {
            output[IxDyn(&[0, attr, anchor])]
        } else {
            output[IxDyn(&[0, anchor, attr])]
        }
    };

    let max_x = source_width as f32;
    let max_y = source_height as f32;
    let mut detections = Vec::new();

    for anchor in 0..anchors {
        let (class_id, confidence) = (4..attributes)
            .map(|attr| (attr - 4, value(attr, anchor)))
            .fold((0, f32::MIN), |best, candidate| {
                if candidate.1 > best.1 {
                    candidate
                } else {
                    best
                }
            });

        if confidence < confidence_threshold {
            continue;
        }

        let cx = value(0, anchor);
        let cy = value(1, anchor);
        let w = value(2, anchor);
        let h = value(3, anchor);

        let (x1, y1) = geometry.to_source(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = geometry.to_source(cx + w / 2.0, cy + h / 2.0);

        let detection = Detection {
            x1: x1.clamp(0.0, max_x),
            y1: y1.clamp(0.0, max_y),
            x2: x2.clamp(0.0, max_x),
            y2: y2.clamp(0.0, max_y),
            confidence,
            class_id,
        };
        if detection.area() > 0.0 {
            detections.push(detection);
        }
    }

    Ok(detections)
}

/// Greedy per-class non-maximum suppression, highest confidence first.
pub fn non_max_suppression(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<Detection> = Vec::new();
    for candidate in detections {
        let suppressed = kept
            .iter()
            .any(|k| k.class_id == candidate.class_id && k.iou(&candidate) > iou_threshold);
        if !suppressed {
            kept.push(candidate);
        }
    }

    kept
}
