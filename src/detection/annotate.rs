use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use super::boxes::Detection;
use super::text_render::{draw_label, GLYPH_HEIGHT};

const LABEL_SCALE: u32 = 2;
const LABEL_BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);

/// Box colours cycled by class id
const PALETTE: [Rgb<u8>; 6] = [
    Rgb([255, 56, 56]),
    Rgb([255, 157, 151]),
    Rgb([255, 255, 0]),
    Rgb([0, 255, 255]),
    Rgb([255, 0, 255]),
    Rgb([72, 249, 10]),
];

pub fn class_color(class_id: usize) -> Rgb<u8> {
    PALETTE[class_id % PALETTE.len()]
}

pub fn class_name(class_names: &[String], class_id: usize) -> String {
    class_names
        .get(class_id)
        .cloned()
        .unwrap_or_else(|| format!("class {}", class_id))
}

/// Label drawn above a box, e.g. `GALAXY 0.87`.
pub fn detection_label(class_names: &[String], detection: &Detection) -> String {
    format!(
        "{} {:.2}",
        class_name(class_names, detection.class_id),
        detection.confidence
    )
    .to_uppercase()
}

/// Draw boxes and labels for every detection onto `image`.
pub fn draw_detections(image: &mut RgbImage, detections: &[Detection], class_names: &[String]) {
    for detection in detections {
        let color = class_color(detection.class_id);
        let x = detection.x1.round() as i32;
        let y = detection.y1.round() as i32;
        let width = detection.width().round().max(1.0) as u32;
        let height = detection.height().round().max(1.0) as u32;

        // Two nested outlines for a 2px border
        draw_hollow_rect_mut(image, Rect::at(x, y).of_size(width, height), color);
        if width > 2 && height > 2 {
            draw_hollow_rect_mut(
                image,
                Rect::at(x + 1, y + 1).of_size(width - 2, height - 2),
                color,
            );
        }

        // Above the box when there is room, otherwise just inside it
        let label_height = (GLYPH_HEIGHT + 2) * LABEL_SCALE;
        let label_y = if y >= label_height as i32 {
            (y - label_height as i32) as u32
        } else {
            y.max(0) as u32
        };
        draw_label(
            image,
            x.max(0) as u32,
            label_y,
            &detection_label(class_names, detection),
            color,
            LABEL_BACKGROUND,
            LABEL_SCALE,
        );
    }
}
