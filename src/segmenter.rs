use std::path::Path;

use image::RgbImage;

use crate::grabcut::{self, Mask, Rect};

/// Seed rectangle inset from every image edge, in pixels. Assumes the
/// subject is centered and at least `2 * SEED_MARGIN` smaller than the frame
/// in both dimensions; images that violate this get an all-background
/// result, not a panic.
pub const SEED_MARGIN: u32 = 10;

/// How many graph-cut refinement rounds a tolerance value buys:
/// `floor(tolerance * 20)`. "Tolerance" is a historical misnomer from the
/// product surface; the value scales convergence, not cutout looseness.
/// 0.0 maps to 0 iterations (the raw seed rectangle), 1.0 to 20.
pub fn iterations_for_tolerance(tolerance: f32) -> u32 {
    (f64::from(tolerance) * 20.0).floor() as u32
}

/// Foreground estimation seam. The batch runner depends only on this trait,
/// never on the graph-cut calling convention.
pub trait Segmenter: Send + Sync {
    /// Produce an image of identical dimensions with background pixels set
    /// to zero and foreground pixels unchanged. Never fails for a decoded
    /// image.
    fn segment(&self, image: &RgbImage, tolerance: f32) -> RgbImage;

    /// Decode `path` and segment it. An undecodable file is an absent
    /// result, which callers must treat as "skip this file".
    fn segment_file(&self, path: &Path, tolerance: f32) -> Option<RgbImage> {
        match image::open(path) {
            Ok(decoded) => Some(self.segment(&decoded.into_rgb8(), tolerance)),
            Err(error) => {
                tracing::debug!(path = %path.display(), %error, "decode failed");
                None
            }
        }
    }
}

/// Production segmenter: rectangle-seeded GrabCut with the tolerance-derived
/// iteration count.
#[derive(Clone, Copy, Debug, Default)]
pub struct GrabCutSegmenter;

impl Segmenter for GrabCutSegmenter {
    fn segment(&self, image: &RgbImage, tolerance: f32) -> RgbImage {
        let (width, height) = image.dimensions();
        let mask = match Rect::inset(width, height, SEED_MARGIN) {
            Some(rect) => grabcut::grab_cut(image, rect, iterations_for_tolerance(tolerance)),
            None => Mask::all_background(width, height),
        };
        apply_keep_mask(image, &mask)
    }
}

/// Collapse the four-state mask to binary and zero out background pixels.
/// The mask must cover the image exactly.
fn apply_keep_mask(image: &RgbImage, mask: &Mask) -> RgbImage {
    debug_assert_eq!((mask.width(), mask.height()), image.dimensions());
    let mut output = image.clone();
    for (x, y, pixel) in output.enumerate_pixels_mut() {
        if !mask.is_foreground(x, y) {
            pixel.0 = [0, 0, 0];
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn tolerance_maps_to_iteration_count() {
        assert_eq!(iterations_for_tolerance(0.0), 0);
        assert_eq!(iterations_for_tolerance(0.5), 10);
        assert_eq!(iterations_for_tolerance(1.0), 20);
    }

    #[test]
    fn segment_preserves_dimensions() {
        let image = RgbImage::from_pixel(45, 33, Rgb([70, 140, 210]));
        let result = GrabCutSegmenter.segment(&image, 0.1);
        assert_eq!(result.dimensions(), image.dimensions());
    }

    #[test]
    fn zero_tolerance_keeps_exactly_the_seed_rectangle() {
        let image = RgbImage::from_pixel(30, 30, Rgb([80, 90, 100]));
        let result = GrabCutSegmenter.segment(&image, 0.0);
        for (x, y, pixel) in result.enumerate_pixels() {
            let inside = (10..20).contains(&x) && (10..20).contains(&y);
            if inside {
                assert_eq!(pixel.0, [80, 90, 100], "pixel ({x}, {y})");
            } else {
                assert_eq!(pixel.0, [0, 0, 0], "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn undersized_image_becomes_all_background() {
        let image = RgbImage::from_pixel(15, 15, Rgb([200, 10, 10]));
        let result = GrabCutSegmenter.segment(&image, 0.8);
        assert!(result.pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn absent_result_for_unreadable_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not a jpeg").expect("write fixture");
        assert!(GrabCutSegmenter.segment_file(&path, 0.5).is_none());
    }
}
