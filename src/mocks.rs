use image::RgbImage;

use crate::segmenter::Segmenter;

/// Test double for the segmentation seam: zeroes a fixed border and keeps
/// the interior, standing in for the (slow) graph-cut segmenter in pipeline
/// tests. A zero border width makes it the identity.
#[derive(Clone, Copy, Debug)]
pub struct MockSegmenter {
    pub border: u32,
}

impl MockSegmenter {
    pub const fn new(border: u32) -> Self {
        Self { border }
    }

    /// Identity segmenter: every pixel is foreground.
    pub const fn passthrough() -> Self {
        Self::new(0)
    }
}

impl Segmenter for MockSegmenter {
    fn segment(&self, image: &RgbImage, _tolerance: f32) -> RgbImage {
        let (width, height) = image.dimensions();
        let mut output = image.clone();
        for (x, y, pixel) in output.enumerate_pixels_mut() {
            let in_border = x < self.border
                || y < self.border
                || x >= width.saturating_sub(self.border)
                || y >= height.saturating_sub(self.border);
            if in_border {
                pixel.0 = [0, 0, 0];
            }
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn passthrough_keeps_every_pixel() {
        let image = RgbImage::from_pixel(10, 10, Rgb([1, 2, 3]));
        let result = MockSegmenter::passthrough().segment(&image, 0.5);
        assert_eq!(result.as_raw(), image.as_raw());
    }

    #[test]
    fn border_is_zeroed() {
        let image = RgbImage::from_pixel(10, 10, Rgb([50, 60, 70]));
        let result = MockSegmenter::new(2).segment(&image, 0.5);
        assert_eq!(result.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(result.get_pixel(9, 9).0, [0, 0, 0]);
        assert_eq!(result.get_pixel(5, 5).0, [50, 60, 70]);
    }
}
