use image::RgbImage;

/// Composite a zero-background cutout onto an all-white canvas.
///
/// The historical formulation is two vector subtractions against a white
/// canvas, `white - (255 - foreground)`; for mask-derived input (background
/// exactly zero, foreground untouched) that is equivalent to "foreground
/// where non-zero, white elsewhere", which is what this computes directly.
/// Idempotent: compositing an already-composited image changes nothing,
/// since a white-background image contains no zero pixels. No parameters.
pub fn composite_on_white(foreground: &RgbImage) -> RgbImage {
    let mut output = foreground.clone();
    for pixel in output.pixels_mut() {
        if pixel.0 == [0, 0, 0] {
            pixel.0 = [255, 255, 255];
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn background_becomes_white_foreground_untouched() {
        let mut cutout = RgbImage::from_pixel(8, 8, Rgb([0, 0, 0]));
        cutout.put_pixel(3, 3, Rgb([120, 60, 30]));
        let result = composite_on_white(&cutout);
        assert_eq!(result.get_pixel(3, 3).0, [120, 60, 30]);
        assert_eq!(result.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(result.dimensions(), cutout.dimensions());
    }

    #[test]
    fn compositing_is_idempotent() {
        let mut cutout = RgbImage::from_pixel(12, 5, Rgb([0, 0, 0]));
        cutout.put_pixel(6, 2, Rgb([9, 200, 77]));
        cutout.put_pixel(7, 2, Rgb([255, 255, 255]));
        let once = composite_on_white(&cutout);
        let twice = composite_on_white(&once);
        assert_eq!(once.as_raw(), twice.as_raw());
    }
}
