use std::fs;
use std::path::Path;

use image::{ImageFormat, Rgb, RgbImage};
use tempfile::TempDir;

use bgcut::mocks::MockSegmenter;
use bgcut::{BatchConfig, BatchRunner};

fn write_jpeg(dir: &Path, name: &str, color: [u8; 3]) {
    let image = RgbImage::from_pixel(40, 40, Rgb(color));
    image
        .save_with_format(dir.join(name), ImageFormat::Jpeg)
        .expect("write fixture");
}

fn runner_for(input: &Path, output: &Path) -> BatchRunner<MockSegmenter> {
    let config = BatchConfig::new(input.to_path_buf(), output.to_path_buf(), 0.5);
    BatchRunner::new(MockSegmenter::passthrough(), config)
}

#[test]
fn only_jpg_suffixed_files_are_processed() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let input = temp.path().join("input");
    let output = temp.path().join("output");
    fs::create_dir(&input)?;

    write_jpeg(&input, "a.jpg", [200, 10, 10]);
    write_jpeg(&input, "b.JPG", [10, 200, 10]);
    let png = RgbImage::from_pixel(40, 40, Rgb([10, 10, 200]));
    png.save_with_format(input.join("c.png"), ImageFormat::Png)?;

    let summary = runner_for(&input, &output).run(|_| {})?;

    assert_eq!(summary.total, 2);
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.skipped, 0);
    assert!(output.join("a.jpg").exists());
    assert!(output.join("b.JPG").exists());
    assert!(!output.join("c.png").exists());
    Ok(())
}

#[test]
fn progress_sequence_for_four_files() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let input = temp.path().join("input");
    let output = temp.path().join("output");
    fs::create_dir(&input)?;

    for name in ["one.jpg", "two.jpg", "three.jpg", "four.jpg"] {
        write_jpeg(&input, name, [128, 128, 128]);
    }

    let mut reported = Vec::new();
    runner_for(&input, &output).run(|percent| reported.push(percent))?;

    assert_eq!(reported, vec![25.0, 50.0, 75.0, 100.0]);
    Ok(())
}

#[test]
fn zero_matching_files_completes_with_full_progress() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let input = temp.path().join("input");
    let output = temp.path().join("output");
    fs::create_dir(&input)?;
    fs::write(input.join("notes.txt"), "not an image")?;

    let mut reported = Vec::new();
    let summary = runner_for(&input, &output).run(|percent| reported.push(percent))?;

    assert_eq!(summary.total, 0);
    assert_eq!(reported, vec![100.0]);
    Ok(())
}

#[test]
fn corrupt_file_is_skipped_and_rest_are_written() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let input = temp.path().join("input");
    let output = temp.path().join("output");
    fs::create_dir(&input)?;

    write_jpeg(&input, "good_a.jpg", [90, 90, 90]);
    fs::write(input.join("broken.jpg"), b"this is not a jpeg")?;
    write_jpeg(&input, "good_b.jpg", [60, 60, 60]);

    let mut reported = Vec::new();
    let summary = runner_for(&input, &output).run(|percent| reported.push(percent))?;

    assert_eq!(summary.total, 3);
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.skipped, 1);
    assert!(output.join("good_a.jpg").exists());
    assert!(output.join("good_b.jpg").exists());
    assert!(!output.join("broken.jpg").exists());
    // The skip still advances progress.
    assert_eq!(reported.len(), 3);
    assert_eq!(reported.last(), Some(&100.0));
    Ok(())
}

#[test]
fn existing_output_files_are_overwritten() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let input = temp.path().join("input");
    let output = temp.path().join("output");
    fs::create_dir(&input)?;
    fs::create_dir(&output)?;

    write_jpeg(&input, "photo.jpg", [10, 220, 10]);
    fs::write(output.join("photo.jpg"), b"stale placeholder")?;

    runner_for(&input, &output).run(|_| {})?;

    let written = image::open(output.join("photo.jpg"))?;
    assert_eq!(written.into_rgb8().dimensions(), (40, 40));
    Ok(())
}

#[test]
fn output_directory_is_created_when_missing() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let input = temp.path().join("input");
    let output = temp.path().join("nested").join("output");
    fs::create_dir(&input)?;

    write_jpeg(&input, "photo.jpg", [77, 77, 77]);

    let summary = runner_for(&input, &output).run(|_| {})?;
    assert_eq!(summary.processed, 1);
    assert!(output.join("photo.jpg").exists());
    Ok(())
}

#[test]
fn missing_input_directory_is_a_configuration_error() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("does-not-exist");
    let output = temp.path().join("output");

    let result = runner_for(&input, &output).run(|_| {});
    assert!(result.is_err());
}

#[test]
fn files_are_processed_in_name_order() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let input = temp.path().join("input");
    let output = temp.path().join("output");
    fs::create_dir(&input)?;

    // Created out of order on purpose; the runner sorts by name.
    write_jpeg(&input, "c.jpg", [3, 3, 3]);
    write_jpeg(&input, "a.jpg", [1, 1, 1]);
    write_jpeg(&input, "b.jpg", [2, 2, 2]);

    let mut reported = Vec::new();
    runner_for(&input, &output).run(|percent| reported.push(percent))?;
    assert_eq!(reported.len(), 3);
    assert_eq!(reported.last(), Some(&100.0));
    assert!(reported.windows(2).all(|w| w[0] < w[1]));
    Ok(())
}
