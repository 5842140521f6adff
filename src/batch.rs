use std::fs;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use walkdir::WalkDir;

use crate::compositor::composite_on_white;
use crate::config::BatchConfig;
use crate::errors::{BgcutError, Result};
use crate::segmenter::Segmenter;

/// Outcome counts for one completed batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Eligible `.jpg` files found in the input directory.
    pub total: usize,
    /// Files segmented, composited and written.
    pub processed: usize,
    /// Files skipped because they failed to decode.
    pub skipped: usize,
}

/// Sequential driver over the eligible files of one input directory.
///
/// One file at a time: decode, segment, composite onto white, write to the
/// output directory under the identical file name (silently overwriting).
/// A file that fails to decode is skipped and the batch continues; any
/// write failure aborts the whole batch. After every file, success or skip,
/// the progress callback receives the completed percentage.
pub struct BatchRunner<S: Segmenter> {
    segmenter: S,
    config: BatchConfig,
}

impl<S: Segmenter> BatchRunner<S> {
    pub fn new(segmenter: S, config: BatchConfig) -> Self {
        Self { segmenter, config }
    }

    /// Run the batch to completion. With zero eligible files the runner
    /// reports 100% immediately and returns an empty summary instead of the
    /// historical division by zero.
    pub fn run<F>(&self, mut on_progress: F) -> Result<BatchSummary>
    where
        F: FnMut(f32),
    {
        self.config.validate()?;

        let files = collect_jpeg_files(&self.config.input_dir)?;
        let total = files.len();
        tracing::info!(
            total,
            input = %self.config.input_dir.display(),
            "starting batch"
        );

        if files.is_empty() {
            on_progress(100.0);
            return Ok(BatchSummary::default());
        }

        fs::create_dir_all(&self.config.output_dir).map_err(|e| BgcutError::FileSystem {
            path: self.config.output_dir.clone(),
            operation: "create output directory".to_string(),
            source: e,
        })?;

        let mut summary = BatchSummary {
            total,
            ..BatchSummary::default()
        };

        for (index, path) in files.iter().enumerate() {
            match self.segmenter.segment_file(path, self.config.tolerance) {
                Some(foreground) => {
                    let result = composite_on_white(&foreground);
                    let file_name = path
                        .file_name()
                        .ok_or_else(|| BgcutError::Configuration {
                            message: format!("input path has no file name: {}", path.display()),
                        })?;
                    let output_path = self.config.output_dir.join(file_name);
                    result
                        .save_with_format(&output_path, ImageFormat::Jpeg)
                        .map_err(|e| BgcutError::ImageProcessing {
                            path: output_path.display().to_string(),
                            operation: "write output image".to_string(),
                            source: Box::new(e),
                        })?;
                    summary.processed += 1;
                    tracing::info!(file = %path.display(), "processed");
                }
                None => {
                    summary.skipped += 1;
                    tracing::warn!(file = %path.display(), "skipping undecodable file");
                }
            }
            on_progress((index + 1) as f32 / total as f32 * 100.0);
        }

        tracing::info!(
            processed = summary.processed,
            skipped = summary.skipped,
            "batch complete"
        );
        Ok(summary)
    }

}

/// Regular files directly inside the input directory (non-recursive) whose
/// names end in `.jpg`, case-insensitively. `.jpeg` is not eligible. Sorted
/// by file name so run order is stable across platforms, unlike the raw
/// directory listing. A listing failure (for example an unreadable
/// directory) is fatal to the batch, never an empty result.
fn collect_jpeg_files(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(input_dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| BgcutError::FileSystem {
            path: input_dir.to_path_buf(),
            operation: "read input directory".to_string(),
            source: e.into_io_error().unwrap_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::Other, "directory walk failed")
            }),
        })?;
        if entry.file_type().is_file() && is_jpeg_name(&entry.file_name().to_string_lossy()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

fn is_jpeg_name(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".jpg")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jpg_suffix_check_is_case_insensitive() {
        assert!(is_jpeg_name("photo.jpg"));
        assert!(is_jpeg_name("PHOTO.JPG"));
        assert!(is_jpeg_name("mixed.Jpg"));
        assert!(!is_jpeg_name("photo.jpeg"));
        assert!(!is_jpeg_name("photo.png"));
        assert!(!is_jpeg_name("jpg"));
    }

    #[test]
    fn listing_failure_is_fatal_not_an_empty_batch() {
        // A directory that cannot be read must surface as a filesystem
        // error instead of silently producing zero eligible files.
        let temp = tempfile::tempdir().expect("tempdir");
        let vanished = temp.path().join("vanished");

        let result = collect_jpeg_files(&vanished);
        assert!(matches!(
            result,
            Err(BgcutError::FileSystem { ref operation, .. })
                if operation == "read input directory"
        ));
    }

    #[test]
    fn listing_succeeds_on_readable_directory() {
        let temp = tempfile::tempdir().expect("tempdir");
        std::fs::write(temp.path().join("a.jpg"), b"placeholder").expect("write fixture");
        std::fs::write(temp.path().join("b.txt"), b"placeholder").expect("write fixture");

        let files = collect_jpeg_files(temp.path()).expect("readable directory");
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("a.jpg"));
    }
}
