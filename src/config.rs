use std::path::PathBuf;

use crate::errors::{BgcutError, Result};

/// Settings for one batch run.
///
/// `tolerance` is the user-facing scalar in `[0.0, 1.0]`. Despite the name it
/// does not control looseness of the cutout: it is mapped to the graph-cut
/// iteration count (see [`crate::segmenter::iterations_for_tolerance`]), so
/// higher values mean more refinement passes. The naming is kept from the
/// product surface (a 0-100 slider) rather than reinterpreted.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub tolerance: f32,
}

impl BatchConfig {
    pub fn new(input_dir: PathBuf, output_dir: PathBuf, tolerance: f32) -> Self {
        Self {
            input_dir,
            output_dir,
            tolerance,
        }
    }

    /// Build a config from the slider scale (integer 0-100).
    pub fn from_slider(input_dir: PathBuf, output_dir: PathBuf, tolerance_percent: u8) -> Self {
        Self::new(input_dir, output_dir, f32::from(tolerance_percent) / 100.0)
    }

    /// Check that the input directory exists before starting a run.
    ///
    /// The output directory is not required to exist; the batch runner
    /// creates it.
    pub fn validate(&self) -> Result<()> {
        if !self.input_dir.is_dir() {
            return Err(BgcutError::Configuration {
                message: format!(
                    "input directory does not exist: {}",
                    self.input_dir.display()
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slider_scale_maps_to_unit_interval() {
        let config = BatchConfig::from_slider("in".into(), "out".into(), 50);
        assert!((config.tolerance - 0.5).abs() < f32::EPSILON);

        let config = BatchConfig::from_slider("in".into(), "out".into(), 100);
        assert!((config.tolerance - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn missing_input_dir_fails_validation() {
        let config = BatchConfig::new("/nonexistent/bgcut-input".into(), "out".into(), 0.5);
        assert!(config.validate().is_err());
    }
}
