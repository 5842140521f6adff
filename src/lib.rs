//! Batch background removal: rectangle-seeded GrabCut segmentation of JPEG
//! images, composited onto a white canvas.
//!
//! The pipeline is two pieces, trivially composed: a [`Segmenter`] turns one
//! decoded image into a zero-background cutout, and a [`BatchRunner`] drives
//! it file by file over an input directory, writing white-composited results
//! and reporting fractional progress after each file. The GUI and headless
//! front ends in the binary are thin shells over these.

pub mod batch;
pub mod compositor;
pub mod config;
pub mod errors;
pub mod grabcut;
pub mod progress;
pub mod segmenter;

pub mod mocks;

pub use batch::{BatchRunner, BatchSummary};
pub use compositor::composite_on_white;
pub use config::BatchConfig;
pub use errors::{BgcutError, Result};
pub use progress::WorkerEvent;
pub use segmenter::{iterations_for_tolerance, GrabCutSegmenter, Segmenter};
