//! Minimal egui shell: folder pickers, tolerance slider, progress bar.
//!
//! One background thread runs the batch per click; it hands progress and
//! completion back over an mpsc channel which `update` drains, so the worker
//! never touches UI state directly. The start button is re-enabled on both
//! completion and failure, and a batch-level failure is shown as a visible
//! error instead of leaving the window stuck in "Processing...".

use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::thread;

use eframe::egui;

use bgcut::progress::event_channel;
use bgcut::{BatchConfig, BatchRunner, BatchSummary, GrabCutSegmenter, WorkerEvent};

pub fn run() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([420.0, 300.0])
            .with_title("Background Remover"),
        ..Default::default()
    };

    eframe::run_native(
        "bgcut",
        options,
        Box::new(|_cc| Ok(Box::new(BgcutApp::default()))),
    )
}

enum Status {
    Idle,
    Running,
    Done(BatchSummary),
    Failed(String),
}

struct BgcutApp {
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    /// Slider scale, 0-100; divided by 100 when a run starts.
    tolerance: u8,
    progress: f32,
    status: Status,
    worker: Option<Receiver<WorkerEvent>>,
}

impl Default for BgcutApp {
    fn default() -> Self {
        Self {
            input_dir: None,
            output_dir: None,
            tolerance: 50,
            progress: 0.0,
            status: Status::Idle,
            worker: None,
        }
    }
}

impl eframe::App for BgcutApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_worker_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Background Remover");
            ui.separator();

            folder_row(ui, "Input folder:", &mut self.input_dir);
            folder_row(ui, "Output folder:", &mut self.output_dir);

            ui.add_space(8.0);
            ui.add(egui::Slider::new(&mut self.tolerance, 0..=100).text("Tolerance"));

            ui.add_space(8.0);
            let ready = self.worker.is_none()
                && self.input_dir.is_some()
                && self.output_dir.is_some();
            if ui
                .add_enabled(ready, egui::Button::new("Start Processing"))
                .clicked()
            {
                self.start_batch(ctx);
            }

            ui.add_space(8.0);
            match &self.status {
                Status::Idle => {
                    ui.label("Pick an input and output folder, then start.");
                }
                Status::Running => {
                    ui.label("Processing...");
                }
                Status::Done(summary) => {
                    ui.label(format!(
                        "Processing complete: {} of {} images ({} skipped)",
                        summary.processed, summary.total, summary.skipped
                    ));
                }
                Status::Failed(message) => {
                    ui.colored_label(egui::Color32::RED, format!("Batch failed: {message}"));
                }
            }

            ui.add(egui::ProgressBar::new(self.progress / 100.0).show_percentage());
        });
    }
}

impl BgcutApp {
    fn drain_worker_events(&mut self) {
        let mut finished = false;
        if let Some(receiver) = &self.worker {
            while let Ok(event) = receiver.try_recv() {
                match event {
                    WorkerEvent::Progress(percent) => self.progress = percent,
                    WorkerEvent::Finished(summary) => {
                        self.progress = 100.0;
                        self.status = Status::Done(summary);
                        finished = true;
                    }
                    WorkerEvent::Failed(message) => {
                        self.status = Status::Failed(message);
                        finished = true;
                    }
                }
            }
        }
        if finished {
            self.worker = None;
        }
    }

    fn start_batch(&mut self, ctx: &egui::Context) {
        let (Some(input_dir), Some(output_dir)) = (&self.input_dir, &self.output_dir) else {
            return;
        };
        let config =
            BatchConfig::from_slider(input_dir.clone(), output_dir.clone(), self.tolerance);

        let (sender, receiver) = event_channel();
        let repaint_ctx = ctx.clone();
        thread::spawn(move || {
            let runner = BatchRunner::new(GrabCutSegmenter, config);
            let result = runner.run(|percent| {
                let _ = sender.send(WorkerEvent::Progress(percent));
                repaint_ctx.request_repaint();
            });
            let _ = sender.send(match result {
                Ok(summary) => WorkerEvent::Finished(summary),
                Err(error) => WorkerEvent::Failed(error.to_string()),
            });
            repaint_ctx.request_repaint();
        });

        self.worker = Some(receiver);
        self.progress = 0.0;
        self.status = Status::Running;
    }
}

fn folder_row(ui: &mut egui::Ui, label: &str, slot: &mut Option<PathBuf>) {
    ui.horizontal(|ui| {
        ui.label(label);
        match slot {
            Some(path) => ui.monospace(path.display().to_string()),
            None => ui.weak("not selected"),
        };
        if ui.button("Browse").clicked() {
            if let Some(path) = rfd::FileDialog::new().pick_folder() {
                *slot = Some(path);
            }
        }
    });
}
