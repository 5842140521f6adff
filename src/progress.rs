use std::sync::mpsc::{channel, Receiver, Sender};

use crate::batch::BatchSummary;

/// Events crossing from the batch worker thread to the rendering context.
///
/// The worker owns the sender and pushes after every file; the UI drains the
/// receiver on its own schedule. This is the only hand-off between the two
/// threads; no UI state is ever mutated from the worker.
#[derive(Clone, Debug, PartialEq)]
pub enum WorkerEvent {
    /// Completed percentage in `[0, 100]`, one per finished or skipped file.
    Progress(f32),
    Finished(BatchSummary),
    Failed(String),
}

pub fn event_channel() -> (Sender<WorkerEvent>, Receiver<WorkerEvent>) {
    channel()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_arrive_in_order() {
        let (tx, rx) = event_channel();
        tx.send(WorkerEvent::Progress(50.0)).unwrap();
        tx.send(WorkerEvent::Progress(100.0)).unwrap();
        tx.send(WorkerEvent::Finished(BatchSummary {
            total: 2,
            processed: 2,
            skipped: 0,
        }))
        .unwrap();

        assert_eq!(rx.recv().unwrap(), WorkerEvent::Progress(50.0));
        assert_eq!(rx.recv().unwrap(), WorkerEvent::Progress(100.0));
        assert!(matches!(rx.recv().unwrap(), WorkerEvent::Finished(_)));
    }
}
