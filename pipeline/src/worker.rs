//! Worker-thread adapter for synchronous tracker algorithms.
//!
//! The tracking loop overlaps overlay rendering with tracker computation
//! by running each tracker on its own thread. Frames travel in and results
//! travel out over bounded channels of capacity one, so the worker holds
//! at most the latest frame and the loop at most the latest result.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};
use log::debug;

use shared::{BoundingBox, Frame};

use crate::interfaces::{FeatureTracker, TrackResult};

/// A tracker algorithm running on a dedicated worker thread.
///
/// Construct via [`TrackerWorker::spawn`] with a step function that maps a
/// frame to the target's new box (`None` once the target is lost). Frames
/// are processed strictly in submission order; after a loss the worker
/// publishes one failed result and exits.
pub struct TrackerWorker {
    frame_tx: Option<Sender<Frame>>,
    result_rx: Receiver<TrackResult>,
    handle: Option<JoinHandle<()>>,
}

impl TrackerWorker {
    /// Spawn a worker around `step`.
    ///
    /// `label` names the thread for diagnostics.
    pub fn spawn<F>(label: &str, mut step: F) -> Self
    where
        F: FnMut(&Frame) -> Option<BoundingBox> + Send + 'static,
    {
        let (frame_tx, frame_rx) = bounded::<Frame>(1);
        let (result_tx, result_rx) = bounded::<TrackResult>(1);

        let thread_label = label.to_string();
        let handle = thread::Builder::new()
            .name(format!("tracker-{label}"))
            .spawn(move || {
                for frame in frame_rx.iter() {
                    let result = match step(&frame) {
                        Some(bbox) => TrackResult { success: true, bbox },
                        None => TrackResult::lost(),
                    };
                    let lost = !result.success;
                    if result_tx.send(result).is_err() {
                        break;
                    }
                    if lost {
                        debug!("tracker {thread_label} lost its target, worker exits");
                        break;
                    }
                }
            })
            .expect("failed to spawn tracker worker thread");

        Self {
            frame_tx: Some(frame_tx),
            result_rx,
            handle: Some(handle),
        }
    }

    /// Close the frame channel and join the worker thread.
    pub fn stop(&mut self) {
        self.frame_tx.take();
        // Drain a possibly pending result so the worker is not stuck on a
        // full result channel.
        let _ = self.result_rx.try_recv();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl FeatureTracker for TrackerWorker {
    fn update(&mut self, frame: Frame) {
        if let Some(tx) = &self.frame_tx {
            let _ = tx.send(frame);
        }
    }

    fn result(&mut self) -> TrackResult {
        self.result_rx.recv().unwrap_or_else(|_| TrackResult::lost())
    }
}

impl Drop for TrackerWorker {
    fn drop(&mut self) {
        self.stop();
    }
}
