use crate::engines::evaluation::orchestrator::AnalyticsSnapshot;
use log::{info, warn};
use std::sync::mpsc::Sender;

/// Observer of orchestrator lifecycle events.
pub trait ProgressCallback: Send {
    fn on_generation_start(&mut self, epoch: u64, generation_index: usize);
    fn on_batch_settled(&mut self, snapshot: &AnalyticsSnapshot);
    fn on_selection_fallback(&mut self, generation_index: usize, reason: &str);
}

pub struct ConsoleProgressCallback;

impl ProgressCallback for ConsoleProgressCallback {
    fn on_generation_start(&mut self, epoch: u64, generation_index: usize) {
        info!("Generation #{} starting (epoch {})", generation_index, epoch);
    }

    fn on_batch_settled(&mut self, snapshot: &AnalyticsSnapshot) {
        info!(
            "Batch #{} of generation #{} settled, min loss {}",
            snapshot.batch_index.unwrap_or(0),
            snapshot.generation_index.unwrap_or(0),
            snapshot.min_loss
        );
    }

    fn on_selection_fallback(&mut self, generation_index: usize, reason: &str) {
        warn!(
            "Selection for generation #{} failed, cloning the previous generation: {}",
            generation_index, reason
        );
    }
}

/// Progress update pushed from the orchestrator thread.
#[derive(Clone, Debug)]
pub enum ProgressUpdate {
    GenerationStart {
        epoch: u64,
        generation_index: usize,
    },
    BatchSettled(AnalyticsSnapshot),
    SelectionFallback {
        generation_index: usize,
        reason: String,
    },
}

/// Callback that forwards every event through a channel, for consumers
/// polling from another thread.
pub struct ChannelProgressCallback {
    progress_tx: Sender<ProgressUpdate>,
}

impl ChannelProgressCallback {
    pub fn new(progress_tx: Sender<ProgressUpdate>) -> Self {
        Self { progress_tx }
    }
}

impl ProgressCallback for ChannelProgressCallback {
    fn on_generation_start(&mut self, epoch: u64, generation_index: usize) {
        let _ = self.progress_tx.send(ProgressUpdate::GenerationStart {
            epoch,
            generation_index,
        });
    }

    fn on_batch_settled(&mut self, snapshot: &AnalyticsSnapshot) {
        let _ = self
            .progress_tx
            .send(ProgressUpdate::BatchSettled(snapshot.clone()));
    }

    fn on_selection_fallback(&mut self, generation_index: usize, reason: &str) {
        let _ = self.progress_tx.send(ProgressUpdate::SelectionFallback {
            generation_index,
            reason: reason.to_string(),
        });
    }
}
