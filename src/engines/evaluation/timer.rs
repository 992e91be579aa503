use crate::engines::evaluation::orchestrator::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Tag carried by every batch timer. The orchestrator discards a fire whose
/// epoch, generation or batch no longer matches its current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchDeadline {
    pub epoch: u64,
    pub generation_index: usize,
    pub batch_index: usize,
}

/// Owner of the single batch lifetime timer. Arming always releases any
/// existing timer first, so at most one timer is armed at any time.
pub trait BatchClock: Send {
    fn arm(&mut self, delay: Duration, deadline: BatchDeadline);
    fn cancel(&mut self);
}

/// Wall-clock implementation: a sleeper thread per armed timer, cancelled
/// through a shared flag. A cancelled timer never sends its fire.
pub struct ThreadBatchClock {
    command_tx: Sender<Command>,
    armed: Option<Arc<AtomicBool>>,
}

impl ThreadBatchClock {
    pub fn new(command_tx: Sender<Command>) -> Self {
        Self {
            command_tx,
            armed: None,
        }
    }
}

impl BatchClock for ThreadBatchClock {
    fn arm(&mut self, delay: Duration, deadline: BatchDeadline) {
        self.cancel();

        let cancelled = Arc::new(AtomicBool::new(false));
        self.armed = Some(Arc::clone(&cancelled));

        let command_tx = self.command_tx.clone();
        thread::spawn(move || {
            thread::sleep(delay);
            if !cancelled.load(Ordering::SeqCst) {
                let _ = command_tx.send(Command::BatchElapsed(deadline));
            }
        });
    }

    fn cancel(&mut self) {
        if let Some(cancelled) = self.armed.take() {
            cancelled.store(true, Ordering::SeqCst);
        }
    }
}

impl Drop for ThreadBatchClock {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Test clock: records the armed deadline instead of sleeping, so tests can
/// fire batch lifetimes deterministically.
#[derive(Debug, Default)]
pub struct ManualBatchClock {
    pub armed: Option<(Duration, BatchDeadline)>,
}

impl ManualBatchClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BatchClock for ManualBatchClock {
    fn arm(&mut self, delay: Duration, deadline: BatchDeadline) {
        self.armed = Some((delay, deadline));
    }

    fn cancel(&mut self) {
        self.armed = None;
    }
}
