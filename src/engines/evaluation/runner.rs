use crate::config::{ConfigSection, EvolutionConfig};
use crate::engines::evaluation::agent::AgentSimulator;
use crate::engines::evaluation::orchestrator::{AnalyticsSnapshot, Command, Orchestrator};
use crate::engines::evaluation::progress::{ChannelProgressCallback, ProgressUpdate};
use crate::engines::evaluation::timer::ThreadBatchClock;
use crate::error::{EvosimError, Result};
use log::warn;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const SNAPSHOT_REPLY_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs the orchestrator on a background thread and exposes channel-based
/// handles to it. All ledger writes and index transitions happen on that one
/// thread, so the orchestrator itself needs no locking.
pub struct OrchestratorRunner {
    command_tx: Sender<Command>,
    progress_rx: Receiver<ProgressUpdate>,
    handle: Option<JoinHandle<()>>,
}

impl OrchestratorRunner {
    /// Validate the configuration, spawn the orchestrator thread and start
    /// the evolution.
    pub fn start(config: EvolutionConfig, simulator: Box<dyn AgentSimulator>) -> Result<Self> {
        let (command_tx, command_rx) = channel();
        let (progress_tx, progress_rx) = channel();

        let orchestrator = Orchestrator::new(
            config,
            simulator,
            ThreadBatchClock::new(command_tx.clone()),
            Box::new(ChannelProgressCallback::new(progress_tx)),
            command_tx.clone(),
        )?;

        let handle = thread::Builder::new()
            .name("evosim-orchestrator".to_string())
            .spawn(move || orchestrator.run(command_rx))?;

        let _ = command_tx.send(Command::Start);

        Ok(Self {
            command_tx,
            progress_rx,
            handle: Some(handle),
        })
    }

    /// Sender half of the command channel, for callers that need to inject
    /// commands directly.
    pub fn command_sender(&self) -> Sender<Command> {
        self.command_tx.clone()
    }

    /// Poll for progress updates (non-blocking).
    pub fn poll_progress(&self) -> Option<ProgressUpdate> {
        self.progress_rx.try_recv().ok()
    }

    /// Current analytics, fetched synchronously from the orchestrator thread.
    pub fn snapshot(&self) -> Result<AnalyticsSnapshot> {
        let (reply_tx, reply_rx) = channel();
        self.command_tx
            .send(Command::Snapshot(reply_tx))
            .map_err(|_| EvosimError::Simulator("orchestrator is not running".to_string()))?;
        reply_rx
            .recv_timeout(SNAPSHOT_REPLY_TIMEOUT)
            .map_err(|_| EvosimError::Simulator("orchestrator did not reply".to_string()))
    }

    /// Reset all per-run state and start over from generation zero.
    pub fn restart(&self) {
        let _ = self.command_tx.send(Command::Restart);
    }

    /// Apply a new configuration. Invalid configurations are rejected here,
    /// before they ever reach the orchestrator.
    pub fn reconfigure(&self, config: EvolutionConfig) -> Result<()> {
        config.validate()?;
        self.command_tx
            .send(Command::Reconfigure(config))
            .map_err(|_| EvosimError::Simulator("orchestrator is not running".to_string()))
    }

    /// Stop the orchestrator and wait for its thread to finish.
    pub fn shutdown(&mut self) {
        let _ = self.command_tx.send(Command::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Orchestrator thread panicked during shutdown");
            }
        }
    }
}

impl Drop for OrchestratorRunner {
    fn drop(&mut self) {
        self.shutdown();
    }
}
