pub mod agent;
pub mod ledger;
pub mod orchestrator;
pub mod progress;
pub mod runner;
pub mod timer;

pub use agent::{Agent, AgentSimulator, LicencePlate, LossReporter};
pub use ledger::{loss_to_fitness, FitnessLedger, RankedLoss};
pub use orchestrator::{AnalyticsSnapshot, Command, Orchestrator, RankedAgent};
pub use progress::{ChannelProgressCallback, ConsoleProgressCallback, ProgressCallback, ProgressUpdate};
pub use runner::OrchestratorRunner;
pub use timer::{BatchClock, BatchDeadline, ManualBatchClock, ThreadBatchClock};
