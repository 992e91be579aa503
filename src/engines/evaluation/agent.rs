use crate::engines::evaluation::orchestrator::Command;
use crate::engines::genetics::Generation;
use std::sync::mpsc::Sender;

/// Unique agent identity token, minted by the simulator. Valid only within
/// one generation/epoch context.
pub type LicencePlate = String;

/// One simulated instantiation of a genome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    pub licence_plate: LicencePlate,
    pub genome_index: usize,
}

/// Epoch-tagged handle the simulator uses to report losses back to the
/// orchestrator. Cloneable so it can be handed to each agent's own worker. A
/// reporter minted under a superseded epoch still sends, but its reports are
/// discarded on receipt.
#[derive(Clone)]
pub struct LossReporter {
    epoch: u64,
    command_tx: Sender<Command>,
}

impl LossReporter {
    pub(crate) fn new(epoch: u64, command_tx: Sender<Command>) -> Self {
        Self { epoch, command_tx }
    }

    /// Report the final loss for one agent. Expected at most once per agent;
    /// a repeated report overwrites the earlier one (last write wins).
    pub fn report(&self, licence_plate: impl Into<LicencePlate>, loss: f64) {
        let _ = self.command_tx.send(Command::LossReport {
            epoch: self.epoch,
            licence_plate: licence_plate.into(),
            loss,
        });
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// The black-box agent simulator.
///
/// `spawn` turns a generation into an ordered agent roster (roster order
/// defines batch slicing) and receives the loss reporter for the whole
/// generation. `run_batch` activates one slice of that roster; for every
/// activated agent the simulator may call the reporter zero or one time, at
/// any later point, in any order. The orchestrator never assumes a report
/// arrives.
pub trait AgentSimulator: Send {
    fn spawn(
        &mut self,
        generation: &Generation,
        generation_index: usize,
        reporter: LossReporter,
    ) -> Vec<Agent>;

    fn run_batch(&mut self, batch: &[Agent]);
}
