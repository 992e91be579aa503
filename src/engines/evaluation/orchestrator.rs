use crate::config::{ConfigSection, EvolutionConfig};
use crate::engines::evaluation::agent::{Agent, AgentSimulator, LicencePlate, LossReporter};
use crate::engines::evaluation::ledger::FitnessLedger;
use crate::engines::evaluation::progress::ProgressCallback;
use crate::engines::evaluation::timer::{BatchClock, BatchDeadline};
use crate::engines::genetics::{
    create_generation, genome_key, select, Generation, Genome, SelectionProbabilities,
};
use crate::error::Result;
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::mpsc::{Receiver, Sender};

/// Commands driving the orchestrator. Loss reports and timer fires carry the
/// epoch (and batch coordinates) they were minted under and are discarded
/// when that context has been superseded.
pub enum Command {
    Start,
    LossReport {
        epoch: u64,
        licence_plate: LicencePlate,
        loss: f64,
    },
    BatchElapsed(BatchDeadline),
    Restart,
    Reconfigure(EvolutionConfig),
    Snapshot(Sender<AnalyticsSnapshot>),
    Shutdown,
}

/// A scored agent surfaced by the analytics scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedAgent {
    pub licence_plate: LicencePlate,
    pub genome_index: usize,
    pub loss: f64,
    pub genome: Genome,
}

/// Rolling analytics of the running evolution.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSnapshot {
    pub epoch: u64,
    pub generation_index: Option<usize>,
    pub batch_index: Option<usize>,
    pub batches_total: usize,
    pub min_loss: f64,
    pub loss_history: Vec<f64>,
    pub best: Option<RankedAgent>,
    pub second_best: Option<RankedAgent>,
}

/// Drives the generation lifecycle: creates or breeds a generation, spawns
/// its agents, runs them batch by batch inside a fixed lifetime window,
/// settles each batch into the ledger analytics and advances.
///
/// The orchestrator exclusively owns the ledger and the generation/batch
/// indices. Every mutation happens inside [`Orchestrator::handle_command`],
/// which the runner calls from a single thread, so no further locking is
/// needed.
pub struct Orchestrator<C: BatchClock> {
    config: EvolutionConfig,
    simulator: Box<dyn AgentSimulator>,
    clock: C,
    callback: Box<dyn ProgressCallback>,
    command_tx: Sender<Command>,
    rng: StdRng,

    epoch: u64,
    generation: Generation,
    generation_index: Option<usize>,
    agents: Vec<Agent>,
    plate_to_genome: HashMap<LicencePlate, usize>,
    batch_index: Option<usize>,
    ledger: FitnessLedger,
    best: Option<RankedAgent>,
    second_best: Option<RankedAgent>,
}

impl<C: BatchClock> Orchestrator<C> {
    pub fn new(
        config: EvolutionConfig,
        simulator: Box<dyn AgentSimulator>,
        clock: C,
        callback: Box<dyn ProgressCallback>,
        command_tx: Sender<Command>,
    ) -> Result<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            config,
            simulator,
            clock,
            callback,
            command_tx,
            rng,
            epoch: 0,
            generation: Vec::new(),
            generation_index: None,
            agents: Vec::new(),
            plate_to_genome: HashMap::new(),
            batch_index: None,
            ledger: FitnessLedger::new(),
            best: None,
            second_best: None,
        })
    }

    /// Process commands until the channel closes or a shutdown arrives.
    pub fn run(mut self, command_rx: Receiver<Command>) {
        while let Ok(command) = command_rx.recv() {
            if !self.handle_command(command) {
                break;
            }
        }
        self.clock.cancel();
    }

    /// Single entry point for every state mutation. Returns false when the
    /// orchestrator should stop processing commands.
    pub fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Start => self.start(),
            Command::LossReport {
                epoch,
                licence_plate,
                loss,
            } => self.on_loss_report(epoch, &licence_plate, loss),
            Command::BatchElapsed(deadline) => self.on_batch_elapsed(deadline),
            Command::Restart => self.restart(),
            Command::Reconfigure(config) => self.reconfigure(config),
            Command::Snapshot(reply_tx) => {
                let _ = reply_tx.send(self.snapshot());
                return true;
            }
            Command::Shutdown => {
                self.clock.cancel();
                return false;
            }
        }
        true
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn generation(&self) -> &Generation {
        &self.generation
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn ledger(&self) -> &FitnessLedger {
        &self.ledger
    }

    pub fn snapshot(&self) -> AnalyticsSnapshot {
        let min_loss = match self.generation_index {
            Some(generation_index) => self.ledger.min_loss(generation_index),
            None => f64::INFINITY,
        };
        AnalyticsSnapshot {
            epoch: self.epoch,
            generation_index: self.generation_index,
            batch_index: self.batch_index,
            batches_total: self.batches_total(),
            min_loss,
            loss_history: self.ledger.loss_history().to_vec(),
            best: self.best.clone(),
            second_best: self.second_best.clone(),
        }
    }

    fn batches_total(&self) -> usize {
        self.agents.len().div_ceil(self.config.batch_size)
    }

    fn start(&mut self) {
        if self.generation_index.is_some() {
            return;
        }
        info!("Start evolution");
        self.generation_index = Some(0);
        self.begin_generation();
    }

    /// Enter GenerationStarting: create the first generation or breed the
    /// next one, then spawn its agents.
    fn begin_generation(&mut self) {
        let Some(generation_index) = self.generation_index else {
            return;
        };
        self.callback
            .on_generation_start(self.epoch, generation_index);

        if generation_index == 0 {
            info!("Create first generation");
            self.generation = create_generation(
                self.config.generation_size,
                self.config.genome_length,
                &mut self.rng,
            );
        } else {
            self.mate_existing_generation(generation_index);
        }

        self.spawn_agents(generation_index);
    }

    /// Breed generation `generation_index` from its predecessor. A selection
    /// failure never halts the run: the previous generation is carried
    /// forward wholesale as a clone and evolution tries again next time.
    fn mate_existing_generation(&mut self, generation_index: usize) {
        info!("Mate generation #{}", generation_index);

        let outcome = SelectionProbabilities::new(
            self.config.mutation_probability,
            self.config.long_living_probability,
        )
        .and_then(|probabilities| {
            let fitness_fn = self.ledger.fitness_of(generation_index - 1);
            select(&self.generation, fitness_fn, probabilities, &mut self.rng)
        });

        match outcome {
            Ok(next_generation) => self.generation = next_generation,
            Err(e) => {
                warn!(
                    "The selection for the new generation has failed. \
                     Cloning the existing generation to try it next time. {}",
                    e
                );
                self.callback
                    .on_selection_fallback(generation_index, &e.to_string());
                self.generation = self.generation.clone();
            }
        }
    }

    fn spawn_agents(&mut self, generation_index: usize) {
        if self.generation.is_empty() {
            return;
        }
        info!("Create agents from generation #{}", generation_index);

        let reporter = LossReporter::new(self.epoch, self.command_tx.clone());
        self.agents = self
            .simulator
            .spawn(&self.generation, generation_index, reporter);

        self.plate_to_genome = self
            .agents
            .iter()
            .map(|agent| (agent.licence_plate.clone(), agent.genome_index))
            .collect();

        self.batch_index = Some(0);
        self.run_batch();
    }

    /// Enter BatchRunning: activate the current roster slice and arm the
    /// lifetime timer for it.
    fn run_batch(&mut self) {
        let (Some(generation_index), Some(batch_index)) =
            (self.generation_index, self.batch_index)
        else {
            return;
        };

        let batch_start = batch_index * self.config.batch_size;
        let batch_end = (batch_start + self.config.batch_size).min(self.agents.len());
        // Stale index racing a restart resolves to an empty slice.
        if batch_start >= batch_end {
            return;
        }

        info!("Run agents batch #{}", batch_index);
        self.simulator.run_batch(&self.agents[batch_start..batch_end]);

        self.clock.arm(
            self.config.generation_lifetime(),
            BatchDeadline {
                epoch: self.epoch,
                generation_index,
                batch_index,
            },
        );
    }

    fn on_loss_report(&mut self, epoch: u64, licence_plate: &str, loss: f64) {
        if epoch != self.epoch {
            debug!(
                "Discarding loss report for {} from superseded epoch {}",
                licence_plate, epoch
            );
            return;
        }
        let Some(generation_index) = self.generation_index else {
            return;
        };

        let resolved = self
            .plate_to_genome
            .get(licence_plate)
            .map(|&genome_index| (genome_index, genome_key(&self.generation[genome_index])));

        self.ledger
            .record_loss(generation_index, licence_plate, resolved, loss);
    }

    fn on_batch_elapsed(&mut self, deadline: BatchDeadline) {
        if deadline.epoch != self.epoch
            || Some(deadline.generation_index) != self.generation_index
            || Some(deadline.batch_index) != self.batch_index
        {
            debug!("Discarding stale batch deadline {:?}", deadline);
            return;
        }
        self.settle_batch(deadline.generation_index, deadline.batch_index);
    }

    /// Enter BatchSettling: fold the ledger into the rolling analytics, then
    /// advance to the next batch or the next generation. Loss reports
    /// arriving after this point still land in the ledger but are not folded
    /// back into the settled analytics.
    fn settle_batch(&mut self, generation_index: usize, batch_index: usize) {
        info!("Batch #{} lifetime ended", batch_index);

        self.ledger.sync_history(generation_index);
        self.sync_best_genomes(generation_index);
        let snapshot = self.snapshot();
        self.callback.on_batch_settled(&snapshot);

        let next_batch_index = batch_index + 1;
        if next_batch_index >= self.batches_total() {
            self.batch_index = None;
            self.generation_index = Some(generation_index + 1);
            self.begin_generation();
            return;
        }
        self.batch_index = Some(next_batch_index);
        self.run_batch();
    }

    /// Recompute best and second best from the ledger. When the scan finds
    /// nothing (no losses recorded yet) the previous values are kept.
    fn sync_best_genomes(&mut self, generation_index: usize) {
        let (best, second_best) = self.ledger.best_and_second_best(generation_index);

        if let Some(best) = best {
            if let Some(genome) = self.generation.get(best.genome_index) {
                self.best = Some(RankedAgent {
                    licence_plate: best.licence_plate,
                    genome_index: best.genome_index,
                    loss: best.loss,
                    genome: genome.clone(),
                });
            }
        }
        if let Some(second_best) = second_best {
            if let Some(genome) = self.generation.get(second_best.genome_index) {
                self.second_best = Some(RankedAgent {
                    licence_plate: second_best.licence_plate,
                    genome_index: second_best.genome_index,
                    loss: second_best.loss,
                    genome: genome.clone(),
                });
            }
        }
    }

    /// Full run reset: cancel any pending timer, invalidate every in-flight
    /// callback by bumping the epoch, clear all per-run state and start over
    /// from generation zero.
    fn restart(&mut self) {
        info!("Restart evolution");
        self.clock.cancel();
        self.epoch += 1;
        self.ledger.reset();
        self.generation.clear();
        self.agents.clear();
        self.plate_to_genome.clear();
        self.batch_index = None;
        self.best = None;
        self.second_best = None;
        self.generation_index = Some(0);
        self.begin_generation();
    }

    /// Apply a new configuration. Changing the generation size, batch size
    /// or genome length restarts the run; lifetime and probability changes
    /// apply live.
    fn reconfigure(&mut self, config: EvolutionConfig) {
        if let Err(e) = config.validate() {
            error!("Rejecting invalid configuration: {}", e);
            return;
        }
        let restart_needed = self.config.requires_restart(&config);
        self.config = config;
        if restart_needed {
            self.restart();
        }
    }
}
