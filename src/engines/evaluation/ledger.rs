use crate::engines::evaluation::agent::LicencePlate;
use crate::engines::genetics::{genome_key, Genome, GenomeKey};
use crate::error::{EvosimError, Result};
use std::collections::HashMap;

/// Loss-to-fitness transform used for parent selection. Fitness grows as
/// loss shrinks; a loss of zero maps to the maximum fitness of 1.
pub fn loss_to_fitness(loss: f64) -> f64 {
    1.0 / (1.0 + loss)
}

/// One identity-map entry. `loss` is `None` while the agent's evaluation is
/// pending or was interrupted; such entries are skipped by every scan.
#[derive(Debug, Clone)]
struct LossRecord {
    licence_plate: LicencePlate,
    genome_index: Option<usize>,
    loss: Option<f64>,
}

/// A ranked row out of the identity map scan.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedLoss {
    pub licence_plate: LicencePlate,
    pub genome_index: usize,
    pub loss: f64,
}

#[derive(Debug, Default)]
struct GenerationLedger {
    // Insertion-ordered identity map; overwrites keep the original position.
    records: Vec<LossRecord>,
    by_plate: HashMap<LicencePlate, usize>,
    genome_losses: HashMap<GenomeKey, f64>,
}

/// Per-generation record of observed losses, keyed by agent identity and by
/// genome content. Built up incrementally as asynchronous evaluations
/// complete; entries are append-only within a generation and a generation's
/// maps are sealed once the run moves past it (no API removes or reorders
/// entries).
///
/// The ledger is owned exclusively by the orchestrator; every write goes
/// through [`FitnessLedger::record_loss`] on the orchestrator's own thread.
#[derive(Debug, Default)]
pub struct FitnessLedger {
    generations: Vec<GenerationLedger>,
    loss_history: Vec<f64>,
}

impl FitnessLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn generation_mut(&mut self, generation_index: usize) -> &mut GenerationLedger {
        if self.generations.len() <= generation_index {
            self.generations
                .resize_with(generation_index + 1, GenerationLedger::default);
        }
        &mut self.generations[generation_index]
    }

    /// Record a loss for one agent identity. Last write wins per
    /// (generation, identity) without changing the entry's position. The
    /// genome-key map is written only when the caller could still resolve
    /// the identity's originating genome.
    pub fn record_loss(
        &mut self,
        generation_index: usize,
        licence_plate: &str,
        resolved: Option<(usize, GenomeKey)>,
        loss: f64,
    ) {
        let ledger = self.generation_mut(generation_index);

        match ledger.by_plate.get(licence_plate) {
            Some(&position) => {
                ledger.records[position].loss = Some(loss);
                if let Some((genome_index, _)) = &resolved {
                    ledger.records[position].genome_index = Some(*genome_index);
                }
            }
            None => {
                ledger.by_plate
                    .insert(licence_plate.to_string(), ledger.records.len());
                ledger.records.push(LossRecord {
                    licence_plate: licence_plate.to_string(),
                    genome_index: resolved.as_ref().map(|(index, _)| *index),
                    loss: Some(loss),
                });
            }
        }

        if let Some((_, key)) = resolved {
            ledger.genome_losses.insert(key, loss);
        }
    }

    /// Recorded loss for one identity, if any.
    pub fn recorded_loss(&self, generation_index: usize, licence_plate: &str) -> Option<f64> {
        let ledger = self.generations.get(generation_index)?;
        let position = *ledger.by_plate.get(licence_plate)?;
        ledger.records[position].loss
    }

    /// Fitness lookup closure for one generation, closed over a snapshot of
    /// that generation's genome-key map. A genome that was never evaluated
    /// (duplicate content never separately run, or evaluation still pending)
    /// cannot be scored, so the closure fails for it.
    pub fn fitness_of(&self, generation_index: usize) -> impl Fn(&Genome) -> Result<f64> {
        let genome_losses = self
            .generations
            .get(generation_index)
            .map(|ledger| ledger.genome_losses.clone())
            .unwrap_or_default();

        move |genome: &Genome| {
            let key = genome_key(genome);
            match genome_losses.get(&key) {
                Some(loss) => Ok(loss_to_fitness(*loss)),
                None => Err(EvosimError::FitnessLookup(format!(
                    "no loss recorded for genome {}",
                    key
                ))),
            }
        }
    }

    /// Best and second-best scored agents of one generation.
    ///
    /// Full scan of the identity map in insertion order, skipping pending
    /// entries and entries whose genome was never resolvable. Strictly-less
    /// comparison, so the first-seen entry wins ties. The second best
    /// excludes the best identity even when another identity carries an
    /// equal loss.
    pub fn best_and_second_best(
        &self,
        generation_index: usize,
    ) -> (Option<RankedLoss>, Option<RankedLoss>) {
        let best = self.scan_for_best(generation_index, None);
        let second = match &best {
            Some(best) => self.scan_for_best(generation_index, Some(&best.licence_plate)),
            None => None,
        };
        (best, second)
    }

    fn scan_for_best(
        &self,
        generation_index: usize,
        excluded_plate: Option<&str>,
    ) -> Option<RankedLoss> {
        let ledger = self.generations.get(generation_index)?;
        let mut best: Option<RankedLoss> = None;

        for record in &ledger.records {
            if excluded_plate == Some(record.licence_plate.as_str()) {
                continue;
            }
            let (Some(loss), Some(genome_index)) = (record.loss, record.genome_index) else {
                continue;
            };
            if best.as_ref().map_or(true, |current| loss < current.loss) {
                best = Some(RankedLoss {
                    licence_plate: record.licence_plate.clone(),
                    genome_index,
                    loss,
                });
            }
        }

        best
    }

    /// Minimum recorded loss of one generation, infinity when nothing has
    /// been observed yet.
    pub fn min_loss(&self, generation_index: usize) -> f64 {
        let Some(ledger) = self.generations.get(generation_index) else {
            return f64::INFINITY;
        };
        ledger
            .records
            .iter()
            .filter_map(|record| record.loss)
            .fold(f64::INFINITY, f64::min)
    }

    /// Write the current minimum loss of `generation_index` into the loss
    /// history, backfilling skipped slots with infinity. Called at every
    /// batch settlement, so the in-progress generation's entry is overwritten
    /// as new minima arrive.
    pub fn sync_history(&mut self, generation_index: usize) {
        if self.loss_history.len() <= generation_index {
            self.loss_history.resize(generation_index + 1, f64::INFINITY);
        }
        self.loss_history[generation_index] = self.min_loss(generation_index);
    }

    /// Minimum observed loss per generation, ordered by generation index.
    pub fn loss_history(&self) -> &[f64] {
        &self.loss_history
    }

    /// Drop all recorded state. Used only when a run restarts.
    pub fn reset(&mut self) {
        self.generations.clear();
        self.loss_history.clear();
    }
}
