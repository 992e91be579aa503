use anyhow::Result;
use evosim::config::{AppConfig, ConfigManager, EvolutionConfig};
use evosim::engines::evaluation::{
    Agent, AgentSimulator, LossReporter, OrchestratorRunner, ProgressUpdate,
};
use evosim::engines::genetics::{decode_parameters, Generation, PARAMETER_BITS};
use log::{info, warn};
use rand::Rng;
use std::collections::HashMap;
use std::path::Path;
use std::thread;
use std::time::Duration;

const DEMO_GENERATIONS: usize = 5;
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Demo simulator: an agent's loss is the Euclidean distance between its
/// decoded parameter vector and a fixed target. Each agent reports from its
/// own worker thread after a randomized delay, so losses arrive unordered
/// within the batch window. Agents whose parameters decode to non-finite
/// values never report, which the orchestrator tolerates.
struct ParameterTargetSimulator {
    target: Vec<f64>,
    reporter: Option<LossReporter>,
    losses: HashMap<String, f64>,
}

impl ParameterTargetSimulator {
    fn new(genome_length: usize) -> Self {
        Self {
            target: vec![0.5; genome_length / PARAMETER_BITS],
            reporter: None,
            losses: HashMap::new(),
        }
    }
}

impl AgentSimulator for ParameterTargetSimulator {
    fn spawn(
        &mut self,
        generation: &Generation,
        generation_index: usize,
        reporter: LossReporter,
    ) -> Vec<Agent> {
        self.reporter = Some(reporter);
        self.losses.clear();

        generation
            .iter()
            .enumerate()
            .map(|(genome_index, genome)| {
                let licence_plate = format!("AG-{}-{:03}", generation_index, genome_index);
                if let Ok(parameters) = decode_parameters(genome) {
                    let distance = parameters
                        .iter()
                        .zip(&self.target)
                        .map(|(parameter, target)| (parameter - target).powi(2))
                        .sum::<f64>()
                        .sqrt();
                    if distance.is_finite() {
                        self.losses.insert(licence_plate.clone(), distance);
                    }
                }
                Agent {
                    licence_plate,
                    genome_index,
                }
            })
            .collect()
    }

    fn run_batch(&mut self, batch: &[Agent]) {
        let Some(reporter) = &self.reporter else {
            return;
        };
        for agent in batch {
            let Some(loss) = self.losses.get(&agent.licence_plate).copied() else {
                continue;
            };
            let reporter = reporter.clone();
            let licence_plate = agent.licence_plate.clone();
            thread::spawn(move || {
                let delay: u64 = rand::thread_rng().gen_range(10..120);
                thread::sleep(Duration::from_millis(delay));
                reporter.report(licence_plate, loss);
            });
        }
    }
}

fn load_config() -> AppConfig {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "evosim.toml".to_string());

    if Path::new(&path).exists() {
        let manager = ConfigManager::new();
        match manager.load_from_file(&path) {
            Ok(()) => {
                info!("Loaded configuration from {}", path);
                return manager.get();
            }
            Err(e) => warn!("{}; falling back to demo defaults", e),
        }
    }

    AppConfig {
        evolution: EvolutionConfig {
            generation_size: 16,
            batch_size: 8,
            generation_lifetime_ms: 1_200,
            genome_length: 64,
            ..EvolutionConfig::default()
        },
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let config = load_config();
    let genome_length = config.evolution.genome_length;
    info!(
        "Evolving {} genomes of {} bits, batches of {}",
        config.evolution.generation_size, genome_length, config.evolution.batch_size
    );

    let simulator = ParameterTargetSimulator::new(genome_length);
    let mut runner = OrchestratorRunner::start(config.evolution, Box::new(simulator))?;

    loop {
        while let Some(update) = runner.poll_progress() {
            match update {
                ProgressUpdate::GenerationStart {
                    epoch,
                    generation_index,
                } => info!("Generation #{} starting (epoch {})", generation_index, epoch),
                ProgressUpdate::BatchSettled(snapshot) => info!(
                    "Generation #{} batch #{} settled, min loss {:.4}",
                    snapshot.generation_index.unwrap_or(0),
                    snapshot.batch_index.unwrap_or(0),
                    snapshot.min_loss
                ),
                ProgressUpdate::SelectionFallback {
                    generation_index,
                    reason,
                } => warn!(
                    "Selection fallback at generation #{}: {}",
                    generation_index, reason
                ),
            }
        }

        let snapshot = runner.snapshot()?;
        if snapshot.generation_index.unwrap_or(0) >= DEMO_GENERATIONS {
            println!("Loss history: {:?}", snapshot.loss_history);
            if let Some(best) = snapshot.best {
                println!(
                    "Best agent {} (genome #{}) with loss {:.4}",
                    best.licence_plate, best.genome_index, best.loss
                );
            }
            if let Some(second_best) = snapshot.second_best {
                println!(
                    "Second best agent {} with loss {:.4}",
                    second_best.licence_plate, second_best.loss
                );
            }
            break;
        }

        thread::sleep(POLL_INTERVAL);
    }

    runner.shutdown();
    Ok(())
}
