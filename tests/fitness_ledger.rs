use evosim::engines::evaluation::{loss_to_fitness, FitnessLedger};
use evosim::engines::genetics::{genome_key, Genome};
use evosim::error::EvosimError;

fn resolved(genome_index: usize, genome: &Genome) -> Option<(usize, String)> {
    Some((genome_index, genome_key(genome)))
}

#[test]
fn fitness_lookup_fails_for_unrecorded_genomes() {
    let ledger = FitnessLedger::new();
    let genome: Genome = vec![1, 0, 1, 0];

    let fitness_fn = ledger.fitness_of(0);
    assert!(matches!(
        fitness_fn(&genome),
        Err(EvosimError::FitnessLookup(_))
    ));
}

#[test]
fn fitness_decreases_as_loss_increases() {
    let mut ledger = FitnessLedger::new();
    let better: Genome = vec![0, 0, 1, 1];
    let worse: Genome = vec![1, 1, 0, 0];

    ledger.record_loss(0, "AG-0-000", resolved(0, &better), 1.0);
    ledger.record_loss(0, "AG-0-001", resolved(1, &worse), 3.0);

    let fitness_fn = ledger.fitness_of(0);
    let better_fitness = fitness_fn(&better).unwrap();
    let worse_fitness = fitness_fn(&worse).unwrap();

    assert!(better_fitness > worse_fitness);
    assert_eq!(better_fitness, loss_to_fitness(1.0));
}

#[test]
fn duplicate_reports_keep_the_last_value_and_the_original_position() {
    let mut ledger = FitnessLedger::new();
    let first: Genome = vec![0, 0];
    let second: Genome = vec![1, 1];

    ledger.record_loss(0, "AG-0-000", resolved(0, &first), 5.0);
    ledger.record_loss(0, "AG-0-001", resolved(1, &second), 1.0);
    ledger.record_loss(0, "AG-0-000", resolved(0, &first), 1.0);

    assert_eq!(ledger.recorded_loss(0, "AG-0-000"), Some(1.0));

    // Equal losses: the entry recorded first still wins the tie.
    let (best, second_best) = ledger.best_and_second_best(0);
    assert_eq!(best.unwrap().licence_plate, "AG-0-000");
    assert_eq!(second_best.unwrap().licence_plate, "AG-0-001");
}

#[test]
fn second_best_excludes_the_best_identity_only() {
    let mut ledger = FitnessLedger::new();
    let genomes: Vec<Genome> = vec![vec![0, 0], vec![0, 1], vec![1, 0]];

    ledger.record_loss(0, "AG-0-000", resolved(0, &genomes[0]), 3.0);
    ledger.record_loss(0, "AG-0-001", resolved(1, &genomes[1]), 1.0);
    ledger.record_loss(0, "AG-0-002", resolved(2, &genomes[2]), 1.0);

    let (best, second_best) = ledger.best_and_second_best(0);
    let best = best.unwrap();
    let second_best = second_best.unwrap();

    assert_eq!(best.licence_plate, "AG-0-001");
    assert_eq!(best.loss, 1.0);
    // A different identity with an equal loss still counts as second best.
    assert_eq!(second_best.licence_plate, "AG-0-002");
    assert_eq!(second_best.loss, 1.0);
}

#[test]
fn unresolvable_identities_never_rank() {
    let mut ledger = FitnessLedger::new();
    let genome: Genome = vec![1, 1];

    ledger.record_loss(0, "AG-STALE", None, 0.1);
    ledger.record_loss(0, "AG-0-000", resolved(0, &genome), 2.0);

    // The stale identity is in the ledger but cannot be attributed.
    assert_eq!(ledger.recorded_loss(0, "AG-STALE"), Some(0.1));
    let (best, _) = ledger.best_and_second_best(0);
    assert_eq!(best.unwrap().licence_plate, "AG-0-000");

    // It still counts toward the minimum observed loss.
    assert_eq!(ledger.min_loss(0), 0.1);
}

#[test]
fn min_loss_is_infinite_until_a_loss_arrives() {
    let mut ledger = FitnessLedger::new();
    assert_eq!(ledger.min_loss(0), f64::INFINITY);

    ledger.record_loss(0, "AG-0-000", None, 4.0);
    assert_eq!(ledger.min_loss(0), 4.0);
}

#[test]
fn history_tracks_per_generation_minima() {
    let mut ledger = FitnessLedger::new();
    let genome: Genome = vec![0, 1];

    ledger.record_loss(0, "AG-0-000", resolved(0, &genome), 2.0);
    ledger.sync_history(0);
    assert_eq!(ledger.loss_history(), &[2.0]);

    // A better loss in the same generation overwrites the open entry.
    ledger.record_loss(0, "AG-0-001", resolved(1, &genome), 0.5);
    ledger.sync_history(0);
    assert_eq!(ledger.loss_history(), &[0.5]);

    // Skipped generations backfill with infinity.
    ledger.record_loss(2, "AG-2-000", resolved(0, &genome), 1.5);
    ledger.sync_history(2);
    assert_eq!(ledger.loss_history(), &[0.5, f64::INFINITY, 1.5]);
}

#[test]
fn reset_clears_every_generation() {
    let mut ledger = FitnessLedger::new();
    let genome: Genome = vec![0, 1];

    ledger.record_loss(0, "AG-0-000", resolved(0, &genome), 2.0);
    ledger.sync_history(0);
    ledger.reset();

    assert_eq!(ledger.recorded_loss(0, "AG-0-000"), None);
    assert!(ledger.loss_history().is_empty());
    assert_eq!(ledger.min_loss(0), f64::INFINITY);
}
