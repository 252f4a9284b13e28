use std::{io, num::NonZeroU32, thread};

use holland_core::{Genome, OFF, ON, Rule, Seed, WILDCARD};
use holland_evolution::{
    Backfill, CsvMetricsWriter, Engine, EngineConfig, EvolutionError, GenerationRecord,
    Operators, PointMutation, RouletteWheel, RuleDecoder as _, RunParams, StopReason,
    UniformCandidate, WildcardRuleCodec, mutation::ternary_toggle,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn engine(seed: u64) -> Engine {
    Engine::new(EngineConfig::new(Seed::from(seed)))
}

#[expect(clippy::cast_precision_loss)]
fn score(count: usize) -> f64 {
    count as f64
}

#[test]
fn test_same_seed_gives_same_best_candidate() {
    init_logger();
    let params = RunParams::new(10, 10, 50);

    let mut engine_a = engine(0x5eed);
    let first = engine_a.run(&params).unwrap();
    let second = engine_a.run(&params).unwrap();
    let other_engine = engine(0x5eed).run(&params).unwrap();

    assert_eq!(first.best, second.best);
    assert_eq!(first, other_engine);
    assert_eq!(first.generations, 50);
}

#[test]
fn test_early_termination_stops_at_optimum() {
    init_logger();
    let mut engine = engine(3);
    let mut records: Vec<GenerationRecord> = Vec::new();
    let outcome = engine
        .run_with_sink(
            &RunParams::new(40, 8, 500).terminate_early(true),
            &mut records,
        )
        .unwrap();

    assert_eq!(outcome.stop_reason, StopReason::TargetReached);
    assert!(outcome.generations < 500);
    assert_eq!(outcome.best.genome().count(ON), 8);
    assert_eq!(records.len(), outcome.generations);
}

#[test]
fn test_exhausting_generations_is_not_an_error() {
    init_logger();
    let mut config = EngineConfig::new(Seed::from(4));
    // unreachable with the default fitness
    config.target_fitness = Some(100.0);
    let outcome = Engine::new(config)
        .run(&RunParams::new(6, 6, 12).terminate_early(true))
        .unwrap();
    assert_eq!(outcome.stop_reason, StopReason::MaxGenerations);
    assert_eq!(outcome.generations, 12);
}

#[test]
fn test_custom_fitness_drives_the_search() {
    init_logger();
    let mut config = EngineConfig::new(Seed::from(5));
    config.target_fitness = Some(12.0);
    let operators = Operators::default().with_fitness(|genome: &Genome| score(genome.count(OFF)));
    let outcome = Engine::with_operators(config, operators)
        .run(&RunParams::new(30, 12, 300).terminate_early(true))
        .unwrap();
    assert_eq!(outcome.stop_reason, StopReason::TargetReached);
    assert_eq!(outcome.best.genome().count(OFF), 12);
}

#[test]
fn test_rule_base_fitness_through_registry() {
    init_logger();
    // Evolve a base of two 2+1 rules. Every rule matching `11 -> 1` scores a point.
    let target = Rule::parse("11", "1").unwrap();
    let mut operators = Operators::default();
    operators
        .set_candidate(UniformCandidate::ternary())
        .set_mutation(PointMutation::new(NonZeroU32::new(8).unwrap()).with_toggle(ternary_toggle));
    let wanted = target.clone();
    operators.set_fitness(move |genome: &Genome| {
        let matched = WildcardRuleCodec
            .decode(genome.alleles(), 2, 3)
            .map_or(0, |rules| rules.matching(&wanted).count());
        score(matched)
    });

    let mut config = EngineConfig::new(Seed::from(6));
    config.target_fitness = Some(2.0);
    let mut engine = Engine::with_operators(config, operators);
    let outcome = engine
        .run(&RunParams::new(20, 6, 200).terminate_early(true))
        .unwrap();

    assert_eq!(outcome.stop_reason, StopReason::TargetReached);
    let rules = engine
        .operators()
        .decode_rules(outcome.best.genome().alleles(), 2, 3)
        .unwrap();
    assert_eq!(rules.len(), 2);
    for rule in &rules {
        assert!(engine.operators().rules_match(rule, &target).unwrap(), "{rule}");
    }
    assert!(
        outcome
            .population
            .genomes()
            .all(|g| g.alleles().iter().all(|&a| a == OFF || a == ON || a == WILDCARD))
    );
}

#[test]
fn test_csv_metrics_output() {
    init_logger();
    let mut engine = engine(7);
    let mut csv = CsvMetricsWriter::new(Vec::new()).unwrap();
    let outcome = engine
        .run_with_sink(&RunParams::new(10, 10, 5).track(true, false), &mut csv)
        .unwrap();
    let csv = String::from_utf8(csv.into_inner().unwrap()).unwrap();
    let mut lines = csv.lines();

    assert_eq!(lines.next(), Some("Iteration,AverageFitness,MaxFitness"));
    for (expected, line) in (1..=outcome.generations).zip(lines) {
        let cells = line.split(',').collect::<Vec<_>>();
        assert_eq!(cells.len(), 3, "{line}");
        assert_eq!(cells[0], expected.to_string());
        let average: f64 = cells[1].parse().unwrap();
        assert!((0.0..=10.0).contains(&average));
        assert_eq!(cells[2], "");
    }
}

#[test]
fn test_cancel_from_another_thread() {
    init_logger();
    let mut engine = engine(8);
    let token = engine.cancel_token();
    let mut sink = |record: &GenerationRecord| -> io::Result<()> {
        if record.generation == 3 {
            let token = token.clone();
            thread::spawn(move || token.cancel()).join().unwrap();
        }
        Ok(())
    };
    let outcome = engine
        .run_with_sink(&RunParams::new(8, 8, 1000), &mut sink)
        .unwrap();
    assert_eq!(outcome.stop_reason, StopReason::Cancelled);
    assert_eq!(outcome.generations, 3);
    assert!(engine.state().is_terminated());
}

#[test]
fn test_failing_sink_keeps_last_population() {
    init_logger();
    let mut engine = engine(9);
    let mut populations = Vec::new();
    let mut sink = |record: &GenerationRecord| -> io::Result<()> {
        populations.push(record.generation);
        if record.generation == 4 {
            return Err(io::Error::other("disk full"));
        }
        Ok(())
    };
    let err = engine
        .run_with_sink(&RunParams::new(6, 6, 10), &mut sink)
        .unwrap_err();
    assert!(matches!(err, EvolutionError::Metrics(_)));
    assert_eq!(populations, [1, 2, 3, 4]);
    assert_eq!(engine.generation(), 3);
    assert_eq!(engine.population().len(), 6);
    assert!(engine.state().is_populated());
    assert!(engine.best_candidate().is_some());
}

#[test]
fn test_roulette_selection_run() {
    init_logger();
    let operators = Operators::default().with_selection(RouletteWheel);
    let mut records: Vec<GenerationRecord> = Vec::new();
    let outcome = Engine::with_operators(EngineConfig::new(Seed::from(10)), operators)
        .run_with_sink(&RunParams::new(16, 16, 40), &mut records)
        .unwrap();
    assert_eq!(outcome.generations, 40);
    assert_eq!(outcome.population.len(), 16);
    assert!(
        records
            .iter()
            .all(|r| r.max_fitness.unwrap() >= r.average_fitness.unwrap())
    );
}

#[test]
fn test_shrinking_population() {
    init_logger();
    let mut config = EngineConfig::new(Seed::from(11));
    config.backfill = Backfill::Shrink;
    let outcome = Engine::new(config).run(&RunParams::new(7, 5, 2)).unwrap();
    // 7 -> 6 -> 6
    assert_eq!(outcome.population.len(), 6);
}

#[test]
fn test_engines_are_independent() {
    init_logger();
    let params = RunParams::new(10, 10, 20);
    let mut custom = engine(12);
    custom.operators_mut().set_fitness(|_: &Genome| 1.0);
    let mut reference = engine(12);

    let custom = custom.run(&params).unwrap();
    let reference = reference.run(&params).unwrap();
    assert_eq!(custom.best.fitness(), 1.0);
    assert!(reference.best.fitness() > 1.0);
    assert_eq!(
        reference.best.fitness(),
        Operators::default().fitness(reference.best.genome())
    );
}
