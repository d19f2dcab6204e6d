//! Engine integration suite: reference scenarios and property coverage.

use std::sync::Arc;

use machine_core::{
    Configuration, Direction, Engine, MachineBuilder, MachineDefinition, NullSink, Outcome, Rule,
    RunReport, RunState, Symbol, TraceSink,
};
use proptest::prelude::*;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

const STATES: [&str; 3] = ["q0", "q1", "q2"];
const B: Symbol = Symbol::Blank;
const SYMBOLS: [Symbol; 3] = [Symbol::Blank, Symbol::Mark('0'), Symbol::Mark('1')];

fn single_step_acceptor() -> Arc<MachineDefinition> {
    Arc::new(
        MachineBuilder::new("q0")
            .states(["q0", "qf"])
            .input_alphabet(['1'])
            .tape_alphabet(['1'])
            .final_states(["qf"])
            .rule(Rule::new("q0", Symbol::Blank, '1', "qf", Symbol::Blank, '1', Direction::Stay))
            .build()
            .expect("valid machine"),
    )
}

fn transitionless() -> Arc<MachineDefinition> {
    Arc::new(
        MachineBuilder::new("q0")
            .states(["q0", "qf"])
            .input_alphabet(['0', '1'])
            .tape_alphabet(['0', '1'])
            .final_states(["qf"])
            .build()
            .expect("valid machine"),
    )
}

fn ping_pong() -> Arc<MachineDefinition> {
    Arc::new(
        MachineBuilder::new("ping")
            .states(["ping", "pong"])
            .input_alphabet(['1'])
            .tape_alphabet(['1'])
            .rule(Rule::new("ping", B, B, "pong", B, B, Direction::Stay))
            .rule(Rule::new("pong", B, B, "ping", B, B, Direction::Stay))
            .rule(Rule::new("ping", B, '1', "ping", B, '1', Direction::Right))
            .build()
            .expect("valid machine"),
    )
}

#[derive(Default)]
struct CountingSink {
    configurations: u64,
    starts: u32,
    ends: Vec<RunReport>,
}

impl TraceSink for CountingSink {
    fn on_configuration(&mut self, _configuration: &Configuration) {
        self.configurations += 1;
    }

    fn on_run_start(&mut self) {
        self.starts += 1;
    }

    fn on_run_end(&mut self, report: &RunReport) {
        self.ends.push(report.clone());
    }
}

#[test]
fn single_step_machine_accepts_one() {
    let definition = single_step_acceptor();
    let mut engine = Engine::new(Arc::clone(&definition));
    engine.load_str("1").expect("valid input");

    let report = engine.run(100, &mut NullSink);

    assert_eq!(report.outcome, Outcome::Accepted);
    assert_eq!(report.steps, 1);
    assert_eq!(definition.render_symbols(&report.final_tape), "1");
}

#[rstest]
#[case("0")]
#[case("1")]
#[case("0110")]
fn machine_without_transitions_rejects_at_step_zero(#[case] input: &str) {
    let definition = transitionless();
    let mut engine = Engine::new(Arc::clone(&definition));
    engine.load_str(input).expect("valid input");

    let mut trace: Vec<Configuration> = Vec::new();
    let report = engine.run(100, &mut trace);

    assert_eq!(report.outcome, Outcome::Rejected);
    assert_eq!(report.steps, 0);
    assert_eq!(definition.render_symbols(&report.final_tape), input);
    assert_eq!(trace.len(), 1);
}

#[rstest]
#[case("")]
#[case("1")]
#[case("111")]
fn cycling_machine_is_indeterminate_at_the_bound(#[case] input: &str) {
    let mut engine = Engine::new(ping_pong());
    engine.load_str(input).expect("valid input");

    let mut sink = CountingSink::default();
    let report = engine.run(50, &mut sink);

    assert_eq!(report.outcome, Outcome::Indeterminate);
    assert_eq!(report.steps, 50);
    assert_eq!(sink.configurations, 50);
    assert_eq!(engine.run_state(), RunState::Ready);
}

#[test]
fn sink_hooks_bracket_each_run() {
    let mut engine = Engine::new(single_step_acceptor());
    engine.load_str("1").expect("valid input");

    let mut sink = CountingSink::default();
    let report = engine.run(100, &mut sink);

    assert_eq!(sink.starts, 1);
    assert_eq!(sink.configurations, 2);
    assert_eq!(sink.ends, vec![report]);
}

#[test]
fn zero_step_bound_is_indeterminate_without_stepping() {
    let mut engine = Engine::new(single_step_acceptor());
    engine.load_str("1").expect("valid input");

    let mut sink = CountingSink::default();
    let report = engine.run(0, &mut sink);

    assert_eq!(report.outcome, Outcome::Indeterminate);
    assert_eq!(report.steps, 0);
    assert_eq!(sink.configurations, 0);
    assert_eq!(engine.steps(), 0);
}

#[test]
fn describe_configuration_is_available_after_halt() {
    let mut engine = Engine::new(single_step_acceptor());
    engine.load_str("1").expect("valid input");
    engine.run(100, &mut NullSink);

    let configuration = engine.describe_configuration();

    assert_eq!(
        configuration.trace_line(),
        "Step 001: Head:   0 | State: qf | Cache: B | Tape: [qf, B]1"
    );
}

fn symbol_strategy() -> impl Strategy<Value = Symbol> {
    prop::sample::select(SYMBOLS.to_vec())
}

fn direction_strategy() -> impl Strategy<Value = Direction> {
    prop::sample::select(vec![Direction::Left, Direction::Right, Direction::Stay])
}

fn rule_strategy() -> impl Strategy<Value = (usize, Symbol, Symbol, Direction)> {
    (0..STATES.len(), symbol_strategy(), symbol_strategy(), direction_strategy())
}

/// Random machine over three states and `{0, 1}`: every possible key maps to
/// either nothing or a random effect.
fn machine_strategy() -> impl Strategy<Value = Arc<MachineDefinition>> {
    let keys = STATES.len() * SYMBOLS.len() * SYMBOLS.len();
    prop::collection::vec(prop::option::of(rule_strategy()), keys).prop_map(|effects| {
        let mut builder = MachineBuilder::new("q0")
            .states(STATES)
            .input_alphabet(['0', '1'])
            .tape_alphabet(['0', '1'])
            .final_states(["q2"]);
        let keys = STATES.into_iter().flat_map(|state| {
            SYMBOLS.into_iter().flat_map(move |register| {
                SYMBOLS.into_iter().map(move |read| (state, register, read))
            })
        });
        for ((state, register, read), effect) in keys.zip(effects) {
            if let Some((next, next_register, write, direction)) = effect {
                builder = builder.rule(Rule::new(
                    state,
                    register,
                    read,
                    STATES[next],
                    next_register,
                    write,
                    direction,
                ));
            }
        }
        Arc::new(builder.build().expect("generated machine is well formed"))
    })
}

fn input_strategy() -> impl Strategy<Value = String> {
    "[01]{0,12}"
}

proptest! {
    #[test]
    fn property_runs_are_deterministic(
        definition in machine_strategy(),
        input in input_strategy(),
    ) {
        let mut first = Engine::new(Arc::clone(&definition));
        let mut second = Engine::new(definition);
        first.load_str(&input).expect("valid input");
        second.load_str(&input).expect("valid input");

        let mut first_trace: Vec<Configuration> = Vec::new();
        let mut second_trace: Vec<Configuration> = Vec::new();
        let first_report = first.run(200, &mut first_trace);
        let second_report = second.run(200, &mut second_trace);

        prop_assert_eq!(first_report, second_report);
        prop_assert_eq!(first_trace, second_trace);
    }

    #[test]
    fn property_tape_grows_by_at_most_one_cell(
        definition in machine_strategy(),
        input in input_strategy(),
    ) {
        let mut engine = Engine::new(definition);
        engine.load_str(&input).expect("valid input");

        for _ in 0..200 {
            let before = engine.tape().len();
            if !engine.step() {
                break;
            }
            let after = engine.tape().len();
            // The very first write on an empty tape materializes the scanned
            // cell before the move can add its own blank.
            let allowed = if before == 0 { 2 } else { 1 };
            prop_assert!(after >= before);
            prop_assert!(after - before <= allowed);
            prop_assert!(engine.head() < after);
        }
    }

    #[test]
    fn property_halting_step_leaves_state_unchanged(
        definition in machine_strategy(),
        input in input_strategy(),
    ) {
        let mut engine = Engine::new(definition);
        engine.load_str(&input).expect("valid input");

        for _ in 0..200 {
            let before = engine.describe_configuration();
            let tape_before = engine.tape().clone();
            if !engine.step() {
                prop_assert_eq!(engine.describe_configuration(), before);
                prop_assert_eq!(engine.tape(), &tape_before);
                prop_assert_eq!(engine.run_state(), RunState::Halted);
                break;
            }
        }
    }

    #[test]
    fn property_load_is_idempotent(
        definition in machine_strategy(),
        input in input_strategy(),
        noise in input_strategy(),
    ) {
        let mut once = Engine::new(Arc::clone(&definition));
        once.load_str(&input).expect("valid input");

        let mut twice = Engine::new(definition);
        twice.load_str(&noise).expect("valid input");
        twice.run(20, &mut NullSink);
        twice.load_str(&input).expect("valid input");
        twice.load_str(&input).expect("valid input");

        prop_assert_eq!(once, twice);
    }

    #[test]
    fn property_run_respects_step_bound(
        definition in machine_strategy(),
        input in input_strategy(),
        max_steps in 0_u64..64,
    ) {
        let mut engine = Engine::new(definition);
        engine.load_str(&input).expect("valid input");

        let mut sink = CountingSink::default();
        let report = engine.run(max_steps, &mut sink);

        prop_assert!(report.steps <= max_steps);
        prop_assert!(sink.configurations <= max_steps);
        prop_assert_eq!(engine.steps(), report.steps);
        if report.outcome == Outcome::Indeterminate {
            prop_assert_eq!(report.steps, max_steps);
        }
    }
}
