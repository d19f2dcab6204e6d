#![no_main]

use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use machine_core::{Direction, Engine, MachineBuilder, NullSink, Rule, Symbol};

const STATES: [&str; 3] = ["q0", "q1", "q2"];
const MARKS: [char; 2] = ['0', '1'];
const MAX_STEPS: u64 = 256;

fn symbol(byte: u8) -> Symbol {
    match byte % 3 {
        0 => Symbol::Blank,
        n => Symbol::Mark(MARKS[usize::from(n - 1)]),
    }
}

fn direction(byte: u8) -> Direction {
    match byte % 3 {
        0 => Direction::Left,
        1 => Direction::Right,
        _ => Direction::Stay,
    }
}

fuzz_target!(|data: &[u8]| {
    let Some((&input_len, rest)) = data.split_first() else {
        return;
    };
    let input_len = usize::from(input_len % 8).min(rest.len());
    let (input, rule_bytes) = rest.split_at(input_len);

    let rules = rule_bytes.chunks_exact(7).map(|chunk| {
        Rule::new(
            STATES[usize::from(chunk[0]) % STATES.len()],
            symbol(chunk[1]),
            symbol(chunk[2]),
            STATES[usize::from(chunk[3]) % STATES.len()],
            symbol(chunk[4]),
            symbol(chunk[5]),
            direction(chunk[6]),
        )
    });

    // Duplicate keys are a definition error, not a crash.
    let Ok(definition) = MachineBuilder::new("q0")
        .states(STATES)
        .input_alphabet(MARKS)
        .tape_alphabet(MARKS)
        .final_states(["q2"])
        .rules(rules)
        .build()
    else {
        return;
    };

    let mut engine = Engine::new(Arc::new(definition));
    engine.load(input.iter().map(|&b| Symbol::Mark(MARKS[usize::from(b % 2)])));

    let mut previous = engine.tape().len();
    while engine.steps() < MAX_STEPS && engine.step() {
        let len = engine.tape().len();
        assert!(len <= previous + 1 || (previous == 0 && len == 2));
        assert!(engine.head() < len);
        previous = len;
    }

    engine.load(input.iter().map(|&b| Symbol::Mark(MARKS[usize::from(b % 2)])));
    let report = engine.run(MAX_STEPS, &mut NullSink);
    assert!(report.steps <= MAX_STEPS);
});
