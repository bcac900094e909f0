//! Quick benchmark to verify change-propagation throughput

use std::time::Instant;

use tether::{Binding, BindingRuntime, Object, Value};

fn main() {
    let runtime = BindingRuntime::new();

    // A fan of one-way bindings out of a single source object.
    const BINDINGS: usize = 1_000;
    const ROUNDS: i64 = 1_000;

    let source = Object::new();
    runtime.globals().set("source", source.clone());

    let mut destinations = Vec::with_capacity(BINDINGS);
    for i in 0..BINDINGS {
        let dest = Object::new();
        runtime.globals().set(format!("dest{i}"), dest.clone());
        Binding::template()
            .one_way_from("source.value")
            .to(format!("dest{i}.mirror"))
            .connect(&runtime)
            .expect("connect");
        destinations.push(dest);
    }

    let start = Instant::now();
    for round in 0..ROUNDS {
        source.set("value", round);
        runtime.flush();
    }
    let elapsed = start.elapsed();

    let last = destinations
        .last()
        .map(|d| d.get("mirror"))
        .unwrap_or(Value::Null);
    assert_eq!(last, Value::Int(ROUNDS - 1));

    let applied = BINDINGS as u128 * ROUNDS as u128;
    println!(
        "{} binding applications in {:?} ({:.0} apply/ms)",
        applied,
        elapsed,
        applied as f64 / elapsed.as_millis().max(1) as f64
    );
}
