//! Property tests over random append/flush sequences.

use brook_core::testing::RecordingSink;
use brook_core::{BufferDispatcher, LevelThresholdEvaluator, TriggerEvaluator};
use brook_event::{Event, Level};
use proptest::prelude::*;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Op {
    Append(Level),
    Flush(bool),
}

fn level() -> impl Strategy<Value = Level> {
    prop::sample::select(Level::ALL.to_vec())
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        8 => level().prop_map(Op::Append),
        1 => any::<bool>().prop_map(Op::Flush),
    ]
}

fn threshold() -> impl Strategy<Value = Option<Level>> {
    prop::option::of(level())
}

fn evaluator(level: Option<Level>) -> Option<Arc<dyn TriggerEvaluator>> {
    level.map(|l| Arc::new(LevelThresholdEvaluator::new(l)) as Arc<dyn TriggerEvaluator>)
}

fn run(
    capacity: usize,
    lossy: bool,
    primary: Option<Level>,
    secondary: Option<Level>,
    ops: &[Op],
) -> (BufferDispatcher, Arc<RecordingSink>, usize) {
    let mut builder = BufferDispatcher::builder("prop")
        .buffer_size(capacity)
        .lossy(lossy);
    if let Some(ev) = evaluator(primary) {
        builder = builder.evaluator(ev);
    }
    if let Some(ev) = evaluator(secondary) {
        builder = builder.lossy_evaluator(ev);
    }
    let d = builder.build().expect("valid");
    let sink = RecordingSink::shared("rec");
    d.sinks().attach(sink.clone());

    let mut appended = 0;
    for op in ops {
        match op {
            Op::Append(level) => {
                d.append(Event::new(*level, "prop", appended.to_string()))
                    .expect("append");
                appended += 1;
                assert!(d.len() <= capacity);
            }
            Op::Flush(force) => {
                d.flush(*force).expect("flush");
            }
        }
    }
    (d, sink, appended)
}

fn sequence(sink: &RecordingSink) -> Vec<usize> {
    sink.all_messages()
        .iter()
        .map(|m| m.parse().expect("numeric message"))
        .collect()
}

proptest! {
    #[test]
    fn non_lossy_delivers_everything_in_order(
        capacity in 1usize..8,
        primary in threshold(),
        ops in prop::collection::vec(op(), 0..80),
    ) {
        let (d, sink, appended) = run(capacity, false, primary, None, &ops);
        d.close().expect("close");
        let expected: Vec<usize> = (0..appended).collect();
        prop_assert_eq!(sequence(&sink), expected);
        prop_assert!(sink.batches().iter().all(|b| !b.is_empty()));
        prop_assert_eq!(d.stats().discarded, 0);
    }

    #[test]
    fn lossy_batches_are_ordered_and_conserved(
        capacity in 1usize..8,
        primary in threshold(),
        secondary in threshold(),
        ops in prop::collection::vec(op(), 0..80),
    ) {
        let (d, sink, appended) = run(capacity, true, primary, secondary, &ops);
        d.close().expect("close");

        let delivered = sequence(&sink);
        prop_assert!(delivered.windows(2).all(|w| w[0] < w[1]));

        let stats = d.stats();
        prop_assert_eq!(stats.forwarded + stats.discarded, appended as u64);
        prop_assert_eq!(delivered.len() as u64, stats.forwarded);
        prop_assert!(d.is_empty());
    }

    #[test]
    fn lossy_without_secondary_sends_only_at_trigger(
        capacity in 2usize..8,
        ops in prop::collection::vec(op(), 0..80),
    ) {
        let (d, sink, _) = run(capacity, true, Some(Level::Error), None, &ops);
        for batch in sink.batches() {
            prop_assert!(batch.len() <= capacity);
            let last = batch.last().map(|e| e.level());
            prop_assert!(last.is_some_and(|l| l >= Level::Error));
        }
        d.close().expect("close");
        prop_assert!(sink.batches().iter().all(|b| b.len() <= capacity));
    }
}
