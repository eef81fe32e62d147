use std::collections::BTreeMap;

use proptest::prelude::*;
use sluice::tasklet::{ProcessorTasklet, Tasklet};

use crate::common::fakes::{RecordingCollector, RecordingProcessor, ScriptedInboundStream};

/// Item tagged with the stream it came from and its position in that stream.
type Tagged = (usize, usize);

#[derive(Debug, Clone)]
struct StreamPlan {
    priority: i32,
    /// `None` is a drain that delivers nothing.
    batches: Vec<Option<usize>>,
}

#[derive(Debug, Clone)]
struct Plan {
    streams: Vec<StreamPlan>,
    high_water_mark: usize,
    take_per_call: usize,
    fan_out: usize,
    burst: usize,
}

fn plan_strategy() -> impl Strategy<Value = Plan> {
    let stream = (
        0..3i32,
        proptest::collection::vec(proptest::option::weighted(0.8, 0..5usize), 0..6),
    )
        .prop_map(|(priority, batches)| StreamPlan { priority, batches });

    (
        proptest::collection::vec(stream, 0..5),
        1..6usize,
        1..4usize,
        1..3usize,
        1..4usize,
    )
        .prop_map(|(streams, high_water_mark, take_per_call, fan_out, burst)| Plan {
            streams,
            high_water_mark,
            take_per_call,
            fan_out,
            burst,
        })
}

/// Build the scripted streams and the items each of them will deliver.
fn scripted_streams(plan: &Plan) -> (Vec<ScriptedInboundStream<Tagged>>, Vec<Vec<Tagged>>) {
    let mut streams = Vec::new();
    let mut expected = Vec::new();
    for (index, stream_plan) in plan.streams.iter().enumerate() {
        let mut stream = ScriptedInboundStream::new(&format!("s{index}"), index, stream_plan.priority);
        let mut items = Vec::new();
        for batch in stream_plan.batches.iter() {
            match batch {
                Some(len) => {
                    let start = items.len();
                    let batch: Vec<Tagged> = (start..start + len).map(|seq| (index, seq)).collect();
                    items.extend(batch.iter().copied());
                    stream = stream.items(batch);
                }
                None => stream = stream.idle(),
            }
        }
        streams.push(stream);
        expected.push(items);
    }
    (streams, expected)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn every_item_is_delivered_once_in_stream_order(plan in plan_strategy()) {
        let (streams, expected) = scripted_streams(&plan);
        let (collector, probe) = RecordingCollector::new();

        let mut builder = ProcessorTasklet::builder()
            .processor(
                RecordingProcessor::new()
                    .take_per_call(plan.take_per_call)
                    .fan_out(plan.fan_out),
            )
            .outbound(collector.with_burst(plan.burst).edge(0))
            .high_water_mark(plan.high_water_mark);
        for stream in streams {
            builder = builder.inbound(stream);
        }
        let mut tasklet = builder.build().unwrap();
        tasklet.init().unwrap();

        let mut done_ticks = 0;
        for _ in 0..10_000 {
            if tasklet.tick().unwrap().is_done() {
                done_ticks += 1;
                break;
            }
        }
        prop_assert_eq!(done_ticks, 1);
        prop_assert!(tasklet.is_finished());
        prop_assert_eq!(probe.close_calls(), 1);

        // Per stream: every item exactly `fan_out` times, in order.
        let delivered = probe.items();
        let mut per_stream: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (stream, seq) in delivered.iter().copied() {
            per_stream.entry(stream).or_default().push(seq);
        }
        for (index, items) in expected.iter().enumerate() {
            let want: Vec<usize> = items
                .iter()
                .flat_map(|(_, seq)| std::iter::repeat(*seq).take(plan.fan_out))
                .collect();
            let got = per_stream.remove(&index).unwrap_or_default();
            prop_assert_eq!(got, want, "stream {}", index);
        }
        prop_assert!(per_stream.is_empty());

        let edges = tasklet.processor().complete_edge_calls();
        prop_assert_eq!(edges.len(), plan.streams.len());
    }

    #[test]
    fn higher_priority_input_is_always_processed_first(plan in plan_strategy()) {
        let (streams, _) = scripted_streams(&plan);
        let (collector, _probe) = RecordingCollector::new();

        let mut builder = ProcessorTasklet::builder()
            .processor(RecordingProcessor::new().take_per_call(plan.take_per_call))
            .outbound(collector.edge(0))
            .high_water_mark(plan.high_water_mark);
        for stream in streams {
            builder = builder.inbound(stream);
        }
        let mut tasklet = builder.build().unwrap();
        tasklet.init().unwrap();

        for _ in 0..10_000 {
            if tasklet.tick().unwrap().is_done() {
                break;
            }
        }
        prop_assert!(tasklet.is_finished());

        let priorities: Vec<i32> = tasklet
            .processor()
            .processed()
            .into_iter()
            .map(|(ordinal, _)| plan.streams[ordinal].priority)
            .collect();
        prop_assert!(
            priorities.windows(2).all(|w| w[0] <= w[1]),
            "priorities out of order: {:?}",
            priorities
        );
    }
}
