// tests/edge_streams.rs

mod common;
use crate::common::{init_tracing, run_to_completion};

use sluice::exchange::Inbox;
use sluice::processor::map;
use sluice::progress::ProgressState;
use sluice::stream::{channel_edge, InboundEdgeStream, IterInboundStream};
use sluice::tasklet::{ProcessorTasklet, Tasklet};

#[test]
fn iter_stream_hands_out_bounded_batches() {
    let mut stream = IterInboundStream::new(1..=5, 3, -1, 2);
    let mut inbox = Inbox::new();

    assert_eq!(stream.ordinal(), 3);
    assert_eq!(stream.priority(), -1);

    assert_eq!(stream.drain_to(&mut inbox).unwrap(), ProgressState::MadeProgress);
    assert_eq!(inbox.len(), 2);
    assert_eq!(stream.drain_to(&mut inbox).unwrap(), ProgressState::MadeProgress);
    assert_eq!(stream.drain_to(&mut inbox).unwrap(), ProgressState::Done);
    assert_eq!(stream.drain_to(&mut inbox).unwrap(), ProgressState::WasAlreadyDone);

    let drained: Vec<i32> = inbox.drain().collect();
    assert_eq!(drained, vec![1, 2, 3, 4, 5]);
}

#[test]
fn channel_edge_reports_backpressure_and_disconnect() {
    let (mut tx, mut rx) = channel_edge::<&str>(2, 0, 1, 0);
    let mut inbox = Inbox::new();

    assert_eq!(rx.drain_to(&mut inbox).unwrap(), ProgressState::NoProgress);

    assert_eq!(tx.collector().offer(&"a").unwrap(), ProgressState::Done);
    assert_eq!(tx.collector().offer(&"b").unwrap(), ProgressState::Done);
    assert_eq!(tx.collector().offer(&"c").unwrap(), ProgressState::NoProgress);

    assert_eq!(rx.drain_to(&mut inbox).unwrap(), ProgressState::MadeProgress);
    assert_eq!(tx.collector().offer(&"c").unwrap(), ProgressState::Done);

    assert_eq!(tx.collector().close().unwrap(), ProgressState::Done);
    assert_eq!(tx.collector().close().unwrap(), ProgressState::WasAlreadyDone);
    assert!(tx.collector().offer(&"d").is_err());

    assert_eq!(rx.drain_to(&mut inbox).unwrap(), ProgressState::Done);
    assert_eq!(rx.drain_to(&mut inbox).unwrap(), ProgressState::WasAlreadyDone);
    assert_eq!(inbox.iter().copied().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    assert_eq!(rx.ordinal(), 1);
}

#[test]
fn channel_batch_limit_caps_each_drain() {
    let (mut tx, rx) = channel_edge::<u8>(8, 0, 0, 0);
    let mut rx = rx.with_batch_limit(2);
    for i in 0..5 {
        tx.collector().offer(&i).unwrap();
    }

    let mut inbox = Inbox::new();
    rx.drain_to(&mut inbox).unwrap();
    assert_eq!(inbox.len(), 2);
    rx.drain_to(&mut inbox).unwrap();
    assert_eq!(inbox.len(), 4);
}

#[test]
fn offer_to_dropped_receiver_fails() {
    let (mut tx, rx) = channel_edge::<u8>(1, 0, 0, 0);
    drop(rx);

    let err = tx.collector().offer(&1).unwrap_err();
    assert!(err.to_string().contains("dropped"));
}

#[test]
fn two_tasklets_connected_by_a_channel_edge() {
    init_tracing();

    let (edge_out, edge_in) = channel_edge::<String>(1, 0, 0, 0);
    let (sink_out, mut sink_in) = channel_edge::<String>(16, 0, 0, 0);

    let mut upstream = ProcessorTasklet::builder()
        .name("upper")
        .processor(map(|s: &String| s.to_uppercase()))
        .inbound(IterInboundStream::new(
            ["x", "y", "z"].map(String::from),
            0,
            0,
            8,
        ))
        .outbound(edge_out)
        .build()
        .unwrap();
    let mut downstream = ProcessorTasklet::builder()
        .name("suffix")
        .processor(map(|s: &String| format!("{s}!")))
        .inbound(edge_in)
        .outbound(sink_out)
        .build()
        .unwrap();

    upstream.init().unwrap();
    downstream.init().unwrap();

    let mut up_done = false;
    let mut down_done = false;
    for _ in 0..100 {
        if !up_done {
            up_done = upstream.tick().unwrap().is_done();
        }
        if !down_done {
            down_done = downstream.tick().unwrap().is_done();
        }
        if up_done && down_done {
            break;
        }
    }
    assert!(up_done && down_done);

    let mut inbox = Inbox::new();
    assert_eq!(sink_in.drain_to(&mut inbox).unwrap(), ProgressState::Done);
    let out: Vec<String> = inbox.drain().collect();
    assert_eq!(out, vec!["X!", "Y!", "Z!"]);
}

#[test]
fn processor_with_no_outputs_still_completes() {
    init_tracing();

    let mut tasklet = ProcessorTasklet::builder()
        .processor(map(|x: &u32| x * 2))
        .inbound(IterInboundStream::new(0..10u32, 0, 0, 4))
        .build()
        .unwrap();

    let states = run_to_completion(&mut tasklet, 20);
    assert_eq!(states.last(), Some(&ProgressState::Done));
    assert!(tasklet.is_finished());
}
