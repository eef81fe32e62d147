// tests/engine_run.rs

mod common;
use crate::common::builders::{ConfigFileBuilder, SourceConfigBuilder};
use crate::common::fakes::{
    RecordingCollector, RecordingProcessor, ScriptedInboundStream, SharedBuffer,
};
use crate::common::{init_tracing, with_timeout};

use std::time::Duration;

use sluice::engine::{EngineOptions, ExecutionService};
use sluice::errors::SluiceError;
use sluice::job::Job;
use sluice::progress::ProgressState;
use sluice::tasklet::{ProcessorTasklet, Tasklet};
use sluice::types::ProcessorKind;

fn fast_options(max_idle_rounds: u64) -> EngineOptions {
    EngineOptions {
        idle_backoff_min: Duration::from_micros(1),
        idle_backoff_max: Duration::from_micros(50),
        max_idle_rounds,
    }
}

/// Never makes progress, never finishes.
struct Stuck;

impl Tasklet for Stuck {
    fn name(&self) -> &str {
        "stuck"
    }

    fn init(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn is_blocking(&self) -> bool {
        false
    }

    fn tick(&mut self) -> anyhow::Result<ProgressState> {
        Ok(ProgressState::NoProgress)
    }
}

#[tokio::test]
async fn uppercase_job_writes_every_item_to_every_sink() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_source(SourceConfigBuilder::new("backfill").priority(1).items(&["c"]).build())
        .with_source(
            SourceConfigBuilder::new("primary")
                .items(&["a", "b"])
                .batch_size(1)
                .build(),
        )
        .processor_kind(ProcessorKind::Uppercase)
        .with_sink("left", 0)
        .with_sink_capacity("right", 1, 1)
        .build();

    let buffers = [SharedBuffer::new(), SharedBuffer::new()];
    let job = Job::from_config_with_writers(&cfg, |sink| buffers[sink.ordinal].clone()).unwrap();
    assert_eq!(job.tasklet_names(), vec!["processor", "left", "right"]);

    with_timeout(job.run()).await.unwrap();

    assert_eq!(buffers[0].lines(), vec!["[left] A", "[left] B", "[left] C"]);
    assert_eq!(buffers[1].lines(), vec!["[right] A", "[right] B", "[right] C"]);
}

#[tokio::test]
async fn count_job_with_blocking_processor_reports_per_ordinal_totals() {
    init_tracing();

    let cfg = ConfigFileBuilder::new()
        .with_source(SourceConfigBuilder::new("one").items(&["x", "y", "x"]).build())
        .with_source(
            SourceConfigBuilder::new("two")
                .ordinal(1)
                .items(&["y", "z"])
                .build(),
        )
        .processor_kind(ProcessorKind::Count)
        .blocking_processor(true)
        .with_sink("out", 0)
        .build();

    let buffer = SharedBuffer::new();
    let job = Job::from_config_with_writers(&cfg, |_| buffer.clone()).unwrap();

    with_timeout(job.run()).await.unwrap();

    assert_eq!(
        buffer.lines(),
        vec![
            "[out] x observed [2, 0] times",
            "[out] y observed [1, 1] times",
            "[out] z observed [0, 1] times",
        ]
    );
}

#[test]
fn job_sinks_are_blocking_and_the_processor_follows_its_config() {
    let cfg = ConfigFileBuilder::new()
        .with_source(SourceConfigBuilder::new("one").items(&["a"]).build())
        .with_sink("left", 0)
        .with_sink("right", 1)
        .build();

    let tasklets = Job::from_config_with_writers(&cfg, |_| SharedBuffer::new())
        .unwrap()
        .into_tasklets();
    let flags: Vec<(&str, bool)> = tasklets.iter().map(|t| (t.name(), t.is_blocking())).collect();
    assert_eq!(
        flags,
        vec![("processor", false), ("left", true), ("right", true)]
    );

    let blocking_cfg = ConfigFileBuilder::new()
        .with_sink("out", 0)
        .blocking_processor(true)
        .build();
    let tasklets = Job::from_config_with_writers(&blocking_cfg, |_| SharedBuffer::new())
        .unwrap()
        .into_tasklets();
    assert!(tasklets.iter().all(|t| t.is_blocking()));
}

#[tokio::test]
async fn job_without_sources_completes_immediately() {
    init_tracing();

    let cfg = ConfigFileBuilder::new().with_sink("out", 0).build();
    let buffer = SharedBuffer::new();
    let job = Job::from_config_with_writers(&cfg, |_| buffer.clone()).unwrap();

    with_timeout(job.run()).await.unwrap();
    assert!(buffer.contents().is_empty());
}

#[tokio::test]
async fn idle_worker_fails_as_stalled() {
    init_tracing();

    let service = ExecutionService::new(fast_options(5));
    let tasklets: Vec<Box<dyn Tasklet>> = vec![Box::new(Stuck)];
    let result = with_timeout(service.run(tasklets)).await;

    match result {
        Err(SluiceError::Stalled { live, rounds }) => {
            assert_eq!(live, 1);
            assert_eq!(rounds, 5);
        }
        Err(e) => panic!("Expected Stalled error, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[tokio::test]
async fn tasklet_error_stops_the_service_and_keeps_its_cause() {
    init_tracing();

    let (collector, _probe) = RecordingCollector::<i32>::new();
    let failing = ProcessorTasklet::builder()
        .name("fragile")
        .processor(RecordingProcessor::new().fail_on_process("boom"))
        .inbound(ScriptedInboundStream::from_items("src", 0, 0, [1]))
        .outbound(collector.edge(0))
        .build()
        .unwrap();

    let service = ExecutionService::new(fast_options(0));
    let tasklets: Vec<Box<dyn Tasklet>> = vec![Box::new(failing), Box::new(Stuck)];
    let result = with_timeout(service.run(tasklets)).await;

    match result {
        Err(SluiceError::Other(err)) => {
            assert_eq!(err.root_cause().to_string(), "boom");
            assert!(format!("{err:#}").contains("fragile"));
        }
        Err(e) => panic!("Expected tasklet failure, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[tokio::test]
async fn blocking_tasklets_run_off_the_cooperative_worker() {
    init_tracing();

    let (collector, probe) = RecordingCollector::new();
    let blocking = ProcessorTasklet::builder()
        .name("blocking")
        .processor(RecordingProcessor::new().blocking(true))
        .inbound(ScriptedInboundStream::from_items("src", 0, 0, [1, 2, 3]))
        .outbound(collector.edge(0))
        .build()
        .unwrap();
    assert!(blocking.is_blocking());

    let service = ExecutionService::new(fast_options(0));
    let tasklets: Vec<Box<dyn Tasklet>> = vec![Box::new(blocking)];
    with_timeout(service.run(tasklets)).await.unwrap();

    assert_eq!(probe.items(), vec![1, 2, 3]);
    assert!(probe.is_closed());
}
