// src/job.rs

//! Assemble runnable tasklets from a validated job file.
//!
//! The shape is fixed: every `[[source]]` feeds one processor tasklet, and
//! each processor output ordinal is connected by a bounded channel to a
//! line-writing sink tasklet.

use std::fmt;
use std::io::{self, Write};

use tracing::debug;

use crate::config::{ConfigFile, ProcessorSection, SinkConfig, TaskletSection};
use crate::engine::ExecutionService;
use crate::errors::Result;
use crate::processor::{map, CountPerOrdinal, Itemwise, Processor, WriteLines};
use crate::stream::{channel_edge, IterInboundStream, OutboundEdgeStream};
use crate::tasklet::{BoxedInbound, ProcessorTasklet, Tasklet};
use crate::types::ProcessorKind;

/// Tasklets built from one job file, ready to hand to the engine.
pub struct Job {
    tasklets: Vec<Box<dyn Tasklet>>,
    engine: ExecutionService,
}

impl Job {
    /// Build the job with every sink writing to stdout.
    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        Self::from_config_with_writers(cfg, |_| io::stdout())
    }

    /// Build the job, asking `writer_for` for the writer behind each sink.
    pub fn from_config_with_writers<W, F>(cfg: &ConfigFile, mut writer_for: F) -> Result<Self>
    where
        W: Write + Send + 'static,
        F: FnMut(&SinkConfig) -> W,
    {
        let mut outbound = Vec::with_capacity(cfg.sink.len());
        let mut tasklets: Vec<Box<dyn Tasklet>> = Vec::with_capacity(cfg.sink.len() + 1);

        for sink in cfg.sink.iter() {
            let (tx, rx) = channel_edge::<String>(sink.capacity, sink.ordinal, 0, 0);
            outbound.push(tx);

            let writer = WriteLines::<String, W>::new(writer_for(sink))
                .with_prefix(format!("[{}] ", sink.name));
            let tasklet = ProcessorTasklet::builder()
                .name(sink.name.clone())
                .processor(Itemwise::new(writer))
                .inbound(rx)
                .with_config(&cfg.tasklet)
                .build()?;
            tasklets.push(Box::new(tasklet));
        }

        let inbound: Vec<BoxedInbound<String>> = cfg
            .source
            .iter()
            .map(|source| {
                Box::new(IterInboundStream::new(
                    source.items.clone(),
                    source.ordinal,
                    source.priority,
                    source.batch_size,
                )) as BoxedInbound<String>
            })
            .collect();

        let processor = build_processor_tasklet(&cfg.processor, &cfg.tasklet, inbound, outbound)?;
        tasklets.insert(0, processor);

        debug!(
            sources = cfg.source.len(),
            sinks = cfg.sink.len(),
            processor = ?cfg.processor.kind,
            "job assembled"
        );

        Ok(Self {
            tasklets,
            engine: ExecutionService::from_config(&cfg.engine),
        })
    }

    pub fn tasklet_names(&self) -> Vec<&str> {
        self.tasklets.iter().map(|t| t.name()).collect()
    }

    pub fn into_tasklets(self) -> Vec<Box<dyn Tasklet>> {
        self.tasklets
    }

    /// Run every tasklet of the job to completion.
    pub async fn run(self) -> Result<()> {
        self.engine.run(self.tasklets).await
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("tasklets", &self.tasklet_names())
            .field("engine", &self.engine)
            .finish()
    }
}

fn build_processor_tasklet(
    section: &ProcessorSection,
    tasklet: &TaskletSection,
    inbound: Vec<BoxedInbound<String>>,
    outbound: Vec<OutboundEdgeStream<String>>,
) -> Result<Box<dyn Tasklet>> {
    match section.kind {
        ProcessorKind::Identity => assemble(
            section,
            tasklet,
            map(|item: &String| item.clone()),
            inbound,
            outbound,
        ),
        ProcessorKind::Uppercase => assemble(
            section,
            tasklet,
            map(|item: &String| item.to_uppercase()),
            inbound,
            outbound,
        ),
        ProcessorKind::Count => assemble(
            section,
            tasklet,
            Itemwise::new(CountPerOrdinal::<String>::new()),
            inbound,
            outbound,
        ),
    }
}

fn assemble<P>(
    section: &ProcessorSection,
    tasklet: &TaskletSection,
    processor: P,
    inbound: Vec<BoxedInbound<String>>,
    outbound: Vec<OutboundEdgeStream<String>>,
) -> Result<Box<dyn Tasklet>>
where
    P: Processor<In = String, Out = String> + 'static,
{
    let mut builder = ProcessorTasklet::builder()
        .name(section.name.clone())
        .processor(processor)
        .with_config(tasklet)
        .blocking(section.blocking);
    for stream in inbound {
        builder = builder.inbound_boxed(stream);
    }
    for stream in outbound {
        builder = builder.outbound(stream);
    }
    Ok(Box::new(builder.build()?))
}
