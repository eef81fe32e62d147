// src/tasklet/builder.rs

use crate::config::TaskletSection;
use crate::errors::{Result, SluiceError};
use crate::processor::Processor;
use crate::stream::{InboundEdgeStream, OutboundEdgeStream};
use crate::types::DEFAULT_HIGH_WATER_MARK;

use super::processor_tasklet::{BoxedInbound, ProcessorTasklet};

/// Step-by-step assembly of a [`ProcessorTasklet`].
///
/// ```ignore
/// let tasklet = ProcessorTasklet::builder()
///     .name("upper")
///     .processor(map(|s: &String| s.to_uppercase()))
///     .inbound(source)
///     .outbound(sink)
///     .high_water_mark(256)
///     .build()?;
/// ```
pub struct ProcessorTaskletBuilder<P: Processor> {
    name: Option<String>,
    processor: Option<P>,
    inbound: Vec<BoxedInbound<P::In>>,
    outbound: Vec<OutboundEdgeStream<P::Out>>,
    high_water_mark: usize,
    blocking: bool,
}

impl<P: Processor> ProcessorTaskletBuilder<P> {
    pub fn new() -> Self {
        Self {
            name: None,
            processor: None,
            inbound: Vec::new(),
            outbound: Vec::new(),
            high_water_mark: DEFAULT_HIGH_WATER_MARK,
            blocking: false,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn processor(mut self, processor: P) -> Self {
        self.processor = Some(processor);
        self
    }

    pub fn inbound(mut self, stream: impl InboundEdgeStream<P::In> + 'static) -> Self {
        self.inbound.push(Box::new(stream));
        self
    }

    pub fn inbound_boxed(mut self, stream: BoxedInbound<P::In>) -> Self {
        self.inbound.push(stream);
        self
    }

    pub fn outbound(mut self, stream: OutboundEdgeStream<P::Out>) -> Self {
        self.outbound.push(stream);
        self
    }

    pub fn high_water_mark(mut self, high_water_mark: usize) -> Self {
        self.high_water_mark = high_water_mark;
        self
    }

    /// Run on a dedicated thread regardless of what the processor reports.
    pub fn blocking(mut self, blocking: bool) -> Self {
        self.blocking = blocking;
        self
    }

    /// Apply a `[tasklet]` config section.
    pub fn with_config(self, section: &TaskletSection) -> Self {
        self.high_water_mark(section.high_water_mark)
    }

    pub fn build(self) -> Result<ProcessorTasklet<P>> {
        let name = self.name.unwrap_or_else(|| "tasklet".to_string());
        let processor = self
            .processor
            .ok_or_else(|| SluiceError::MissingProcessor(name.clone()))?;
        let tasklet = ProcessorTasklet::from_parts(
            name,
            processor,
            self.inbound,
            self.outbound,
            self.high_water_mark,
        )?;
        Ok(tasklet.force_blocking(self.blocking))
    }
}

impl<P: Processor> Default for ProcessorTaskletBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}
