use std::sync::Arc;

use clap::{builder::PossibleValue, ValueEnum};

use super::device::{open_device, ComputeDevice, DeviceBackend};
use super::reduce::reduce;
use super::worker_pool::WorkerPool;
use super::{CandidateTable, EvaluationResult};
use crate::arena::{ScratchArena, SlotRegion};
use crate::huffman::HuffmanSpec;
use crate::image::blocks::DataUnit;
use crate::quantization::QuantizationTable;
use crate::Result;

/// Something that evaluates every block of the image for one candidate.
///
/// `dispatch` starts the work, `collect` returns once every slot of the
/// region holds its block's result.
pub trait EvaluationBackend {
    fn name(&self) -> &str;
    fn block_count(&self) -> usize;
    fn dispatch(&mut self, candidate: Arc<CandidateTable>, region: &SlotRegion) -> Result<()>;
    fn collect(&mut self, region: &SlotRegion) -> Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Cpu,
    Device,
}

impl ValueEnum for Backend {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Cpu, Self::Device]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(match self {
            Self::Cpu => PossibleValue::new("cpu").help("Thread pool on the host"),
            Self::Device => PossibleValue::new("device")
                .alias("gpu")
                .help("GPU compute shader, one invocation per block"),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Dispatched,
    Collecting,
    Reduced,
}

/// Evaluates candidate tables one at a time against a fixed set of blocks.
pub struct BatchEvaluator {
    backend: Box<dyn EvaluationBackend>,
    arena: ScratchArena,
    state: BatchState,
}

impl BatchEvaluator {
    pub fn new(blocks: Vec<DataUnit>, backend: Backend, threads: usize) -> Result<Self> {
        let ac_table = &HuffmanSpec::standard().luma_ac;
        let backend: Box<dyn EvaluationBackend> = match backend {
            Backend::Cpu => Box::new(WorkerPool::new(threads, blocks.into(), ac_table)),
            Backend::Device => return Self::with_device(open_device()?, &blocks),
        };
        Ok(Self::with_backend(backend))
    }

    pub fn with_device(device: Box<dyn ComputeDevice>, blocks: &[DataUnit]) -> Result<Self> {
        let ac_table = &HuffmanSpec::standard().luma_ac;
        Ok(Self::with_backend(Box::new(DeviceBackend::new(device, blocks, ac_table)?)))
    }

    pub fn with_backend(backend: Box<dyn EvaluationBackend>) -> Self {
        let arena = ScratchArena::with_capacity(backend.block_count());
        log::debug!(
            "Batch evaluator on '{}' with {} result slots",
            backend.name(),
            arena.capacity()
        );
        BatchEvaluator {
            backend,
            arena,
            state: BatchState::Idle,
        }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn block_count(&self) -> usize {
        self.backend.block_count()
    }

    pub fn evaluate(&mut self, table: &QuantizationTable) -> Result<EvaluationResult> {
        let result = self.run(table);
        self.transition(BatchState::Idle);
        result
    }

    fn run(&mut self, table: &QuantizationTable) -> Result<EvaluationResult> {
        self.arena.reset();
        let region = self.arena.allocate(self.backend.block_count())?;
        let candidate = Arc::new(CandidateTable::from(table));

        self.transition(BatchState::Dispatched);
        self.backend.dispatch(candidate, &region)?;
        self.transition(BatchState::Collecting);
        self.backend.collect(&region)?;
        let result = reduce(&region);
        self.transition(BatchState::Reduced);
        log::trace!("{} bits, error {}", result.bits, result.error);
        Ok(result)
    }

    fn transition(&mut self, next: BatchState) {
        log::trace!("{:?} -> {:?}", self.state, next);
        self.state = next;
    }
}
