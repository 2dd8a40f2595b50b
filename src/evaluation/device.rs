use std::sync::Arc;

use super::batch::EvaluationBackend;
use super::{evaluate_block, CandidateTable};
use crate::arena::SlotRegion;
use crate::error::Error;
use crate::huffman::HuffmanTable;
use crate::image::blocks::DataUnit;
use crate::Result;

mod gpu;

pub use gpu::WgpuDevice;

/// An accelerator that runs the block kernel with one work item per block.
///
/// Blocks and the entropy table are uploaded once; every candidate only
/// uploads its table before a dispatch. Results come back through host
/// buffers indexed by block.
pub trait ComputeDevice: Send {
    fn name(&self) -> &str;
    fn upload_blocks(&mut self, blocks: &[DataUnit], ac_table: &HuffmanTable) -> Result<()>;
    fn upload_table(&mut self, candidate: &CandidateTable) -> Result<()>;
    /// Runs the kernel and reads back into `bits` and `errors`, which must
    /// have one entry per uploaded block.
    fn dispatch(&mut self, bits: &mut [u32], errors: &mut [u64]) -> Result<()>;
}

/// Runs the kernel on the calling thread, one work item after another.
/// Produces the reference numbers a real device is checked against.
#[derive(Default)]
pub struct HostDevice {
    blocks: Vec<DataUnit>,
    ac_table: Option<HuffmanTable>,
    candidate: Option<CandidateTable>,
}

impl HostDevice {
    fn work_item(&self, id: usize, candidate: &CandidateTable, ac_table: &HuffmanTable) -> (u32, u64) {
        let result = evaluate_block(&self.blocks[id], candidate, ac_table);
        (result.bits, result.error)
    }
}

impl ComputeDevice for HostDevice {
    fn name(&self) -> &str {
        "host"
    }

    fn upload_blocks(&mut self, blocks: &[DataUnit], ac_table: &HuffmanTable) -> Result<()> {
        if blocks.is_empty() {
            return Err(Error::DeviceSetupFailed("no blocks to upload"));
        }
        self.blocks = blocks.to_vec();
        self.ac_table = Some(ac_table.clone());
        Ok(())
    }

    fn upload_table(&mut self, candidate: &CandidateTable) -> Result<()> {
        self.candidate = Some(candidate.clone());
        Ok(())
    }

    fn dispatch(&mut self, bits: &mut [u32], errors: &mut [u64]) -> Result<()> {
        let ac_table = self
            .ac_table
            .as_ref()
            .ok_or(Error::DeviceDispatchFailed("blocks were never uploaded"))?;
        let candidate = self
            .candidate
            .as_ref()
            .ok_or(Error::DeviceDispatchFailed("no quantization table uploaded"))?;
        if bits.len() != self.blocks.len() || errors.len() != self.blocks.len() {
            return Err(Error::DeviceDispatchFailed("result buffers do not match block count"));
        }
        for id in 0..self.blocks.len() {
            let (block_bits, block_error) = self.work_item(id, candidate, ac_table);
            bits[id] = block_bits;
            errors[id] = block_error;
        }
        Ok(())
    }
}

/// Opens the first high performance adapter. A missing adapter or a kernel
/// that does not compile is an error, the worker pool is never used instead.
pub fn open_device() -> Result<Box<dyn ComputeDevice>> {
    let device = WgpuDevice::open()?;
    log::info!("Using compute device '{}'", device.name());
    Ok(Box::new(device))
}

/// Adapts a [`ComputeDevice`] to the batch evaluator. A device failure is
/// returned as is; there is no fallback to the worker pool.
pub struct DeviceBackend {
    device: Box<dyn ComputeDevice>,
    bits: Vec<u32>,
    errors: Vec<u64>,
}

impl DeviceBackend {
    pub fn new(
        mut device: Box<dyn ComputeDevice>,
        blocks: &[DataUnit],
        ac_table: &HuffmanTable,
    ) -> Result<Self> {
        device.upload_blocks(blocks, ac_table)?;
        log::debug!("Uploaded {} blocks to '{}'", blocks.len(), device.name());
        Ok(DeviceBackend {
            device,
            bits: vec![0; blocks.len()],
            errors: vec![0; blocks.len()],
        })
    }
}

impl EvaluationBackend for DeviceBackend {
    fn name(&self) -> &str {
        self.device.name()
    }

    fn block_count(&self) -> usize {
        self.bits.len()
    }

    fn dispatch(&mut self, candidate: Arc<CandidateTable>, _region: &SlotRegion) -> Result<()> {
        self.device.upload_table(&candidate)?;
        self.device.dispatch(&mut self.bits, &mut self.errors)
    }

    fn collect(&mut self, region: &SlotRegion) -> Result<()> {
        for (index, (bits, error)) in self.bits.iter().zip(&self.errors).enumerate() {
            region.store(index, *bits, *error);
        }
        Ok(())
    }
}
