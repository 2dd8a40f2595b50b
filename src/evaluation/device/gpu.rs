use std::borrow::Cow;
use std::sync::mpsc;

use super::ComputeDevice;
use crate::error::Error;
use crate::evaluation::CandidateTable;
use crate::huffman::HuffmanTable;
use crate::image::blocks::DataUnit;
use crate::quantization::BLOCK_SIZE;
use crate::Result;

const WORKGROUP_SIZE: u32 = 64;
const MAX_WORKGROUPS_PER_DIMENSION: u32 = 65535;
const WORD: u64 = std::mem::size_of::<u32>() as u64;

/// Buffers that live as long as the uploaded image.
struct BlockBuffers {
    block_count: u32,
    scales: wgpu::Buffer,
    entries: wgpu::Buffer,
    bits: wgpu::Buffer,
    errors: wgpu::Buffer,
    readback: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Runs the block kernel as a compute shader, one invocation per block.
pub struct WgpuDevice {
    name: String,
    device: wgpu::Device,
    queue: wgpu::Queue,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline: wgpu::ComputePipeline,
    buffers: Option<BlockBuffers>,
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

impl WgpuDevice {
    pub fn open() -> Result<Self> {
        pollster::block_on(Self::open_async())
    }

    async fn open_async() -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(Error::DeviceSetupFailed("no compute adapter found"))?;
        let info = adapter.get_info();
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("evaluation-device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .map_err(|error| {
                log::error!("Requesting device from '{}' failed: {}", info.name, error);
                Error::DeviceSetupFailed("device request rejected")
            })?;
        device.on_uncaptured_error(Box::new(|error: wgpu::Error| {
            log::error!("Uncaptured device error: {}", error);
        }));

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("evaluate-block-shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("evaluate_block.wgsl"))),
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("evaluate-block-bgl"),
            entries: &[
                // samples
                storage_entry(0, true),
                // processed table
                storage_entry(1, true),
                // table entries
                storage_entry(2, true),
                // AC code lengths
                storage_entry(3, true),
                storage_entry(4, false),
                storage_entry(5, false),
            ],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("evaluate-block-layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("evaluate-block-pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: "evaluate_block",
        });
        if let Some(error) = device.pop_error_scope().await {
            log::error!("Compiling the block kernel failed: {}", error);
            return Err(Error::DeviceSetupFailed("block kernel did not compile"));
        }

        log::debug!("Opened {:?} adapter '{}'", info.backend, info.name);
        Ok(WgpuDevice {
            name: info.name,
            device,
            queue,
            bind_group_layout,
            pipeline,
            buffers: None,
        })
    }

    fn storage_buffer(&self, label: &str, size: u64, usage: wgpu::BufferUsages) -> wgpu::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::STORAGE | usage,
            mapped_at_creation: false,
        })
    }

    /// Splits the invocations over two dimensions once a single one runs
    /// out of workgroups.
    fn workgroups(block_count: u32) -> (u32, u32) {
        let total = block_count.div_ceil(WORKGROUP_SIZE);
        let x = total.clamp(1, MAX_WORKGROUPS_PER_DIMENSION);
        (x, total.div_ceil(x).max(1))
    }
}

impl ComputeDevice for WgpuDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn upload_blocks(&mut self, blocks: &[DataUnit], ac_table: &HuffmanTable) -> Result<()> {
        if blocks.is_empty() {
            return Err(Error::DeviceSetupFailed("no blocks to upload"));
        }
        let block_count = u32::try_from(blocks.len())
            .map_err(|_| Error::DeviceSetupFailed("too many blocks for one dispatch"))?;
        let sample_bytes = blocks.len() as u64 * BLOCK_SIZE as u64 * WORD;
        let limits = self.device.limits();
        if sample_bytes > limits.max_storage_buffer_binding_size as u64
            || sample_bytes > limits.max_buffer_size
        {
            return Err(Error::DeviceSetupFailed("image exceeds device buffer limits"));
        }
        if Self::workgroups(block_count).1 > MAX_WORKGROUPS_PER_DIMENSION {
            return Err(Error::DeviceSetupFailed("too many blocks for one dispatch"));
        }

        let samples: Vec<f32> = blocks
            .iter()
            .flat_map(|unit| unit.samples().iter().copied())
            .collect();
        let code_lengths: Vec<u32> = (0..=u8::MAX)
            .map(|symbol| ac_table.code_length(symbol) as u32)
            .collect();
        let table_bytes = BLOCK_SIZE as u64 * WORD;
        let result_bytes = block_count as u64 * WORD;

        let samples_buffer = self.storage_buffer("samples", sample_bytes, wgpu::BufferUsages::COPY_DST);
        let code_lengths_buffer = self.storage_buffer(
            "code-lengths",
            code_lengths.len() as u64 * WORD,
            wgpu::BufferUsages::COPY_DST,
        );
        let scales = self.storage_buffer("scales", table_bytes, wgpu::BufferUsages::COPY_DST);
        let entries = self.storage_buffer("entries", table_bytes, wgpu::BufferUsages::COPY_DST);
        let bits = self.storage_buffer("bits", result_bytes, wgpu::BufferUsages::COPY_SRC);
        let errors = self.storage_buffer("errors", result_bytes, wgpu::BufferUsages::COPY_SRC);
        let readback = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback"),
            size: 2 * result_bytes,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.queue
            .write_buffer(&samples_buffer, 0, bytemuck::cast_slice(&samples));
        self.queue
            .write_buffer(&code_lengths_buffer, 0, bytemuck::cast_slice(&code_lengths));

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("evaluate-block-bg"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: samples_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: scales.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: entries.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: code_lengths_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: bits.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: errors.as_entire_binding(),
                },
            ],
        });

        self.buffers = Some(BlockBuffers {
            block_count,
            scales,
            entries,
            bits,
            errors,
            readback,
            bind_group,
        });
        Ok(())
    }

    fn upload_table(&mut self, candidate: &CandidateTable) -> Result<()> {
        let buffers = self
            .buffers
            .as_ref()
            .ok_or(Error::DeviceDispatchFailed("blocks were never uploaded"))?;
        let scales: Vec<f32> = (0..BLOCK_SIZE)
            .map(|index| candidate.processed().scale(index))
            .collect();
        let entries: Vec<u32> = candidate.table().entries().iter().map(|&entry| entry as u32).collect();
        self.queue
            .write_buffer(&buffers.scales, 0, bytemuck::cast_slice(&scales));
        self.queue
            .write_buffer(&buffers.entries, 0, bytemuck::cast_slice(&entries));
        Ok(())
    }

    fn dispatch(&mut self, bits: &mut [u32], errors: &mut [u64]) -> Result<()> {
        let buffers = self
            .buffers
            .as_ref()
            .ok_or(Error::DeviceDispatchFailed("blocks were never uploaded"))?;
        let block_count = buffers.block_count as usize;
        if bits.len() != block_count || errors.len() != block_count {
            return Err(Error::DeviceDispatchFailed("result buffers do not match block count"));
        }
        let result_bytes = buffers.block_count as u64 * WORD;
        let (x, y) = Self::workgroups(buffers.block_count);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("evaluate-block-encoder"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("evaluate-block-pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &buffers.bind_group, &[]);
            pass.dispatch_workgroups(x, y, 1);
        }
        encoder.copy_buffer_to_buffer(&buffers.bits, 0, &buffers.readback, 0, result_bytes);
        encoder.copy_buffer_to_buffer(&buffers.errors, 0, &buffers.readback, result_bytes, result_bytes);
        self.queue.submit(Some(encoder.finish()));
        log::trace!("Dispatched {}x{} workgroups for {} blocks", x, y, block_count);

        let (sender, receiver) = mpsc::channel();
        buffers
            .readback
            .slice(..)
            .map_async(wgpu::MapMode::Read, move |result| {
                let _ = sender.send(result);
            });
        self.device.poll(wgpu::Maintain::Wait);
        match receiver.recv() {
            Ok(Ok(())) => {}
            Ok(Err(error)) => {
                log::error!("Mapping the readback buffer failed: {}", error);
                return Err(Error::DeviceDispatchFailed("readback mapping failed"));
            }
            Err(_) => return Err(Error::DeviceDispatchFailed("readback was never signalled")),
        }

        {
            let mapped = buffers.readback.slice(..).get_mapped_range();
            let words: &[u32] = bytemuck::cast_slice(&mapped);
            let (device_bits, device_errors) = words.split_at(block_count);
            bits.copy_from_slice(device_bits);
            for (error, &device_error) in errors.iter_mut().zip(device_errors) {
                *error = device_error as u64;
            }
        }
        buffers.readback.unmap();
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{WgpuDevice, MAX_WORKGROUPS_PER_DIMENSION};
    use crate::evaluation::device::ComputeDevice;
    use crate::evaluation::{evaluate_block, CandidateTable};
    use crate::huffman::HuffmanSpec;
    use crate::image::blocks::DataUnit;
    use crate::quantization::QuantizationTable;

    #[test]
    fn workgroups_cover_every_block() {
        assert_eq!(WgpuDevice::workgroups(1), (1, 1));
        assert_eq!(WgpuDevice::workgroups(64), (1, 1));
        assert_eq!(WgpuDevice::workgroups(65), (2, 1));
        let (x, y) = WgpuDevice::workgroups(64 * MAX_WORKGROUPS_PER_DIMENSION + 1);
        assert_eq!((x, y), (MAX_WORKGROUPS_PER_DIMENSION, 2));
    }

    /// Runs only where an adapter is present.
    #[test]
    fn kernel_matches_host_evaluation() {
        let mut device = match WgpuDevice::open() {
            Ok(device) => device,
            Err(error) => {
                eprintln!("skipping, no compute device: {}", error);
                return;
            }
        };
        let luma_ac = &HuffmanSpec::standard().luma_ac;
        let mut blocks = vec![DataUnit::new([0.0; 64]); 3];
        blocks.push(DataUnit::new([-37.0; 64]));
        let table = QuantizationTable::new([12; 64]).unwrap();
        let candidate = CandidateTable::from(&table);
        device.upload_blocks(&blocks, luma_ac).unwrap();
        device.upload_table(&candidate).unwrap();
        let mut bits = vec![0; blocks.len()];
        let mut errors = vec![0; blocks.len()];
        device.dispatch(&mut bits, &mut errors).unwrap();
        for (index, unit) in blocks.iter().enumerate() {
            let expected = evaluate_block(unit, &candidate, luma_ac);
            assert_eq!(bits[index], expected.bits, "bits of block {}", index);
            assert_eq!(errors[index], expected.error, "error of block {}", index);
        }
    }
}
