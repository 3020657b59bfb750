// gpu/fill.rs — the fill kernel: one compute dispatch that overwrites
// every in-bounds pixel of the bound image with the constant color.
//
// The shader queries the image's dimensions at invocation time and guards
// against out-of-bounds global IDs, so the same pipeline serves any image
// size up to device limits. Each invocation writes its own pixel — no
// contention, no synchronisation.
//
// Mirrors the sequential reference in crate::fill; the GPU tests below
// validate the two against each other pixel-for-pixel.

use crate::gpu::device::GpuDevice;
use crate::gpu::image::GpuImage;

/// The fill compute pipeline.
///
/// Create once per `GpuDevice`; the pipeline bakes in the device's
/// workgroup size at creation. Call [`fill`](GpuFill::fill) per target
/// image — the writable image handle is passed explicitly to each
/// dispatch and is only bound for its duration.
pub struct GpuFill {
    pipeline: wgpu::ComputePipeline,
    bgl: wgpu::BindGroupLayout,
    workgroup: (u32, u32),
}

impl GpuFill {
    pub fn new(gpu: &GpuDevice) -> Self {
        let shader_template = include_str!("../shaders/fill.wgsl");
        let shader_src = shader_template
            .replace("{{WG_X}}", &gpu.workgroup_size.x.to_string())
            .replace("{{WG_Y}}", &gpu.workgroup_size.y.to_string());

        let shader = gpu
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("fill.wgsl"),
                source: wgpu::ShaderSource::Wgsl(shader_src.into()),
            });

        let bgl = gpu
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("GpuFill BGL"),
                entries: &[
                    // 0 — target image (write-only storage texture)
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::StorageTexture {
                            access: wgpu::StorageTextureAccess::WriteOnly,
                            format: wgpu::TextureFormat::Rgba8Unorm,
                            view_dimension: wgpu::TextureViewDimension::D2,
                        },
                        count: None,
                    },
                ],
            });

        let pipeline_layout = gpu
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("GpuFill pipeline layout"),
                bind_group_layouts: &[&bgl],
                push_constant_ranges: &[],
            });

        let pipeline = gpu
            .device
            .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("fill"),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point: "fill",
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                cache: None,
            });

        GpuFill {
            pipeline,
            bgl,
            workgroup: (gpu.workgroup_size.x, gpu.workgroup_size.y),
        }
    }

    /// Fill `img` with the constant color, dispatching the covering grid
    /// `ceil(width / wg_x) × ceil(height / wg_y)`.
    ///
    /// Submits one compute pass and returns; writes become visible to the
    /// caller at the next synchronization point (in this crate,
    /// `GpuImage::readback`). Dispatches are idempotent — repeating one
    /// yields the same image.
    pub fn fill(&self, gpu: &GpuDevice, img: &GpuImage) {
        let gx = img.width.div_ceil(self.workgroup.0);
        let gy = img.height.div_ceil(self.workgroup.1);
        self.fill_with_grid(gpu, img, gx, gy);
    }

    /// Fill with an explicit dispatch grid.
    ///
    /// An oversized grid is absorbed by the shader's bounds guard; an
    /// undersized grid leaves the uncovered trailing pixels untouched.
    /// Exists for the dispatch-boundary tests — production callers want
    /// [`fill`](GpuFill::fill).
    pub fn fill_with_grid(&self, gpu: &GpuDevice, img: &GpuImage, groups_x: u32, groups_y: u32) {
        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("GpuFill BG"),
            layout: &self.bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&img.view),
            }],
        });

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("GpuFill dispatch"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("fill"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(groups_x, groups_y, 1);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
