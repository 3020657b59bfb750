// gpu/device.rs — wgpu device abstraction.
//
// Responsibilities:
//   - Enumerate Vulkan adapters and select the first non-CPU one.
//   - Hold the device, queue, and the active `WorkgroupSize` used when
//     creating the fill pipeline.
//   - Compute dispatch grid dimensions (ceiling division) for a target
//     image size.
//
// ADAPTER SELECTION:
// wgpu's default `request_adapter` uses power preference heuristics that
// may grab llvmpipe/softpipe on WSL2 (where the software renderer appears
// as a valid Vulkan device). We enumerate explicitly and prefer real
// hardware, falling back to whatever exists so headless CI still works.
//
// WORKGROUP SIZES:
// The workgroup size is injected into the WGSL source at pipeline
// creation (`{{WG_X}}`/`{{WG_Y}}` placeholders). 16×16 = 256 invocations
// is the authored default; any size whose product stays within
// `max_compute_invocations_per_workgroup` produces identical output, since
// the shader guards against out-of-bounds global IDs.

use std::fmt;

/// A workgroup size configuration for 2D compute dispatches.
///
/// Construct via `WorkgroupSize::default()` (16×16) or
/// `GpuDevice::set_workgroup_size()`, which validates the product against
/// the device's invocation limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkgroupSize {
    pub x: u32,
    pub y: u32,
}

impl WorkgroupSize {
    /// Total invocations per workgroup (x * y).
    pub fn total(&self) -> u32 {
        self.x * self.y
    }
}

impl Default for WorkgroupSize {
    /// 16×16 = 256 invocations — one workgroup per 16×16 pixel tile.
    /// 256 fits `max_compute_invocations_per_workgroup` on every wgpu
    /// default-limits device.
    fn default() -> Self {
        WorkgroupSize { x: 16, y: 16 }
    }
}

impl fmt::Display for WorkgroupSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{} ({} invocations)", self.x, self.y, self.total())
    }
}

/// Cached adapter information for logging and debugging.
#[derive(Debug, Clone)]
pub struct AdapterInfo {
    pub name: String,
    pub device_type: wgpu::DeviceType,
    pub backend: wgpu::Backend,
}

impl fmt::Display for AdapterInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:?}, {:?})",
            self.name, self.backend, self.device_type
        )
    }
}

/// The core GPU context: adapter, device, queue, and workgroup config.
///
/// Create via `GpuDevice::new()`. Hold one `GpuDevice` for the lifetime of
/// the application — it is expensive to create (Vulkan instance + device
/// initialization).
///
/// # Field drop order
/// Rust drops struct fields in declaration order (top → bottom).
/// `_instance` is declared last so the `wgpu::Instance` outlives `device`
/// and `queue`. This prevents a crash in dzn (the D3D12-to-Vulkan layer on
/// WSL2) when the Vulkan instance is destroyed while device-level objects
/// still hold back-references to it.
pub struct GpuDevice {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub adapter_info: AdapterInfo,
    pub workgroup_size: WorkgroupSize,
    /// Keeps the `wgpu::Instance` alive until `device` and `queue` are
    /// dropped. Never access directly — it only controls drop order.
    _instance: wgpu::Instance,
}

impl GpuDevice {
    /// Create a `GpuDevice` on the best available Vulkan adapter, with
    /// the default 16×16 workgroup size.
    ///
    /// # Errors
    /// Returns `Err` if no Vulkan adapter is found or the device request
    /// fails.
    pub fn new() -> Result<Self, GpuError> {
        pollster::block_on(Self::init_async())
    }

    async fn init_async() -> Result<Self, GpuError> {
        // Vulkan only — no DX12, no Metal, no WebGPU.
        //
        // ALLOW_UNDERLYING_NONCOMPLIANT_ADAPTER lets wgpu enumerate dzn
        // (D3D12-to-Vulkan on WSL2), which declares itself non-conformant
        // but fully supports the storage-texture writes we need.
        let flags = if cfg!(debug_assertions) {
            wgpu::InstanceFlags::VALIDATION
                | wgpu::InstanceFlags::ALLOW_UNDERLYING_NONCOMPLIANT_ADAPTER
        } else {
            wgpu::InstanceFlags::ALLOW_UNDERLYING_NONCOMPLIANT_ADAPTER
        };

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::VULKAN,
            flags,
            ..Default::default()
        });

        let all_adapters: Vec<wgpu::Adapter> = instance
            .enumerate_adapters(wgpu::Backends::VULKAN)
            .into_iter()
            .collect();

        if all_adapters.is_empty() {
            return Err(GpuError::NoSuitableAdapter);
        }

        for a in &all_adapters {
            let info = a.get_info();
            log::debug!(
                "Vulkan adapter: {} ({:?}, {:?})",
                info.name,
                info.backend,
                info.device_type
            );
        }

        // Tier 1: real hardware (or dzn/VM pass-through, which report as
        // Other/VirtualGpu). Tier 2: anything, even llvmpipe — the fill
        // kernel is correctness-testable on a software rasterizer.
        let adapter = all_adapters
            .into_iter()
            .find(|a| {
                matches!(
                    a.get_info().device_type,
                    wgpu::DeviceType::DiscreteGpu
                        | wgpu::DeviceType::IntegratedGpu
                        | wgpu::DeviceType::VirtualGpu
                        | wgpu::DeviceType::Other
                )
            })
            .or_else(|| {
                instance
                    .enumerate_adapters(wgpu::Backends::VULKAN)
                    .into_iter()
                    .next()
            })
            .ok_or(GpuError::NoSuitableAdapter)?;

        let raw_info = adapter.get_info();
        let adapter_info = AdapterInfo {
            name: raw_info.name.clone(),
            device_type: raw_info.device_type,
            backend: raw_info.backend,
        };

        let (device, queue): (wgpu::Device, wgpu::Queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("imgfill"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .map_err(GpuError::DeviceRequest)?;

        log::info!("GPU device ready: {adapter_info}");

        Ok(GpuDevice {
            device,
            queue,
            adapter_info,
            workgroup_size: WorkgroupSize::default(),
            _instance: instance,
        })
    }

    /// Override the default workgroup size.
    ///
    /// Returns `Err` if the total invocation count (x * y) exceeds the
    /// device's `max_compute_invocations_per_workgroup`. Note: pipelines
    /// created before the change keep the size they were built with.
    pub fn set_workgroup_size(&mut self, x: u32, y: u32) -> Result<(), GpuError> {
        let total = x * y;
        let max = self.device.limits().max_compute_invocations_per_workgroup;
        if x == 0 || y == 0 || total > max {
            return Err(GpuError::WorkgroupTooLarge { total, max });
        }
        self.workgroup_size = WorkgroupSize { x, y };
        Ok(())
    }

    /// Compute the dispatch dimensions needed to cover an image of the
    /// given size with the active workgroup size.
    ///
    /// Returns `(groups_x, groups_y)`. Uses ceiling division so every
    /// pixel is covered even when the image dimensions are not multiples
    /// of the workgroup size; the trailing partial workgroups overshoot
    /// the image and rely on the shader's bounds guard:
    /// ```wgsl
    /// if gid.x >= size.x || gid.y >= size.y { return; }
    /// ```
    pub fn dispatch_size(&self, img_w: u32, img_h: u32) -> (u32, u32) {
        let gx = img_w.div_ceil(self.workgroup_size.x);
        let gy = img_h.div_ceil(self.workgroup_size.y);
        (gx, gy)
    }
}

impl fmt::Display for GpuDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GpuDevice {{ adapter: {}, workgroup: {} }}",
            self.adapter_info, self.workgroup_size
        )
    }
}

// ============================================================
// Error type
// ============================================================

/// Errors from GPU device initialization and configuration.
///
/// The fill kernel itself has no failure path — every error in this crate
/// is host-side setup.
#[derive(Debug)]
pub enum GpuError {
    /// No Vulkan adapter found. On WSL2: check that Vulkan is installed
    /// and `vulkaninfo` lists a device.
    NoSuitableAdapter,
    /// wgpu device request failed (driver issue, unsupported limits, etc.).
    DeviceRequest(wgpu::RequestDeviceError),
    /// Requested workgroup size exceeds the device's invocation limit
    /// (or has a zero dimension).
    WorkgroupTooLarge { total: u32, max: u32 },
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::NoSuitableAdapter => write!(
                f,
                "no Vulkan adapter found. On WSL2: ensure Vulkan is installed \
                 and `vulkaninfo` lists a device."
            ),
            GpuError::DeviceRequest(e) => write!(f, "device request failed: {e}"),
            GpuError::WorkgroupTooLarge { total, max } => write!(
                f,
                "workgroup size {total} exceeds device limit of {max} invocations"
            ),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::DeviceRequest(e) => Some(e),
            _ => None,
        }
    }
}

// ============================================================
// Tests
// ============================================================
