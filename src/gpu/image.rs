// gpu/image.rs — GPU-resident RGBA target image, upload and readback.
//
// `GpuImage` owns an `Rgba8Unorm` 2D storage texture — the writable
// binding the fill kernel stores into. The texture also carries COPY_DST
// and COPY_SRC so tests can seed prior contents (upload) and inspect the
// result (readback).
//
// STRIDE AND ALIGNMENT
// ─────────────────────
// The CPU `Image` may have stride > width (padding pixels per row), and
// wgpu's buffer↔texture copies require `bytes_per_row` to be a multiple
// of `COPY_BYTES_PER_ROW_ALIGNMENT` (= 256). Uploads therefore always go
// through a staging buffer: each row's active `width * 4` bytes are
// copied contiguously into rows padded out to the 256-byte boundary, and
// readback strips that padding again. One staging memcpy per transfer is
// fine — transfers happen only at test/demo boundaries, never per
// dispatch.

use wgpu::util::DeviceExt;

use crate::gpu::device::GpuDevice;
use crate::image::{Image, Rgba};

/// Bytes per RGBA8 pixel.
const BYTES_PER_PIXEL: u32 = 4;

/// wgpu requires buffer↔texture copy rows to be aligned to this.
const COPY_ALIGNMENT: u32 = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

/// An RGBA8 image resident on the GPU as a writable 2D storage texture.
///
/// # Lifetime
/// `GpuImage` borrows nothing and owns its wgpu resources; it stays valid
/// across any number of dispatches, and dropping it releases the texture
/// memory. The fill kernel holds a binding to it only for the duration of
/// one dispatch.
pub struct GpuImage {
    /// The underlying wgpu texture.
    pub texture: wgpu::Texture,
    /// Default full-texture view, bound to the fill pipeline.
    pub view: wgpu::TextureView,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

impl GpuImage {
    /// Allocate an uninitialized GPU image of the given size.
    ///
    /// Contents are undefined until the first fill dispatch or upload.
    ///
    /// # Panics
    /// wgpu's validation layer panics if either dimension is zero or
    /// exceeds the device's `max_texture_dimension_2d`.
    pub fn new(gpu: &GpuDevice, width: u32, height: u32) -> Self {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("GpuImage"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            // Rgba8Unorm: 4×8-bit channels, [0,1] floats in shaders, and a
            // valid write-only storage texture format.
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        GpuImage {
            texture,
            view,
            width,
            height,
        }
    }

    /// Upload a CPU `Image` to a new GPU image.
    ///
    /// Rows are compacted into a 256-byte-aligned staging buffer (stride
    /// padding stripped) and copied with one `copy_buffer_to_texture`.
    /// The copy runs asynchronously on the GPU timeline; a subsequent
    /// dispatch submitted on the same queue observes it in order.
    pub fn upload(gpu: &GpuDevice, src: &Image) -> Self {
        let img = Self::new(gpu, src.width() as u32, src.height() as u32);

        let row_bytes = img.width * BYTES_PER_PIXEL;
        let aligned_bytes_per_row = align_to(row_bytes, COPY_ALIGNMENT);
        let staging_size = (aligned_bytes_per_row * img.height) as usize;

        let mut staging: Vec<u8> = vec![0u8; staging_size];
        for y in 0..img.height as usize {
            let dst_start = y * aligned_bytes_per_row as usize;
            let dst_row = &mut staging[dst_start..dst_start + row_bytes as usize];
            for (x, px) in src.row(y).iter().enumerate() {
                dst_row[x * 4..x * 4 + 4].copy_from_slice(px);
            }
        }

        let staging_buf = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("GpuImage::staging"),
                contents: &staging,
                usage: wgpu::BufferUsages::COPY_SRC,
            });

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("GpuImage::upload"),
            });

        encoder.copy_buffer_to_texture(
            wgpu::ImageCopyBuffer {
                buffer: &staging_buf,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(aligned_bytes_per_row),
                    rows_per_image: Some(img.height),
                },
            },
            wgpu::ImageCopyTexture {
                texture: &img.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::Extent3d {
                width: img.width,
                height: img.height,
                depth_or_array_layers: 1,
            },
        );

        gpu.queue.submit(std::iter::once(encoder.finish()));

        img
    }

    /// Read the GPU texture back into a CPU `Image`.
    ///
    /// **Expensive and synchronous** — stalls until all previously
    /// submitted work (including any fill dispatch) has completed. This
    /// is the synchronization point that makes dispatch writes visible to
    /// the caller. Tests and demos only, never a hot path.
    pub fn readback(&self, gpu: &GpuDevice) -> Image {
        let row_bytes = self.width * BYTES_PER_PIXEL;
        let aligned_bytes_per_row = align_to(row_bytes, COPY_ALIGNMENT);
        let readback_size = (aligned_bytes_per_row * self.height) as u64;

        let readback_buf = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("GpuImage::readback"),
            size: readback_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("GpuImage::readback"),
            });

        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &readback_buf,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(aligned_bytes_per_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );

        gpu.queue.submit(std::iter::once(encoder.finish()));

        let buf_slice = readback_buf.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        buf_slice.map_async(wgpu::MapMode::Read, move |result| {
            sender.send(result).expect("readback channel closed");
        });

        gpu.device.poll(wgpu::Maintain::Wait);
        receiver
            .recv()
            .expect("readback map callback never fired")
            .expect("readback map failed");

        let mapped = buf_slice.get_mapped_range();
        // aligned_bytes_per_row is a multiple of 4, so the whole mapping
        // casts cleanly to RGBA pixels.
        let pixels: &[Rgba] = bytemuck::cast_slice(&mapped);
        let row_pixels = (aligned_bytes_per_row / BYTES_PER_PIXEL) as usize;

        let mut out = Image::new(self.width as usize, self.height as usize);
        for y in 0..self.height as usize {
            let src_start = y * row_pixels;
            for x in 0..self.width as usize {
                out.set(x, y, pixels[src_start + x]);
            }
        }
        drop(mapped);
        readback_buf.unmap();

        out
    }
}

/// Round `value` up to the next multiple of `alignment`.
#[inline]
pub(crate) fn align_to(value: u32, alignment: u32) -> u32 {
    value.div_ceil(alignment) * alignment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Image;

    // ---- align_to (pure, no GPU needed) ------------------------------------

    #[test]
    fn test_align_to_already_aligned() {
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(512, 256), 512);
    }

    #[test]
    fn test_align_to_rounds_up() {
        assert_eq!(align_to(1, 256), 256);
        // 17×17 RGBA rows: 68 bytes → one 256-byte row.
        assert_eq!(align_to(68, 256), 256);
        // 1920-wide RGBA rows: 7680 bytes, already 256-aligned.
        assert_eq!(align_to(1920 * 4, 256), 7680);
        assert_eq!(align_to(257, 256), 512);
    }

    // ---- GPU round-trip tests (subprocess-isolated) ------------------------
    //
    // Same subprocess isolation pattern as gpu::device — dzn crashes on
    // exit. The inner_* tests run inside a child process; outer test_*
    // wrappers spawn the child and assert "GPU_TEST_OK" in the output.

    fn run_gpu_test_in_subprocess(test_name: &str) -> String {
        let output = std::process::Command::new("cargo")
            .args([
                "test",
                "--lib",
                "--",
                test_name,
                "--exact",
                "--ignored",
                "--nocapture",
            ])
            .output()
            .unwrap_or_else(|e| panic!("failed to spawn subprocess for {test_name}: {e}"));
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        print!("{stdout}");
        eprint!("{stderr}");
        stdout + &stderr
    }

    #[test]
    #[ignore = "GPU integration: run via outer subprocess wrapper"]
    fn inner_upload_round_trip() {
        // 3×2 image with distinct per-pixel values.
        let mut src = Image::new(3, 2);
        for y in 0..2u8 {
            for x in 0..3u8 {
                src.set(x as usize, y as usize, [x * 10, y * 10, x + y, 255]);
            }
        }

        let gpu = GpuDevice::new().expect("need Vulkan GPU");
        let gpu_img = GpuImage::upload(&gpu, &src);
        assert_eq!(gpu_img.width, 3);
        assert_eq!(gpu_img.height, 2);

        let out = gpu_img.readback(&gpu);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(out.get(x, y), src.get(x, y), "round-trip at ({x}, {y})");
            }
        }
        println!("GPU_TEST_OK");
        drop(gpu_img);
        drop(gpu);
    }

    #[test]
    #[ignore = "GPU integration: run via outer subprocess wrapper"]
    fn inner_upload_round_trip_with_stride() {
        // stride = 4 pixels, width = 3: one padding pixel per row that
        // must not leak into the texture.
        let mut src = Image::new_with_stride(3, 2, 4);
        src.set(0, 0, [10, 0, 0, 255]);
        src.set(2, 0, [30, 0, 0, 255]);
        src.set(1, 1, [0, 50, 0, 255]);

        let gpu = GpuDevice::new().expect("need Vulkan GPU");
        let gpu_img = GpuImage::upload(&gpu, &src);
        let out = gpu_img.readback(&gpu);

        assert_eq!(out.get(0, 0), [10, 0, 0, 255]);
        assert_eq!(out.get(2, 0), [30, 0, 0, 255]);
        assert_eq!(out.get(1, 1), [0, 50, 0, 255]);
        assert_eq!(out.get(1, 0), [0, 0, 0, 0]);
        println!("GPU_TEST_OK");
        drop(gpu_img);
        drop(gpu);
    }

    #[test]
    #[ignore = "requires a real Vulkan GPU"]
    fn test_upload_round_trip() {
        let out = run_gpu_test_in_subprocess("gpu::image::tests::inner_upload_round_trip");
        assert!(out.contains("GPU_TEST_OK"), "inner test failed:\n{out}");
    }

    #[test]
    #[ignore = "requires a real Vulkan GPU"]
    fn test_upload_round_trip_with_stride() {
        let out =
            run_gpu_test_in_subprocess("gpu::image::tests::inner_upload_round_trip_with_stride");
        assert!(out.contains("GPU_TEST_OK"), "inner test failed:\n{out}");
    }
}
