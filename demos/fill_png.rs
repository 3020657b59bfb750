// demos/fill_png.rs — fill a 1920×1080 image on the GPU and save it as a
// PNG.
//
//   cargo run --example fill_png
//
// Requires a Vulkan device.

use image::{ImageBuffer, Rgba};

use imgfill::gpu::device::GpuDevice;
use imgfill::gpu::fill::GpuFill;
use imgfill::gpu::image::GpuImage;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    imgfill::init_logger();

    let gpu = GpuDevice::new()?;
    log::info!("{gpu}");

    let target = GpuImage::new(&gpu, 1920, 1080);
    let fill = GpuFill::new(&gpu);

    let (gx, gy) = gpu.dispatch_size(target.width, target.height);
    log::info!("Dispatching {gx}×{gy} workgroups over {}×{}", target.width, target.height);
    fill.fill(&gpu, &target);

    // Readback is the synchronization point: after it returns, every
    // in-bounds pixel holds the fill color.
    let result = target.readback(&gpu);

    let file_name = "fill.png";
    let img: ImageBuffer<Rgba<u8>, _> =
        ImageBuffer::from_raw(target.width, target.height, result.to_bytes())
            .ok_or("buffer size mismatch")?;
    img.save(file_name)?;

    log::info!("Image saved: {file_name}");

    Ok(())
}
