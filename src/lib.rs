// imgfill — fill a 2D RGBA image with an opaque constant color on the GPU.
//
// The sequential implementation in `fill` is the authoritative reference:
// the wgpu compute kernel in `gpu::fill` is validated against it
// pixel-for-pixel.

use env_logger::Builder;

pub mod fill;
pub mod gpu;
pub mod image;

pub fn init_logger() {
    Builder::new().filter_level(log::LevelFilter::Info).init();

    log::info!("Logger initialized");
}
