// gpu/mod.rs — wgpu compute layer.
//
// The fill kernel here mirrors the sequential implementation in the
// parent crate's `fill` module, which remains the authoritative
// reference — the kernel is validated against it pixel-for-pixel.
//
// Division of labour:
//
//   GPU: one dispatch of the fill kernel over a workgroup grid that
//        tiles the target image (`gpu::fill`).
//   CPU: device setup, dispatch sizing, upload/readback plumbing
//        (`gpu::device`, `gpu::image`).
//
// The kernel itself is stateless: nothing persists between dispatches,
// and each invocation writes a disjoint pixel, so no atomics, barriers,
// or inter-invocation ordering are needed.

pub mod device;
pub mod fill;
pub mod image;
