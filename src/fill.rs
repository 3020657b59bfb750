// fill.rs — Sequential reference for the GPU fill kernel.
//
// The kernel body is modelled as a pure function from an explicit 2D
// coordinate to an output action (`fill_at`). This keeps the bounds-guard
// logic testable as ordinary deterministic code, independent of the
// parallel runtime: `fill_dispatch` loops over every invocation coordinate
// a given workgroup grid would produce and applies the same per-pixel
// decision the shader makes.

use crate::image::{Image, Rgba};

/// The constant fill color: opaque black.
///
/// Authored-time constant, not runtime-configurable. The WGSL kernel in
/// `shaders/fill.wgsl` stores the same value as `vec4(0.0, 0.0, 0.0, 1.0)`.
pub const FILL_COLOR: Rgba = [0, 0, 0, 255];

/// The per-invocation body: decide what a single invocation at global
/// coordinate (x, y) writes to an image of the given dimensions.
///
/// Returns `Some(FILL_COLOR)` iff the coordinate is in bounds; `None`
/// means the invocation terminates with no effect. Dispatch grids are
/// sized in whole workgroups and may overshoot the image on either axis,
/// so out-of-bounds coordinates are expected, not errors.
#[inline]
pub fn fill_at(x: u32, y: u32, width: u32, height: u32) -> Option<Rgba> {
    if x < width && y < height {
        Some(FILL_COLOR)
    } else {
        None
    }
}

/// Sequential reference fill: apply `fill_at` to every candidate
/// coordinate of a correctly sized dispatch. After this call every pixel
/// of `img` equals [`FILL_COLOR`].
pub fn fill_image(img: &mut Image) {
    let (w, h) = (img.width() as u32, img.height() as u32);
    for y in 0..h {
        for x in 0..w {
            if let Some(c) = fill_at(x, y, w, h) {
                img.set(x as usize, y as usize, c);
            }
        }
    }
}

/// Simulate a dispatch over an explicit workgroup grid.
///
/// Loops over all `groups_x * wg_x` × `groups_y * wg_y` invocation
/// coordinates the grid would launch and applies `fill_at` to each. An
/// oversized grid is absorbed by the guard; an undersized grid leaves the
/// uncovered trailing pixels at their prior values.
pub fn fill_dispatch(img: &mut Image, groups_x: u32, groups_y: u32, wg_x: u32, wg_y: u32) {
    let (w, h) = (img.width() as u32, img.height() as u32);
    for y in 0..groups_y * wg_y {
        for x in 0..groups_x * wg_x {
            if let Some(c) = fill_at(x, y, w, h) {
                img.set(x as usize, y as usize, c);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_at_in_bounds() {
        assert_eq!(fill_at(0, 0, 16, 16), Some(FILL_COLOR));
        assert_eq!(fill_at(15, 15, 16, 16), Some(FILL_COLOR));
    }

    #[test]
    fn test_fill_at_guard_rejects_each_axis() {
        // Guard must check both axes independently.
        assert_eq!(fill_at(16, 0, 16, 16), None);
        assert_eq!(fill_at(0, 16, 16, 16), None);
        assert_eq!(fill_at(16, 16, 16, 16), None);
    }

    #[test]
    fn test_fill_at_deterministic() {
        assert_eq!(fill_at(3, 7, 10, 10), fill_at(3, 7, 10, 10));
    }

    #[test]
    fn test_fill_image_covers_all_pixels() {
        let mut img = Image::filled(17, 17, [200, 100, 50, 255]);
        fill_image(&mut img);
        for y in 0..17 {
            for x in 0..17 {
                assert_eq!(img.get(x, y), FILL_COLOR, "pixel ({x}, {y}) not filled");
            }
        }
    }

    #[test]
    fn test_fill_dispatch_under_coverage_leaves_prior_values() {
        // 17×17 with a deliberately insufficient floor(17/16) = 1×1 grid:
        // only the top-left 16×16 block is covered.
        let prior: Rgba = [9, 9, 9, 9];
        let mut img = Image::filled(17, 17, prior);
        fill_dispatch(&mut img, 1, 1, 16, 16);
        for y in 0..17 {
            for x in 0..17 {
                let expected = if x < 16 && y < 16 { FILL_COLOR } else { prior };
                assert_eq!(img.get(x, y), expected, "pixel ({x}, {y})");
            }
        }
    }
}
