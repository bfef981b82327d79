use crate::stencil::*;
use crate::util::*;

/// The benchmark's 3x3 convolution.
pub type Conv2dStencil<NumType> = Stencil<NumType, 2, 9>;

/// Neighbor offsets in row-major order,
/// (row, column) from the top left corner to the bottom right.
pub const CONV_2D_OFFSETS: [[i32; 2]; 9] = [
    [-1, -1],
    [-1, 0],
    [-1, 1],
    [0, -1],
    [0, 0],
    [0, 1],
    [1, -1],
    [1, 0],
    [1, 1],
];

/// Fixed weights, synthetic rather than a blur or an edge filter.
/// They do not sum to one.
pub fn conv_2d<NumType: NumTrait>() -> Conv2dStencil<NumType> {
    Stencil::new(CONV_2D_OFFSETS, |args: &[f64; 9]| {
        0.2 * args[0] + 0.5 * args[1] + -0.8 * args[2]
            + -0.3 * args[3] + 0.6 * args[4] + -0.9 * args[5]
            + 0.4 * args[6] + 0.7 * args[7] + 0.1 * args[8]
    })
}
