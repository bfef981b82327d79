use crate::util::*;

/// For linear stencils, we can extract the weight for a neighbor
/// by passing in 1.0 for that neighbor and 0.0 for the others.
pub fn extract_weights<
    const NEIGHBORHOOD_SIZE: usize,
    F: Fn(&[f64; NEIGHBORHOOD_SIZE]) -> f64,
>(
    f: F,
) -> [f64; NEIGHBORHOOD_SIZE] {
    let mut weights = [0.0; NEIGHBORHOOD_SIZE];
    let mut arg_buffer = [0.0; NEIGHBORHOOD_SIZE];
    for n in 0..NEIGHBORHOOD_SIZE {
        arg_buffer[n] = 1.0;
        weights[n] = f(&arg_buffer);
        arg_buffer[n] = 0.0;
    }
    weights
}

/// A linear stencil is a combination of neighbor offsets and weights.
/// Weights are stored in the grid's element type so the hot loop
/// never converts.
#[derive(Debug, Clone)]
pub struct Stencil<
    NumType: NumTrait,
    const GRID_DIMENSION: usize,
    const NEIGHBORHOOD_SIZE: usize,
> {
    weights: [NumType; NEIGHBORHOOD_SIZE],
    offsets: [Coord<GRID_DIMENSION>; NEIGHBORHOOD_SIZE],
}

impl<
        NumType: NumTrait,
        const GRID_DIMENSION: usize,
        const NEIGHBORHOOD_SIZE: usize,
    > Stencil<NumType, GRID_DIMENSION, NEIGHBORHOOD_SIZE>
{
    pub fn new<F: Fn(&[f64; NEIGHBORHOOD_SIZE]) -> f64>(
        offsets: [[i32; GRID_DIMENSION]; NEIGHBORHOOD_SIZE],
        operation: F,
    ) -> Self {
        let weights = extract_weights(operation);
        Stencil {
            offsets: std::array::from_fn(|i| {
                Coord::from_column_slice(&offsets[i])
            }),
            weights: weights.map(from_f64::<NumType>),
        }
    }

    pub fn weights(&self) -> &[NumType; NEIGHBORHOOD_SIZE] {
        &self.weights
    }

    pub fn offsets(&self) -> &[Coord<GRID_DIMENSION>; NEIGHBORHOOD_SIZE] {
        &self.offsets
    }

    /// Weighted sum, accumulated strictly in neighbor order.
    /// Every execution strategy funnels through here.
    #[inline]
    pub fn apply(&self, args: &[NumType; NEIGHBORHOOD_SIZE]) -> NumType {
        let mut result = NumType::zero();
        for n in 0..NEIGHBORHOOD_SIZE {
            result = result + self.weights[n] * args[n];
        }
        result
    }

    /// Same as `apply`, reading neighbors out of a flat buffer.
    /// `linear_offsets` come from `AABB::coord_offset_to_linear`.
    #[inline]
    pub fn apply_linear(
        &self,
        buffer: &[NumType],
        center: usize,
        linear_offsets: &[isize; NEIGHBORHOOD_SIZE],
    ) -> NumType {
        let args = linear_offsets
            .map(|offset| buffer[center.wrapping_add_signed(offset)]);
        self.apply(&args)
    }
}

impl<NumType: NumTrait, const NEIGHBORHOOD_SIZE: usize>
    Stencil<NumType, 2, NEIGHBORHOOD_SIZE>
{
    /// Apply a radius 1 stencil to columns `1..nj - 1` of one row.
    /// `rows` holds the rows above, at, and below the output row.
    /// Columns outside that range in `output` are not touched.
    #[inline]
    pub fn apply_rows(
        &self,
        rows: [&[NumType]; 3],
        output: &mut [NumType],
        nj: usize,
    ) {
        debug_assert!(rows.iter().all(|r| r.len() >= nj));
        debug_assert!(output.len() >= nj);
        for j in 1..nj.saturating_sub(1) {
            let args = self.offsets.map(|offset| {
                let row = rows[(offset[0] + 1) as usize];
                row[j.wrapping_add_signed(offset[1] as isize)]
            });
            output[j] = self.apply(&args);
        }
    }
}
