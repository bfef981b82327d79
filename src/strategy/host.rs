use crate::domain::*;
use crate::stencil::standard_stencils::*;
use crate::strategy::*;
use crate::util::*;
use rayon::prelude::*;

/// Multi-core loop on the calling rayon pool.
/// Interior rows are split into `blocks` contiguous blocks,
/// each at least `min_rows` tall.
/// The worker count is the size of whichever pool runs `apply`,
/// so `blocks` is normally set to that pool's thread count.
#[derive(Debug, Copy, Clone)]
pub struct HostParallel {
    pub blocks: usize,
    pub min_rows: usize,
}

impl HostParallel {
    pub fn new(blocks: usize, min_rows: usize) -> Self {
        HostParallel {
            blocks: blocks.max(1),
            min_rows: min_rows.max(1),
        }
    }

    /// Rows per block for `height` interior rows.
    pub fn rows_per_block(&self, height: usize) -> usize {
        self.min_rows.max(height.div_ceil(self.blocks))
    }
}

impl Default for HostParallel {
    fn default() -> Self {
        HostParallel::new(rayon::current_num_threads(), 1)
    }
}

impl ExecutionStrategy for HostParallel {
    fn name(&self) -> &'static str {
        "host"
    }

    fn apply<NumType: NumTrait>(
        &self,
        input: &Grid<NumType>,
        output: &mut Grid<NumType>,
        ni: usize,
        nj: usize,
    ) {
        profiling::scope!("host_parallel::apply");
        debug_check_shapes(input, output, ni, nj);
        let Some(interior) = interior_aabb(ni, nj) else {
            return;
        };

        let stencil = conv_2d::<NumType>();
        let stride = output.cols();
        let first_row = interior.min()[0] as usize;
        let last_row = interior.max()[0] as usize;
        let height = last_row - first_row + 1;
        let rows_per_block = self.rows_per_block(height);

        output.buffer_mut()[first_row * stride..(last_row + 1) * stride]
            .par_chunks_mut(rows_per_block * stride)
            .enumerate()
            .for_each(|(b, block): (usize, &mut [NumType])| {
                profiling::scope!("host_parallel: Thread callback");
                let block_first = first_row + b * rows_per_block;
                for (r, output_row) in block.chunks_mut(stride).enumerate() {
                    let i = block_first + r;
                    stencil.apply_rows(
                        [input.row(i - 1), input.row(i), input.row(i + 1)],
                        output_row,
                        nj,
                    );
                }
            });
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn rows_per_block_test() {
        let s = HostParallel::new(4, 1);
        assert_eq!(s.rows_per_block(10), 3);
        assert_eq!(s.rows_per_block(1), 1);

        let s = HostParallel::new(4, 8);
        assert_eq!(s.rows_per_block(10), 8);

        let s = HostParallel::new(0, 0);
        assert_eq!(s.blocks, 1);
        assert_eq!(s.rows_per_block(10), 10);
    }

    #[test]
    fn host_constant_input_test() {
        // Weights sum to 0.5, so a constant field scales by half.
        let input = Grid::<f64>::filled(6, 7, 2.0);
        let mut output = Grid::<f64>::filled(6, 7, -3.0);
        HostParallel::new(3, 1).apply(&input, &mut output, 6, 7);
        for i in 0..6 {
            for j in 0..7 {
                let e = if is_border(i, j, 6, 7) { -3.0 } else { 1.0 };
                assert_approx_eq!(f64, output.get(i, j), e, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn host_subregion_test() {
        // Only the 4 x 4 corner is in play, the rest of the grid is left alone.
        let input = Grid::<f64>::filled(6, 6, 2.0);
        let mut output = Grid::<f64>::filled(6, 6, -3.0);
        HostParallel::new(2, 1).apply(&input, &mut output, 4, 4);
        for i in 0..6 {
            for j in 0..6 {
                let e = if (1..=2).contains(&i) && (1..=2).contains(&j) {
                    1.0
                } else {
                    -3.0
                };
                assert_approx_eq!(f64, output.get(i, j), e, epsilon = 1e-12);
            }
        }
    }
}
