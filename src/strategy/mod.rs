//! Interchangeable ways of running the convolution.
//! All of them compute the same cells with the same summation order,
//! they differ only in where the loop runs and how the grids reach it.

mod host;
mod offload_flat;
mod offload_nested;

pub use host::*;
pub use offload_flat::*;
pub use offload_nested::*;

use crate::device::TransferStats;
use crate::domain::*;
use crate::util::*;

pub trait ExecutionStrategy: Sync {
    fn name(&self) -> &'static str;

    /// Write the interior of the `ni x nj` region of `output`
    /// from the same region of `input`.
    /// Border cells of `output` keep whatever they held.
    fn apply<NumType: NumTrait>(
        &self,
        input: &Grid<NumType>,
        output: &mut Grid<NumType>,
        ni: usize,
        nj: usize,
    );

    /// Host/device traffic so far, None for strategies without a device.
    fn transfer_stats(&self) -> Option<TransferStats> {
        None
    }
}

/// Precondition checks shared by every strategy, debug builds only.
#[track_caller]
pub(crate) fn debug_check_shapes<NumType: NumTrait>(
    input: &Grid<NumType>,
    output: &Grid<NumType>,
    ni: usize,
    nj: usize,
) {
    debug_assert_eq!(input.rows(), output.rows());
    debug_assert_eq!(input.cols(), output.cols());
    debug_assert!(
        ni <= input.rows() && nj <= input.cols(),
        "{ni} x {nj} exceeds grid {} x {}",
        input.rows(),
        input.cols()
    );
}
