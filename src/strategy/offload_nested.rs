use crate::device::*;
use crate::domain::*;
use crate::stencil::standard_stencils::*;
use crate::strategy::*;
use crate::util::*;
use clap::ValueEnum;

/// How much of each grid the nested offload maps.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum MapMode {
    /// Exactly the `ni x nj` region.
    #[default]
    Extent,

    /// The whole grid object, whatever `ni` and `nj` are.
    Whole,
}

/// Offload that keeps 2D addressing on the device,
/// one device allocation per row.
/// A is mapped to the device only, B both ways.
pub struct NestedOffload {
    device: Device,
    map_mode: MapMode,
}

impl NestedOffload {
    pub fn new(device: Device, map_mode: MapMode) -> Self {
        NestedOffload { device, map_mode }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn map_mode(&self) -> MapMode {
        self.map_mode
    }

    /// Rows and columns that cross to the device.
    pub fn mapped_extent<NumType: NumTrait>(
        &self,
        grid: &Grid<NumType>,
        ni: usize,
        nj: usize,
    ) -> (usize, usize) {
        match self.map_mode {
            MapMode::Extent => (ni, nj),
            MapMode::Whole => (grid.rows(), grid.cols()),
        }
    }
}

impl ExecutionStrategy for NestedOffload {
    fn name(&self) -> &'static str {
        "offload-nested"
    }

    fn apply<NumType: NumTrait>(
        &self,
        input: &Grid<NumType>,
        output: &mut Grid<NumType>,
        ni: usize,
        nj: usize,
    ) {
        profiling::scope!("offload_nested::apply");
        debug_check_shapes(input, output, ni, nj);
        let Some(interior) = interior_aabb(ni, nj) else {
            return;
        };

        let stencil = conv_2d::<NumType>();
        let (rows, cols) = self.mapped_extent(input, ni, nj);
        let a_device = self.device.map_rows_to(input, rows, cols);
        let mut b_device = self.device.map_rows_to(output, rows, cols);

        {
            let a = a_device.rows();
            let first_row = interior.min()[0] as usize;
            let last_row = interior.max()[0] as usize;
            let b = &mut b_device.rows_mut()[first_row..=last_row];
            self.device.teams_distribute(
                b,
                1,
                first_row,
                |block_first, block| {
                    for (r, b_row) in block.iter_mut().enumerate() {
                        let i = block_first + r;
                        stencil.apply_rows(
                            [
                                a[i - 1].as_slice(),
                                a[i].as_slice(),
                                a[i + 1].as_slice(),
                            ],
                            b_row,
                            nj,
                        );
                    }
                },
            );
        }

        self.device.copy_rows_back(&b_device, output);
    }

    fn transfer_stats(&self) -> Option<TransferStats> {
        Some(self.device.transfer_stats())
    }
}
