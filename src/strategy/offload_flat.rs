use crate::device::*;
use crate::domain::*;
use crate::stencil::standard_stencils::*;
use crate::strategy::*;
use crate::util::*;

/// Offload with explicit row-major addressing.
///
/// The first `ni` rows of each grid travel as one contiguous block,
/// and device code reads neighbors at `center + linear_offset`
/// with `center = i * stride + j`.
/// A is mapped to the device only.
/// B is mapped both ways so its border cells survive the round trip.
pub struct FlatOffload {
    device: Device,
}

impl FlatOffload {
    pub fn new(device: Device) -> Self {
        FlatOffload { device }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }
}

impl ExecutionStrategy for FlatOffload {
    fn name(&self) -> &'static str {
        "offload-flat"
    }

    fn apply<NumType: NumTrait>(
        &self,
        input: &Grid<NumType>,
        output: &mut Grid<NumType>,
        ni: usize,
        nj: usize,
    ) {
        profiling::scope!("offload_flat::apply");
        debug_check_shapes(input, output, ni, nj);
        let Some(interior) = interior_aabb(ni, nj) else {
            return;
        };

        let stencil = conv_2d::<NumType>();
        let stride = input.cols();
        let mapped = AABB::from_mm(
            vector![0, 0],
            vector![coord_index(ni) - 1, coord_index(stride) - 1],
        );
        let extent = mapped.buffer_size();
        let linear_offsets =
            mapped.coord_offset_to_linear(stencil.offsets());

        let a_device = self.device.map_to(&input.buffer()[..extent]);
        let mut b_device = self.device.map_to(&output.buffer()[..extent]);

        {
            let a = a_device.as_slice();
            let first_row = interior.min()[0] as usize;
            let last_row = interior.max()[0] as usize;
            let b = &mut b_device.as_mut_slice()
                [first_row * stride..(last_row + 1) * stride];
            self.device.teams_distribute(
                b,
                stride,
                first_row,
                |block_first, block| {
                    let first = vector![coord_index(block_first), 0];
                    let block_base = mapped.coord_to_linear(&first);
                    for r in 0..block.len() / stride {
                        let row_base = block_base + r * stride;
                        for j in 1..nj - 1 {
                            let center = row_base + j;
                            block[center - block_base] = stencil.apply_linear(
                                a,
                                center,
                                &linear_offsets,
                            );
                        }
                    }
                },
            );
        }

        self.device
            .copy_back(&b_device, &mut output.buffer_mut()[..extent]);
    }

    fn transfer_stats(&self) -> Option<TransferStats> {
        Some(self.device.transfer_stats())
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn flat_constant_input_test() {
        let strategy = FlatOffload::new(Device::new(2).unwrap());
        let input = Grid::<f32>::filled(5, 9, 4.0);
        let mut output = Grid::<f32>::filled(5, 9, 9.0);
        strategy.apply(&input, &mut output, 5, 9);
        for i in 0..5 {
            for j in 0..9 {
                let e = if is_border(i, j, 5, 9) { 9.0 } else { 2.0 };
                assert_approx_eq!(f32, output.get(i, j), e, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn flat_transfer_accounting_test() {
        let strategy = FlatOffload::new(Device::new(2).unwrap());
        let input = Grid::<f64>::new(6, 4);
        let mut output = Grid::<f64>::new(6, 4);
        strategy.apply(&input, &mut output, 6, 4);

        // A in, B in and out
        let stats = strategy.transfer_stats().unwrap();
        assert_eq!(stats.bytes_to_device, 2 * 6 * 4 * 8);
        assert_eq!(stats.bytes_from_device, 6 * 4 * 8);
    }

    #[test]
    fn flat_subregion_test() {
        // stride 9, only the 5 x 6 corner is in play, split over 3 teams
        let input =
            Grid::<f64>::from_fn(7, 9, |i, j| ((i * 9 + j) % 5) as f64 - 2.0);
        let mut expected = Grid::<f64>::filled(7, 9, -7.0);
        HostParallel::new(1, 1).apply(&input, &mut expected, 5, 6);

        let strategy = FlatOffload::new(Device::new(3).unwrap());
        let mut output = Grid::<f64>::filled(7, 9, -7.0);
        strategy.apply(&input, &mut output, 5, 6);
        assert_eq!(output, expected);
        for i in 0..7 {
            for j in 0..9 {
                if i == 0 || j == 0 || i >= 4 || j >= 5 {
                    assert_eq!(output.get(i, j), -7.0);
                }
            }
        }
    }

    #[test]
    fn flat_no_interior_test() {
        let strategy = FlatOffload::new(Device::new(2).unwrap());
        let input = Grid::<f64>::filled(2, 8, 1.0);
        let mut output = Grid::<f64>::filled(2, 8, 5.0);
        strategy.apply(&input, &mut output, 2, 8);
        for v in output.buffer() {
            assert_eq!(*v, 5.0);
        }
        assert_eq!(strategy.transfer_stats(), Some(TransferStats::default()));
    }
}
