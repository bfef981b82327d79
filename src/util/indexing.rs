use crate::util::*;

pub fn real_buffer_size<const DIMENSION: usize>(
    exclusive_bound: &Coord<DIMENSION>,
) -> usize {
    let mut accumulator = 1;
    for d in exclusive_bound {
        accumulator *= *d as usize;
    }
    accumulator
}

/// Row-major: the highest dimension moves fastest,
/// so in 2D this is `i * nj + j`.
pub fn coord_to_linear<const GRID_DIMENSION: usize>(
    coord: &Coord<GRID_DIMENSION>,
    exclusive_bounds: &Coord<GRID_DIMENSION>,
) -> usize {
    let mut accumulator = 0;
    for d in 0..GRID_DIMENSION {
        debug_assert!(coord[d] >= 0);
        accumulator = accumulator * exclusive_bounds[d] as usize
            + coord[d] as usize;
    }
    accumulator
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn buffer_size_test() {
        {
            let dimensions = vector![5];
            assert_eq!(real_buffer_size(&dimensions), 5);
        }

        {
            let dimensions = vector![5, 7];
            assert_eq!(real_buffer_size(&dimensions), 5 * 7);
        }
    }

    #[test]
    fn coord_to_linear_index_test() {
        {
            let index = vector![5, 7];
            let bound = vector![20, 30];
            assert_eq!(coord_to_linear(&index, &bound), 5 * 30 + 7);
        }

        {
            let index = vector![5, 7, 11];
            let bound = vector![20, 20, 20];
            assert_eq!(
                coord_to_linear(&index, &bound),
                5 * 20 * 20 + 7 * 20 + 11
            );
        }

        {
            let index = vector![5];
            let bound = vector![20];
            assert_eq!(coord_to_linear(&index, &bound), 5);
        }
    }
}
