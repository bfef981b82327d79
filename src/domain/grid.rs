use crate::util::*;

/// Owned, dense, row-major 2D grid.
/// Cell `(i, j)` lives at `i * cols + j`.
/// Either dimension may be zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<NumType: NumTrait> {
    rows: usize,
    cols: usize,
    buffer: Vec<NumType>,
}

impl<NumType: NumTrait> Grid<NumType> {
    /// Zero filled grid.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, NumType::zero())
    }

    pub fn filled(rows: usize, cols: usize, value: NumType) -> Self {
        Grid {
            rows,
            cols,
            buffer: vec![value; rows * cols],
        }
    }

    pub fn from_fn<F: Fn(usize, usize) -> NumType>(
        rows: usize,
        cols: usize,
        f: F,
    ) -> Self {
        let mut result = Self::new(rows, cols);
        if cols == 0 {
            return result;
        }
        for (i, row) in result.buffer.chunks_mut(cols).enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = f(i, j);
            }
        }
        result
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn buffer(&self) -> &[NumType] {
        &self.buffer
    }

    #[inline]
    pub fn buffer_mut(&mut self) -> &mut [NumType] {
        &mut self.buffer
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[NumType] {
        &self.buffer[i * self.cols..(i + 1) * self.cols]
    }

    #[inline]
    pub fn row_mut(&mut self, i: usize) -> &mut [NumType] {
        let cols = self.cols;
        &mut self.buffer[i * cols..(i + 1) * cols]
    }

    #[track_caller]
    pub fn get(&self, i: usize, j: usize) -> NumType {
        debug_assert!(
            i < self.rows && j < self.cols,
            "({i}, {j}) outside {} x {}",
            self.rows,
            self.cols
        );
        self.buffer[i * self.cols + j]
    }
}

/// Cells `[1, ni - 2] x [1, nj - 2]`, the only ones the kernel writes.
/// None when either dimension is below 3.
pub fn interior_aabb(ni: usize, nj: usize) -> Option<AABB<2>> {
    if ni < 3 || nj < 3 {
        return None;
    }
    AABB::from_mm(
        vector![0, 0],
        vector![coord_index(ni) - 1, coord_index(nj) - 1],
    )
    .shrink_uniform(1)
}

/// True for cells on the outer ring of an `ni x nj` region.
pub fn is_border(i: usize, j: usize, ni: usize, nj: usize) -> bool {
    i == 0 || j == 0 || i + 1 >= ni || j + 1 >= nj
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn grid_indexing_test() {
        let g = Grid::<f64>::from_fn(3, 4, |i, j| (10 * i + j) as f64);
        assert_eq!(g.rows(), 3);
        assert_eq!(g.cols(), 4);
        assert_eq!(g.buffer().len(), 12);
        assert_approx_eq!(f64, g.get(2, 3), 23.0);
        assert_approx_eq!(f64, g.buffer()[2 * 4 + 3], 23.0);
        assert_eq!(g.row(1), &[10.0, 11.0, 12.0, 13.0]);
    }

    #[test]
    fn grid_mutation_test() {
        let mut g = Grid::<f32>::new(4, 4);
        for v in g.buffer() {
            assert_eq!(*v, 0.0);
        }

        g.row_mut(3)[0] = 5.0;
        assert_approx_eq!(f32, g.get(3, 0), 5.0);
        g.buffer_mut()[4 + 2] = 7.0;
        assert_approx_eq!(f32, g.get(1, 2), 7.0);
    }

    #[test]
    fn empty_grid_test() {
        for (rows, cols) in [(0, 0), (0, 5), (5, 0)] {
            let g = Grid::<f64>::new(rows, cols);
            assert_eq!(g.rows(), rows);
            assert_eq!(g.cols(), cols);
            assert!(g.buffer().is_empty());

            let g = Grid::<f64>::from_fn(rows, cols, |_, _| 1.0);
            assert!(g.buffer().is_empty());
            assert_eq!(interior_aabb(rows, cols), None);
        }
        let g = Grid::<f32>::filled(3, 0, 2.0);
        assert!(g.row(2).is_empty());
    }

    #[test]
    fn interior_test() {
        assert_eq!(interior_aabb(2, 10), None);
        assert_eq!(interior_aabb(10, 2), None);
        assert_eq!(
            interior_aabb(3, 3),
            Some(AABB::new(matrix![1, 1; 1, 1]))
        );
        assert_eq!(
            interior_aabb(5, 8),
            Some(AABB::new(matrix![1, 3; 1, 6]))
        );

        let interior = interior_aabb(5, 8).unwrap();
        for i in 0..5 {
            for j in 0..8 {
                let inside = (interior.min()[0]..=interior.max()[0])
                    .contains(&(i as i32))
                    && (interior.min()[1]..=interior.max()[1])
                        .contains(&(j as i32));
                assert_eq!(is_border(i, j, 5, 8), !inside);
            }
        }
    }
}
