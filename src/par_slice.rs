use crate::util::*;
use rayon::prelude::*;

/// Largest `|a - b|` over both slices.
/// NaN anywhere makes the result NaN.
pub fn max_abs_diff<NumType: NumTrait>(
    a_slice: &[NumType],
    b_slice: &[NumType],
    chunk_size: usize,
) -> NumType {
    debug_assert_eq!(a_slice.len(), b_slice.len());
    a_slice
        .par_chunks(chunk_size)
        .zip(b_slice.par_chunks(chunk_size))
        .map(|(a_chunk, b_chunk)| {
            let mut result = NumType::zero();
            for (a, b) in a_chunk.iter().zip(b_chunk) {
                let d = (*a - *b).abs();
                if d.is_nan() || d > result {
                    result = d;
                }
                if result.is_nan() {
                    break;
                }
            }
            result
        })
        .reduce(NumType::zero, |x, y| {
            if x.is_nan() || y.is_nan() {
                NumType::nan()
            } else {
                x.max(y)
            }
        })
}

/// Smallest and largest value, None for an empty slice.
pub fn min_max<NumType: NumTrait>(
    a_slice: &[NumType],
    chunk_size: usize,
) -> Option<(NumType, NumType)> {
    a_slice
        .par_chunks(chunk_size)
        .filter_map(|a_chunk| {
            let first = *a_chunk.first()?;
            Some(a_chunk.iter().fold((first, first), |(lo, hi), a| {
                (lo.min(*a), hi.max(*a))
            }))
        })
        .reduce_with(|(lo_a, hi_a), (lo_b, hi_b)| {
            (lo_a.min(lo_b), hi_a.max(hi_b))
        })
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn max_abs_diff_test() {
        let n = 1000;
        let a: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let mut b = a.clone();
        assert_approx_eq!(f64, max_abs_diff(&a, &b, 7), 0.0);

        b[513] -= 2.5;
        b[17] += 1.0;
        assert_approx_eq!(f64, max_abs_diff(&a, &b, 7), 2.5);

        b[900] = f64::NAN;
        assert!(max_abs_diff(&a, &b, 7).is_nan());
    }

    #[test]
    fn min_max_test() {
        let a: Vec<f32> = vec![3.0, -2.0, 8.5, 0.0, 1.0];
        let (lo, hi) = min_max(&a, 2).unwrap();
        assert_approx_eq!(f32, lo, -2.0);
        assert_approx_eq!(f32, hi, 8.5);

        let empty: Vec<f32> = Vec::new();
        assert_eq!(min_max(&empty, 2), None);
        assert_approx_eq!(f32, max_abs_diff(&empty, &empty, 2), 0.0);
    }
}
