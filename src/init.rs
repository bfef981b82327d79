use crate::domain::*;
use crate::util::*;
use rand::prelude::*;
use rayon::prelude::*;

/// Size of the buffer `flush_cache` walks through, larger than any
/// last level cache we expect to run on.
pub const CACHE_FLUSH_BYTES: usize = 32770 * 1024;

/// Deterministic benchmark input, `A[i][j] = (i + j) / nj`.
/// Only the `ni x nj` region is written.
pub fn init_array<NumType: NumTrait>(
    ni: usize,
    nj: usize,
    grid: &mut Grid<NumType>,
) {
    profiling::scope!("init::init_array");
    debug_assert!(ni <= grid.rows() && nj <= grid.cols());
    let stride = grid.cols();
    if stride == 0 {
        return;
    }
    let nj_f = from_usize::<NumType>(nj);
    grid.buffer_mut()[..ni * stride]
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(i, row): (usize, &mut [NumType])| {
            for (j, v) in row[..nj].iter_mut().enumerate() {
                *v = from_usize::<NumType>(i + j) / nj_f;
            }
        });
}

/// Uniform values in `[0, 1)`, one thread local generator per chunk.
pub fn rand_init<NumType: NumTrait>(
    grid: &mut Grid<NumType>,
    chunk_size: usize,
) {
    profiling::scope!("init::rand_init");
    grid.buffer_mut()
        .par_chunks_mut(chunk_size)
        .for_each(|chunk: &mut [NumType]| {
            let mut rng = rand::thread_rng();
            for v in chunk {
                *v = from_f64(rng.gen::<f64>());
            }
        });
}

/// Evict the grids from cache before timing by reading
/// a buffer larger than the cache.
pub fn flush_cache() {
    profiling::scope!("init::flush_cache");
    let flush = vec![0.0f64; CACHE_FLUSH_BYTES / std::mem::size_of::<f64>()];
    let total: f64 = flush.iter().sum();
    debug_assert!(total <= 10.0);
    std::hint::black_box(total);
}
