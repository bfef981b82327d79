use crate::domain::*;
use crate::par_slice;
use crate::util::*;
use std::io::prelude::*;

/// Elements per line in `dump` output.
pub const DUMP_LINE_WIDTH: usize = 20;

/// Write every element of the `ni x nj` region as `{:.2} `,
/// breaking the line after each element whose linear index
/// `i * nj + j` is a multiple of `DUMP_LINE_WIDTH`.
/// The exact text is diagnostic only.
pub fn dump<NumType: NumTrait, W: Write>(
    ni: usize,
    nj: usize,
    grid: &Grid<NumType>,
    output: &mut W,
) -> std::io::Result<()> {
    profiling::scope!("debug_io::dump");
    debug_assert!(ni <= grid.rows() && nj <= grid.cols());
    let mut output = std::io::BufWriter::new(output);
    for i in 0..ni {
        for j in 0..nj {
            write!(output, "{:.2} ", grid.get(i, j))?;
            if (i * nj + j) % DUMP_LINE_WIDTH == 0 {
                writeln!(output)?;
            }
        }
    }
    writeln!(output)?;
    output.flush()
}

/// One line per grid row, comma separated.
pub fn write_csv<NumType: NumTrait, P: AsRef<std::path::Path>>(
    grid: &Grid<NumType>,
    path: &P,
) -> std::io::Result<()> {
    println!("Writing: {:?}", path.as_ref());
    let mut output =
        std::io::BufWriter::new(std::fs::File::create(path)?);
    for i in 0..grid.rows() {
        if let Some((first, rest)) = grid.row(i).split_first() {
            write!(output, "{first}")?;
            for r in rest {
                write!(output, ", {r}")?;
            }
        }
        writeln!(output)?;
    }
    output.flush()
}

/// Colormapped picture of a grid, normalized to its own min and max.
/// Rows run down the image.
pub fn write_image<NumType: NumTrait, P: AsRef<std::path::Path>>(
    grid: &Grid<NumType>,
    path: &P,
    chunk_size: usize,
) -> image::ImageResult<()> {
    profiling::scope!("debug_io::write_image");
    println!("Writing: {:?}", path.as_ref());
    let gradient = colorous::TURBO;
    let (lo, hi) = par_slice::min_max(grid.buffer(), chunk_size)
        .map(|(lo, hi)| {
            (lo.to_f64().unwrap_or(0.0), hi.to_f64().unwrap_or(0.0))
        })
        .unwrap_or((0.0, 0.0));
    let range = hi - lo;

    let mut img =
        image::RgbImage::new(grid.cols() as u32, grid.rows() as u32);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let v = grid.get(y as usize, x as usize).to_f64().unwrap_or(lo);
        let t = if range > 0.0 { (v - lo) / range } else { 0.5 };
        *pixel = image::Rgb(gradient.eval_continuous(t).as_array());
    }
    img.save(path)
}
