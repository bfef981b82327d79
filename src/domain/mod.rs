//! Grids hold the benchmark's input and output.
//! A grid is one contiguous row-major buffer,
//! sized at runtime rather than at compile time.

mod debug_io;
mod grid;

pub use debug_io::*;
pub use grid::*;
