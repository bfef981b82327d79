pub use nalgebra::{matrix, vector};
pub use num_traits::{Float, FromPrimitive, One, Zero};

mod aabb;
pub mod indexing;
pub use aabb::*;

/// Element type of a grid.
/// Anything float-like that can cross thread boundaries.
pub trait NumTrait:
    Float
    + FromPrimitive
    + Send
    + Sync
    + std::fmt::Debug
    + std::fmt::Display
    + 'static
{
}

impl<T> NumTrait for T where
    T: Float
        + FromPrimitive
        + Send
        + Sync
        + std::fmt::Debug
        + std::fmt::Display
        + 'static
{
}

/// Coordinates are `i32`, so grid dimensions used in an `AABB`
/// must not exceed `i32::MAX`.
pub type Coord<const GRID_DIMENSION: usize> =
    nalgebra::SVector<i32, { GRID_DIMENSION }>;

/// Column 0 holds the min corner, column 1 the max corner.
pub type Bounds<const GRID_DIMENSION: usize> =
    nalgebra::SMatrix<i32, { GRID_DIMENSION }, 2>;

/// Lossy conversion used for weights and initial values.
/// Every float type we care about can represent an f64 approximately,
/// so the NaN fallback only triggers for exotic `NumTrait` impls.
#[inline]
pub fn from_f64<NumType: NumTrait>(value: f64) -> NumType {
    NumType::from_f64(value).unwrap_or_else(NumType::nan)
}

#[inline]
pub fn from_usize<NumType: NumTrait>(value: usize) -> NumType {
    NumType::from_usize(value).unwrap_or_else(NumType::nan)
}

/// Grid extent or index as a coordinate component.
/// Saturates at `i32::MAX` in release builds.
#[inline]
#[track_caller]
pub fn coord_index(n: usize) -> i32 {
    debug_assert!(
        n <= i32::MAX as usize,
        "{n} does not fit a coordinate component"
    );
    i32::try_from(n).unwrap_or(i32::MAX)
}
