//! A simulated accelerator.
//!
//! The device has its own worker pool and its own memory.
//! Host grids are never visible to device code;
//! data crosses over only through the bulk `map_*` and `copy_back` calls,
//! which are counted so a run can report how much it moved.

use crate::domain::*;
use crate::util::*;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug)]
pub enum DeviceError {
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl std::fmt::Display for DeviceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceError::ThreadPool(e) => {
                write!(f, "failed to create device teams: {e}")
            }
        }
    }
}

impl std::error::Error for DeviceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeviceError::ThreadPool(e) => Some(e),
        }
    }
}

impl From<rayon::ThreadPoolBuildError> for DeviceError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        DeviceError::ThreadPool(e)
    }
}

/// Bytes moved across the host/device boundary.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct TransferStats {
    pub bytes_to_device: usize,
    pub bytes_from_device: usize,
}

pub struct Device {
    pool: rayon::ThreadPool,
    teams: usize,
    bytes_to_device: AtomicUsize,
    bytes_from_device: AtomicUsize,
}

/// Device memory addressed as one contiguous block.
pub struct FlatBuffer<NumType> {
    data: Vec<NumType>,
}

impl<NumType> FlatBuffer<NumType> {
    pub fn as_slice(&self) -> &[NumType] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [NumType] {
        &mut self.data
    }
}

/// Device memory that keeps one allocation per row.
pub struct NestedBuffer<NumType> {
    rows: Vec<Vec<NumType>>,
}

impl<NumType> NestedBuffer<NumType> {
    pub fn rows(&self) -> &[Vec<NumType>] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Vec<NumType>] {
        &mut self.rows
    }
}

impl Device {
    pub fn new(teams: usize) -> Result<Self, DeviceError> {
        let teams = teams.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(teams)
            .thread_name(|i| format!("device_team_{}", i))
            .build()?;
        Ok(Device {
            pool,
            teams,
            bytes_to_device: AtomicUsize::new(0),
            bytes_from_device: AtomicUsize::new(0),
        })
    }

    pub fn teams(&self) -> usize {
        self.teams
    }

    pub fn transfer_stats(&self) -> TransferStats {
        TransferStats {
            bytes_to_device: self.bytes_to_device.load(Ordering::Relaxed),
            bytes_from_device: self.bytes_from_device.load(Ordering::Relaxed),
        }
    }

    fn record_to<NumType>(&self, elements: usize) {
        self.bytes_to_device.fetch_add(
            elements * std::mem::size_of::<NumType>(),
            Ordering::Relaxed,
        );
    }

    fn record_from<NumType>(&self, elements: usize) {
        self.bytes_from_device.fetch_add(
            elements * std::mem::size_of::<NumType>(),
            Ordering::Relaxed,
        );
    }

    /// Copy a host slice into a new contiguous device block.
    pub fn map_to<NumType: NumTrait>(
        &self,
        host: &[NumType],
    ) -> FlatBuffer<NumType> {
        profiling::scope!("device::map_to");
        self.record_to::<NumType>(host.len());
        FlatBuffer {
            data: host.to_vec(),
        }
    }

    /// Copy a device block back over the host slice it came from.
    pub fn copy_back<NumType: NumTrait>(
        &self,
        buffer: &FlatBuffer<NumType>,
        host: &mut [NumType],
    ) {
        profiling::scope!("device::copy_back");
        debug_assert_eq!(buffer.data.len(), host.len());
        self.record_from::<NumType>(buffer.data.len());
        host.copy_from_slice(&buffer.data);
    }

    /// Copy the top left `rows x cols` corner of a grid,
    /// one device allocation per row.
    pub fn map_rows_to<NumType: NumTrait>(
        &self,
        grid: &Grid<NumType>,
        rows: usize,
        cols: usize,
    ) -> NestedBuffer<NumType> {
        profiling::scope!("device::map_rows_to");
        debug_assert!(rows <= grid.rows() && cols <= grid.cols());
        self.record_to::<NumType>(rows * cols);
        NestedBuffer {
            rows: (0..rows).map(|i| grid.row(i)[..cols].to_vec()).collect(),
        }
    }

    /// Copy every device row back into the matching host row.
    pub fn copy_rows_back<NumType: NumTrait>(
        &self,
        buffer: &NestedBuffer<NumType>,
        grid: &mut Grid<NumType>,
    ) {
        profiling::scope!("device::copy_rows_back");
        for (i, row) in buffer.rows.iter().enumerate() {
            self.record_from::<NumType>(row.len());
            grid.row_mut(i)[..row.len()].copy_from_slice(row);
        }
    }

    /// Rows per team when `height` rows are split evenly, never zero.
    pub fn rows_per_team(&self, height: usize) -> usize {
        height.div_ceil(self.teams).max(1)
    }

    /// Run `f` on the device's own workers.
    pub fn run<R: Send, F: FnOnce() -> R + Send>(&self, f: F) -> R {
        self.pool.install(f)
    }

    /// Statically split the rows held in `buffer` into one contiguous
    /// block per team and run `f(first_row_index, block)` on the device.
    /// Each row is `row_len` items long, and `buffer` starts at row
    /// `row_offset` of whatever it was cut from.
    pub fn teams_distribute<Item: Send, F>(
        &self,
        buffer: &mut [Item],
        row_len: usize,
        row_offset: usize,
        f: F,
    ) where
        F: Fn(usize, &mut [Item]) + Send + Sync,
    {
        debug_assert!(row_len > 0 && buffer.len() % row_len == 0);
        let rows_per_team = self.rows_per_team(buffer.len() / row_len);
        self.run(|| {
            buffer
                .par_chunks_mut(rows_per_team * row_len)
                .enumerate()
                .for_each(|(t, block)| {
                    profiling::scope!("device: Team callback");
                    f(row_offset + t * rows_per_team, block)
                })
        });
    }
}
