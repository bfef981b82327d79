use crate::device::*;
use crate::domain::*;
use crate::strategy::*;
use crate::util::*;
use clap::ValueEnum;

/// Run the 2D convolution over the `ni x nj` region,
/// writing the interior of `output` from `input`.
///
/// Dimensions below 3 leave `output` untouched.
/// `ni` and `nj` must fit inside both grids and the grids must share a shape;
/// that is only checked in debug builds.
pub fn kernel_conv2d<S: ExecutionStrategy, NumType: NumTrait>(
    strategy: &S,
    ni: usize,
    nj: usize,
    input: &Grid<NumType>,
    output: &mut Grid<NumType>,
) {
    profiling::scope!("kernel_conv2d");
    strategy.apply(input, output, ni, nj);
}

/// Which execution strategy to build.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    /// Multi-core loop on the host.
    #[default]
    Host,

    /// Simulated device, grids moved as flat blocks.
    OffloadFlat,

    /// Simulated device, grids moved row by row.
    OffloadNested,
}

/// Everything needed to build any strategy.
#[derive(Copy, Clone, Debug)]
pub struct StrategyParameters {
    pub strategy_type: StrategyType,
    pub map_mode: MapMode,
    /// Host row blocks, one per thread of the pool the kernel runs in.
    pub threads: usize,
    pub teams: usize,
    pub min_rows: usize,
}

impl std::default::Default for StrategyParameters {
    fn default() -> Self {
        StrategyParameters {
            strategy_type: StrategyType::Host,
            map_mode: MapMode::Extent,
            threads: 1,
            teams: 1,
            min_rows: 1,
        }
    }
}

/// A configured strategy, chosen at runtime.
pub enum Strategy {
    Host(HostParallel),
    OffloadFlat(FlatOffload),
    OffloadNested(NestedOffload),
}

impl Strategy {
    pub fn new(params: &StrategyParameters) -> Result<Self, DeviceError> {
        let result = match params.strategy_type {
            StrategyType::Host => Strategy::Host(HostParallel::new(
                params.threads,
                params.min_rows,
            )),
            StrategyType::OffloadFlat => {
                Strategy::OffloadFlat(FlatOffload::new(Device::new(
                    params.teams,
                )?))
            }
            StrategyType::OffloadNested => Strategy::OffloadNested(
                NestedOffload::new(Device::new(params.teams)?, params.map_mode),
            ),
        };
        Ok(result)
    }
}

impl ExecutionStrategy for Strategy {
    fn name(&self) -> &'static str {
        match self {
            Strategy::Host(s) => s.name(),
            Strategy::OffloadFlat(s) => s.name(),
            Strategy::OffloadNested(s) => s.name(),
        }
    }

    fn apply<NumType: NumTrait>(
        &self,
        input: &Grid<NumType>,
        output: &mut Grid<NumType>,
        ni: usize,
        nj: usize,
    ) {
        match self {
            Strategy::Host(s) => s.apply(input, output, ni, nj),
            Strategy::OffloadFlat(s) => s.apply(input, output, ni, nj),
            Strategy::OffloadNested(s) => s.apply(input, output, ni, nj),
        }
    }

    fn transfer_stats(&self) -> Option<TransferStats> {
        match self {
            Strategy::Host(s) => s.transfer_stats(),
            Strategy::OffloadFlat(s) => s.transfer_stats(),
            Strategy::OffloadNested(s) => s.transfer_stats(),
        }
    }
}
