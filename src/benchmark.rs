use crate::build_info;
use crate::device::*;
use crate::domain::*;
use crate::init;
use crate::instruments::*;
use crate::kernel::*;
use crate::par_slice;
use crate::strategy::*;
use crate::util::*;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[cfg(feature = "profile-with-puffin")]
use std::sync::Mutex;

#[cfg(feature = "profile-with-puffin")]
lazy_static::lazy_static! {
    static ref puffin_server: Mutex<Option<puffin_http::Server>> = {
        println!("Initializing profiling server:");
        let server_addr =
                format!("127.0.0.1:{}", puffin_http::DEFAULT_PORT);
        println!(
                "Run this to view profiling data:  puffin_viewer {server_addr}"
            );
        let server = puffin_http::Server::new(&server_addr).ok();
        Mutex::new(server)
    };
}

#[derive(Debug)]
pub enum BenchmarkError {
    Device(DeviceError),
    ThreadPool(rayon::ThreadPoolBuildError),
    Io(std::io::Error),
    Image(image::ImageError),
}

impl std::fmt::Display for BenchmarkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BenchmarkError::Device(e) => write!(f, "device: {e}"),
            BenchmarkError::ThreadPool(e) => write!(f, "thread pool: {e}"),
            BenchmarkError::Io(e) => write!(f, "io: {e}"),
            BenchmarkError::Image(e) => write!(f, "image: {e}"),
        }
    }
}

impl std::error::Error for BenchmarkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BenchmarkError::Device(e) => Some(e),
            BenchmarkError::ThreadPool(e) => Some(e),
            BenchmarkError::Io(e) => Some(e),
            BenchmarkError::Image(e) => Some(e),
        }
    }
}

impl From<DeviceError> for BenchmarkError {
    fn from(e: DeviceError) -> Self {
        BenchmarkError::Device(e)
    }
}

impl From<rayon::ThreadPoolBuildError> for BenchmarkError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        BenchmarkError::ThreadPool(e)
    }
}

impl From<std::io::Error> for BenchmarkError {
    fn from(e: std::io::Error) -> Self {
        BenchmarkError::Io(e)
    }
}

impl From<image::ImageError> for BenchmarkError {
    fn from(e: image::ImageError) -> Self {
        BenchmarkError::Image(e)
    }
}

/// Standard problem sizes, square grids.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Dataset {
    Mini,
    Small,
    #[default]
    Standard,
    Large,
    ExtraLarge,
}

impl Dataset {
    pub fn size(&self) -> usize {
        match self {
            Dataset::Mini => 32,
            Dataset::Small => 128,
            Dataset::Standard => 4096,
            Dataset::Large => 8192,
            Dataset::ExtraLarge => 16384,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum DataType {
    F32,
    #[default]
    F64,
}

/// conv2d stencil benchmark
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Problem size preset.
    #[arg(long, value_enum, default_value = "standard")]
    pub dataset: Dataset,

    /// Rows, overrides the dataset.
    #[arg(long)]
    pub ni: Option<usize>,

    /// Columns, overrides the dataset.
    #[arg(long)]
    pub nj: Option<usize>,

    /// Where the kernel runs.
    #[arg(short, long, value_enum, default_value = "host")]
    pub strategy: StrategyType,

    /// Which part of each grid the nested offload maps.
    #[arg(short, long, value_enum, default_value = "extent")]
    pub map_mode: MapMode,

    /// Grid element type.
    #[arg(long, value_enum, default_value = "f64")]
    pub data_type: DataType,

    /// The number of host threads to use.
    #[arg(short, long, default_value = "8")]
    pub threads: usize,

    /// The number of device teams for offload strategies.
    #[arg(long, default_value = "8")]
    pub teams: usize,

    /// Smallest row block a host thread takes.
    #[arg(long, default_value = "1")]
    pub min_rows: usize,

    /// Chunk size to use for parallel initialization and checks.
    #[arg(short, long, default_value = "1000")]
    pub chunk_size: usize,

    /// Fill A with random values instead of (i + j) / nj.
    #[arg(short, long)]
    pub rand_init: bool,

    /// Walk a large buffer before timing to evict the grids from cache.
    #[arg(long)]
    pub flush_cache: bool,

    /// Dump every element of B to stderr after the run.
    #[arg(short, long)]
    pub dump: bool,

    /// Also run the host strategy and report the largest difference.
    #[arg(long)]
    pub verify: bool,

    /// Directory for output files, will be created.
    /// WARNING, if this Directory
    /// already exists, current contents will be removed.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Write B as csv into the output directory.
    #[arg(long, requires("output_dir"))]
    pub write_csv: bool,

    /// Write B as a png into the output directory,
    /// WARNING: we do not check image size, so be reasonable.
    #[arg(short, long, requires("output_dir"))]
    pub write_image: bool,

    /// Print build information and quit
    #[arg(long)]
    pub build_info: bool,
}

/// What one benchmark run measured.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub strategy: &'static str,
    pub ni: usize,
    pub nj: usize,
    pub elapsed: std::time::Duration,
    pub transfer_stats: Option<TransferStats>,
    pub max_diff: Option<f64>,
}

impl RunReport {
    pub fn print(&self) {
        println!("{{");
        println!("  \"strategy\": \"{}\",", self.strategy);
        println!("  \"ni\": {},", self.ni);
        println!("  \"nj\": {},", self.nj);
        println!("  \"seconds\": {:0.6},", self.elapsed.as_secs_f64());
        if let Some(stats) = self.transfer_stats {
            println!("  \"bytes_to_device\": {},", stats.bytes_to_device);
            println!("  \"bytes_from_device\": {},", stats.bytes_from_device);
        }
        if let Some(max_diff) = self.max_diff {
            println!("  \"max_diff\": {:e},", max_diff);
        }
        println!("  \"git_hash\": \"{}\"", env!("GIT_HASH"));
        println!("}}");
    }
}

impl Args {
    pub fn cli_setup(name: &str) -> Result<Self, BenchmarkError> {
        let args = Args::parse();

        if args.build_info {
            build_info::print_report(name);
            std::process::exit(0);
        }

        println!("BENCHMARK: {}", name);
        if let Some(output_dir) = &args.output_dir {
            let _ = std::fs::remove_dir_all(output_dir);
            std::fs::create_dir_all(output_dir)?;
        }

        #[cfg(feature = "profile-with-puffin")]
        {
            if let Ok(server_lock) = puffin_server.lock() {
                if let Some(server) = server_lock.as_ref() {
                    std::thread::sleep(std::time::Duration::from_secs(2));
                    profiling::puffin::set_scopes_on(true);
                    profiling::finish_frame!();
                    println!("t: {}", server.num_clients());
                }
            }
        }

        rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .thread_name(|i| format!("rayon_thread_{}", i))
            .build_global()?;

        Ok(args)
    }

    pub fn dimensions(&self) -> (usize, usize) {
        let size = self.dataset.size();
        (self.ni.unwrap_or(size), self.nj.unwrap_or(size))
    }

    pub fn strategy_parameters(&self) -> StrategyParameters {
        StrategyParameters {
            strategy_type: self.strategy,
            map_mode: self.map_mode,
            threads: self.threads,
            teams: self.teams,
            min_rows: self.min_rows,
        }
    }

    pub fn csv_path(&self) -> Option<PathBuf> {
        let mut result = self.output_dir.as_ref()?.clone();
        result.push("b.csv");
        Some(result)
    }

    pub fn image_path(&self) -> Option<PathBuf> {
        let mut result = self.output_dir.as_ref()?.clone();
        result.push("b.png");
        Some(result)
    }

    pub fn run(&self) -> Result<RunReport, BenchmarkError> {
        match self.data_type {
            DataType::F32 => self.run_typed::<f32>(),
            DataType::F64 => self.run_typed::<f64>(),
        }
    }

    fn run_typed<NumType: NumTrait>(
        &self,
    ) -> Result<RunReport, BenchmarkError> {
        let (ni, nj) = self.dimensions();
        let strategy = Strategy::new(&self.strategy_parameters())?;
        println!(
            "conv2d: {ni} x {nj}, {:?}, strategy: {}",
            self.data_type,
            strategy.name()
        );

        let mut a = Grid::<NumType>::new(ni, nj);
        let mut b = Grid::<NumType>::new(ni, nj);
        if self.rand_init {
            init::rand_init(&mut a, self.chunk_size);
        } else {
            init::init_array(ni, nj, &mut a);
        }

        if self.flush_cache {
            init::flush_cache();
        }

        let mut instruments = Instruments::new();
        instruments.start();
        kernel_conv2d(&strategy, ni, nj, &a, &mut b);
        instruments.stop();
        instruments.report();

        let max_diff = if self.verify {
            let mut reference = b.clone();
            let host = HostParallel::new(self.threads, self.min_rows);
            kernel_conv2d(&host, ni, nj, &a, &mut reference);
            let diff = par_slice::max_abs_diff(
                b.buffer(),
                reference.buffer(),
                self.chunk_size,
            );
            Some(diff.to_f64().unwrap_or(f64::NAN))
        } else {
            None
        };

        if self.dump {
            dump(ni, nj, &b, &mut std::io::stderr().lock())?;
        } else {
            std::hint::black_box(b.buffer());
        }

        if self.write_csv {
            if let Some(path) = self.csv_path() {
                write_csv(&b, &path)?;
            }
        }
        if self.write_image {
            if let Some(path) = self.image_path() {
                write_image(&b, &path, self.chunk_size)?;
            }
        }

        Ok(RunReport {
            strategy: strategy.name(),
            ni,
            nj,
            elapsed: instruments.elapsed().unwrap_or_default(),
            transfer_stats: strategy.transfer_stats(),
            max_diff,
        })
    }

    pub fn finish(&self) {
        #[cfg(feature = "profile-with-puffin")]
        {
            println!("Flushing profiler");

            // We want to drop the server so we can flush the profiling data
            // https://stackoverflow.com/questions/68866598/how-do-i-free-memory-in-a-lazy-static
            if let Ok(mut server) = puffin_server.lock() {
                server.take();
            }
        }
    }
}
