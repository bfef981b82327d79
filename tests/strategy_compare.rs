use conv2d::device::*;
use conv2d::domain::*;
use conv2d::init;
use conv2d::kernel::*;
use conv2d::strategy::*;

use float_cmp::assert_approx_eq;

fn offload_strategies(teams: usize) -> Vec<Strategy> {
    vec![
        Strategy::OffloadFlat(FlatOffload::new(Device::new(teams).unwrap())),
        Strategy::OffloadNested(NestedOffload::new(
            Device::new(teams).unwrap(),
            MapMode::Extent,
        )),
        Strategy::OffloadNested(NestedOffload::new(
            Device::new(teams).unwrap(),
            MapMode::Whole,
        )),
    ]
}

fn run<S: ExecutionStrategy>(
    strategy: &S,
    input: &Grid<f64>,
    sentinel: f64,
) -> Grid<f64> {
    let mut output = Grid::filled(input.rows(), input.cols(), sentinel);
    kernel_conv2d(strategy, input.rows(), input.cols(), input, &mut output);
    output
}

#[test]
fn host_thread_count_compare() {
    let (ni, nj) = (97, 61);
    let chunk_size = 100;
    let mut input = Grid::<f64>::new(ni, nj);
    init::rand_init(&mut input, chunk_size);

    let single = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .unwrap();
    let expected =
        single.install(|| run(&HostParallel::new(1, 1), &input, 0.0));

    for threads in [2, 3, 8] {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap();
        for min_rows in [1, 4, 200] {
            let strategy = HostParallel::new(threads, min_rows);
            let actual = pool.install(|| run(&strategy, &input, 0.0));
            for k in 0..ni * nj {
                assert_approx_eq!(
                    f64,
                    actual.buffer()[k],
                    expected.buffer()[k],
                    epsilon = 1e-12
                );
            }
        }
    }
}

#[test]
fn offload_team_count_compare() {
    let (ni, nj) = (40, 75);
    let mut input = Grid::<f64>::new(ni, nj);
    init::init_array(ni, nj, &mut input);
    let expected = run(&HostParallel::new(4, 1), &input, 0.0);

    for teams in [1, 2, 5, 64] {
        for strategy in offload_strategies(teams) {
            let actual = run(&strategy, &input, 0.0);
            for k in 0..ni * nj {
                assert_approx_eq!(
                    f64,
                    actual.buffer()[k],
                    expected.buffer()[k],
                    epsilon = 1e-12
                );
            }
        }
    }
}

#[test]
fn repeated_runs_compare() {
    let (ni, nj) = (33, 29);
    let mut input = Grid::<f64>::new(ni, nj);
    init::rand_init(&mut input, 50);
    let input_copy = input.clone();

    let strategy = Strategy::new(&StrategyParameters {
        strategy_type: StrategyType::OffloadFlat,
        teams: 3,
        ..Default::default()
    })
    .unwrap();
    let first = run(&strategy, &input, 0.0);
    let second = run(&strategy, &input, 0.0);
    assert_eq!(first, second);

    // A is read only
    assert_eq!(input, input_copy);
}

#[test]
fn border_sentinel_compare() {
    let sentinel = -12345.5;
    for (ni, nj) in [(3, 3), (3, 10), (10, 3), (17, 23)] {
        let mut input = Grid::<f64>::new(ni, nj);
        init::rand_init(&mut input, 16);

        let mut strategies = offload_strategies(3);
        strategies.push(Strategy::Host(HostParallel::new(4, 1)));
        for strategy in strategies {
            let output = run(&strategy, &input, sentinel);
            for i in 0..ni {
                for j in 0..nj {
                    if is_border(i, j, ni, nj) {
                        assert_eq!(
                            output.get(i, j),
                            sentinel,
                            "{} wrote border ({i}, {j})",
                            strategy.name()
                        );
                    } else {
                        assert_ne!(output.get(i, j), sentinel);
                    }
                }
            }
        }
    }
}

#[test]
fn undersized_compare() {
    let sentinel = 7.0;
    let sizes = [
        (0, 5),
        (5, 0),
        (0, 0),
        (1, 1),
        (2, 2),
        (2, 9),
        (9, 2),
        (1, 5),
    ];
    for (ni, nj) in sizes {
        let input = Grid::<f64>::filled(ni, nj, 1.0);
        let mut strategies = offload_strategies(2);
        strategies.push(Strategy::Host(HostParallel::new(2, 1)));
        for strategy in strategies {
            let output = run(&strategy, &input, sentinel);
            for v in output.buffer() {
                assert_eq!(*v, sentinel);
            }
            if let Some(stats) = strategy.transfer_stats() {
                assert_eq!(stats, TransferStats::default());
            }
        }
    }
}

#[test]
fn f32_compare() {
    let (ni, nj) = (21, 34);
    let mut input = Grid::<f32>::new(ni, nj);
    init::init_array(ni, nj, &mut input);

    let mut expected = Grid::<f32>::new(ni, nj);
    kernel_conv2d(&HostParallel::new(2, 1), ni, nj, &input, &mut expected);
    for strategy in offload_strategies(4) {
        let mut actual = Grid::<f32>::new(ni, nj);
        kernel_conv2d(&strategy, ni, nj, &input, &mut actual);
        assert_eq!(actual, expected);
    }
}
