use conv2d::benchmark::*;

fn main() {
    let args = Args::cli_setup("conv2d").unwrap();
    let report = args.run().unwrap();
    report.print();
    args.finish();
}
