use std::time::{Duration, Instant};

/// Wall clock timer bracketing the kernel call.
#[derive(Debug, Default)]
pub struct Instruments {
    start: Option<Instant>,
    elapsed: Option<Duration>,
}

impl Instruments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.elapsed = None;
        self.start = Some(Instant::now());
    }

    /// Stopping without a start is a no-op.
    pub fn stop(&mut self) {
        if let Some(start) = self.start.take() {
            self.elapsed = Some(start.elapsed());
        }
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    /// Seconds with six decimals, the usual benchmark output line.
    pub fn report_line(&self) -> String {
        format!("{:0.6}", self.elapsed.unwrap_or_default().as_secs_f64())
    }

    pub fn report(&self) {
        println!("{}", self.report_line());
    }
}
