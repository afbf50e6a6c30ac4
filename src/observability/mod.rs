//! 可观测性：tracing 初始化、决策记录、运行指标与日志落盘

pub mod metrics;
pub mod recorder;
pub mod sink;

pub use metrics::RunMetrics;
pub use recorder::DecisionRecorder;
pub use sink::{FileLogSink, LogLocations, LogSink};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 日志：默认 info，可通过 RUST_LOG 覆盖
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
