pub mod ledger;
pub mod pipeline;
pub mod report;
pub mod scanner;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use ledger::Ledger;
pub use pipeline::{Pipeline, PipelineConfig, RunSummary};
pub use report::LogReporter;
pub use scanner::{ScanConfig, ScanSink, Scanner};
