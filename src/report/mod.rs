pub mod aggregate;
pub mod summary;
pub mod writer;

pub use aggregate::build_report;
pub use summary::RunSummary;
pub use writer::{write_csv, ReportFiles, ReportWriter};
