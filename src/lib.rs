pub mod config;
pub mod error;
pub mod models;
pub mod github;
pub mod access;
pub mod report;

pub use config::{AuditConfig, ClientSettings, Config};
pub use error::{Error, Result};
pub use github::GitHubClient;
pub use access::{AccessAudit, AuditRun};
pub use report::{build_report, ReportWriter, RunSummary};
