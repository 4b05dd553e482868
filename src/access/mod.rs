pub mod collaborators;
pub mod pipeline;
pub mod repositories;
pub mod resolver;
pub mod teams;

pub use collaborators::CollaboratorResolver;
pub use pipeline::{AccessAudit, AuditRun};
pub use repositories::{discover_repositories, Discovery};
pub use resolver::{AccessResolver, Resolution};
pub use teams::TeamAccessResolver;
