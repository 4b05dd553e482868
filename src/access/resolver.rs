use async_trait::async_trait;

use crate::models::{AccessEntry, RepositoryInfo};

/// Access grants found for one repository by one resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub entries: Vec<AccessEntry>,
    /// False when the resolver stopped early or gave up on part of the data.
    pub complete: bool,
}

impl Resolution {
    pub fn complete(entries: Vec<AccessEntry>) -> Self {
        Self {
            entries,
            complete: true,
        }
    }

    pub fn partial(entries: Vec<AccessEntry>) -> Self {
        Self {
            entries,
            complete: false,
        }
    }
}

/// One source of access grants. Implementations never fail outright: a
/// lookup that breaks is logged and reported as an incomplete resolution.
#[async_trait]
pub trait AccessResolver: Send + Sync {
    async fn resolve(&self, repository: &RepositoryInfo) -> Resolution;
    fn name(&self) -> &str;
}
