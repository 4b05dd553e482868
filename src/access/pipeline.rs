use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::sync::Arc;

use crate::access::collaborators::CollaboratorResolver;
use crate::access::repositories::discover_repositories;
use crate::access::resolver::AccessResolver;
use crate::access::teams::TeamAccessResolver;
use crate::config::AuditConfig;
use crate::github::GitHubClient;
use crate::models::{AccessEntry, RepositoryInfo, RepositorySnapshot};

/// Everything one audit pass produced.
#[derive(Debug, Clone)]
pub struct AuditRun {
    pub organization: String,
    pub snapshots: Vec<RepositorySnapshot>,
    pub organization_repositories: Option<u64>,
    pub skipped_inaccessible: usize,
    pub skipped_archived: usize,
    pub discovery_complete: bool,
    pub queries: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl AuditRun {
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

pub struct AccessAudit {
    github: Arc<GitHubClient>,
    resolvers: Vec<Box<dyn AccessResolver>>,
    config: AuditConfig,
}

impl AccessAudit {
    /// Direct collaborators first, then teams.
    pub fn new(github: Arc<GitHubClient>, config: AuditConfig) -> Self {
        let resolvers: Vec<Box<dyn AccessResolver>> = vec![
            Box::new(CollaboratorResolver::new(github.clone(), &config)),
            Box::new(TeamAccessResolver::new(github.clone(), &config)),
        ];
        Self::with_resolvers(github, resolvers, config)
    }

    pub fn with_resolvers(
        github: Arc<GitHubClient>,
        resolvers: Vec<Box<dyn AccessResolver>>,
        config: AuditConfig,
    ) -> Self {
        Self {
            github,
            resolvers,
            config,
        }
    }

    pub async fn run(&self) -> AuditRun {
        let started_at = Utc::now();

        // Step 1: Discover repositories
        let discovery = discover_repositories(&self.github, &self.config).await;
        tracing::info!(
            "Auditing access for {} repositories in {}",
            discovery.repositories.len(),
            self.config.organization
        );

        // Step 2: Resolve access one repository at a time
        let pb = self.progress_bar(discovery.repositories.len() as u64);
        let mut snapshots = Vec::with_capacity(discovery.repositories.len());

        for repository in discovery.repositories {
            pb.set_message(repository.name.clone());
            snapshots.push(self.resolve_repository(repository).await);
            pb.inc(1);
        }
        pb.finish_with_message("Access resolved");

        AuditRun {
            organization: self.config.organization.clone(),
            snapshots,
            organization_repositories: discovery.total_count,
            skipped_inaccessible: discovery.skipped_inaccessible,
            skipped_archived: discovery.skipped_archived,
            discovery_complete: discovery.complete,
            queries: self.github.queries_made(),
            started_at,
            finished_at: Utc::now(),
        }
    }

    async fn resolve_repository(&self, repository: RepositoryInfo) -> RepositorySnapshot {
        let mut access: Vec<AccessEntry> = Vec::new();
        let mut seen = HashSet::new();
        let mut complete = true;

        for resolver in &self.resolvers {
            let resolution = resolver.resolve(&repository).await;
            if !resolution.complete {
                tracing::warn!(
                    "{}: {} lookup incomplete ({} entries kept)",
                    repository.name,
                    resolver.name(),
                    resolution.entries.len()
                );
                complete = false;
            }

            for entry in resolution.entries {
                if seen.insert((entry.subject_kind, entry.subject_id.clone())) {
                    access.push(entry);
                } else {
                    tracing::debug!("{}: duplicate entry for {} dropped", repository.name, entry.subject_id);
                }
            }
        }

        tracing::debug!("{}: {} access entries", repository.name, access.len());
        RepositorySnapshot::new(repository, access, complete)
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} repos {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}
