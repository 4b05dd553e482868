use std::collections::HashMap;

use crate::access::AuditRun;
use crate::models::{AccessReport, SubjectKind};

const COMPLETENESS_TARGET: f64 = 90.0;

/// Console-facing statistics for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub organization: String,
    pub elapsed_secs: i64,
    pub queries: u64,
    pub records: usize,
    pub users: usize,
    pub teams: usize,
    pub repositories: usize,
    pub by_permission: Vec<(String, usize)>,
    pub by_subject_type: Vec<(String, usize)>,
    pub private: usize,
    pub public: usize,
    pub archived: usize,
    pub forks: usize,
    pub disabled: usize,
    pub repositories_with_access: usize,
    pub repositories_incomplete: usize,
}

impl RunSummary {
    pub fn new(run: &AuditRun, report: &AccessReport) -> Self {
        let mut by_permission: HashMap<String, usize> = HashMap::new();
        let mut by_subject_type: HashMap<String, usize> = HashMap::new();
        for row in &report.permissions {
            *by_permission.entry(row.permission.clone()).or_default() += 1;
            *by_subject_type.entry(row.user_type.clone()).or_default() += 1;
        }

        let entries = run.snapshots.iter().flat_map(|s| s.access.iter());
        let teams = entries.clone().filter(|e| e.subject_kind == SubjectKind::Team).count();
        let users = entries.count() - teams;

        let repositories = run.snapshots.iter().map(|s| &s.info);

        Self {
            organization: run.organization.clone(),
            elapsed_secs: run.elapsed().num_seconds(),
            queries: run.queries,
            records: report.permissions.len(),
            users,
            teams,
            repositories: run.snapshots.len(),
            by_permission: ranked(by_permission),
            by_subject_type: ranked(by_subject_type),
            private: repositories.clone().filter(|r| r.is_private()).count(),
            public: repositories.clone().filter(|r| !r.is_private()).count(),
            archived: repositories.clone().filter(|r| r.archived).count(),
            forks: repositories.clone().filter(|r| r.fork).count(),
            disabled: repositories.filter(|r| r.disabled).count(),
            repositories_with_access: run.snapshots.iter().filter(|s| !s.access.is_empty()).count(),
            repositories_incomplete: run.snapshots.iter().filter(|s| !s.access_complete).count(),
        }
    }

    /// Share of repositories that came back with any access data, in percent.
    pub fn completeness(&self) -> f64 {
        self.repositories_with_access as f64 / self.repositories.max(1) as f64 * 100.0
    }

    pub fn format_text(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("\n=== Access Audit: {} ===\n\n", self.organization));
        output.push_str(&format!("Processing time: {}s\n", self.elapsed_secs));
        output.push_str(&format!("Total queries: {}\n", self.queries));
        output.push_str(&format!(
            "Records per query: {:.1}\n",
            self.records as f64 / self.queries.max(1) as f64
        ));

        output.push_str("\nDirect access:\n");
        output.push_str(&format!("  Access records: {}\n", self.records));
        output.push_str(&format!("  User entries: {}\n", self.users));
        output.push_str(&format!("  Team entries: {}\n", self.teams));
        output.push_str(&format!("  Repositories processed: {}\n", self.repositories));
        output.push_str(&format!(
            "  Average entries per repository: {:.1}\n",
            self.records as f64 / self.repositories.max(1) as f64
        ));

        output.push_str("\nPermission levels:\n");
        for (permission, count) in &self.by_permission {
            output.push_str(&format!("  - {}: {}\n", permission, count));
        }

        output.push_str("\nSubject types:\n");
        for (subject_type, count) in &self.by_subject_type {
            output.push_str(&format!("  - {}: {}\n", subject_type, count));
        }

        output.push_str("\nRepositories:\n");
        output.push_str(&format!("  Private: {} | Public: {}\n", self.private, self.public));
        output.push_str(&format!(
            "  Active: {} | Archived: {}\n",
            self.repositories - self.archived,
            self.archived
        ));
        output.push_str(&format!(
            "  Original: {} | Forks: {}\n",
            self.repositories - self.forks,
            self.forks
        ));
        output.push_str(&format!(
            "  Enabled: {} | Disabled: {}\n",
            self.repositories - self.disabled,
            self.disabled
        ));

        let completeness = self.completeness();
        output.push_str("\nData completeness:\n");
        output.push_str(&format!(
            "  With access data: {} ({:.1}%)\n",
            self.repositories_with_access, completeness
        ));
        output.push_str(&format!(
            "  Without access data: {} ({:.1}%)\n",
            self.repositories - self.repositories_with_access,
            100.0 - completeness
        ));
        if self.repositories_incomplete > 0 {
            output.push_str(&format!(
                "  Incomplete lookups: {}\n",
                self.repositories_incomplete
            ));
        }

        if completeness < COMPLETENESS_TARGET {
            output.push_str(&format!(
                "\nData completeness is {:.1}%; some repositories may be inaccessible.\n",
                completeness
            ));
            output.push_str("To improve completeness:\n");
            output.push_str("  - Ensure the token has the 'repo' scope for private repositories\n");
            output.push_str("  - Check that the token owner is a member of the organization\n");
            output.push_str("  - Some repositories may genuinely have no direct collaborators\n");
        } else {
            output.push_str(&format!("\nGood data completeness: {:.1}%\n", completeness));
        }

        output
    }
}

/// Highest count first, ties by name.
fn ranked(counts: HashMap<String, usize>) -> Vec<(String, usize)> {
    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}
