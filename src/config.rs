use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const MISSING_TOKEN: &str = "GitHub token is required. Set GITHUB_PAT (preferred) or GITHUB_TOKEN, \
     e.g. export GITHUB_TOKEN=$(gh auth token). Required scopes: 'repo', 'read:org', 'read:user'";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    PersonalAccessToken,
    Default,
}

impl std::fmt::Display for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenSource::PersonalAccessToken => write!(f, "PAT"),
            TokenSource::Default => write!(f, "default token"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: String,
    pub token_source: TokenSource,
    pub api_url: String,
    pub request_timeout: Duration,
    pub rate_limit_threshold: u32,
    pub team_concurrency: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let (github_token, token_source) = match non_empty_var("GITHUB_PAT") {
            Some(token) => (token, TokenSource::PersonalAccessToken),
            None => (
                non_empty_var("GITHUB_TOKEN").ok_or_else(|| Error::Config(MISSING_TOKEN.to_string()))?,
                TokenSource::Default,
            ),
        };

        let api_url = env::var("GITHUB_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let request_timeout = env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(60));

        let rate_limit_threshold = env::var("RATE_LIMIT_THRESHOLD")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(100);

        let team_concurrency = env::var("TEAM_CHECK_CONCURRENCY")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|n: &usize| *n > 0)
            .unwrap_or(1);

        Ok(Self {
            github_token,
            token_source,
            api_url,
            request_timeout,
            rate_limit_threshold,
            team_concurrency,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Knobs for the executor: where to send requests and how hard to push.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub api_url: String,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub rate_limit_threshold: u32,
    pub rate_limit_buffer: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(60),
            max_retries: 3,
            backoff_base: Duration::from_secs(2),
            rate_limit_threshold: 100,
            rate_limit_buffer: Duration::from_secs(10),
        }
    }
}

impl From<&Config> for ClientSettings {
    fn from(config: &Config) -> Self {
        Self {
            api_url: config.api_url.clone(),
            request_timeout: config.request_timeout,
            rate_limit_threshold: config.rate_limit_threshold,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub organization: String,
    pub include_archived: bool,
    pub repo_page_size: u32,
    pub collaborator_page_size: u32,
    pub team_page_size: u32,
    pub repo_page_pause: Duration,
    pub sub_page_pause: Duration,
    pub team_concurrency: usize,
    pub show_progress: bool,
    pub output_dir: PathBuf,
}

impl AuditConfig {
    pub fn new(organization: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            include_archived: false,
            repo_page_size: 25,
            collaborator_page_size: 100,
            team_page_size: 100,
            repo_page_pause: Duration::from_secs(2),
            sub_page_pause: Duration::from_millis(500),
            team_concurrency: 1,
            show_progress: true,
            output_dir: PathBuf::from("."),
        }
    }

    /// No inter-page pauses and no progress bar.
    pub fn without_pauses(mut self) -> Self {
        self.repo_page_pause = Duration::ZERO;
        self.sub_page_pause = Duration::ZERO;
        self.show_progress = false;
        self
    }
}

impl From<&Config> for AuditConfig {
    fn from(config: &Config) -> Self {
        Self {
            team_concurrency: config.team_concurrency,
            ..Self::new(String::new())
        }
    }
}
