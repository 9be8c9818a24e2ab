use std::time::Duration;

use serde::Serialize;

use crate::core::{ResourceKind, DEFAULT_KINDS};

/// Caller-supplied options of a single run
#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Explicit targets; when present and non-empty the locator is bypassed
    pub urls: Option<Vec<String>>,
    /// Kinds kept from the locator's output
    pub types: Vec<ResourceKind>,
    pub auto_confirm: bool,
    /// Upper bound for each retrieval
    pub timeout: Duration,
    /// Number of retrievals in flight at once
    pub concurrency: usize,
    pub include_unknown_kinds: bool,
}

impl RunOptions {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15_000);
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            urls: None,
            types: DEFAULT_KINDS.to_vec(),
            auto_confirm: false,
            timeout: Self::DEFAULT_TIMEOUT,
            concurrency: 1,
            include_unknown_kinds: false,
        }
    }
}

/// The recorded result of one retrieval attempt
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadOutcome {
    pub url: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DownloadOutcome {
    pub fn saved(url: String, filename: String, http_status: Option<u16>) -> DownloadOutcome {
        DownloadOutcome {
            url,
            ok: true,
            filename: Some(filename),
            http_status,
            error: None,
        }
    }

    pub fn failed(url: String, http_status: Option<u16>, error: String) -> DownloadOutcome {
        DownloadOutcome {
            url,
            ok: false,
            filename: None,
            http_status,
            error: Some(error),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SummaryMessage {
    NoCandidates,
    UserCancelled,
}

impl SummaryMessage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryMessage::NoCandidates => "no-candidates",
            SummaryMessage::UserCancelled => "user-cancelled",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PipelineSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<SummaryMessage>,
}

/// Outcomes in target order plus their summary
///
/// Only the constructors below build a result, so `total` always equals the
/// number of outcomes and `succeeded + failed == total`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PipelineResult {
    pub outcomes: Vec<DownloadOutcome>,
    pub summary: PipelineSummary,
}

impl PipelineResult {
    pub fn from_outcomes(outcomes: Vec<DownloadOutcome>) -> PipelineResult {
        let succeeded = outcomes.iter().filter(|outcome| outcome.ok).count();

        PipelineResult {
            summary: PipelineSummary {
                total: outcomes.len(),
                succeeded,
                failed: outcomes.len() - succeeded,
                message: None,
            },
            outcomes,
        }
    }

    pub fn no_candidates() -> PipelineResult {
        PipelineResult::empty(SummaryMessage::NoCandidates)
    }

    pub fn user_cancelled() -> PipelineResult {
        PipelineResult::empty(SummaryMessage::UserCancelled)
    }

    fn empty(message: SummaryMessage) -> PipelineResult {
        PipelineResult {
            outcomes: Vec::new(),
            summary: PipelineSummary {
                total: 0,
                succeeded: 0,
                failed: 0,
                message: Some(message),
            },
        }
    }

    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0
    }
}
