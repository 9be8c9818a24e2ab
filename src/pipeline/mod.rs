//! # 下载流水线
//!
//! 给定一组目标（调用方显式提供，或由定位器从文档中找出），流水线会：
//!
//! 1. 解析出工作集合；为空时直接返回 `no-candidates`
//! 2. 多于一个目标且未自动确认时，询问确认通道；拒绝则返回 `user-cancelled`
//! 3. 对每个目标做一次带超时的获取，推导文件名后交给 `Sink` 保存
//! 4. 汇总每个目标的结果
//!
//! 单个目标失败（网络错误、非 2xx 状态、超时、保存失败）只记录在该目标的结果中，
//! 不会中断其他目标。结果顺序始终与目标顺序一致。

pub mod confirm;
pub mod sink;
pub mod types;

use std::future::Future;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use indexmap::IndexSet;
use url::Url;

use crate::core::{Document, ResourceKind};
use crate::locator::classify::classify_url;
use crate::locator::{filter_targets, locate, LocatorConfig, ResourceTarget};
use crate::network::{FetchError, Fetcher};
use crate::utils::url::{clean_url, file_name_from_url, resolve_url};

pub use confirm::{AutoConfirm, Confirm, ConfirmRequest, Decline, FnConfirm};
#[cfg(feature = "cli")]
pub use confirm::TerminalConfirm;
pub use sink::{FsSink, MemoryFile, MemorySink, SaveError, SavedFile, Sink};
pub use types::{DownloadOutcome, PipelineResult, PipelineSummary, RunOptions, SummaryMessage};

/// One entry of the working set
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkItem {
    Target(ResourceTarget),
    /// An explicit entry that does not resolve to a URL; reported as a failure
    Unresolved { input: String, reason: String },
}

impl WorkItem {
    pub fn label(&self) -> &str {
        match self {
            WorkItem::Target(target) => target.url.as_str(),
            WorkItem::Unresolved { input, .. } => input,
        }
    }
}

pub struct Pipeline<F, S, C> {
    fetcher: F,
    sink: S,
    confirm: C,
    locator: LocatorConfig,
}

impl<F, S, C> Pipeline<F, S, C>
where
    F: Fetcher + Sync,
    S: Sink + Sync,
    C: Confirm + Sync,
{
    pub fn new(fetcher: F, sink: S, confirm: C) -> Pipeline<F, S, C> {
        Pipeline {
            fetcher,
            sink,
            confirm,
            locator: LocatorConfig::default(),
        }
    }

    pub fn with_locator_config(mut self, locator: LocatorConfig) -> Pipeline<F, S, C> {
        self.locator = locator;
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Builds the working set for a run
    ///
    /// Explicit URLs win when present and non-empty; otherwise the located
    /// targets of `document` filtered by kind; otherwise nothing.
    pub fn resolve(&self, options: &RunOptions, document: Option<&Document>) -> Vec<WorkItem> {
        if let Some(urls) = options.urls.as_ref().filter(|urls| !urls.is_empty()) {
            return resolve_explicit(urls, document.map(Document::base_url));
        }

        match document {
            Some(document) => filter_targets(
                locate(document, &self.locator),
                &options.types,
                options.include_unknown_kinds,
            )
            .into_iter()
            .map(WorkItem::Target)
            .collect(),
            None => Vec::new(),
        }
    }

    /// Resolves the working set, then gates, fetches and saves it
    ///
    /// The document is inspected before the returned future is created; the
    /// future does not borrow the DOM.
    pub fn run<'a>(
        &'a self,
        options: &'a RunOptions,
        document: Option<&Document>,
    ) -> impl Future<Output = PipelineResult> + 'a {
        let items = self.resolve(options, document);
        self.execute(options, items)
    }

    /// Gates, fetches and saves an already resolved working set
    pub async fn execute(&self, options: &RunOptions, items: Vec<WorkItem>) -> PipelineResult {
        if items.is_empty() {
            tracing::info!("nothing to download");
            return PipelineResult::no_candidates();
        }

        if !options.auto_confirm && items.len() > 1 {
            let request = ConfirmRequest::new(items.iter().map(|item| item.label().to_string()).collect());
            if !self.confirm.confirm(&request).await {
                tracing::info!("download of {} resources declined", items.len());
                return PipelineResult::user_cancelled();
            }
        }

        let concurrency = options.concurrency.max(1);
        let run_millis = chrono::Utc::now().timestamp_millis();

        tracing::info!(
            "downloading {} resources ({} at a time)",
            items.len(),
            concurrency
        );

        let outcomes: Vec<DownloadOutcome> = stream::iter(items.into_iter().enumerate())
            .map(|(index, item)| self.process(index, item, options.timeout, run_millis))
            .buffered(concurrency)
            .collect()
            .await;

        let result = PipelineResult::from_outcomes(outcomes);
        tracing::info!(
            "{} saved, {} failed",
            result.summary.succeeded,
            result.summary.failed
        );
        result
    }

    async fn process(
        &self,
        index: usize,
        item: WorkItem,
        timeout: Duration,
        run_millis: i64,
    ) -> DownloadOutcome {
        let target = match item {
            WorkItem::Target(target) => target,
            WorkItem::Unresolved { input, reason } => {
                tracing::warn!("cannot download \"{}\": {}", input, reason);
                return DownloadOutcome::failed(input, None, reason);
            }
        };
        let url = target.url.to_string();

        let fetched = match tokio::time::timeout(timeout, self.fetcher.fetch(&target.url)).await {
            Ok(Ok(fetched)) => fetched,
            Ok(Err(e)) => return failed(url, e.status(), &e),
            Err(_) => return failed(url, None, &FetchError::Timeout(timeout)),
        };

        let file_name = derive_file_name(&target, index, run_millis);

        match self
            .sink
            .save(&file_name, target.kind.media_type(), &fetched.data)
            .await
        {
            Ok(saved) => {
                tracing::debug!("saved {} as {}", url, saved.file_name);
                DownloadOutcome::saved(url, saved.file_name, fetched.status)
            }
            Err(e) => failed(url, fetched.status, &e),
        }
    }
}

fn failed(url: String, status: Option<u16>, error: &dyn std::error::Error) -> DownloadOutcome {
    tracing::warn!("{}: {}", url, error);
    DownloadOutcome::failed(url, status, error.to_string())
}

/// Resolves explicit entries in order, dropping repeated URLs
fn resolve_explicit(urls: &[String], base_url: Option<&Url>) -> Vec<WorkItem> {
    let mut seen: IndexSet<String> = IndexSet::new();
    let mut items = Vec::with_capacity(urls.len());

    for input in urls {
        let resolved = match base_url {
            Some(base_url) => resolve_url(base_url, input),
            None => Url::parse(input.trim()).map(clean_url),
        };

        match resolved {
            Ok(url) => {
                if seen.insert(url.to_string()) {
                    let kind = classify_url(&url);
                    items.push(WorkItem::Target(ResourceTarget::new(url, kind)));
                }
            }
            Err(e) => items.push(WorkItem::Unresolved {
                input: input.clone(),
                reason: format!("invalid URL: {}", e),
            }),
        }
    }

    items
}

/// File name a target is saved under
///
/// The percent-decoded last path segment when there is one, with the kind's
/// extension added if it has none; otherwise `{host}-{millis}-{index}.{ext}`.
pub fn derive_file_name(target: &ResourceTarget, index: usize, run_millis: i64) -> String {
    let extension = target.kind.extension();

    match file_name_from_url(&target.url) {
        Some(name) if name.contains('.') || target.kind == ResourceKind::Unknown => name,
        Some(name) => format!("{}.{}", name, extension),
        None => format!(
            "{}-{}-{}.{}",
            target.url.host_str().unwrap_or("resource"),
            run_millis,
            index,
            extension
        ),
    }
}
