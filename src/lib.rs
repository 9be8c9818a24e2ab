//! # Sitesaver Library
//!
//! 一个用于找出网页引用的样式表与 XML 资源并逐个保存到本地的工具库。
//!
//! ## 模块组织
//!
//! - `core` - 错误类型、资源类型、文档加载和结果输出
//! - `readiness` - 就绪轮询：等待条件成立或超时
//! - `locator` - 资源定位：用多组启发式规则从文档中找出下载目标
//! - `pipeline` - 下载流水线：确认、带超时的获取、保存与结果汇总
//! - `guard` - 幂等激活：同一流程只运行一次
//! - `network` - 资源获取
//! - `parsers` - HTML 解析
//! - `utils` - URL 工具函数
//! - `env` - 环境变量配置

pub mod core;
pub mod env;
pub mod guard;
pub mod locator;
pub mod network;
pub mod parsers;
pub mod pipeline;
pub mod readiness;
pub mod utils;

// Re-export commonly used items for convenience
pub use crate::core::{Document, ResourceKind, SiteSaverError};
pub use guard::ActivationGuard;
pub use locator::{locate, LocatorConfig, ResourceTarget};
pub use network::{FetchError, Fetched, Fetcher, Session, SessionOptions};
pub use pipeline::{
    Confirm, DownloadOutcome, Pipeline, PipelineResult, PipelineSummary, RunOptions, Sink,
    SummaryMessage,
};
pub use readiness::{poll, poll_async, poll_until, PollConfig, PollOutcome};
