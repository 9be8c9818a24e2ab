//! # 网络模块
//!
//! 这个模块包含与资源获取相关的功能：
//!
//! - `Fetcher` 特性：流水线通过它获取每个目标
//! - `Session`：基于 reqwest 的默认实现，同时支持 `file://` 资源
//!
//! 获取只做一次尝试，没有重试；超时由调用方控制。

pub mod session;

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub use session::{Session, SessionOptions};

/// A successfully retrieved resource
#[derive(Debug, Clone)]
pub struct Fetched {
    pub data: Vec<u8>,
    /// URL after redirects
    pub final_url: Url,
    pub media_type: String,
    pub charset: String,
    /// HTTP status, absent for non-HTTP sources
    pub status: Option<u16>,
}

/// Why a single retrieval did not produce a body
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("timed out after {} ms", .0.as_millis())]
    Timeout(Duration),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(String),

    #[error("read error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported URL scheme \"{0}\"")]
    UnsupportedScheme(String),
}

impl FetchError {
    /// HTTP status to report alongside the error, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status(status) => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Network(error.to_string())
        }
    }
}

/// Retrieves one resource
///
/// Implementations return `Ok` only for a usable body; non-success statuses
/// are `FetchError::Status`. The caller wraps each call in its own timeout.
pub trait Fetcher {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<Fetched, FetchError>> + Send;
}
