//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量读取；命令行参数会覆盖这里读到的值。

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::{parse_kind_list, ResourceKind, DEFAULT_KINDS};
use crate::pipeline::RunOptions;
use crate::readiness::PollConfig;

/// 环境变量解析错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    /// 未设置时为 `None`，设置了但无效时报错
    fn get_optional() -> EnvResult<Option<T>> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value).map(Some),
            Err(_) => Ok(None),
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }

    /// 文档中显示的默认值
    fn default_doc() -> String
    where
        T: fmt::Debug,
    {
        match Self::DEFAULT {
            Some(default) => format!("{:?}", default),
            None => "unset".to_string(),
        }
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "SITESAVER_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("warn".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.trim().to_lowercase().as_str() {
                level @ ("trace" | "debug" | "info" | "warn" | "error") => Ok(level.to_string()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }

        fn default_doc() -> String {
            "\"warn\"".to_string()
        }
    }

    /// 禁用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 遵循标准：任何非空值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }
}

/// 资源获取相关环境变量
pub mod fetch {
    use super::*;

    /// 单个资源的获取超时
    pub struct Timeout;
    impl EnvVar<Duration> for Timeout {
        const NAME: &'static str = "SITESAVER_FETCH_TIMEOUT_MS";
        const DEFAULT: Option<Duration> = Some(RunOptions::DEFAULT_TIMEOUT);
        const DESCRIPTION: &'static str = "Per-resource retrieval timeout in milliseconds (1-600000)";

        fn parse(value: &str) -> EnvResult<Duration> {
            let millis = parse_bounded_usize(value, Self::NAME, 1, 600_000)?;
            Ok(Duration::from_millis(millis as u64))
        }
    }

    /// 同时进行的获取数量
    pub struct Concurrency;
    impl EnvVar<usize> for Concurrency {
        const NAME: &'static str = "SITESAVER_CONCURRENCY";
        const DEFAULT: Option<usize> = Some(1);
        const DESCRIPTION: &'static str = "Retrievals in flight at once (1-32)";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_bounded_usize(value, Self::NAME, 1, 32)
        }
    }

    /// 请求使用的 User-Agent
    pub struct UserAgent;
    impl EnvVar<String> for UserAgent {
        const NAME: &'static str = "SITESAVER_USER_AGENT";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "User-Agent header sent with every request";

        fn parse(value: &str) -> EnvResult<String> {
            let value = value.trim();
            if value.is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "User agent cannot be empty".to_string(),
                });
            }
            Ok(value.to_string())
        }

        fn default_doc() -> String {
            "built-in".to_string()
        }
    }
}

/// 下载流程相关环境变量
pub mod run {
    use super::*;

    /// 跳过确认
    pub struct AutoConfirm;
    impl EnvVar<bool> for AutoConfirm {
        const NAME: &'static str = "SITESAVER_AUTO_CONFIRM";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Download without asking for confirmation";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    /// 是否下载无法识别类型的资源
    pub struct IncludeUnknown;
    impl EnvVar<bool> for IncludeUnknown {
        const NAME: &'static str = "SITESAVER_INCLUDE_UNKNOWN";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Also download located resources of unrecognized kind";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    /// 需要下载的资源类型
    pub struct Types;
    impl EnvVar<Vec<ResourceKind>> for Types {
        const NAME: &'static str = "SITESAVER_TYPES";
        const DEFAULT: Option<Vec<ResourceKind>> = None;
        const DESCRIPTION: &'static str = "Comma-separated resource kinds to download: css, xml, html";

        fn get() -> EnvResult<Vec<ResourceKind>> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(DEFAULT_KINDS.to_vec()),
            }
        }

        fn parse(value: &str) -> EnvResult<Vec<ResourceKind>> {
            parse_kind_list(value).map_err(|e| EnvError {
                variable: Self::NAME.to_string(),
                message: e.to_string(),
            })
        }

        fn default_doc() -> String {
            "\"css,xml\"".to_string()
        }
    }

    /// 输出目录
    pub struct OutputDir;
    impl EnvVar<PathBuf> for OutputDir {
        const NAME: &'static str = "SITESAVER_OUTPUT_DIR";
        const DEFAULT: Option<PathBuf> = None;
        const DESCRIPTION: &'static str = "Directory saved files are written to";

        fn get() -> EnvResult<PathBuf> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok(PathBuf::from(".")),
            }
        }

        fn parse(value: &str) -> EnvResult<PathBuf> {
            if value.trim().is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Output directory cannot be empty".to_string(),
                });
            }
            Ok(PathBuf::from(value.trim()))
        }

        fn default_doc() -> String {
            "\".\"".to_string()
        }
    }
}

/// 就绪轮询相关环境变量
pub mod poll {
    use super::*;

    /// 等待页面就绪的最长时间
    pub struct Timeout;
    impl EnvVar<Duration> for Timeout {
        const NAME: &'static str = "SITESAVER_POLL_TIMEOUT_MS";
        const DEFAULT: Option<Duration> = Some(PollConfig::DEFAULT_TIMEOUT);
        const DESCRIPTION: &'static str = "How long to wait for the page to become ready, in milliseconds (0-600000)";

        fn parse(value: &str) -> EnvResult<Duration> {
            let millis = parse_bounded_usize(value, Self::NAME, 0, 600_000)?;
            Ok(Duration::from_millis(millis as u64))
        }
    }

    /// 两次检查之间的间隔
    pub struct Interval;
    impl EnvVar<Duration> for Interval {
        const NAME: &'static str = "SITESAVER_POLL_INTERVAL_MS";
        const DEFAULT: Option<Duration> = Some(PollConfig::DEFAULT_INTERVAL);
        const DESCRIPTION: &'static str = "Delay between readiness checks in milliseconds (1-60000)";

        fn parse(value: &str) -> EnvResult<Duration> {
            let millis = parse_bounded_usize(value, Self::NAME, 1, 60_000)?;
            Ok(Duration::from_millis(millis as u64))
        }
    }
}

/// 辅助函数
fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!(
                "Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off, enabled/disabled",
                value
            ),
        }),
    }
}

fn parse_bounded_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

/// 环境变量配置汇总
#[derive(Debug, Clone)]
pub struct EnvConfig {
    // 核心配置
    pub log_level: String,
    pub no_color: bool,

    // 获取配置
    pub fetch_timeout: Duration,
    pub concurrency: usize,
    pub user_agent: Option<String>,

    // 下载配置
    pub auto_confirm: bool,
    pub include_unknown: bool,
    pub types: Vec<ResourceKind>,
    pub output_dir: PathBuf,

    // 轮询配置
    pub poll_timeout: Duration,
    pub poll_interval: Duration,
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            log_level: core::LogLevel::get()?,
            no_color: core::NoColor::get()?,

            fetch_timeout: fetch::Timeout::get()?,
            concurrency: fetch::Concurrency::get()?,
            user_agent: fetch::UserAgent::get_optional()?,

            auto_confirm: run::AutoConfirm::get()?,
            include_unknown: run::IncludeUnknown::get()?,
            types: run::Types::get()?,
            output_dir: run::OutputDir::get()?,

            poll_timeout: poll::Timeout::get()?,
            poll_interval: poll::Interval::get()?,
        })
    }

    /// 由环境变量得到的默认运行参数
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            urls: None,
            types: self.types.clone(),
            auto_confirm: self.auto_confirm,
            timeout: self.fetch_timeout,
            concurrency: self.concurrency,
            include_unknown_kinds: self.include_unknown,
        }
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig::new(self.poll_timeout, self.poll_interval).unwrap_or_default()
    }
}

fn push_doc_line<T: fmt::Debug, V: EnvVar<T>>(docs: &mut String) {
    docs.push_str(&format!(
        "- `{}`: {} (default: {})\n",
        V::NAME,
        V::DESCRIPTION,
        V::default_doc()
    ));
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("# Environment Variables Documentation\n\n");

    docs.push_str("## Core Configuration\n\n");
    push_doc_line::<_, core::LogLevel>(&mut docs);
    push_doc_line::<_, core::NoColor>(&mut docs);

    docs.push_str("\n## Fetch Configuration\n\n");
    push_doc_line::<_, fetch::Timeout>(&mut docs);
    push_doc_line::<_, fetch::Concurrency>(&mut docs);
    push_doc_line::<_, fetch::UserAgent>(&mut docs);

    docs.push_str("\n## Download Configuration\n\n");
    push_doc_line::<_, run::AutoConfirm>(&mut docs);
    push_doc_line::<_, run::IncludeUnknown>(&mut docs);
    push_doc_line::<_, run::Types>(&mut docs);
    push_doc_line::<_, run::OutputDir>(&mut docs);

    docs.push_str("\n## Readiness Configuration\n\n");
    push_doc_line::<_, poll::Timeout>(&mut docs);
    push_doc_line::<_, poll::Interval>(&mut docs);

    docs
}
