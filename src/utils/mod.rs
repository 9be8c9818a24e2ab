//! # 工具模块
//!
//! - `url` - URL解析、相对引用解析、文件名推导、数据URL解析

pub mod url;

pub use url::{
    clean_url, file_name_from_url, is_fetchable_url, parse_data_url, resolve_url,
    url_path_lowercase, Url,
};
