//! # 解析器模块
//!
//! 这个模块包含用于解析页面文档的功能：
//!
//! - `html` - HTML文档解析、DOM查询、元数据读取

pub mod html;

pub use html::{
    find_nodes, get_base_url, get_charset, get_node_attr, get_title, html_to_dom,
    parse_link_type, LinkType,
};
