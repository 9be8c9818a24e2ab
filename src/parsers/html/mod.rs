//! HTML解析和处理模块
//!
//! - `utils`: 基础常量和类型判断
//! - `parser`: `rel` 属性解析
//! - `dom`: 基础DOM操作
//! - `metadata`: 文档元数据读取

pub mod dom;
pub mod metadata;
pub mod parser;
pub mod utils;

pub use dom::{
    collect_elements, find_nodes, get_node_attr, get_node_name, get_node_text, html_to_dom,
};
pub use metadata::{get_base_url, get_charset, get_title};
pub use parser::{parse_link_type, LinkType};
pub use utils::{is_xml_script_type, WHITESPACES};
