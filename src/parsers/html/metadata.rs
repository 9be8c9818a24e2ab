//! HTML 文档元数据处理模块
//!
//! 提供对文档元数据的读取：
//! - 获取 base URL
//! - 读取字符编码声明
//! - 提取文档标题
//!
//! 定位器用 base URL 解析相对引用，文档加载器用字符编码重新解码页面。

use markup5ever_rcdom::{Handle, NodeData};

use crate::core::parse_content_type;

use super::dom::{find_nodes, get_node_attr};

/// 获取文档的 base URL
///
/// 从 HTML 文档的 `<head>` 部分查找 `<base>` 标签并提取其 `href` 属性值。
/// 根据 HTML 规范，只有第一个 `<base>` 标签有效，其余的将被忽略。
///
/// # 示例
///
/// ```ignore
/// // 对于包含 <base href="https://example.com/"> 的文档
/// let base_url = get_base_url(&document_handle);
/// assert_eq!(base_url, Some("https://example.com/".to_string()));
/// ```
pub fn get_base_url(handle: &Handle) -> Option<String> {
    if let Some(base_node) = find_nodes(handle, vec!["html", "head", "base"]).first() {
        // 只有第一个 base 标签起作用（忽略其余的，如果有的话）
        get_node_attr(base_node, "href")
    } else {
        None
    }
}

/// 获取文档字符编码
///
/// 从 HTML 文档的 meta 标签中提取字符编码信息。支持两种格式：
/// 1. HTML5 格式：`<meta charset="utf-8">`
/// 2. HTML4 格式：`<meta http-equiv="content-type" content="text/html; charset=utf-8">`
pub fn get_charset(node: &Handle) -> Option<String> {
    for meta_node in find_nodes(node, vec!["html", "head", "meta"]).iter() {
        if let Some(meta_charset_node_attr_value) = get_node_attr(meta_node, "charset") {
            return Some(meta_charset_node_attr_value);
        }

        if get_node_attr(meta_node, "http-equiv")
            .unwrap_or_default()
            .eq_ignore_ascii_case("content-type")
        {
            if let Some(meta_content_type_node_attr_value) = get_node_attr(meta_node, "content") {
                let (_media_type, charset, _is_base64) =
                    parse_content_type(&meta_content_type_node_attr_value);
                return Some(charset);
            }
        }
    }

    None
}

/// 获取文档标题
///
/// 只返回第一个 title 标签的文本内容。
pub fn get_title(node: &Handle) -> Option<String> {
    for title_node in find_nodes(node, vec!["html", "head", "title"]).iter() {
        for child_node in title_node.children.borrow().iter() {
            if let NodeData::Text { ref contents } = child_node.data {
                return Some(contents.borrow().to_string());
            }
        }
    }

    None
}
