//! HTML 解析器模块
//!
//! 该模块提供 `<link>` 元素 `rel` 属性的解析功能，用于识别样式表等链接关系。
//!
//! ## 使用示例
//!
//! ```rust
//! use sitesaver::parsers::html::parser::{parse_link_type, LinkType};
//!
//! let link_types = parse_link_type("stylesheet preload");
//! assert_eq!(link_types, vec![LinkType::Stylesheet, LinkType::Preload]);
//! ```

/// HTML链接类型枚举
///
/// 表示HTML `<link>` 元素中 `rel` 属性的不同类型值。
#[derive(Debug, PartialEq, Eq)]
pub enum LinkType {
    /// 备用版本链接 - `rel="alternate stylesheet"` 中与样式表同时出现
    Alternate,
    /// DNS预取 - 提示浏览器预先解析域名
    DnsPrefetch,
    /// 预加载资源 - 提示浏览器预先加载重要资源
    Preload,
    /// CSS样式表 - 链接到外部CSS文件
    Stylesheet,
}

/// 解析HTML链接的rel属性值
///
/// 支持多个空格分隔的rel值，并且不区分大小写。不支持的rel值会被忽略。
///
/// ```rust
/// # use sitesaver::parsers::html::parser::{parse_link_type, LinkType};
/// assert_eq!(parse_link_type("STYLESHEET"), vec![LinkType::Stylesheet]);
/// assert_eq!(
///     parse_link_type("alternate stylesheet"),
///     vec![LinkType::Alternate, LinkType::Stylesheet]
/// );
/// ```
pub fn parse_link_type(link_attr_rel_value: &str) -> Vec<LinkType> {
    let mut types: Vec<LinkType> = vec![];

    for link_attr_rel_type in link_attr_rel_value.split_whitespace() {
        if link_attr_rel_type.eq_ignore_ascii_case("alternate") {
            types.push(LinkType::Alternate);
        } else if link_attr_rel_type.eq_ignore_ascii_case("dns-prefetch") {
            types.push(LinkType::DnsPrefetch);
        } else if link_attr_rel_type.eq_ignore_ascii_case("preload") {
            types.push(LinkType::Preload);
        } else if link_attr_rel_type.eq_ignore_ascii_case("stylesheet") {
            types.push(LinkType::Stylesheet);
        }
    }

    types
}
