/// ASCII 空白字符
pub const WHITESPACES: &[char] = &[' ', '\t', '\n', '\x0c', '\r'];

/// Script `type` values that carry XML rather than code
const XML_SCRIPT_TYPES: &[&str] = &["text/xml", "application/xml"];

/// 检查 `<script type>` 是否为 XML 类型（包括 `+xml` 子类型）
pub fn is_xml_script_type(attr_value: &str) -> bool {
    let media_type = attr_value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim_matches(WHITESPACES)
        .to_lowercase();

    XML_SCRIPT_TYPES.contains(&media_type.as_str())
        || (media_type.contains('/') && media_type.ends_with("+xml"))
}
