//! Suffix and naming heuristics used to classify resource references
//!
//! Classification walks [`KIND_RULES`] top to bottom and takes the first
//! rule whose predicate matches the lowercased URL path.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::core::ResourceKind;
use crate::utils::url::url_path_lowercase;

/// One row of the classification table
pub struct KindRule {
    pub name: &'static str,
    pub matches: fn(&str) -> bool,
    pub kind: ResourceKind,
}

fn has_css_suffix(path: &str) -> bool {
    path.ends_with(".css")
}

fn has_xml_suffix(path: &str) -> bool {
    path.ends_with(".xml")
}

fn has_html_suffix(path: &str) -> bool {
    path.ends_with(".html") || path.ends_with(".htm") || path.ends_with(".xhtml")
}

pub const KIND_RULES: &[KindRule] = &[
    KindRule {
        name: "css-suffix",
        matches: has_css_suffix,
        kind: ResourceKind::Css,
    },
    KindRule {
        name: "xml-suffix",
        matches: has_xml_suffix,
        kind: ResourceKind::Xml,
    },
    KindRule {
        name: "html-suffix",
        matches: has_html_suffix,
        kind: ResourceKind::Html,
    },
];

/// Kinds a hyperlink is allowed to contribute
pub const ANCHOR_KINDS: &[ResourceKind] = &[ResourceKind::Css, ResourceKind::Xml];

/// Classifies an already lowercased path
pub fn classify_path(path: &str) -> ResourceKind {
    KIND_RULES
        .iter()
        .find(|rule| (rule.matches)(path))
        .map(|rule| rule.kind)
        .unwrap_or(ResourceKind::Unknown)
}

/// Classifies a URL by the suffix of its path; query and fragment are ignored
pub fn classify_url(url: &Url) -> ResourceKind {
    classify_path(&url_path_lowercase(url))
}

fn endpoint_naming_regex() -> &'static Regex {
    static ENDPOINT_NAMING: OnceLock<Regex> = OnceLock::new();
    ENDPOINT_NAMING.get_or_init(|| {
        Regex::new(r"(?i)(\.xml$|template|service)").expect("endpoint naming pattern")
    })
}

fn inline_xml_reference_regex() -> &'static Regex {
    static INLINE_XML_REFERENCE: OnceLock<Regex> = OnceLock::new();
    INLINE_XML_REFERENCE.get_or_init(|| {
        Regex::new(r#"(?i)["']([^"'\s]+\.xml)(?:[?#][^"'\s]*)?["']"#)
            .expect("inline reference pattern")
    })
}

/// Whether a well-known endpoint looks like an XML document, a template or a service
pub fn matches_endpoint_naming(url: &Url) -> bool {
    endpoint_naming_regex().is_match(url.path())
}

/// Quoted `.xml` references inside inline script text, in order of appearance
pub fn inline_xml_references(text: &str) -> Vec<&str> {
    inline_xml_reference_regex()
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .map(|m| m.as_str())
        .collect()
}
