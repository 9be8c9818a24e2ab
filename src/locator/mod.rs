//! # 资源定位器
//!
//! 扫描已解析的文档，使用多组启发式规则找出可下载的资源引用：
//!
//! 1. `<link rel="stylesheet">` 样式表
//! 2. 以 `.css` / `.xml` 结尾的超链接
//! 3. 资源引用属性（`data-src` 等）以及 XML 类型的 `<script>`
//! 4. 宿主应用的已知端点（仅保留符合 XML/模板/服务命名的；无后缀时类型为 `unknown`）
//!
//! 所有引用都会基于文档的 base URL 解析为绝对地址，并以绝对地址去重。
//! 单个元素解析失败只记录日志，不影响其他元素和其他规则。

pub mod classify;

use indexmap::IndexMap;
use markup5ever_rcdom::Handle;
use serde::Serialize;
use url::Url;

use crate::core::{Document, ResourceKind};
use crate::parsers::html::{
    collect_elements, find_nodes, get_node_attr, get_node_text, is_xml_script_type,
    parse_link_type, LinkType,
};
use crate::utils::url::{is_fetchable_url, resolve_url};

use classify::{
    classify_url, inline_xml_references, matches_endpoint_naming, ANCHOR_KINDS,
};

/// Attributes that commonly carry a reference to an external resource
pub const RESOURCE_ATTRS: &[&str] = &["data-src", "data-href", "data-url", "data-resource", "src"];

/// A single absolute location queued for retrieval
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResourceTarget {
    pub url: Url,
    pub kind: ResourceKind,
}

impl ResourceTarget {
    pub fn new(url: Url, kind: ResourceKind) -> ResourceTarget {
        ResourceTarget { url, kind }
    }
}

#[derive(Clone, Debug, Default)]
pub struct LocatorConfig {
    /// Candidate endpoints of the host application, absolute or relative to the page
    pub well_known: Vec<String>,
}

/// Insertion-ordered set of targets keyed by absolute URL
#[derive(Default)]
struct TargetSet {
    targets: IndexMap<String, ResourceTarget>,
}

impl TargetSet {
    /// Resolves `reference` and inserts it when `kind_for` accepts it
    ///
    /// The first heuristic to discover a URL decides its kind.
    fn offer<K>(&mut self, base_url: &Url, reference: &str, source: &str, kind_for: K)
    where
        K: FnOnce(&Url) -> Option<ResourceKind>,
    {
        let reference = reference.trim();

        if reference.is_empty() {
            tracing::debug!("{}: skipping empty reference", source);
            return;
        }

        let url = match resolve_url(base_url, reference) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("{}: cannot resolve \"{}\": {}", source, reference, e);
                return;
            }
        };

        if !is_fetchable_url(&url) {
            tracing::debug!("{}: skipping non-fetchable {}", source, url);
            return;
        }

        let Some(kind) = kind_for(&url) else {
            tracing::trace!("{}: {} is not a recognized resource", source, url);
            return;
        };

        let key = url.to_string();
        if self.targets.contains_key(&key) {
            tracing::trace!("{}: {} already located", source, key);
            return;
        }

        self.targets.insert(key, ResourceTarget::new(url, kind));
    }

    fn into_targets(self) -> Vec<ResourceTarget> {
        self.targets.into_values().collect()
    }
}

/// Scans the document and returns deduplicated targets in discovery order
pub fn locate(document: &Document, config: &LocatorConfig) -> Vec<ResourceTarget> {
    let base_url = document.base_url();
    let root = document.root();
    let mut found = TargetSet::default();

    collect_stylesheets(root, base_url, &mut found);
    collect_anchors(root, base_url, &mut found);
    collect_attribute_references(root, base_url, &mut found);
    collect_xml_scripts(root, base_url, &mut found);
    collect_well_known(&config.well_known, base_url, &mut found);

    let targets = found.into_targets();
    tracing::debug!("located {} targets in {}", targets.len(), document.url());
    targets
}

/// Keeps targets whose kind was requested
///
/// `Unknown` targets pass when `include_unknown_kinds` is set or `unknown` is
/// listed explicitly.
pub fn filter_targets(
    targets: Vec<ResourceTarget>,
    kinds: &[ResourceKind],
    include_unknown_kinds: bool,
) -> Vec<ResourceTarget> {
    targets
        .into_iter()
        .filter(|target| {
            kinds.contains(&target.kind)
                || (include_unknown_kinds && target.kind == ResourceKind::Unknown)
        })
        .collect()
}

fn collect_stylesheets(root: &Handle, base_url: &Url, found: &mut TargetSet) {
    for link_node in find_nodes(root, vec!["link"]).iter() {
        let rel = get_node_attr(link_node, "rel").unwrap_or_default();
        if !parse_link_type(&rel).contains(&LinkType::Stylesheet) {
            continue;
        }

        if let Some(href) = get_node_attr(link_node, "href") {
            found.offer(base_url, &href, "stylesheet", |_| Some(ResourceKind::Css));
        }
    }
}

fn collect_anchors(root: &Handle, base_url: &Url, found: &mut TargetSet) {
    for anchor_node in find_nodes(root, vec!["a"]).iter() {
        if let Some(href) = get_node_attr(anchor_node, "href") {
            found.offer(base_url, &href, "anchor", |url| {
                let kind = classify_url(url);
                ANCHOR_KINDS.contains(&kind).then_some(kind)
            });
        }
    }
}

fn collect_attribute_references(root: &Handle, base_url: &Url, found: &mut TargetSet) {
    for element in collect_elements(root).iter() {
        for attr_name in RESOURCE_ATTRS {
            if let Some(value) = get_node_attr(element, attr_name) {
                found.offer(base_url, &value, "attribute", |url| {
                    (classify_url(url) == ResourceKind::Xml).then_some(ResourceKind::Xml)
                });
            }
        }
    }
}

fn collect_xml_scripts(root: &Handle, base_url: &Url, found: &mut TargetSet) {
    for script_node in find_nodes(root, vec!["script"]).iter() {
        let script_type = get_node_attr(script_node, "type").unwrap_or_default();
        if !is_xml_script_type(&script_type) {
            continue;
        }

        if let Some(src) = get_node_attr(script_node, "src") {
            found.offer(base_url, &src, "script", |url| {
                (classify_url(url) == ResourceKind::Xml).then_some(ResourceKind::Xml)
            });
        } else {
            let text = get_node_text(script_node);
            for reference in inline_xml_references(&text) {
                found.offer(base_url, reference, "inline-script", |_| {
                    Some(ResourceKind::Xml)
                });
            }
        }
    }
}

fn collect_well_known(endpoints: &[String], base_url: &Url, found: &mut TargetSet) {
    for endpoint in endpoints {
        found.offer(base_url, endpoint, "well-known", |url| {
            matches_endpoint_naming(url).then(|| classify_url(url))
        });
    }
}
