use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use encoding_rs::Encoding;
use markup5ever_rcdom::{Handle, RcDom};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::env::EnvError;
use crate::network::{FetchError, Session};
use crate::parsers::html::{find_nodes, get_base_url, get_charset, get_title, html_to_dom};
use crate::pipeline::PipelineResult;
use crate::utils::url::{parse_data_url, resolve_url};

/// Represents errors that can occur outside of the per-item pipeline boundary
///
/// Loading the page, building the HTTP client and reading configuration can
/// fail as a whole; individual downloads never surface here.
#[derive(Error, Debug)]
pub enum SiteSaverError {
    #[error("invalid URL \"{input}\": {source}")]
    InvalidUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("failed to read \"{path}\": {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("can only process HTML documents from data URLs")]
    NonHtmlDataUrl,

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error(transparent)]
    Config(#[from] EnvError),

    #[error("page did not contain <{element}> within {waited:?}")]
    NotReady { element: String, waited: Duration },
}

/// Content kind of a downloadable resource, inferred from its location
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Css,
    Xml,
    Html,
    Unknown,
}

/// Kinds collected when the caller does not ask for anything specific
pub const DEFAULT_KINDS: &[ResourceKind] = &[ResourceKind::Css, ResourceKind::Xml];

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Css => "css",
            ResourceKind::Xml => "xml",
            ResourceKind::Html => "html",
            ResourceKind::Unknown => "unknown",
        }
    }

    /// MIME type the saved file is labelled with
    pub fn media_type(&self) -> &'static str {
        match self {
            ResourceKind::Css => "text/css",
            ResourceKind::Xml => "application/xml",
            ResourceKind::Html => "text/html",
            ResourceKind::Unknown => "text/plain",
        }
    }

    /// Extension used for generated file names
    pub fn extension(&self) -> &'static str {
        match self {
            ResourceKind::Css => "css",
            ResourceKind::Xml => "xml",
            ResourceKind::Html => "html",
            ResourceKind::Unknown => "txt",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown resource kind \"{0}\" (expected css, xml, html or unknown)")]
pub struct ParseKindError(pub String);

impl FromStr for ResourceKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "css" => Ok(ResourceKind::Css),
            "xml" => Ok(ResourceKind::Xml),
            "html" | "htm" => Ok(ResourceKind::Html),
            "unknown" => Ok(ResourceKind::Unknown),
            _ => Err(ParseKindError(s.to_string())),
        }
    }
}

/// Parses a comma-separated list of kinds, dropping duplicates
pub fn parse_kind_list(value: &str) -> Result<Vec<ResourceKind>, ParseKindError> {
    let mut kinds: Vec<ResourceKind> = Vec::new();

    for item in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let kind: ResourceKind = item.parse()?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }

    Ok(kinds)
}

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_GREEN: &str = "\x1b[32m";
const ANSI_COLOR_YELLOW: &str = "\x1b[33m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";
// All known non-"text/..." plaintext media types
const PLAINTEXT_MEDIA_TYPES: &[&str] = &[
    "application/javascript",          // .js
    "application/json",                // .json
    "application/ld+json",             // .jsonld
    "application/x-sh",                // .sh
    "application/xhtml+xml",           // .xhtml
    "application/xml",                 // .xml
    "application/vnd.mozilla.xul+xml", // .xul
    "image/svg+xml",                   // .svg
];

/// A parsed page together with the URLs its references resolve against
pub struct Document {
    dom: RcDom,
    url: Url,
    base_url: Url,
}

impl Document {
    /// Parses HTML bytes that were obtained from `url`
    ///
    /// The charset declared inside the document wins over `encoding` when it
    /// names a valid encoding; the first `<base href>` becomes the base URL.
    pub fn from_html(data: &[u8], url: Url, encoding: Option<&str>) -> Document {
        let document_encoding = encoding
            .filter(|e| !e.trim().is_empty())
            .unwrap_or("utf-8")
            .to_string();

        let mut dom = html_to_dom(data, document_encoding.clone());

        if let Some(html_charset) = get_charset(&dom.document) {
            if let Some(document_charset) =
                Encoding::for_label_no_replacement(html_charset.trim().as_bytes())
            {
                if !document_charset
                    .name()
                    .eq_ignore_ascii_case(&document_encoding)
                {
                    dom = html_to_dom(data, document_charset.name().to_string());
                }
            }
        }

        let base_url = match get_base_url(&dom.document) {
            Some(href) => match resolve_url(&url, &href) {
                Ok(resolved) => resolved,
                Err(e) => {
                    tracing::debug!("ignoring <base href=\"{}\">: {}", href, e);
                    url.clone()
                }
            },
            None => url.clone(),
        };

        Document { dom, url, base_url }
    }

    /// Overrides the base URL; relative values resolve against the page URL
    pub fn with_base_url(mut self, base_url: &str) -> Result<Document, SiteSaverError> {
        self.base_url = resolve_url(&self.url, base_url).map_err(|source| {
            SiteSaverError::InvalidUrl {
                input: base_url.to_string(),
                source,
            }
        })?;
        Ok(self)
    }

    /// Loads a page from an http(s) URL, a `file://` URL, a filesystem path or a `data:` URL
    pub async fn load(session: &Session, target: &str) -> Result<Document, SiteSaverError> {
        if target.starts_with("data:") {
            let parsed_url = parse_target_url(target)?;
            let (media_type, charset, data) = parse_data_url(&parsed_url);
            if media_type != "text/html" {
                return Err(SiteSaverError::NonHtmlDataUrl);
            }
            Ok(Document::from_html(&data, parsed_url, Some(&charset)))
        } else if target.starts_with("http://") || target.starts_with("https://") {
            let parsed_url = parse_target_url(target)?;
            let fetched = session
                .retrieve_asset(&parsed_url)
                .await
                .map_err(|source| SiteSaverError::Fetch {
                    url: parsed_url.to_string(),
                    source,
                })?;

            if !fetched.media_type.is_empty() && !is_plaintext_media_type(&fetched.media_type) {
                return Err(SiteSaverError::UnsupportedMediaType(fetched.media_type));
            }

            Ok(Document::from_html(
                &fetched.data,
                fetched.final_url,
                Some(&fetched.charset),
            ))
        } else if target.starts_with("file://") {
            let parsed_url = parse_target_url(target)?;
            let path = parsed_url
                .to_file_path()
                .map_err(|_| SiteSaverError::FileNotFound(target.to_string()))?;
            load_file(&path).await
        } else {
            load_file(Path::new(target)).await
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn root(&self) -> &Handle {
        &self.dom.document
    }

    pub fn title(&self) -> Option<String> {
        get_title(&self.dom.document)
    }

    /// Whether an element with the given tag name exists anywhere in the page
    pub fn contains_element(&self, name: &str) -> bool {
        !find_nodes(&self.dom.document, vec![name.trim()]).is_empty()
    }
}

fn parse_target_url(target: &str) -> Result<Url, SiteSaverError> {
    Url::parse(target).map_err(|source| SiteSaverError::InvalidUrl {
        input: target.to_string(),
        source,
    })
}

async fn load_file(path: &Path) -> Result<Document, SiteSaverError> {
    let display = path.display().to_string();

    if !path.exists() {
        return Err(SiteSaverError::FileNotFound(display));
    }

    let canonical_path = tokio::fs::canonicalize(path)
        .await
        .map_err(|source| SiteSaverError::Io {
            path: display.clone(),
            source,
        })?;
    let data = tokio::fs::read(&canonical_path)
        .await
        .map_err(|source| SiteSaverError::Io {
            path: display.clone(),
            source,
        })?;
    let file_url = Url::from_file_path(&canonical_path)
        .map_err(|_| SiteSaverError::FileNotFound(display))?;

    Ok(Document::from_html(&data, file_url, None))
}

/// Parses Content-Type header value
pub fn parse_content_type(content_type: &str) -> (String, String, bool) {
    let mut media_type = String::new();
    let mut charset = String::new();
    let mut is_base64 = false;

    let parts: Vec<&str> = content_type.split(';').collect();

    if !parts.is_empty() {
        media_type = parts[0].trim().to_lowercase();
    }

    for part in parts.iter().skip(1) {
        let part = part.trim();
        if let Some(value) = part.strip_prefix("charset=") {
            charset = value.trim_matches('"').to_string();
        } else if part == "base64" {
            is_base64 = true;
        }
    }

    (media_type, charset, is_base64)
}

/// Checks if the given media type represents plaintext content
pub fn is_plaintext_media_type(media_type: &str) -> bool {
    media_type.starts_with("text/") || PLAINTEXT_MEDIA_TYPES.contains(&media_type)
}

/// Makes a string usable as a single file name
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .replace(['/', '\\'], "_")
        .replace('<', "[")
        .replace('>', "]")
        .replace(':', " - ")
        .replace(['"', '?', '*'], "")
        .replace('|', "-")
        .trim()
        .trim_start_matches('.')
        .to_string()
}

/// Whether stderr output should carry ANSI colors
pub fn use_colors() -> bool {
    atty::is(atty::Stream::Stderr) && std::env::var_os("NO_COLOR").is_none()
}

fn paint(text: &str, color: &str, colors: bool) -> String {
    if colors {
        format!("{color}{text}{ANSI_COLOR_RESET}")
    } else {
        text.to_string()
    }
}

/// Renders a pipeline result as the human-readable report the CLI prints
pub fn format_result_report(result: &PipelineResult, colors: bool) -> String {
    let mut report = String::new();

    for outcome in &result.outcomes {
        if outcome.ok {
            report.push_str(&paint("saved ", ANSI_COLOR_GREEN, colors));
            report.push_str(&format!(
                "{} -> {}\n",
                outcome.url,
                outcome.filename.as_deref().unwrap_or_default()
            ));
        } else {
            report.push_str(&paint("failed", ANSI_COLOR_RED, colors));
            report.push_str(&format!(" {}", outcome.url));
            if let Some(status) = outcome.http_status {
                report.push_str(&format!(" [{status}]"));
            }
            if let Some(error) = &outcome.error {
                report.push_str(&format!(": {error}"));
            }
            report.push('\n');
        }
    }

    let summary = &result.summary;
    match &summary.message {
        Some(message) => {
            report.push_str(&paint(message.as_str(), ANSI_COLOR_YELLOW, colors));
            report.push('\n');
        }
        None => {
            report.push_str(&format!(
                "{} total, {} saved, {} failed\n",
                summary.total, summary.succeeded, summary.failed
            ));
        }
    }

    report
}

/// Prints an error message to stderr
pub fn print_error_message(msg: &str) {
    if use_colors() {
        eprintln!("{ANSI_COLOR_RED}{msg}{ANSI_COLOR_RESET}");
    } else {
        eprintln!("{msg}");
    }
}

/// Prints an info message to stdout
pub fn print_info_message(msg: &str) {
    println!("{msg}");
}
