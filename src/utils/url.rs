use base64::{prelude::BASE64_STANDARD, Engine};
use percent_encoding::percent_decode_str;
pub use url::Url;

use crate::core::{parse_content_type, sanitize_file_name};

/// Schemes whose resources can actually be retrieved
const FETCHABLE_SCHEMES: &[&str] = &["http", "https", "file"];

/// Removes the fragment and an empty trailing query from a URL
pub fn clean_url(url: Url) -> Url {
    let mut url = url;

    url.set_fragment(None);

    if url.query() == Some("") {
        url.set_query(None);
    }

    url
}

/// Checks whether the URL uses a scheme the fetchers understand
pub fn is_fetchable_url(url: &Url) -> bool {
    FETCHABLE_SCHEMES.contains(&url.scheme())
}

/// Resolves `to` against `from`; the result never carries a fragment
pub fn resolve_url(from: &Url, to: &str) -> Result<Url, url::ParseError> {
    from.join(to.trim()).map(clean_url)
}

/// Lowercased path of the URL, used for suffix heuristics
pub fn url_path_lowercase(url: &Url) -> String {
    url.path().to_lowercase()
}

/// Last non-empty path segment, percent-decoded and made safe for the filesystem
pub fn file_name_from_url(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.last()?;

    if segment.is_empty() {
        return None;
    }

    let decoded = percent_decode_str(segment).decode_utf8_lossy();
    let name = sanitize_file_name(&decoded);

    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Splits a `data:` URL into media type, charset and decoded payload
pub fn parse_data_url(url: &Url) -> (String, String, Vec<u8>) {
    let path: String = url.path().to_string();
    let comma_loc: usize = path.find(',').unwrap_or(path.len());

    let meta_data: String = path.chars().take(comma_loc).collect();
    let raw_data: String = path.chars().skip(comma_loc + 1).collect();

    let text: String = percent_decode_str(&raw_data)
        .decode_utf8_lossy()
        .to_string();

    let (mut media_type, mut charset, is_base64) = parse_content_type(&meta_data);

    if media_type.is_empty() {
        media_type = "text/plain".to_string();
    }
    if charset.is_empty() {
        charset = "US-ASCII".to_string();
    }

    let data: Vec<u8> = if is_base64 {
        BASE64_STANDARD.decode(text.trim()).unwrap_or_default()
    } else {
        text.as_bytes().to_vec()
    };

    (media_type, charset, data)
}
