//! Class path derivation from resource URLs.
//!
//! Configuration may point at the JAR (or class directory) providing a tool
//! by naming the URL of a resource inside it, e.g. the URL of
//! `org/javacc/jjdoc/JJDocMain.class`. These helpers map such URLs back to
//! the filesystem root that belongs on the class path.

use super::ToolError;
use percent_encoding::percent_decode_str;
use std::path::PathBuf;

const JAR: &str = "jar:";
const FILE: &str = "file:";
const JAR_FILE: &str = "jar:file:";

/// Decodes percent-encoded octets as UTF-8. Lenient: a `%` that is not
/// followed by two hex digits is passed through literally, so unencoded
/// URLs survive unaltered.
pub fn decode_url(url: &str) -> String {
    percent_decode_str(url).decode_utf8_lossy().into_owned()
}

/// Gets the filesystem path of the class path root (a JAR file or a loose
/// class directory) holding the given resource. Only `file:` and
/// `jar:file:` URLs are supported; the scheme prefix is matched case
/// insensitively.
pub fn resource_root(url: &str, resource: &str) -> Result<PathBuf, ToolError> {
    if starts_with_ignore_case(url, JAR_FILE) {
        let spec = &url[JAR.len()..];
        let bang = spec.rfind("!/").ok_or_else(|| ToolError::InvalidUrl {
            url: url.to_string(),
            reason: "missing `!/` separator in JAR URL".to_string(),
        })?;
        let inner = &spec[..bang];
        Ok(PathBuf::from(decode_url(url_path(&inner[FILE.len()..]))))
    } else if starts_with_ignore_case(url, FILE) {
        let path = decode_url(url_path(&url[FILE.len()..]));
        let root = path
            .strip_suffix(resource)
            .ok_or_else(|| ToolError::InvalidUrl {
                url: url.to_string(),
                reason: format!("URL does not end with resource name `{}`", resource),
            })?;
        Ok(PathBuf::from(root))
    } else {
        Err(ToolError::InvalidUrl {
            url: url.to_string(),
            reason: "unsupported protocol".to_string(),
        })
    }
}

/// Strips the authority component from the scheme-specific part of a
/// `file:` URL. `//localhost/x` becomes `/x`, while the UNC-style
/// `///x` and `////host/x` keep their leading slashes, matching
/// `java.net.URL` path extraction.
fn url_path(spec: &str) -> &str {
    match spec.strip_prefix("//") {
        Some(rest) => match rest.find('/') {
            Some(index) => &rest[index..],
            None => "",
        },
        None => spec,
    }
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len() && s[..prefix.len()].eq_ignore_ascii_case(prefix)
}
